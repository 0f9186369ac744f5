//! Chat command handler.
//!
//! Reads questions from stdin until end of input or `/quit`. The session
//! keeps the loaded index and the history for the whole loop.

use super::ask::print_answer;
use clap::Args;
use docent_core::{config::AppConfig, AppResult};
use docent_knowledge::{ChatHistory, RagSession};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Interactive question answering
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Print the retrieved chunks after each answer
    #[arg(long)]
    pub show_context: bool,
}

/// A parsed line of chat input.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Question(&'a str),
    Rebuild,
    History,
    Quit,
    Empty,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    match line {
        "" => ChatInput::Empty,
        "/rebuild" => ChatInput::Rebuild,
        "/history" => ChatInput::History,
        "/quit" | "/exit" => ChatInput::Quit,
        command if command.starts_with('/') => ChatInput::Unknown(command),
        question => ChatInput::Question(question),
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let mut session = RagSession::open(config).await?;
        let mut lines = BufReader::new(io::stdin()).lines();
        let mut stdout = io::stdout();

        println!("Ask a question. Commands: /rebuild, /history, /quit");

        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_input(&line) {
                ChatInput::Empty => continue,
                ChatInput::Quit => break,
                ChatInput::History => print_history(session.history()),
                ChatInput::Unknown(command) => println!("Unknown command: {}", command),
                ChatInput::Rebuild => match session.ingest_documents().await {
                    Ok(stats) => println!(
                        "Rebuilt knowledge base: {} documents, {} chunks",
                        stats.documents, stats.chunks
                    ),
                    Err(e) => println!("Rebuild failed: {}", e),
                },
                // A failed question is reported and the loop goes on.
                ChatInput::Question(question) => match session.generate_answer(question).await {
                    Ok(answer) => print_answer(&answer, self.show_context),
                    Err(e) => println!("Error: {}", e),
                },
            }
        }

        print_history(session.history());
        Ok(())
    }
}

fn print_history(history: &ChatHistory) {
    if history.is_empty() {
        println!("No questions asked yet.");
        return;
    }

    println!("Chat history:");
    for (i, turn) in history.turns().iter().enumerate() {
        println!("{}. Q: {}", i + 1, turn.query);
        println!("   A: {}", turn.answer);
    }
}

//! Ask command handler.

use clap::Args;
use docent_core::{config::AppConfig, AppResult};
use docent_knowledge::{Answer, RagSession};

/// Answer a single question from the knowledge base
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Print the retrieved chunks after the answer
    #[arg(long)]
    pub show_context: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let mut session = RagSession::open(config).await?;
        let answer = session.generate_answer(&self.question).await?;

        if self.json {
            println!("{}", super::to_json(&answer)?);
        } else {
            print_answer(&answer, self.show_context);
        }

        Ok(())
    }
}

/// Print an answer and, optionally, the chunks it was generated from.
pub(crate) fn print_answer(answer: &Answer, show_context: bool) {
    println!("Answer:");
    println!("{}", answer.text);

    if show_context {
        for (i, chunk) in answer.used_chunks.iter().enumerate() {
            println!();
            println!("Chunk {} (distance {:.4}):", i + 1, chunk.distance);
            println!("{}", chunk.text);
        }
    }
}

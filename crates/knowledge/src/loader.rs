//! Document loading and text extraction.
//!
//! Walks the documents directory and turns each file into one or more
//! [`Document`]s. Files that cannot be read or yield no text are skipped
//! with a warning rather than failing the whole load.

use crate::types::Document;
use docent_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Markdown,
    Html,
    Pdf,
    PlainText,
    Unknown,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("html") | Some("htm") => Self::Html,
            Some("pdf") => Self::Pdf,
            Some("txt") | Some("text") => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::PlainText => "text",
            Self::Unknown => "unknown",
        }
    }

    /// Whether `docent add` accepts files of this type.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Load every document under `dir`, in file-name order.
///
/// A missing directory yields no documents.
pub fn load_documents(dir: &Path) -> AppResult<Vec<Document>> {
    if !dir.exists() {
        tracing::warn!("Documents directory {:?} does not exist", dir);
        return Ok(Vec::new());
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || is_hidden(path) {
            continue;
        }

        match extract_file(path) {
            Ok(extracted) if extracted.is_empty() => {
                tracing::warn!("Skipping {:?}: no extractable text", path);
            }
            Ok(extracted) => {
                tracing::debug!("Loaded {:?}: {} document(s)", path, extracted.len());
                documents.extend(extracted);
            }
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
            }
        }
    }

    Ok(documents)
}

/// Extract the documents contained in a single file.
///
/// Returns an empty list when the file holds only whitespace. PDFs produce
/// one document per page.
pub fn extract_file(path: &Path) -> AppResult<Vec<Document>> {
    let content_type = ContentType::from_path(path);
    let name = source_name(path);

    tracing::debug!("Extracting {:?} as {}", path, content_type.as_str());

    let read_text = || {
        fs::read_to_string(path)
            .map_err(|e| AppError::Other(format!("Failed to read {:?}: {}", path, e)))
    };

    let text = match content_type {
        ContentType::Pdf => {
            let bytes = fs::read(path)?;
            return extract_pdf(&name, &bytes);
        }
        ContentType::Markdown => clean_markdown(&read_text()?),
        ContentType::Html => clean_html(&read_text()?),
        ContentType::PlainText => read_text()?,
        ContentType::Unknown => {
            let raw = read_text()?;
            if !is_likely_text(&raw) {
                return Err(AppError::Other("Binary file not supported".to_string()));
            }
            raw
        }
    };

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![Document::new(name, text)])
}

/// Split extracted PDF text into per-page documents.
fn extract_pdf(name: &str, bytes: &[u8]) -> AppResult<Vec<Document>> {
    // pdf-extract panics on some malformed files
    let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| AppError::Other("PDF extraction panicked".to_string()))?
        .map_err(|e| AppError::Other(format!("Failed to extract PDF text: {}", e)))?;

    // Pages are separated by form feeds when the PDF carries page breaks.
    if !text.contains('\x0C') {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![Document::new(name, text)]);
    }

    Ok(text
        .split('\x0C')
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .map(|(i, page)| Document::new(format!("{}#page={}", name, i + 1), page))
        .collect())
}

/// Copy files into the documents directory.
///
/// Only supported document types are accepted. Returns the destination
/// paths in input order.
pub fn add_documents(paths: &[PathBuf], dir: &Path) -> AppResult<Vec<PathBuf>> {
    for path in paths {
        if !path.is_file() {
            return Err(AppError::Config(format!("Not a file: {:?}", path)));
        }
        if !ContentType::from_path(path).is_supported() {
            return Err(AppError::Config(format!(
                "Unsupported document type: {:?} (expected pdf, txt, md or html)",
                path
            )));
        }
    }

    fs::create_dir_all(dir)?;

    let mut added = Vec::with_capacity(paths.len());
    for path in paths {
        let destination = dir.join(source_name(path));
        fs::copy(path, &destination)?;
        tracing::info!("Added {:?} -> {:?}", path, destination);
        added.push(destination);
    }

    Ok(added)
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Clean markdown by removing excess formatting.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = strip_heading_marker(line);

        // Horizontal rules and fence markers carry no text
        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        if !trimmed.is_empty() {
            result.push_str(trimmed);
            result.push('\n');
        }
    }

    result.trim().to_string()
}

/// Drop an ATX heading marker: one to six `#` followed by whitespace or
/// the end of the line. `#hashtag` is text and stays.
fn strip_heading_marker(line: &str) -> &str {
    let trimmed = line.trim();
    let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
    let rest = &trimmed[hashes..];

    if (1..=6).contains(&hashes) && (rest.is_empty() || rest.starts_with([' ', '\t'])) {
        rest.trim()
    } else {
        trimmed
    }
}

/// Clean HTML by stripping tags, scripts and styles.
fn clean_html(text: &str) -> String {
    let lower = text.to_ascii_lowercase();
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    let mut in_script = false;
    let mut in_style = false;

    for (i, ch) in text.char_indices() {
        if ch == '<' {
            in_tag = true;

            let rest = &lower[i..];
            if rest.starts_with("<script") {
                in_script = true;
            } else if rest.starts_with("</script") {
                in_script = false;
            } else if rest.starts_with("<style") {
                in_style = true;
            } else if rest.starts_with("</style") {
                in_style = false;
            }
        } else if ch == '>' {
            in_tag = false;
            result.push(' ');
        } else if !in_tag && !in_script && !in_style {
            result.push(ch);
        }
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_likely_text(data: &str) -> bool {
    !data.contains('\0')
}

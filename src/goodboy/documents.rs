//! Document extraction for lesson ingestion.
//!
//! Binary formats (PDF, DOCX) are left to external extractors that implement
//! [`DocumentExtractor`]; the crate ships a plain-text one.

use crate::goodboy::error::GoodBoyError;
use std::fs;
use std::path::Path;

/// Turns a file into plain text.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, GoodBoyError>;
}

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "json", "jsonl", "csv", "log", "toml", "yaml", "yml", "rs", "py",
    "js", "ts", "html",
];

/// Reads UTF-8 text files with a known text extension.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, GoodBoyError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
            return Err(GoodBoyError::Validation(format!(
                "unsupported document type '{}' for {}",
                ext,
                path.display()
            )));
        }
        if !path.exists() {
            return Err(GoodBoyError::NotFound(path.display().to_string()));
        }
        Ok(fs::read_to_string(path)?)
    }
}

/// Split `text` on blank lines and pack paragraphs into chunks of at most
/// `max_chars` characters. A single paragraph longer than that becomes its
/// own chunk, cut at character boundaries.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let needed = if current.is_empty() {
            paragraph.chars().count()
        } else {
            current.chars().count() + 2 + paragraph.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if paragraph.chars().count() > max_chars {
            let chars: Vec<char> = paragraph.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_are_packed_up_to_limit() {
        let text = "alpha beta\n\ngamma\n\n\n\ndelta epsilon zeta";
        let chunks = chunk_text(text, 20);
        assert_eq!(chunks, vec!["alpha beta\n\ngamma", "delta epsilon zeta"]);
    }

    #[test]
    fn oversized_paragraph_is_split() {
        let chunks = chunk_text(&"a".repeat(25), 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 5);
    }

    #[test]
    fn binary_formats_are_rejected() {
        let err = PlainTextExtractor.extract(Path::new("report.pdf")).unwrap_err();
        assert!(matches!(err, GoodBoyError::Validation(_)));
    }
}

//! Subword tokenization of ingredient strings
//!
//! The recommender only needs `text -> tokens`. In production that is a
//! WordPiece vocabulary (`bert-base-uncased` style `tokenizer.json`); the
//! basic tokenizer is the fallback when no vocabulary file is configured.

use std::path::Path;

use crate::error::{AppError, AppResult};

pub trait Tokenize: Send + Sync {
    fn tokenize(&self, text: &str) -> AppResult<Vec<String>>;

    fn name(&self) -> &'static str;
}

/// Hugging Face `tokenizers` backed WordPiece tokenizer
pub struct WordPieceTokenizer {
    inner: tokenizers::Tokenizer,
}

impl WordPieceTokenizer {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            anyhow::anyhow!("Failed to load tokenizer {}: {}", path.display(), e)
        })?;

        tracing::info!(path = %path.display(), "Loaded WordPiece tokenizer");
        Ok(Self { inner })
    }
}

impl Tokenize for WordPieceTokenizer {
    fn tokenize(&self, text: &str) -> AppResult<Vec<String>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| AppError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_tokens().to_vec())
    }

    fn name(&self) -> &'static str {
        "wordpiece"
    }
}

/// Whitespace and punctuation splitter
///
/// Same pre-tokenization a BERT tokenizer applies before WordPiece, without
/// the subword step.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicTokenizer;

impl Tokenize for BasicTokenizer {
    fn tokenize(&self, text: &str) -> AppResult<Vec<String>> {
        let mut tokens = Vec::new();
        let mut current = String::new();

        for ch in text.chars() {
            if ch.is_whitespace() {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            } else if ch.is_ascii_punctuation() {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(ch.to_string());
            } else {
                current.push(ch);
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }

        Ok(tokens)
    }

    fn name(&self) -> &'static str {
        "basic"
    }
}

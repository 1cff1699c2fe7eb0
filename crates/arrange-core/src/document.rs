//! Source documents

use std::fs;
use std::path::{Path, PathBuf};

use crate::cst::{Parse, parse};
use crate::error::ArrangeError;
use crate::result::Result;

/// Language name of C# documents
pub const CSHARP: &str = "csharp";

/// A source document and the language it is written in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: Option<PathBuf>,
    pub language: String,
    pub text: String,
}

impl Document {
    /// In-memory C# document
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            path: None,
            language: CSHARP.to_string(),
            text: text.into(),
        }
    }

    /// Read a document from disk, detecting the language from its extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ArrangeError::io_error(path, e))?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            language: language_for_path(path).to_string(),
            text,
        })
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn parse(&self) -> Parse {
        parse(&self.text)
    }

    /// Path for messages, `<stdin>` for in-memory documents
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string())
    }
}

/// Language name for a file extension
pub fn language_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("cs") => CSHARP,
        _ => "unknown",
    }
}

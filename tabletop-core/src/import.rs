//! External scenario intake: source checks, JSON parsing, sanitizing and
//! schema validation, in that order.
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

use crate::sanitize::sanitize_value;
use crate::scenario::ScenarioDocument;
use crate::validate::{ValidationErrors, validate};

/// Where an imported scenario came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// A dropped or selected file; only `.json` names are accepted.
    File { name: String },
    /// Text pasted into the import box.
    Paste,
}

impl ImportSource {
    #[must_use]
    pub fn file(name: impl Into<String>) -> Self {
        Self::File { name: name.into() }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::File { name } => name,
            Self::Paste => "pasted text",
        }
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Please paste JSON content before validating.")]
    EmptyInput,
    #[error("Only .json files are accepted (got '{name}'). Please upload a valid JSON file.")]
    UnsupportedFileType { name: String },
    #[error("Invalid JSON syntax. Please check for missing commas, brackets, or quotes. ({0})")]
    Syntax(#[from] serde_json::Error),
    #[error(transparent)]
    Schema(#[from] ValidationErrors),
}

impl ImportError {
    /// Human-readable messages suitable for listing to the author.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Schema(errors) => errors.messages().to_vec(),
            other => vec![other.to_string()],
        }
    }
}

fn has_json_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Run the full intake pipeline over raw text from `source`.
///
/// # Errors
///
/// Returns [`ImportError`] describing the first failing stage; schema
/// failures carry every violation found.
pub fn parse_scenario(text: &str, source: &ImportSource) -> Result<ScenarioDocument, ImportError> {
    match source {
        ImportSource::File { name } if !has_json_extension(name) => {
            return Err(ImportError::UnsupportedFileType { name: name.clone() });
        }
        ImportSource::Paste if text.trim().is_empty() => return Err(ImportError::EmptyInput),
        _ => {}
    }
    let mut raw: Value = serde_json::from_str(text)?;
    sanitize_value(&mut raw);
    Ok(validate(&raw)?)
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tabletop_core::{ImportSource, ScenarioDocument, parse_scenario};

/// Outcome of pushing one file through the import pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub accepted: bool,
    pub scenario_id: Option<String>,
    pub errors: Vec<String>,
    #[serde(skip)]
    pub document: Option<ScenarioDocument>,
}

pub fn validate_file(path: &Path) -> Result<FileReport> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let report = match parse_scenario(&text, &ImportSource::file(name)) {
        Ok(document) => FileReport {
            path: path.to_path_buf(),
            accepted: true,
            scenario_id: Some(document.id().to_string()),
            errors: Vec::new(),
            document: Some(document),
        },
        Err(err) => {
            log::warn!("{} rejected: {err}", path.display());
            FileReport {
                path: path.to_path_buf(),
                accepted: false,
                scenario_id: None,
                errors: err.messages(),
                document: None,
            }
        }
    };
    Ok(report)
}

pub fn validate_files(paths: &[PathBuf]) -> Result<Vec<FileReport>> {
    paths.iter().map(|p| validate_file(p)).collect()
}

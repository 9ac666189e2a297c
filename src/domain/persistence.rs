//! Batch Persistence
//!
//! Reads the launch list produced by the scanner and writes the enriched
//! records and summary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::record::{EnrichedTokenRecord, TokenLaunch};
use super::summary::EnrichmentSummary;

pub const ENRICHED_FILE: &str = "enriched_launches.json";
pub const SUMMARY_FILE: &str = "enrichment_summary.json";

#[derive(Error, Debug, Clone)]
pub enum PersistError {
    #[error("Input file not found: {0}")]
    InputMissing(String),

    #[error("Failed to read input file: {0}")]
    ReadError(String),

    #[error("Failed to parse input file: {0}")]
    DeserializationError(String),

    #[error("Failed to serialize output: {0}")]
    SerializationError(String),

    #[error("Failed to write output file: {0}")]
    WriteError(String),

    #[error("Failed to create directory: {0}")]
    DirectoryError(String),
}

#[derive(Serialize, Deserialize)]
pub struct EnrichedFile {
    pub tokens: Vec<EnrichedTokenRecord>,
}

/// One input row: a readable launch, or the reason it could not be read
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchRow {
    Valid(TokenLaunch),
    Invalid { mint: String, error: String },
}

impl LaunchRow {
    /// Parse one row. `index` is only used in the error text.
    pub fn from_value(index: usize, row: Value) -> Self {
        let mint = row
            .get("mint")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match serde_json::from_value::<TokenLaunch>(row) {
            Ok(launch) => LaunchRow::Valid(launch),
            Err(e) => LaunchRow::Invalid {
                mint,
                error: format!("invalid launch row {}: {}", index, e),
            },
        }
    }

    pub fn valid(self) -> Option<TokenLaunch> {
        match self {
            LaunchRow::Valid(launch) => Some(launch),
            LaunchRow::Invalid { .. } => None,
        }
    }
}

/// Load launch rows. A missing file is an error; an empty file is an empty batch.
///
/// The file may be a bare array or `{"tokens": [...]}`. Rows are parsed one by
/// one so a malformed row does not lose the rest of the batch.
pub fn load_launches(path: &Path) -> Result<Vec<LaunchRow>, PersistError> {
    if !path.exists() {
        return Err(PersistError::InputMissing(path.display().to_string()));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| PersistError::ReadError(e.to_string()))?;

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let file: Value = serde_json::from_str(&content)
        .map_err(|e| PersistError::DeserializationError(e.to_string()))?;

    let rows = match file {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("tokens") {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(PersistError::DeserializationError(
                    "expected a \"tokens\" array".to_string(),
                ))
            }
        },
        _ => {
            return Err(PersistError::DeserializationError(
                "expected an array of launches".to_string(),
            ))
        }
    };

    let rows: Vec<LaunchRow> = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| LaunchRow::from_value(index, row))
        .collect();

    for row in &rows {
        if let LaunchRow::Invalid { error, .. } = row {
            tracing::warn!("Skipping enrichment: {}", error);
        }
    }

    tracing::info!("Loaded {} launches from {}", rows.len(), path.display());
    Ok(rows)
}

/// Write `enriched_launches.json` and `enrichment_summary.json` into `dir`.
///
/// Returns the two paths written.
pub fn save_results(
    dir: &Path,
    records: Vec<EnrichedTokenRecord>,
    summary: &EnrichmentSummary,
) -> Result<(PathBuf, PathBuf), PersistError> {
    fs::create_dir_all(dir)
        .map_err(|e| PersistError::DirectoryError(e.to_string()))?;

    let enriched_path = dir.join(ENRICHED_FILE);
    let count = records.len();
    write_json(&enriched_path, &EnrichedFile { tokens: records })?;

    let summary_path = dir.join(SUMMARY_FILE);
    write_json(&summary_path, summary)?;

    tracing::info!(
        "Saved {} enriched records to {} (summary: {})",
        count,
        enriched_path.display(),
        summary_path.display()
    );

    Ok((enriched_path, summary_path))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| PersistError::SerializationError(e.to_string()))?;
    fs::write(path, content)
        .map_err(|e| PersistError::WriteError(e.to_string()))
}

//! Replay and configuration file loading.
//!
//! The replay encoding is picked from the file extension: `.bin` is bincode,
//! `.json` is JSON and `.ron` is RON. Every format goes through the same
//! version check.

use std::path::Path;

use sentinel_core::config::AnalysisConfig;
use sentinel_core::error::AnalysisError;
use sentinel_core::replay::Replay;
use thiserror::Error;
use tracing::debug;

/// Error type for loading inputs.
#[derive(Error, Debug)]
pub enum LoadError {
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Extension does not name a known replay encoding.
    #[error("Unsupported replay format: {0} (expected .bin, .json or .ron)")]
    UnsupportedFormat(String),
    /// Failed to parse JSON.
    #[error("Failed to parse JSON replay: {0}")]
    Json(#[from] serde_json::Error),
    /// Decoding, version or config error from the engine.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// On-disk replay encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayFormat {
    /// bincode, `.bin`.
    Bincode,
    /// JSON, `.json`.
    Json,
    /// RON, `.ron`.
    Ron,
}

impl ReplayFormat {
    /// Pick the encoding from a path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "bin" => Ok(ReplayFormat::Bincode),
            "json" => Ok(ReplayFormat::Json),
            "ron" => Ok(ReplayFormat::Ron),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

fn ensure_exists(path: &Path) -> Result<(), LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

/// Load a replay file in any supported encoding.
pub fn load_replay<P: AsRef<Path>>(path: P) -> Result<Replay, LoadError> {
    let path = path.as_ref();
    ensure_exists(path)?;
    let format = ReplayFormat::from_path(path)?;
    debug!(path = %path.display(), ?format, "Loading replay");

    let replay = match format {
        ReplayFormat::Bincode => Replay::from_bytes(&std::fs::read(path)?)?,
        ReplayFormat::Json => {
            let replay: Replay = serde_json::from_slice(&std::fs::read(path)?)?;
            replay.check_version()?;
            replay
        }
        ReplayFormat::Ron => Replay::from_ron_str(&std::fs::read_to_string(path)?)?,
    };
    Ok(replay)
}

/// Load an analysis configuration from a RON file.
///
/// Omitted fields keep their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AnalysisConfig, LoadError> {
    let path = path.as_ref();
    ensure_exists(path)?;
    let contents = std::fs::read_to_string(path)?;
    Ok(AnalysisConfig::from_ron_str(&contents)?)
}

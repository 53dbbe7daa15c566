//! Headless replay analyzer.
//!
//! Loads a pre-decoded replay from disk, runs every built-in detector over it
//! and renders the resulting statistics as text tables or JSON.
//!
//! # Example
//!
//! ```bash
//! # Text report to stdout
//! cargo run -p sentinel_headless -- analyze --replay match.bin
//!
//! # JSON report with tuned thresholds
//! cargo run -p sentinel_headless -- analyze --replay match.ron --config tuning.ron --format json
//!
//! # Print the default configuration
//! cargo run -p sentinel_headless -- config
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod loader;
pub mod report;

use std::path::Path;

use sentinel_core::config::AnalysisConfig;
use sentinel_core::pipeline::{AnalysisResults, Pipeline};
use tracing::info;

pub use loader::{load_config, load_replay, LoadError, ReplayFormat};
pub use report::{JsonReporter, TextReporter};

/// Load a replay file and run the default pipeline over it.
pub fn analyze_file<P: AsRef<Path>>(
    path: P,
    config: &AnalysisConfig,
) -> Result<AnalysisResults, LoadError> {
    let replay = load_replay(path)?;
    info!(
        demo = %replay.header.demo_name,
        map = %replay.header.map_name,
        frames = replay.frame_count(),
        events = replay.event_count(),
        "Replay loaded"
    );
    let pipeline = Pipeline::with_default_detectors(config)?;
    let results = pipeline.run(&mut replay.into_stream())?;
    info!(players = results.stats.player_count(), "Analysis complete");
    Ok(results)
}

//! Error types for the analysis engine.

use thiserror::Error;

use crate::metrics::{MetricKey, MetricKind};
use crate::pipeline::DetectorId;

/// Result type alias using [`AnalysisError`].
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Top-level error type for all analysis errors.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// An increment targeted a metric holding a different kind of value.
    #[error("Metric {key} holds a {found} value, expected {expected}")]
    MetricTypeMismatch {
        /// The metric that was targeted.
        key: MetricKey,
        /// Kind the operation requires.
        expected: MetricKind,
        /// Kind currently stored.
        found: MetricKind,
    },

    /// The replay source produced a tick that does not advance the stream.
    #[error("Tick {tick} does not follow previous tick {previous}")]
    TickOutOfOrder {
        /// Tick of the previous frame.
        previous: u64,
        /// Offending tick.
        tick: u64,
    },

    /// Two detectors were registered under the same identifier.
    #[error("Detector {0} registered more than once")]
    DuplicateDetector(DetectorId),

    /// A detector depends on a detector that was never registered.
    #[error("Detector {detector} depends on unregistered detector {missing}")]
    UnknownDependency {
        /// Detector declaring the dependency.
        detector: DetectorId,
        /// Identifier that could not be resolved.
        missing: DetectorId,
    },

    /// Declared dependencies contain a cycle.
    #[error("Dependency cycle between detectors: {0:?}")]
    DependencyCycle(Vec<DetectorId>),

    /// Replay file version does not match this build.
    #[error("Replay version mismatch: expected {expected}, got {found}")]
    ReplayVersionMismatch {
        /// Supported version.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },

    /// The replay stream could not be decoded.
    #[error("Malformed replay: {0}")]
    MalformedReplay(String),

    /// A replay file could not be read or written.
    #[error("Replay file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration text could not be parsed.
    #[error("Failed to parse analysis config: {0}")]
    ConfigParse(String),
}

//! # Sentinel Core
//!
//! Statistics-collection and cheat-scoring engine for shooter-match replays.
//!
//! This crate contains **only** analysis logic:
//! - No demo decoding (replays arrive pre-decoded as [`replay::TickFrame`]s)
//! - No rendering or report formatting
//! - No network access
//!
//! A run feeds one complete replay, in tick order, through a [`pipeline::Pipeline`]
//! of [`pipeline::Detector`]s. Each detector writes per-player metrics into
//! [`metrics::DemoStats`]; the composite scorer runs last and turns them into a
//! cheat likelihood.
//!
//! ## Crate Structure
//!
//! - [`metrics`] - Tagged metric values grouped by category and key
//! - [`replay`] - Pre-decoded replay model and the [`replay::ReplaySource`] trait
//! - [`pipeline`] - Detector contract, execution order, run loop
//! - [`detectors`] - Built-in detectors and the composite scorer
//! - [`config`] - Tuning parameters, loadable from RON
//! - [`math`] - Angle geometry and order statistics
//! - [`weapons`] - Weapon catalogue and recoil patterns

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod detectors;
pub mod error;
pub mod math;
pub mod metrics;
pub mod pipeline;
pub mod replay;
pub mod weapons;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::AnalysisConfig;
    pub use crate::detectors::{
        CompositeScorer, GameModeDetector, HeadshotDetector, ReactionDetector, RecoilDetector,
        RecoilRating, SnapDetector, WeaponUsageDetector,
    };
    pub use crate::error::{AnalysisError, Result};
    pub use crate::math::{Vec3, ViewAngles};
    pub use crate::metrics::{
        AimKey, AntiCheatKey, Category, DemoStats, GameInfoKey, GameMode, KillKey, Metric,
        MetricKey, MetricValue, PlayerStats, ReactionKey, RecoilKey, WeaponKey,
    };
    pub use crate::pipeline::{
        AnalysisResults, Detector, DetectorId, EventContext, Pipeline, Subscriptions,
    };
    pub use crate::replay::{
        EventKind, GameEvent, PlayerId, PlayerRef, PlayerSnapshot, Replay, ReplayHeader,
        ReplaySource, Team, TickFrame,
    };
    pub use crate::weapons::Weapon;
}

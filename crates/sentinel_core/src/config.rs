//! Analysis tuning parameters.
//!
//! Every section defaults to the hand-tuned constants the detectors were
//! calibrated with. A RON file may override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Aim-snap detector parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// View samples kept per player.
    pub history_capacity: usize,
    /// Samples required before a kill is analyzed.
    pub min_history: usize,
    /// Per-tick movement below which aim counts as settled, in degrees.
    pub settle_threshold_deg: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            history_capacity: 40,
            min_history: 5,
            settle_threshold_deg: 0.2,
        }
    }
}

/// Reaction-time detector parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    /// Full field-of-view cone in degrees.
    pub fov_degrees: f64,
    /// Reactions slower than this are discarded, in ms.
    pub max_reaction_ms: f64,
    /// Samples required before statistics are written.
    pub min_samples: usize,
    /// Reactions at or below this count as "fast", in ms.
    pub fast_reaction_ms: f64,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 5.0,
            max_reaction_ms: 2000.0,
            min_samples: 5,
            fast_reaction_ms: 100.0,
        }
    }
}

/// Recoil-control detector parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoilConfig {
    /// Largest tick gap between shots of one burst.
    pub max_gap_ticks: u64,
    /// Shots a burst needs to be counted.
    pub min_burst_size: u32,
    /// First bullet index compared against the pattern.
    pub first_counted_bullet: u32,
    /// Last bullet index compared against the pattern.
    pub max_tracked_bullet: u32,
    /// Counted bullets required before scoring.
    pub min_counted_bullets: u64,
    /// Counted bursts required before scoring.
    pub min_bursts: u64,
    /// Mean error at or below which control is "suspiciously perfect", in degrees.
    pub perfect_threshold_deg: f64,
    /// Mean error at or below which control is "very good", in degrees.
    pub good_threshold_deg: f64,
    /// Mean error at or above which control is "poor", in degrees.
    pub poor_threshold_deg: f64,
}

impl Default for RecoilConfig {
    fn default() -> Self {
        Self {
            max_gap_ticks: 6,
            min_burst_size: 4,
            first_counted_bullet: 4,
            max_tracked_bullet: 30,
            min_counted_bullets: 5,
            min_bursts: 1,
            perfect_threshold_deg: 0.3,
            good_threshold_deg: 0.7,
            poor_threshold_deg: 1.0,
        }
    }
}

/// Component weights of the composite score. Should sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ScoreWeights {
    pub headshot: f64,
    pub snap: f64,
    pub reaction: f64,
    pub recoil: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            headshot: 0.45,
            snap: 0.25,
            reaction: 0.15,
            recoil: 0.15,
        }
    }
}

impl ScoreWeights {
    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.headshot + self.snap + self.reaction + self.recoil
    }
}

/// Composite scorer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Kills required for the headshot component.
    pub min_kills: i64,
    /// Snaps required for the snap component.
    pub min_snaps: i64,
    /// Samples required for the reaction component.
    pub min_reaction_samples: i64,
    /// Headshot percentage scoring 0.
    pub headshot_baseline: f64,
    /// Headshot percentage scoring 1.
    pub headshot_extreme: f64,
    /// P95 snap velocity scoring 0, in degrees/ms.
    pub snap_baseline: f64,
    /// P95 snap velocity scoring 1, in degrees/ms.
    pub snap_extreme: f64,
    /// P10 reaction scoring 0, in ms.
    pub reaction_baseline_ms: f64,
    /// P10 reaction scoring 1, in ms.
    pub reaction_extreme_ms: f64,
    /// Component weights.
    pub weights: ScoreWeights,
    /// Likelihood at or above which a player is flagged.
    pub flag_threshold: f64,
    /// Multiplier applied by a kill-count boost.
    pub boost_factor: f64,
    /// Kills above which a Wingman player is boosted.
    pub wingman_kill_threshold: i64,
    /// Kills above which a Competitive player is boosted.
    pub competitive_kill_threshold: i64,
    /// Rounds up to which a Competitive match counts as regulation.
    pub regulation_rounds: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_kills: 30,
            min_snaps: 5,
            min_reaction_samples: 5,
            headshot_baseline: 55.0,
            headshot_extreme: 75.0,
            snap_baseline: 2.0,
            snap_extreme: 3.5,
            reaction_baseline_ms: 120.0,
            reaction_extreme_ms: 60.0,
            weights: ScoreWeights::default(),
            flag_threshold: 55.0,
            boost_factor: 1.2,
            wingman_kill_threshold: 15,
            competitive_kill_threshold: 39,
            regulation_rounds: 30,
        }
    }
}

impl ScoringConfig {
    /// Whether a likelihood reaches the flag threshold.
    #[must_use]
    pub fn flags(&self, likelihood: f64) -> bool {
        likelihood >= self.flag_threshold
    }
}

/// Game-mode detector parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameModeConfig {
    /// Matches with at most this many players are Wingman.
    pub wingman_max_players: usize,
}

impl Default for GameModeConfig {
    fn default() -> Self {
        Self {
            wingman_max_players: 4,
        }
    }
}

/// Full analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct AnalysisConfig {
    pub snap: SnapConfig,
    pub reaction: ReactionConfig,
    pub recoil: RecoilConfig,
    pub scoring: ScoringConfig,
    pub game_mode: GameModeConfig,
}

impl AnalysisConfig {
    /// Parse from RON text. Missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns [`AnalysisError::ConfigParse`] if the text is not valid RON for this type.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        ron::from_str(ron).map_err(|e| AnalysisError::ConfigParse(e.to_string()))
    }

    /// Render as pretty RON.
    ///
    /// # Errors
    /// Returns [`AnalysisError::ConfigParse`] if serialization fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| AnalysisError::ConfigParse(e.to_string()))
    }
}

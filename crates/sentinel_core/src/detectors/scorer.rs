//! Composite cheat likelihood.
//!
//! Four component scores in [0, 1], each zeroed when its sample-size guard is not
//! met, are blended with fixed weights. The blend is scaled to a percentage, boosted
//! for unusually high kill counts, and compared against the flag threshold.

use tracing::debug;

use crate::config::ScoringConfig;
use crate::math::{clamp01, linear_score};
use crate::metrics::{
    AimKey, AntiCheatKey, Category, DemoStats, GameMode, KillKey, MetricValue, PlayerStats,
    ReactionKey, RecoilKey,
};
use crate::pipeline::{Detector, DetectorId};

/// Component scores and the blended result for one player.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CheatScore {
    /// Headshot component.
    pub headshot: f64,
    /// Snap velocity component.
    pub snap: f64,
    /// Reaction time component.
    pub reaction: f64,
    /// Recoil control component.
    pub recoil: f64,
    /// Weighted sum of the components.
    pub total: f64,
    /// Boost applied to the likelihood, if any.
    pub boost: Option<Boost>,
    /// Final likelihood in percent.
    pub likelihood: f64,
}

/// Kill-count boost variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boost {
    /// Wingman with many kills.
    Wingman,
    /// Regulation-length Competitive with many kills.
    Competitive,
}

/// Blends detector outputs into a cheat likelihood.
#[derive(Debug)]
pub struct CompositeScorer {
    config: ScoringConfig,
}

impl CompositeScorer {
    /// Create the scorer.
    #[must_use]
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Score one player given the match mode and round count.
    #[must_use]
    pub fn score(&self, player: &PlayerStats, mode: GameMode, rounds: u32) -> CheatScore {
        let c = &self.config;
        let kills = player.get_int(KillKey::TotalKills).unwrap_or(0);
        let hs_pct = player.get_float(KillKey::HeadshotPercentage).unwrap_or(0.0);
        let p95_snap = player.get_float(AimKey::P95SnapVelocity).unwrap_or(0.0);
        let snaps = player.get_int(AimKey::SnapCount).unwrap_or(0);
        let p10_reaction = player.get_float(ReactionKey::P10ReactionTime).unwrap_or(0.0);
        let reaction_samples = player.get_int(ReactionKey::ReactionSamples).unwrap_or(0);

        let headshot = if kills >= c.min_kills {
            linear_score(hs_pct, c.headshot_baseline, c.headshot_extreme)
        } else {
            0.0
        };
        let snap = if snaps >= c.min_snaps {
            linear_score(p95_snap, c.snap_baseline, c.snap_extreme)
        } else {
            0.0
        };
        let reaction = if reaction_samples >= c.min_reaction_samples {
            linear_score(p10_reaction, c.reaction_baseline_ms, c.reaction_extreme_ms)
        } else {
            0.0
        };
        let recoil = clamp01(player.get_float(RecoilKey::RecoilScore).unwrap_or(0.0));

        let w = &c.weights;
        let total = clamp01(
            headshot * w.headshot + snap * w.snap + reaction * w.reaction + recoil * w.recoil,
        );

        let boost = match mode {
            GameMode::Wingman if kills > c.wingman_kill_threshold => Some(Boost::Wingman),
            GameMode::Competitive
                if kills > c.competitive_kill_threshold && rounds <= c.regulation_rounds =>
            {
                Some(Boost::Competitive)
            }
            _ => None,
        };
        let factor = if boost.is_some() { c.boost_factor } else { 1.0 };
        let likelihood = (total * 100.0 * factor).clamp(0.0, 100.0);

        CheatScore {
            headshot,
            snap,
            reaction,
            recoil,
            total,
            boost,
            likelihood,
        }
    }
}

impl Detector for CompositeScorer {
    fn id(&self) -> DetectorId {
        DetectorId::SCORER
    }

    fn name(&self) -> &'static str {
        "Cheat Likelihood"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::AntiCheat]
    }

    fn depends_on(&self) -> &'static [DetectorId] {
        &[
            DetectorId::WEAPON_USAGE,
            DetectorId::HEADSHOT,
            DetectorId::SNAP,
            DetectorId::REACTION,
            DetectorId::RECOIL,
            DetectorId::GAME_MODE,
        ]
    }

    fn finalize(&mut self, stats: &mut DemoStats) {
        let mode = stats.match_info.game_mode.unwrap_or(GameMode::Competitive);
        let rounds = match stats.match_info.round_count {
            0 => self.config.regulation_rounds,
            n => n,
        };

        for player in stats.players_mut() {
            let score = self.score(player, mode, rounds);
            let flagged = self.config.flags(score.likelihood);
            debug!(
                player = player.name(),
                likelihood = score.likelihood,
                flagged,
                "Player scored"
            );

            player.record(AntiCheatKey::HsScore, MetricValue::Float(score.headshot));
            player.record(AntiCheatKey::SnapScore, MetricValue::Float(score.snap));
            player.record(AntiCheatKey::ReactionScore, MetricValue::Float(score.reaction));
            player.record(AntiCheatKey::RecoilScore, MetricValue::Float(score.recoil));
            player.record(AntiCheatKey::TotalCheatScore, MetricValue::Float(score.total));
            match score.boost {
                Some(Boost::Wingman) => player.record(
                    AntiCheatKey::WingmanBoost,
                    MetricValue::Float(self.config.boost_factor),
                ),
                Some(Boost::Competitive) => player.record(
                    AntiCheatKey::CompetitiveBoost,
                    MetricValue::Float(self.config.boost_factor),
                ),
                None => {}
            }
            player.record(
                AntiCheatKey::CheatLikelihood,
                MetricValue::Percentage(score.likelihood),
            );
            player.record(
                AntiCheatKey::Cheater,
                MetricValue::Text(if flagged { "Yes" } else { "No" }.to_string()),
            );
        }
    }
}

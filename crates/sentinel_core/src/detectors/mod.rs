//! Built-in detectors.
//!
//! Each detector owns its transient per-player state and writes metrics into
//! [`DemoStats`](crate::metrics::DemoStats). The [`scorer`] reads what the others
//! wrote, so it declares a dependency on every one of them.

pub mod game_mode;
pub mod headshot;
pub mod reaction;
pub mod recoil;
pub mod scorer;
pub mod snap;
pub mod weapon_usage;

use tracing::warn;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::pipeline::{Detector, DetectorId};
use crate::replay::{GameEvent, PlayerRef};

pub use game_mode::GameModeDetector;
pub use headshot::HeadshotDetector;
pub use reaction::ReactionDetector;
pub use recoil::{recoil_efficiency, RecoilDetector, RecoilRating};
pub use scorer::{Boost, CheatScore, CompositeScorer};
pub use snap::SnapDetector;
pub use weapon_usage::WeaponUsageDetector;

/// Every built-in detector, in registration order.
#[must_use]
pub fn default_detectors(config: &AnalysisConfig) -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(WeaponUsageDetector::new()),
        Box::new(HeadshotDetector::new()),
        Box::new(SnapDetector::new(&config.snap)),
        Box::new(ReactionDetector::new(&config.reaction, &config.scoring)),
        Box::new(RecoilDetector::new(&config.recoil)),
        Box::new(GameModeDetector::new(&config.game_mode)),
        Box::new(CompositeScorer::new(&config.scoring)),
    ]
}

/// Log a metrics-store failure and drop the metric.
pub(crate) fn skip_on_error<T>(detector: DetectorId, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(%detector, %error, "Skipping metric");
            None
        }
    }
}

/// Killer and victim of a kill between two distinct, valid players on different teams.
pub(crate) fn opponent_kill(event: &GameEvent) -> Option<(&PlayerRef, &PlayerRef, bool)> {
    let GameEvent::Kill {
        killer: Some(killer),
        victim: Some(victim),
        headshot,
        ..
    } = event
    else {
        return None;
    };
    let valid = killer.id.is_valid()
        && victim.id.is_valid()
        && killer.id != victim.id
        && killer.team != victim.team;
    valid.then_some((killer, victim, *headshot))
}

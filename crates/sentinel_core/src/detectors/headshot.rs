//! Kill and headshot counting.

use crate::metrics::{Category, DemoStats, KillKey, MetricValue};
use crate::pipeline::{Detector, DetectorId, EventContext, Subscriptions};
use crate::replay::{EventKind, GameEvent, ReplayHeader};

use super::{opponent_kill, skip_on_error};

/// Counts kills on opponents and the share that were headshots.
#[derive(Debug, Default)]
pub struct HeadshotDetector;

impl HeadshotDetector {
    /// Create the detector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Detector for HeadshotDetector {
    fn id(&self) -> DetectorId {
        DetectorId::HEADSHOT
    }

    fn name(&self) -> &'static str {
        "Headshot Percentage"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Kills]
    }

    fn initialize(&mut self, _: &ReplayHeader, subscriptions: &mut Subscriptions, _: &mut DemoStats) {
        subscriptions.subscribe(EventKind::Kill);
    }

    fn on_event(&mut self, event: &GameEvent, _ctx: &EventContext<'_>, stats: &mut DemoStats) {
        let Some((killer, _victim, headshot)) = opponent_kill(event) else {
            return;
        };
        let Some(player) = stats.player_mut(killer.id) else {
            return;
        };
        skip_on_error(self.id(), player.increment_int(KillKey::TotalKills));
        if headshot {
            skip_on_error(self.id(), player.increment_int(KillKey::HeadshotKills));
        }
    }

    fn finalize(&mut self, stats: &mut DemoStats) {
        for player in stats.players_mut() {
            let kills = player.get_int(KillKey::TotalKills).unwrap_or(0);
            if kills <= 0 {
                continue;
            }
            let headshots = player.get_int(KillKey::HeadshotKills).unwrap_or(0);
            #[allow(clippy::cast_precision_loss)]
            let percentage = headshots as f64 / kills as f64 * 100.0;
            player.record(KillKey::HeadshotPercentage, MetricValue::Percentage(percentage));
        }
    }
}

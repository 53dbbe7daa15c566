//! Round counting and game-mode inference.

use std::collections::BTreeSet;

use tracing::info;

use crate::config::GameModeConfig;
use crate::metrics::{Category, DemoStats, GameInfoKey, GameMode, MetricValue};
use crate::pipeline::{Detector, DetectorId, EventContext, Subscriptions};
use crate::replay::{EventKind, GameEvent, PlayerId, ReplayHeader, TickFrame};

/// Counts rounds and infers Wingman or Competitive from the roster size.
#[derive(Debug)]
pub struct GameModeDetector {
    config: GameModeConfig,
    rounds: u32,
    roster: BTreeSet<PlayerId>,
}

impl GameModeDetector {
    /// Create the detector.
    #[must_use]
    pub fn new(config: &GameModeConfig) -> Self {
        Self {
            config: config.clone(),
            rounds: 0,
            roster: BTreeSet::new(),
        }
    }

    /// Mode for a roster of `players` participants, `None` when nobody played.
    #[must_use]
    pub fn infer(&self, players: usize) -> Option<GameMode> {
        match players {
            0 => None,
            n if n <= self.config.wingman_max_players => Some(GameMode::Wingman),
            _ => Some(GameMode::Competitive),
        }
    }
}

impl Detector for GameModeDetector {
    fn id(&self) -> DetectorId {
        DetectorId::GAME_MODE
    }

    fn name(&self) -> &'static str {
        "Game Mode"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::GameInfo]
    }

    fn initialize(&mut self, _: &ReplayHeader, subscriptions: &mut Subscriptions, _: &mut DemoStats) {
        subscriptions.subscribe(EventKind::RoundEnd);
    }

    fn on_tick(&mut self, frame: &TickFrame, _stats: &mut DemoStats) {
        self.roster.extend(
            frame
                .players
                .iter()
                .filter(|p| p.team.is_playing() && p.id.is_valid())
                .map(|p| p.id),
        );
    }

    fn on_event(&mut self, event: &GameEvent, _ctx: &EventContext<'_>, _stats: &mut DemoStats) {
        if matches!(event, GameEvent::RoundEnd) {
            self.rounds += 1;
        }
    }

    fn finalize(&mut self, stats: &mut DemoStats) {
        let mode = self.infer(self.roster.len());
        stats.match_info.round_count = self.rounds;
        stats.match_info.game_mode = mode;
        info!(
            rounds = self.rounds,
            players = self.roster.len(),
            mode = mode.map_or("unknown", GameMode::as_str),
            "Match info resolved"
        );

        for player in stats.players_mut() {
            player.record(
                GameInfoKey::RoundCount,
                MetricValue::Integer(i64::from(self.rounds)),
            );
            if let Some(mode) = mode {
                player.record(GameInfoKey::GameMode, MetricValue::Text(mode.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::{snapshot, stats};
    use crate::replay::Team;

    fn roster(n: u64) -> TickFrame {
        TickFrame {
            tick: 1,
            players: (1..=n)
                .map(|id| {
                    let team = if id % 2 == 0 {
                        Team::Terrorist
                    } else {
                        Team::CounterTerrorist
                    };
                    snapshot(id, team)
                })
                .collect(),
            events: vec![],
        }
    }

    fn run(players: u64, rounds: u32) -> DemoStats {
        let mut stats = stats();
        let frame = roster(players);
        for p in &frame.players {
            stats.observe(p.id, &p.name);
        }
        let mut detector = GameModeDetector::new(&GameModeConfig::default());
        detector.on_tick(&frame, &mut stats);
        let ctx = EventContext { tick: 1, players: &[] };
        for _ in 0..rounds {
            detector.on_event(&GameEvent::RoundEnd, &ctx, &mut stats);
        }
        detector.finalize(&mut stats);
        stats
    }

    #[test]
    fn test_wingman_roster() {
        let stats = run(4, 16);
        assert_eq!(stats.match_info.game_mode, Some(GameMode::Wingman));
        assert_eq!(stats.match_info.round_count, 16);
        let p = stats.player(PlayerId(1)).unwrap();
        assert_eq!(p.get_text(GameInfoKey::GameMode), Some("Wingman"));
        assert_eq!(p.get_int(GameInfoKey::RoundCount), Some(16));
    }

    #[test]
    fn test_competitive_roster() {
        let stats = run(10, 24);
        assert_eq!(stats.match_info.game_mode, Some(GameMode::Competitive));
    }

    #[test]
    fn test_empty_roster_unknown() {
        let stats = run(0, 0);
        assert_eq!(stats.match_info.game_mode, None);
    }
}

//! Reaction time between an opponent entering view and the next shot.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::{ReactionConfig, ScoringConfig};
use crate::math::{linear_score, sort_samples, SampleSummary};
use crate::metrics::{Category, DemoStats, MetricValue, ReactionKey};
use crate::pipeline::{Detector, DetectorId, EventContext, Subscriptions};
use crate::replay::{EventKind, GameEvent, PlayerId, PlayerSnapshot, ReplayHeader, TickFrame};

use super::skip_on_error;

/// Tracks field-of-view entries per attacker and times the shot that follows.
#[derive(Debug)]
pub struct ReactionDetector {
    config: ReactionConfig,
    score_baseline_ms: f64,
    score_extreme_ms: f64,
    cos_half_fov: f64,
    tick_rate: f64,
    /// attacker -> (opponent -> tick the opponent entered view)
    in_view: BTreeMap<PlayerId, BTreeMap<PlayerId, u64>>,
    reactions: BTreeMap<PlayerId, Vec<f64>>,
}

impl ReactionDetector {
    /// Create the detector.
    #[must_use]
    pub fn new(config: &ReactionConfig, scoring: &ScoringConfig) -> Self {
        Self {
            config: config.clone(),
            score_baseline_ms: scoring.reaction_baseline_ms,
            score_extreme_ms: scoring.reaction_extreme_ms,
            cos_half_fov: (config.fov_degrees / 2.0).to_radians().cos(),
            tick_rate: crate::pipeline::DEFAULT_TICK_RATE,
            in_view: BTreeMap::new(),
            reactions: BTreeMap::new(),
        }
    }

    fn sees(&self, attacker: &PlayerSnapshot, opponent: &PlayerSnapshot) -> bool {
        let forward = attacker.view.forward();
        opponent
            .position
            .sub(attacker.position)
            .normalized()
            .is_some_and(|dir| dir.dot(forward) >= self.cos_half_fov)
    }

    fn record_shot(&mut self, shooter: PlayerId, tick: u64, stats: &mut DemoStats) {
        let Some(entries) = self.in_view.remove(&shooter) else {
            return;
        };
        for entered in entries.into_values() {
            #[allow(clippy::cast_precision_loss)]
            let elapsed_ms = tick.saturating_sub(entered) as f64 / self.tick_rate * 1000.0;
            if elapsed_ms > self.config.max_reaction_ms {
                continue;
            }
            debug!(%shooter, elapsed_ms, "Reaction recorded");
            self.reactions.entry(shooter).or_default().push(elapsed_ms);
            if let Some(player) = stats.player_mut(shooter) {
                skip_on_error(self.id(), player.increment_int(ReactionKey::ShotsAfterFovEntry));
            }
        }
    }

    /// Drop everything a kill invalidates: the victim on both sides, and the
    /// killer's pending entries.
    fn forget(&mut self, killer: Option<PlayerId>, victim: PlayerId) {
        self.in_view.remove(&victim);
        if let Some(killer) = killer {
            self.in_view.remove(&killer);
        }
        for entries in self.in_view.values_mut() {
            entries.remove(&victim);
        }
    }
}

impl Detector for ReactionDetector {
    fn id(&self) -> DetectorId {
        DetectorId::REACTION
    }

    fn name(&self) -> &'static str {
        "Reaction Time"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Reaction]
    }

    fn initialize(
        &mut self,
        _header: &ReplayHeader,
        subscriptions: &mut Subscriptions,
        stats: &mut DemoStats,
    ) {
        self.tick_rate = stats.info.tick_rate;
        subscriptions.subscribe(EventKind::WeaponFire);
        subscriptions.subscribe(EventKind::Kill);
        subscriptions.subscribe(EventKind::RoundEnd);
    }

    fn on_tick(&mut self, frame: &TickFrame, _stats: &mut DemoStats) {
        let live: Vec<&PlayerSnapshot> = frame
            .players
            .iter()
            .filter(|p| p.alive && p.team.is_playing() && p.id.is_valid())
            .collect();
        let live_ids: BTreeSet<PlayerId> = live.iter().map(|p| p.id).collect();
        self.in_view.retain(|attacker, _| live_ids.contains(attacker));

        for attacker in &live {
            let visible: BTreeSet<PlayerId> = live
                .iter()
                .filter(|opponent| attacker.team.opposes(opponent.team))
                .filter(|opponent| self.sees(attacker, opponent))
                .map(|opponent| opponent.id)
                .collect();

            let entries = self.in_view.entry(attacker.id).or_default();
            entries.retain(|opponent, _| visible.contains(opponent));
            for opponent in visible {
                entries.entry(opponent).or_insert(frame.tick);
            }
        }
    }

    fn on_event(&mut self, event: &GameEvent, ctx: &EventContext<'_>, stats: &mut DemoStats) {
        match event {
            GameEvent::WeaponFire { shooter, .. } => {
                self.record_shot(shooter.id, ctx.tick, stats);
            }
            GameEvent::Kill {
                killer,
                victim: Some(victim),
                ..
            } => self.forget(killer.as_ref().map(|k| k.id), victim.id),
            GameEvent::RoundEnd => self.in_view.clear(),
            _ => {}
        }
    }

    fn finalize(&mut self, stats: &mut DemoStats) {
        for (id, reactions) in &self.reactions {
            if reactions.len() < self.config.min_samples {
                continue;
            }
            let Some(player) = stats.player_mut(*id) else {
                continue;
            };
            let mut sorted = reactions.clone();
            sort_samples(&mut sorted);
            let Some(summary) = SampleSummary::of_sorted(&sorted) else {
                continue;
            };
            let p10 = SampleSummary::quantile(&sorted, 0.1);
            let fast = sorted
                .iter()
                .filter(|ms| **ms <= self.config.fast_reaction_ms)
                .count();
            #[allow(clippy::cast_precision_loss)]
            let fast_pct = fast as f64 / sorted.len() as f64 * 100.0;
            let score = linear_score(p10, self.score_baseline_ms, self.score_extreme_ms);

            player.record(ReactionKey::MedianReactionTime, MetricValue::Float(summary.median));
            player.record(ReactionKey::P10ReactionTime, MetricValue::Float(p10));
            player.record(ReactionKey::Sub100msRatio, MetricValue::Percentage(fast_pct));
            player.record(
                ReactionKey::ReactionSamples,
                MetricValue::Integer(i64::try_from(summary.count).unwrap_or(i64::MAX)),
            );
            player.record(ReactionKey::ReactionCheatScore, MetricValue::Float(score));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::{player_ref, snapshot, stats};
    use crate::math::{Vec3, ViewAngles};
    use crate::replay::Team;
    use crate::weapons::Weapon;

    /// Attacker 1 at the origin, opponent 2 straight ahead (+x) when `ahead`.
    fn frame(tick: u64, ahead: bool) -> TickFrame {
        let attacker = snapshot(1, Team::Terrorist);
        let mut opponent = snapshot(2, Team::CounterTerrorist);
        opponent.position = if ahead {
            Vec3::new(500.0, 0.0, 0.0)
        } else {
            Vec3::new(0.0, 500.0, 0.0)
        };
        TickFrame {
            tick,
            players: vec![attacker, opponent],
            events: vec![],
        }
    }

    fn fire(detector: &mut ReactionDetector, tick: u64, stats: &mut DemoStats) {
        let ctx = EventContext { tick, players: &[] };
        let event = GameEvent::WeaponFire {
            shooter: player_ref(1, Team::Terrorist),
            weapon: Weapon::Ak47,
        };
        detector.on_event(&event, &ctx, stats);
    }

    fn setup() -> (ReactionDetector, DemoStats) {
        let mut stats = stats();
        stats.observe(PlayerId(1), "player1");
        stats.observe(PlayerId(2), "player2");
        let mut detector = ReactionDetector::new(&ReactionConfig::default(), &ScoringConfig::default());
        detector.initialize(&ReplayHeader::default(), &mut Subscriptions::default(), &mut stats);
        (detector, stats)
    }

    #[test]
    fn test_reaction_at_sixty_four_tick() {
        let (mut detector, mut stats) = setup();
        detector.on_tick(&frame(100, true), &mut stats);
        for tick in 101..=106 {
            detector.on_tick(&frame(tick, true), &mut stats);
        }
        fire(&mut detector, 106, &mut stats);
        assert_eq!(detector.reactions[&PlayerId(1)], vec![93.75]);
        assert_eq!(
            stats.player(PlayerId(1)).unwrap().get_int(ReactionKey::ShotsAfterFovEntry),
            Some(1)
        );
    }

    #[test]
    fn test_leaving_view_resets_entry() {
        let (mut detector, mut stats) = setup();
        detector.on_tick(&frame(1, true), &mut stats);
        detector.on_tick(&frame(2, false), &mut stats);
        detector.on_tick(&frame(10, true), &mut stats);
        fire(&mut detector, 12, &mut stats);
        assert_eq!(detector.reactions[&PlayerId(1)], vec![31.25]);
    }

    #[test]
    fn test_shot_clears_tracking_and_slow_reactions_dropped() {
        let (mut detector, mut stats) = setup();
        detector.on_tick(&frame(1, true), &mut stats);
        fire(&mut detector, 1000, &mut stats);
        assert!(detector.reactions.is_empty());
        fire(&mut detector, 1001, &mut stats);
        assert!(detector.reactions.is_empty());
    }

    #[test]
    fn test_kill_and_round_end_clear() {
        let (mut detector, mut stats) = setup();
        detector.on_tick(&frame(1, true), &mut stats);
        let ctx = EventContext { tick: 1, players: &[] };
        let kill = GameEvent::Kill {
            killer: None,
            victim: Some(player_ref(2, Team::CounterTerrorist)),
            headshot: false,
            weapon: None,
        };
        detector.on_event(&kill, &ctx, &mut stats);
        assert!(detector.in_view[&PlayerId(1)].is_empty());

        detector.on_tick(&frame(2, true), &mut stats);
        detector.on_event(&GameEvent::RoundEnd, &ctx, &mut stats);
        assert!(detector.in_view.is_empty());
    }

    #[test]
    fn test_kill_drops_killer_entries() {
        let (mut detector, mut stats) = setup();
        detector.on_tick(&frame(1, true), &mut stats);
        assert_eq!(detector.in_view[&PlayerId(1)].len(), 1);

        // Player 1 kills a third player; its pending entry on player 2 goes too.
        let ctx = EventContext { tick: 2, players: &[] };
        let kill = GameEvent::Kill {
            killer: Some(player_ref(1, Team::Terrorist)),
            victim: Some(player_ref(3, Team::CounterTerrorist)),
            headshot: true,
            weapon: Some(Weapon::Ak47),
        };
        detector.on_event(&kill, &ctx, &mut stats);
        assert!(detector.in_view.get(&PlayerId(1)).is_none());

        fire(&mut detector, 4, &mut stats);
        assert!(detector.reactions.is_empty());
    }

    #[test]
    fn test_statistics_and_score() {
        let (mut detector, mut stats) = setup();
        detector
            .reactions
            .insert(PlayerId(1), vec![150.0, 90.0, 80.0, 200.0, 95.0, 300.0, 110.0, 120.0, 85.0, 130.0]);
        detector.finalize(&mut stats);

        let p = stats.player(PlayerId(1)).unwrap();
        // Sorted: 80 85 90 95 110 120 130 150 200 300
        assert_eq!(p.get_float(ReactionKey::P10ReactionTime), Some(85.0));
        assert_eq!(p.get_float(ReactionKey::MedianReactionTime), Some(120.0));
        assert_eq!(p.get_float(ReactionKey::Sub100msRatio), Some(40.0));
        assert_eq!(p.get_int(ReactionKey::ReactionSamples), Some(10));
        let score = p.get_float(ReactionKey::ReactionCheatScore).unwrap();
        assert!((score - 35.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_samples() {
        let (mut detector, mut stats) = setup();
        detector.reactions.insert(PlayerId(1), vec![90.0; 4]);
        detector.finalize(&mut stats);
        assert!(stats.player(PlayerId(1)).unwrap().get(ReactionKey::P10ReactionTime).is_none());
    }

    #[test]
    fn test_view_direction_matters() {
        let (mut detector, mut stats) = setup();
        let mut f = frame(1, true);
        f.players[0].view = ViewAngles::new(90.0, 0.0);
        detector.on_tick(&f, &mut stats);
        assert!(detector.in_view[&PlayerId(1)].is_empty());
    }
}

//! Aim-snap velocity at the moment of a kill.
//!
//! Every tick the view direction of each live player goes into a fixed-size ring
//! buffer. On a kill the killer's history is walked backward from the kill until
//! two consecutive samples differ by less than the settle threshold; that earlier
//! sample is where the snap started. The angular distance from there to the kill
//! aim, divided by the elapsed time, is the snap velocity in degrees per
//! millisecond.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::SnapConfig;
use crate::math::{angular_distance, sort_samples, SampleSummary, ViewAngles};
use crate::metrics::{AimKey, Category, DemoStats, MetricValue};
use crate::pipeline::{Detector, DetectorId, EventContext, Subscriptions};
use crate::replay::{EventKind, GameEvent, PlayerId, ReplayHeader, TickFrame};

use super::{opponent_kill, skip_on_error};

/// One recorded view direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSample {
    /// Tick of the sample.
    pub tick: u64,
    /// View direction.
    pub view: ViewAngles,
}

/// Fixed-capacity ring buffer of view samples, oldest overwritten first.
#[derive(Debug, Clone)]
pub struct ViewHistory {
    samples: Vec<ViewSample>,
    next: usize,
    capacity: usize,
}

impl ViewHistory {
    /// Create an empty history. Capacity is at least 1.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            next: 0,
            capacity,
        }
    }

    /// Record a sample, overwriting the oldest when full.
    pub fn push(&mut self, sample: ViewSample) {
        if self.samples.len() < self.capacity {
            self.samples.push(sample);
        } else {
            self.samples[self.next] = sample;
        }
        self.next = (self.next + 1) % self.capacity;
    }

    /// Number of stored samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples from most recent to oldest.
    pub fn recent(&self) -> impl Iterator<Item = &ViewSample> {
        let len = self.samples.len();
        let newest = (self.next + self.capacity - 1) % self.capacity;
        (0..len).map(move |i| &self.samples[(newest + len - i) % len.max(1)])
    }
}

/// Measures how fast aim moved onto a target before each kill.
#[derive(Debug)]
pub struct SnapDetector {
    config: SnapConfig,
    tick_rate: f64,
    histories: BTreeMap<PlayerId, ViewHistory>,
    velocities: BTreeMap<PlayerId, Vec<f64>>,
}

impl SnapDetector {
    /// Create the detector.
    #[must_use]
    pub fn new(config: &SnapConfig) -> Self {
        Self {
            config: config.clone(),
            tick_rate: crate::pipeline::DEFAULT_TICK_RATE,
            histories: BTreeMap::new(),
            velocities: BTreeMap::new(),
        }
    }

    /// Snap velocity for a history, or `None` when the history is too short or
    /// the aim did not move.
    fn snap_velocity(&self, history: &ViewHistory) -> Option<f64> {
        let samples: Vec<&ViewSample> = history.recent().collect();
        if samples.len() < self.config.min_history.max(2) {
            return None;
        }
        let end = samples[0];
        // The newest pair ends on the kill sample itself; a one-tick hold before
        // the shot must not count as the settle point.
        let start = samples
            .windows(2)
            .skip(1)
            .find(|pair| angular_distance(pair[0].view, pair[1].view) < self.config.settle_threshold_deg)
            .map_or(samples[samples.len() - 1], |pair| pair[1]);

        let delta = angular_distance(start.view, end.view);
        #[allow(clippy::cast_precision_loss)]
        let ticks = end.tick.saturating_sub(start.tick).max(1) as f64;
        let elapsed_ms = ticks / self.tick_rate * 1000.0;
        let velocity = delta / elapsed_ms;

        debug!(
            start_tick = start.tick,
            end_tick = end.tick,
            delta,
            velocity,
            "Snap measured"
        );
        (velocity.is_finite() && velocity > 0.0).then_some(velocity)
    }
}

impl Detector for SnapDetector {
    fn id(&self) -> DetectorId {
        DetectorId::SNAP
    }

    fn name(&self) -> &'static str {
        "Aim Snap Velocity"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Aiming]
    }

    fn initialize(
        &mut self,
        _header: &ReplayHeader,
        subscriptions: &mut Subscriptions,
        stats: &mut DemoStats,
    ) {
        self.tick_rate = stats.info.tick_rate;
        subscriptions.subscribe(EventKind::Kill);
    }

    fn on_tick(&mut self, frame: &TickFrame, _stats: &mut DemoStats) {
        for snapshot in frame
            .players
            .iter()
            .filter(|p| p.alive && p.team.is_playing() && p.id.is_valid())
        {
            let capacity = self.config.history_capacity;
            self.histories
                .entry(snapshot.id)
                .or_insert_with(|| ViewHistory::new(capacity))
                .push(ViewSample {
                    tick: frame.tick,
                    view: snapshot.view,
                });
        }
    }

    fn on_event(&mut self, event: &GameEvent, _ctx: &EventContext<'_>, stats: &mut DemoStats) {
        if let Some((killer, _victim, _)) = opponent_kill(event) {
            if let Some(player) = stats.player_mut(killer.id) {
                skip_on_error(self.id(), player.increment_int(AimKey::SnappedKills));
            }
            if let Some(velocity) = self
                .histories
                .get(&killer.id)
                .and_then(|history| self.snap_velocity(history))
            {
                self.velocities.entry(killer.id).or_default().push(velocity);
            }
        }

        // A new life starts with an empty history.
        if let GameEvent::Kill {
            victim: Some(victim),
            ..
        } = event
        {
            self.histories.remove(&victim.id);
        }
    }

    fn finalize(&mut self, stats: &mut DemoStats) {
        for (id, velocities) in &self.velocities {
            let Some(player) = stats.player_mut(*id) else {
                continue;
            };
            let mut sorted = velocities.clone();
            sort_samples(&mut sorted);
            let Some(summary) = SampleSummary::of_sorted(&sorted) else {
                continue;
            };
            let p95 = SampleSummary::quantile(&sorted, 0.95);

            player.record(AimKey::P95SnapVelocity, MetricValue::Float(p95));
            player.record(AimKey::MedianSnapVelocity, MetricValue::Float(summary.median));
            player.record(AimKey::AvgSnapVelocity, MetricValue::Float(summary.mean));
            player.record(
                AimKey::SnapCount,
                MetricValue::Integer(i64::try_from(summary.count).unwrap_or(i64::MAX)),
            );
        }
    }
}

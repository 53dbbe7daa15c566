//! Spray control against known recoil patterns.
//!
//! Automatic-weapon fire is grouped into bursts. While a burst is open, each shot
//! from the fourth bullet on is compared with where perfect compensation would
//! have put the crosshair (burst start minus the pattern's cumulative offset).
//! Players whose mean error is implausibly low score as suspicious.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::config::RecoilConfig;
use crate::math::{angular_distance, linear_score, ViewAngles};
use crate::metrics::{Category, DemoStats, Metric, MetricValue, RecoilKey};
use crate::pipeline::{Detector, DetectorId, EventContext, Subscriptions};
use crate::replay::{EventKind, GameEvent, PlayerId, ReplayHeader, TickFrame};
use crate::weapons::Weapon;

/// An open burst.
#[derive(Debug, Clone, PartialEq)]
pub struct Burst {
    /// Weapon being sprayed.
    pub weapon: Weapon,
    /// View at the first bullet.
    pub reference: ViewAngles,
    /// 1-based index of the latest bullet.
    pub bullet: u32,
    /// Tick of the latest bullet.
    pub last_tick: u64,
    /// Summed angular error of counted bullets, in degrees.
    pub error_sum: f64,
    /// Bullets compared against the pattern.
    pub counted: u64,
}

/// Per-player spray tracking state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BurstState {
    /// Not spraying.
    #[default]
    Idle,
    /// Spraying.
    InBurst(Burst),
}

/// Accumulated totals of completed bursts.
#[derive(Debug, Clone, Default, PartialEq)]
struct RecoilTotals {
    error_sum: f64,
    counted: u64,
    bursts: u64,
    per_weapon: BTreeMap<Weapon, u64>,
}

/// Qualitative band of a mean recoil error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoilRating {
    /// At or below the perfect threshold.
    SuspiciouslyPerfect,
    /// At or below the good threshold.
    VeryGood,
    /// Below the poor threshold.
    Normal,
    /// At or above the poor threshold.
    Poor,
}

impl RecoilRating {
    /// Band of `mean_error` under `config`.
    #[must_use]
    pub fn classify(mean_error: f64, config: &RecoilConfig) -> Self {
        if mean_error <= config.perfect_threshold_deg {
            RecoilRating::SuspiciouslyPerfect
        } else if mean_error <= config.good_threshold_deg {
            RecoilRating::VeryGood
        } else if mean_error < config.poor_threshold_deg {
            RecoilRating::Normal
        } else {
            RecoilRating::Poor
        }
    }
}

impl fmt::Display for RecoilRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RecoilRating::SuspiciouslyPerfect => "Suspiciously perfect",
            RecoilRating::VeryGood => "Very good",
            RecoilRating::Normal => "Normal",
            RecoilRating::Poor => "Poor",
        };
        f.write_str(text)
    }
}

/// Recoil efficiency in percent: 100 at or below the perfect threshold, 0 at or
/// above the poor threshold, linear in between.
#[must_use]
pub fn recoil_efficiency(mean_error: f64, config: &RecoilConfig) -> f64 {
    linear_score(
        mean_error,
        config.poor_threshold_deg,
        config.perfect_threshold_deg,
    ) * 100.0
}

/// Compares spray trajectories with weapon recoil patterns.
#[derive(Debug)]
pub struct RecoilDetector {
    config: RecoilConfig,
    states: BTreeMap<PlayerId, BurstState>,
    totals: BTreeMap<PlayerId, RecoilTotals>,
}

impl RecoilDetector {
    /// Create the detector.
    #[must_use]
    pub fn new(config: &RecoilConfig) -> Self {
        Self {
            config: config.clone(),
            states: BTreeMap::new(),
            totals: BTreeMap::new(),
        }
    }

    /// Current state for a player.
    #[must_use]
    pub fn state(&self, player: PlayerId) -> &BurstState {
        const IDLE: &BurstState = &BurstState::Idle;
        self.states.get(&player).unwrap_or(IDLE)
    }

    fn on_fire(&mut self, shooter: PlayerId, weapon: Weapon, view: ViewAngles, tick: u64) {
        if !weapon.is_automatic() {
            return;
        }
        self.totals.entry(shooter).or_default();
        let state = std::mem::take(self.states.entry(shooter).or_default());
        let next = match state {
            BurstState::InBurst(mut burst)
                if burst.weapon == weapon
                    && tick.saturating_sub(burst.last_tick) <= self.config.max_gap_ticks =>
            {
                burst.bullet += 1;
                burst.last_tick = tick;
                if (self.config.first_counted_bullet..=self.config.max_tracked_bullet)
                    .contains(&burst.bullet)
                {
                    let offset = weapon.recoil_offset(burst.bullet);
                    let expected = ViewAngles::new(
                        burst.reference.yaw - offset.yaw,
                        burst.reference.pitch - offset.pitch,
                    );
                    burst.error_sum += angular_distance(expected, view);
                    burst.counted += 1;
                }
                burst
            }
            previous => {
                if let BurstState::InBurst(burst) = previous {
                    self.close_burst(shooter, burst);
                }
                Burst {
                    weapon,
                    reference: view,
                    bullet: 1,
                    last_tick: tick,
                    error_sum: 0.0,
                    counted: 0,
                }
            }
        };
        self.states.insert(shooter, BurstState::InBurst(next));
    }

    /// Fold a finished burst into the player's totals if it is long enough.
    fn close_burst(&mut self, player: PlayerId, burst: Burst) {
        if burst.bullet < self.config.min_burst_size || burst.counted == 0 {
            debug!(%player, bullets = burst.bullet, "Burst too short, discarded");
            return;
        }
        debug!(
            %player,
            weapon = %burst.weapon,
            bullets = burst.bullet,
            mean_error = burst.error_sum / burst.counted as f64,
            "Burst closed"
        );
        let totals = self.totals.entry(player).or_default();
        totals.error_sum += burst.error_sum;
        totals.counted += burst.counted;
        totals.bursts += 1;
        *totals.per_weapon.entry(burst.weapon).or_default() += burst.counted;
    }

    fn close_all(&mut self) {
        let open: Vec<(PlayerId, Burst)> = std::mem::take(&mut self.states)
            .into_iter()
            .filter_map(|(id, state)| match state {
                BurstState::InBurst(burst) => Some((id, burst)),
                BurstState::Idle => None,
            })
            .collect();
        for (id, burst) in open {
            self.close_burst(id, burst);
        }
    }
}

impl Detector for RecoilDetector {
    fn id(&self) -> DetectorId {
        DetectorId::RECOIL
    }

    fn name(&self) -> &'static str {
        "Recoil Control"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Recoil]
    }

    fn initialize(&mut self, _: &ReplayHeader, subscriptions: &mut Subscriptions, _: &mut DemoStats) {
        subscriptions.subscribe(EventKind::WeaponFire);
        subscriptions.subscribe(EventKind::Kill);
        subscriptions.subscribe(EventKind::RoundEnd);
    }

    fn on_tick(&mut self, frame: &TickFrame, _stats: &mut DemoStats) {
        let max_gap = self.config.max_gap_ticks;
        let expired: Vec<PlayerId> = self
            .states
            .iter()
            .filter_map(|(id, state)| match state {
                BurstState::InBurst(burst) if frame.tick.saturating_sub(burst.last_tick) > max_gap => {
                    Some(*id)
                }
                _ => None,
            })
            .collect();
        for id in expired {
            if let Some(BurstState::InBurst(burst)) = self.states.remove(&id) {
                self.close_burst(id, burst);
            }
        }
    }

    fn on_event(&mut self, event: &GameEvent, ctx: &EventContext<'_>, _stats: &mut DemoStats) {
        match event {
            GameEvent::WeaponFire { shooter, weapon } => {
                let Some(snapshot) = ctx.player(shooter.id) else {
                    debug!(shooter = %shooter.id, tick = ctx.tick, "Shot without snapshot, ignored");
                    return;
                };
                self.on_fire(shooter.id, *weapon, snapshot.view, ctx.tick);
            }
            GameEvent::Kill {
                victim: Some(victim),
                ..
            } => {
                self.states.remove(&victim.id);
            }
            GameEvent::RoundEnd => self.states.clear(),
            _ => {}
        }
    }

    fn finalize(&mut self, stats: &mut DemoStats) {
        self.close_all();

        for (id, totals) in &self.totals {
            let Some(player) = stats.player_mut(*id) else {
                continue;
            };
            let counted = i64::try_from(totals.counted).unwrap_or(i64::MAX);
            let bursts = i64::try_from(totals.bursts).unwrap_or(i64::MAX);
            player.record(RecoilKey::TotalErrorSum, MetricValue::Float(totals.error_sum));
            player.record(RecoilKey::TotalCountedBullets, MetricValue::Integer(counted));
            player.record(RecoilKey::BurstCount, MetricValue::Integer(bursts));
            for (weapon, bullets) in &totals.per_weapon {
                player.record(
                    RecoilKey::WeaponBullets(*weapon),
                    MetricValue::Integer(i64::try_from(*bullets).unwrap_or(i64::MAX)),
                );
            }

            if totals.counted < self.config.min_counted_bullets
                || totals.bursts < self.config.min_bursts
            {
                player.add(
                    RecoilKey::RecoilInterpretation,
                    Metric::new(
                        MetricValue::Text(format!(
                            "Insufficient data ({} bullets, {} bursts)",
                            totals.counted, totals.bursts
                        )),
                        "Not enough spray data to judge recoil control",
                    ),
                );
                continue;
            }

            #[allow(clippy::cast_precision_loss)]
            let mean = totals.error_sum / totals.counted as f64;
            let efficiency = recoil_efficiency(mean, &self.config);
            let rating = RecoilRating::classify(mean, &self.config);

            player.record(RecoilKey::MeanAngularError, MetricValue::Float(mean));
            player.record(RecoilKey::RecoilEfficiency, MetricValue::Percentage(efficiency));
            player.record(RecoilKey::RecoilScore, MetricValue::Float(efficiency / 100.0));
            player.record(
                RecoilKey::RecoilInterpretation,
                MetricValue::Text(rating.to_string()),
            );
        }
    }
}

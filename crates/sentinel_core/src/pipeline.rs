//! Detector contract and the pipeline that drives it.
//!
//! The pipeline owns every registered detector and pushes the replay through them
//! in three phases:
//!
//! 1. **initialize**: each detector sees the header and may subscribe to event kinds.
//! 2. **feed**: per frame, every tick hook runs first, then each event of the frame
//!    is delivered in stream order to its subscribers.
//! 3. **finalize**: each detector turns accumulated state into metrics.
//!
//! Execution order is a stable topological sort of the declared dependencies, so a
//! detector that reads another's metrics always runs after it.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::detectors;
use crate::error::{AnalysisError, Result};
use crate::metrics::{Category, DemoInfo, DemoStats};
use crate::replay::{EventKind, GameEvent, PlayerSnapshot, ReplayHeader, ReplaySource, TickFrame};

/// Tick rate assumed when the header carries none.
pub const DEFAULT_TICK_RATE: f64 = 64.0;

/// Stable identifier of a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DetectorId(pub &'static str);

impl DetectorId {
    /// Weapon-usage detector.
    pub const WEAPON_USAGE: Self = Self("weapon_usage");
    /// Headshot detector.
    pub const HEADSHOT: Self = Self("headshot");
    /// Aim-snap detector.
    pub const SNAP: Self = Self("snap");
    /// Reaction-time detector.
    pub const REACTION: Self = Self("reaction");
    /// Recoil-control detector.
    pub const RECOIL: Self = Self("recoil");
    /// Game-mode detector.
    pub const GAME_MODE: Self = Self("game_mode");
    /// Composite scorer.
    pub const SCORER: Self = Self("scorer");
}

impl fmt::Display for DetectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Event kinds a detector asked to receive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subscriptions(BTreeSet<EventKind>);

impl Subscriptions {
    /// Request delivery of `kind`.
    pub fn subscribe(&mut self, kind: EventKind) {
        self.0.insert(kind);
    }

    /// Whether `kind` is requested.
    #[must_use]
    pub fn contains(&self, kind: EventKind) -> bool {
        self.0.contains(&kind)
    }

    /// Whether nothing is requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Tick state accompanying an event.
#[derive(Debug, Clone, Copy)]
pub struct EventContext<'a> {
    /// Tick the event occurred on.
    pub tick: u64,
    /// Snapshots of that tick.
    pub players: &'a [PlayerSnapshot],
}

impl EventContext<'_> {
    /// Snapshot of a player on the event's tick.
    #[must_use]
    pub fn player(&self, id: crate::replay::PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.id == id)
    }
}

/// A unit of analysis driven by the [`Pipeline`].
///
/// Hooks never fail: a metrics-store error inside a hook is logged and the metric
/// skipped. `finalize` may run more than once and must leave metrics unchanged
/// when no input arrived in between.
pub trait Detector {
    /// Stable identifier.
    fn id(&self) -> DetectorId;

    /// Display name.
    fn name(&self) -> &'static str;

    /// Categories this detector may write.
    fn categories(&self) -> &'static [Category];

    /// Detectors whose metrics this one reads.
    fn depends_on(&self) -> &'static [DetectorId] {
        &[]
    }

    /// Called once before the first frame.
    fn initialize(
        &mut self,
        _header: &ReplayHeader,
        _subscriptions: &mut Subscriptions,
        _stats: &mut DemoStats,
    ) {
    }

    /// Called for every frame, before the frame's events.
    fn on_tick(&mut self, _frame: &TickFrame, _stats: &mut DemoStats) {}

    /// Called for every subscribed event.
    fn on_event(&mut self, _event: &GameEvent, _ctx: &EventContext<'_>, _stats: &mut DemoStats) {
    }

    /// Called after the stream is exhausted.
    fn finalize(&mut self, stats: &mut DemoStats);
}

struct Registered {
    detector: Box<dyn Detector>,
    subscriptions: Subscriptions,
}

/// Output of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResults {
    /// Per-player metrics and replay metadata.
    pub stats: DemoStats,
    /// Categories declared by the executed detectors, in execution order.
    pub categories: Vec<Category>,
}

/// Ordered set of detectors plus the stats they write.
pub struct Pipeline {
    detectors: Vec<Registered>,
    stats: DemoStats,
    last_tick: Option<u64>,
    started: bool,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("order", &self.execution_order())
            .field("last_tick", &self.last_tick)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a pipeline, resolving execution order.
    ///
    /// # Errors
    /// Fails on a duplicate identifier, a dependency on an unregistered detector,
    /// or a dependency cycle.
    pub fn new(detectors: Vec<Box<dyn Detector>>) -> Result<Self> {
        let ordered = resolve_order(detectors)?;
        Ok(Self {
            detectors: ordered
                .into_iter()
                .map(|detector| Registered {
                    detector,
                    subscriptions: Subscriptions::default(),
                })
                .collect(),
            stats: DemoStats::default(),
            last_tick: None,
            started: false,
        })
    }

    /// Create a pipeline with every built-in detector.
    ///
    /// # Errors
    /// Propagates order resolution failures.
    pub fn with_default_detectors(config: &AnalysisConfig) -> Result<Self> {
        Self::new(detectors::default_detectors(config))
    }

    /// Detector identifiers in execution order.
    #[must_use]
    pub fn execution_order(&self) -> Vec<DetectorId> {
        self.detectors.iter().map(|r| r.detector.id()).collect()
    }

    /// Categories declared by the detectors, de-duplicated, in execution order.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        let mut seen = BTreeSet::new();
        self.detectors
            .iter()
            .flat_map(|r| r.detector.categories().iter().copied())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Stats accumulated so far.
    #[must_use]
    pub fn stats(&self) -> &DemoStats {
        &self.stats
    }

    /// Record header metadata and run every initialize hook.
    pub fn begin(&mut self, header: &ReplayHeader) {
        let tick_rate = if header.tick_rate.is_finite() && header.tick_rate > 0.0 {
            header.tick_rate
        } else {
            warn!(
                tick_rate = header.tick_rate,
                "Replay header has no usable tick rate, assuming {DEFAULT_TICK_RATE}"
            );
            DEFAULT_TICK_RATE
        };
        self.stats = DemoStats::new(DemoInfo {
            demo_name: header.demo_name.clone(),
            map_name: header.map_name.clone(),
            tick_rate,
            tick_count: 0,
        });
        self.last_tick = None;

        for registered in &mut self.detectors {
            registered.subscriptions = Subscriptions::default();
            registered
                .detector
                .initialize(header, &mut registered.subscriptions, &mut self.stats);
            debug!(
                detector = %registered.detector.id(),
                subscriptions = ?registered.subscriptions,
                "Detector initialized"
            );
        }
        self.started = true;
        info!(
            demo = %header.demo_name,
            map = %header.map_name,
            tick_rate,
            detectors = self.detectors.len(),
            "Analysis started"
        );
    }

    /// Push one frame through every detector.
    ///
    /// # Errors
    /// Returns [`AnalysisError::TickOutOfOrder`] if the tick does not advance.
    pub fn feed(&mut self, frame: &TickFrame) -> Result<()> {
        if !self.started {
            self.begin(&ReplayHeader::default());
        }
        if let Some(previous) = self.last_tick {
            if frame.tick <= previous {
                return Err(AnalysisError::TickOutOfOrder {
                    previous,
                    tick: frame.tick,
                });
            }
        }
        self.last_tick = Some(frame.tick);
        self.stats.info.tick_count += 1;

        for snapshot in &frame.players {
            self.stats.observe(snapshot.id, &snapshot.name);
        }
        for event in &frame.events {
            for player in event.players() {
                self.stats.observe(player.id, &player.name);
            }
        }

        for registered in &mut self.detectors {
            registered.detector.on_tick(frame, &mut self.stats);
        }

        let ctx = EventContext {
            tick: frame.tick,
            players: &frame.players,
        };
        for event in &frame.events {
            let kind = event.kind();
            for registered in &mut self.detectors {
                if registered.subscriptions.contains(kind) {
                    registered.detector.on_event(event, &ctx, &mut self.stats);
                }
            }
        }
        Ok(())
    }

    /// Run every finalize hook. Safe to repeat.
    pub fn finalize(&mut self) {
        for registered in &mut self.detectors {
            registered.detector.finalize(&mut self.stats);
            debug!(detector = %registered.detector.id(), "Detector finalized");
        }
        info!(
            ticks = self.stats.info.tick_count,
            players = self.stats.player_count(),
            "Analysis finalized"
        );
    }

    /// Consume the pipeline, returning its results.
    #[must_use]
    pub fn into_results(self) -> AnalysisResults {
        let categories = self.categories();
        AnalysisResults {
            stats: self.stats,
            categories,
        }
    }

    /// Analyze a complete replay.
    ///
    /// # Errors
    /// Any source error or out-of-order tick aborts the run.
    pub fn run<S: ReplaySource + ?Sized>(mut self, source: &mut S) -> Result<AnalysisResults> {
        self.begin(source.header());
        while let Some(frame) = source.next_frame()? {
            self.feed(&frame)?;
        }
        self.finalize();
        Ok(self.into_results())
    }
}

/// Stable topological sort: among ready detectors the earliest registered goes first.
fn resolve_order(detectors: Vec<Box<dyn Detector>>) -> Result<Vec<Box<dyn Detector>>> {
    let mut ids = BTreeSet::new();
    for detector in &detectors {
        if !ids.insert(detector.id()) {
            return Err(AnalysisError::DuplicateDetector(detector.id()));
        }
    }
    for detector in &detectors {
        if let Some(missing) = detector.depends_on().iter().find(|d| !ids.contains(*d)) {
            return Err(AnalysisError::UnknownDependency {
                detector: detector.id(),
                missing: *missing,
            });
        }
    }

    let mut pending: Vec<Option<Box<dyn Detector>>> = detectors.into_iter().map(Some).collect();
    let mut placed: BTreeSet<DetectorId> = BTreeSet::new();
    let mut ordered = Vec::with_capacity(pending.len());

    while ordered.len() < pending.len() {
        let next = pending.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|d| d.depends_on().iter().all(|dep| placed.contains(dep)))
        });
        let Some(index) = next else {
            let cycle = pending.iter().flatten().map(|d| d.id()).collect();
            return Err(AnalysisError::DependencyCycle(cycle));
        };
        if let Some(detector) = pending[index].take() {
            placed.insert(detector.id());
            ordered.push(detector);
        }
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::KillKey;
    use crate::replay::{PlayerId, Replay, Team};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        id: DetectorId,
        deps: &'static [DetectorId],
        log: Log,
    }

    impl Recorder {
        fn boxed(id: &'static str, deps: &'static [DetectorId], log: &Log) -> Box<dyn Detector> {
            Box::new(Self {
                id: DetectorId(id),
                deps,
                log: Rc::clone(log),
            })
        }
    }

    impl Detector for Recorder {
        fn id(&self) -> DetectorId {
            self.id
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
        fn categories(&self) -> &'static [Category] {
            &[Category::Kills]
        }
        fn depends_on(&self) -> &'static [DetectorId] {
            self.deps
        }
        fn initialize(&mut self, _: &ReplayHeader, subs: &mut Subscriptions, _: &mut DemoStats) {
            subs.subscribe(EventKind::RoundEnd);
        }
        fn on_tick(&mut self, frame: &TickFrame, _: &mut DemoStats) {
            self.log.borrow_mut().push(format!("{}:tick{}", self.id, frame.tick));
        }
        fn on_event(&mut self, _: &GameEvent, ctx: &EventContext<'_>, _: &mut DemoStats) {
            self.log.borrow_mut().push(format!("{}:event{}", self.id, ctx.tick));
        }
        fn finalize(&mut self, stats: &mut DemoStats) {
            if let Some(p) = stats.player_mut(PlayerId(1)) {
                p.record(KillKey::TotalKills, crate::metrics::MetricValue::Integer(1));
            }
        }
    }

    fn log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_order_respects_dependencies_stably() {
        const A: DetectorId = DetectorId("a");
        let log = log();
        let pipeline = Pipeline::new(vec![
            Recorder::boxed("b", &[A], &log),
            Recorder::boxed("c", &[], &log),
            Recorder::boxed("a", &[], &log),
        ])
        .unwrap();
        assert_eq!(
            pipeline.execution_order(),
            vec![DetectorId("c"), DetectorId("a"), DetectorId("b")]
        );
    }

    #[test]
    fn test_unknown_dependency() {
        const MISSING: DetectorId = DetectorId("missing");
        let log = log();
        let err = Pipeline::new(vec![Recorder::boxed("a", &[MISSING], &log)]).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownDependency { .. }));
    }

    #[test]
    fn test_duplicate_and_cycle() {
        const A: DetectorId = DetectorId("a");
        const B: DetectorId = DetectorId("b");
        let log = log();
        let err = Pipeline::new(vec![Recorder::boxed("a", &[], &log), Recorder::boxed("a", &[], &log)])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::DuplicateDetector(_)));

        let err = Pipeline::new(vec![Recorder::boxed("a", &[B], &log), Recorder::boxed("b", &[A], &log)])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::DependencyCycle(ids) if ids.len() == 2));
    }

    #[test]
    fn test_ticks_before_events_and_strict_order() {
        let log = log();
        let mut pipeline =
            Pipeline::new(vec![Recorder::boxed("a", &[], &log), Recorder::boxed("b", &[], &log)])
                .unwrap();
        pipeline.begin(&ReplayHeader::default());
        pipeline
            .feed(&TickFrame {
                tick: 5,
                players: vec![],
                events: vec![GameEvent::RoundEnd],
            })
            .unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["a:tick5", "b:tick5", "a:event5", "b:event5"]
        );

        let err = pipeline.feed(&TickFrame { tick: 5, ..TickFrame::default() }).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::TickOutOfOrder { previous: 5, tick: 5 }
        ));
    }

    #[test]
    fn test_zero_tick_rate_defaults() {
        let log = log();
        let mut pipeline = Pipeline::new(vec![Recorder::boxed("a", &[], &log)]).unwrap();
        pipeline.begin(&ReplayHeader {
            tick_rate: 0.0,
            ..ReplayHeader::default()
        });
        assert_eq!(pipeline.stats().info.tick_rate, DEFAULT_TICK_RATE);
    }

    #[test]
    fn test_run_observes_players_and_counts_ticks() {
        let log = log();
        let pipeline = Pipeline::new(vec![Recorder::boxed("a", &[], &log)]).unwrap();
        let mut replay = Replay::new(ReplayHeader::default());
        replay.push_frame(TickFrame {
            tick: 1,
            players: vec![],
            events: vec![GameEvent::PlayerHurt {
                attacker: None,
                victim: crate::replay::PlayerRef::new(PlayerId(1), "v", Team::Terrorist),
                damage: 10,
            }],
        });
        replay.push_frame(TickFrame {
            tick: 3,
            ..TickFrame::default()
        });
        let results = pipeline.run(&mut replay.into_stream()).unwrap();
        assert_eq!(results.stats.info.tick_count, 2);
        assert_eq!(results.stats.player_count(), 1);
        assert_eq!(results.categories, vec![Category::Kills]);
    }

    #[test]
    fn test_default_pipeline_runs_scorer_last() {
        let pipeline = Pipeline::with_default_detectors(&AnalysisConfig::default()).unwrap();
        let order = pipeline.execution_order();
        assert_eq!(order.last(), Some(&DetectorId::SCORER));
        assert_eq!(order.len(), 7);
    }
}

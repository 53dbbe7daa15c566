//! Pipeline benchmarks for sentinel_core.
//!
//! Run with: `cargo bench -p sentinel_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sentinel_core::math::Vec3;
use sentinel_core::prelude::*;
use sentinel_test_utils::ReplayBuilder;

/// Ten players, one round of 64-tick play with steady fire and a kill every second.
fn synthetic_match(ticks: u64) -> Replay {
    let mut builder = ReplayBuilder::new("bench");
    for id in 1..=10u64 {
        let team = if id <= 5 {
            Team::Terrorist
        } else {
            Team::CounterTerrorist
        };
        builder = builder.player(id, &format!("player{id}"), team);
    }
    for id in 1..=10u64 {
        #[allow(clippy::cast_precision_loss)]
        let offset = id as f64 * 120.0;
        builder.place(id, Vec3::new(offset, offset * 0.5, 0.0));
    }

    for tick in 0..ticks {
        #[allow(clippy::cast_precision_loss)]
        let sweep = (tick % 360) as f64 - 180.0;
        for id in 1..=10u64 {
            builder.look(id, sweep, 0.0);
        }
        if tick % 4 == 0 {
            builder.fire(1 + tick % 10);
        }
        if tick % 64 == 0 && tick > 0 {
            builder.kill(1 + tick % 5, 6 + tick % 5, tick % 128 == 0);
        }
        builder.commit();
    }
    builder.round_end().commit();
    builder.build()
}

/// Runs pipeline benchmarks for the sentinel_core crate.
pub fn pipeline_benchmark(c: &mut Criterion) {
    let replay = synthetic_match(64 * 120);
    let config = AnalysisConfig::default();

    c.bench_function("default_pipeline_two_minutes", |b| {
        b.iter(|| {
            let pipeline = Pipeline::with_default_detectors(&config).expect("detectors resolve");
            let results = pipeline
                .run(&mut black_box(replay.clone()).into_stream())
                .expect("synthetic replay analyzes");
            black_box(results.stats.player_count())
        })
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);

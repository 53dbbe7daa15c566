//! End-to-end scenarios through the default pipeline.
//!
//! Each test builds a small replay with the fixture builder, runs every built-in
//! detector over it and checks the metrics that come out.

use sentinel_core::prelude::*;
use sentinel_test_utils::fixtures::{duel, perfect_spray};
use sentinel_test_utils::ReplayBuilder;

fn analyze(replay: Replay) -> AnalysisResults {
    Pipeline::with_default_detectors(&AnalysisConfig::default())
        .expect("default detectors resolve")
        .run(&mut replay.into_stream())
        .expect("replay analyzes")
}

fn player(results: &AnalysisResults, id: u64) -> &PlayerStats {
    results
        .stats
        .player(PlayerId(id))
        .unwrap_or_else(|| panic!("player {id} observed"))
}

/// Opponent 2 steps into player 1's crosshair, player 1 fires six ticks later.
fn reaction_cycles(builder: &mut ReplayBuilder, cycles: usize) {
    for _ in 0..cycles {
        builder.place(2, Vec3::new(0.0, 800.0, 0.0)).commit();
        builder.place(2, Vec3::new(800.0, 0.0, 0.0)).commit();
        builder.idle(5);
        builder.fire(1).commit();
    }
}

// =============================================================================
// Reaction
// =============================================================================

mod reaction {
    use super::*;

    #[test]
    fn test_six_ticks_at_sixty_four_is_fast() {
        let mut builder = duel();
        builder.hold(1, Some(Weapon::DesertEagle));
        reaction_cycles(&mut builder, 5);
        let results = analyze(builder.build());

        let p = player(&results, 1);
        assert_eq!(p.get_int(ReactionKey::ReactionSamples), Some(5));
        assert_eq!(p.get_float(ReactionKey::P10ReactionTime), Some(93.75));
        assert_eq!(p.get_float(ReactionKey::Sub100msRatio), Some(100.0));
        assert_eq!(p.get_int(ReactionKey::ShotsAfterFovEntry), Some(5));
        let score = p.get_float(AntiCheatKey::ReactionScore).unwrap();
        assert!((score - 26.25 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_samples_write_no_statistics() {
        let mut builder = duel();
        reaction_cycles(&mut builder, 3);
        let results = analyze(builder.build());

        let p = player(&results, 1);
        assert_eq!(p.get_int(ReactionKey::ShotsAfterFovEntry), Some(3));
        assert!(p.get(ReactionKey::P10ReactionTime).is_none());
        assert_eq!(p.get_float(AntiCheatKey::ReactionScore), Some(0.0));
    }
}

// =============================================================================
// Headshots and scoring
// =============================================================================

mod scoring {
    use super::*;

    fn kills(builder: &mut ReplayBuilder, total: u32, headshots: u32) {
        for i in 0..total {
            builder.kill(1, 2, i < headshots).commit();
        }
    }

    #[test]
    fn test_forty_kills_eighty_percent_headshots() {
        let mut builder = duel();
        kills(&mut builder, 40, 32);
        let results = analyze(builder.build());

        let p = player(&results, 1);
        assert_eq!(p.get_int(KillKey::TotalKills), Some(40));
        assert_eq!(p.get_float(KillKey::HeadshotPercentage), Some(80.0));
        assert_eq!(p.get_float(AntiCheatKey::HsScore), Some(1.0));
    }

    #[test]
    fn test_blatant_cheater_is_flagged() {
        let mut builder = duel();
        kills(&mut builder, 40, 32);
        let mut replay = builder.build();

        // Append a perfect spray after the kills.
        let spray = perfect_spray(Weapon::Ak47, 12);
        let offset = replay.frames.last().map_or(0, |f| f.tick);
        for mut frame in spray.frames {
            frame.tick += offset;
            replay.push_frame(frame);
        }
        let results = analyze(replay);

        let p = player(&results, 1);
        assert_eq!(results.stats.match_info.game_mode, Some(GameMode::Wingman));
        assert!(p.get(AntiCheatKey::WingmanBoost).is_some());
        // (0.45 + 0.15) * 100 * 1.2
        let likelihood = p.get_float(AntiCheatKey::CheatLikelihood).unwrap();
        assert!((likelihood - 72.0).abs() < 1e-6);
        assert_eq!(p.get_text(AntiCheatKey::Cheater), Some("Yes"));

        let target = player(&results, 2);
        assert_eq!(target.get_text(AntiCheatKey::Cheater), Some("No"));
    }

    #[test]
    fn test_every_player_is_scored() {
        let mut builder = duel();
        builder.idle(3);
        let results = analyze(builder.build());
        for p in results.stats.players() {
            assert_eq!(p.get_float(AntiCheatKey::CheatLikelihood), Some(0.0));
            assert_eq!(p.get_text(AntiCheatKey::Cheater), Some("No"));
        }
    }
}

// =============================================================================
// Recoil
// =============================================================================

mod recoil {
    use super::*;

    #[test]
    fn test_perfect_ten_shot_burst() {
        let results = analyze(perfect_spray(Weapon::Ak47, 10));
        let p = player(&results, 1);

        assert!(p.get_float(RecoilKey::MeanAngularError).unwrap() < 1e-9);
        assert!((p.get_float(RecoilKey::RecoilScore).unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(p.get_float(RecoilKey::RecoilEfficiency), Some(100.0));
        assert_eq!(
            p.get_text(RecoilKey::RecoilInterpretation),
            Some("Suspiciously perfect")
        );
        assert_eq!(p.get_int(RecoilKey::WeaponBullets(Weapon::Ak47)), Some(7));
    }

    #[test]
    fn test_unpatterned_weapon_uses_generic_curve() {
        let results = analyze(perfect_spray(Weapon::Famas, 10));
        let p = player(&results, 1);
        assert!(p.get_float(RecoilKey::MeanAngularError).unwrap() < 1e-9);
    }

    #[test]
    fn test_semi_automatic_fire_has_no_recoil_metrics() {
        let mut builder = duel();
        builder.hold(1, Some(Weapon::DesertEagle));
        for _ in 0..10 {
            builder.fire(1).commit();
        }
        let results = analyze(builder.build());
        assert!(player(&results, 1).category(Category::Recoil).is_none());
    }

    #[test]
    fn test_round_end_discards_open_burst() {
        let mut builder = duel();
        for _ in 0..8 {
            builder.fire(1).commit();
        }
        builder.round_end().commit();
        let results = analyze(builder.build());

        let p = player(&results, 1);
        assert_eq!(p.get_int(RecoilKey::BurstCount), Some(0));
        assert!(p.get(RecoilKey::RecoilScore).is_none());
    }
}

// =============================================================================
// Pipeline behaviour
// =============================================================================

mod pipeline {
    use super::*;

    #[test]
    fn test_weapon_usage_and_game_info() {
        let mut builder = duel();
        builder.idle(2);
        builder.hold(1, Some(Weapon::Knife)).idle(2);
        builder.round_end().commit();
        let results = analyze(builder.build());

        let p = player(&results, 1);
        let knife = p.get_float(WeaponKey::KnifePercentage).unwrap();
        assert!((knife - 60.0).abs() < 1e-9);
        assert_eq!(p.get_int(GameInfoKey::RoundCount), Some(1));
        assert_eq!(p.get_text(GameInfoKey::GameMode), Some("Wingman"));
        assert_eq!(results.stats.info.tick_count, 5);
        assert_eq!(results.stats.info.map_name, "de_fixture");
    }

    #[test]
    fn test_categories_follow_execution_order() {
        let results = analyze(duel().build());
        assert_eq!(
            results.categories,
            vec![
                Category::Weapons,
                Category::Kills,
                Category::Aiming,
                Category::Reaction,
                Category::Recoil,
                Category::GameInfo,
                Category::AntiCheat,
            ]
        );
    }

    #[test]
    fn test_out_of_order_tick_aborts() {
        let mut replay = duel().idle(3).build();
        replay.frames.swap(0, 2);
        let err = Pipeline::with_default_detectors(&AnalysisConfig::default())
            .unwrap()
            .run(&mut replay.into_stream())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::TickOutOfOrder { .. }));
    }

    #[test]
    fn test_finalize_twice_changes_nothing() {
        let mut builder = duel();
        reaction_cycles(&mut builder, 6);
        let replay = builder.build();

        let mut pipeline = Pipeline::with_default_detectors(&AnalysisConfig::default()).unwrap();
        pipeline.begin(&replay.header);
        for frame in &replay.frames {
            pipeline.feed(frame).unwrap();
        }
        pipeline.finalize();
        let first = serde_json::to_value(pipeline.stats()).unwrap();
        pipeline.finalize();
        let second = serde_json::to_value(pipeline.stats()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_tick_rate_defaults_to_sixty_four() {
        let replay = ReplayBuilder::new("no_rate")
            .tick_rate(0.0)
            .player(1, "solo", Team::Terrorist)
            .idle(1)
            .build();
        let results = analyze(replay);
        assert_eq!(results.stats.info.tick_rate, 64.0);
    }
}

//! File round trips and end-to-end analysis through the headless entry points.

use sentinel_core::prelude::*;
use sentinel_headless::{
    analyze_file, load_config, load_replay, JsonReporter, LoadError, TextReporter,
};
use sentinel_test_utils::fixtures::{duel, replay_ron};

fn sample_replay() -> Replay {
    let mut builder = duel();
    for i in 0..6 {
        builder.kill(1, 2, i % 2 == 0).commit();
    }
    builder.round_end().commit();
    builder.build()
}

// =============================================================================
// Loading
// =============================================================================

mod loading {
    use super::*;

    #[test]
    fn test_all_encodings_load_the_same_replay() {
        let dir = tempfile::tempdir().unwrap();
        let replay = sample_replay();

        let bin = dir.path().join("match.bin");
        replay.save(&bin).unwrap();
        let json = dir.path().join("match.json");
        std::fs::write(&json, serde_json::to_string(&replay).unwrap()).unwrap();
        let ron = dir.path().join("match.ron");
        std::fs::write(&ron, replay_ron(&replay)).unwrap();

        assert_eq!(load_replay(&bin).unwrap(), replay);
        assert_eq!(load_replay(&json).unwrap(), replay);
        assert_eq!(load_replay(&ron).unwrap(), replay);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut replay = sample_replay();
        replay.header.version += 1;
        let path = dir.path().join("future.json");
        std::fs::write(&path, serde_json::to_string(&replay).unwrap()).unwrap();

        let err = load_replay(&path).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Analysis(AnalysisError::ReplayVersionMismatch { .. })
        ));
    }

    #[test]
    fn test_garbage_bincode_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.bin");
        std::fs::write(&path, [0xffu8; 3]).unwrap();
        let err = load_replay(&path).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Analysis(AnalysisError::MalformedReplay(_))
        ));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuning.ron");
        std::fs::write(&path, "(scoring: (flag_threshold: 40.0))").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.scoring.flag_threshold, 40.0);
        assert_eq!(config.reaction, AnalysisConfig::default().reaction);
    }

    #[test]
    fn test_default_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.ron");
        let defaults = AnalysisConfig::default();
        std::fs::write(&path, defaults.to_ron_string().unwrap()).unwrap();
        assert_eq!(load_config(&path).unwrap(), defaults);
    }
}

// =============================================================================
// Analysis and reports
// =============================================================================

mod reports {
    use super::*;

    #[test]
    fn test_analyze_file_scores_every_player() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.bin");
        sample_replay().save(&path).unwrap();

        let results = analyze_file(&path, &AnalysisConfig::default()).unwrap();
        assert_eq!(results.stats.player_count(), 2);
        assert_eq!(results.stats.match_info.round_count, 1);
        let attacker = results.stats.player(PlayerId(1)).unwrap();
        assert_eq!(attacker.get_int(KillKey::TotalKills), Some(6));
        assert_eq!(attacker.get_float(KillKey::HeadshotPercentage), Some(50.0));
    }

    #[test]
    fn test_text_report_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.ron");
        std::fs::write(&path, replay_ron(&sample_replay())).unwrap();

        let config = AnalysisConfig::default();
        let results = analyze_file(&path, &config).unwrap();
        let text = TextReporter::new(config.scoring).render(&results);
        assert!(text.contains("Map:       de_fixture"));
        assert!(text.contains("Game mode: Wingman"));
        assert!(text.contains("\nKills\n"));
        assert!(text.contains("\nAnti-Cheat\n"));
        assert!(text.contains("headshot_percentage"));
        assert!(!text.contains("knife_ticks"));
        assert!(text.contains("flagged"));
    }

    #[test]
    fn test_json_report_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.bin");
        sample_replay().save(&path).unwrap();

        let results = analyze_file(&path, &AnalysisConfig::default()).unwrap();
        let json = JsonReporter::render(&results).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["stats"]["info"]["demo_name"], "duel");
        assert_eq!(value["categories"][0], "weapons");
        assert_eq!(
            value["stats"]["players"]["1"]["categories"]["kills"]["total_kills"]["value"],
            6
        );
    }
}

//! Report rendering.
//!
//! [`TextReporter`] prints one aligned table per populated category.
//! [`JsonReporter`] dumps the full results for other tools.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use sentinel_core::config::ScoringConfig;
use sentinel_core::metrics::{AntiCheatKey, Category, DemoStats, MetricKey, PlayerStats};
use sentinel_core::pipeline::AnalysisResults;

/// Plain-text table report.
#[derive(Debug, Clone, Default)]
pub struct TextReporter {
    /// Thresholds behind the anti-cheat `flagged` column.
    pub scoring: ScoringConfig,
    /// Also print raw counters such as `*_ticks`.
    pub show_internal: bool,
}

impl TextReporter {
    /// Reporter hiding internal counters, flagging with the scorer's threshold.
    #[must_use]
    pub fn new(scoring: ScoringConfig) -> Self {
        Self {
            scoring,
            show_internal: false,
        }
    }

    /// Render the whole report.
    #[must_use]
    pub fn render(&self, results: &AnalysisResults) -> String {
        let stats = &results.stats;
        let mut out = String::new();

        out.push_str("Replay Sentinel Report\n");
        out.push_str("======================\n\n");
        out.push_str(&format!("Replay:    {}\n", stats.info.demo_name));
        out.push_str(&format!("Map:       {}\n", stats.info.map_name));
        out.push_str(&format!(
            "Ticks:     {} @ {} tick/s\n",
            stats.info.tick_count, stats.info.tick_rate
        ));
        out.push_str(&format!("Rounds:    {}\n", stats.match_info.round_count));
        let mode = stats
            .match_info
            .game_mode
            .map_or("Unknown", |m| m.as_str());
        out.push_str(&format!("Game mode: {mode}\n"));
        out.push_str(&format!("Players:   {}\n", stats.player_count()));

        for &category in &results.categories {
            if !stats.has_category(category) {
                continue;
            }
            out.push('\n');
            out.push_str(&self.render_category(stats, category));
        }
        out
    }

    /// Render one category table. Empty when no player has visible metrics in it.
    #[must_use]
    pub fn render_category(&self, stats: &DemoStats, category: Category) -> String {
        let columns = self.columns(stats, category);
        if columns.is_empty() {
            return String::new();
        }

        let players = ordered_players(stats, category);
        let flag_column = category == Category::AntiCheat;
        let mut header = vec!["player".to_string()];
        header.extend(columns.iter().map(|k| k.name().into_owned()));
        if flag_column {
            header.push("flagged".to_string());
        }

        let rows: Vec<Vec<String>> = players
            .iter()
            .map(|p| {
                let mut row = vec![p.name().to_string()];
                row.extend(columns.iter().map(|&key| {
                    p.get(key)
                        .map_or_else(|| "-".to_string(), |m| m.value.to_string())
                }));
                if flag_column {
                    let likelihood = p.get_float(AntiCheatKey::CheatLikelihood).unwrap_or(0.0);
                    let flagged = self.scoring.flags(likelihood);
                    row.push(if flagged { "yes" } else { "no" }.to_string());
                }
                row
            })
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(category.title());
        out.push('\n');
        out.push_str(&"-".repeat(category.title().len()));
        out.push('\n');
        write_row(&mut out, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        write_row(&mut out, &rule, &widths);
        for row in &rows {
            write_row(&mut out, row, &widths);
        }
        out
    }

    /// Visible keys of a category across all players, in key order.
    fn columns(&self, stats: &DemoStats, category: Category) -> Vec<MetricKey> {
        let keys: BTreeSet<MetricKey> = stats
            .players()
            .filter_map(|p| p.category(category))
            .flat_map(|metrics| metrics.keys().copied())
            .filter(|key| self.show_internal || !key.is_internal())
            .collect();
        // Key order already places the no-weapon share after knife and
        // non-knife; internal tick counters sort before the shares.
        keys.into_iter().collect()
    }
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &w))| {
            if i == 0 {
                format!("{cell:<w$}")
            } else {
                format!("{cell:>w$}")
            }
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// Players in a category that have metrics there. Anti-cheat rows go by
/// descending likelihood, everything else by name.
fn ordered_players(stats: &DemoStats, category: Category) -> Vec<&PlayerStats> {
    let mut players: Vec<&PlayerStats> = stats
        .players()
        .filter(|p| p.category(category).is_some_and(|m| !m.is_empty()))
        .collect();
    if category == Category::AntiCheat {
        players.sort_by(|a, b| {
            let la = a.get_float(AntiCheatKey::CheatLikelihood).unwrap_or(0.0);
            let lb = b.get_float(AntiCheatKey::CheatLikelihood).unwrap_or(0.0);
            lb.partial_cmp(&la)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name().cmp(b.name()))
        });
    } else {
        players.sort_by(|a, b| a.name().cmp(b.name()).then(a.id().cmp(&b.id())));
    }
    players
}

/// Pretty JSON report.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReporter;

impl JsonReporter {
    /// Serialize stats and category order.
    pub fn render(results: &AnalysisResults) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(results)
    }
}

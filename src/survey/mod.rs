//! Multi-seed generation survey
//!
//! Generates many layouts from one config with different seeds and reports
//! how often generation succeeds and what the successful layouts look like.
//! Uses rayon for parallel execution across CPU cores; results are collected
//! in seed order, so a report does not depend on the thread count.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::DungeonConfig;
use crate::constants::DEFAULT_SURVEY_COUNT;
use crate::generation::{ConnectionShape, DungeonLayout, DungeonSeed};

/// Configuration for a survey run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    pub layout_count: u64,
    pub base_seed: u64,
    /// Generation parameters; its `seed` is replaced per layout
    pub dungeon: DungeonConfig,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            layout_count: DEFAULT_SURVEY_COUNT,
            base_seed: 42,
            dungeon: DungeonConfig::default(),
        }
    }
}

/// Measurements of one successful layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutStats {
    pub seed: u64,
    pub rooms: usize,
    pub paths: usize,
    pub l_bends: usize,
    pub attempts: u32,
    pub coverage: f64, // walkable tiles / all tiles
    pub connected: bool,
}

/// Results of a survey run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyReport {
    pub total_layouts: u64,
    pub successes: u64,
    pub failures: u64,
    pub retried_layouts: u64, // succeeded, but not on the first attempt
    pub disconnected_layouts: u64,
    pub mean_rooms: f64,
    pub mean_paths: f64,
    pub mean_l_bends: f64,
    pub mean_coverage: f64,
    pub min_coverage: f64,
    pub max_coverage: f64,
    pub failures_by_kind: BTreeMap<String, u64>,
}

impl SurveyReport {
    pub fn success_rate(&self) -> f64 {
        if self.total_layouts == 0 {
            return 0.0;
        }
        self.successes as f64 / self.total_layouts as f64
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Generate and measure a single layout
pub fn survey_layout(config: &DungeonConfig) -> Result<LayoutStats, &'static str> {
    let mut layout = DungeonLayout::new(config.clone());
    layout.generate_dungeon_layout().map_err(|err| err.kind())?;

    let tiles = layout.tiles();
    let cells = tiles.width() * tiles.height();
    let coverage = if cells == 0 {
        0.0
    } else {
        tiles.walkable_count() as f64 / cells as f64
    };
    Ok(LayoutStats {
        seed: config.seed,
        rooms: layout.rooms().len(),
        paths: layout.paths().len(),
        l_bends: layout
            .connections()
            .iter()
            .filter(|c| c.shape == ConnectionShape::LBend)
            .count(),
        attempts: layout.attempts(),
        coverage,
        connected: layout.is_fully_connected(),
    })
}

/// Run the survey with rayon parallelism
pub fn run_survey(config: &SurveyConfig) -> SurveyReport {
    let _span = crate::logging::TimingSpan::new("run_survey");
    let root = DungeonSeed::new(config.base_seed);
    let seeds: Vec<u64> = (0..config.layout_count)
        .map(|i| root.survey_seed(i))
        .collect();

    let results: Vec<Result<LayoutStats, &'static str>> = seeds
        .par_iter()
        .map(|seed| survey_layout(&config.dungeon.clone().with_seed(*seed)))
        .collect();

    let report = analyze_results(&results);
    tracing::info!(
        layouts = report.total_layouts,
        successes = report.successes,
        failures = report.failures,
        "survey finished"
    );
    report
}

fn analyze_results(results: &[Result<LayoutStats, &'static str>]) -> SurveyReport {
    let stats: Vec<&LayoutStats> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    let mut failures_by_kind = BTreeMap::new();
    for kind in results.iter().filter_map(|r| r.as_ref().err()) {
        *failures_by_kind.entry(kind.to_string()).or_insert(0u64) += 1;
    }

    let mean = |value: fn(&LayoutStats) -> f64| {
        if stats.is_empty() {
            0.0
        } else {
            stats.iter().map(|s| value(s)).sum::<f64>() / stats.len() as f64
        }
    };
    let coverages = stats.iter().map(|s| s.coverage);

    SurveyReport {
        total_layouts: results.len() as u64,
        successes: stats.len() as u64,
        failures: (results.len() - stats.len()) as u64,
        retried_layouts: stats.iter().filter(|s| s.attempts > 1).count() as u64,
        disconnected_layouts: stats.iter().filter(|s| !s.connected).count() as u64,
        mean_rooms: mean(|s| s.rooms as f64),
        mean_paths: mean(|s| s.paths as f64),
        mean_l_bends: mean(|s| s.l_bends as f64),
        mean_coverage: mean(|s| s.coverage),
        min_coverage: if stats.is_empty() {
            0.0
        } else {
            coverages.clone().fold(f64::MAX, f64::min)
        },
        max_coverage: coverages.fold(0.0, f64::max),
        failures_by_kind,
    }
}

//! # Ranking Reporter
//!
//! Scans the models directory, recovers each model's hyperparameters from
//! its identifier, and ranks every model with a usable stats record by hit
//! ratio. Both reports are regenerated in full on every run.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tagsweep_core::{EvalStats, HyperparameterConfig, ModelIdParser, STATS_FILE, StatsParser};
use tracing::{debug, info, warn};

use crate::error::{Result, TrainerError};

/// Header row of the tabular report.
pub const CSV_HEADER: &str = "Size of RNN,Time steps,Epochs,Hit ratio";

/// One ranked model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedModel {
    pub model: String,
    pub hits: u64,
    pub misses: u64,
    pub ratio: f64,
    pub hyperparameters: HyperparameterConfig,
}

/// Models ordered by descending hit ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingReport {
    pub stats: Vec<RankedModel>,
    pub created_at: String,
}

impl RankingReport {
    /// Rank `models` by descending ratio. Ties keep their input order.
    pub fn new(mut models: Vec<RankedModel>) -> Self {
        models.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
        Self {
            stats: models,
            created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }

    /// Header plus one `rnn,time_steps,epochs,ratio` row per model.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(CSV_HEADER);
        out.push('\n');
        for m in &self.stats {
            let h = &m.hyperparameters;
            let _ = writeln!(
                out,
                "{},{},{},{:.3}",
                h.rnn_size, h.time_steps, h.epochs, m.ratio
            );
        }
        out
    }

    /// Overwrite `path` with the structured report.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(TrainerError::json(path))?;
        fs::write(path, json).map_err(TrainerError::io(path))
    }

    /// Overwrite `path` with the tabular report.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_csv()).map_err(TrainerError::io(path))
    }
}

/// Reads model directories and builds [`RankingReport`]s.
#[derive(Debug, Clone)]
pub struct RankingReporter {
    models_dir: PathBuf,
    ids: ModelIdParser,
    stats: StatsParser,
}

impl RankingReporter {
    pub fn new(models_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            models_dir: models_dir.into(),
            ids: ModelIdParser::new()?,
            stats: StatsParser::new()?,
        })
    }

    /// Every model directory with a parseable identifier, stats record and
    /// nonzero evaluation count, in directory-name order.
    pub fn collect(&self) -> Result<Vec<RankedModel>> {
        let entries = match fs::read_dir(&self.models_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(dir = %self.models_dir.display(), "models directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(TrainerError::io(&self.models_dir)(e)),
        };

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(TrainerError::io(&self.models_dir))?;
            if entry.path().is_dir() {
                dirs.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        dirs.sort();

        Ok(dirs
            .into_iter()
            .filter_map(|name| self.read_model(&name))
            .collect())
    }

    fn read_model(&self, name: &str) -> Option<RankedModel> {
        let stats_path = self.models_dir.join(name).join(STATS_FILE);
        if !stats_path.is_file() {
            debug!(model = name, "no stats record, skipping");
            return None;
        }

        let id = match self.ids.parse(name) {
            Ok(id) => id,
            Err(e) => {
                warn!(model = name, error = %e, "excluding model from ranking");
                return None;
            }
        };

        let stats: EvalStats = match fs::read_to_string(&stats_path)
            .map_err(TrainerError::io(&stats_path))
            .and_then(|content| Ok(self.stats.parse(&content)?))
        {
            Ok(stats) => stats,
            Err(e) => {
                warn!(model = name, error = %e, "excluding model from ranking");
                return None;
            }
        };

        let Some(ratio) = stats.ratio() else {
            warn!(model = name, "no evaluated tokens, excluding model from ranking");
            return None;
        };

        Some(RankedModel {
            model: name.to_string(),
            hits: stats.hits,
            misses: stats.misses,
            ratio,
            hyperparameters: id.config(),
        })
    }

    /// Collect and rank all models.
    pub fn report(&self) -> Result<RankingReport> {
        let report = RankingReport::new(self.collect()?);
        info!(models = report.stats.len(), "ranking report generated");
        Ok(report)
    }

    /// Rank all models and overwrite both report files.
    pub fn write_reports(&self, json_path: &Path, csv_path: &Path) -> Result<RankingReport> {
        let report = self.report()?;
        report.write_json(json_path)?;
        report.write_csv(csv_path)?;
        info!(
            json = %json_path.display(),
            csv = %csv_path.display(),
            "ranking reports written"
        );
        Ok(report)
    }
}

//! # Sweep Controller
//!
//! Runs every hyperparameter combination to completion (train or reuse,
//! evaluate, persist stats) before starting the next one.

use tagsweep_core::{EvalStats, HyperparameterConfig, ModelId, TaggedRecord};
use tracing::info;

use crate::config::SweepConfig;
use crate::driver::Driver;
use crate::error::Result;
use crate::model::ModelBuilder;

/// Result of one sweep combination.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    pub config: HyperparameterConfig,
    pub id: ModelId,
    pub stats: EvalStats,
    pub reused: bool,
}

/// Train (or reuse) and evaluate one model per combination in `sweep`,
/// strictly in nested-loop order.
///
/// `records` are used both for training and for evaluation.
pub fn run_sweep<B: ModelBuilder>(
    driver: &Driver<B>,
    sweep: &SweepConfig,
    records: &[TaggedRecord],
) -> Result<Vec<SweepOutcome>> {
    let total = sweep.len();
    let mut outcomes = Vec::with_capacity(total);

    for (i, config) in sweep.combinations().enumerate() {
        info!(step = i + 1, total, %config, "sweep step");

        let trained = driver.train_or_load(&config, records)?;
        let stats = driver.evaluate(&trained.model, &config, records)?;
        driver.write_stats(&trained.id, &stats)?;

        outcomes.push(SweepOutcome {
            config,
            id: trained.id,
            stats,
            reused: trained.reused,
        });
    }

    Ok(outcomes)
}

//! Declarative pipelines: [`PipelineDef`] → [`Chain`] → [`PipelineReport`].

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use rinku_shared::{PipelineDef, Result, RunId};

use crate::chain::Chain;
use crate::dispatch::Dispatch;
use crate::link::Link;
use crate::outcome::Outcome;

/// One row of a run report. Index 0 is the seed.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub result: Outcome<Value>,
}

/// Serializable summary of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Identifier for log correlation.
    pub run_id: RunId,
    /// Pipeline name from the definition.
    pub pipeline: String,
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    /// Run duration in milliseconds.
    pub elapsed_ms: u64,
    /// Seed plus every executed step.
    pub steps: Vec<StepReport>,
    /// Final result (the halting failure if the run stopped early).
    pub result: Outcome<Value>,
    /// Whether a step returned a failure signal.
    pub halted: bool,
    /// Steps left unexecuted after a halt.
    pub skipped: usize,
}

/// A finished run: the chain for lookups and the report for display.
#[derive(Debug)]
pub struct PipelineRun {
    pub chain: Chain<Value>,
    pub report: PipelineReport,
}

/// Build an unrun chain from a validated definition.
///
/// Every step becomes a dispatch link on `dispatcher`; operation names are
/// not checked until the chain runs.
pub fn build_chain(
    def: &PipelineDef,
    dispatcher: Arc<dyn Dispatch<Value>>,
) -> Result<Chain<Value>> {
    def.validate()?;

    let chain = def.steps.iter().fold(
        Chain::named(def.seed.clone(), def.seed_name()),
        |chain, step| {
            let link = Link::dispatch(
                Arc::clone(&dispatcher),
                step.target.as_str(),
                step.operation.as_str(),
                step.args.clone(),
            );
            match &step.name {
                Some(name) => chain.push(link.named(name.as_str())),
                None => chain.push(link),
            }
        },
    );

    Ok(chain)
}

/// Build and run a pipeline, producing the chain and a report.
#[instrument(skip_all, fields(pipeline = %def.name, steps = def.steps.len()))]
pub fn run_pipeline(
    def: &PipelineDef,
    dispatcher: Arc<dyn Dispatch<Value>>,
) -> Result<PipelineRun> {
    let run_id = RunId::new();
    let started_at = Utc::now();
    let start = Instant::now();

    info!(%run_id, "starting pipeline run");

    let chain = build_chain(def, dispatcher)?.run()?;

    let steps = chain
        .resolved()
        .iter()
        .enumerate()
        .map(|(index, step)| StepReport {
            index,
            name: step.name().map(String::from),
            result: step.result().clone(),
        })
        .collect();

    let report = PipelineReport {
        run_id,
        pipeline: def.name.clone(),
        started_at,
        elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        steps,
        result: chain.result().clone(),
        halted: chain.is_halted(),
        skipped: chain.pending(),
    };

    info!(
        run_id = %report.run_id,
        halted = report.halted,
        skipped = report.skipped,
        elapsed_ms = report.elapsed_ms,
        "pipeline run complete"
    );

    Ok(PipelineRun { chain, report })
}

use anyhow::Result;

use crate::config::BenchConfig;
use crate::grid;
use crate::metrics;
use crate::report;
use crate::results::{ResultBuilder, ResultSet};
use crate::runner::{ExternalProgram, Program, TrialReport, TrialRunner};
use crate::types::{ParameterPoint, ReportRow};

/// Everything a finished run produced.
#[derive(Debug)]
pub struct BenchmarkRun {
    pub results: ResultSet,
    pub rows: Vec<ReportRow>,
    pub markdown: String,
}

/// Validate the config and enumerate the grid without running anything.
pub fn plan(config: &BenchConfig) -> Result<Vec<ParameterPoint>> {
    config.validate()?;
    grid::enumerate(&config.thread_counts, config.chunk_sizes.as_deref())
}

/// Run the full benchmark against `program` and write the report.
///
/// Points run one at a time in grid order and each point's trials run back
/// to back. Configuration problems surface before the first invocation; a
/// point with no usable timing fails the run before anything is written.
pub fn run_benchmark<P: Program>(
    config: &BenchConfig,
    program: P,
    on_trial: &mut dyn FnMut(&TrialReport<'_>),
) -> Result<BenchmarkRun> {
    let points = plan(config)?;
    let total_input_bytes = config.total_input_bytes()?;

    let mut runner = TrialRunner::new(program, config.marker.clone());
    let mut builder = ResultBuilder::with_capacity(points.len());

    for point in points {
        tracing::info!(%point, trials = config.trials, "running point");
        let result = runner.run(point, config.trials, on_trial);
        if result.min_time.is_none() {
            tracing::warn!(%point, "every trial failed to report a time");
        }
        builder.push(result);
    }

    let results = builder.finish();
    let rows = metrics::compute_rows(&results, total_input_bytes)?;
    let markdown = report::format_markdown(&config.input, &rows, config.trials);
    report::write_report(&config.output, &markdown)?;
    tracing::info!(path = %config.output.display(), rows = rows.len(), "report written");

    Ok(BenchmarkRun {
        results,
        rows,
        markdown,
    })
}

/// [`run_benchmark`] with the configured external command.
pub fn run_external(config: &BenchConfig, on_trial: &mut dyn FnMut(&TrialReport<'_>)) -> Result<BenchmarkRun> {
    let program = ExternalProgram::new(
        config.command.clone(),
        config.input.clone(),
        config.trial_timeout(),
    );
    run_benchmark(config, program, on_trial)
}

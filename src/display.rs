use std::path::Path;

use owo_colors::{OwoColorize, Stream, Style};

use crate::runner::{Outcome, TrialReport};
use crate::types::ReportRow;

// Style constants
fn style_point() -> Style {
    Style::new().cyan().bold()
}

fn style_dim_italic() -> Style {
    Style::new().dimmed().italic()
}

/// Describe an outcome that produced no timing.
pub fn describe_failure(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Completed => "no timing in output".to_string(),
        Outcome::Failed(status) => format!("no timing ({status})"),
        Outcome::SpawnFailed(err) => format!("could not start program: {err}"),
        Outcome::TimedOut(limit) => format!("timed out after {}s", limit.as_secs_f64()),
    }
}

/// One progress line per trial, e.g. `  threads=4  trial 2/3  1234ms`.
pub fn format_trial_line(report: &TrialReport<'_>, trials: usize, stream: Stream) -> String {
    let point = report
        .point
        .to_string()
        .if_supports_color(stream, |s| s.style(style_point()))
        .to_string();
    let counter = format!("trial {}/{}", report.trial, trials)
        .if_supports_color(stream, |s| s.dimmed())
        .to_string();
    let result = match report.sample {
        Some(sample) => sample
            .to_string()
            .if_supports_color(stream, |s| s.yellow())
            .to_string(),
        None => describe_failure(report.outcome)
            .if_supports_color(stream, |s| s.red())
            .to_string(),
    };
    format!("  {point}  {counter}  {result}")
}

/// Opening banner naming the input, grid size, and config source.
pub fn format_run_header(
    input: &Path,
    points: usize,
    trials: usize,
    config_source: Option<&Path>,
    stream: Stream,
) -> String {
    let source = match config_source {
        Some(path) => path.display().to_string(),
        None => "built-in defaults".to_string(),
    };
    let line = format!(
        "Benchmarking {} ({} points x {} trials, config: {})",
        input.display(),
        points,
        trials,
        source
    );
    format!(
        "{}\n",
        line.if_supports_color(stream, |s| s.dimmed())
    )
}

/// Compact console summary of the computed rows.
pub fn format_summary(rows: &[ReportRow], report_path: &Path) -> String {
    let mut out = String::from("\n");

    let point_width = rows
        .iter()
        .map(|r| r.point.to_string().len())
        .max()
        .unwrap_or(0);
    let point_style = style_point();

    for row in rows {
        let point = format!("{:<width$}", row.point.to_string(), width = point_width)
            .if_supports_color(Stream::Stdout, |s| s.style(point_style))
            .to_string();
        let min = format!("{:>8}", row.min_time.to_string())
            .if_supports_color(Stream::Stdout, |s| s.yellow())
            .to_string();
        let sp = format!("Sp {:>8.3}", row.speedup)
            .if_supports_color(Stream::Stdout, |s| s.green())
            .to_string();
        let ep = format!("Ep {:>6.3}", row.efficiency);
        let ep = if row.efficiency < 0.5 {
            ep.if_supports_color(Stream::Stdout, |s| s.style(style_dim_italic()))
                .to_string()
        } else {
            ep
        };
        out.push_str(&format!("  {point}  {min}  {sp}  {ep}\n"));
    }

    out.push('\n');
    let footer = format!("Report written to {}", report_path.display());
    out.push_str(
        &footer
            .if_supports_color(Stream::Stdout, |s| s.dimmed())
            .to_string(),
    );
    out.push('\n');
    out
}

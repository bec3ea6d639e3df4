use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::ScalebenchError;
use crate::types::{ReportRow, TrialSample};

const MISSING: &str = "-";

fn is_chunked(rows: &[ReportRow]) -> bool {
    rows.iter().any(|r| r.point.chunk_size_bytes.is_some())
}

fn trial_cell(trial: Option<&Option<TrialSample>>) -> String {
    match trial {
        Some(Some(sample)) => sample.to_string(),
        _ => MISSING.to_string(),
    }
}

/// Render the markdown report: a title naming the input, then one table row
/// per report row with a `Tp(k)` column for each of `trials` trials.
pub fn format_markdown(input: &Path, rows: &[ReportRow], trials: usize) -> String {
    let chunked = is_chunked(rows);
    let mut out = String::new();

    let _ = writeln!(out, "File: {}", input.display());
    out.push('\n');

    // Header and separator
    let mut header = String::from("|");
    let mut separator = String::from("|");
    if chunked {
        header.push_str(" Chunk Size (KB) | # | p | G |");
        separator.push_str("-----------------|---|---|---|");
    } else {
        header.push_str(" # | p |");
        separator.push_str("---|---|");
    }
    for k in 1..=trials {
        let _ = write!(header, " Tp({k}) |");
        separator.push_str("-------|");
    }
    header.push_str(" Tp(min) | Sp | Ep |");
    separator.push_str("---------|----|----|");
    out.push_str(&header);
    out.push('\n');
    out.push_str(&separator);
    out.push('\n');

    for row in rows {
        let mut line = String::from("|");
        if chunked {
            let chunk_kb = row.point.chunk_size_bytes.unwrap_or(0) / 1024;
            let g = row
                .granularity
                .map(|g| format!("{g:.2}"))
                .unwrap_or_else(|| MISSING.to_string());
            let _ = write!(
                line,
                " {:<17} | {:<2} | {:<2} | {:<5} |",
                chunk_kb, row.index, row.point.thread_count, g
            );
        } else {
            let _ = write!(line, " {:<2} | {:<2} |", row.index, row.point.thread_count);
        }
        for k in 0..trials {
            let _ = write!(line, " {:<6} |", trial_cell(row.trials.get(k)));
        }
        let min = row.min_time.to_string();
        let sp = format!("{:.6}", row.speedup);
        let ep = format!("{:.6}", row.efficiency);
        if chunked {
            let _ = write!(line, " {min:<7} | {sp:<8} | {ep:<8} |");
        } else {
            let _ = write!(line, " {min:<4} | {sp:<8} | {ep:<8} |");
        }
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Write the report, replacing whatever is at `path`.
pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    let wrap = |source| ScalebenchError::ReportWriteError {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    std::fs::write(path, contents).map_err(wrap)?;
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    input: String,
    generated_at: String,
    rows: &'a [ReportRow],
}

/// Pretty JSON rendering of the same rows, for scripting.
pub fn format_json(input: &Path, rows: &[ReportRow], now: DateTime<Utc>) -> String {
    let report = JsonReport {
        input: input.to_string_lossy().into_owned(),
        generated_at: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        rows,
    };
    serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParameterPoint;
    use std::fs;

    fn row(index: usize, point: ParameterPoint, trials: &[Option<u64>], speedup: f64) -> ReportRow {
        let trials: Vec<Option<TrialSample>> = trials.iter().map(|t| t.map(TrialSample)).collect();
        let min_time = trials.iter().flatten().copied().min().unwrap();
        ReportRow {
            index,
            point,
            trials,
            min_time,
            speedup,
            efficiency: speedup / f64::from(point.thread_count),
            granularity: point.chunk_size_bytes.map(|c| 10_485_760.0 / c as f64),
        }
    }

    #[test]
    fn unchunked_layout() {
        let rows = vec![
            row(1, ParameterPoint::threads(1), &[Some(1000), Some(1010), Some(1005)], 1.0),
            row(2, ParameterPoint::threads(2), &[Some(600), Some(610), Some(605)], 1000.0 / 600.0),
        ];
        let md = format_markdown(Path::new("inputs/300"), &rows, 3);
        let lines: Vec<&str> = md.lines().collect();

        assert_eq!(lines[0], "File: inputs/300");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "| # | p | Tp(1) | Tp(2) | Tp(3) | Tp(min) | Sp | Ep |");
        assert_eq!(lines[3], "|---|---|-------|-------|-------|---------|----|----|");
        assert_eq!(
            lines[4],
            "| 1  | 1  | 1000ms | 1010ms | 1005ms | 1000ms | 1.000000 | 1.000000 |"
        );
        assert_eq!(
            lines[5],
            "| 2  | 2  | 600ms  | 610ms  | 605ms  | 600ms | 1.666667 | 0.833333 |"
        );
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn trial_columns_follow_trial_count() {
        let rows = vec![row(1, ParameterPoint::threads(1), &[Some(42)], 1.0)];
        let md = format_markdown(Path::new("in"), &rows, 1);
        assert!(md.contains("| # | p | Tp(1) | Tp(min) | Sp | Ep |"));
        assert!(!md.contains("Tp(2)"));
        assert_eq!(md.matches("42ms").count(), 2);
    }

    #[test]
    fn failed_trials_render_as_dash() {
        let rows = vec![row(1, ParameterPoint::threads(1), &[None, Some(900), None], 1.0)];
        let md = format_markdown(Path::new("in"), &rows, 3);
        let last = md.lines().last().unwrap();
        assert_eq!(last, "| 1  | 1  | -      | 900ms  | -      | 900ms | 1.000000 | 1.000000 |");
    }

    #[test]
    fn chunked_layout() {
        let chunk = 1024 * 1024;
        let rows = vec![
            row(1, ParameterPoint::chunked(1, chunk), &[Some(500)], 1.0),
            row(2, ParameterPoint::chunked(4, chunk), &[Some(250)], 2.0),
        ];
        let md = format_markdown(Path::new("inputs/10"), &rows, 1);
        let lines: Vec<&str> = md.lines().collect();

        assert_eq!(lines[2], "| Chunk Size (KB) | # | p | G | Tp(1) | Tp(min) | Sp | Ep |");
        assert_eq!(lines[3], "|-----------------|---|---|---|-------|---------|----|----|");
        assert_eq!(
            lines[4],
            "| 1024              | 1  | 1  | 10.00 | 500ms  | 500ms   | 1.000000 | 1.000000 |"
        );
        assert_eq!(
            lines[5],
            "| 1024              | 2  | 4  | 10.00 | 250ms  | 250ms   | 2.000000 | 0.500000 |"
        );
    }

    #[test]
    fn write_replaces_existing_file() {
        let existing = tempfile::NamedTempFile::new().unwrap();
        fs::write(existing.path(), "old content that is much longer than the new one\n".repeat(20)).unwrap();

        write_report(existing.path(), "new\n").unwrap();
        assert_eq!(fs::read_to_string(existing.path()).unwrap(), "new\n");
    }

    #[test]
    fn write_creates_parent_directory() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let path = tmp.path().join("ReadChunks").join("times.md");
        write_report(&path, "x").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "x");
    }

    #[test]
    fn write_error_names_path() {
        let tmp = assert_fs::TempDir::new().unwrap();
        // A directory cannot be overwritten as a file.
        let err = write_report(tmp.path(), "x").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Failed to write report"), "{msg}");
        assert!(msg.contains(&tmp.path().display().to_string()), "{msg}");
    }

    #[test]
    fn json_contains_rows() {
        let rows = vec![row(1, ParameterPoint::chunked(2, 2048), &[Some(10), None], 1.5)];
        let now = DateTime::parse_from_rfc3339("2026-02-18T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let json = format_json(Path::new("inputs/1"), &rows, now);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["input"], "inputs/1");
        assert_eq!(parsed["generated_at"], "2026-02-18T00:00:00Z");
        let first = &parsed["rows"][0];
        assert_eq!(first["point"]["thread_count"], 2);
        assert_eq!(first["point"]["chunk_size_bytes"], 2048);
        assert_eq!(first["trials"][0], 10);
        assert!(first["trials"][1].is_null());
        assert_eq!(first["min_time"], 10);
        assert_eq!(first["speedup"], 1.5);
    }
}

use std::collections::HashMap;

use anyhow::Result;

use crate::errors::ScalebenchError;
use crate::results::ResultSet;
use crate::types::{ExperimentResult, ReportRow, TrialSample};

/// Minimum time of a result; a result without samples, or with a zero
/// minimum, cannot anchor a ratio.
pub fn min_time(result: &ExperimentResult) -> Result<TrialSample> {
    let min = result
        .min_time
        .ok_or(ScalebenchError::NoSamples { point: result.point })?;
    if min.millis() == 0 {
        return Err(ScalebenchError::ZeroMinTime { point: result.point }.into());
    }
    Ok(min)
}

pub fn speedup(baseline: TrialSample, time: TrialSample) -> f64 {
    baseline.millis() as f64 / time.millis() as f64
}

pub fn efficiency(speedup: f64, thread_count: u32) -> f64 {
    speedup / f64::from(thread_count)
}

pub fn granularity(total_input_bytes: u64, chunk_size_bytes: u64) -> f64 {
    total_input_bytes as f64 / chunk_size_bytes as f64
}

/// Reduce a finished run to report rows, in enumeration order.
///
/// Each chunk size is measured against its own single-thread result. Row
/// indices are 1-based and restart for every chunk size.
pub fn compute_rows(results: &ResultSet, total_input_bytes: Option<u64>) -> Result<Vec<ReportRow>> {
    let mut baselines: HashMap<Option<u64>, TrialSample> = HashMap::new();
    let mut positions: HashMap<Option<u64>, usize> = HashMap::new();
    let mut rows = Vec::with_capacity(results.len());

    for result in results.iter() {
        let point = result.point;
        let time = min_time(result)?;

        let baseline = match baselines.get(&point.chunk_size_bytes) {
            Some(&b) => b,
            None => {
                let base_result = results.baseline_for(point.chunk_size_bytes).ok_or_else(|| {
                    ScalebenchError::MissingBaseline {
                        context: match point.chunk_size_bytes {
                            Some(chunk) => format!("chunk size {chunk}B"),
                            None => "this run".to_string(),
                        },
                    }
                })?;
                let b = min_time(base_result)?;
                baselines.insert(point.chunk_size_bytes, b);
                b
            }
        };

        let position = positions.entry(point.chunk_size_bytes).or_insert(0);
        *position += 1;

        let sp = speedup(baseline, time);
        rows.push(ReportRow {
            index: *position,
            point,
            trials: result.trials.clone(),
            min_time: time,
            speedup: sp,
            efficiency: efficiency(sp, point.thread_count),
            granularity: point
                .chunk_size_bytes
                .zip(total_input_bytes)
                .map(|(chunk, total)| granularity(total, chunk)),
        });
    }

    Ok(rows)
}

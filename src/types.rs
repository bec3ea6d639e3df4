use std::fmt;

use serde::Serialize;

/// One benchmark configuration: thread count plus, for the chunked variant,
/// the chunk size handed to the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ParameterPoint {
    pub thread_count: u32,
    pub chunk_size_bytes: Option<u64>,
}

impl ParameterPoint {
    pub fn threads(thread_count: u32) -> Self {
        Self {
            thread_count,
            chunk_size_bytes: None,
        }
    }

    pub fn chunked(thread_count: u32, chunk_size_bytes: u64) -> Self {
        Self {
            thread_count,
            chunk_size_bytes: Some(chunk_size_bytes),
        }
    }

    pub fn is_baseline(&self) -> bool {
        self.thread_count == 1
    }
}

impl fmt::Display for ParameterPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chunk_size_bytes {
            Some(chunk) => write!(f, "threads={} chunk={}B", self.thread_count, chunk),
            None => write!(f, "threads={}", self.thread_count),
        }
    }
}

/// A single observed duration in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TrialSample(pub u64);

impl TrialSample {
    pub fn millis(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TrialSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// All trials for one point, in trial order. `None` marks a trial whose
/// output carried no parseable timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentResult {
    pub point: ParameterPoint,
    pub trials: Vec<Option<TrialSample>>,
    pub min_time: Option<TrialSample>,
}

impl ExperimentResult {
    pub fn new(point: ParameterPoint, trials: Vec<Option<TrialSample>>) -> Self {
        let min_time = trials.iter().flatten().copied().min();
        Self {
            point,
            trials,
            min_time,
        }
    }

    /// Recorded samples only, in trial order.
    pub fn samples(&self) -> impl Iterator<Item = TrialSample> + '_ {
        self.trials.iter().flatten().copied()
    }
}

/// One line of the final report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// 1-based position; restarts for each chunk size in the chunked variant.
    pub index: usize,
    pub point: ParameterPoint,
    pub trials: Vec<Option<TrialSample>>,
    pub min_time: TrialSample,
    pub speedup: f64,
    pub efficiency: f64,
    pub granularity: Option<f64>,
}

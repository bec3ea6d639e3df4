use crate::types::{ExperimentResult, ParameterPoint};

/// Collects results in enumeration order while the grid runs. Owned by the
/// driver; consumed by [`ResultBuilder::finish`] once every point is done.
#[derive(Debug, Default)]
pub struct ResultBuilder {
    results: Vec<ExperimentResult>,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(points: usize) -> Self {
        Self {
            results: Vec::with_capacity(points),
        }
    }

    pub fn push(&mut self, result: ExperimentResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn finish(self) -> ResultSet {
        ResultSet {
            results: self.results,
        }
    }
}

/// Completed, read-only results of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    results: Vec<ExperimentResult>,
}

impl ResultSet {
    pub fn iter(&self) -> impl Iterator<Item = &ExperimentResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// First result recorded for `point`. Duplicate points keep their own
    /// entries; lookup returns the earliest.
    pub fn get(&self, point: &ParameterPoint) -> Option<&ExperimentResult> {
        self.results.iter().find(|r| &r.point == point)
    }

    /// Single-thread result sharing `chunk_size_bytes`.
    pub fn baseline_for(&self, chunk_size_bytes: Option<u64>) -> Option<&ExperimentResult> {
        self.results
            .iter()
            .find(|r| r.point.is_baseline() && r.point.chunk_size_bytes == chunk_size_bytes)
    }
}

impl FromIterator<ExperimentResult> for ResultSet {
    fn from_iter<I: IntoIterator<Item = ExperimentResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

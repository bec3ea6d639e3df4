use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::errors::ScalebenchError;
use crate::extract::MarkerFormat;

pub const CONFIG_FILE_NAME: &str = "scalebench.toml";

/// Run parameters. Every field has a default, so a config file only needs to
/// name what differs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Program and leading arguments; point arguments are appended.
    pub command: Vec<String>,
    /// Input file handed to the program with `-f`.
    pub input: PathBuf,
    /// Markdown report destination (overwritten).
    pub output: PathBuf,
    pub thread_counts: Vec<u32>,
    /// Present only for the chunked variant.
    pub chunk_sizes: Option<Vec<u64>>,
    /// Trials per point.
    pub trials: usize,
    /// Total input size for granularity. Falls back to the input file's size.
    pub input_bytes: Option<u64>,
    pub trial_timeout_secs: Option<u64>,
    pub marker: MarkerFormat,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "java".to_string(),
                "ReadAllAtOnce/HuffmanParallelReadAllAtOnce".to_string(),
            ],
            input: PathBuf::from("inputs/300"),
            output: PathBuf::from("ReadAllAtOnce/execution_times_300MB.md"),
            thread_counts: vec![1, 2, 4, 8, 16, 32, 64, 128, 1024],
            chunk_sizes: None,
            trials: 3,
            input_bytes: None,
            trial_timeout_secs: None,
            marker: MarkerFormat::default(),
        }
    }
}

impl BenchConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ScalebenchError::ConfigReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    fn from_toml(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| {
            ScalebenchError::ConfigParseError {
                path: path.to_path_buf(),
                detail: e.message().to_string(),
            }
            .into()
        })
    }

    /// Resolve the config to use. An explicit path must exist; otherwise the
    /// first existing file in `search` wins, and built-in defaults apply when
    /// none does. Returns the file that was loaded, if any.
    pub fn discover(explicit: Option<&Path>, search: &[PathBuf]) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        for candidate in search {
            if candidate.is_file() {
                return Ok((Self::load(candidate)?, Some(candidate.clone())));
            }
        }
        Ok((Self::default(), None))
    }

    /// `./scalebench.toml`, then the per-user config directory.
    pub fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("scalebench").join("config.toml"));
        }
        paths
    }

    pub fn is_chunked(&self) -> bool {
        self.chunk_sizes.is_some()
    }

    pub fn trial_timeout(&self) -> Option<Duration> {
        self.trial_timeout_secs.map(Duration::from_secs)
    }

    /// Checks that must pass before any program invocation.
    pub fn validate(&self) -> Result<()> {
        if self.command.first().is_none_or(|program| program.is_empty()) {
            return Err(ScalebenchError::EmptyCommand.into());
        }
        if self.thread_counts.is_empty() {
            return Err(ScalebenchError::EmptyThreadCounts.into());
        }
        if self.thread_counts.contains(&0) {
            return Err(ScalebenchError::ZeroThreadCount.into());
        }
        if !self.thread_counts.contains(&1) {
            return Err(ScalebenchError::NoBaselineThreadCount.into());
        }
        if let Some(chunks) = &self.chunk_sizes {
            if chunks.is_empty() {
                return Err(ScalebenchError::EmptyChunkSizes.into());
            }
            if chunks.contains(&0) {
                return Err(ScalebenchError::ZeroChunkSize.into());
            }
        }
        if self.trials == 0 {
            return Err(ScalebenchError::ZeroTrials.into());
        }
        Ok(())
    }

    /// Total bytes of input for granularity; `None` for the unchunked variant.
    pub fn total_input_bytes(&self) -> Result<Option<u64>> {
        if !self.is_chunked() {
            return Ok(None);
        }
        if let Some(bytes) = self.input_bytes {
            return Ok(Some(bytes));
        }
        let metadata = std::fs::metadata(&self.input).map_err(|source| ScalebenchError::InputSizeUnknown {
            path: self.input.clone(),
            source,
        })?;
        Ok(Some(metadata.len()))
    }
}

/// Commented starter config printed by `scalebench init`.
pub const SAMPLE_CONFIG: &str = r#"# Program under test and its leading arguments.
# scalebench appends: -f <input> -t <threads> [-c <chunk>] -q
command = ["java", "ReadChunks/HuffmanParallelReadChunks"]

input = "inputs/10000"
output = "ReadChunks/execution_times_10000MB.md"

# Must include 1: the single-thread run is the speedup baseline.
thread_counts = [1, 2, 8, 16]

# Optional. When present, every chunk size is run against every thread count.
chunk_sizes = [33554432, 130023424]

trials = 3

# Optional. Total input size for granularity; defaults to the input file size.
# input_bytes = 10485760000

# Optional. Kill a single trial after this many seconds and skip its sample.
# trial_timeout_secs = 600

[marker]
phrase = "Total execution time for current run"
suffix = "ms."
"#;

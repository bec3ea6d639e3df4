use std::path::PathBuf;

use crate::types::ParameterPoint;

#[derive(thiserror::Error, Debug)]
pub enum ScalebenchError {
    #[error("No thread counts configured; nothing to benchmark")]
    EmptyThreadCounts,

    #[error("Chunk size list is present but empty; remove it or add at least one size")]
    EmptyChunkSizes,

    #[error("Thread counts must be positive (got 0)")]
    ZeroThreadCount,

    #[error("Chunk sizes must be positive (got 0)")]
    ZeroChunkSize,

    #[error("Trial count must be at least 1")]
    ZeroTrials,

    #[error("No external command configured")]
    EmptyCommand,

    #[error("Thread counts must include 1 to provide a speedup baseline")]
    NoBaselineThreadCount,

    #[error("Could not determine total input size of {path}: {source}")]
    InputSizeUnknown {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read config file {path}: {source}")]
    ConfigReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {detail}")]
    ConfigParseError { path: PathBuf, detail: String },

    #[error("No timing samples for {point}; every trial failed to report a time")]
    NoSamples { point: ParameterPoint },

    #[error("Minimum time for {point} is 0ms; speedup would be unbounded")]
    ZeroMinTime { point: ParameterPoint },

    #[error("No single-thread baseline result for {context}")]
    MissingBaseline { context: String },

    #[error("Failed to write report to {path}: {source}")]
    ReportWriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

use anyhow::Result;

use crate::errors::ScalebenchError;
use crate::types::ParameterPoint;

/// Build the ordered list of points to benchmark.
///
/// Chunk size is the outer dimension and thread count the inner one. Input
/// order is preserved and duplicates are kept, so each duplicate is measured
/// and reported as its own row.
pub fn enumerate(thread_counts: &[u32], chunk_sizes: Option<&[u64]>) -> Result<Vec<ParameterPoint>> {
    if thread_counts.is_empty() {
        return Err(ScalebenchError::EmptyThreadCounts.into());
    }
    if thread_counts.contains(&0) {
        return Err(ScalebenchError::ZeroThreadCount.into());
    }

    let Some(chunk_sizes) = chunk_sizes else {
        return Ok(thread_counts
            .iter()
            .map(|&t| ParameterPoint::threads(t))
            .collect());
    };

    if chunk_sizes.is_empty() {
        return Err(ScalebenchError::EmptyChunkSizes.into());
    }
    if chunk_sizes.contains(&0) {
        return Err(ScalebenchError::ZeroChunkSize.into());
    }

    let mut points = Vec::with_capacity(chunk_sizes.len() * thread_counts.len());
    for &chunk in chunk_sizes {
        for &threads in thread_counts {
            points.push(ParameterPoint::chunked(threads, chunk));
        }
    }
    Ok(points)
}

use thiserror::Error;

/// Domain failures of the visualization pipelines.
///
/// Everything else (I/O, CSV parsing, image and GIF encoding, plotting)
/// is propagated as-is through `anyhow` with context attached.
#[derive(Debug, Error, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub enum VisError {
    #[error("unknown benchmark function '{0}', expected one of: Booth, Eggholder, Ackley")]
    UnknownBenchmark(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("no runs to aggregate")]
    NoRuns,
    #[error("run {epoch} has {found} iterations, expected {expected}")]
    RaggedRuns {
        epoch: usize,
        expected: usize,
        found: usize,
    },
    #[error("every median fitness value is NaN")]
    NoFiniteFitness,
    #[error("run log '{0}' contains no rows")]
    EmptyLog(String),
    #[error("iteration {0} has no rows")]
    EmptyIteration(u32),
    #[error("no frames sent for encoding")]
    NoFrames,
    #[error("frame {index} is {found:?}, expected {expected:?}")]
    FrameMismatch {
        index: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },
}

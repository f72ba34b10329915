use thiserror::Error;

/// Error kinds surfaced by the core data model, codec, and validator.
///
/// `OutOfRange` is deliberately absent here: per the estimator's contract
/// it is a local, recoverable outcome (see `mm_tune_select::EstimateOutcome`),
/// never an error a caller must handle with `?`.
#[derive(Debug, Error)]
pub enum TuneError {
    #[error("malformed artifact: {0}")]
    ArtifactParse(String),

    #[error("artifact mismatch: {field} expected {expected:?}, got {actual:?}")]
    ArtifactMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("allocation failure: work buffer of {requested_bytes} bytes exceeds host limits")]
    AllocationFailure { requested_bytes: u64 },

    #[error("kernel invocation failed: {0}")]
    KernelInvocation(String),
}

pub type TuneResult<T> = Result<T, TuneError>;

//! The matmul kernel collaborator: an opaque, externally owned stage
//! invocation. The core never schedules threads or manages accelerator
//! context itself — it calls through this trait and records how long the
//! call took.

use crate::algebra::{Stage, StageConf};
use crate::error::TuneError;

/// Matrix dimensions for one stage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatmulDims {
    pub m: i64,
    pub n: u32,
    pub k: u32,
}

/// A synchronous, black-box stage runner. Implementations own whatever
/// accelerator context (OpenCL, cuBLAS, BLAS thread pool) the stage
/// needs; its lifecycle is not the core's concern.
///
/// `run_stage` must not retry internally — a sample is a sample, and the
/// harness (C5) is the only caller deciding how many samples to take.
pub trait MatmulKernel: Send + Sync {
    /// Run one stage once against `workbuf`, using `nth` workers if
    /// `conf.concurrency` calls for it. Returns `Err` only for a genuine
    /// kernel failure (`TuneError::KernelInvocation`) — never for
    /// "that stage is a no-op here", which callers avoid by checking
    /// `conf.is_absent()` before invoking.
    fn run_stage(
        &self,
        stage: Stage,
        conf: StageConf,
        dims: MatmulDims,
        nth: usize,
        workbuf: &mut [f32],
    ) -> Result<(), TuneError>;
}

//! Task-stage algebra (C1): the three stages of a matmul op and the
//! concurrency contract each stage can be given under a profile.

use serde::{Deserialize, Serialize};

/// Execution target for a stage.
///
/// `Cublas` and `ClBlast` are both GPU backends; `Accelerate` and
/// `OpenBlas` are CPU-side BLAS. Exactly one non-`Unknown` GPU backend is
/// compiled into any given build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    Unknown,
    Cpu,
    Accelerate,
    OpenBlas,
    Cublas,
    ClBlast,
}

impl Backend {
    /// True for the two backends treated uniformly as "GPU".
    pub fn is_gpu(self) -> bool {
        matches!(self, Backend::Cublas | Backend::ClBlast)
    }

    /// True for the two backends treated uniformly as "CPU-side BLAS".
    pub fn is_cpu_blas(self) -> bool {
        matches!(self, Backend::Accelerate | Backend::OpenBlas)
    }

    /// Short tag used in the artifact header and in mismatch messages.
    pub fn tag(self) -> &'static str {
        match self {
            Backend::Unknown => "unknown",
            Backend::Cpu => "cpu",
            Backend::Accelerate => "accelerate",
            Backend::OpenBlas => "openblas",
            Backend::Cublas => "cublas",
            Backend::ClBlast => "clblast",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Backend> {
        Some(match tag {
            "unknown" => Backend::Unknown,
            "cpu" => Backend::Cpu,
            "accelerate" => Backend::Accelerate,
            "openblas" => Backend::OpenBlas,
            "cublas" => Backend::Cublas,
            "clblast" => Backend::ClBlast,
            _ => return None,
        })
    }
}

/// How a single stage of one profile is scheduled across `nth` workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageConcurrency {
    /// Runs on one worker; siblings spin (keep-alive).
    SingleNoWait,
    /// Runs on one worker; siblings block until released. Used when the
    /// stage hands off to a library that parallelizes internally, so
    /// spinning siblings would steal its cores.
    SingleWait,
    /// All `nth` workers participate; cost scales ~1/nth.
    AllParallel,
    /// Stage is not executed under this profile.
    Absent,
}

impl StageConcurrency {
    /// Only `AllParallel` stages scale with `nth` during estimation.
    pub fn scales_with_nth(self) -> bool {
        matches!(self, StageConcurrency::AllParallel)
    }
}

/// One of the three stages of a matmul op, always executed in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Init,
    Compute,
    Finalize,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Init, Stage::Compute, Stage::Finalize];

    pub fn index(self) -> usize {
        match self {
            Stage::Init => 0,
            Stage::Compute => 1,
            Stage::Finalize => 2,
        }
    }
}

/// `(backend, concurrency)` pair assigned to one stage of one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageConf {
    pub backend: Backend,
    pub concurrency: StageConcurrency,
}

impl StageConf {
    pub fn new(backend: Backend, concurrency: StageConcurrency) -> Self {
        Self {
            backend,
            concurrency,
        }
    }

    pub fn absent() -> Self {
        Self {
            backend: Backend::Unknown,
            concurrency: StageConcurrency::Absent,
        }
    }

    pub fn is_absent(self) -> bool {
        matches!(self.concurrency, StageConcurrency::Absent)
    }
}

/// A fixed-length 3-tuple of `StageConf`, one per stage slot.
pub type Profile = [StageConf; 3];

//! Core data model for tuning quantized matmul execution profiles:
//! the task-stage algebra (C1), profile catalog (C2), tune data model
//! (C3), artifact codec (C4), and artifact validator (C8).
//!
//! The benchmark harness and the online estimator/selector are separate
//! crates (`mm-tune-bench`, `mm-tune-select`) built on top of this one.

pub mod algebra;
pub mod catalog;
pub mod codec;
pub mod error;
pub mod kernel;
pub mod model;
pub mod validate;

pub use algebra::{Backend, Profile, Stage, StageConcurrency, StageConf};
pub use catalog::ProfileCatalog;
pub use error::{TuneError, TuneResult};
pub use kernel::{MatmulDims, MatmulKernel};
pub use model::{Shape, TuneArtifact, TuneEntry};
pub use validate::{validate, ExpectedBuild};

/// Number of back-to-back timing samples the harness takes per
/// `(shape, M, profile, stage)` before reducing with `min`.
pub const NUM_BENCH: usize = 3;

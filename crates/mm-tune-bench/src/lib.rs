//! Benchmark harness (C5): drives a `MatmulKernel` across a cartesian
//! grid of shapes, M-values, profiles, and stages, producing a complete
//! `TuneArtifact`.

pub mod config;
pub mod harness;
pub mod progress;
pub mod reference_kernel;

pub use config::{Model, QuantType, TuneConfig};
pub use harness::BenchHarness;
pub use reference_kernel::ReferenceKernel;

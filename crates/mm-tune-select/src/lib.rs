//! Online profile selection over a measured tune artifact: the time
//! estimator (C6) and the profile selector (C7). Both are pure,
//! allocation-free on the hot path, and thread-safe by construction —
//! they only ever read an immutable `TuneArtifact`.

pub mod estimator;
pub mod selector;

pub use estimator::{estimate, EstimateOutcome};
pub use selector::{select_profile, TimeStats, EXTRAPOLATION_MIN_DIM};

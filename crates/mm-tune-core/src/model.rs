//! Tune data model (C3): shapes, M-grid, per-profile per-stage timings —
//! the artifact's in-memory form.

use serde::{Deserialize, Serialize};

use crate::algebra::Profile;
use crate::catalog::has_non_absent_stage;
use crate::error::{TuneError, TuneResult};

/// The fixed weight-matrix shape a tune targets: `{N, K}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub n: u32,
    pub k: u32,
}

impl Shape {
    pub fn new(n: u32, k: u32) -> Self {
        Self { n, k }
    }
}

/// One `(shape, M, profile) -> stages_time` record. `Absent` stage slots
/// always carry `0`; the codec and validator enforce this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuneEntry {
    pub stages_time: [i32; 3],
}

impl TuneEntry {
    pub fn new(stages_time: [i32; 3]) -> Self {
        Self { stages_time }
    }
}

/// The outermost aggregate persisted by the codec (C4) and consumed by
/// the estimator (C6). Constructed only through `TuneArtifact::new`,
/// which enforces the invariants from spec §3; once built it is treated
/// as immutable for the remainder of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuneArtifact {
    pub version: u32,
    pub model_tag: String,
    pub q_type_tag: String,
    pub gpu_backend_tag: String,
    pub m_step: i64,
    pub m_num: usize,
    pub shapes: Vec<Shape>,
    pub profile_layout: Vec<Profile>,
    /// Flat arena, length `shapes.len() * m_num * profile_layout.len()`,
    /// indexed by `canonical_index`.
    entries: Vec<TuneEntry>,
}

impl TuneArtifact {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: u32,
        model_tag: impl Into<String>,
        q_type_tag: impl Into<String>,
        gpu_backend_tag: impl Into<String>,
        m_step: i64,
        m_num: usize,
        shapes: Vec<Shape>,
        profile_layout: Vec<Profile>,
        entries: Vec<TuneEntry>,
    ) -> TuneResult<Self> {
        if m_step <= 0 {
            return Err(TuneError::ArtifactParse(format!(
                "m_step must be > 0, got {m_step}"
            )));
        }
        if m_num < 2 {
            return Err(TuneError::ArtifactParse(format!(
                "m_num must be >= 2, got {m_num}"
            )));
        }
        if shapes.is_empty() {
            return Err(TuneError::ArtifactParse("shapes must be non-empty".into()));
        }
        if profile_layout.is_empty() {
            return Err(TuneError::ArtifactParse(
                "n_profiles must be >= 1".into(),
            ));
        }
        for profile in &profile_layout {
            if !has_non_absent_stage(profile) {
                return Err(TuneError::ArtifactParse(
                    "every profile must have at least one non-absent stage".into(),
                ));
            }
        }

        let expected_len = shapes.len() * m_num * profile_layout.len();
        if entries.len() != expected_len {
            return Err(TuneError::ArtifactParse(format!(
                "entries length {} does not match shapes({}) * m_num({}) * n_profiles({}) = {}",
                entries.len(),
                shapes.len(),
                m_num,
                profile_layout.len(),
                expected_len
            )));
        }

        let artifact = Self {
            version,
            model_tag: model_tag.into(),
            q_type_tag: q_type_tag.into(),
            gpu_backend_tag: gpu_backend_tag.into(),
            m_step,
            m_num,
            shapes,
            profile_layout,
            entries,
        };
        artifact.check_absent_slots_are_zero()?;
        Ok(artifact)
    }

    fn check_absent_slots_are_zero(&self) -> TuneResult<()> {
        for shape_idx in 0..self.shapes.len() {
            for m_idx in 0..self.m_num {
                for (profile_idx, profile) in self.profile_layout.iter().enumerate() {
                    let entry = self.entry(shape_idx, m_idx, profile_idx);
                    for stage in 0..3 {
                        if profile[stage].is_absent() && entry.stages_time[stage] != 0 {
                            return Err(TuneError::ArtifactParse(format!(
                                "absent stage {stage} of profile {profile_idx} carries non-zero time {} at shape {shape_idx} m_idx {m_idx}",
                                entry.stages_time[stage]
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn n_profiles(&self) -> usize {
        self.profile_layout.len()
    }

    /// `M` value at grid index `m_idx` (0-based): `m_step * (m_idx + 1)`.
    pub fn m_value(&self, m_idx: usize) -> i64 {
        self.m_step * (m_idx as i64 + 1)
    }

    pub fn shape_index(&self, n: u32, k: u32) -> Option<usize> {
        self.shapes.iter().position(|s| s.n == n && s.k == k)
    }

    /// Canonical flat index: `((shape_idx * m_num) + m_idx) * n_profiles + profile_idx`.
    pub fn canonical_index(&self, shape_idx: usize, m_idx: usize, profile_idx: usize) -> usize {
        ((shape_idx * self.m_num) + m_idx) * self.n_profiles() + profile_idx
    }

    pub fn entry(&self, shape_idx: usize, m_idx: usize, profile_idx: usize) -> &TuneEntry {
        &self.entries[self.canonical_index(shape_idx, m_idx, profile_idx)]
    }

    pub fn entries(&self) -> &[TuneEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Backend, StageConcurrency, StageConf};

    fn cpu_only_profile() -> Profile {
        [
            StageConf::new(Backend::Cpu, StageConcurrency::SingleNoWait),
            StageConf::new(Backend::Cpu, StageConcurrency::AllParallel),
            StageConf::absent(),
        ]
    }

    #[test]
    fn rejects_non_increasing_m_step() {
        let err = TuneArtifact::new(
            1,
            "7B",
            "Q4_0",
            "cpu",
            0,
            2,
            vec![Shape::new(4096, 4096)],
            vec![cpu_only_profile()],
            vec![TuneEntry::new([0, 0, 0]); 2],
        )
        .unwrap_err();
        assert!(matches!(err, TuneError::ArtifactParse(_)));
    }

    #[test]
    fn rejects_nonzero_absent_slot() {
        let err = TuneArtifact::new(
            1,
            "7B",
            "Q4_0",
            "cpu",
            8,
            2,
            vec![Shape::new(4096, 4096)],
            vec![cpu_only_profile()],
            vec![TuneEntry::new([10, 20, 5]), TuneEntry::new([50, 60, 0])],
        )
        .unwrap_err();
        assert!(matches!(err, TuneError::ArtifactParse(_)));
    }

    #[test]
    fn m_value_matches_grid_formula() {
        let artifact = TuneArtifact::new(
            1,
            "7B",
            "Q4_0",
            "cpu",
            8,
            2,
            vec![Shape::new(4096, 4096)],
            vec![cpu_only_profile()],
            vec![TuneEntry::new([10, 20, 0]), TuneEntry::new([50, 60, 0])],
        )
        .unwrap();
        assert_eq!(artifact.m_value(0), 8);
        assert_eq!(artifact.m_value(1), 16);
    }
}

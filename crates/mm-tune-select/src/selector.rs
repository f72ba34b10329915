//! Profile selector (C7): runs the estimator over every profile in an
//! artifact and returns the one expected to be fastest, falling back to
//! a documented extrapolation heuristic when every profile is out of
//! range.

use mm_tune_core::{Backend, Stage, TuneArtifact};

use crate::estimator::{estimate, EstimateOutcome};

/// `M, N, K` dimensions at or beyond which the selector trusts a
/// BLAS-capable profile to win even without a measured grid point.
/// Carried over from the original tool's own hardcoded `32` — it is an
/// inherited heuristic, not a modelled decision (see DESIGN.md).
pub const EXTRAPOLATION_MIN_DIM: i64 = 32;

/// One total-time estimate per profile, plus the index selected as best.
#[derive(Debug, Clone)]
pub struct TimeStats {
    pub totals: Vec<Option<i64>>,
    pub best_profile_idx: usize,
}

/// Select the profile expected to minimize total time at `(M, N, K)`
/// with `nth` workers. Ties within 1 microsecond favor the lower
/// catalog index. If every profile is out of range, falls back to the
/// simple extrapolation rule from spec §4.7.
pub fn select_profile(artifact: &TuneArtifact, m: i64, n: u32, k: u32, nth: usize) -> TimeStats {
    let totals: Vec<Option<i64>> = (0..artifact.n_profiles())
        .map(|p| match estimate(artifact, m, n, k, nth, p) {
            EstimateOutcome::Estimated(t) => Some(t),
            EstimateOutcome::OutOfRange => None,
        })
        .collect();

    let best_profile_idx = pick_min(&totals).unwrap_or_else(|| extrapolate(artifact, m, n, k));

    TimeStats {
        totals,
        best_profile_idx,
    }
}

fn pick_min(totals: &[Option<i64>]) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (idx, total) in totals.iter().enumerate() {
        let Some(total) = total else { continue };
        best = match best {
            None => Some((idx, *total)),
            Some((best_idx, best_total)) => {
                if (*total - best_total).abs() < 1 || *total >= best_total {
                    Some((best_idx, best_total))
                } else {
                    Some((idx, *total))
                }
            }
        };
    }
    best.map(|(idx, _)| idx)
}

fn extrapolate(artifact: &TuneArtifact, m: i64, n: u32, k: u32) -> usize {
    let min_m = artifact.m_step;
    let max_m = artifact.m_step * artifact.m_num as i64;

    if m < min_m {
        return cpu_only_index(artifact);
    }

    if m > max_m
        && m >= EXTRAPOLATION_MIN_DIM
        && n as i64 >= EXTRAPOLATION_MIN_DIM
        && k as i64 >= EXTRAPOLATION_MIN_DIM
    {
        if let Some(idx) = blas_capable_index(artifact) {
            return idx;
        }
    }

    cpu_only_index(artifact)
}

fn cpu_only_index(artifact: &TuneArtifact) -> usize {
    artifact
        .profile_layout
        .iter()
        .position(|p| p[Stage::Compute.index()].backend == Backend::Cpu)
        .unwrap_or(0)
}

fn blas_capable_index(artifact: &TuneArtifact) -> Option<usize> {
    artifact
        .profile_layout
        .iter()
        .position(|p| p[Stage::Compute.index()].backend != Backend::Cpu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mm_tune_core::{Shape, StageConcurrency, StageConf, TuneEntry};

    fn two_profile_artifact(
        m8: ([i32; 3], [i32; 3]),
        m16: ([i32; 3], [i32; 3]),
    ) -> TuneArtifact {
        let cpu_only = [
            StageConf::new(Backend::Cpu, StageConcurrency::SingleNoWait),
            StageConf::new(Backend::Cpu, StageConcurrency::AllParallel),
            StageConf::absent(),
        ];
        let blas = [
            StageConf::new(Backend::Cpu, StageConcurrency::AllParallel),
            StageConf::new(Backend::Accelerate, StageConcurrency::SingleWait),
            StageConf::absent(),
        ];
        TuneArtifact::new(
            1,
            "7B",
            "Q4_0",
            "accelerate",
            8,
            2,
            vec![Shape::new(4096, 4096)],
            vec![cpu_only, blas],
            vec![
                TuneEntry::new(m8.0),
                TuneEntry::new(m8.1),
                TuneEntry::new(m16.0),
                TuneEntry::new(m16.1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn tie_break_prefers_lower_index_scenario_4() {
        let a = two_profile_artifact(([50, 50, 0], [50, 50, 0]), ([90, 90, 0], [90, 90, 0]));
        let stats = select_profile(&a, 8, 4096, 4096, 1);
        assert_eq!(stats.totals[0], stats.totals[1]);
        assert_eq!(stats.best_profile_idx, 0);
    }

    #[test]
    fn extrapolates_below_range_to_cpu_only_scenario_5() {
        let a = two_profile_artifact(([10, 20, 0], [30, 40, 0]), ([50, 60, 0], [70, 80, 0]));
        let stats = select_profile(&a, 2, 4096, 4096, 1);
        assert_eq!(stats.best_profile_idx, 0);
    }

    #[test]
    fn extrapolates_above_range_to_blas_scenario_5() {
        let a = two_profile_artifact(([10, 20, 0], [30, 40, 0]), ([50, 60, 0], [70, 80, 0]));
        let stats = select_profile(&a, 9999, 4096, 4096, 1);
        assert_eq!(stats.best_profile_idx, 1);
    }

    #[test]
    fn small_matrix_above_range_still_prefers_cpu_only() {
        let a = two_profile_artifact(([10, 20, 0], [30, 40, 0]), ([50, 60, 0], [70, 80, 0]));
        let stats = select_profile(&a, 9999, 16, 16, 1);
        assert_eq!(stats.best_profile_idx, 0);
    }
}

//! Time estimator (C6): pure function from `(artifact, M, N, K, nth,
//! profile_idx)` to a predicted total microsecond count, using exact grid
//! lookup or linear interpolation between bracketing M points.

use mm_tune_core::TuneArtifact;

/// Either a predicted time or a sentinel meaning the query falls outside
/// the artifact's measured grid. Never propagated as an error — C7
/// recovers locally from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateOutcome {
    Estimated(i64),
    OutOfRange,
}

/// Predict the total microsecond cost of `profile_idx` at `(M, N, K)`
/// with `nth` workers.
///
/// Locates the shape by exact `(N, K)` match; if `M` is outside
/// `[m_step, m_step * m_num]` or the shape is unmeasured, returns
/// `OutOfRange`. Otherwise sums per-stage times, either read directly off
/// a matching grid point or linearly interpolated between the two
/// bracketing points, dividing by `nth` for `AllParallel` stages only
/// (after interpolation, not before). An exact grid hit divides with
/// integer semantics, matching the recorded `i32` stage times exactly;
/// interpolation uses `f64` intermediates rounded to the nearest
/// microsecond, since the interpolated value itself is already inexact.
pub fn estimate(
    artifact: &TuneArtifact,
    m: i64,
    n: u32,
    k: u32,
    nth: usize,
    profile_idx: usize,
) -> EstimateOutcome {
    let Some(shape_idx) = artifact.shape_index(n, k) else {
        return EstimateOutcome::OutOfRange;
    };
    if profile_idx >= artifact.n_profiles() {
        return EstimateOutcome::OutOfRange;
    }

    let min_m = artifact.m_step;
    let max_m = artifact.m_step * artifact.m_num as i64;
    if m < min_m || m > max_m {
        return EstimateOutcome::OutOfRange;
    }

    let profile = artifact.profile_layout[profile_idx];
    let nth_i = nth.max(1) as i32;
    let nth = nth.max(1) as f64;

    if m % artifact.m_step == 0 {
        let idx = (m / artifact.m_step - 1) as usize;
        let entry = artifact.entry(shape_idx, idx, profile_idx);
        let mut total = 0i64;
        for s in 0..3 {
            let t = entry.stages_time[s];
            total += if profile[s].concurrency.scales_with_nth() {
                (t / nth_i) as i64
            } else {
                t as i64
            };
        }
        return EstimateOutcome::Estimated(total);
    }

    let floor_i = m / artifact.m_step;
    let prev_idx = (floor_i - 1) as usize;
    let next_idx = floor_i as usize;
    let prev_entry = artifact.entry(shape_idx, prev_idx, profile_idx);
    let next_entry = artifact.entry(shape_idx, next_idx, profile_idx);
    let prev_m = artifact.m_value(prev_idx) as f64;
    let next_m = artifact.m_value(next_idx) as f64;
    let x = (m as f64 - prev_m) / (next_m - prev_m);

    let mut total = 0.0f64;
    for s in 0..3 {
        let pv = prev_entry.stages_time[s] as f64;
        let nv = next_entry.stages_time[s] as f64;
        let t = pv + x * (nv - pv);
        total += if profile[s].concurrency.scales_with_nth() {
            t / nth
        } else {
            t
        };
    }
    EstimateOutcome::Estimated(total.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mm_tune_core::{Backend, Shape, StageConcurrency, StageConf, TuneArtifact, TuneEntry};

    fn cpu_profile_artifact() -> TuneArtifact {
        let profile = [
            StageConf::new(Backend::Cpu, StageConcurrency::SingleNoWait),
            StageConf::new(Backend::Cpu, StageConcurrency::AllParallel),
            StageConf::absent(),
        ];
        TuneArtifact::new(
            1,
            "7B",
            "Q4_0",
            "cpu",
            8,
            2,
            vec![Shape::new(4096, 4096)],
            vec![profile],
            vec![TuneEntry::new([10, 20, 0]), TuneEntry::new([50, 60, 0])],
        )
        .unwrap()
    }

    fn blas_profile_artifact() -> TuneArtifact {
        let profile = [
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
            vec![profile],
            vec![TuneEntry::new([30, 40, 0]), TuneEntry::new([70, 80, 0])],
        )
        .unwrap()
    }

    #[test]
    fn exact_grid_hit_scenario_1() {
        let a = cpu_profile_artifact();
        assert_eq!(
            estimate(&a, 8, 4096, 4096, 1, 0),
            EstimateOutcome::Estimated(30)
        );
        assert_eq!(
            estimate(&a, 16, 4096, 4096, 2, 0),
            EstimateOutcome::Estimated(80)
        );
    }

    #[test]
    fn exact_grid_hit_uses_integer_division_for_all_parallel() {
        let profile = [
            StageConf::new(Backend::Cpu, StageConcurrency::SingleNoWait),
            StageConf::new(Backend::Cpu, StageConcurrency::AllParallel),
            StageConf::absent(),
        ];
        let a = TuneArtifact::new(
            1,
            "7B",
            "Q4_0",
            "cpu",
            8,
            2,
            vec![Shape::new(4096, 4096)],
            vec![profile],
            vec![TuneEntry::new([10, 30, 0]), TuneEntry::new([10, 30, 0])],
        )
        .unwrap();
        // 30 / 4 == 7 (integer), not 7.5 rounded to 8.
        assert_eq!(
            estimate(&a, 8, 4096, 4096, 4, 0),
            EstimateOutcome::Estimated(17)
        );
    }

    #[test]
    fn interpolation_scenario_2() {
        let a = blas_profile_artifact();
        assert_eq!(
            estimate(&a, 12, 4096, 4096, 1, 0),
            EstimateOutcome::Estimated(110)
        );
        assert_eq!(
            estimate(&a, 12, 4096, 4096, 2, 0),
            EstimateOutcome::Estimated(85)
        );
    }

    #[test]
    fn out_of_range_scenario_3() {
        let a = cpu_profile_artifact();
        assert_eq!(estimate(&a, 7, 4096, 4096, 1, 0), EstimateOutcome::OutOfRange);
        assert_eq!(
            estimate(&a, 17, 4096, 4096, 1, 0),
            EstimateOutcome::OutOfRange
        );
    }

    #[test]
    fn unmeasured_shape_is_out_of_range() {
        let a = cpu_profile_artifact();
        assert_eq!(estimate(&a, 8, 1, 1, 1, 0), EstimateOutcome::OutOfRange);
    }

    #[test]
    fn interpolation_stays_between_bracketing_totals() {
        let a = blas_profile_artifact();
        let EstimateOutcome::Estimated(mid) = estimate(&a, 12, 4096, 4096, 1, 0) else {
            panic!("expected interpolated value");
        };
        let EstimateOutcome::Estimated(low) = estimate(&a, 8, 4096, 4096, 1, 0) else {
            panic!("expected grid value");
        };
        let EstimateOutcome::Estimated(high) = estimate(&a, 16, 4096, 4096, 1, 0) else {
            panic!("expected grid value");
        };
        assert!(mid >= low.min(high) && mid <= low.max(high));
    }
}

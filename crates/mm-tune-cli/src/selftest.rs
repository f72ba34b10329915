//! `test` subcommand: runs the end-to-end scenarios from the estimator
//! and selector contracts against fixed, hand-built artifacts, the way
//! the original tool's `test__estimate_time`/`test__choose_device` ran
//! without needing a test harness invocation.

use mm_tune_core::{Backend, Shape, StageConcurrency, StageConf, TuneArtifact, TuneEntry};
use mm_tune_select::{estimate, select_profile, EstimateOutcome};

/// Runs every scenario, printing a line per failure. Returns `true` iff
/// every scenario passed.
pub fn run_all() -> bool {
    let mut ok = true;
    for (name, result) in [
        ("exact_grid_hit", scenario_exact_grid_hit()),
        ("interpolation", scenario_interpolation()),
        ("out_of_range", scenario_out_of_range()),
        ("tie_break", scenario_tie_break()),
        ("extrapolation", scenario_extrapolation()),
    ] {
        match result {
            Ok(()) => println!("ok   {name}"),
            Err(msg) => {
                println!("FAIL {name}: {msg}");
                ok = false;
            }
        }
    }
    ok
}

fn cpu_only_artifact() -> TuneArtifact {
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
    .expect("fixture is well-formed")
}

fn blas_artifact() -> TuneArtifact {
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
    .expect("fixture is well-formed")
}

fn two_profile_artifact(entries: [[i32; 3]; 4]) -> TuneArtifact {
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
        entries.into_iter().map(TuneEntry::new).collect(),
    )
    .expect("fixture is well-formed")
}

fn expect_estimate(actual: EstimateOutcome, expected: i64) -> Result<(), String> {
    match actual {
        EstimateOutcome::Estimated(t) if t == expected => Ok(()),
        other => Err(format!("expected Estimated({expected}), got {other:?}")),
    }
}

fn scenario_exact_grid_hit() -> Result<(), String> {
    let a = cpu_only_artifact();
    expect_estimate(estimate(&a, 8, 4096, 4096, 1, 0), 30)?;
    expect_estimate(estimate(&a, 16, 4096, 4096, 2, 0), 80)
}

fn scenario_interpolation() -> Result<(), String> {
    let a = blas_artifact();
    expect_estimate(estimate(&a, 12, 4096, 4096, 1, 0), 110)?;
    expect_estimate(estimate(&a, 12, 4096, 4096, 2, 0), 85)
}

fn scenario_out_of_range() -> Result<(), String> {
    let a = cpu_only_artifact();
    for m in [7, 17] {
        match estimate(&a, m, 4096, 4096, 1, 0) {
            EstimateOutcome::OutOfRange => {}
            other => return Err(format!("expected OutOfRange at M={m}, got {other:?}")),
        }
    }
    Ok(())
}

fn scenario_tie_break() -> Result<(), String> {
    let a = two_profile_artifact([
        [50, 50, 0],
        [50, 50, 0],
        [90, 90, 0],
        [90, 90, 0],
    ]);
    let stats = select_profile(&a, 8, 4096, 4096, 1);
    if stats.best_profile_idx != 0 {
        return Err(format!(
            "expected tie-break to favor profile 0, got {}",
            stats.best_profile_idx
        ));
    }
    Ok(())
}

fn scenario_extrapolation() -> Result<(), String> {
    let a = two_profile_artifact([
        [10, 20, 0],
        [30, 40, 0],
        [50, 60, 0],
        [70, 80, 0],
    ]);
    let below = select_profile(&a, 2, 4096, 4096, 1);
    if below.best_profile_idx != 0 {
        return Err(format!(
            "expected CpuOnly below m_step, got profile {}",
            below.best_profile_idx
        ));
    }
    let above = select_profile(&a, 9999, 4096, 4096, 1);
    if above.best_profile_idx != 1 {
        return Err(format!(
            "expected BLAS profile above range, got profile {}",
            above.best_profile_idx
        ));
    }
    Ok(())
}

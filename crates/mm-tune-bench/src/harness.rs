//! Benchmark harness (C5): populates every entry of a freshly constructed
//! `TuneArtifact` by invoking the external matmul kernel across the
//! cartesian grid of (shape, M, profile, stage).

use std::time::Instant;

use anyhow::{Context, Result};
use mm_tune_core::{
    codec, Backend, MatmulDims, MatmulKernel, ProfileCatalog, Stage, TuneArtifact, TuneEntry,
    TuneError, NUM_BENCH,
};
use tracing::{info_span, warn};

use crate::config::TuneConfig;
use crate::progress::Spinner;

/// Drives `kernel` across every `(shape, m_idx, profile, stage)` cell
/// named by `config` and the given `gpu_backend`'s profile catalog,
/// producing a complete `TuneArtifact`.
///
/// Loop ordering is stable -- outer shape, middle M, inner profile,
/// innermost stage -- matching the artifact's storage layout (C3) and
/// the state machine `[PrintProgress] -> [RunAllProfiles/Stages] ->
/// [Erase]` per M-point. No retries: a sample is a sample.
pub struct BenchHarness<'a, K: MatmulKernel> {
    kernel: &'a K,
    gpu_backend: Backend,
}

impl<'a, K: MatmulKernel> BenchHarness<'a, K> {
    pub fn new(kernel: &'a K, gpu_backend: Backend) -> Self {
        Self {
            kernel,
            gpu_backend,
        }
    }

    pub fn run(&self, config: &TuneConfig) -> Result<TuneArtifact> {
        let catalog = ProfileCatalog::for_backend(self.gpu_backend);
        let shapes = config.model.shapes();
        let n_profiles = catalog.n_profiles();

        let mut workbuf = allocate_workbuf(&shapes)?;

        let samples_per_m_point: usize = (0..n_profiles)
            .map(|p| {
                let profile = catalog.profile(p).expect("index within catalog range");
                Stage::ALL
                    .iter()
                    .filter(|s| !profile[s.index()].is_absent())
                    .count()
            })
            .sum::<usize>()
            * NUM_BENCH;

        let mut entries = Vec::with_capacity(shapes.len() * config.m_num * n_profiles);

        for shape in &shapes {
            for m_idx in 0..config.m_num {
                let m = config.m_step * (m_idx as i64 + 1);
                let _span = info_span!("tune_step", n = shape.n, k = shape.k, m).entered();
                let mut spinner = Spinner::new();
                let mut sample_idx = 0usize;

                for profile_idx in 0..n_profiles {
                    let profile = catalog.profile(profile_idx).expect("index in range");
                    let mut stages_time = [0i32; 3];

                    for stage in Stage::ALL {
                        let conf = profile[stage.index()];
                        if conf.is_absent() {
                            continue;
                        }

                        if stage == Stage::Init {
                            // Prevent first-touch/TLB paging anomalies
                            // from inflating the first sample.
                            workbuf.iter_mut().for_each(|x| *x = 0.0);
                        }

                        let dims = MatmulDims {
                            m,
                            n: shape.n,
                            k: shape.k,
                        };

                        let mut samples = [0i64; NUM_BENCH];
                        for (nb, sample) in samples.iter_mut().enumerate() {
                            let start = Instant::now();
                            self.kernel
                                .run_stage(stage, conf, dims, config.nth, &mut workbuf)
                                .map_err(|e| anyhow::anyhow!(e))
                                .with_context(|| {
                                    format!(
                                        "kernel invocation failed at shape ({},{}) M={} profile={} stage={:?}",
                                        shape.n, shape.k, m, profile_idx, stage
                                    )
                                })?;
                            *sample = start.elapsed().as_micros() as i64;
                            if *sample == 0 {
                                warn!(
                                    n = shape.n,
                                    k = shape.k,
                                    m,
                                    profile_idx,
                                    ?stage,
                                    "implausible zero-microsecond sample"
                                );
                            }
                            spinner.sample(sample_idx, samples_per_m_point);
                            sample_idx += 1;
                            let _ = nb;
                        }
                        stages_time[stage.index()] =
                            samples.iter().copied().min().unwrap_or(0) as i32;
                    }

                    entries.push(TuneEntry::new(stages_time));
                }

                spinner.finish();
            }
        }

        let profile_layout = (0..n_profiles)
            .map(|i| catalog.profile(i).expect("index in range"))
            .collect();

        TuneArtifact::new(
            codec::CURRENT_VERSION,
            config.model.tag(),
            config.q_type.tag(),
            self.gpu_backend.tag(),
            config.m_step,
            config.m_num,
            shapes,
            profile_layout,
            entries,
        )
        .context("harness produced an invalid artifact")
    }
}

fn allocate_workbuf(shapes: &[mm_tune_core::Shape]) -> Result<Vec<f32>> {
    let max_elems = shapes
        .iter()
        .try_fold(0u64, |acc, s| {
            let elems = (s.n as u64).checked_mul(s.k as u64)?;
            Some(acc.max(elems))
        })
        .ok_or_else(|| TuneError::AllocationFailure {
            requested_bytes: u64::MAX,
        })?;

    let requested_bytes = max_elems
        .checked_mul(std::mem::size_of::<f32>() as u64)
        .ok_or(TuneError::AllocationFailure {
            requested_bytes: u64::MAX,
        })?;

    let len = usize::try_from(max_elems)
        .map_err(|_| TuneError::AllocationFailure { requested_bytes })?;

    Ok(vec![0.0f32; len])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Model, QuantType, TuneConfig};
    use crate::reference_kernel::ReferenceKernel;

    #[test]
    fn produces_entries_for_every_cell() {
        let kernel = ReferenceKernel::new(Backend::Cpu, 7);
        let harness = BenchHarness::new(&kernel, Backend::Unknown);
        let config = TuneConfig::new(Model::Model7B, QuantType::Q4_0, 8, 2, 2).unwrap();
        let artifact = harness.run(&config).unwrap();

        assert_eq!(artifact.n_profiles(), 1);
        assert_eq!(artifact.shapes.len(), 4);
        assert_eq!(artifact.entries().len(), 4 * 2 * 1);
    }

    #[test]
    fn absent_stage_entries_are_zero() {
        let kernel = ReferenceKernel::new(Backend::Cpu, 7);
        let harness = BenchHarness::new(&kernel, Backend::Unknown);
        let config = TuneConfig::new(Model::Model7B, QuantType::Q4_0, 8, 2, 2).unwrap();
        let artifact = harness.run(&config).unwrap();

        for entry in artifact.entries() {
            assert_eq!(entry.stages_time[2], 0, "Finalize is always absent here");
        }
    }
}

//! A synthetic, deterministic matmul kernel. NOT a real BLAS/Accelerate/
//! cuBLAS binding -- those remain out of scope -- it exists so the
//! harness (C5) has something concrete to drive end to end, the way
//! `PrimitiveOperation`'s default methods give every operation a working
//! fallback.

use std::time::Duration;

use mm_tune_core::{Backend, MatmulDims, MatmulKernel, Stage, StageConcurrency, StageConf, TuneError};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Cost-per-element tuning constant; arbitrary, chosen to keep small
/// test shapes fast and large production shapes survivable.
const NS_PER_ELEM_GROUP: f64 = 1.0 / 4096.0;

const SLEEP_CAP_US: f64 = 50_000.0;

pub struct ReferenceKernel {
    backend: Backend,
    seed: u64,
}

impl ReferenceKernel {
    pub fn new(backend: Backend, seed: u64) -> Self {
        Self { backend, seed }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    fn backend_divisor(conf_backend: Backend) -> f64 {
        match conf_backend {
            Backend::Cpu | Backend::Unknown => 1.0,
            Backend::Accelerate | Backend::OpenBlas => 4.0,
            Backend::Cublas | Backend::ClBlast => 8.0,
        }
    }

    fn stage_overhead_us(stage: Stage) -> f64 {
        match stage {
            Stage::Init => 20.0,
            Stage::Compute => 10.0,
            Stage::Finalize => 0.0,
        }
    }
}

impl MatmulKernel for ReferenceKernel {
    fn run_stage(
        &self,
        stage: Stage,
        conf: StageConf,
        dims: MatmulDims,
        nth: usize,
        workbuf: &mut [f32],
    ) -> Result<(), TuneError> {
        if conf.is_absent() {
            return Ok(());
        }
        if workbuf.is_empty() {
            return Err(TuneError::KernelInvocation(
                "work buffer is empty for a non-absent stage".into(),
            ));
        }

        let elems = (dims.m.max(0) as u64)
            .saturating_mul(dims.n as u64)
            .saturating_mul(dims.k as u64);
        let mut cost_us =
            Self::stage_overhead_us(stage) + (elems as f64 * NS_PER_ELEM_GROUP) / Self::backend_divisor(conf.backend);
        if conf.concurrency == StageConcurrency::AllParallel {
            cost_us /= nth.max(1) as f64;
        }

        let mix = self.seed
            ^ (dims.m as u64)
            ^ ((dims.n as u64) << 16)
            ^ ((dims.k as u64) << 32)
            ^ (stage.index() as u64) << 48;
        let mut rng = ChaCha8Rng::seed_from_u64(mix);
        let jitter: f64 = rng.gen_range(0.97..1.03);
        cost_us = (cost_us * jitter).max(1.0).min(SLEEP_CAP_US);

        std::thread::sleep(Duration::from_micros(cost_us as u64));

        // Touch the buffer so the "zero before Init" contract is
        // observable from outside.
        if let Some(first) = workbuf.first_mut() {
            *first += 1.0;
        }

        Ok(())
    }
}

//! Profile catalog (C2): the legal Profiles for the current build.

use crate::algebra::{Backend, Profile, Stage, StageConcurrency, StageConf};

/// A named profile together with its stable catalog index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub index: usize,
    pub name: &'static str,
    pub profile: Profile,
}

/// Enumerates the legal Profiles for a build compiled against `gpu_backend`
/// (or none, for CPU-only builds). At most one non-CPU profile is ever
/// added: a build either has a CPU-side BLAS, a GPU BLAS, or neither.
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    entries: Vec<CatalogEntry>,
}

impl ProfileCatalog {
    /// `gpu_backend` is the backend the running build was compiled
    /// against (`Backend::Unknown` for a CPU-only build). Only
    /// `Accelerate`, `OpenBlas`, `Cublas`, and `ClBlast` add a second
    /// profile; anything else yields a `CpuOnly`-only catalog.
    pub fn for_backend(gpu_backend: Backend) -> Self {
        let mut entries = vec![CatalogEntry {
            index: 0,
            name: "CpuOnly",
            profile: cpu_only(),
        }];

        if gpu_backend.is_cpu_blas() {
            entries.push(CatalogEntry {
                index: 1,
                name: "CpuInitBlasCompute",
                profile: cpu_init_blas_compute(gpu_backend),
            });
        } else if gpu_backend.is_gpu() {
            entries.push(CatalogEntry {
                index: 1,
                name: "BlasComputeOnly",
                profile: blas_compute_only(gpu_backend),
            });
        }

        Self { entries }
    }

    pub fn n_profiles(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn profile(&self, index: usize) -> Option<Profile> {
        self.entries.get(index).map(|e| e.profile)
    }
}

fn cpu_only() -> Profile {
    [
        StageConf::new(Backend::Cpu, StageConcurrency::SingleNoWait),
        StageConf::new(Backend::Cpu, StageConcurrency::AllParallel),
        StageConf::absent(),
    ]
}

fn cpu_init_blas_compute(blas: Backend) -> Profile {
    [
        StageConf::new(Backend::Cpu, StageConcurrency::AllParallel),
        StageConf::new(blas, StageConcurrency::SingleWait),
        StageConf::absent(),
    ]
}

fn blas_compute_only(gpu: Backend) -> Profile {
    [
        StageConf::absent(),
        StageConf::new(gpu, StageConcurrency::SingleNoWait),
        StageConf::absent(),
    ]
}

/// Every profile must name at least one non-`Absent` stage (§3 invariants).
pub fn has_non_absent_stage(profile: &Profile) -> bool {
    Stage::ALL
        .iter()
        .any(|s| !profile[s.index()].is_absent())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_only_build_has_one_profile() {
        let cat = ProfileCatalog::for_backend(Backend::Unknown);
        assert_eq!(cat.n_profiles(), 1);
        assert_eq!(cat.entries()[0].name, "CpuOnly");
    }

    #[test]
    fn cpu_blas_build_adds_second_profile() {
        let cat = ProfileCatalog::for_backend(Backend::Accelerate);
        assert_eq!(cat.n_profiles(), 2);
        assert_eq!(cat.entries()[1].name, "CpuInitBlasCompute");
    }

    #[test]
    fn gpu_build_adds_blas_compute_only() {
        let cat = ProfileCatalog::for_backend(Backend::Cublas);
        assert_eq!(cat.n_profiles(), 2);
        assert_eq!(cat.entries()[1].name, "BlasComputeOnly");
    }

    #[test]
    fn every_catalog_profile_has_non_absent_stage() {
        for backend in [
            Backend::Unknown,
            Backend::Accelerate,
            Backend::OpenBlas,
            Backend::Cublas,
            Backend::ClBlast,
        ] {
            let cat = ProfileCatalog::for_backend(backend);
            for entry in cat.entries() {
                assert!(has_non_absent_stage(&entry.profile));
            }
        }
    }
}

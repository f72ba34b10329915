//! Artifact validator (C8): is a loaded artifact usable on the current
//! build? Checks backend, model, and quant-type tags independently and
//! reports every mismatch, not just the first.

use crate::error::TuneError;
use crate::model::TuneArtifact;

/// What the running build expects a usable artifact to match.
#[derive(Debug, Clone)]
pub struct ExpectedBuild {
    pub gpu_backend_tag: String,
    pub model_tag: String,
    pub q_type_tag: String,
}

/// Validate `artifact` against `expected`, returning one `TuneError` per
/// mismatched field. An empty vec means the artifact is usable as-is.
pub fn validate(artifact: &TuneArtifact, expected: &ExpectedBuild) -> Vec<TuneError> {
    let mut errors = Vec::new();

    if artifact.gpu_backend_tag != expected.gpu_backend_tag {
        errors.push(TuneError::ArtifactMismatch {
            field: "gpu_backend_tag",
            expected: expected.gpu_backend_tag.clone(),
            actual: artifact.gpu_backend_tag.clone(),
        });
    }
    if artifact.model_tag != expected.model_tag {
        errors.push(TuneError::ArtifactMismatch {
            field: "model_tag",
            expected: expected.model_tag.clone(),
            actual: artifact.model_tag.clone(),
        });
    }
    if artifact.q_type_tag != expected.q_type_tag {
        errors.push(TuneError::ArtifactMismatch {
            field: "q_type_tag",
            expected: expected.q_type_tag.clone(),
            actual: artifact.q_type_tag.clone(),
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Backend, StageConcurrency, StageConf};
    use crate::model::{Shape, TuneEntry};

    fn sample_artifact(gpu_backend_tag: &str, model_tag: &str, q_type_tag: &str) -> TuneArtifact {
        let profile = [
            StageConf::new(Backend::Cpu, StageConcurrency::SingleNoWait),
            StageConf::new(Backend::Cpu, StageConcurrency::AllParallel),
            StageConf::absent(),
        ];
        TuneArtifact::new(
            1,
            model_tag,
            q_type_tag,
            gpu_backend_tag,
            8,
            2,
            vec![Shape::new(4096, 4096)],
            vec![profile],
            vec![TuneEntry::new([10, 20, 0]), TuneEntry::new([50, 60, 0])],
        )
        .unwrap()
    }

    #[test]
    fn matching_build_has_no_errors() {
        let artifact = sample_artifact("cpu", "7B", "Q4_0");
        let expected = ExpectedBuild {
            gpu_backend_tag: "cpu".into(),
            model_tag: "7B".into(),
            q_type_tag: "Q4_0".into(),
        };
        assert!(validate(&artifact, &expected).is_empty());
    }

    #[test]
    fn reports_all_mismatches_independently() {
        let artifact = sample_artifact("cublas", "13B", "Q8_0");
        let expected = ExpectedBuild {
            gpu_backend_tag: "cpu".into(),
            model_tag: "7B".into(),
            q_type_tag: "Q4_0".into(),
        };
        let errors = validate(&artifact, &expected);
        assert_eq!(errors.len(), 3);
    }
}

//! `analyze` subcommand report: per-M, per-stage, per-profile times, plus
//! an nth-sweep projection, grounded on the original tool's `cmd_analyze`.

use mm_tune_core::TuneArtifact;
use mm_tune_select::{estimate, EstimateOutcome};

const NTH_SWEEP: [usize; 5] = [1, 2, 4, 6, 8];

pub fn report(artifact: &TuneArtifact) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "model={};q_type={};backend={};m_step={};m_num={}\n",
        artifact.model_tag, artifact.q_type_tag, artifact.gpu_backend_tag, artifact.m_step, artifact.m_num
    ));

    for (shape_idx, shape) in artifact.shapes.iter().enumerate() {
        out.push_str(&format!("; shape N={} K={}\n", shape.n, shape.k));

        out.push_str("; M");
        for p in 0..artifact.n_profiles() {
            out.push_str(&format!(";profile{p}_init;profile{p}_compute;profile{p}_finalize"));
        }
        out.push('\n');

        for m_idx in 0..artifact.m_num {
            let m = artifact.m_value(m_idx);
            let mut fields = vec![m.to_string()];
            for profile_idx in 0..artifact.n_profiles() {
                let entry = artifact.entry(shape_idx, m_idx, profile_idx);
                for t in entry.stages_time {
                    fields.push(t.to_string());
                }
            }
            out.push_str(&fields.join(";"));
            out.push('\n');
        }

        out.push_str("; nth sweep (projected total time per profile)\n");
        out.push_str("; M;nth");
        for p in 0..artifact.n_profiles() {
            out.push_str(&format!(";profile{p}"));
        }
        out.push('\n');

        for m_idx in 0..artifact.m_num {
            let m = artifact.m_value(m_idx);
            for nth in NTH_SWEEP {
                let mut fields = vec![m.to_string(), nth.to_string()];
                for profile_idx in 0..artifact.n_profiles() {
                    match estimate(artifact, m, shape.n, shape.k, nth, profile_idx) {
                        EstimateOutcome::Estimated(t) => fields.push(t.to_string()),
                        EstimateOutcome::OutOfRange => fields.push("NA".to_string()),
                    }
                }
                out.push_str(&fields.join(";"));
                out.push('\n');
            }
        }
    }

    out
}

//! Artifact codec (C4): deterministic textual read/write of the tune data
//! model. Whitespace-separated, line-oriented; has no knowledge of the
//! kernel or timing semantics, only of the grammar.
//!
//! ```text
//! header     := version SP model SP q_type SP backend_id SP backend_tag SP
//!               n_shapes SP m_step SP m_num SP n_profiles NL
//! layout     := (backend_id SP parallel_bit SP wait_bit){3} NL   // n_profiles times
//! shape_blk  := N SP K NL
//!               (M (SP stage_time){3 * n_profiles} NL){m_num}
//! ```

use crate::algebra::{Backend, Profile, StageConcurrency, StageConf};
use crate::error::{TuneError, TuneResult};
use crate::model::{Shape, TuneArtifact, TuneEntry};

/// The only version this codec accepts. Older writers did not emit
/// `n_profiles`/`profile_layout`; decoders MUST refuse them rather than
/// best-effort parse (spec §9's file format upgrade path).
pub const CURRENT_VERSION: u32 = 1;

fn backend_id(backend: Backend) -> u8 {
    match backend {
        Backend::Unknown => 0,
        Backend::Cpu => 1,
        Backend::Accelerate => 2,
        Backend::OpenBlas => 3,
        Backend::Cublas => 4,
        Backend::ClBlast => 5,
    }
}

fn backend_from_id(id: u8) -> TuneResult<Backend> {
    Ok(match id {
        0 => Backend::Unknown,
        1 => Backend::Cpu,
        2 => Backend::Accelerate,
        3 => Backend::OpenBlas,
        4 => Backend::Cublas,
        5 => Backend::ClBlast,
        other => return Err(TuneError::ArtifactParse(format!("unknown backend id {other}"))),
    })
}

fn encode_stage_conf(conf: StageConf) -> (u8, u8, u8) {
    let parallel_bit = matches!(conf.concurrency, StageConcurrency::AllParallel) as u8;
    let wait_bit = matches!(conf.concurrency, StageConcurrency::SingleWait) as u8;
    (backend_id(conf.backend), parallel_bit, wait_bit)
}

fn decode_stage_conf(backend_id: u8, parallel_bit: u8, wait_bit: u8) -> TuneResult<StageConf> {
    let backend = backend_from_id(backend_id)?;
    let concurrency = match (parallel_bit, wait_bit) {
        (1, _) => StageConcurrency::AllParallel,
        (0, 1) => StageConcurrency::SingleWait,
        (0, 0) if backend == Backend::Unknown => StageConcurrency::Absent,
        (0, 0) => StageConcurrency::SingleNoWait,
        _ => {
            return Err(TuneError::ArtifactParse(format!(
                "invalid stage bits parallel={parallel_bit} wait={wait_bit}"
            )))
        }
    };
    Ok(StageConf {
        backend,
        concurrency,
    })
}

pub fn encode(artifact: &TuneArtifact) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{} {} {} {} {} {} {} {} {}\n",
        artifact.version,
        artifact.model_tag,
        artifact.q_type_tag,
        backend_id(Backend::from_tag(&artifact.gpu_backend_tag).unwrap_or(Backend::Unknown)),
        artifact.gpu_backend_tag,
        artifact.shapes.len(),
        artifact.m_step,
        artifact.m_num,
        artifact.n_profiles(),
    ));

    for profile in &artifact.profile_layout {
        let mut fields = Vec::with_capacity(9);
        for stage in profile {
            let (id, parallel, wait) = encode_stage_conf(*stage);
            fields.push(id.to_string());
            fields.push(parallel.to_string());
            fields.push(wait.to_string());
        }
        out.push_str(&fields.join(" "));
        out.push('\n');
    }

    for (shape_idx, shape) in artifact.shapes.iter().enumerate() {
        out.push_str(&format!("{} {}\n", shape.n, shape.k));
        for m_idx in 0..artifact.m_num {
            let mut fields = vec![artifact.m_value(m_idx).to_string()];
            for profile_idx in 0..artifact.n_profiles() {
                let entry = artifact.entry(shape_idx, m_idx, profile_idx);
                for t in entry.stages_time {
                    fields.push(t.to_string());
                }
            }
            out.push_str(&fields.join(" "));
            out.push('\n');
        }
    }

    out
}

pub fn decode(text: &str) -> TuneResult<TuneArtifact> {
    let mut lines = text.lines();

    let header = lines
        .next()
        .ok_or_else(|| TuneError::ArtifactParse("empty artifact: missing header".into()))?;
    let header_fields: Vec<&str> = header.split_whitespace().collect();
    if header_fields.len() != 9 {
        return Err(TuneError::ArtifactParse(format!(
            "header expects 9 fields, got {}",
            header_fields.len()
        )));
    }

    let version: u32 = parse_field(header_fields[0], "version")?;
    if version != CURRENT_VERSION {
        return Err(TuneError::ArtifactParse(format!(
            "unsupported artifact version {version}, expected {CURRENT_VERSION}"
        )));
    }
    let model_tag = header_fields[1].to_string();
    let q_type_tag = header_fields[2].to_string();
    let _backend_id: u8 = parse_field(header_fields[3], "backend_id")?;
    let gpu_backend_tag = header_fields[4].to_string();
    let n_shapes: usize = parse_field(header_fields[5], "n_shapes")?;
    let m_step: i64 = parse_field(header_fields[6], "m_step")?;
    let m_num: usize = parse_field(header_fields[7], "m_num")?;
    let n_profiles: usize = parse_field(header_fields[8], "n_profiles")?;

    let mut profile_layout = Vec::with_capacity(n_profiles);
    for _ in 0..n_profiles {
        let line = lines
            .next()
            .ok_or_else(|| TuneError::ArtifactParse("missing profile layout line".into()))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 9 {
            return Err(TuneError::ArtifactParse(format!(
                "profile layout line expects 9 fields, got {}",
                fields.len()
            )));
        }
        let mut stages = [StageConf::absent(); 3];
        for (stage_idx, stage) in stages.iter_mut().enumerate() {
            let base = stage_idx * 3;
            let id: u8 = parse_field(fields[base], "stage backend_id")?;
            let parallel: u8 = parse_field(fields[base + 1], "stage parallel_bit")?;
            let wait: u8 = parse_field(fields[base + 2], "stage wait_bit")?;
            *stage = decode_stage_conf(id, parallel, wait)?;
        }
        let profile: Profile = stages;
        profile_layout.push(profile);
    }

    let mut shapes = Vec::with_capacity(n_shapes);
    let mut entries = Vec::with_capacity(n_shapes * m_num * n_profiles);

    for _ in 0..n_shapes {
        let shape_line = lines
            .next()
            .ok_or_else(|| TuneError::ArtifactParse("missing shape line".into()))?;
        let fields: Vec<&str> = shape_line.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(TuneError::ArtifactParse(format!(
                "shape line expects 2 fields, got {}",
                fields.len()
            )));
        }
        let n: u32 = parse_field(fields[0], "shape N")?;
        let k: u32 = parse_field(fields[1], "shape K")?;
        shapes.push(Shape::new(n, k));

        let mut prev_m: Option<i64> = None;
        for m_idx in 0..m_num {
            let row = lines
                .next()
                .ok_or_else(|| TuneError::ArtifactParse("missing M row".into()))?;
            let fields: Vec<&str> = row.split_whitespace().collect();
            let expected = 1 + 3 * n_profiles;
            if fields.len() != expected {
                return Err(TuneError::ArtifactParse(format!(
                    "M row expects {expected} fields, got {}",
                    fields.len()
                )));
            }
            let m: i64 = parse_field(fields[0], "M")?;
            let expected_m = m_step * (m_idx as i64 + 1);
            if m != expected_m {
                return Err(TuneError::ArtifactParse(format!(
                    "M row {m_idx} expected M={expected_m}, got {m}"
                )));
            }
            if let Some(prev) = prev_m {
                if m <= prev {
                    return Err(TuneError::ArtifactParse(
                        "M points must be strictly increasing".into(),
                    ));
                }
            }
            prev_m = Some(m);

            for profile_idx in 0..n_profiles {
                let base = 1 + profile_idx * 3;
                let mut stages_time = [0i32; 3];
                for (s, slot) in stages_time.iter_mut().enumerate() {
                    *slot = parse_field(fields[base + s], "stage_time")?;
                }
                entries.push(TuneEntry::new(stages_time));
            }
        }
    }

    TuneArtifact::new(
        version,
        model_tag,
        q_type_tag,
        gpu_backend_tag,
        m_step,
        m_num,
        shapes,
        profile_layout,
        entries,
    )
}

fn parse_field<T: std::str::FromStr>(field: &str, name: &str) -> TuneResult<T> {
    field
        .parse()
        .map_err(|_| TuneError::ArtifactParse(format!("could not parse {name} from {field:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Backend, StageConcurrency, StageConf};

    fn sample_artifact() -> TuneArtifact {
        let profile: Profile = [
            StageConf::new(Backend::Cpu, StageConcurrency::SingleNoWait),
            StageConf::new(Backend::Cpu, StageConcurrency::AllParallel),
            StageConf::absent(),
        ];
        TuneArtifact::new(
            CURRENT_VERSION,
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

    #[test]
    fn round_trips() {
        let artifact = sample_artifact();
        let text = encode(&artifact);
        let decoded = decode(&text).unwrap();
        assert_eq!(encode(&decoded), text);
        assert_eq!(decoded.m_step, artifact.m_step);
        assert_eq!(decoded.shapes, artifact.shapes);
        assert_eq!(decoded.entries(), artifact.entries());
    }

    #[test]
    fn rejects_unknown_version() {
        let artifact = sample_artifact();
        let text = encode(&artifact).replacen("1 ", "2 ", 1);
        assert!(matches!(decode(&text), Err(TuneError::ArtifactParse(_))));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = decode("1 7B Q4_0 1 cpu 1 8 2\n").unwrap_err();
        assert!(matches!(err, TuneError::ArtifactParse(_)));
    }

    #[test]
    fn rejects_non_increasing_m() {
        let artifact = sample_artifact();
        let text = encode(&artifact);
        let bad = text.replacen("16 50 60 0", "8 50 60 0", 1);
        assert!(matches!(decode(&bad), Err(TuneError::ArtifactParse(_))));
    }
}

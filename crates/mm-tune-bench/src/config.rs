//! Bench configuration: which model's weight shapes to tune, which quant
//! type the tag records, and the M-grid to sweep.

use anyhow::{bail, Result};
use mm_tune_core::Shape;

/// Named model, used only to look up a fixed shape table — the core
/// never interprets the tag beyond storing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Model7B,
    Model13B,
}

impl Model {
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "7B" => Model::Model7B,
            "13B" => Model::Model13B,
            "30B" | "65B" => bail!("model {name} is not supported by this tuner"),
            other => bail!("unknown model {other}"),
        })
    }

    pub fn tag(self) -> &'static str {
        match self {
            Model::Model7B => "7B",
            Model::Model13B => "13B",
        }
    }

    /// The fixed set of weight-matrix shapes this model's matmuls use.
    pub fn shapes(self) -> Vec<Shape> {
        match self {
            Model::Model7B => vec![
                Shape::new(4096, 4096),
                Shape::new(4096, 11008),
                Shape::new(11008, 4096),
                Shape::new(32000, 4096),
            ],
            Model::Model13B => vec![
                Shape::new(5120, 5120),
                Shape::new(5120, 13824),
                Shape::new(13824, 5120),
                Shape::new(32000, 5120),
            ],
        }
    }
}

/// Named quantization scheme. Treated opaquely: only the tag is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantType {
    Q4_0,
    Q4_1,
    Q5_0,
    Q5_1,
    Q8_0,
}

impl QuantType {
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "Q4_0" => QuantType::Q4_0,
            "Q4_1" => QuantType::Q4_1,
            "Q5_0" => QuantType::Q5_0,
            "Q5_1" => QuantType::Q5_1,
            "Q8_0" => QuantType::Q8_0,
            other => bail!("unknown quant type {other}"),
        })
    }

    pub fn tag(self) -> &'static str {
        match self {
            QuantType::Q4_0 => "Q4_0",
            QuantType::Q4_1 => "Q4_1",
            QuantType::Q5_0 => "Q5_0",
            QuantType::Q5_1 => "Q5_1",
            QuantType::Q8_0 => "Q8_0",
        }
    }
}

/// Everything the harness needs to run one full bench.
#[derive(Debug, Clone)]
pub struct TuneConfig {
    pub model: Model,
    pub q_type: QuantType,
    pub m_step: i64,
    pub m_num: usize,
    /// Worker count the kernel is asked to use for `AllParallel` stages
    /// during the bench itself (distinct from the `nth` an online caller
    /// later plugs into the estimator).
    pub nth: usize,
}

impl TuneConfig {
    pub fn new(
        model: Model,
        q_type: QuantType,
        m_step: i64,
        m_num: usize,
        nth: usize,
    ) -> Result<Self> {
        if m_step <= 0 {
            bail!("m_step must be > 0, got {m_step}");
        }
        if m_num < 2 {
            bail!("m_num must be >= 2, got {m_num}");
        }
        if nth == 0 {
            bail!("nth must be >= 1");
        }
        Ok(Self {
            model,
            q_type,
            m_step,
            m_num,
            nth,
        })
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_q_type(mut self, q_type: QuantType) -> Self {
        self.q_type = q_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_models() {
        assert!(Model::parse("30B").is_err());
        assert!(Model::parse("65B").is_err());
    }

    #[test]
    fn seven_b_has_four_shapes() {
        assert_eq!(Model::Model7B.shapes().len(), 4);
    }
}

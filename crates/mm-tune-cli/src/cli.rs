//! Command-line surface: `bench`, `analyze`, `test`, `help`.
//!
//! Flag names favor the idiomatic `--long-flag` clap convention over the
//! original tool's single-dash getopt style.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mm-tune")]
#[command(about = "Tune and select quantized matmul execution profiles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a full benchmark and write the resulting artifact.
    Bench {
        /// Target model; only its weight shapes are used.
        #[arg(long, value_parser = ["7B", "13B"])]
        model: String,

        /// Quantization scheme tag recorded in the artifact.
        #[arg(long = "type", value_parser = ["Q4_0", "Q4_1", "Q5_0", "Q5_1", "Q8_0"])]
        q_type: String,

        /// M-grid step size.
        #[arg(long, default_value_t = 8)]
        m_step: i64,

        /// Number of M-grid points.
        #[arg(long, default_value_t = 8)]
        m_num: usize,

        /// Worker count used for AllParallel stages during the bench.
        #[arg(long, default_value_t = 4)]
        nth: usize,

        /// Where to write the artifact. Defaults to stdout when omitted.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Suppress the overwrite confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Load an artifact and print a per-M/profile/stage report, with an
    /// nth-sweep projection over {1, 2, 4, 6, 8}.
    Analyze {
        /// Path to an existing tune artifact.
        path: PathBuf,
    },

    /// Run the built-in estimator/selector scenarios against a fixed
    /// in-memory artifact.
    Test,

    /// Print usage.
    Help,
}

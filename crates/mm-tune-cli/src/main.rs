mod analyze;
mod cli;
mod prompt;
mod selftest;

use std::process;

use clap::{CommandFactory, Parser};
use mm_tune_bench::{BenchHarness, Model, QuantType, ReferenceKernel, TuneConfig};
use mm_tune_core::{codec, Backend};

use cli::{Cli, Command};

/// No real BLAS/OpenCL/cuBLAS bindings ship with this tool (out of
/// scope, spec §1); the catalog is therefore always CPU-only.
const COMPILED_BACKEND: Backend = Backend::Unknown;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    let code = match cli.command {
        Command::Bench {
            model,
            q_type,
            m_step,
            m_num,
            nth,
            file,
            yes,
        } => run_bench(&model, &q_type, m_step, m_num, nth, file, yes),
        Command::Analyze { path } => run_analyze(&path),
        Command::Test => {
            if selftest::run_all() {
                0
            } else {
                1
            }
        }
        Command::Help => {
            let _ = Cli::command().print_help();
            println!();
            0
        }
    };

    process::exit(code);
}

fn run_bench(
    model: &str,
    q_type: &str,
    m_step: i64,
    m_num: usize,
    nth: usize,
    file: Option<std::path::PathBuf>,
    yes: bool,
) -> i32 {
    let model = match Model::parse(model) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let q_type = match QuantType::parse(q_type) {
        Ok(q) => q,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let config = match TuneConfig::new(model, q_type, m_step, m_num, nth) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    if let Some(path) = &file {
        if path.exists() && !yes {
            match prompt::confirm_overwrite(path) {
                Ok(true) => {}
                Ok(false) => {
                    println!("aborted");
                    return 2;
                }
                Err(err) => {
                    eprintln!("{err}");
                    return 1;
                }
            }
        }
    }

    let kernel = ReferenceKernel::new(COMPILED_BACKEND, 42);
    let harness = BenchHarness::new(&kernel, COMPILED_BACKEND);
    let artifact = match harness.run(&config) {
        Ok(a) => a,
        Err(err) => {
            eprintln!("bench failed: {err:#}");
            return 1;
        }
    };

    let text = codec::encode(&artifact);
    match file {
        Some(path) => {
            if let Err(err) = std::fs::write(&path, text) {
                eprintln!("could not write {}: {err}", path.display());
                return 1;
            }
        }
        None => print!("{text}"),
    }

    0
}

fn run_analyze(path: &std::path::Path) -> i32 {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(err) => {
            eprintln!("could not read {}: {err}", path.display());
            return 1;
        }
    };
    let artifact = match codec::decode(&text) {
        Ok(a) => a,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    print!("{}", analyze::report(&artifact));
    0
}

//! Command line front end: rectifies a BLIF implementation against a BLIF specification.
//!
//! ```shell
//! $ rectify --impl assets/circuits/scenario_a_impl.blif \
//!     --spec assets/circuits/scenario_a_spec.blif --fix t3
//! ```
//!
//! Exit status is 0 when a fix was found, 1 when none exists or anything failed.

use std::{path::PathBuf, process::exit};

use clap::Parser;

use rectify::{
    Circuit, ParserError, Result,
    cegis::{RectifyConfig, RectifyStatus, rectify},
    circuit::dot::GraphvizStyle,
    encoder::BlockEncoder,
};

/// Repairs suspect gates of a combinational circuit so it matches a specification.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Implementation (faulty) circuit, in BLIF
    #[arg(long = "impl", value_name = "BLIF")]
    implementation: PathBuf,

    /// Specification (reference) circuit, in BLIF
    #[arg(long, value_name = "BLIF")]
    spec: PathBuf,

    /// Comma separated names of the suspect gates
    #[arg(
        long,
        value_delimiter = ',',
        required_unless_present = "fix_all",
        conflicts_with = "fix_all"
    )]
    fix: Vec<String>,

    /// Every gate of the implementation is a suspect (within --max-arity)
    #[arg(long)]
    fix_all: bool,

    /// Maximum number of synthesis iterations
    #[arg(long, value_name = "N")]
    max_iter: Option<usize>,

    /// Maximum arity of a suspect gate
    #[arg(long, value_name = "K", default_value_t = 2)]
    max_arity: usize,

    /// Do not try the original gate functions first
    #[arg(long)]
    no_prefer_incumbent: bool,

    /// Print statistics of both circuits
    #[arg(long)]
    stats: bool,

    /// Write the parameterized implementation in the Graphviz dot format
    #[arg(long, value_name = "FILE")]
    dot: Option<PathBuf>,

    /// Log debug messages (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

/// Total number of parameters of the blocks replacing `suspects`.
fn count_parameters(
    implementation: &Circuit,
    suspects: &[String],
    max_arity: usize,
) -> Result<usize> {
    Ok(BlockEncoder::new(max_arity)
        .encode(implementation, suspects)?
        .num_params())
}

fn run(cli: &Cli) -> Result<RectifyStatus> {
    let implementation = Circuit::from_file(&cli.implementation)?;
    let spec = Circuit::from_file(&cli.spec)?;

    if cli.stats {
        println!("Specification {}:\n{}", spec.get_name(), spec.stats());
        println!(
            "Implementation {}:\n{}",
            implementation.get_name(),
            implementation.stats()
        );
    }

    let suspects: Vec<String> = if cli.fix_all {
        implementation
            .get_gates()
            .iter()
            .filter(|gate| gate.arity() <= cli.max_arity)
            .map(|gate| gate.get_name().to_string())
            .collect()
    } else {
        cli.fix.clone()
    };

    let mut config = RectifyConfig::default()
        .with_max_arity(cli.max_arity)
        .with_prefer_incumbent(!cli.no_prefer_incumbent);
    if let Some(max_iter) = cli.max_iter {
        config = config.with_max_iterations(max_iter);
    }

    println!("Circuit: {}", implementation.get_name());
    println!("Suspects: {}", suspects.join(", "));
    // Printed before solving, a failed run still shows it
    println!(
        "Parameters: {}",
        count_parameters(&implementation, &suspects, cli.max_arity)?
    );
    let report = rectify(&spec, &implementation, &suspects, config)?;

    if let Some(path) = &cli.dot {
        let dot = report
            .parameterized
            .get_circuit()
            .to_dot(&GraphvizStyle::default());
        std::fs::write(path, dot)
            .map_err(|e| ParserError::IoError(format!("{}: {}", path.display(), e)))?;
    }

    println!();
    println!("RESULTS");
    println!("  Status: {}", report.status);
    println!("  Iterations: {}", report.iterations);
    println!("  Counterexamples: {}", report.counterexamples.len());
    println!("  Elapsed: {:.3}s", report.elapsed.as_secs_f64());
    for fix in &report.fixes {
        println!("  {}", fix);
    }
    Ok(report.status)
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    let _ = env_logger::builder()
        .filter_level(level)
        // RUST_LOG still wins over -v
        .parse_default_env()
        .try_init();

    match run(&cli) {
        Ok(RectifyStatus::Success) => (),
        Ok(RectifyStatus::Infeasible) => exit(1),
        Err(e) => {
            eprintln!("error: {}", e);
            exit(1);
        }
    }
}

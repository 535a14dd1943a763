//! Variant CLI
//!
//! Inspect combination spaces and run the demonstration body.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::cell::RefCell;
use std::io::{self, Write};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use variant_core::CombinationIter;
use variant_replay::{
    Alternatives, IsolatingRunner, ReplayConfig, Session, TracingObserver, VariantEngine,
    VariantReport,
};

#[derive(Parser)]
#[command(name = "variant")]
#[command(about = "Run a test body once per combination of its choice points", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every combination for the given arities
    Combos {
        /// Number of alternatives at each choice point, in order
        #[arg(short, long = "arity", required = true)]
        arities: Vec<usize>,
        /// Emit JSON instead of one tuple per line
        #[arg(long)]
        json: bool,
    },
    /// Run the built-in two-point demonstration body
    Demo {
        /// Alternative name whose branch panics; discovery runs are not
        /// isolated, so naming a first alternative aborts the demo
        #[arg(long)]
        fail: Option<String>,
        /// Separator between alternative names in run names
        #[arg(long, default_value = "")]
        separator: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Combos { arities, json } => {
            debug!(arities = ?arities, "enumerating combinations");
            let stdout = io::stdout();
            let mut out = io::BufWriter::new(stdout.lock());
            let count = write_combos(&mut out, &arities, json)?;
            out.flush()?;
            debug!(count, "combinations written");
            Ok(())
        }
        Commands::Demo {
            fail,
            separator,
            json,
        } => {
            let outputs = RefCell::new(Vec::new());
            let config = ReplayConfig::new().with_name_separator(separator);
            let report = run_demo(config, fail.as_deref(), &outputs)?;
            info!(
                runs = report.total_runs(),
                failed = report.failures().len(),
                "demo finished"
            );

            if json {
                println!("{}", report.to_json_pretty());
            } else {
                for (record, output) in report.runs.iter().zip(outputs.borrow().iter()) {
                    let status = if record.outcome.is_passed() { "ok" } else { "FAILED" };
                    println!("{:<24} {:<4} {}", record.run.name, output, status);
                }
                println!(
                    "{} runs, {} failed",
                    report.total_runs(),
                    report.failures().len()
                );
            }
            Ok(())
        }
    }
}

/// Stream every combination to `out` as it is generated, returning the count.
fn write_combos<W: Write>(out: &mut W, arities: &[usize], json: bool) -> Result<usize> {
    let mut count = 0;
    if json {
        out.write_all(b"[")?;
    }
    for combo in CombinationIter::new(arities) {
        if json {
            if count > 0 {
                out.write_all(b",")?;
            }
            serde_json::to_writer(&mut *out, &combo)?;
        } else {
            writeln!(out, "{}", combo)?;
        }
        count += 1;
    }
    if json {
        writeln!(out, "]")?;
    } else {
        writeln!(out, "{} combinations", count)?;
    }
    Ok(count)
}

/// The classic two-point body: a prefix digit then a suffix letter.
fn demo_body(v: &mut Session, fail: Option<&str>, outputs: &RefCell<Vec<String>>) {
    let label = RefCell::new(String::new());
    let branch = |name: &str, ch: char| {
        label.borrow_mut().push(ch);
        if fail == Some(name) {
            outputs.borrow_mut().push(label.borrow().clone());
            panic!("branch {} failed", name);
        }
    };

    v.choose(
        Alternatives::new()
            .with("first", |_| branch("first", '1'))
            .with("second", |_| branch("second", '2')),
    );
    v.choose(
        Alternatives::new()
            .with("first suffix", |_| branch("first suffix", 'A'))
            .with("second prefix", |_| branch("second prefix", 'B')),
    );
    outputs.borrow_mut().push(label.into_inner());
}

fn run_demo(
    config: ReplayConfig,
    fail: Option<&str>,
    outputs: &RefCell<Vec<String>>,
) -> variant_replay::VariantResult<VariantReport> {
    VariantEngine::new()
        .with_config(config)
        .with_observer(Box::new(TracingObserver))
        .with_runner(Box::new(IsolatingRunner::new()))
        .run(|v| demo_body(v, fail, outputs))
}

#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use ktlst::config::ProjectConfig;
use ktlst::driver::{self, DriverOptions};
use ktlst::reporter::Reporter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_DIAGNOSTICS: i32 = 1;
const EXIT_ROUND_TRIP_FAILED: i32 = 2;

/// Parse Kotlin sources into lossless trees and attribute member accesses.
#[derive(Parser, Debug)]
#[command(name = "ktlst", version, about)]
struct CliArgs {
    /// Kotlin source files, added to the config's sources.
    files: Vec<PathBuf>,

    /// Project config (`ktlst.json`).
    #[arg(short = 'p', long)]
    config: Option<PathBuf>,

    /// JSON stub file with platform classes; may be repeated.
    #[arg(long = "classpath", value_name = "STUBS")]
    classpath: Vec<PathBuf>,

    /// Extra default star import; may be repeated.
    #[arg(long = "default-import", value_name = "PACKAGE")]
    default_imports: Vec<String>,

    /// Print every attributed access.
    #[arg(long)]
    dump: bool,

    /// Fail when a printed tree differs from its source.
    #[arg(long = "check-round-trip")]
    check_round_trip: bool,

    /// Attribution worker threads (0 = one per core).
    #[arg(long)]
    threads: Option<usize>,

    /// Exit non-zero when any diagnostic is an error.
    #[arg(long = "fail-on-error")]
    fail_on_error: bool,
}

fn main() -> Result<()> {
    ktlst::tracing_config::init_tracing();
    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => ProjectConfig::load(path)?,
        None => ProjectConfig::default(),
    };
    let mut options = DriverOptions::from(&config);
    options.classpath.extend(args.classpath.iter().cloned());
    options.extra_imports.extend(args.default_imports.iter().cloned());
    if let Some(threads) = args.threads {
        options.threads = threads;
    }
    options.check_round_trip |= args.check_round_trip;

    let mut paths = config.sources.clone();
    paths.extend(args.files.iter().cloned());
    if paths.is_empty() {
        anyhow::bail!("no input files; pass files or a config with \"sources\"");
    }
    let sources = driver::read_sources(&paths)?;
    let run = driver::attribute_sources(&sources, &options, None).context("attribution failed")?;

    let mut reporter = Reporter::new(std::io::stderr().is_terminal());
    for source in &sources {
        reporter.add_source(&source.name, &source.text);
    }

    if args.dump {
        for unit in &run.units {
            println!("{}", unit.file_name());
            for line in reporter.dump_unit(unit) {
                println!("  {line}");
            }
        }
    }

    let diagnostics: Vec<_> = run.diagnostics().cloned().collect();
    if !diagnostics.is_empty() {
        eprintln!("{}", reporter.render(&diagnostics));
    }
    for file in &run.round_trip_failures {
        eprintln!("{file}: printed tree differs from source");
    }

    let has_errors = diagnostics
        .iter()
        .any(|d| d.category == ktlst_common::DiagnosticCategory::Error);
    let code = if !run.round_trip_failures.is_empty() {
        EXIT_ROUND_TRIP_FAILED
    } else if args.fail_on_error && has_errors {
        EXIT_DIAGNOSTICS
    } else {
        EXIT_SUCCESS
    };
    std::process::exit(code);
}

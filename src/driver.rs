//! The attribution pipeline: parse every unit, bind declarations into one
//! environment, freeze it, then attribute units in parallel.

use anyhow::{Context, Result};
use ktlst_binder::bind_units;
use ktlst_checker::{AttributedUnit, CancellationToken, attribute_units};
use ktlst_common::Diagnostic;
use ktlst_parser::{ParseResult, parse_source};
use ktlst_types::{DEFAULT_IMPORTS, EnvironmentBuilder};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};

use crate::config::ProjectConfig;

/// One compilation unit's name and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub name: String,
    pub text: String,
}

impl SourceText {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> SourceText {
        SourceText {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DriverOptions {
    pub classpath: Vec<PathBuf>,
    /// Star imports added after `DEFAULT_IMPORTS`.
    pub extra_imports: Vec<String>,
    /// 0 uses the global rayon pool.
    pub threads: usize,
    pub check_round_trip: bool,
}

impl From<&ProjectConfig> for DriverOptions {
    fn from(config: &ProjectConfig) -> DriverOptions {
        DriverOptions {
            classpath: config.classpath.clone(),
            extra_imports: config.default_imports.clone(),
            threads: config.threads,
            check_round_trip: config.check_round_trip,
        }
    }
}

/// Everything produced by one run, in input order.
#[derive(Debug)]
pub struct AttributionRun {
    pub units: Vec<AttributedUnit>,
    /// Parser recovery diagnostics; attribution diagnostics live on the units.
    pub parse_diagnostics: Vec<Diagnostic>,
    /// Names of units whose printed tree differs from their source.
    pub round_trip_failures: Vec<String>,
}

impl AttributionRun {
    /// Parser and attribution diagnostics of every unit.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.parse_diagnostics
            .iter()
            .chain(self.units.iter().flat_map(|unit| unit.diagnostics()))
    }
}

pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceText>> {
    paths
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(SourceText::new(path.display().to_string(), text))
        })
        .collect()
}

/// Run the pipeline over in-memory sources.
pub fn attribute_sources(
    sources: &[SourceText],
    options: &DriverOptions,
    cancellation: Option<&CancellationToken>,
) -> Result<AttributionRun> {
    let _span = info_span!("attribute_sources", units = sources.len()).entered();
    if options.threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()
            .context("failed to build the attribution thread pool")?;
        pool.install(|| run(sources, options, cancellation))
    } else {
        run(sources, options, cancellation)
    }
}

fn run(
    sources: &[SourceText],
    options: &DriverOptions,
    cancellation: Option<&CancellationToken>,
) -> Result<AttributionRun> {
    let parsed: Vec<ParseResult> = sources
        .par_iter()
        .map(|source| parse_source(&source.name, &source.text))
        .collect();
    let parse_diagnostics: Vec<Diagnostic> = parsed
        .iter()
        .flat_map(|unit| unit.diagnostics.iter().cloned())
        .collect();
    debug!(units = parsed.len(), recovered = parse_diagnostics.len(), "parsed");

    let mut builder = EnvironmentBuilder::with_builtins().context("failed to load builtins")?;
    for stub in &options.classpath {
        builder
            .load_stub_file(stub)
            .with_context(|| format!("failed to load classpath entry {}", stub.display()))?;
    }
    let imports = default_imports(&options.extra_imports);
    let units: Vec<&ParseResult> = parsed.iter().collect();
    let bound = bind_units(&mut builder, &units, &imports).context("failed to bind declarations")?;
    let env = builder.freeze().context("failed to freeze the type environment")?;

    let attributed = attribute_units(&units, &bound, &env, cancellation)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let round_trip_failures = if options.check_round_trip {
        check_round_trip(&attributed, sources)
    } else {
        Vec::new()
    };
    info!(
        units = attributed.len(),
        diagnostics = attributed.iter().map(|u| u.diagnostics().len()).sum::<usize>(),
        round_trip_failures = round_trip_failures.len(),
        "attribution finished"
    );
    Ok(AttributionRun {
        units: attributed,
        parse_diagnostics,
        round_trip_failures,
    })
}

/// Language default imports followed by the configured extras, without
/// duplicates.
pub fn default_imports(extra: &[String]) -> Vec<String> {
    let mut imports: Vec<String> = DEFAULT_IMPORTS.iter().map(|p| p.to_string()).collect();
    for package in extra {
        if !imports.contains(package) {
            imports.push(package.clone());
        }
    }
    imports
}

fn check_round_trip(units: &[AttributedUnit], sources: &[SourceText]) -> Vec<String> {
    units
        .par_iter()
        .zip(sources.par_iter())
        .filter(|(unit, source)| unit.print() != source.text)
        .map(|(unit, _)| {
            warn!(file = unit.file_name(), "printed tree differs from source");
            unit.file_name().to_string()
        })
        .collect()
}

/// Load a project config and run it; `overrides` replace config values.
pub fn attribute_project(config_path: &Path, overrides: &DriverOptions) -> Result<AttributionRun> {
    let config = ProjectConfig::load(config_path)?;
    let mut options = DriverOptions::from(&config);
    options.classpath.extend(overrides.classpath.iter().cloned());
    options.extra_imports.extend(overrides.extra_imports.iter().cloned());
    if overrides.threads > 0 {
        options.threads = overrides.threads;
    }
    options.check_round_trip |= overrides.check_round_trip;
    let sources = read_sources(&config.sources)?;
    attribute_sources(&sources, &options, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_imports_deduplicated() {
        let imports = default_imports(&["kotlin".to_string(), "okio".to_string()]);
        assert_eq!(imports.first().map(String::as_str), Some("kotlin"));
        assert_eq!(imports.iter().filter(|p| *p == "kotlin").count(), 1);
        assert_eq!(imports.last().map(String::as_str), Some("okio"));
    }
}

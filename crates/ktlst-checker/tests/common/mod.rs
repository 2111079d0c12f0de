#![allow(dead_code)]

use ktlst_binder::bind_units;
use ktlst_checker::{AccessInfo, AttributedUnit, CancellationToken, attribute_units};
use ktlst_parser::{ParseResult, parse_source};
use ktlst_types::{DEFAULT_IMPORTS, EnvironmentBuilder, InMemoryEnvironment};

/// Parsed sources bound into a frozen environment.
pub struct Project {
    pub parsed: Vec<ParseResult>,
    pub bound: Vec<ktlst_binder::BoundUnit>,
    pub env: InMemoryEnvironment,
}

pub fn project(sources: &[&str]) -> Project {
    let parsed: Vec<ParseResult> = sources
        .iter()
        .enumerate()
        .map(|(i, text)| parse_source(&format!("File{i}.kt"), text))
        .collect();
    let units: Vec<&ParseResult> = parsed.iter().collect();
    let defaults: Vec<String> = DEFAULT_IMPORTS.iter().map(|p| p.to_string()).collect();
    let mut builder = EnvironmentBuilder::with_builtins().expect("builtins");
    let bound = bind_units(&mut builder, &units, &defaults).expect("bind");
    let env = builder.freeze().expect("freeze");
    Project { parsed, bound, env }
}

impl Project {
    pub fn attribute(&self, cancellation: Option<&CancellationToken>) -> Vec<AttributedUnit> {
        let units: Vec<&ParseResult> = self.parsed.iter().collect();
        attribute_units(&units, &self.bound, &self.env, cancellation)
            .into_iter()
            .map(|result| result.expect("attribution"))
            .collect()
    }
}

/// Parse, bind and attribute every source, asserting that each unit prints
/// back to exactly its input.
pub fn rewrite_run(sources: &[&str]) -> Vec<AttributedUnit> {
    let units = project(sources).attribute(None);
    for (unit, source) in units.iter().zip(sources) {
        assert_eq!(&unit.print(), source, "{} does not round-trip", unit.file_name());
    }
    units
}

/// Like `rewrite_run`, for sources that must attribute without diagnostics.
pub fn rewrite_run_clean(sources: &[&str]) -> Vec<AttributedUnit> {
    let units = rewrite_run(sources);
    for unit in &units {
        let codes: Vec<String> = unit
            .diagnostics()
            .iter()
            .map(|d| format!("{}: {}", d.code_string(), d.message_text))
            .collect();
        assert!(codes.is_empty(), "{}: {codes:?}", unit.file_name());
    }
    units
}

pub fn find_access<'u>(unit: &'u AttributedUnit, name: &str) -> &'u AccessInfo {
    unit.accesses_named(name)
        .next()
        .unwrap_or_else(|| panic!("no access named {name} in {}", unit.file_name()))
}

pub fn diagnostic_codes(unit: &AttributedUnit) -> Vec<String> {
    unit.diagnostics().iter().map(|d| d.code_string()).collect()
}

//! Lossless semantic trees for Kotlin sources with member-access type
//! attribution.
//!
//! The pipeline lives in the member crates; this crate wires them together:
//! - `driver` - parse, bind, freeze the environment, attribute in parallel
//! - `config` - `ktlst.json` project files
//! - `reporter` - diagnostic rendering and the `--dump` access listing
//! - `tracing_config` - subscriber setup for the binary

pub mod config;
pub mod driver;
pub mod reporter;
pub mod tracing_config;

pub use config::{ConfigError, ProjectConfig};
pub use driver::{
    AttributionRun, DriverOptions, SourceText, attribute_project, attribute_sources, read_sources,
};

pub use ktlst_checker::{
    AccessInfo, AccessKind, AttributedUnit, AttributionError, CancellationToken, ResolvedMember,
    SymbolKind, VariableInfo, VariableKind, Visitor,
};
pub use ktlst_parser::{NodeIndex, ParseResult, parse_source, print};
pub use ktlst_types::{Nullability, Type, TypeEnvironment};

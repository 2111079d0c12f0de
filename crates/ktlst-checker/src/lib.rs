//! Type attribution for parsed Kotlin units.
//!
//! This crate is organized into several submodules:
//! - `access` - member-access classification (plain, null-safe, this, super)
//! - `context` - `CheckerContext` for the shared per-unit state
//! - `state` - `CheckerState` and its split implementation files
//! - `attributed` - the frozen `AttributedUnit` and its side tables
//! - `visitor` - read-only traversal of attributed units
//! - `error` - resolution failures and their diagnostics
//!
//! Attribution of one unit reads the frozen type environment and writes only
//! its own side tables, so units are attributed in parallel without locks.

pub mod access;
pub mod attributed;
pub mod cancellation;
pub mod context;
pub mod error;
pub mod state;
pub mod visitor;

mod call_checker;
mod member_lookup;
mod qualified_names;
mod state_declarations;
mod type_computation;
mod type_computation_access;

pub use access::{AccessKind, classify, is_short_circuited};
pub use attributed::{
    AccessInfo, AttributedUnit, AttributionTables, ResolvedMember, SymbolKind, VariableInfo,
    VariableKind,
};
pub use cancellation::CancellationToken;
pub use context::CheckerContext;
pub use error::{AttributionError, ResolutionError};
pub use state::CheckerState;
pub use visitor::{Visitor, walk};

use ktlst_binder::BoundUnit;
use ktlst_parser::ParseResult;
use ktlst_types::TypeEnvironment;
use rayon::prelude::*;
use tracing::debug_span;

/// Attribute one bound unit against a frozen environment.
///
/// Resolution failures become diagnostics on the returned unit; only
/// cancellation is an error.
pub fn attribute_unit(
    parse: &ParseResult,
    bound: &BoundUnit,
    env: &dyn TypeEnvironment,
    cancellation: Option<&CancellationToken>,
) -> Result<AttributedUnit, AttributionError> {
    let _span = debug_span!("attribute_unit", file = %parse.file_name).entered();
    let ctx = CheckerContext::new(&parse.arena, env, bound, cancellation);
    let mut state = CheckerState::new(ctx);
    state.check_source_file(parse.root)?;
    let tables = state.ctx.tables;
    Ok(AttributedUnit::assemble(
        &parse.file_name,
        parse.arena.clone(),
        parse.root,
        tables,
    ))
}

/// Attribute units in parallel. `parses` and `bound` are matched by
/// position; results keep the order of `parses`. A parse whose position
/// holds no bound unit for the same file yields `AttributionError::Unbound`.
pub fn attribute_units(
    parses: &[&ParseResult],
    bound: &[BoundUnit],
    env: &dyn TypeEnvironment,
    cancellation: Option<&CancellationToken>,
) -> Vec<Result<AttributedUnit, AttributionError>> {
    parses
        .par_iter()
        .enumerate()
        .map(|(i, parse)| match bound.get(i) {
            Some(unit) if unit.file_name == parse.file_name => {
                attribute_unit(parse, unit, env, cancellation)
            }
            _ => Err(AttributionError::Unbound {
                file: parse.file_name.clone(),
            }),
        })
        .collect()
}

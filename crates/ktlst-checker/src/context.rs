//! Checker Context
//!
//! Holds the shared state used throughout attribution of one unit: the
//! arena, the type environment, the unit's bound scope, and the side
//! tables being filled.

use crate::attributed::{AccessInfo, AttributionTables, VariableInfo};
use crate::cancellation::CancellationToken;
use crate::error::ResolutionError;
use ktlst_binder::BoundUnit;
use ktlst_parser::NodeIndex;
use ktlst_parser::parser::node::NodeArena;
use ktlst_types::{Type, TypeEnvironment};
use tracing::{debug, trace};

pub struct CheckerContext<'a> {
    pub arena: &'a NodeArena,
    /// Read-only; shared across units attributed in parallel.
    pub env: &'a dyn TypeEnvironment,
    pub unit: &'a BoundUnit,
    pub file_name: &'a str,
    pub cancellation: Option<&'a CancellationToken>,
    pub tables: AttributionTables,
}

impl<'a> CheckerContext<'a> {
    pub fn new(
        arena: &'a NodeArena,
        env: &'a dyn TypeEnvironment,
        unit: &'a BoundUnit,
        cancellation: Option<&'a CancellationToken>,
    ) -> CheckerContext<'a> {
        CheckerContext {
            arena,
            env,
            unit,
            file_name: &unit.file_name,
            cancellation,
            tables: AttributionTables::default(),
        }
    }

    pub fn record_type(&mut self, idx: NodeIndex, ty: &Type) {
        if idx.is_some() {
            self.tables.node_types.insert(idx, ty.clone());
        }
    }

    pub fn record_access(&mut self, info: AccessInfo) {
        self.tables.accesses.insert(info.node, info);
    }

    pub fn record_reference(&mut self, info: AccessInfo) {
        self.tables.references.insert(info.node, info);
    }

    pub fn record_variable(&mut self, variable: VariableInfo) {
        trace!(name = %variable.name, ty = %variable.ty, "variable");
        self.tables.variables.push(variable);
    }

    /// Report a resolution failure at `idx`. Failures without a code are
    /// only traced.
    pub fn report(&mut self, idx: NodeIndex, error: ResolutionError) {
        let span = self.arena.span_of(idx);
        match error.to_diagnostic(self.file_name, span) {
            Some(diagnostic) => {
                debug!(file = self.file_name, start = span.start, %error, "resolution failure");
                self.tables.diagnostics.push(diagnostic);
            }
            None => trace!(file = self.file_name, start = span.start, %error, "resolved by rule"),
        }
    }

    pub fn class_exists(&self, fqn: &str) -> bool {
        self.env.class_info(fqn).is_some()
    }
}

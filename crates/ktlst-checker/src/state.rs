//! Checker state: scopes, implicit receivers and type-name context for one
//! top-down attribution pass.
//!
//! Functionality is split across several files, each adding an
//! `impl CheckerState` block:
//! - `state_declarations` - declarations, statements and cancellation points
//! - `type_computation` - expression types
//! - `type_computation_access` - `qualifier.member` accesses
//! - `qualified_names` - bare names and package/class chains
//! - `member_lookup` - member search on types, supertypes and companions
//! - `call_checker` - calls and operator calls

use crate::context::CheckerContext;
use crate::error::ResolutionError;
use ktlst_binder::{TypeNameContext, chain_segments};
use ktlst_common::limits::MAX_EXPR_ATTRIBUTION_DEPTH;
use ktlst_parser::NodeIndex;
use ktlst_parser::syntax_kind_ext::{TYPE_ARGUMENT_LIST, TYPE_REFERENCE};
use ktlst_types::Type;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// An implicit receiver: an enclosing class, object or extension receiver.
#[derive(Clone, Debug)]
pub(crate) struct Frame {
    pub ty: Type,
    /// `this@label` name: the class name, or the extension function's name.
    pub label: Option<Arc<str>>,
    /// Class frames can be named by `super`; extension receivers cannot.
    pub is_class: bool,
    /// Target of an unqualified `super`: the superclass, else `kotlin.Any`.
    pub superclass: Type,
    /// Nested (non-inner) classes and objects hide the instance receivers
    /// of outer classes.
    pub hides_outer_instance: bool,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct LocalScope {
    pub variables: FxHashMap<Arc<str>, Type>,
    /// Local functions by name to their return type.
    pub functions: FxHashMap<Arc<str>, Type>,
}

pub struct CheckerState<'a> {
    pub ctx: CheckerContext<'a>,
    pub(crate) scopes: Vec<LocalScope>,
    pub(crate) frames: Vec<Frame>,
    /// Enclosing bound classes, outermost first.
    pub(crate) enclosing: Vec<Arc<str>>,
    pub(crate) type_parameters: Vec<Arc<str>>,
    /// Types of source members the binder left unknown, learned while
    /// attributing their declarations; keyed by (owner, name).
    pub(crate) inferred_members: FxHashMap<(Arc<str>, Arc<str>), Type>,
    depth: u32,
    cancelled: bool,
}

impl<'a> CheckerState<'a> {
    pub fn new(ctx: CheckerContext<'a>) -> CheckerState<'a> {
        CheckerState {
            ctx,
            scopes: Vec::new(),
            frames: Vec::new(),
            enclosing: Vec::new(),
            type_parameters: Vec::new(),
            inferred_members: FxHashMap::default(),
            depth: 0,
            cancelled: false,
        }
    }

    // =========================================================================
    // Cancellation
    // =========================================================================

    /// Poll the cancellation token. Once cancelled, stays cancelled.
    pub(crate) fn is_cancelled(&mut self) -> bool {
        if !self.cancelled && self.ctx.cancellation.is_some_and(|token| token.is_cancelled()) {
            debug!(file = self.ctx.file_name, "attribution cancelled");
            self.cancelled = true;
        }
        self.cancelled
    }

    // =========================================================================
    // Expression depth
    // =========================================================================

    /// Enter one level of expression nesting; false past the limit.
    pub(crate) fn enter_expression(&mut self) -> bool {
        if self.depth >= MAX_EXPR_ATTRIBUTION_DEPTH {
            warn!(file = self.ctx.file_name, "expression nesting too deep, left unattributed");
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn leave_expression(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // =========================================================================
    // Local scopes
    // =========================================================================

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(LocalScope::default());
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub(crate) fn declare_local(&mut self, name: &str, ty: Type) {
        if name.is_empty() {
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.variables.insert(Arc::from(name), ty);
        }
    }

    pub(crate) fn declare_local_function(&mut self, name: &str, return_type: Type) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.functions.insert(Arc::from(name), return_type);
        }
    }

    /// Innermost local variable or parameter named `name`.
    pub(crate) fn lookup_local(&self, name: &str) -> Option<Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(name).cloned())
    }

    pub(crate) fn lookup_local_function(&self, name: &str) -> Option<Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.functions.get(name).cloned())
    }

    // =========================================================================
    // Type references
    // =========================================================================

    /// Resolve a `TYPE_REFERENCE` in the current class and type-parameter
    /// context.
    pub(crate) fn resolve_type_ref(&self, type_ref: NodeIndex) -> Type {
        if type_ref.is_none() {
            return Type::Unknown;
        }
        let env = self.ctx.env;
        let exists = |fqn: &str| env.class_info(fqn).is_some();
        self.ctx.unit.scope.resolve_type_ref(
            self.ctx.arena,
            type_ref,
            TypeNameContext {
                enclosing: &self.enclosing,
                type_parameters: &self.type_parameters,
            },
            &exists,
        )
    }

    /// Resolve a type reference and record its type, reporting names that
    /// resolve to nothing. Type arguments and function-type parts are
    /// attributed too.
    pub(crate) fn attribute_type_ref(&mut self, type_ref: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        if arena.kind(type_ref) != TYPE_REFERENCE {
            return Type::Unknown;
        }
        let ty = self.resolve_type_ref(type_ref);
        if ty.is_unknown()
            && let Some(data) = arena.get(type_ref).and_then(|n| arena.get_type_ref(n))
            && let Some(segments) = chain_segments(arena, data.name)
        {
            self.ctx.report(
                type_ref,
                ResolutionError::UnknownType {
                    name: segments.join("."),
                },
            );
        }
        self.ctx.record_type(type_ref, &ty);

        for &child in arena.children_of(type_ref) {
            match arena.kind(child) {
                TYPE_REFERENCE => {
                    self.attribute_type_ref(child);
                }
                TYPE_ARGUMENT_LIST => {
                    for &argument in arena.children_of(child) {
                        if arena.kind(argument) == TYPE_REFERENCE {
                            self.attribute_type_ref(argument);
                        }
                    }
                }
                _ => {}
            }
        }
        ty
    }

    /// Run `f` with extra type parameters in scope.
    pub(crate) fn with_type_parameters<R>(
        &mut self,
        names: Vec<Arc<str>>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = self.type_parameters.len();
        self.type_parameters.extend(names);
        let result = f(self);
        self.type_parameters.truncate(saved);
        result
    }
}

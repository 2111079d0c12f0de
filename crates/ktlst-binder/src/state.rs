//! Binder state: declares source classes of a set of units into an
//! `EnvironmentBuilder`.
//!
//! Binding runs in three passes over all units so that declarations may
//! reference each other across files:
//! 1. `declare_classes` - every class, interface, object and companion
//! 2. `resolve_supertypes` - supertype lists, now that every class name exists
//! 3. `declare_members` - properties, functions, constructors and top-level
//!    declarations, with their declared types

use crate::scope::{FileScope, TypeNameContext, facade_name};
use ktlst_parser::parser::node::{ClassKind as DeclKind, NodeArena};
use ktlst_parser::syntax_kind_ext::*;
use ktlst_parser::{NodeIndex, NodeList, ParseResult};
use ktlst_types::{ClassInfo, ClassKind, EnvironmentBuilder, EnvironmentError, Origin};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Declarations of one unit, as later consumed by attribution.
#[derive(Clone, Debug, Default)]
pub struct BoundUnit {
    pub file_name: String,
    pub scope: FileScope,
    /// File facade owning the unit's top-level declarations.
    pub facade: Arc<str>,
    /// Class and object declaration nodes to their binary names.
    pub class_names: FxHashMap<NodeIndex, Arc<str>>,
}

struct PendingSupertypes {
    fqn: Arc<str>,
    enclosing: Vec<Arc<str>>,
    type_parameters: Vec<Arc<str>>,
    entries: NodeList,
}

pub struct BinderState<'a> {
    pub(crate) arena: &'a NodeArena,
    pub(crate) root: NodeIndex,
    pub(crate) unit: BoundUnit,
    pending: Vec<PendingSupertypes>,
}

impl<'a> BinderState<'a> {
    pub fn new(file_name: &str, arena: &'a NodeArena, root: NodeIndex) -> BinderState<'a> {
        let scope = FileScope::from_source_file(arena, root);
        let facade = Arc::from(facade_name(&scope.package, file_name));
        BinderState {
            arena,
            root,
            unit: BoundUnit {
                file_name: file_name.to_string(),
                scope,
                facade,
                class_names: FxHashMap::default(),
            },
            pending: Vec::new(),
        }
    }

    pub fn scope_mut(&mut self) -> &mut FileScope {
        &mut self.unit.scope
    }

    pub(crate) fn top_level_declarations(&self) -> NodeList {
        self.arena
            .get(self.root)
            .and_then(|n| self.arena.get_source_file(n))
            .map(|file| file.declarations.clone())
            .unwrap_or_default()
    }

    // =========================================================================
    // Pass 1: classes
    // =========================================================================

    pub fn declare_classes(&mut self, builder: &mut EnvironmentBuilder) -> Result<(), EnvironmentError> {
        builder.add_package(&self.unit.scope.package.clone());
        let mut enclosing = Vec::new();
        for declaration in &self.top_level_declarations() {
            self.declare_class(builder, declaration, &mut enclosing)?;
        }
        Ok(())
    }

    fn declare_class(
        &mut self,
        builder: &mut EnvironmentBuilder,
        index: NodeIndex,
        enclosing: &mut Vec<Arc<str>>,
    ) -> Result<(), EnvironmentError> {
        let arena = self.arena;
        let kind = arena.kind(index);
        if kind != CLASS_DECLARATION && kind != OBJECT_DECLARATION {
            return Ok(());
        }
        let Some(data) = arena.get(index).and_then(|n| arena.get_class(n)) else {
            return Ok(());
        };
        let name = match (data.name.is_some(), data.kind) {
            (true, _) => arena.name_text(data.name),
            (false, DeclKind::CompanionObject) => "Companion",
            // Anonymous object expression.
            (false, _) => return Ok(()),
        };
        let fqn: Arc<str> = match enclosing.last() {
            Some(outer) => Arc::from(format!("{outer}${name}")),
            None => Arc::from(self.unit.scope.qualify(name)),
        };
        let class_kind = match data.kind {
            DeclKind::Class => ClassKind::Class,
            DeclKind::Interface => ClassKind::Interface,
            DeclKind::Object => ClassKind::Object,
            DeclKind::CompanionObject => ClassKind::CompanionObject,
        };
        trace!(fqn = %fqn, kind = ?class_kind, "declare class");
        builder.add_class(ClassInfo::new(
            &fqn,
            &self.unit.scope.package,
            class_kind,
            Origin::Source,
        ))?;
        if class_kind == ClassKind::CompanionObject
            && let Some(outer) = enclosing.last()
            && let Some(outer_info) = builder.class_mut(outer)
        {
            outer_info.companion = Some(fqn.clone());
        }
        self.unit.class_names.insert(index, fqn.clone());

        let type_parameters = type_parameter_names(arena, data.type_parameters);
        if !data.supertypes.is_empty() {
            self.pending.push(PendingSupertypes {
                fqn: fqn.clone(),
                enclosing: enclosing.clone(),
                type_parameters,
                entries: data.supertypes.clone(),
            });
        }

        enclosing.push(fqn);
        for member in &class_members(arena, data.body) {
            self.declare_class(builder, member, enclosing)?;
        }
        enclosing.pop();
        Ok(())
    }

    // =========================================================================
    // Pass 2: supertypes
    // =========================================================================

    pub fn resolve_supertypes(&mut self, builder: &mut EnvironmentBuilder) {
        let arena = self.arena;
        for pending in std::mem::take(&mut self.pending) {
            let mut resolved: Vec<(bool, Arc<str>)> = Vec::new();
            {
                let exists = |fqn: &str| builder.contains_class(fqn);
                let mut context_enclosing = pending.enclosing.clone();
                // A class's own nested classes are visible in its supertype list.
                context_enclosing.push(pending.fqn.clone());
                let context = TypeNameContext {
                    enclosing: &context_enclosing,
                    type_parameters: &pending.type_parameters,
                };
                for entry in &pending.entries {
                    let Some(data) = arena.get(entry).and_then(|n| arena.get_supertype_entry(n))
                    else {
                        continue;
                    };
                    let ty = self
                        .unit
                        .scope
                        .resolve_type_ref(arena, data.type_ref, context, &exists);
                    match ty.fqn() {
                        Some(fqn) if fqn != &*pending.fqn => {
                            resolved.push((data.arguments.is_some(), Arc::from(fqn)));
                        }
                        _ => debug!(class = %pending.fqn, "unresolved supertype"),
                    }
                }
            }
            // The entry invoking a constructor is the superclass; it goes first.
            resolved.sort_by_key(|(is_class, _)| !*is_class);
            if let Some(info) = builder.class_mut(&pending.fqn) {
                for (_, supertype) in resolved {
                    if !info.supertypes.contains(&supertype) {
                        info.supertypes.push(supertype);
                    }
                }
            }
        }
    }

    pub fn finish(self) -> BoundUnit {
        self.unit
    }
}

/// Members of a `CLASS_BODY`, or nothing.
pub(crate) fn class_members(arena: &NodeArena, body: NodeIndex) -> NodeList {
    arena
        .get(body)
        .and_then(|n| arena.get_class_body(n))
        .map(|b| b.members.clone())
        .unwrap_or_default()
}

/// Names declared by a `TYPE_PARAMETER_LIST`.
pub fn type_parameter_names(arena: &NodeArena, list: NodeIndex) -> Vec<Arc<str>> {
    if list.is_none() {
        return Vec::new();
    }
    arena
        .children_of(list)
        .iter()
        .filter_map(|&child| arena.get(child).and_then(|n| arena.get_parameter(n)))
        .map(|p| Arc::from(arena.name_text(p.name)))
        .collect()
}

/// Bind every unit: classes of all units first, then supertypes, then members.
pub fn bind_units(
    builder: &mut EnvironmentBuilder,
    units: &[&ParseResult],
    default_imports: &[String],
) -> Result<Vec<BoundUnit>, EnvironmentError> {
    let mut states: Vec<BinderState<'_>> = units
        .iter()
        .map(|unit| {
            let mut state = BinderState::new(&unit.file_name, &unit.arena, unit.root);
            state.scope_mut().add_default_imports(default_imports);
            state
        })
        .collect();
    for state in &mut states {
        state.declare_classes(builder)?;
    }
    for state in &mut states {
        state.resolve_supertypes(builder);
    }
    for state in &mut states {
        state.declare_members(builder)?;
    }
    debug!(units = states.len(), "units bound");
    Ok(states.into_iter().map(BinderState::finish).collect())
}

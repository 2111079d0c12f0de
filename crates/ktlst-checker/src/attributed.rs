//! Attributed compilation units.
//!
//! An `AttributedUnit` is the frozen result of attribution: the unit's node
//! arena (with every formatting carrier intact) plus side tables keyed by
//! `NodeIndex`. Nothing in it is mutated after assembly; rewrites produce a
//! new unit.

use crate::access::AccessKind;
use crate::visitor::{Visitor, walk};
use ktlst_common::Diagnostic;
use ktlst_parser::NodeIndex;
use ktlst_parser::parser::node::NodeArena;
use ktlst_parser::syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION;
use ktlst_scanner::SyntaxKind;
use ktlst_types::{Nullability, Type};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// What an access or name resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Package,
    Class,
    Field,
    Method,
    Constructor,
    /// A local variable or parameter.
    Variable,
    Unresolved,
}

/// The member behind an access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedMember {
    pub symbol: SymbolKind,
    /// Declared type of the member, independent of the call site.
    pub declared_type: Type,
    /// The class, companion holder or file facade declaring the member.
    pub owner: Option<Arc<str>>,
    pub is_synthetic: bool,
    pub nullability: Nullability,
}

impl ResolvedMember {
    pub fn unresolved() -> ResolvedMember {
        ResolvedMember {
            symbol: SymbolKind::Unresolved,
            declared_type: Type::Unknown,
            owner: None,
            is_synthetic: false,
            nullability: Nullability::NotNull,
        }
    }
}

/// Attribution of one `qualifier.member` access or bare name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessInfo {
    pub node: NodeIndex,
    pub simple_name: Arc<str>,
    pub access_kind: AccessKind,
    /// Type of the whole access expression at this site.
    pub resolved_type: Type,
    pub member: ResolvedMember,
    pub is_platform_type: bool,
}

impl AccessInfo {
    pub fn resolved_owner(&self) -> Option<&str> {
        self.member.owner.as_deref()
    }

    pub fn is_synthetic(&self) -> bool {
        self.member.is_synthetic
    }

    pub fn nullability(&self) -> Nullability {
        self.member.nullability
    }

    pub fn symbol(&self) -> SymbolKind {
        self.member.symbol
    }

    pub fn is_resolved(&self) -> bool {
        self.member.symbol != SymbolKind::Unresolved
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// Class member or top-level property.
    Property,
    Local,
    Parameter,
}

/// A declared variable, property or parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableInfo {
    pub name: Arc<str>,
    pub ty: Type,
    /// Declaring class or file facade; `None` for locals and parameters.
    pub owner: Option<Arc<str>>,
    pub kind: VariableKind,
    pub node: NodeIndex,
}

/// Side tables produced by attribution.
#[derive(Clone, Debug, Default)]
pub struct AttributionTables {
    pub node_types: FxHashMap<NodeIndex, Type>,
    pub accesses: FxHashMap<NodeIndex, AccessInfo>,
    pub references: FxHashMap<NodeIndex, AccessInfo>,
    pub variables: Vec<VariableInfo>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A frozen, attributed compilation unit.
#[derive(Clone, Debug)]
pub struct AttributedUnit {
    file_name: String,
    arena: NodeArena,
    root: NodeIndex,
    tables: AttributionTables,
    /// Access nodes ordered by source position.
    access_order: Vec<NodeIndex>,
}

impl AttributedUnit {
    pub(crate) fn assemble(
        file_name: &str,
        arena: NodeArena,
        root: NodeIndex,
        tables: AttributionTables,
    ) -> AttributedUnit {
        let mut access_order: Vec<NodeIndex> = tables.accesses.keys().copied().collect();
        access_order.sort_by_key(|&idx| {
            let span = arena.span_of(idx);
            (span.start, span.end)
        });
        AttributedUnit {
            file_name: file_name.to_string(),
            arena,
            root,
            tables,
            access_order,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Attribution of a `PROPERTY_ACCESS_EXPRESSION`.
    pub fn access_info(&self, idx: NodeIndex) -> Option<&AccessInfo> {
        self.tables.accesses.get(&idx)
    }

    /// Attribution of a bare name (identifier leaf or infix operator name).
    pub fn reference_info(&self, idx: NodeIndex) -> Option<&AccessInfo> {
        self.tables.references.get(&idx)
    }

    /// Type of an expression or type reference; `<unknown>` when unattributed.
    pub fn type_of(&self, idx: NodeIndex) -> Type {
        self.tables.node_types.get(&idx).cloned().unwrap_or_default()
    }

    pub fn variable(&self, name: &str) -> Option<&VariableInfo> {
        self.tables.variables.iter().find(|v| &*v.name == name)
    }

    pub fn variables(&self) -> &[VariableInfo] {
        &self.tables.variables
    }

    /// All attributed accesses in source order, outer chains after their
    /// qualifiers.
    pub fn accesses(&self) -> impl Iterator<Item = &AccessInfo> {
        self.access_order
            .iter()
            .filter_map(|idx| self.tables.accesses.get(idx))
    }

    pub fn accesses_named<'s, 'n>(
        &'s self,
        name: &'n str,
    ) -> impl Iterator<Item = &'s AccessInfo> + use<'s, 'n> {
        self.accesses().filter(move |a| &*a.simple_name == name)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.tables.diagnostics
    }

    /// Lossless text of the unit.
    pub fn print(&self) -> String {
        ktlst_parser::print(&self.arena, self.root)
    }

    pub fn visit<V: Visitor>(&self, visitor: &mut V) {
        walk(self, visitor);
    }

    /// A copy of this unit with the member name of `idx` replaced.
    ///
    /// `idx` is an access node or a bare name. Every formatting carrier is
    /// kept, so the printed text differs only in that identifier. Type side
    /// tables are carried over as they are.
    pub fn rename_member(&self, idx: NodeIndex, new_name: &str) -> Option<AttributedUnit> {
        let name_token = match self.arena.kind(idx) {
            PROPERTY_ACCESS_EXPRESSION => {
                let node = self.arena.get(idx)?;
                self.arena.get_access_expr(node)?.name
            }
            kind if kind == SyntaxKind::Identifier as u16 => idx,
            _ => return None,
        };
        let mut renamed = self.clone();
        if !renamed.arena.set_token_text(name_token, new_name) {
            return None;
        }
        let simple_name: Arc<str> = Arc::from(renamed.arena.name_text(name_token));
        for table in [&mut renamed.tables.accesses, &mut renamed.tables.references] {
            if let Some(info) = table.get_mut(&idx) {
                info.simple_name = simple_name.clone();
            }
        }
        Some(renamed)
    }
}

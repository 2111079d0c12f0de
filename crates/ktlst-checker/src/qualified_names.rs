//! Bare names and package/class chains.
//!
//! A dotted chain is resolved left to right. Each segment is a package, a
//! class (nested classes included) or a value; the segment's category
//! decides how the next one is looked up.

use crate::access::{AccessKind, is_short_circuited};
use crate::attributed::{AccessInfo, ResolvedMember, SymbolKind};
use crate::error::ResolutionError;
use crate::member_lookup::{LookupKind, ReceiverLookup};
use crate::state::CheckerState;
use ktlst_binder::qualified_to_class;
use ktlst_parser::NodeIndex;
use ktlst_parser::syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION;
use ktlst_scanner::SyntaxKind;
use ktlst_types::{ClassKind, Member, Nullability, Type};
use std::sync::Arc;
use tracing::trace;

/// Category of a resolved chain segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Qualifier {
    /// An expression value of this type.
    Value(Type),
    /// A class named in expression position.
    Type(Type),
    Package(Arc<str>),
}

impl Qualifier {
    pub(crate) fn node_type(&self) -> Type {
        match self {
            Qualifier::Value(ty) | Qualifier::Type(ty) => ty.clone(),
            Qualifier::Package(_) => Type::Unknown,
        }
    }
}

/// What one name resolved to, before it is recorded.
pub(crate) enum Resolution {
    Package(Arc<str>),
    Class(Type),
    Member(Member),
    /// A local variable or parameter.
    Variable(Type),
    /// A local function, by return type.
    LocalFunction(Type),
    /// The receiver is unknown; resolution is impossible but not an error.
    Indeterminate,
    Unresolved(ResolutionError),
}

/// Which table a resolution is recorded in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RecordAs {
    Access,
    Reference,
}

impl<'a> CheckerState<'a> {
    // =========================================================================
    // Recording
    // =========================================================================

    /// Record a resolution for `node` and return the segment category.
    ///
    /// Failures are reported at `name_token`. Members reached through a `?.`
    /// anywhere on the chain get a nullable type.
    pub(crate) fn record_resolution(
        &mut self,
        node: NodeIndex,
        name_token: NodeIndex,
        access_kind: AccessKind,
        resolution: Resolution,
        record_as: RecordAs,
    ) -> Qualifier {
        let env = self.ctx.env;
        let (qualifier, member, is_platform_type) = match resolution {
            Resolution::Package(name) => (
                Qualifier::Package(name),
                ResolvedMember {
                    symbol: SymbolKind::Package,
                    ..ResolvedMember::unresolved()
                },
                false,
            ),
            Resolution::Class(ty) => {
                let owner = ty
                    .fqn()
                    .and_then(|fqn| fqn.rsplit_once('$'))
                    .map(|(outer, _)| Arc::from(outer));
                let member = ResolvedMember {
                    symbol: SymbolKind::Class,
                    declared_type: ty.clone(),
                    owner,
                    is_synthetic: false,
                    nullability: Nullability::NotNull,
                };
                let is_platform = env.is_platform(&ty);
                (Qualifier::Type(ty), member, is_platform)
            }
            Resolution::Member(found) => {
                let (ty, member, is_platform) = self.resolve_member_type(&found);
                let ty = if access_kind == AccessKind::NullSafe
                    || is_short_circuited(self.ctx.arena, node)
                {
                    ty.make_nullable()
                } else {
                    ty
                };
                (Qualifier::Value(ty), member, is_platform)
            }
            Resolution::Variable(ty) => {
                (Qualifier::Value(ty.clone()), local_member(SymbolKind::Variable, ty), false)
            }
            Resolution::LocalFunction(ty) => {
                (Qualifier::Value(ty.clone()), local_member(SymbolKind::Method, ty), false)
            }
            Resolution::Indeterminate => {
                (Qualifier::Value(Type::Unknown), ResolvedMember::unresolved(), false)
            }
            Resolution::Unresolved(error) => {
                self.ctx.report(name_token, error);
                (Qualifier::Value(Type::Unknown), ResolvedMember::unresolved(), false)
            }
        };

        let resolved_type = qualifier.node_type();
        self.ctx.record_type(node, &resolved_type);
        let info = AccessInfo {
            node,
            simple_name: Arc::from(self.ctx.arena.name_text(name_token)),
            access_kind,
            resolved_type,
            member,
            is_platform_type,
        };
        match record_as {
            RecordAs::Access => self.ctx.record_access(info),
            RecordAs::Reference => self.ctx.record_reference(info),
        }
        qualifier
    }

    /// Value type of a segment used as an expression. A class name stands
    /// for its object instance, or for its companion object.
    pub(crate) fn qualifier_value_type(&self, qualifier: &Qualifier) -> Type {
        match qualifier {
            Qualifier::Value(ty) => ty.clone(),
            Qualifier::Type(ty) => {
                let env = self.ctx.env;
                match env.class_kind(ty) {
                    Some(ClassKind::Object | ClassKind::CompanionObject) => ty.clone(),
                    _ => env.companion_holder_of(ty).unwrap_or_else(|| ty.clone()),
                }
            }
            Qualifier::Package(_) => Type::Unknown,
        }
    }

    /// Resolve an identifier or access chain in qualifier position.
    pub(crate) fn get_qualifier(&mut self, idx: NodeIndex) -> Qualifier {
        let arena = self.ctx.arena;
        let kind = arena.kind(idx);
        if kind != PROPERTY_ACCESS_EXPRESSION && kind != SyntaxKind::Identifier as u16 {
            return Qualifier::Value(self.get_type_of_node(idx));
        }
        if !self.enter_expression() {
            return Qualifier::Value(Type::Unknown);
        }
        let qualifier = if kind == PROPERTY_ACCESS_EXPRESSION {
            self.get_qualifier_of_access(idx, LookupKind::Property)
        } else {
            self.resolve_simple_name(idx)
        };
        self.leave_expression();
        qualifier
    }

    // =========================================================================
    // Bare names
    // =========================================================================

    /// Resolve a bare identifier in expression position.
    ///
    /// Order: locals and parameters, implicit receivers (innermost first),
    /// same-package top-level properties, explicit imports, classes,
    /// star- and default-imported top-level properties, packages.
    pub(crate) fn resolve_simple_name(&mut self, idx: NodeIndex) -> Qualifier {
        let name = self.ctx.arena.name_text(idx);
        let resolution = self.resolve_name(name, LookupKind::Property);
        self.record_resolution(idx, idx, AccessKind::Plain, resolution, RecordAs::Reference)
    }

    /// Shared bare-name resolution for properties and calls.
    pub(crate) fn resolve_name(&self, name: &str, lookup: LookupKind) -> Resolution {
        if name.is_empty() {
            return Resolution::Indeterminate;
        }
        let argc = match lookup {
            LookupKind::Call(argc) => Some(argc),
            _ => None,
        };
        if argc.is_some()
            && let Some(ty) = self.lookup_local_function(name)
        {
            return Resolution::LocalFunction(ty);
        }
        if let Some(ty) = self.lookup_local(name) {
            return Resolution::Variable(ty);
        }
        match self.lookup_implicit_receivers(name, lookup) {
            ReceiverLookup::Found(member) => return Resolution::Member(member),
            ReceiverLookup::Indeterminate => return Resolution::Indeterminate,
            ReceiverLookup::NotFound => {}
        }

        let env = self.ctx.env;
        let scope = &self.ctx.unit.scope;
        if let Some(member) = self.lookup_top_level(&scope.package, name, lookup) {
            return Resolution::Member(member);
        }

        let exists = |fqn: &str| env.class_info(fqn).is_some();
        if let Some(path) = scope.explicit_imports.get(name) {
            if let Some(fqn) = qualified_to_class(path, &exists) {
                return self.class_resolution(Type::class(&fqn), argc);
            }
            if let Some((package, member_name)) = path.rsplit_once('.')
                && let Some(member) = self.lookup_top_level(package, member_name, lookup)
            {
                return Resolution::Member(member);
            }
        }

        if let Some(fqn) = scope.resolve_simple_class(name, &self.enclosing, &exists) {
            return self.class_resolution(Type::class(&fqn), argc);
        }

        for package in scope.implicit_packages().skip(1) {
            if let Some(member) = self.lookup_top_level(package, name, lookup) {
                return Resolution::Member(member);
            }
        }

        if argc.is_none() && env.has_package(name) {
            return Resolution::Package(Arc::from(name));
        }
        Resolution::Unresolved(ResolutionError::UnresolvedReference {
            name: name.to_string(),
        })
    }

    /// A class named at a use site: the class itself, or its constructor
    /// when called.
    pub(crate) fn class_resolution(&self, class: Type, argc: Option<usize>) -> Resolution {
        match argc {
            Some(argc) => Resolution::Member(self.constructor_of(&class, argc)),
            None => Resolution::Class(class),
        }
    }

    // =========================================================================
    // Chain segments
    // =========================================================================

    /// Resolve `name` after a resolved qualifier segment.
    pub(crate) fn resolve_member_of(
        &self,
        qualifier: &Qualifier,
        name: &str,
        lookup: LookupKind,
    ) -> Resolution {
        let argc = match lookup {
            LookupKind::Call(argc) => Some(argc),
            _ => None,
        };
        match qualifier {
            Qualifier::Package(package) => self.resolve_package_member(package, name, lookup),
            Qualifier::Type(ty) => {
                let Some(fqn) = ty.fqn() else {
                    return Resolution::Indeterminate;
                };
                let nested = format!("{fqn}${name}");
                if self.ctx.class_exists(&nested) {
                    return self.class_resolution(Type::class(&nested), argc);
                }
                match self.lookup_static_member(ty, name, lookup) {
                    Some(member) => Resolution::Member(member),
                    None => Resolution::Unresolved(ResolutionError::UnresolvedMember {
                        name: name.to_string(),
                        qualifier: fqn.to_string(),
                    }),
                }
            }
            Qualifier::Value(ty) => {
                if ty.is_unknown() {
                    return Resolution::Indeterminate;
                }
                match self.lookup_instance_member(ty, name, lookup) {
                    Some(member) => Resolution::Member(member),
                    None => Resolution::Unresolved(ResolutionError::UnresolvedMember {
                        name: name.to_string(),
                        qualifier: ty.make_not_null().to_string(),
                    }),
                }
            }
        }
    }

    /// `package.name`: a class wins over a package of the same name, then a
    /// subpackage, then a top-level declaration.
    fn resolve_package_member(&self, package: &str, name: &str, lookup: LookupKind) -> Resolution {
        let candidate = if package.is_empty() {
            name.to_string()
        } else {
            format!("{package}.{name}")
        };
        let env = self.ctx.env;
        if self.ctx.class_exists(&candidate) {
            if env.has_package(&candidate) {
                let error = ResolutionError::AmbiguousChainSegment {
                    segment: candidate.clone(),
                };
                trace!(file = self.ctx.file_name, %error, "class preferred");
            }
            let argc = match lookup {
                LookupKind::Call(argc) => Some(argc),
                _ => None,
            };
            return self.class_resolution(Type::class(&candidate), argc);
        }
        if !matches!(lookup, LookupKind::Call(_)) && env.has_package(&candidate) {
            return Resolution::Package(Arc::from(candidate));
        }
        match self.lookup_top_level(package, name, lookup) {
            Some(member) => Resolution::Member(member),
            None => Resolution::Unresolved(ResolutionError::UnresolvedReference { name: candidate }),
        }
    }

    // =========================================================================
    // Import paths
    // =========================================================================

    /// Attribute an import path. The first segment is absolute: a class in
    /// the root package, else a package.
    pub(crate) fn check_import_path(&mut self, idx: NodeIndex) -> Qualifier {
        let arena = self.ctx.arena;
        if arena.kind(idx) == SyntaxKind::Identifier as u16 {
            let name = arena.name_text(idx);
            let resolution = if self.ctx.class_exists(name) {
                Resolution::Class(Type::class(name))
            } else if self.ctx.env.has_package(name) {
                Resolution::Package(Arc::from(name))
            } else {
                Resolution::Unresolved(ResolutionError::UnresolvedReference {
                    name: name.to_string(),
                })
            };
            return self.record_resolution(idx, idx, AccessKind::Plain, resolution, RecordAs::Reference);
        }
        let Some(data) = arena.get(idx).and_then(|n| arena.get_access_expr(n)) else {
            return Qualifier::Value(Type::Unknown);
        };
        let qualifier = self.check_import_path(data.expression);
        let name = arena.name_text(data.name);
        let resolution = self.resolve_member_of(&qualifier, name, LookupKind::Any);
        self.record_resolution(idx, data.name, AccessKind::Plain, resolution, RecordAs::Access)
    }
}

/// A local variable or local function: no owner.
fn local_member(symbol: SymbolKind, ty: Type) -> ResolvedMember {
    ResolvedMember {
        symbol,
        nullability: ty.nullability(),
        declared_type: ty,
        owner: None,
        is_synthetic: false,
    }
}

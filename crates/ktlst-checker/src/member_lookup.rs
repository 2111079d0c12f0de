//! Member lookup on types.
//!
//! Searches a receiver type, its supertypes, synthetic accessors of platform
//! getters, visible extensions and finally the companion object. Also turns a
//! found `Member` into the access-site type and `ResolvedMember` record.

use crate::attributed::{ResolvedMember, SymbolKind};
use crate::state::CheckerState;
use ktlst_binder::CONSTRUCTOR_NAME;
use ktlst_types::types::package_of;
use ktlst_types::{ClassKind, Member, MemberKind, Origin, Type, supertype_walk, synthetic_accessor};

/// What kind of member a use site needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LookupKind {
    /// A property read or write.
    Property,
    /// A call with this many arguments (trailing lambda included).
    Call(usize),
    /// Anything with the name: import paths, callable references.
    Any,
}

/// Outcome of searching the implicit receivers.
pub(crate) enum ReceiverLookup {
    Found(Member),
    /// Some receiver has an unknown type, so the name may belong to it.
    Indeterminate,
    NotFound,
}

/// First overload accepting `argc` arguments, else the first candidate.
pub(crate) fn pick_overload<'m>(
    candidates: impl IntoIterator<Item = &'m Member>,
    argc: usize,
) -> Option<&'m Member> {
    let mut first = None;
    for candidate in candidates {
        if candidate.accepts_arity(argc) {
            return Some(candidate);
        }
        first.get_or_insert(candidate);
    }
    first
}

fn matches_kind(member: &Member, lookup: LookupKind) -> bool {
    match lookup {
        LookupKind::Property => member.kind == MemberKind::Field,
        LookupKind::Call(_) => member.kind == MemberKind::Method,
        LookupKind::Any => true,
    }
}

/// Pick from one candidate list: exact arity for calls, fields first
/// otherwise.
fn select<'m>(candidates: &[&'m Member], lookup: LookupKind) -> Option<&'m Member> {
    match lookup {
        LookupKind::Call(argc) => candidates
            .iter()
            .copied()
            .find(|m| m.accepts_arity(argc)),
        LookupKind::Property => candidates.first().copied(),
        LookupKind::Any => candidates
            .iter()
            .copied()
            .find(|m| m.kind == MemberKind::Field)
            .or_else(|| candidates.first().copied()),
    }
}

impl<'a> CheckerState<'a> {
    // =========================================================================
    // Receiver chains
    // =========================================================================

    /// The type itself, then its supertypes breadth-first.
    fn receiver_chain(&self, ty: &Type) -> Vec<Type> {
        let mut chain = vec![ty.erased()];
        chain.extend(supertype_walk(self.ctx.env, ty));
        chain
    }

    /// Non-static members named `name` on `ty` and its supertypes, nearest
    /// first. Interfaces that declare no fields are skipped for properties.
    fn declared_members(&self, ty: &Type, name: &str, lookup: LookupKind) -> Vec<&'a Member> {
        let env = self.ctx.env;
        let mut found = Vec::new();
        for candidate in self.receiver_chain(ty) {
            if lookup == LookupKind::Property
                && env.class_kind(&candidate) == Some(ClassKind::Interface)
                && !candidate
                    .fqn()
                    .and_then(|fqn| env.class_info(fqn))
                    .is_some_and(|info| info.has_fields())
            {
                continue;
            }
            found.extend(
                env.members_named(&candidate, name)
                    .iter()
                    .filter(|m| !m.is_static && matches_kind(m, lookup)),
            );
        }
        found
    }

    /// Extensions named `name` applicable to `receiver` whose package is
    /// visible from this unit.
    pub(crate) fn visible_extensions(&self, receiver: &Type, name: &str) -> Vec<&'a Member> {
        let env = self.ctx.env;
        env.extensions_of(receiver, name)
            .into_iter()
            .filter(|member| self.is_visible_top_level(member))
            .collect()
    }

    /// A top-level declaration is visible when its package is the unit's own,
    /// star-imported or default-imported, or when it is imported by name.
    fn is_visible_top_level(&self, member: &Member) -> bool {
        let package = package_of(&member.owner);
        let scope = &self.ctx.unit.scope;
        if scope.implicit_packages().any(|p| p == package) {
            return true;
        }
        scope.explicit_imports.values().any(|path| {
            path.rsplit_once('.')
                .is_some_and(|(pkg, simple)| pkg == package && simple == &*member.name)
        })
    }

    // =========================================================================
    // Instance members
    // =========================================================================

    /// Resolve `name` on a value of type `ty`.
    ///
    /// Order: members of the type and its supertypes, synthetic accessors of
    /// platform getters, extensions, then the companion object. An instance
    /// member always wins over a companion member of the same name.
    pub(crate) fn lookup_instance_member(
        &self,
        ty: &Type,
        name: &str,
        lookup: LookupKind,
    ) -> Option<Member> {
        if ty.is_unknown() {
            return None;
        }
        let declared = self.declared_members(ty, name, lookup);
        if let Some(member) = select(&declared, lookup) {
            return Some(member.clone());
        }
        if !matches!(lookup, LookupKind::Call(_))
            && let Some(accessor) = synthetic_accessor(self.ctx.env, ty, name)
        {
            return Some(accessor);
        }
        let extensions: Vec<&Member> = self
            .visible_extensions(ty, name)
            .into_iter()
            .filter(|m| matches_kind(m, lookup))
            .collect();
        if let Some(member) = select(&extensions, lookup) {
            return Some(member.clone());
        }
        if let Some(member) = self.lookup_companion_member(ty, name, lookup) {
            return Some(member);
        }
        // No exact arity anywhere: fall back to the first overload by name.
        if let LookupKind::Call(argc) = lookup {
            return pick_overload(declared.into_iter().chain(extensions), argc).cloned();
        }
        None
    }

    /// Members of the companion object of `ty`, searched like an instance.
    pub(crate) fn lookup_companion_member(
        &self,
        ty: &Type,
        name: &str,
        lookup: LookupKind,
    ) -> Option<Member> {
        let holder = self.ctx.env.companion_holder_of(&ty.erased())?;
        let declared = self.declared_members(&holder, name, lookup);
        select(&declared, lookup)
            .or_else(|| match lookup {
                LookupKind::Call(argc) => pick_overload(declared.iter().copied(), argc),
                _ => None,
            })
            .cloned()
    }

    // =========================================================================
    // Static members
    // =========================================================================

    /// Resolve `name` through a type name: `Type.name`.
    ///
    /// Objects and companions expose their instance members. Other classes
    /// expose Java statics, then their companion's members, then statics
    /// inherited from supertypes.
    pub(crate) fn lookup_static_member(
        &self,
        ty: &Type,
        name: &str,
        lookup: LookupKind,
    ) -> Option<Member> {
        let env = self.ctx.env;
        if matches!(
            env.class_kind(ty),
            Some(ClassKind::Object | ClassKind::CompanionObject)
        ) {
            return self.lookup_instance_member(ty, name, lookup);
        }
        let statics = |owner: &Type| -> Vec<&'a Member> {
            env.members_named(owner, name)
                .iter()
                .filter(|m| m.is_static && matches_kind(m, lookup))
                .collect()
        };
        let own = statics(&ty.erased());
        if let Some(member) = select(&own, lookup) {
            return Some(member.clone());
        }
        if let Some(holder) = env.companion_holder_of(&ty.erased())
            && let Some(member) = self.lookup_instance_member(&holder, name, lookup)
        {
            return Some(member);
        }
        let mut inherited = own;
        for supertype in supertype_walk(env, ty) {
            inherited.extend(statics(&supertype));
        }
        select(&inherited, lookup)
            .or_else(|| match lookup {
                LookupKind::Call(argc) => pick_overload(inherited.iter().copied(), argc),
                _ => None,
            })
            .cloned()
    }

    // =========================================================================
    // Super members
    // =========================================================================

    /// Resolve `name` strictly on a superclass and its own supertypes.
    pub(crate) fn lookup_super_member(
        &self,
        super_type: &Type,
        name: &str,
        lookup: LookupKind,
    ) -> Option<Member> {
        let declared = self.declared_members(super_type, name, lookup);
        if let Some(member) = select(&declared, lookup) {
            return Some(member.clone());
        }
        if let LookupKind::Call(argc) = lookup {
            return pick_overload(declared.iter().copied(), argc).cloned();
        }
        synthetic_accessor(self.ctx.env, super_type, name)
    }

    // =========================================================================
    // Implicit receivers
    // =========================================================================

    /// Resolve a bare name against the enclosing classes, objects and
    /// extension receivers, innermost first.
    ///
    /// Past a nested (non-inner) class, outer instance members are out of
    /// reach; outer companions and objects stay visible.
    pub(crate) fn lookup_implicit_receivers(&self, name: &str, lookup: LookupKind) -> ReceiverLookup {
        let env = self.ctx.env;
        let mut instance_visible = true;
        let mut saw_unknown = false;
        for frame in self.frames.iter().rev() {
            if frame.ty.is_unknown() {
                saw_unknown |= instance_visible;
            } else {
                let singleton = matches!(
                    env.class_kind(&frame.ty),
                    Some(ClassKind::Object | ClassKind::CompanionObject)
                );
                let found = if instance_visible || singleton {
                    self.lookup_instance_member(&frame.ty, name, lookup)
                } else {
                    self.lookup_companion_member(&frame.ty, name, lookup)
                };
                if let Some(member) = found {
                    return ReceiverLookup::Found(member);
                }
            }
            if frame.hides_outer_instance {
                instance_visible = false;
            }
        }
        if saw_unknown {
            ReceiverLookup::Indeterminate
        } else {
            ReceiverLookup::NotFound
        }
    }

    // =========================================================================
    // Top-level declarations
    // =========================================================================

    /// A top-level property or function of `package`.
    pub(crate) fn lookup_top_level(
        &self,
        package: &str,
        name: &str,
        lookup: LookupKind,
    ) -> Option<Member> {
        let candidates: Vec<&Member> = self
            .ctx
            .env
            .top_level(package, name)
            .iter()
            .filter(|m| matches_kind(m, lookup))
            .collect();
        select(&candidates, lookup)
            .or_else(|| match lookup {
                LookupKind::Call(argc) => pick_overload(candidates.iter().copied(), argc),
                _ => None,
            })
            .cloned()
    }

    /// Constructor of `class` for a call with `argc` arguments. Classes
    /// without declared constructors get an implicit one.
    pub(crate) fn constructor_of(&self, class: &Type, argc: usize) -> Member {
        let ctors: Vec<&Member> = self
            .ctx
            .env
            .members_named(class, CONSTRUCTOR_NAME)
            .iter()
            .filter(|m| m.kind == MemberKind::Constructor)
            .collect();
        if let Some(ctor) = pick_overload(ctors, argc) {
            return ctor.clone();
        }
        let owner = class.fqn().unwrap_or_default();
        let mut implicit = Member::method(CONSTRUCTOR_NAME, Vec::new(), class.make_not_null(), owner);
        implicit.kind = MemberKind::Constructor;
        implicit
    }

    // =========================================================================
    // Access-site types
    // =========================================================================

    /// The type a member has at a use site, its resolution record, and
    /// whether it comes from the platform type system.
    ///
    /// Source members the binder could not type take the type learned from
    /// their declaration.
    pub(crate) fn resolve_member_type(&self, member: &Member) -> (Type, ResolvedMember, bool) {
        let env = self.ctx.env;
        let mut effective = member.clone();
        if effective.declared_type.is_unknown()
            && let Some(inferred) = self
                .inferred_members
                .get(&(member.owner.clone(), member.name.clone()))
        {
            effective.declared_type = inferred.clone();
        }
        let nullability = env.nullability_of(&effective);
        let ty = effective.declared_type.with_nullability(nullability);
        let symbol = match member.kind {
            MemberKind::Field => SymbolKind::Field,
            MemberKind::Method => SymbolKind::Method,
            MemberKind::Constructor => SymbolKind::Constructor,
        };
        let is_platform = env.origin_of(&Type::class(&member.owner)) == Some(Origin::Platform);
        let resolved = ResolvedMember {
            symbol,
            declared_type: effective.declared_type,
            owner: Some(member.owner.clone()),
            is_synthetic: member.is_synthetic,
            nullability,
        };
        (ty, resolved, is_platform)
    }
}

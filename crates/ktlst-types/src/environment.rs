//! Type environment: the read-only query surface attribution runs against.
//!
//! An `EnvironmentBuilder` collects builtins, classpath stubs and source
//! declarations; `freeze()` validates it and produces an immutable
//! `InMemoryEnvironment` that is shared across threads without locking.

use crate::error::EnvironmentError;
use crate::relations;
use crate::types::{ClassInfo, ClassKind, Member, MemberKind, Nullability, Origin, Type, ANY};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, trace};

type MemberTable = IndexMap<Arc<str>, SmallVec<[Member; 1]>>;

// =============================================================================
// Query interface
// =============================================================================

/// Queries over declared classes, members and packages.
pub trait TypeEnvironment: Send + Sync {
    fn class_info(&self, fqn: &str) -> Option<&ClassInfo>;

    /// Resolve a binary-qualified class name to its (non-null) type.
    fn resolve_type(&self, fqn: &str) -> Option<Type> {
        self.class_info(fqn).map(|info| Type::class_with(info.fqn.clone(), Nullability::NotNull))
    }

    /// All members named `name` declared directly on `owner`.
    fn members_named(&self, owner: &Type, name: &str) -> &[Member] {
        owner
            .fqn()
            .and_then(|fqn| self.class_info(fqn))
            .map(|info| info.members_named(name))
            .unwrap_or_default()
    }

    /// A member named `name` declared directly on `owner`, fields first.
    fn resolve_member(&self, owner: &Type, name: &str) -> Option<&Member> {
        let members = self.members_named(owner, name);
        members
            .iter()
            .find(|member| member.kind == MemberKind::Field)
            .or_else(|| members.first())
    }

    /// Direct supertypes in declaration order. Classes without declared
    /// supertypes extend `kotlin.Any`.
    fn supertypes_of(&self, ty: &Type) -> Vec<Type> {
        let Some(info) = ty.fqn().and_then(|fqn| self.class_info(fqn)) else {
            return Vec::new();
        };
        if info.supertypes.is_empty() {
            if &*info.fqn == ANY {
                return Vec::new();
            }
            return vec![Type::class(ANY)];
        }
        info.supertypes
            .iter()
            .map(|name| Type::class_with(name.clone(), Nullability::NotNull))
            .collect()
    }

    fn companion_holder_of(&self, ty: &Type) -> Option<Type> {
        let info = self.class_info(ty.fqn()?)?;
        let companion = info.companion.as_ref()?;
        Some(Type::class_with(companion.clone(), Nullability::NotNull))
    }

    /// Effective nullability of a member's declared type.
    fn nullability_of(&self, member: &Member) -> Nullability;

    fn has_package(&self, name: &str) -> bool;

    /// Top-level non-extension callables and properties of `package`.
    fn top_level(&self, package: &str, name: &str) -> &[Member];

    /// Extension functions/properties named `name` applicable to `receiver`.
    fn extensions_of(&self, receiver: &Type, name: &str) -> Vec<&Member>;

    fn class_kind(&self, ty: &Type) -> Option<ClassKind> {
        ty.fqn().and_then(|fqn| self.class_info(fqn)).map(|info| info.kind)
    }

    /// Was the type declared in a parsed compilation unit?
    fn is_source(&self, ty: &Type) -> bool {
        self.origin_of(ty) == Some(Origin::Source)
    }

    /// Does the type come from the Java interop type system?
    fn is_platform(&self, ty: &Type) -> bool {
        self.origin_of(ty) == Some(Origin::Platform)
    }

    fn origin_of(&self, ty: &Type) -> Option<Origin>;

    fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
        relations::is_subtype(self, sub, sup)
    }
}

// =============================================================================
// Builder
// =============================================================================

#[derive(Debug, Default)]
pub struct EnvironmentBuilder {
    classes: IndexMap<Arc<str>, ClassInfo>,
    packages: FxHashSet<Arc<str>>,
    top_level: FxHashMap<Arc<str>, MemberTable>,
    extensions: FxHashMap<Arc<str>, Vec<Member>>,
    facades: FxHashMap<Arc<str>, Origin>,
}

impl EnvironmentBuilder {
    pub fn new() -> EnvironmentBuilder {
        EnvironmentBuilder::default()
    }

    /// A builder preloaded with the builtin Kotlin and Java platform model.
    pub fn with_builtins() -> Result<EnvironmentBuilder, EnvironmentError> {
        let mut builder = EnvironmentBuilder::new();
        crate::builtins::add_builtins(&mut builder)?;
        Ok(builder)
    }

    /// Register a package and all of its parent packages.
    pub fn add_package(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        let mut end = 0;
        for segment in name.split('.') {
            end += segment.len();
            self.packages.insert(Arc::from(&name[..end]));
            end += 1;
        }
    }

    pub fn contains_class(&self, fqn: &str) -> bool {
        self.classes.contains_key(fqn)
    }

    pub fn class_mut(&mut self, fqn: &str) -> Option<&mut ClassInfo> {
        self.classes.get_mut(fqn)
    }

    /// Add a class. Re-declaring a class of the same kind merges members.
    pub fn add_class(&mut self, info: ClassInfo) -> Result<(), EnvironmentError> {
        let package = info.package.clone();
        self.add_package(&package);
        match self.classes.get_mut(&info.fqn) {
            None => {
                trace!(fqn = %info.fqn, kind = ?info.kind, "add class");
                self.classes.insert(info.fqn.clone(), info);
            }
            Some(existing) if existing.kind != info.kind => {
                return Err(EnvironmentError::ConflictingClassKind {
                    fqn: info.fqn.to_string(),
                    first: format!("{:?}", existing.kind),
                    second: format!("{:?}", info.kind),
                });
            }
            Some(existing) => {
                debug!(fqn = %info.fqn, "merge class redeclaration");
                for supertype in info.supertypes {
                    if !existing.supertypes.contains(&supertype) {
                        existing.supertypes.push(supertype);
                    }
                }
                for member in info.members.into_values().flatten() {
                    existing.add_member(member);
                }
                if existing.companion.is_none() {
                    existing.companion = info.companion;
                }
            }
        }
        Ok(())
    }

    pub fn add_member(&mut self, owner: &str, member: Member) -> Result<(), EnvironmentError> {
        let Some(info) = self.classes.get_mut(owner) else {
            return Err(EnvironmentError::UnknownOwner {
                owner: owner.to_string(),
                member: member.name.to_string(),
            });
        };
        info.add_member(member);
        Ok(())
    }

    /// Add a top-level function or property. Its owner is the file facade.
    pub fn add_top_level(&mut self, package: &str, member: Member, origin: Origin) {
        self.add_package(package);
        self.facades.insert(member.owner.clone(), origin);
        if member.receiver.is_some() {
            self.extensions
                .entry(member.name.clone())
                .or_default()
                .push(member);
        } else {
            self.top_level
                .entry(Arc::from(package))
                .or_default()
                .entry(member.name.clone())
                .or_default()
                .push(member);
        }
    }

    /// Validate and freeze.
    pub fn freeze(self) -> Result<InMemoryEnvironment, EnvironmentError> {
        for info in self.classes.values() {
            for supertype in &info.supertypes {
                if !self.classes.contains_key(supertype) {
                    return Err(EnvironmentError::UnknownSupertype {
                        fqn: info.fqn.to_string(),
                        supertype: supertype.to_string(),
                    });
                }
            }
        }
        debug!(
            classes = self.classes.len(),
            packages = self.packages.len(),
            "type environment frozen"
        );
        Ok(InMemoryEnvironment {
            classes: self.classes.into_iter().collect(),
            packages: self.packages,
            top_level: self.top_level,
            extensions: self.extensions,
            facades: self.facades,
        })
    }
}

// =============================================================================
// Frozen environment
// =============================================================================

/// Immutable environment; safe for unsynchronized concurrent reads.
#[derive(Debug)]
pub struct InMemoryEnvironment {
    classes: FxHashMap<Arc<str>, ClassInfo>,
    packages: FxHashSet<Arc<str>>,
    top_level: FxHashMap<Arc<str>, MemberTable>,
    extensions: FxHashMap<Arc<str>, Vec<Member>>,
    facades: FxHashMap<Arc<str>, Origin>,
}

impl InMemoryEnvironment {
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    fn owner_origin(&self, owner: &str) -> Option<Origin> {
        self.classes
            .get(owner)
            .map(|info| info.origin)
            .or_else(|| self.facades.get(owner).copied())
    }
}

impl TypeEnvironment for InMemoryEnvironment {
    fn class_info(&self, fqn: &str) -> Option<&ClassInfo> {
        self.classes.get(fqn)
    }

    fn nullability_of(&self, member: &Member) -> Nullability {
        if let Some(annotated) = member.annotated_nullability {
            return annotated;
        }
        match self.owner_origin(&member.owner) {
            Some(Origin::Platform) => Nullability::Unknown,
            _ => member.declared_type.nullability(),
        }
    }

    fn has_package(&self, name: &str) -> bool {
        self.packages.contains(name)
    }

    fn top_level(&self, package: &str, name: &str) -> &[Member] {
        self.top_level
            .get(package)
            .and_then(|table| table.get(name))
            .map(|members| members.as_slice())
            .unwrap_or_default()
    }

    fn extensions_of(&self, receiver: &Type, name: &str) -> Vec<&Member> {
        let Some(candidates) = self.extensions.get(name) else {
            return Vec::new();
        };
        let receiver = receiver.make_not_null();
        candidates
            .iter()
            .filter(|member| {
                member.receiver.as_ref().is_some_and(|expected| {
                    relations::is_subtype(self, &receiver, &expected.make_not_null())
                })
            })
            .collect()
    }

    fn origin_of(&self, ty: &Type) -> Option<Origin> {
        self.owner_origin(ty.fqn()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{INT, STRING};

    fn sample() -> InMemoryEnvironment {
        let mut builder = EnvironmentBuilder::new();
        builder
            .add_class(ClassInfo::new(ANY, "kotlin", ClassKind::Class, Origin::Library))
            .unwrap();
        let mut test = ClassInfo::new("a.Test", "a", ClassKind::Class, Origin::Source);
        test.add_member(Member::field("id", Type::class(STRING), "a.Test"));
        test.add_member(Member::method("id", vec![], Type::class(INT), "a.Test"));
        builder.add_class(test).unwrap();
        builder.freeze().unwrap()
    }

    #[test]
    fn test_packages_include_parents() {
        let mut builder = EnvironmentBuilder::new();
        builder.add_package("java.util.regex");
        let env = builder.freeze().unwrap();
        assert!(env.has_package("java"));
        assert!(env.has_package("java.util"));
        assert!(env.has_package("java.util.regex"));
        assert!(!env.has_package("java.util.reg"));
    }

    #[test]
    fn test_resolve_member_prefers_field() {
        let env = sample();
        let test = env.resolve_type("a.Test").unwrap();
        let member = env.resolve_member(&test, "id").unwrap();
        assert_eq!(member.kind, MemberKind::Field);
        assert_eq!(env.members_named(&test, "id").len(), 2);
        assert!(env.resolve_member(&test, "missing").is_none());
    }

    #[test]
    fn test_implicit_any_supertype() {
        let env = sample();
        let test = env.resolve_type("a.Test").unwrap();
        assert_eq!(env.supertypes_of(&test), vec![Type::class(ANY)]);
        assert!(env.supertypes_of(&Type::class(ANY)).is_empty());
        assert!(env.is_source(&test));
    }

    #[test]
    fn test_conflicting_kinds_rejected() {
        let mut builder = EnvironmentBuilder::new();
        builder
            .add_class(ClassInfo::new("a.X", "a", ClassKind::Class, Origin::Source))
            .unwrap();
        let err = builder
            .add_class(ClassInfo::new("a.X", "a", ClassKind::Object, Origin::Source))
            .unwrap_err();
        assert!(matches!(err, EnvironmentError::ConflictingClassKind { .. }));
    }

    #[test]
    fn test_unknown_supertype_rejected_at_freeze() {
        let mut builder = EnvironmentBuilder::new();
        let mut info = ClassInfo::new("a.X", "a", ClassKind::Class, Origin::Source);
        info.supertypes.push(Arc::from("a.Missing"));
        builder.add_class(info).unwrap();
        assert!(matches!(
            builder.freeze(),
            Err(EnvironmentError::UnknownSupertype { .. })
        ));
    }

    #[test]
    fn test_platform_nullability() {
        let mut builder = EnvironmentBuilder::new();
        let mut info = ClassInfo::new("j.P", "j", ClassKind::Class, Origin::Platform);
        info.add_member(Member::method("make", vec![], Type::class("j.P"), "j.P"));
        let mut annotated = Member::method("size", vec![], Type::class(INT), "j.P");
        annotated.annotated_nullability = Some(Nullability::NotNull);
        info.add_member(annotated);
        builder.add_class(info).unwrap();
        let env = builder.freeze().unwrap();
        let owner = Type::class("j.P");
        let make = env.resolve_member(&owner, "make").unwrap();
        assert_eq!(env.nullability_of(make), Nullability::Unknown);
        let size = env.resolve_member(&owner, "size").unwrap();
        assert_eq!(env.nullability_of(size), Nullability::NotNull);
        assert!(env.is_platform(&owner));
    }
}

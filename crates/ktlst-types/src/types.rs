//! Type representation.
//!
//! Types are nominal: a class type is its binary-qualified name plus a
//! nullability. Anything attribution cannot resolve is `Type::Unknown`, so
//! every node always carries a well-formed type.

use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Nullability
// =============================================================================

/// Nullability of a type or member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Nullability {
    Nullable,
    #[default]
    NotNull,
    /// Platform type without nullability metadata.
    Unknown,
}

impl Nullability {
    /// Combine two nullabilities at a join point.
    pub fn join(self, other: Nullability) -> Nullability {
        match (self, other) {
            (Nullability::Nullable, _) | (_, Nullability::Nullable) => Nullability::Nullable,
            (Nullability::NotNull, Nullability::NotNull) => Nullability::NotNull,
            _ => Nullability::Unknown,
        }
    }
}

// =============================================================================
// Type
// =============================================================================

/// A nominal class type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ClassType {
    /// Binary-qualified name, e.g. `java.util.regex.Pattern` or `kotlin.Int$Companion`.
    pub fqn: Arc<str>,
    pub nullability: Nullability,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Type {
    /// Sentinel for anything that could not be resolved.
    #[default]
    Unknown,
    /// `kotlin.Nothing`; the nullable form is the type of `null`.
    Nothing { nullable: bool },
    Class(ClassType),
}

pub const ANY: &str = "kotlin.Any";
pub const NOTHING: &str = "kotlin.Nothing";
pub const UNIT: &str = "kotlin.Unit";
pub const INT: &str = "kotlin.Int";
pub const LONG: &str = "kotlin.Long";
pub const DOUBLE: &str = "kotlin.Double";
pub const FLOAT: &str = "kotlin.Float";
pub const BOOLEAN: &str = "kotlin.Boolean";
pub const CHAR: &str = "kotlin.Char";
pub const STRING: &str = "kotlin.String";
pub const JAVA_OBJECT: &str = "java.lang.Object";

impl Type {
    pub const UNKNOWN: Type = Type::Unknown;
    pub const NULL: Type = Type::Nothing { nullable: true };

    /// Non-null class type.
    pub fn class(fqn: &str) -> Type {
        Type::Class(ClassType {
            fqn: Arc::from(fqn),
            nullability: Nullability::NotNull,
        })
    }

    pub fn class_with(fqn: Arc<str>, nullability: Nullability) -> Type {
        Type::Class(ClassType { fqn, nullability })
    }

    /// Parse a rendered type: `kotlin.String?` is nullable, `kotlin.String!`
    /// is a platform type, `kotlin.Nothing` is the bottom type.
    pub fn parse(text: &str) -> Type {
        let text = text.trim();
        if text.is_empty() || text == "<unknown>" {
            return Type::Unknown;
        }
        let (name, nullability) = if let Some(name) = text.strip_suffix('?') {
            (name, Nullability::Nullable)
        } else if let Some(name) = text.strip_suffix('!') {
            (name, Nullability::Unknown)
        } else {
            (text, Nullability::NotNull)
        };
        if name == NOTHING {
            return Type::Nothing {
                nullable: nullability == Nullability::Nullable,
            };
        }
        Type::class_with(Arc::from(name), nullability)
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// The qualified name of a class type.
    pub fn fqn(&self) -> Option<&str> {
        match self {
            Type::Class(class) => Some(&class.fqn),
            Type::Nothing { .. } => Some(NOTHING),
            Type::Unknown => None,
        }
    }

    pub fn nullability(&self) -> Nullability {
        match self {
            Type::Class(class) => class.nullability,
            Type::Nothing { nullable: true } => Nullability::Nullable,
            Type::Nothing { nullable: false } | Type::Unknown => Nullability::NotNull,
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.nullability() == Nullability::Nullable
    }

    /// Same type with the given nullability. `Unknown` stays `Unknown`.
    pub fn with_nullability(&self, nullability: Nullability) -> Type {
        match self {
            Type::Class(class) => Type::Class(ClassType {
                fqn: class.fqn.clone(),
                nullability,
            }),
            Type::Nothing { .. } => Type::Nothing {
                nullable: nullability == Nullability::Nullable,
            },
            Type::Unknown => Type::Unknown,
        }
    }

    pub fn make_nullable(&self) -> Type {
        self.with_nullability(Nullability::Nullable)
    }

    pub fn make_not_null(&self) -> Type {
        self.with_nullability(Nullability::NotNull)
    }

    /// Same class, nullability dropped; used as a lookup key.
    pub fn erased(&self) -> Type {
        self.make_not_null()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unknown => f.write_str("<unknown>"),
            Type::Nothing { nullable } => {
                f.write_str(NOTHING)?;
                if *nullable { f.write_str("?") } else { Ok(()) }
            }
            Type::Class(class) => {
                f.write_str(&class.fqn)?;
                // Platform types render without a marker.
                if class.nullability == Nullability::Nullable {
                    f.write_str("?")?;
                }
                Ok(())
            }
        }
    }
}

// =============================================================================
// Classes and members
// =============================================================================

/// Where a class definition came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Origin {
    /// Declared in a parsed compilation unit.
    Source,
    /// Kotlin library metadata: nullability is always declared.
    Library,
    /// Java interop: nullability is unknown unless annotated.
    Platform,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ClassKind {
    Class,
    Interface,
    Object,
    CompanionObject,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MemberKind {
    /// A field or property.
    Field,
    Method,
    Constructor,
}

/// A member signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Member {
    pub name: Arc<str>,
    pub kind: MemberKind,
    /// Field type or method return type.
    pub declared_type: Type,
    /// The class (or file facade / companion holder) declaring the member.
    pub owner: Arc<str>,
    pub parameters: Vec<Type>,
    pub is_vararg: bool,
    /// Java `static`; Kotlin members of objects are not static.
    pub is_static: bool,
    pub is_synthetic: bool,
    /// Explicit nullability metadata, if any.
    pub annotated_nullability: Option<Nullability>,
    /// Receiver type of an extension function or property.
    pub receiver: Option<Type>,
}

impl Member {
    pub fn field(name: &str, declared_type: Type, owner: &str) -> Member {
        Member {
            name: Arc::from(name),
            kind: MemberKind::Field,
            declared_type,
            owner: Arc::from(owner),
            parameters: Vec::new(),
            is_vararg: false,
            is_static: false,
            is_synthetic: false,
            annotated_nullability: None,
            receiver: None,
        }
    }

    pub fn method(name: &str, parameters: Vec<Type>, return_type: Type, owner: &str) -> Member {
        Member {
            kind: MemberKind::Method,
            parameters,
            ..Member::field(name, return_type, owner)
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Member {
        self.is_static = is_static;
        self
    }

    pub fn with_receiver(mut self, receiver: Type) -> Member {
        self.receiver = Some(receiver);
        self
    }

    /// Can this member be called with `count` arguments?
    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.is_vararg {
            count + 1 >= self.parameters.len()
        } else {
            self.parameters.len() == count
        }
    }
}

/// A class, interface, object or companion definition.
#[derive(Clone, Debug, Serialize)]
pub struct ClassInfo {
    pub fqn: Arc<str>,
    pub package: Arc<str>,
    pub kind: ClassKind,
    pub origin: Origin,
    /// Declared supertypes, superclass first when known.
    pub supertypes: SmallVec<[Arc<str>; 2]>,
    /// Members by name in declaration order; overloads share an entry.
    #[serde(skip)]
    pub members: IndexMap<Arc<str>, SmallVec<[Member; 1]>>,
    pub companion: Option<Arc<str>>,
}

impl ClassInfo {
    pub fn new(fqn: &str, package: &str, kind: ClassKind, origin: Origin) -> ClassInfo {
        ClassInfo {
            fqn: Arc::from(fqn),
            package: Arc::from(package),
            kind,
            origin,
            supertypes: SmallVec::new(),
            members: IndexMap::new(),
            companion: None,
        }
    }

    pub fn add_member(&mut self, member: Member) {
        self.members
            .entry(member.name.clone())
            .or_default()
            .push(member);
    }

    pub fn members_named(&self, name: &str) -> &[Member] {
        self.members
            .get(name)
            .map(|members| members.as_slice())
            .unwrap_or_default()
    }

    /// Does this class declare any field?
    pub fn has_fields(&self) -> bool {
        self.members
            .values()
            .flatten()
            .any(|member| member.kind == MemberKind::Field)
    }

    /// Simple name: the part after the last `.` or `$`.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.fqn)
    }
}

/// Last segment of a binary-qualified name.
pub fn simple_name(fqn: &str) -> &str {
    fqn.rsplit(['.', '$']).next().unwrap_or(fqn)
}

/// Package part of a top-level class name or file facade.
pub fn package_of(fqn: &str) -> &str {
    let outer = fqn.split('$').next().unwrap_or(fqn);
    outer.rsplit_once('.').map_or("", |(package, _)| package)
}

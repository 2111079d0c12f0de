//! Types and the type environment for ktlst attribution.
//!
//! - `types` - `Type` (with the `Unknown` sentinel), `Nullability`, classes and members
//! - `environment` - the `TypeEnvironment` query trait, builder and frozen environment
//! - `relations` - subtyping, supertype walks, least upper bound, synthetic accessors
//! - `stubs` - JSON classpath stubs
//! - `builtins` - embedded Kotlin/Java platform model and default imports

pub mod builtins;
pub mod environment;
pub mod error;
pub mod relations;
pub mod stubs;
pub mod types;

pub use builtins::DEFAULT_IMPORTS;
pub use environment::{EnvironmentBuilder, InMemoryEnvironment, TypeEnvironment};
pub use error::EnvironmentError;
pub use relations::{is_subtype, least_upper_bound, supertype_walk, synthetic_accessor};
pub use types::{ClassInfo, ClassKind, ClassType, Member, MemberKind, Nullability, Origin, Type};

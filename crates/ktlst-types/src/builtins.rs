//! Builtin Kotlin library and Java platform model.
//!
//! The model is an embedded stub file (`builtins.json`) parsed once per
//! process and added to every builder created with
//! `EnvironmentBuilder::with_builtins`.

use crate::environment::EnvironmentBuilder;
use crate::error::EnvironmentError;
use crate::stubs::StubFile;
use once_cell::sync::Lazy;

/// Embedded builtin stubs.
pub const BUILTIN_STUBS: &str = include_str!("builtins.json");

static PARSED_BUILTINS: Lazy<Result<StubFile, String>> = Lazy::new(|| {
    StubFile::parse("<builtins>", BUILTIN_STUBS).map_err(|err| err.to_string())
});

/// Packages whose members are visible without an import.
pub const DEFAULT_IMPORTS: &[&str] = &[
    "kotlin",
    "kotlin.annotation",
    "kotlin.collections",
    "kotlin.comparisons",
    "kotlin.io",
    "kotlin.ranges",
    "kotlin.sequences",
    "kotlin.text",
    "java.lang",
];

pub fn add_builtins(builder: &mut EnvironmentBuilder) -> Result<(), EnvironmentError> {
    match &*PARSED_BUILTINS {
        Ok(stubs) => builder.add_stub_file(stubs),
        Err(message) => Err(EnvironmentError::MalformedStub {
            origin: "<builtins>".to_string(),
            message: message.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::TypeEnvironment;
    use crate::types::{Nullability, Type};

    #[test]
    fn test_builtins_freeze() {
        let env = EnvironmentBuilder::with_builtins().unwrap().freeze().unwrap();
        assert!(env.resolve_type("kotlin.Int").is_some());
        assert!(env.has_package("java.util.regex"));
        assert!(env.has_package("kotlin.text"));
    }

    #[test]
    fn test_int_companion_holder() {
        let env = EnvironmentBuilder::with_builtins().unwrap().freeze().unwrap();
        let int = env.resolve_type("kotlin.Int").unwrap();
        let holder = env.companion_holder_of(&int).unwrap();
        assert_eq!(holder.to_string(), "kotlin.Int$Companion");
        let min = env.resolve_member(&holder, "MIN_VALUE").unwrap();
        assert_eq!(min.declared_type, Type::class("kotlin.Int"));
        assert_eq!(env.nullability_of(min), Nullability::NotNull);
    }

    #[test]
    fn test_platform_static_members() {
        let env = EnvironmentBuilder::with_builtins().unwrap().freeze().unwrap();
        let pattern = env.resolve_type("java.util.regex.Pattern").unwrap();
        let compile = env.members_named(&pattern, "compile");
        assert_eq!(compile.len(), 2);
        assert!(compile.iter().all(|m| m.is_static));
        assert_eq!(env.nullability_of(&compile[0]), Nullability::Unknown);
        assert!(env.is_platform(&pattern));
    }
}

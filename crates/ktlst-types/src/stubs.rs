//! JSON class stubs.
//!
//! Classpath information reaches the environment as JSON stub files:
//!
//! ```json
//! {
//!   "origin": "platform",
//!   "classes": [{
//!     "name": "java.util.regex.Pattern",
//!     "supertypes": ["java.lang.Object"],
//!     "members": [
//!       { "name": "compile", "type": "java.util.regex.Pattern",
//!         "parameters": ["kotlin.String"], "static": true }
//!     ]
//!   }],
//!   "functions": [
//!     { "name": "toByteArray", "facade": "kotlin.text.StringsKt",
//!       "receiver": "kotlin.String", "type": "kotlin.ByteArray" }
//!   ]
//! }
//! ```
//!
//! Type strings use `?` for nullable types. Nested classes use binary names
//! (`Outer$Inner`); a class's `companion` becomes `Outer$Companion`.

use crate::environment::EnvironmentBuilder;
use crate::error::EnvironmentError;
use crate::types::{ClassInfo, ClassKind, Member, MemberKind, Nullability, Origin, Type, package_of};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StubFile {
    #[serde(default)]
    pub origin: Option<StubOrigin>,
    #[serde(default)]
    pub classes: Vec<ClassStub>,
    #[serde(default)]
    pub functions: Vec<FunctionStub>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StubOrigin {
    Library,
    Platform,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StubClassKind {
    #[default]
    Class,
    Interface,
    Object,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StubMemberKind {
    Field,
    #[default]
    Method,
    Constructor,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StubNullability {
    Nullable,
    NotNull,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClassStub {
    pub name: String,
    #[serde(default)]
    pub kind: StubClassKind,
    #[serde(default)]
    pub origin: Option<StubOrigin>,
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default)]
    pub members: Vec<MemberStub>,
    #[serde(default)]
    pub companion: Option<CompanionStub>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanionStub {
    #[serde(default = "default_companion_name")]
    pub name: String,
    #[serde(default)]
    pub members: Vec<MemberStub>,
}

fn default_companion_name() -> String {
    "Companion".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MemberStub {
    pub name: String,
    #[serde(default)]
    pub kind: StubMemberKind,
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub vararg: bool,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    #[serde(default)]
    pub nullability: Option<StubNullability>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FunctionStub {
    pub name: String,
    /// File facade owning the declaration, e.g. `kotlin.text.StringsKt`.
    pub facade: String,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub kind: StubMemberKind,
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub vararg: bool,
    #[serde(default)]
    pub nullability: Option<StubNullability>,
}

impl StubFile {
    pub fn parse(origin: &str, json: &str) -> Result<StubFile, EnvironmentError> {
        serde_json::from_str(json).map_err(|err| EnvironmentError::MalformedStub {
            origin: origin.to_string(),
            message: err.to_string(),
        })
    }
}

impl From<StubOrigin> for Origin {
    fn from(origin: StubOrigin) -> Origin {
        match origin {
            StubOrigin::Library => Origin::Library,
            StubOrigin::Platform => Origin::Platform,
        }
    }
}

impl From<StubNullability> for Nullability {
    fn from(nullability: StubNullability) -> Nullability {
        match nullability {
            StubNullability::Nullable => Nullability::Nullable,
            StubNullability::NotNull => Nullability::NotNull,
        }
    }
}

fn stub_type(type_name: Option<&str>, kind: StubMemberKind, owner: &str) -> Type {
    match (type_name, kind) {
        (Some(name), _) => Type::parse(name),
        (None, StubMemberKind::Constructor) => Type::class(owner),
        (None, _) => Type::class(crate::types::UNIT),
    }
}

fn member_from_stub(stub: &MemberStub, owner: &str) -> Member {
    let kind = match stub.kind {
        StubMemberKind::Field => MemberKind::Field,
        StubMemberKind::Method => MemberKind::Method,
        StubMemberKind::Constructor => MemberKind::Constructor,
    };
    Member {
        name: Arc::from(stub.name.as_str()),
        kind,
        declared_type: stub_type(stub.type_name.as_deref(), stub.kind, owner),
        owner: Arc::from(owner),
        parameters: stub.parameters.iter().map(|p| Type::parse(p)).collect(),
        is_vararg: stub.vararg,
        is_static: stub.is_static,
        is_synthetic: false,
        annotated_nullability: stub.nullability.map(Nullability::from),
        receiver: None,
    }
}

impl EnvironmentBuilder {
    /// Add every class and function of a parsed stub file.
    pub fn add_stub_file(&mut self, stubs: &StubFile) -> Result<(), EnvironmentError> {
        let file_origin = stubs.origin.unwrap_or(StubOrigin::Platform);
        for class in &stubs.classes {
            let origin: Origin = class.origin.unwrap_or(file_origin).into();
            let kind = match class.kind {
                StubClassKind::Class => ClassKind::Class,
                StubClassKind::Interface => ClassKind::Interface,
                StubClassKind::Object => ClassKind::Object,
            };
            let package = package_of(&class.name);
            let mut info = ClassInfo::new(&class.name, package, kind, origin);
            info.supertypes = class
                .supertypes
                .iter()
                .map(|name| Arc::from(name.as_str()))
                .collect();
            for member in &class.members {
                info.add_member(member_from_stub(member, &class.name));
            }
            if let Some(companion) = &class.companion {
                let holder = format!("{}${}", class.name, companion.name);
                let mut holder_info =
                    ClassInfo::new(&holder, package, ClassKind::CompanionObject, origin);
                for member in &companion.members {
                    holder_info.add_member(member_from_stub(member, &holder));
                }
                info.companion = Some(Arc::from(holder.as_str()));
                self.add_class(holder_info)?;
            }
            self.add_class(info)?;
        }
        for function in &stubs.functions {
            let kind = match function.kind {
                StubMemberKind::Field => MemberKind::Field,
                _ => MemberKind::Method,
            };
            let member = Member {
                name: Arc::from(function.name.as_str()),
                kind,
                declared_type: stub_type(function.type_name.as_deref(), function.kind, ""),
                owner: Arc::from(function.facade.as_str()),
                parameters: function.parameters.iter().map(|p| Type::parse(p)).collect(),
                is_vararg: function.vararg,
                is_static: true,
                is_synthetic: false,
                annotated_nullability: function.nullability.map(Nullability::from),
                receiver: function.receiver.as_deref().map(Type::parse),
            };
            self.add_top_level(package_of(&function.facade), member, file_origin.into());
        }
        debug!(
            classes = stubs.classes.len(),
            functions = stubs.functions.len(),
            "stub file loaded"
        );
        Ok(())
    }

    pub fn load_stubs_from_str(&mut self, origin: &str, json: &str) -> Result<(), EnvironmentError> {
        let stubs = StubFile::parse(origin, json)?;
        self.add_stub_file(&stubs)
    }

    pub fn load_stub_file(&mut self, path: &Path) -> Result<(), EnvironmentError> {
        let json = std::fs::read_to_string(path).map_err(|source| EnvironmentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_stubs_from_str(&path.display().to_string(), &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::TypeEnvironment;

    #[test]
    fn test_load_class_with_companion() {
        let mut builder = EnvironmentBuilder::new();
        builder
            .load_stubs_from_str(
                "inline",
                r#"{
                    "origin": "library",
                    "classes": [
                        { "name": "kotlin.Any" },
                        { "name": "k.Num", "companion": {
                            "members": [{ "name": "MAX", "kind": "field", "type": "k.Num" }]
                        } }
                    ]
                }"#,
            )
            .unwrap();
        let env = builder.freeze().unwrap();
        let num = env.resolve_type("k.Num").unwrap();
        let holder = env.companion_holder_of(&num).unwrap();
        assert_eq!(holder.to_string(), "k.Num$Companion");
        let max = env.resolve_member(&holder, "MAX").unwrap();
        assert_eq!(&*max.owner, "k.Num$Companion");
        assert_eq!(env.class_kind(&holder), Some(ClassKind::CompanionObject));
        assert!(env.has_package("k"));
    }

    #[test]
    fn test_extension_functions() {
        let mut builder = EnvironmentBuilder::new();
        builder
            .load_stubs_from_str(
                "inline",
                r#"{
                    "origin": "library",
                    "classes": [{ "name": "kotlin.Any" }, { "name": "kotlin.String" }],
                    "functions": [
                        { "name": "trimIndent", "facade": "kotlin.text.StringsKt",
                          "receiver": "kotlin.String", "type": "kotlin.String" },
                        { "name": "println", "facade": "kotlin.io.ConsoleKt",
                          "parameters": ["kotlin.Any?"] }
                    ]
                }"#,
            )
            .unwrap();
        let env = builder.freeze().unwrap();
        let string = Type::class("kotlin.String");
        let found = env.extensions_of(&string.make_nullable(), "trimIndent");
        assert_eq!(found.len(), 1);
        assert_eq!(&*found[0].owner, "kotlin.text.StringsKt");
        assert!(env.extensions_of(&Type::class("kotlin.Any"), "trimIndent").is_empty());
        let println = env.top_level("kotlin.io", "println");
        assert_eq!(println.len(), 1);
        assert_eq!(println[0].declared_type.to_string(), "kotlin.Unit");
    }

    #[test]
    fn test_malformed_stub() {
        let mut builder = EnvironmentBuilder::new();
        let err = builder
            .load_stubs_from_str("broken.json", r#"{ "classes": [ { "nom": "x" } ] }"#)
            .unwrap_err();
        assert!(matches!(err, EnvironmentError::MalformedStub { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}

use ktlst_binder::{BoundUnit, CONSTRUCTOR_NAME, bind_units};
use ktlst_parser::{ParseResult, parse_source};
use ktlst_types::{
    ClassKind, EnvironmentBuilder, InMemoryEnvironment, MemberKind, Type, TypeEnvironment,
};

fn bind(sources: &[(&str, &str)]) -> (InMemoryEnvironment, Vec<BoundUnit>) {
    let parsed: Vec<ParseResult> = sources
        .iter()
        .map(|(name, text)| parse_source(name, text))
        .collect();
    let units: Vec<&ParseResult> = parsed.iter().collect();
    let mut builder = EnvironmentBuilder::with_builtins().expect("builtins");
    let bound = bind_units(&mut builder, &units, &[]).expect("bind");
    (builder.freeze().expect("freeze"), bound)
}

#[test]
fn test_class_with_superclass_and_field() {
    let (env, _) = bind(&[(
        "Test.kt",
        "open class Super {\n    val id: String = \"\"\n}\nclass Test : Super() {\n    val other = 42\n}\n",
    )]);
    let test = env.resolve_type("Test").expect("Test declared");
    assert_eq!(env.supertypes_of(&test), vec![Type::class("Super")]);
    assert!(env.resolve_member(&test, "id").is_none());
    let id = env.resolve_member(&Type::class("Super"), "id").expect("field");
    assert_eq!(&*id.owner, "Super");
    assert_eq!(id.declared_type.to_string(), "kotlin.String");
    let other = env.resolve_member(&test, "other").expect("own field");
    assert_eq!(other.declared_type.to_string(), "kotlin.Int");
    assert!(env.is_source(&test));
}

#[test]
fn test_superclass_listed_before_interfaces() {
    let (env, _) = bind(&[(
        "a.kt",
        "package p\ninterface I\nopen class Base\nclass C : I, Base()\n",
    )]);
    let c = env.resolve_type("p.C").unwrap();
    assert_eq!(
        env.supertypes_of(&c),
        vec![Type::class("p.Base"), Type::class("p.I")]
    );
    assert_eq!(env.class_kind(&Type::class("p.I")), Some(ClassKind::Interface));
}

#[test]
fn test_top_level_declarations_belong_to_facade() {
    let (env, bound) = bind(&[(
        "src/strings.kt",
        "package util\nval crlf = \"\\r\\n\"\nfun String.shout(): String = this\nfun twice(n: Int) = n\n",
    )]);
    assert_eq!(&*bound[0].facade, "util.StringsKt");
    let crlf = env.top_level("util", "crlf");
    assert_eq!(crlf.len(), 1);
    assert_eq!(&*crlf[0].owner, "util.StringsKt");
    assert_eq!(crlf[0].declared_type.to_string(), "kotlin.String");
    let shout = env.extensions_of(&Type::class("kotlin.String"), "shout");
    assert_eq!(shout.len(), 1);
    assert_eq!(shout[0].kind, MemberKind::Method);
    // Non-literal expression bodies stay unknown until attribution.
    let twice = env.top_level("util", "twice");
    assert!(twice[0].declared_type.is_unknown());
}

#[test]
fn test_companion_and_nested_classes() {
    let (env, bound) = bind(&[(
        "a.kt",
        "class Outer {\n    class Inner(val name: String)\n    companion object {\n        const val MAX = 10\n    }\n}\n",
    )]);
    let outer = env.resolve_type("Outer").unwrap();
    let holder = env.companion_holder_of(&outer).expect("companion");
    assert_eq!(holder.to_string(), "Outer$Companion");
    let max = env.resolve_member(&holder, "MAX").unwrap();
    assert_eq!(max.declared_type.to_string(), "kotlin.Int");
    let inner = env.resolve_type("Outer$Inner").unwrap();
    let name = env.resolve_member(&inner, "name").unwrap();
    assert_eq!(name.kind, MemberKind::Field);
    let init = env.members_named(&inner, CONSTRUCTOR_NAME);
    assert_eq!(init.len(), 1);
    assert_eq!(init[0].kind, MemberKind::Constructor);
    assert_eq!(bound[0].class_names.len(), 3);
}

#[test]
fn test_cross_file_references() {
    let (env, _) = bind(&[
        ("A.kt", "package a\nimport b.B\nclass A : B() {\n    fun make(): B = B()\n}\n"),
        ("B.kt", "package b\nopen class B\n"),
    ]);
    let a = env.resolve_type("a.A").unwrap();
    assert_eq!(env.supertypes_of(&a), vec![Type::class("b.B")]);
    let make = env.resolve_member(&a, "make").unwrap();
    assert_eq!(make.declared_type.to_string(), "b.B");
}

#[test]
fn test_type_parameters_and_varargs() {
    let (env, _) = bind(&[(
        "a.kt",
        "class Box<T>(val item: T) {\n    fun all(vararg xs: String): Boolean = true\n}\n",
    )]);
    let boxed = env.resolve_type("Box").unwrap();
    let item = env.resolve_member(&boxed, "item").unwrap();
    assert_eq!(item.declared_type.to_string(), "kotlin.Any?");
    let all = env.resolve_member(&boxed, "all").unwrap();
    assert!(all.is_vararg);
    assert!(all.accepts_arity(3));
    assert_eq!(all.declared_type.to_string(), "kotlin.Boolean");
}

#[test]
fn test_same_class_in_two_files_merges() {
    let (env, _) = bind(&[
        ("a.kt", "package p\nclass Dup {\n    val a = 1\n}\n"),
        ("b.kt", "package p\nclass Dup {\n    val b = \"\"\n}\n"),
    ]);
    let dup = env.resolve_type("p.Dup").unwrap();
    assert!(env.resolve_member(&dup, "a").is_some());
    assert!(env.resolve_member(&dup, "b").is_some());
}

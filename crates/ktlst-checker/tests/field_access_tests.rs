//! Member-access attribution over small multi-file projects. Every case
//! also checks that the units print back byte-for-byte.

mod common;

use common::{find_access, rewrite_run, rewrite_run_clean};
use ktlst_checker::{AccessKind, AttributedUnit, SymbolKind, VariableKind, Visitor};
use ktlst_parser::NodeIndex;
use ktlst_types::Type;

#[test]
fn test_this_access() {
    let units = rewrite_run_clean(&[r#"class Test {
    var id : String = ""
    fun setId ( id : String ) {
        this . id = id
    }
}"#]);
    let unit = &units[0];
    let id = find_access(unit, "id");
    assert_eq!(id.access_kind, AccessKind::This);
    assert_eq!(id.symbol(), SymbolKind::Field);
    assert_eq!(id.resolved_owner(), Some("Test"));
    assert_eq!(id.resolved_type.to_string(), "kotlin.String");

    let parameter = unit
        .variables()
        .iter()
        .find(|v| v.kind == VariableKind::Parameter)
        .expect("parameter id");
    assert_eq!(&*parameter.name, "id");
    assert_eq!(parameter.ty, Type::class("kotlin.String"));
}

#[test]
fn test_super_access() {
    let units = rewrite_run_clean(&[
        r#"open class Super {
    val id : String = ""
}"#,
        r#"class Test : Super() {
    fun getId ( ) : String {
        return super . id
    }
}"#,
    ]);
    let id = find_access(&units[1], "id");
    assert_eq!(id.access_kind, AccessKind::Super);
    assert_eq!(id.resolved_owner(), Some("Super"));
    assert_eq!(id.resolved_type.to_string(), "kotlin.String");
    assert!(!id.is_platform_type);
}

#[test]
fn test_null_safe_dereference() {
    let units = rewrite_run_clean(&[
        r#"class Test {
    val property = 42
}"#,
        r#"fun method ( test : Test ? ) {
    val a = test ?. property
}"#,
    ]);
    let unit = &units[1];
    let property = find_access(unit, "property");
    assert_eq!(property.access_kind, AccessKind::NullSafe);
    assert_eq!(property.resolved_owner(), Some("Test"));
    assert_eq!(property.resolved_type.to_string(), "kotlin.Int?");
    assert_eq!(property.member.declared_type.to_string(), "kotlin.Int");

    let a = unit.variable("a").expect("local a");
    assert_eq!(a.kind, VariableKind::Local);
    assert_eq!(a.ty.to_string(), "kotlin.Int?");
}

#[test]
fn test_null_safe_makes_rest_of_chain_nullable() {
    let units = rewrite_run_clean(&[
        r#"class Inner {
    val value = 1
    fun twice ( ) : Int = 2
}
class Test {
    val inner = Inner ( )
    fun make ( ) : Inner = Inner ( )
}"#,
        r#"fun method ( test : Test ? ) {
    val a = test ?. inner . value
    val b = test ?. inner . twice ( )
    val c = test ?. make ( ) . value
}"#,
    ]);
    let unit = &units[1];
    let values: Vec<(AccessKind, String)> = unit
        .accesses_named("value")
        .map(|v| (v.access_kind, v.resolved_type.to_string()))
        .collect();
    assert_eq!(
        values,
        vec![
            (AccessKind::Plain, "kotlin.Int?".to_string()),
            (AccessKind::Plain, "kotlin.Int?".to_string()),
        ]
    );
    let value = find_access(unit, "value");
    assert_eq!(value.member.declared_type.to_string(), "kotlin.Int");
    assert_eq!(value.resolved_owner(), Some("Inner"));

    let twice = find_access(unit, "twice");
    assert_eq!(twice.access_kind, AccessKind::Plain);
    assert_eq!(twice.resolved_type.to_string(), "kotlin.Int?");

    for name in ["a", "b", "c"] {
        let variable = unit.variable(name).expect("local");
        assert_eq!(variable.ty.to_string(), "kotlin.Int?", "{name}");
    }
}

#[test]
fn test_plain_chain_stays_not_null() {
    let units = rewrite_run_clean(&[
        r#"class Inner {
    val value = 1
}
class Test {
    val inner = Inner ( )
}"#,
        r#"fun method ( test : Test ) {
    val a = test . inner . value
}"#,
    ]);
    let unit = &units[1];
    assert_eq!(find_access(unit, "value").resolved_type.to_string(), "kotlin.Int");
    assert_eq!(unit.variable("a").unwrap().ty.to_string(), "kotlin.Int");
}

#[derive(Default)]
struct ElvisTypes(Vec<Type>);

impl Visitor for ElvisTypes {
    fn visit_elvis(&mut self, _unit: &AttributedUnit, _node: NodeIndex, ty: &Type) {
        self.0.push(ty.clone());
    }
}

#[test]
fn test_elvis_operator() {
    let units = rewrite_run_clean(&[
        r#"class Test {
    val value : Int ? = 42
}"#,
        r#"fun method ( test : Test ) {
    val a = test . value ?: null
}"#,
    ]);
    let unit = &units[1];
    let value = find_access(unit, "value");
    assert_eq!(value.access_kind, AccessKind::Plain);
    assert_eq!(value.resolved_type.to_string(), "kotlin.Int?");

    let mut elvis = ElvisTypes::default();
    unit.visit(&mut elvis);
    assert_eq!(elvis.0, vec![Type::parse("kotlin.Int?")]);
    assert_eq!(unit.variable("a").unwrap().ty.to_string(), "kotlin.Int?");
}

#[test]
fn test_qualifier() {
    let units = rewrite_run_clean(&[r#"import java.nio.ByteBuffer

private val crlf : ByteBuffer = ByteBuffer . wrap( "\r\n" . toByteArray ( ) )"#]);
    let unit = &units[0];

    let wrap = find_access(unit, "wrap");
    assert_eq!(wrap.symbol(), SymbolKind::Method);
    assert_eq!(wrap.resolved_owner(), Some("java.nio.ByteBuffer"));
    assert!(wrap.is_platform_type);

    let to_byte_array = find_access(unit, "toByteArray");
    assert_eq!(to_byte_array.resolved_owner(), Some("kotlin.text.StringsKt"));
    assert_eq!(to_byte_array.resolved_type.to_string(), "kotlin.ByteArray");

    let crlf = unit.variable("crlf").expect("top-level crlf");
    assert_eq!(crlf.kind, VariableKind::Property);
    assert_eq!(crlf.owner.as_deref(), Some("File0Kt"));
    assert_eq!(crlf.ty.to_string(), "java.nio.ByteBuffer");

    // The import path is attributed segment by segment.
    let byte_buffer = find_access(unit, "ByteBuffer");
    assert_eq!(byte_buffer.symbol(), SymbolKind::Class);
    let nio = find_access(unit, "nio");
    assert_eq!(nio.symbol(), SymbolKind::Package);
}

#[test]
fn test_platform_field_type() {
    let units = rewrite_run_clean(&[r#"val pattern = java.util.regex.Pattern.compile(".*")"#]);
    let unit = &units[0];
    let pattern = unit.variable("pattern").expect("pattern");
    assert_eq!(&*pattern.name, "pattern");
    assert_eq!(pattern.ty.to_string(), "java.util.regex.Pattern");

    let symbols: Vec<(&str, SymbolKind)> = unit
        .accesses()
        .map(|a| (&*a.simple_name, a.symbol()))
        .collect();
    assert_eq!(
        symbols,
        vec![
            ("util", SymbolKind::Package),
            ("regex", SymbolKind::Package),
            ("Pattern", SymbolKind::Class),
            ("compile", SymbolKind::Method),
        ]
    );
}

#[test]
fn test_property_field_type() {
    let units = rewrite_run_clean(&["val i = Int.MIN_VALUE"]);
    let unit = &units[0];
    let min_value = find_access(unit, "MIN_VALUE");
    assert_eq!(min_value.symbol(), SymbolKind::Field);
    assert_eq!(min_value.resolved_type.to_string(), "kotlin.Int");
    assert_eq!(min_value.resolved_owner(), Some("kotlin.Int$Companion"));
    assert_eq!(unit.variable("i").unwrap().ty.to_string(), "kotlin.Int");
}

#[test]
fn test_unresolved_access_keeps_text() {
    let source = "fun f ( x : Missing ) {\n    val y = x . anything\n}";
    let units = rewrite_run(&[source]);
    let unit = &units[0];
    let anything = find_access(unit, "anything");
    assert!(!anything.is_resolved());
    assert!(anything.resolved_type.is_unknown());
    assert_eq!(unit.print(), source);
}

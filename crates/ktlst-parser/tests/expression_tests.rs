//! Shape of member-access expressions produced by the grammar.

use ktlst_parser::parser::node::node_flags;
use ktlst_parser::{NodeArena, NodeIndex, parse_source, print, syntax_kind_ext};
use ktlst_scanner::SyntaxKind;

fn accesses(arena: &NodeArena) -> Vec<NodeIndex> {
    (0..arena.len() as u32)
        .map(NodeIndex)
        .filter(|&i| arena.kind(i) == syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION)
        .collect()
}

#[test]
fn test_chain_is_left_nested() {
    let result = parse_source("e.kt", "val p = java.util.regex.Pattern.compile(\".*\")\n");
    let arena = &result.arena;
    let all = accesses(arena);
    // java.util, java.util.regex, java.util.regex.Pattern, ...Pattern.compile
    assert_eq!(all.len(), 4);
    let outer = *all.last().unwrap();
    let data = arena.get(outer).and_then(|n| arena.get_access_expr(n)).unwrap();
    assert_eq!(arena.name_text(data.name), "compile");
    assert_eq!(print(arena, data.expression), " java.util.regex.Pattern");
    assert_eq!(arena.kind(arena.parent_of(outer)), syntax_kind_ext::CALL_EXPRESSION);
}

#[test]
fn test_operator_and_name_leaves_keep_prefixes() {
    let result = parse_source("e.kt", "val a = test ?. property\n");
    let arena = &result.arena;
    let access = accesses(arena)[0];
    let node = arena.get(access).unwrap();
    let data = arena.get_access_expr(node).unwrap();
    assert!(data.question_dot_token);
    assert_ne!(node.flags & node_flags::NULL_SAFE, 0);
    let operator = arena.token_at(data.operator).unwrap();
    assert_eq!((operator.prefix.as_str(), operator.text.as_str()), (" ", "?."));
    let name = arena.token_at(data.name).unwrap();
    assert_eq!((name.prefix.as_str(), name.text.as_str()), (" ", "property"));
    assert_eq!(arena.leading_prefix(access), " ");
}

#[test]
fn test_this_and_super_qualifiers() {
    let result = parse_source(
        "e.kt",
        "class T : S() {\n    fun f() {\n        this . id = super . id\n    }\n}\n",
    );
    let arena = &result.arena;
    let kinds: Vec<u16> = accesses(arena)
        .into_iter()
        .map(|a| {
            let data = arena.get(a).and_then(|n| arena.get_access_expr(n)).unwrap();
            arena.kind(data.expression)
        })
        .collect();
    assert_eq!(
        kinds,
        vec![syntax_kind_ext::THIS_EXPRESSION, syntax_kind_ext::SUPER_EXPRESSION]
    );
}

#[test]
fn test_elvis_with_null_literal() {
    let result = parse_source("e.kt", "val a = test . value ?: null\n");
    let arena = &result.arena;
    let elvis = (0..arena.len() as u32)
        .map(NodeIndex)
        .find(|&i| arena.kind(i) == syntax_kind_ext::ELVIS_EXPRESSION)
        .unwrap();
    let data = arena.get(elvis).and_then(|n| arena.get_binary_expr(n)).unwrap();
    assert_eq!(arena.kind(data.left), syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION);
    assert_eq!(arena.kind(data.right), SyntaxKind::NullKeyword as u16);
    assert_eq!(data.operator, SyntaxKind::QuestionColonToken as u16);
}

#[test]
fn test_string_receiver_call() {
    let result = parse_source("e.kt", "val b = \"\\r\\n\" . toByteArray ( )\n");
    let arena = &result.arena;
    let access = accesses(arena)[0];
    let data = arena.get(access).and_then(|n| arena.get_access_expr(n)).unwrap();
    assert_eq!(arena.kind(data.expression), SyntaxKind::StringLiteral as u16);
    let call = arena.parent_of(access);
    let call_data = arena.get(call).and_then(|n| arena.get_call_expr(n)).unwrap();
    assert!(call_data.arguments.is_empty());
    assert!(call_data.argument_list.is_some());
}

#[test]
fn test_backticked_member_name() {
    let result = parse_source("e.kt", "val x = a.`is`\n");
    let arena = &result.arena;
    let access = accesses(arena)[0];
    let data = arena.get(access).and_then(|n| arena.get_access_expr(n)).unwrap();
    assert_eq!(arena.token_text(data.name), "`is`");
    assert_eq!(arena.name_text(data.name), "is");
}

#[test]
fn test_not_null_assertion_and_callable_reference() {
    let result = parse_source("e.kt", "val x = a!!.b\nval f = String::length\nval k = A::class\n");
    let arena = &result.arena;
    let postfix = (0..arena.len() as u32)
        .map(NodeIndex)
        .filter(|&i| arena.kind(i) == syntax_kind_ext::POSTFIX_UNARY_EXPRESSION)
        .count();
    let references = (0..arena.len() as u32)
        .map(NodeIndex)
        .filter(|&i| arena.kind(i) == syntax_kind_ext::CALLABLE_REFERENCE)
        .count();
    assert_eq!((postfix, references), (1, 2));
    assert!(result.diagnostics.is_empty());
}

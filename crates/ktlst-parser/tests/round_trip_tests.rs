//! Printing an unmodified tree reproduces the source byte for byte.

use ktlst_parser::{parse_source, print};

fn assert_round_trip(source: &str) {
    let result = parse_source("round_trip.kt", source);
    let printed = print(&result.arena, result.root);
    assert_eq!(printed, source, "round trip changed the source");
}

#[test]
fn test_this_access_fixture() {
    assert_round_trip(
        "class Test {\n    var id : String = \"\"\n    fun setId ( id : String ) {\n        this . id = id\n    }\n}\n",
    );
}

#[test]
fn test_super_access_fixture() {
    assert_round_trip("open class Super {\n    val id : String = \"\"\n}\n");
    assert_round_trip(
        "class Test : Super() {\n    fun getId ( ) : String {\n        return super . id\n    }\n}\n",
    );
}

#[test]
fn test_null_safe_fixture() {
    assert_round_trip("fun method ( test : Test ? ) {\n    val a = test ?. property\n}\n");
}

#[test]
fn test_elvis_fixture() {
    assert_round_trip("fun method ( test : Test ) {\n    val a = test . value ?: null\n}\n");
}

#[test]
fn test_qualifier_fixture() {
    assert_round_trip(
        "import java.nio.ByteBuffer\n\nprivate val crlf : ByteBuffer = ByteBuffer . wrap( \"\\r\\n\" . toByteArray ( ) )\n",
    );
}

#[test]
fn test_platform_and_companion_fixtures() {
    assert_round_trip("val pattern = java.util.regex.Pattern.compile(\".*\")\n");
    assert_round_trip("val i = Int.MIN_VALUE\n");
}

#[test]
fn test_comments_everywhere() {
    assert_round_trip(
        "/** doc */\n// line\npackage /* p */ a . b // tail\n\nimport /* i */ x.y.* // star\n\nclass /* c */ A /* d */ (\n    // param\n    val x: Int, /* after */\n) : /* s */ B() {\n    /* nested /* comment */ still */\n    fun f() = x /* r */ ?. /* m */ toString() // end\n}\n/* eof */",
    );
}

#[test]
fn test_whitespace_variants() {
    assert_round_trip("\n\n\t  val   a\t=\t1  \r\n\r\nval b = a\r\n");
    assert_round_trip("   ");
    assert_round_trip("val x = 1");
}

#[test]
fn test_strings_and_templates() {
    assert_round_trip(
        "val a = \"x = $x, y = ${y.z { \"}\" }}\"\nval b = \"\"\"\n  raw $a \"quoted\"\n\"\"\".trimIndent()\nval c = '\\n'\n",
    );
}

#[test]
fn test_unsupported_constructs() {
    assert_round_trip(
        "typealias S = String\nenum class Color { RED, GREEN; fun x() = 1 }\nfun f(x: Any) = when (x) {\n    is String -> x.length\n    else -> try { 0 } catch (e: Exception) { 1 } finally { }\n}\n",
    );
}

#[test]
fn test_malformed_input() {
    for source in [
        "class {",
        "fun (",
        "val = ",
        "}}}{{{",
        "a..b...c",
        "x?.?.y",
        "\"unterminated",
        "/* unterminated comment",
        "`unterminated",
        "this@",
        "super<",
        "€ § ¤",
        "fun f() { return@ }",
        "class A : B by c { }",
        "if (a) else b",
    ] {
        assert_round_trip(source);
    }
}

#[test]
fn test_every_prefix_of_a_file() {
    let source = "package a\nimport b.C\nopen class A(val x: Int) : C() {\n    companion object { const val K = 1 }\n    fun f(y: Int?) = this.x + (y ?: super.hashCode())\n}\n";
    for end in 0..=source.len() {
        if source.is_char_boundary(end) {
            assert_round_trip(&source[..end]);
        }
    }
}

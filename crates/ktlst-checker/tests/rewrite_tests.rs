//! Rewrites and traversal of attributed units.

mod common;

use common::rewrite_run_clean;
use ktlst_checker::{AccessInfo, AttributedUnit, VariableInfo, Visitor};
use ktlst_parser::NodeIndex;
use ktlst_types::Type;

const THIS_ACCESS: &str = "class Test {\n    var id : String = \"\"\n    fun setId ( id : String ) {\n        this . id = id\n    }\n}";

#[test]
fn test_rename_member_changes_only_the_name() {
    let units = rewrite_run_clean(&[THIS_ACCESS]);
    let unit = &units[0];
    let access = unit.accesses_named("id").next().expect("this.id");

    let renamed = unit.rename_member(access.node, "identifier").expect("renamed");
    assert_eq!(
        renamed.print(),
        THIS_ACCESS.replace("this . id", "this . identifier")
    );
    let info = renamed.access_info(access.node).unwrap();
    assert_eq!(&*info.simple_name, "identifier");
    assert_eq!(info.resolved_owner(), Some("Test"));

    // The original unit is untouched.
    assert_eq!(unit.print(), THIS_ACCESS);
}

#[test]
fn test_rename_rejects_non_name_nodes() {
    let units = rewrite_run_clean(&[THIS_ACCESS]);
    let unit = &units[0];
    assert!(unit.rename_member(unit.root(), "x").is_none());
}

#[test]
fn test_accesses_named_outlives_the_queried_name() {
    let units = rewrite_run_clean(&[THIS_ACCESS]);
    let found = {
        let name = String::from("id");
        units[0].accesses_named(&name).next()
    };
    assert_eq!(found.map(|a| &*a.simple_name), Some("id"));
}

#[derive(Default)]
struct Collector {
    accesses: Vec<String>,
    variables: Vec<String>,
    calls: Vec<String>,
}

impl Visitor for Collector {
    fn visit_access(&mut self, _unit: &AttributedUnit, access: &AccessInfo) {
        self.accesses.push(access.simple_name.to_string());
    }

    fn visit_variable(&mut self, _unit: &AttributedUnit, variable: &VariableInfo) {
        self.variables.push(variable.name.to_string());
    }

    fn visit_call(&mut self, _unit: &AttributedUnit, _node: NodeIndex, ty: &Type) {
        self.calls.push(ty.to_string());
    }
}

#[test]
fn test_visitor_sees_tree_in_source_order() {
    let units = rewrite_run_clean(&[
        "import java.nio.ByteBuffer\n\nval size = ByteBuffer . allocate ( 4 ) . capacity ( )\nval text = \"a\" . trim ( )",
    ]);
    let mut collector = Collector::default();
    units[0].visit(&mut collector);

    // Preorder: an access comes before the qualifier chain inside it.
    assert_eq!(
        collector.accesses,
        vec!["ByteBuffer", "nio", "capacity", "allocate", "trim"]
    );
    assert_eq!(collector.variables, vec!["size", "text"]);
    assert_eq!(
        collector.calls,
        vec!["kotlin.Int", "java.nio.ByteBuffer", "kotlin.String"]
    );
}

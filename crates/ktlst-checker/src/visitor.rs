//! Read-only traversal of attributed units.

use crate::attributed::{AccessInfo, AttributedUnit, VariableInfo};
use ktlst_parser::NodeIndex;
use ktlst_parser::syntax_kind_ext::{CALL_EXPRESSION, ELVIS_EXPRESSION};
use ktlst_types::Type;
use rustc_hash::FxHashMap;

/// Callbacks for `AttributedUnit::visit`. Every method defaults to doing
/// nothing.
pub trait Visitor {
    fn visit_access(&mut self, _unit: &AttributedUnit, _access: &AccessInfo) {}

    fn visit_variable(&mut self, _unit: &AttributedUnit, _variable: &VariableInfo) {}

    fn visit_elvis(&mut self, _unit: &AttributedUnit, _node: NodeIndex, _ty: &Type) {}

    fn visit_call(&mut self, _unit: &AttributedUnit, _node: NodeIndex, _ty: &Type) {}
}

/// Visit the unit's tree in source order (preorder).
pub fn walk<V: Visitor + ?Sized>(unit: &AttributedUnit, visitor: &mut V) {
    let arena = unit.arena();
    let mut variables: FxHashMap<NodeIndex, Vec<&VariableInfo>> = FxHashMap::default();
    for variable in unit.variables() {
        variables.entry(variable.node).or_default().push(variable);
    }

    let mut stack = vec![unit.root()];
    while let Some(idx) = stack.pop() {
        if let Some(access) = unit.access_info(idx) {
            visitor.visit_access(unit, access);
        }
        for variable in variables.get(&idx).into_iter().flatten() {
            visitor.visit_variable(unit, variable);
        }
        match arena.kind(idx) {
            ELVIS_EXPRESSION => visitor.visit_elvis(unit, idx, &unit.type_of(idx)),
            CALL_EXPRESSION => visitor.visit_call(unit, idx, &unit.type_of(idx)),
            _ => {}
        }
        stack.extend(
            arena
                .children_of(idx)
                .iter()
                .rev()
                .copied()
                .filter(|child| child.is_some()),
        );
    }
}

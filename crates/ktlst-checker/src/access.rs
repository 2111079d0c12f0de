//! Member-access classifier.

use ktlst_parser::NodeIndex;
use ktlst_parser::parser::node::NodeArena;
use ktlst_parser::syntax_kind_ext::{
    CALL_EXPRESSION, PROPERTY_ACCESS_EXPRESSION, SUPER_EXPRESSION, THIS_EXPRESSION,
};
use std::fmt;

/// Variant of a `qualifier.member` access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// `a.b`, or a segment of a bare qualified name.
    Plain,
    /// `a?.b`: skipped at run time when `a` is null.
    NullSafe,
    /// `this.b`: resolved on the innermost enclosing class.
    This,
    /// `super.b`: resolved strictly on the declared superclass.
    Super,
}

impl AccessKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessKind::Plain => "plain",
            AccessKind::NullSafe => "null-safe",
            AccessKind::This => "this",
            AccessKind::Super => "super",
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a `PROPERTY_ACCESS_EXPRESSION`.
///
/// A `this`/`super` qualifier decides first, then the `?.` operator.
/// Anything that is not an access node classifies as `Plain`.
pub fn classify(arena: &NodeArena, access: NodeIndex) -> AccessKind {
    let Some(data) = arena.get(access).and_then(|n| arena.get_access_expr(n)) else {
        return AccessKind::Plain;
    };
    match arena.kind(data.expression) {
        THIS_EXPRESSION => AccessKind::This,
        SUPER_EXPRESSION => AccessKind::Super,
        _ if data.question_dot_token => AccessKind::NullSafe,
        _ => AccessKind::Plain,
    }
}

/// Whether `?.` appears anywhere on the left spine of `node`, through
/// accesses and call callees. The whole chain is skipped when that receiver
/// is null, so every later link is nullable too.
pub fn is_short_circuited(arena: &NodeArena, node: NodeIndex) -> bool {
    let mut idx = node;
    loop {
        let Some(n) = arena.get(idx) else {
            return false;
        };
        idx = match n.kind {
            PROPERTY_ACCESS_EXPRESSION => match arena.get_access_expr(n) {
                Some(data) if data.question_dot_token => return true,
                Some(data) => data.expression,
                None => return false,
            },
            CALL_EXPRESSION => match arena.get_call_expr(n) {
                Some(data) => data.callee,
                None => return false,
            },
            _ => return false,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktlst_parser::parse_source;
    use ktlst_parser::syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION;

    fn kinds(source: &str) -> Vec<AccessKind> {
        let result = parse_source("c.kt", source);
        let arena = &result.arena;
        (0..arena.len() as u32)
            .map(NodeIndex)
            .filter(|&i| arena.kind(i) == PROPERTY_ACCESS_EXPRESSION)
            .map(|i| classify(arena, i))
            .collect()
    }

    fn short_circuited(source: &str) -> Vec<bool> {
        let result = parse_source("c.kt", source);
        let arena = &result.arena;
        (0..arena.len() as u32)
            .map(NodeIndex)
            .filter(|&i| arena.kind(i) == PROPERTY_ACCESS_EXPRESSION)
            .map(|i| is_short_circuited(arena, i))
            .collect()
    }

    #[test]
    fn test_short_circuit_spans_later_links() {
        assert_eq!(short_circuited("val a = b.c.d"), vec![false, false]);
        assert_eq!(short_circuited("val a = b?.c.d"), vec![true, true]);
        assert_eq!(short_circuited("val a = b.c?.d"), vec![false, true]);
        assert_eq!(short_circuited("val a = b?.c().d"), vec![true, true]);
        assert_eq!(short_circuited("val a = (b?.c).d"), vec![true, false]);
    }

    #[test]
    fn test_classification() {
        assert_eq!(kinds("val a = b.c"), vec![AccessKind::Plain]);
        assert_eq!(kinds("val a = b?.c"), vec![AccessKind::NullSafe]);
        assert_eq!(kinds("val a = this.c"), vec![AccessKind::This]);
        assert_eq!(kinds("val a = super.c"), vec![AccessKind::Super]);
        assert_eq!(kinds("val a = this?.c"), vec![AccessKind::This]);
        assert_eq!(
            kinds("val a = b?.c.d"),
            vec![AccessKind::NullSafe, AccessKind::Plain]
        );
    }
}

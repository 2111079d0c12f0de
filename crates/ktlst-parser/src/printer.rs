//! Lossless printer.
//!
//! Printing is an in-order walk over the children lists emitting each token
//! leaf's prefix followed by its text. No formatting decisions are made here,
//! so an unmodified tree prints back to its source byte for byte.

use crate::parser::base::NodeIndex;
use crate::parser::node::NodeArena;
use crate::parser::syntax_kind_ext;
use std::fmt::Write;

/// Print the subtree rooted at `root`.
pub fn print(arena: &NodeArena, root: NodeIndex) -> String {
    let mut out = String::with_capacity(arena.tokens.len() * 4);
    print_into(arena, root, &mut out);
    out
}

/// Append the subtree rooted at `root` to `out`.
pub fn print_into(arena: &NodeArena, root: NodeIndex, out: &mut String) {
    // Iterative: nesting depth is bounded only by the input.
    let mut stack = vec![root];
    while let Some(index) = stack.pop() {
        let Some(node) = arena.get(index) else {
            continue;
        };
        if let Some(token) = arena.get_token(node) {
            out.push_str(&token.prefix);
            out.push_str(&token.text);
            continue;
        }
        stack.extend(arena.children_of(index).iter().rev().copied());
    }
}

/// Indented outline of the tree for debugging (`--dump-tree`).
pub fn dump_tree(arena: &NodeArena, root: NodeIndex) -> String {
    let mut out = String::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((index, depth)) = stack.pop() {
        let Some(node) = arena.get(index) else {
            continue;
        };
        let indent = "  ".repeat(depth);
        if let Some(token) = arena.get_token(node) {
            let _ = writeln!(out, "{indent}{:?} {:?}", token_kind_name(node.kind), token.text);
            continue;
        }
        let _ = writeln!(
            out,
            "{indent}{} [{}..{})",
            syntax_kind_ext::kind_name(node.kind),
            node.pos,
            node.end
        );
        for &child in arena.children_of(index).iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    out
}

fn token_kind_name(kind: u16) -> String {
    ktlst_scanner::SyntaxKind::from_u16(kind)
        .map_or_else(|| format!("#{kind}"), |k| format!("{k:?}"))
}

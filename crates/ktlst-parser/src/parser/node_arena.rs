//! NodeArena construction and typed access.
//!
//! Composite nodes are built bottom-up: the grammar collects a node's
//! children (token leaves and finished sub-nodes) in source order and hands
//! them to one of the `add_*` constructors, which records the data, the
//! children and the parent links in one step.

use super::base::{NodeIndex, NodeList};
use super::node::*;
use super::syntax_kind_ext::*;
use ktlst_common::interner::{Atom, Interner};
use ktlst_common::span::Span;
use ktlst_scanner::SyntaxKind;

/// Generates an `add_*` constructor and a `get_*` accessor for one data pool.
macro_rules! node_pool {
    ($add:ident, $get:ident, $pool:ident, $data:ty, [$($kind:path),+ $(,)?]) => {
        pub fn $add(&mut self, kind: u16, pos: u32, children: NodeList, data: $data) -> NodeIndex {
            debug_assert!($(kind == $kind)||+, "{} is not a valid kind for {}", kind_name(kind), stringify!($pool));
            let data_index = self.$pool.len() as u32;
            self.$pool.push(data);
            self.push_composite(kind, pos, children, data_index)
        }

        #[inline]
        pub fn $get(&self, node: &Node) -> Option<&$data> {
            if node.has_data() && ($(node.kind == $kind)||+) {
                self.$pool.get(node.data_index as usize)
            } else {
                None
            }
        }
    };
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    /// Pre-size the node vectors from the source length.
    pub fn with_capacity(source_len: usize) -> NodeArena {
        let estimate = source_len / 4 + 16;
        NodeArena {
            nodes: Vec::with_capacity(estimate),
            extended_info: Vec::with_capacity(estimate),
            tokens: Vec::with_capacity(estimate / 2),
            ..NodeArena::default()
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    #[inline]
    pub fn get_extended(&self, index: NodeIndex) -> Option<&ExtendedNodeInfo> {
        if index.is_none() {
            None
        } else {
            self.extended_info.get(index.0 as usize)
        }
    }

    /// Kind of a node, or `SyntaxKind::Unknown` for `NONE`.
    #[inline]
    pub fn kind(&self, index: NodeIndex) -> u16 {
        self.get(index).map_or(SyntaxKind::Unknown as u16, |n| n.kind)
    }

    #[inline]
    pub fn parent_of(&self, index: NodeIndex) -> NodeIndex {
        self.get_extended(index).map_or(NodeIndex::NONE, |e| e.parent)
    }

    /// Children in source order (tokens included).
    pub fn children_of(&self, index: NodeIndex) -> &[NodeIndex] {
        self.get_extended(index)
            .map_or(&[][..], |e| e.children.nodes.as_slice())
    }

    /// Source span of a node's own text (leading trivia excluded).
    pub fn span_of(&self, index: NodeIndex) -> Span {
        self.get(index)
            .map_or(Span::new(0, 0), |n| Span::new(n.pos, n.end))
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn intern(&mut self, text: &str) -> Atom {
        self.interner.intern(text)
    }

    pub fn resolve_atom(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    fn set_parent(&mut self, child: NodeIndex, parent: NodeIndex) {
        if let Some(info) = self.extended_info.get_mut(child.0 as usize) {
            info.parent = parent;
        }
    }

    fn push_composite(
        &mut self,
        kind: u16,
        pos: u32,
        children: NodeList,
        data_index: u32,
    ) -> NodeIndex {
        let (start, end) = match (children.nodes.first(), children.nodes.last()) {
            (Some(first), Some(last)) => (
                self.get(*first).map_or(pos, |n| n.pos),
                self.get(*last).map_or(pos, |n| n.end),
            ),
            _ => (pos, pos),
        };
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node::with_data(kind, start, end, data_index));
        for child in children.iter() {
            self.set_parent(child, index);
        }
        self.extended_info.push(ExtendedNodeInfo {
            parent: NodeIndex::NONE,
            children,
        });
        index
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Add a token leaf. Identifiers and soft keywords get their value interned.
    pub fn add_token(
        &mut self,
        kind: SyntaxKind,
        pos: u32,
        end: u32,
        prefix: &str,
        text: &str,
        value: &str,
    ) -> NodeIndex {
        let atom = if kind == SyntaxKind::Identifier || kind.is_soft_keyword() {
            self.interner.intern(value)
        } else {
            Atom::NONE
        };
        let data_index = self.tokens.len() as u32;
        self.tokens.push(TokenData {
            prefix: prefix.to_string(),
            text: text.to_string(),
            atom,
        });
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes
            .push(Node::with_data(kind as u16, pos, end, data_index));
        self.extended_info.push(ExtendedNodeInfo::default());
        index
    }

    #[inline]
    pub fn get_token(&self, node: &Node) -> Option<&TokenData> {
        if node.has_data() && node.is_token() {
            self.tokens.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn token_at(&self, index: NodeIndex) -> Option<&TokenData> {
        self.get(index).and_then(|n| self.get_token(n))
    }

    /// Raw token text, or "" for composites.
    pub fn token_text(&self, index: NodeIndex) -> &str {
        self.token_at(index).map_or("", |t| t.text.as_str())
    }

    /// Identifier atom of a name leaf (backticks stripped).
    pub fn name_atom(&self, index: NodeIndex) -> Atom {
        self.token_at(index).map_or(Atom::NONE, |t| t.atom)
    }

    /// Identifier text of a name leaf (backticks stripped).
    pub fn name_text(&self, index: NodeIndex) -> &str {
        self.resolve_atom(self.name_atom(index))
    }

    /// First token leaf in a subtree.
    pub fn first_token(&self, index: NodeIndex) -> NodeIndex {
        let mut current = index;
        loop {
            match self.get(current) {
                Some(node) if node.is_token() => return current,
                Some(_) => match self.children_of(current).first() {
                    Some(&child) => current = child,
                    None => return NodeIndex::NONE,
                },
                None => return NodeIndex::NONE,
            }
        }
    }

    /// Formatting carrier of a node: the trivia before its first token.
    pub fn leading_prefix(&self, index: NodeIndex) -> &str {
        self.token_at(self.first_token(index))
            .map_or("", |t| t.prefix.as_str())
    }

    /// Replace the text of a name leaf. The prefix is left untouched.
    pub fn set_token_text(&mut self, index: NodeIndex, text: &str) -> bool {
        let Some(node) = self.nodes.get_mut(index.0 as usize) else {
            return false;
        };
        if !node.is_token() || !node.has_data() {
            return false;
        }
        node.flags |= node_flags::REWRITTEN;
        let data_index = node.data_index as usize;
        let value = text.trim_start_matches('`').trim_end_matches('`');
        let atom = self.interner.intern(value);
        match self.tokens.get_mut(data_index) {
            Some(token) => {
                token.text = text.to_string();
                token.atom = atom;
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Composites
    // =========================================================================

    /// Add a composite without typed data (lists, modifier runs, recovery).
    pub fn add_node(&mut self, kind: u16, pos: u32, children: NodeList) -> NodeIndex {
        self.push_composite(kind, pos, children, Node::NO_DATA)
    }

    pub fn set_flags(&mut self, index: NodeIndex, flags: u16) {
        if let Some(node) = self.nodes.get_mut(index.0 as usize) {
            node.flags |= flags;
        }
    }

    node_pool!(add_source_file, get_source_file, source_files, SourceFileData, [SOURCE_FILE]);
    node_pool!(add_package, get_package, packages, PackageData, [PACKAGE_DIRECTIVE]);
    node_pool!(add_import, get_import, imports, ImportData, [IMPORT_DIRECTIVE]);
    node_pool!(add_class, get_class, classes, ClassData, [CLASS_DECLARATION, OBJECT_DECLARATION]);
    node_pool!(add_class_body, get_class_body, class_bodies, ClassBodyData, [CLASS_BODY]);
    node_pool!(
        add_primary_constructor,
        get_primary_constructor,
        primary_constructors,
        PrimaryConstructorData,
        [PRIMARY_CONSTRUCTOR]
    );
    node_pool!(add_parameter, get_parameter, parameters, ParameterData, [PARAMETER]);
    node_pool!(
        add_supertype_entry,
        get_supertype_entry,
        supertype_entries,
        SupertypeEntryData,
        [SUPERTYPE_ENTRY]
    );
    node_pool!(
        add_function,
        get_function,
        functions,
        FunctionData,
        [FUNCTION_DECLARATION, SECONDARY_CONSTRUCTOR, PROPERTY_ACCESSOR]
    );
    node_pool!(add_property, get_property, properties, PropertyData, [PROPERTY_DECLARATION]);
    node_pool!(add_type_ref, get_type_ref, type_refs, TypeRefData, [TYPE_REFERENCE]);
    node_pool!(add_block, get_block, blocks, BlockData, [BLOCK]);
    node_pool!(add_return, get_return, returns, ReturnData, [RETURN_STATEMENT]);
    node_pool!(add_assignment, get_assignment, assignments, AssignmentData, [ASSIGNMENT]);
    node_pool!(add_if, get_if, if_exprs, IfData, [IF_EXPRESSION]);
    node_pool!(
        add_access_expr,
        get_access_expr,
        access_exprs,
        AccessExprData,
        [PROPERTY_ACCESS_EXPRESSION]
    );
    node_pool!(add_call_expr, get_call_expr, call_exprs, CallExprData, [CALL_EXPRESSION]);
    node_pool!(
        add_value_argument,
        get_value_argument,
        value_arguments,
        ValueArgumentData,
        [VALUE_ARGUMENT]
    );
    node_pool!(
        add_self_reference,
        get_self_reference,
        self_references,
        SelfReferenceData,
        [THIS_EXPRESSION, SUPER_EXPRESSION]
    );
    node_pool!(
        add_binary_expr,
        get_binary_expr,
        binary_exprs,
        BinaryExprData,
        [BINARY_EXPRESSION, ELVIS_EXPRESSION]
    );
    node_pool!(
        add_unary_expr,
        get_unary_expr,
        unary_exprs,
        UnaryExprData,
        [PREFIX_UNARY_EXPRESSION, POSTFIX_UNARY_EXPRESSION]
    );
    node_pool!(
        add_type_operation,
        get_type_operation,
        type_operations,
        TypeOperationData,
        [AS_EXPRESSION, IS_EXPRESSION]
    );
    node_pool!(
        add_parenthesized,
        get_parenthesized,
        parenthesized,
        ParenthesizedData,
        [PARENTHESIZED_EXPRESSION]
    );
    node_pool!(add_lambda, get_lambda, lambdas, LambdaData, [LAMBDA_EXPRESSION]);
    node_pool!(
        add_callable_reference,
        get_callable_reference,
        callable_references,
        CallableReferenceData,
        [CALLABLE_REFERENCE]
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_span_and_parents() {
        let mut arena = NodeArena::new();
        let a = arena.add_token(SyntaxKind::Identifier, 2, 3, "  ", "a", "a");
        let dot = arena.add_token(SyntaxKind::DotToken, 3, 4, "", ".", ".");
        let b = arena.add_token(SyntaxKind::Identifier, 5, 6, " ", "b", "b");
        let children: NodeList = [a, dot, b].into_iter().collect();
        let access = arena.add_access_expr(
            PROPERTY_ACCESS_EXPRESSION,
            2,
            children,
            AccessExprData {
                expression: a,
                operator: dot,
                name: b,
                question_dot_token: false,
            },
        );
        let node = arena.get(access).unwrap();
        assert_eq!((node.pos, node.end), (2, 6));
        assert_eq!(arena.parent_of(b), access);
        assert_eq!(arena.leading_prefix(access), "  ");
        assert_eq!(arena.name_text(b), "b");
        assert!(arena.get_access_expr(node).is_some());
        assert!(arena.get_call_expr(node).is_none());
    }

    #[test]
    fn test_set_token_text_keeps_prefix() {
        let mut arena = NodeArena::new();
        let id = arena.add_token(SyntaxKind::Identifier, 1, 3, " ", "id", "id");
        assert!(arena.set_token_text(id, "key"));
        let token = arena.token_at(id).unwrap();
        assert_eq!(token.prefix, " ");
        assert_eq!(token.text, "key");
        assert_eq!(arena.name_text(id), "key");
        assert_ne!(arena.get(id).unwrap().flags & node_flags::REWRITTEN, 0);
    }

    #[test]
    fn test_backticked_names_intern_bare_value() {
        let mut arena = NodeArena::new();
        let id = arena.add_token(SyntaxKind::Identifier, 0, 6, "", "`is`", "is");
        assert_eq!(arena.token_text(id), "`is`");
        assert_eq!(arena.name_text(id), "is");
    }
}

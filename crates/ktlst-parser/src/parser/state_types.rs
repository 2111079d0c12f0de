//! Parser state - type references and qualified name chains.

use super::base::{NodeIndex, NodeList};
use super::node::*;
use super::state::ParserState;
use super::syntax_kind_ext::*;
use ktlst_scanner::{ScannerState, SyntaxKind};

impl ParserState {
    /// `a.b.C` as left-nested `PROPERTY_ACCESS_EXPRESSION` nodes.
    ///
    /// At most `max_segments` names are taken. With `allow_star`, a trailing
    /// `.*` is pushed into `trailing` instead of ending the chain silently.
    pub(crate) fn parse_name_chain(
        &mut self,
        max_segments: usize,
        allow_star: bool,
        trailing: &mut NodeList,
    ) -> NodeIndex {
        let start = self.token_pos();
        let mut left = self.bump_name();
        if left.is_none() {
            return NodeIndex::NONE;
        }
        let mut segments = 1usize;
        while self.is_token(SyntaxKind::DotToken) && segments < max_segments {
            let (next, _) = self.peek();
            if next == SyntaxKind::Identifier || next.is_soft_keyword() {
                let dot = self.bump();
                let name = self.bump_name();
                let children: NodeList = [left, dot, name].into_iter().collect();
                left = self.arena.add_access_expr(
                    PROPERTY_ACCESS_EXPRESSION,
                    start,
                    children,
                    AccessExprData {
                        expression: left,
                        operator: dot,
                        name,
                        question_dot_token: false,
                    },
                );
                segments += 1;
            } else {
                if allow_star && next == SyntaxKind::AsteriskToken {
                    trailing.push(self.bump());
                    trailing.push(self.bump());
                }
                break;
            }
        }
        left
    }

    pub(crate) fn parse_type_reference(&mut self) -> NodeIndex {
        self.parse_type_reference_limited(usize::MAX)
    }

    /// Parse a type, taking at most `max_segments` names of its qualified name.
    pub(crate) fn parse_type_reference_limited(&mut self, max_segments: usize) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        let mut name = NodeIndex::NONE;
        let mut type_arguments = NodeList::new();

        if !self.enter() {
            return self.parse_unknown();
        }

        if self.is_token(SyntaxKind::AtToken) {
            self.parse_modifiers(&mut children);
        }
        if self.token_text_is("suspend") && self.peek().0 == SyntaxKind::OpenParenToken {
            children.push(self.bump());
        }

        if self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_function_type_rest(&mut children);
        } else if self.is_identifier() {
            let mut trailing = NodeList::new();
            name = self.parse_name_chain(max_segments, false, &mut trailing);
            children.push(name);
            if self.is_token(SyntaxKind::LessThanToken) && !self.has_line_break() {
                let (list, arguments) = self.parse_type_argument_list();
                children.push(list);
                type_arguments = arguments;
            }
            // `Receiver.(Params) -> Result`
            if self.is_token(SyntaxKind::DotToken)
                && self.peek().0 == SyntaxKind::OpenParenToken
            {
                children.push(self.bump());
                self.parse_function_type_rest(&mut children);
                name = NodeIndex::NONE;
            }
        } else {
            self.leave();
            return NodeIndex::NONE;
        }

        let mut is_nullable = false;
        while self.is_token(SyntaxKind::QuestionToken) && !self.has_line_break() {
            children.push(self.bump());
            is_nullable = true;
        }
        self.leave();

        self.arena.add_type_ref(
            TYPE_REFERENCE,
            start,
            children,
            TypeRefData {
                name,
                type_arguments,
                is_nullable,
            },
        )
    }

    /// `(A, name: B) -> R`, or a parenthesized type `(T)`.
    fn parse_function_type_rest(&mut self, children: &mut NodeList) {
        children.push(self.bump());
        loop {
            match self.token() {
                SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::CommaToken => children.push(self.bump()),
                _ => {
                    if self.is_identifier() && self.peek().0 == SyntaxKind::ColonToken {
                        children.push(self.bump_name());
                        children.push(self.bump());
                    }
                    let parameter = self.parse_type_reference();
                    if parameter.is_none() {
                        children.push(self.parse_unknown_token());
                    } else {
                        children.push(parameter);
                    }
                }
            }
        }
        self.eat(SyntaxKind::CloseParenToken, children);
        if self.is_token(SyntaxKind::MinusGreaterThanToken) {
            children.push(self.bump());
            children.push(self.parse_type_reference());
        }
    }

    /// `<A, out B, *>`; returns the list node and the argument type references.
    pub(crate) fn parse_type_argument_list(&mut self) -> (NodeIndex, NodeList) {
        let start = self.token_pos();
        let mut children = NodeList::new();
        let mut arguments = NodeList::new();
        children.push(self.bump());
        loop {
            match self.token() {
                SyntaxKind::GreaterThanToken | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::CommaToken => children.push(self.bump()),
                SyntaxKind::AsteriskToken => children.push(self.bump()),
                _ => {
                    if (self.is_token(SyntaxKind::InKeyword) || self.token_text_is("out"))
                        && self.peek().0 == SyntaxKind::Identifier
                    {
                        children.push(self.bump());
                    }
                    let argument = self.parse_type_reference();
                    if argument.is_none() {
                        children.push(self.parse_unknown_token());
                    } else {
                        arguments.push(argument);
                        children.push(argument);
                    }
                }
            }
        }
        self.eat(SyntaxKind::GreaterThanToken, &mut children);
        let list = self.arena.add_node(TYPE_ARGUMENT_LIST, start, children);
        (list, arguments)
    }

    /// At `<`: does a type argument list followed by a call or `::` start here?
    pub(crate) fn looks_like_type_arguments(&mut self) -> bool {
        self.look_ahead(skip_type_arguments)
    }
}

fn skip_type_arguments(scanner: &mut ScannerState) -> bool {
    let mut depth = 1u32;
    loop {
        let token = scanner.scan();
        match token {
            SyntaxKind::LessThanToken => depth += 1,
            SyntaxKind::GreaterThanToken => {
                depth -= 1;
                if depth == 0 {
                    let next = scanner.scan();
                    let same_line = !scanner.has_preceding_line_break();
                    return match next {
                        SyntaxKind::OpenParenToken | SyntaxKind::OpenBraceToken => same_line,
                        SyntaxKind::ColonColonToken | SyntaxKind::DotToken => true,
                        _ => false,
                    };
                }
            }
            SyntaxKind::Identifier
            | SyntaxKind::DotToken
            | SyntaxKind::CommaToken
            | SyntaxKind::QuestionToken
            | SyntaxKind::AsteriskToken
            | SyntaxKind::InKeyword
            | SyntaxKind::OpenParenToken
            | SyntaxKind::CloseParenToken
            | SyntaxKind::MinusGreaterThanToken
            | SyntaxKind::ColonToken => {}
            kind if kind.is_soft_keyword() => {}
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::base::NodeIndex;
    use crate::parser::state::parse_source;
    use crate::parser::syntax_kind_ext::*;
    use crate::printer::print;

    fn type_refs(source: &str) -> (crate::ParseResult, Vec<NodeIndex>) {
        let result = parse_source("t.kt", source);
        let refs = (0..result.arena.len() as u32)
            .map(NodeIndex)
            .filter(|&i| result.arena.kind(i) == TYPE_REFERENCE)
            .collect();
        (result, refs)
    }

    #[test]
    fn test_nullable_generic_type() {
        let (result, refs) = type_refs("val m: Map<String, List<Int?>>? = null\n");
        let arena = &result.arena;
        let outer = *refs.last().unwrap();
        let data = arena.get(outer).and_then(|n| arena.get_type_ref(n)).unwrap();
        assert!(data.is_nullable);
        assert_eq!(data.type_arguments.len(), 2);
        assert_eq!(arena.name_text(data.name), "Map");
    }

    #[test]
    fn test_qualified_type_is_access_chain() {
        let (result, refs) = type_refs("val p: java.util.regex.Pattern? = null\n");
        let arena = &result.arena;
        let data = arena
            .get(refs[0])
            .and_then(|n| arena.get_type_ref(n))
            .unwrap();
        assert_eq!(arena.kind(data.name), PROPERTY_ACCESS_EXPRESSION);
        assert_eq!(print(arena, data.name), " java.util.regex.Pattern");
    }

    #[test]
    fn test_function_types_round_trip() {
        let source = "val f: (Int, name: String) -> Unit = {}\nval g: String.() -> Int = { length }\nval h: suspend () -> Unit = {}\n";
        let (result, _) = type_refs(source);
        assert_eq!(print(&result.arena, result.root), source);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_generic_call_vs_comparison() {
        let source = "val a = listOf<String>()\nval b = x < y\n";
        let result = parse_source("t.kt", source);
        let arena = &result.arena;
        let calls = (0..arena.len() as u32)
            .map(NodeIndex)
            .filter(|&i| arena.kind(i) == CALL_EXPRESSION)
            .count();
        let binaries = (0..arena.len() as u32)
            .map(NodeIndex)
            .filter(|&i| arena.kind(i) == BINARY_EXPRESSION)
            .count();
        assert_eq!((calls, binaries), (1, 1));
    }
}

//! Parser state - blocks and statements.

use super::base::{NodeIndex, NodeList};
use super::node::*;
use super::state::ParserState;
use super::syntax_kind_ext::*;
use ktlst_scanner::SyntaxKind;

impl ParserState {
    pub(crate) fn parse_block(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        children.push(self.bump());
        let saved = self.no_trailing_lambda;
        self.no_trailing_lambda = false;
        let mut statements = NodeList::new();
        self.parse_statement_list(&mut children, &mut statements);
        self.eat(SyntaxKind::CloseBraceToken, &mut children);
        self.no_trailing_lambda = saved;
        self.arena
            .add_block(BLOCK, start, children, BlockData { statements })
    }

    /// Statements up to (not including) the closing `}`.
    pub(crate) fn parse_statement_list(
        &mut self,
        children: &mut NodeList,
        statements: &mut NodeList,
    ) {
        loop {
            match self.token() {
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::SemicolonToken => children.push(self.bump()),
                _ => {
                    let mut statement = self.parse_statement();
                    if statement.is_none() {
                        statement = self.parse_unknown();
                    }
                    statements.push(statement);
                    children.push(statement);
                }
            }
        }
    }

    pub(crate) fn parse_statement(&mut self) -> NodeIndex {
        if self.is_declaration_start() {
            return self.parse_declaration();
        }
        let start = self.token_pos();
        let target = self.parse_expression();
        if target.is_none() {
            return NodeIndex::NONE;
        }
        let operator = self.token();
        if !operator.is_assignment_operator() || self.has_line_break() {
            return target;
        }
        let operator_token = self.bump();
        let value = self.parse_expression();
        let children: NodeList = [target, operator_token, value].into_iter().collect();
        self.arena.add_assignment(
            ASSIGNMENT,
            start,
            children,
            AssignmentData {
                target,
                operator: operator as u16,
                value,
            },
        )
    }

    fn is_declaration_start(&mut self) -> bool {
        match self.token() {
            SyntaxKind::ClassKeyword
            | SyntaxKind::InterfaceKeyword
            | SyntaxKind::ValKeyword
            | SyntaxKind::VarKeyword
            | SyntaxKind::AtToken => true,
            // `fun(x: Int) = x` is an anonymous function expression
            SyntaxKind::FunKeyword => self.peek().0 != SyntaxKind::OpenParenToken,
            SyntaxKind::ObjectKeyword => {
                let (next, _) = self.peek();
                next == SyntaxKind::Identifier || next.is_soft_keyword()
            }
            _ => self.is_modifier_start(),
        }
    }

    /// Body of `if`/`else`: a block, or a single statement.
    pub(crate) fn parse_control_body(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_block()
        } else {
            self.parse_statement()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::state::parse_source;

    fn count(result: &crate::ParseResult, kind: u16) -> usize {
        (0..result.arena.len() as u32)
            .filter(|&i| result.arena.kind(NodeIndex(i)) == kind)
            .count()
    }

    #[test]
    fn test_assignment_statements() {
        let result = parse_source(
            "s.kt",
            "class A {\n    var id = 0\n    fun setId(id: Int) {\n        this.id = id\n        this.id += 1\n    }\n}\n",
        );
        assert_eq!(count(&result, ASSIGNMENT), 2);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_if_else_chain() {
        let result = parse_source(
            "s.kt",
            "fun f(x: Int): Int {\n    if (x > 0) {\n        return 1\n    }\n    else if (x < 0) return -1\n    else return 0\n}\n",
        );
        assert_eq!(count(&result, IF_EXPRESSION), 2);
        assert_eq!(count(&result, RETURN_STATEMENT), 3);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_local_declarations_in_block() {
        let result = parse_source(
            "s.kt",
            "fun f() {\n    val a = 1\n    class Local\n    fun g() = a\n}\n",
        );
        assert_eq!(count(&result, PROPERTY_DECLARATION), 1);
        assert_eq!(count(&result, FUNCTION_DECLARATION), 2);
        assert_eq!(count(&result, CLASS_DECLARATION), 1);
    }

    #[test]
    fn test_unsupported_statement_is_kept_verbatim() {
        let source = "fun f(x: Int) {\n    when (x) {\n        1 -> println(x)\n        else -> {}\n    }\n    println(x)\n}\n";
        let result = parse_source("s.kt", source);
        assert_eq!(crate::printer::print(&result.arena, result.root), source);
        assert_eq!(count(&result, UNKNOWN), 1);
        // The statement after the unknown one is parsed normally.
        assert_eq!(count(&result, CALL_EXPRESSION), 1);
    }
}

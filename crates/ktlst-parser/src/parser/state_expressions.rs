//! Parser state - expression parsing.
//!
//! Precedence, loosest first: `||`, `&&`, equality, comparison, `in`/`is`,
//! elvis `?:`, infix calls, ranges, additive, multiplicative, `as`, prefix
//! unary, postfix (member access, calls, `!!`, indexing, `::`).

use super::base::{NodeIndex, NodeList};
use super::node::*;
use super::state::ParserState;
use super::syntax_kind_ext::*;
use ktlst_scanner::SyntaxKind;

mod precedence {
    pub const DISJUNCTION: u8 = 1;
    pub const CONJUNCTION: u8 = 2;
    pub const EQUALITY: u8 = 3;
    pub const COMPARISON: u8 = 4;
    pub const NAMED_CHECK: u8 = 5;
    pub const ELVIS: u8 = 6;
    pub const INFIX: u8 = 7;
    pub const RANGE: u8 = 8;
    pub const ADDITIVE: u8 = 9;
    pub const MULTIPLICATIVE: u8 = 10;
}

fn binary_precedence(token: SyntaxKind) -> Option<u8> {
    use precedence::*;
    Some(match token {
        SyntaxKind::BarBarToken => DISJUNCTION,
        SyntaxKind::AmpersandAmpersandToken => CONJUNCTION,
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::EqualsEqualsEqualsToken
        | SyntaxKind::ExclamationEqualsEqualsToken => EQUALITY,
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken => COMPARISON,
        SyntaxKind::InKeyword
        | SyntaxKind::NotInKeyword
        | SyntaxKind::IsKeyword
        | SyntaxKind::NotIsKeyword => NAMED_CHECK,
        SyntaxKind::QuestionColonToken => ELVIS,
        SyntaxKind::Identifier => INFIX,
        SyntaxKind::DotDotToken | SyntaxKind::DotDotLessThanToken => RANGE,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => ADDITIVE,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => {
            MULTIPLICATIVE
        }
        _ => return None,
    })
}

/// Operators that may start a continuation line.
fn allows_line_break_before(token: SyntaxKind) -> bool {
    matches!(
        token,
        SyntaxKind::QuestionColonToken
            | SyntaxKind::AmpersandAmpersandToken
            | SyntaxKind::BarBarToken
    )
}

impl ParserState {
    /// Parse an expression, or return NONE if none starts here.
    pub(crate) fn parse_expression(&mut self) -> NodeIndex {
        if !self.enter() {
            return self.parse_unknown();
        }
        let result = self.parse_binary_expression(0);
        self.leave();
        result
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> NodeIndex {
        let start = self.token_pos();
        let mut left = self.parse_as_expression();
        if left.is_none() {
            return NodeIndex::NONE;
        }
        loop {
            let token = self.token();
            let Some(precedence) = binary_precedence(token) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            if self.has_line_break() && !allows_line_break_before(token) {
                break;
            }

            if token == SyntaxKind::IsKeyword || token == SyntaxKind::NotIsKeyword {
                let operator = self.bump();
                let type_ref = self.parse_type_reference();
                let children: NodeList = [left, operator, type_ref].into_iter().collect();
                left = self.arena.add_type_operation(
                    IS_EXPRESSION,
                    start,
                    children,
                    TypeOperationData {
                        expression: left,
                        operator: token as u16,
                        type_ref,
                    },
                );
                continue;
            }

            let operator_token = self.bump();
            let right = self.parse_binary_expression(precedence + 1);
            let kind = if token == SyntaxKind::QuestionColonToken {
                ELVIS_EXPRESSION
            } else {
                BINARY_EXPRESSION
            };
            let children: NodeList = [left, operator_token, right].into_iter().collect();
            left = self.arena.add_binary_expr(
                kind,
                start,
                children,
                BinaryExprData {
                    left,
                    operator: token as u16,
                    operator_token,
                    right,
                },
            );
        }
        left
    }

    fn parse_as_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut expression = self.parse_prefix_expression();
        while (self.is_token(SyntaxKind::AsKeyword) || self.is_token(SyntaxKind::AsSafeKeyword))
            && !self.has_line_break()
            && expression.is_some()
        {
            let operator = self.token();
            let operator_token = self.bump();
            let type_ref = self.parse_type_reference();
            let children: NodeList = [expression, operator_token, type_ref]
                .into_iter()
                .collect();
            expression = self.arena.add_type_operation(
                AS_EXPRESSION,
                start,
                children,
                TypeOperationData {
                    expression,
                    operator: operator as u16,
                    type_ref,
                },
            );
        }
        expression
    }

    fn parse_prefix_expression(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::MinusToken
            | SyntaxKind::PlusToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::ExclamationExclamationToken
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken => {
                if !self.enter() {
                    return self.parse_unknown();
                }
                let start = self.token_pos();
                let operator = self.token();
                let operator_token = self.bump();
                let operand = self.parse_prefix_expression();
                self.leave();
                let children: NodeList = [operator_token, operand].into_iter().collect();
                self.arena.add_unary_expr(
                    PREFIX_UNARY_EXPRESSION,
                    start,
                    children,
                    UnaryExprData {
                        operator: operator as u16,
                        operand,
                    },
                )
            }
            _ => self.parse_postfix_expression(),
        }
    }

    fn parse_postfix_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut expression = self.parse_primary_expression();
        if expression.is_none() {
            return NodeIndex::NONE;
        }
        loop {
            let same_line = !self.has_line_break();
            expression = match self.token() {
                SyntaxKind::DotToken | SyntaxKind::QuestionDotToken => {
                    self.parse_member_access(start, expression)
                }
                SyntaxKind::OpenParenToken if same_line => {
                    self.parse_call(start, expression, NodeIndex::NONE, NodeList::new())
                }
                SyntaxKind::LessThanToken if same_line && self.looks_like_type_arguments() => {
                    let (list, arguments) = self.parse_type_argument_list();
                    if self.is_token(SyntaxKind::OpenParenToken)
                        || self.is_token(SyntaxKind::OpenBraceToken)
                    {
                        self.parse_call(start, expression, list, arguments)
                    } else {
                        // `Foo<T>::bar` or `Foo<T>.Companion`
                        let children: NodeList = [expression, list].into_iter().collect();
                        self.arena.add_node(UNKNOWN, start, children)
                    }
                }
                SyntaxKind::OpenBraceToken
                    if same_line && !self.no_trailing_lambda && self.is_callee(expression) =>
                {
                    self.parse_call(start, expression, NodeIndex::NONE, NodeList::new())
                }
                SyntaxKind::OpenBracketToken if same_line => {
                    self.parse_indexing(start, expression)
                }
                SyntaxKind::ExclamationExclamationToken
                | SyntaxKind::PlusPlusToken
                | SyntaxKind::MinusMinusToken
                    if same_line =>
                {
                    let operator = self.token();
                    let operator_token = self.bump();
                    let children: NodeList = [expression, operator_token].into_iter().collect();
                    self.arena.add_unary_expr(
                        POSTFIX_UNARY_EXPRESSION,
                        start,
                        children,
                        UnaryExprData {
                            operator: operator as u16,
                            operand: expression,
                        },
                    )
                }
                SyntaxKind::ColonColonToken => self.parse_callable_reference(start, expression),
                _ => break,
            };
        }
        expression
    }

    fn is_callee(&self, expression: NodeIndex) -> bool {
        let kind = self.arena.kind(expression);
        kind == SyntaxKind::Identifier as u16 || kind == PROPERTY_ACCESS_EXPRESSION
    }

    /// `expression.name` / `expression?.name`.
    fn parse_member_access(&mut self, start: u32, expression: NodeIndex) -> NodeIndex {
        let question_dot_token = self.is_token(SyntaxKind::QuestionDotToken);
        let operator = self.bump();
        let name = self.bump_name();
        let children: NodeList = [expression, operator, name].into_iter().collect();
        let access = self.arena.add_access_expr(
            PROPERTY_ACCESS_EXPRESSION,
            start,
            children,
            AccessExprData {
                expression,
                operator,
                name,
                question_dot_token,
            },
        );
        if question_dot_token {
            self.arena.set_flags(access, node_flags::NULL_SAFE);
        }
        access
    }

    fn parse_call(
        &mut self,
        start: u32,
        callee: NodeIndex,
        type_argument_list: NodeIndex,
        type_arguments: NodeList,
    ) -> NodeIndex {
        let mut children = NodeList::new();
        children.push(callee);
        children.push(type_argument_list);
        let mut arguments = NodeList::new();
        let mut argument_list = NodeIndex::NONE;
        if self.is_token(SyntaxKind::OpenParenToken) {
            argument_list = self.parse_value_argument_list(&mut arguments);
            children.push(argument_list);
        }
        let mut trailing_lambda = NodeIndex::NONE;
        if self.is_token(SyntaxKind::OpenBraceToken)
            && !self.has_line_break()
            && !self.no_trailing_lambda
        {
            trailing_lambda = self.parse_lambda();
            children.push(trailing_lambda);
        }
        self.arena.add_call_expr(
            CALL_EXPRESSION,
            start,
            children,
            CallExprData {
                callee,
                type_arguments,
                argument_list,
                arguments,
                trailing_lambda,
            },
        )
    }

    /// `( argument, name = argument, *spread )`.
    pub(crate) fn parse_value_argument_list(&mut self, arguments: &mut NodeList) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        children.push(self.bump());
        let saved = self.no_trailing_lambda;
        self.no_trailing_lambda = false;
        loop {
            match self.token() {
                SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::CommaToken => children.push(self.bump()),
                SyntaxKind::CloseBraceToken | SyntaxKind::CloseBracketToken => {
                    children.push(self.parse_unknown_token())
                }
                _ => {
                    let argument = self.parse_value_argument();
                    if argument.is_none() {
                        children.push(self.parse_unknown_token());
                    } else {
                        arguments.push(argument);
                        children.push(argument);
                    }
                }
            }
        }
        self.no_trailing_lambda = saved;
        self.eat(SyntaxKind::CloseParenToken, &mut children);
        self.arena.add_node(VALUE_ARGUMENT_LIST, start, children)
    }

    fn parse_value_argument(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        let mut name = NodeIndex::NONE;
        if self.is_identifier() && self.peek().0 == SyntaxKind::EqualsToken {
            name = self.bump_name();
            children.push(name);
            children.push(self.bump());
        }
        let is_spread = self.eat(SyntaxKind::AsteriskToken, &mut children).is_some();
        let expression = self.parse_expression();
        if expression.is_none() && children.is_empty() {
            return NodeIndex::NONE;
        }
        children.push(expression);
        self.arena.add_value_argument(
            VALUE_ARGUMENT,
            start,
            children,
            ValueArgumentData {
                name,
                expression,
                is_spread,
            },
        )
    }

    fn parse_indexing(&mut self, start: u32, expression: NodeIndex) -> NodeIndex {
        let mut children = NodeList::new();
        children.push(expression);
        children.push(self.bump());
        loop {
            match self.token() {
                SyntaxKind::CloseBracketToken | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::CommaToken => children.push(self.bump()),
                _ => {
                    let index = self.parse_expression();
                    if index.is_none() {
                        children.push(self.parse_unknown_token());
                    } else {
                        children.push(index);
                    }
                }
            }
        }
        self.eat(SyntaxKind::CloseBracketToken, &mut children);
        self.arena.add_node(INDEXING_EXPRESSION, start, children)
    }

    /// `receiver::name`, `::name`, `Type::class`.
    fn parse_callable_reference(&mut self, start: u32, receiver: NodeIndex) -> NodeIndex {
        let mut children = NodeList::new();
        children.push(receiver);
        children.push(self.bump());
        let name = if self.is_token(SyntaxKind::ClassKeyword) {
            self.bump()
        } else {
            self.bump_name()
        };
        children.push(name);
        self.arena.add_callable_reference(
            CALLABLE_REFERENCE,
            start,
            children,
            CallableReferenceData { receiver, name },
        )
    }

    // =========================================================================
    // Primary Expressions
    // =========================================================================

    fn parse_primary_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::Identifier => self.bump(),
            token if token.is_soft_keyword() => self.bump_as(SyntaxKind::Identifier),
            SyntaxKind::NumericLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::CharacterLiteral
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NullKeyword => self.bump(),
            SyntaxKind::ThisKeyword => self.parse_this_expression(),
            SyntaxKind::SuperKeyword => self.parse_super_expression(),
            SyntaxKind::OpenParenToken => self.parse_parenthesized_expression(),
            SyntaxKind::OpenBraceToken => self.parse_lambda(),
            SyntaxKind::IfKeyword => self.parse_if_expression(),
            SyntaxKind::ReturnKeyword => self.parse_return_expression(),
            SyntaxKind::ThrowKeyword | SyntaxKind::BreakKeyword | SyntaxKind::ContinueKeyword => {
                self.parse_jump_expression()
            }
            SyntaxKind::ColonColonToken => self.parse_callable_reference(start, NodeIndex::NONE),
            SyntaxKind::ObjectKeyword => {
                self.parse_object_declaration(start, NodeList::new(), modifier_flags::NONE)
            }
            SyntaxKind::FunKeyword => self.parse_declaration(),
            SyntaxKind::WhenKeyword
            | SyntaxKind::TryKeyword
            | SyntaxKind::ForKeyword
            | SyntaxKind::WhileKeyword
            | SyntaxKind::DoKeyword => self.parse_unknown(),
            SyntaxKind::CloseBraceToken
            | SyntaxKind::CloseParenToken
            | SyntaxKind::CloseBracketToken
            | SyntaxKind::EndOfFileToken
            | SyntaxKind::SemicolonToken
            | SyntaxKind::CommaToken
            | SyntaxKind::MinusGreaterThanToken
            | SyntaxKind::ElseKeyword => NodeIndex::NONE,
            _ => self.parse_unknown_token(),
        }
    }

    /// `@Label` directly attached to `this`/`super`/`return`.
    fn parse_label_opt(&mut self, children: &mut NodeList) -> NodeIndex {
        if self.is_token(SyntaxKind::AtToken) && self.scanner.token_prefix().is_empty() {
            children.push(self.bump());
            let label = self.bump_name();
            children.push(label);
            label
        } else {
            NodeIndex::NONE
        }
    }

    fn parse_this_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        let keyword = self.bump();
        children.push(keyword);
        let label = self.parse_label_opt(&mut children);
        self.arena.add_self_reference(
            THIS_EXPRESSION,
            start,
            children,
            SelfReferenceData {
                keyword,
                label,
                super_type: NodeIndex::NONE,
            },
        )
    }

    /// `super`, `super<Type>`, `super@Label`.
    fn parse_super_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        let keyword = self.bump();
        children.push(keyword);
        let mut super_type = NodeIndex::NONE;
        if self.is_token(SyntaxKind::LessThanToken) && self.scanner.token_prefix().is_empty() {
            children.push(self.bump());
            super_type = self.parse_type_reference();
            children.push(super_type);
            self.eat(SyntaxKind::GreaterThanToken, &mut children);
        }
        let label = self.parse_label_opt(&mut children);
        self.arena.add_self_reference(
            SUPER_EXPRESSION,
            start,
            children,
            SelfReferenceData {
                keyword,
                label,
                super_type,
            },
        )
    }

    fn parse_parenthesized_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        children.push(self.bump());
        let saved = self.no_trailing_lambda;
        self.no_trailing_lambda = false;
        let expression = self.parse_expression();
        self.no_trailing_lambda = saved;
        children.push(expression);
        self.eat(SyntaxKind::CloseParenToken, &mut children);
        self.arena.add_parenthesized(
            PARENTHESIZED_EXPRESSION,
            start,
            children,
            ParenthesizedData { expression },
        )
    }

    /// `{ a, b: T -> statements }`.
    pub(crate) fn parse_lambda(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        children.push(self.bump());
        let saved = self.no_trailing_lambda;
        self.no_trailing_lambda = false;
        let mut parameters = NodeList::new();
        if self.has_lambda_parameters() {
            loop {
                match self.token() {
                    SyntaxKind::MinusGreaterThanToken | SyntaxKind::EndOfFileToken => break,
                    SyntaxKind::CommaToken => children.push(self.bump()),
                    _ => {
                        let parameter = self.parse_parameter();
                        if parameter.is_none() {
                            children.push(self.parse_unknown());
                        } else {
                            parameters.push(parameter);
                            children.push(parameter);
                        }
                    }
                }
            }
            self.eat(SyntaxKind::MinusGreaterThanToken, &mut children);
        }
        let mut statements = NodeList::new();
        self.parse_statement_list(&mut children, &mut statements);
        self.eat(SyntaxKind::CloseBraceToken, &mut children);
        self.no_trailing_lambda = saved;
        self.arena.add_lambda(
            LAMBDA_EXPRESSION,
            start,
            children,
            LambdaData {
                parameters,
                statements,
            },
        )
    }

    fn has_lambda_parameters(&mut self) -> bool {
        self.look_ahead(|scanner| {
            let mut depth = 0u32;
            loop {
                match scanner.scan() {
                    SyntaxKind::MinusGreaterThanToken => return depth == 0,
                    SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken => depth += 1,
                    SyntaxKind::CloseParenToken | SyntaxKind::GreaterThanToken => {
                        if depth == 0 {
                            return false;
                        }
                        depth -= 1;
                    }
                    SyntaxKind::Identifier
                    | SyntaxKind::CommaToken
                    | SyntaxKind::ColonToken
                    | SyntaxKind::DotToken
                    | SyntaxKind::QuestionToken => {}
                    kind if kind.is_soft_keyword() => {}
                    _ => return false,
                }
            }
        })
    }

    pub(crate) fn parse_if_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        children.push(self.bump());
        self.eat(SyntaxKind::OpenParenToken, &mut children);
        let saved = self.no_trailing_lambda;
        self.no_trailing_lambda = false;
        let condition = self.parse_expression();
        children.push(condition);
        self.eat(SyntaxKind::CloseParenToken, &mut children);
        let then_branch = self.parse_control_body();
        children.push(then_branch);
        let mut else_branch = NodeIndex::NONE;
        if self.is_token(SyntaxKind::SemicolonToken) && self.peek().0 == SyntaxKind::ElseKeyword {
            children.push(self.bump());
        }
        if self.is_token(SyntaxKind::ElseKeyword) {
            children.push(self.bump());
            else_branch = self.parse_control_body();
            children.push(else_branch);
        }
        self.no_trailing_lambda = saved;
        self.arena.add_if(
            IF_EXPRESSION,
            start,
            children,
            IfData {
                condition,
                then_branch,
                else_branch,
            },
        )
    }

    /// `return`, `return@label`, `return value`.
    fn parse_return_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        children.push(self.bump());
        self.parse_label_opt(&mut children);
        let mut expression = NodeIndex::NONE;
        if !self.has_line_break() {
            expression = self.parse_expression();
            children.push(expression);
        }
        self.arena
            .add_return(RETURN_STATEMENT, start, children, ReturnData { expression })
    }

    /// `throw value`, `break@label`, `continue`.
    fn parse_jump_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let is_throw = self.is_token(SyntaxKind::ThrowKeyword);
        let mut children = NodeList::new();
        children.push(self.bump());
        self.parse_label_opt(&mut children);
        if is_throw {
            children.push(self.parse_expression());
        }
        self.arena.add_node(JUMP_EXPRESSION, start, children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::state::parse_source;

    fn first_of_kind(source: &str, kind: u16) -> (crate::ParseResult, NodeIndex) {
        let result = parse_source("e.kt", source);
        let found = (0..result.arena.len() as u32)
            .map(NodeIndex)
            .rev()
            .find(|&i| result.arena.kind(i) == kind)
            .unwrap_or(NodeIndex::NONE);
        (result, found)
    }

    #[test]
    fn test_elvis_binds_looser_than_additive() {
        let (result, elvis) = first_of_kind("val x = a ?: b + 1\n", ELVIS_EXPRESSION);
        let arena = &result.arena;
        let data = arena.get(elvis).and_then(|n| arena.get_binary_expr(n)).unwrap();
        assert_eq!(arena.kind(data.right), BINARY_EXPRESSION);
    }

    #[test]
    fn test_null_safe_access_sets_flag() {
        let (result, access) = first_of_kind("val x = test?.property\n", PROPERTY_ACCESS_EXPRESSION);
        let arena = &result.arena;
        let node = arena.get(access).unwrap();
        assert_ne!(node.flags & node_flags::NULL_SAFE, 0);
        assert!(arena.get_access_expr(node).unwrap().question_dot_token);
    }

    #[test]
    fn test_this_with_label() {
        let (result, this) = first_of_kind("val x = this@Outer.id\n", THIS_EXPRESSION);
        let arena = &result.arena;
        let data = arena
            .get(this)
            .and_then(|n| arena.get_self_reference(n))
            .unwrap();
        assert_eq!(arena.name_text(data.label), "Outer");
    }

    #[test]
    fn test_super_with_type() {
        let (result, sup) = first_of_kind("fun f() = super<Base>.id\n", SUPER_EXPRESSION);
        let arena = &result.arena;
        let data = arena
            .get(sup)
            .and_then(|n| arena.get_self_reference(n))
            .unwrap();
        assert!(data.super_type.is_some());
    }

    #[test]
    fn test_call_with_trailing_lambda() {
        let (result, call) = first_of_kind("val x = list.map { it.size }\n", CALL_EXPRESSION);
        let arena = &result.arena;
        let data = arena.get(call).and_then(|n| arena.get_call_expr(n)).unwrap();
        assert!(data.argument_list.is_none());
        assert!(data.trailing_lambda.is_some());
        assert_eq!(arena.kind(data.callee), PROPERTY_ACCESS_EXPRESSION);
    }

    #[test]
    fn test_member_access_continues_on_next_line() {
        let (result, access) = first_of_kind("val x = a\n    .b\n    ?.c\n", PROPERTY_ACCESS_EXPRESSION);
        let arena = &result.arena;
        let data = arena.get(access).and_then(|n| arena.get_access_expr(n)).unwrap();
        assert_eq!(arena.name_text(data.name), "c");
    }

    #[test]
    fn test_binary_does_not_continue_on_next_line() {
        let result = parse_source("e.kt", "fun f() {\n    val a = b\n    -c\n}\n");
        let arena = &result.arena;
        let unary = (0..arena.len() as u32)
            .map(NodeIndex)
            .filter(|&i| arena.kind(i) == PREFIX_UNARY_EXPRESSION)
            .count();
        assert_eq!(unary, 1);
    }

    #[test]
    fn test_as_and_is() {
        let (result, is) = first_of_kind("val x = y as? String is String\n", IS_EXPRESSION);
        let arena = &result.arena;
        let data = arena
            .get(is)
            .and_then(|n| arena.get_type_operation(n))
            .unwrap();
        assert_eq!(arena.kind(data.expression), AS_EXPRESSION);
    }
}

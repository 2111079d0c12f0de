//! Expression types.
//!
//! `get_type_of_node` is the single entry point: it guards nesting depth,
//! dispatches on the node kind and records the computed type. Unresolvable
//! expressions get `Type::Unknown`, never an error.

use crate::member_lookup::LookupKind;
use crate::state::CheckerState;
use crate::state_declarations::Owner;
use ktlst_binder::literal_type;
use ktlst_parser::NodeIndex;
use ktlst_parser::syntax_kind_ext::*;
use ktlst_scanner::SyntaxKind;
use ktlst_types::types::{BOOLEAN, UNIT};
use ktlst_types::{Type, least_upper_bound};

impl<'a> CheckerState<'a> {
    /// Compute, record and return the type of an expression node.
    pub(crate) fn get_type_of_node(&mut self, idx: NodeIndex) -> Type {
        if idx.is_none() {
            return Type::Unknown;
        }
        if !self.enter_expression() {
            return Type::Unknown;
        }
        let ty = self.compute_type_of_node(idx);
        self.leave_expression();
        self.ctx.record_type(idx, &ty);
        ty
    }

    fn compute_type_of_node(&mut self, idx: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let Some(node) = arena.get(idx) else {
            return Type::Unknown;
        };
        if node.is_token() {
            if let Some(ty) = literal_type(arena, idx) {
                return ty;
            }
            if node.kind == SyntaxKind::Identifier as u16 {
                let qualifier = self.resolve_simple_name(idx);
                return self.qualifier_value_type(&qualifier);
            }
            return Type::Unknown;
        }

        match node.kind {
            PROPERTY_ACCESS_EXPRESSION => {
                let qualifier = self.get_qualifier_of_access(idx, LookupKind::Property);
                self.qualifier_value_type(&qualifier)
            }
            CALL_EXPRESSION => self.get_type_of_call(idx),
            THIS_EXPRESSION => self.get_type_of_this(idx).unwrap_or_default(),
            SUPER_EXPRESSION => self.get_super_type(idx).unwrap_or_default(),
            PARENTHESIZED_EXPRESSION => match arena.get_parenthesized(node) {
                Some(data) => self.get_type_of_node(data.expression),
                None => Type::Unknown,
            },
            BINARY_EXPRESSION => self.get_type_of_binary(idx),
            ELVIS_EXPRESSION => self.get_type_of_elvis(idx),
            PREFIX_UNARY_EXPRESSION | POSTFIX_UNARY_EXPRESSION => self.get_type_of_unary(idx),
            AS_EXPRESSION | IS_EXPRESSION => self.get_type_of_type_operation(idx),
            LAMBDA_EXPRESSION => self.get_type_of_lambda(idx),
            IF_EXPRESSION => self.get_type_of_if(idx),
            RETURN_STATEMENT => {
                if let Some(data) = arena.get_return(node) {
                    self.get_type_of_node(data.expression);
                }
                Type::Nothing { nullable: false }
            }
            JUMP_EXPRESSION => self.get_type_of_jump(idx),
            BLOCK => self.get_type_of_block(idx),
            ASSIGNMENT => {
                self.check_assignment(idx);
                Type::class(UNIT)
            }
            INDEXING_EXPRESSION => self.get_type_of_indexing(idx),
            CALLABLE_REFERENCE => self.get_type_of_callable_reference(idx),
            CLASS_DECLARATION | OBJECT_DECLARATION => self.check_class(idx),
            FUNCTION_DECLARATION => {
                self.check_function(idx, &Owner::Local);
                Type::Unknown
            }
            PROPERTY_DECLARATION => {
                self.check_property(idx, &Owner::Local);
                Type::class(UNIT)
            }
            UNKNOWN => {
                self.check_unknown(idx);
                Type::Unknown
            }
            _ => Type::Unknown,
        }
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn get_type_of_binary(&mut self, idx: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_binary_expr(n)) else {
            return Type::Unknown;
        };
        let Some(operator) = SyntaxKind::from_u16(data.operator) else {
            return Type::Unknown;
        };
        match operator {
            SyntaxKind::Identifier => {
                self.get_type_of_infix_call(data.left, data.operator_token, data.right)
            }
            SyntaxKind::EqualsEqualsToken
            | SyntaxKind::EqualsEqualsEqualsToken
            | SyntaxKind::ExclamationEqualsToken
            | SyntaxKind::ExclamationEqualsEqualsToken
            | SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::LessThanEqualsToken
            | SyntaxKind::GreaterThanEqualsToken
            | SyntaxKind::AmpersandAmpersandToken
            | SyntaxKind::BarBarToken
            | SyntaxKind::InKeyword
            | SyntaxKind::NotInKeyword => {
                self.get_type_of_node(data.left);
                self.get_type_of_node(data.right);
                Type::class(BOOLEAN)
            }
            _ => self.get_type_of_operator_call(data.operator, data.left, data.right),
        }
    }

    /// `a ?: b`: the non-null left type joined with the right type.
    fn get_type_of_elvis(&mut self, idx: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_binary_expr(n)) else {
            return Type::Unknown;
        };
        let left = self.get_type_of_node(data.left);
        let right = self.get_type_of_node(data.right);
        least_upper_bound(self.ctx.env, &left.make_not_null(), &right)
    }

    fn get_type_of_unary(&mut self, idx: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let Some(node) = arena.get(idx) else {
            return Type::Unknown;
        };
        let Some(data) = arena.get_unary_expr(node) else {
            return Type::Unknown;
        };
        let operand = self.get_type_of_node(data.operand);
        match SyntaxKind::from_u16(data.operator) {
            Some(SyntaxKind::ExclamationToken) => Type::class(BOOLEAN),
            Some(SyntaxKind::ExclamationExclamationToken) => operand.make_not_null(),
            _ => operand,
        }
    }

    /// `a as T`, `a as? T`, `a is T`, `a !is T`.
    fn get_type_of_type_operation(&mut self, idx: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_type_operation(n)) else {
            return Type::Unknown;
        };
        self.get_type_of_node(data.expression);
        let target = self.attribute_type_ref(data.type_ref);
        match SyntaxKind::from_u16(data.operator) {
            Some(SyntaxKind::IsKeyword | SyntaxKind::NotIsKeyword) => Type::class(BOOLEAN),
            Some(SyntaxKind::AsSafeKeyword) => target.make_nullable(),
            _ => target,
        }
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    /// `if` as an expression: the least upper bound of both branches, or
    /// `Unit` without an `else`.
    fn get_type_of_if(&mut self, idx: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_if(n)) else {
            return Type::Unknown;
        };
        self.get_type_of_node(data.condition);
        let then_type = self.check_branch(data.then_branch);
        if data.else_branch.is_none() {
            return Type::class(UNIT);
        }
        let else_type = self.check_branch(data.else_branch);
        least_upper_bound(self.ctx.env, &then_type, &else_type)
    }

    fn check_branch(&mut self, branch: NodeIndex) -> Type {
        self.push_scope();
        let ty = self.check_statement(branch);
        self.pop_scope();
        ty
    }

    /// `throw e`, `break`, `continue`: only a thrown value is an expression.
    fn get_type_of_jump(&mut self, idx: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let children = arena.children_of(idx);
        let is_throw = children
            .first()
            .is_some_and(|&keyword| arena.kind(keyword) == SyntaxKind::ThrowKeyword as u16);
        if is_throw && let Some(&value) = children.last() {
            self.get_type_of_node(value);
        }
        Type::Nothing { nullable: false }
    }

    /// Lambdas get their own scope; parameters without a declared type, and
    /// the implicit `it`, are unknown.
    fn get_type_of_lambda(&mut self, idx: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_lambda(n)) else {
            return Type::Unknown;
        };
        self.push_scope();
        if data.parameters.is_empty() {
            self.declare_local("it", Type::Unknown);
        }
        for parameter in &data.parameters {
            self.check_parameter(parameter);
        }
        for statement in &data.statements {
            if self.is_cancelled() {
                break;
            }
            self.check_statement(statement);
        }
        self.pop_scope();
        Type::Unknown
    }
}

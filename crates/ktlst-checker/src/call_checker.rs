//! Calls: `f(x)`, `a.f(x)`, `a?.f(x)`, constructor calls, infix calls and
//! operator conventions (`a + b`, `a[i]`).

use crate::access::AccessKind;
use crate::member_lookup::LookupKind;
use crate::qualified_names::{Qualifier, RecordAs, Resolution};
use crate::state::CheckerState;
use ktlst_parser::NodeIndex;
use ktlst_parser::syntax_kind_ext::{PROPERTY_ACCESS_EXPRESSION, VALUE_ARGUMENT};
use ktlst_scanner::SyntaxKind;
use ktlst_types::Type;
use tracing::trace;

/// Member name behind a binary operator token, per Kotlin operator
/// conventions.
pub(crate) fn operator_method_name(operator: u16) -> Option<&'static str> {
    let name = match SyntaxKind::from_u16(operator)? {
        SyntaxKind::PlusToken => "plus",
        SyntaxKind::MinusToken => "minus",
        SyntaxKind::AsteriskToken => "times",
        SyntaxKind::SlashToken => "div",
        SyntaxKind::PercentToken => "rem",
        SyntaxKind::DotDotToken => "rangeTo",
        SyntaxKind::DotDotLessThanToken => "rangeUntil",
        _ => return None,
    };
    Some(name)
}

impl<'a> CheckerState<'a> {
    /// Type of a `CALL_EXPRESSION`: the callee is resolved with the call's
    /// arity, then the arguments and trailing lambda are attributed.
    pub(crate) fn get_type_of_call(&mut self, idx: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_call_expr(n)) else {
            return Type::Unknown;
        };
        let argc = data.arguments.len() + usize::from(data.trailing_lambda.is_some());
        let lookup = LookupKind::Call(argc);

        let callee = data.callee;
        let callee_kind = arena.kind(callee);
        let ty = if callee_kind == SyntaxKind::Identifier as u16 {
            let name = arena.name_text(callee);
            let resolution = self.resolve_name(name, lookup);
            let qualifier =
                self.record_resolution(callee, callee, AccessKind::Plain, resolution, RecordAs::Reference);
            self.qualifier_value_type(&qualifier)
        } else if callee_kind == PROPERTY_ACCESS_EXPRESSION {
            let qualifier = self.get_qualifier_of_access(callee, lookup);
            self.qualifier_value_type(&qualifier)
        } else {
            // `this(...)`, `super(...)`, invoking a lambda value.
            self.get_type_of_node(callee);
            trace!(file = self.ctx.file_name, "callee left unresolved");
            Type::Unknown
        };

        for argument in &data.arguments {
            self.get_type_of_value_argument(argument);
        }
        if data.trailing_lambda.is_some() {
            self.get_type_of_node(data.trailing_lambda);
        }
        ty
    }

    pub(crate) fn get_type_of_value_argument(&mut self, argument: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        if arena.kind(argument) != VALUE_ARGUMENT {
            return self.get_type_of_node(argument);
        }
        let Some(data) = arena.get(argument).and_then(|n| arena.get_value_argument(n)) else {
            return Type::Unknown;
        };
        let ty = self.get_type_of_node(data.expression);
        self.ctx.record_type(argument, &ty);
        ty
    }

    /// `a name b`: a one-argument member or extension call on `a`. The
    /// operator name is recorded as a reference.
    pub(crate) fn get_type_of_infix_call(
        &mut self,
        left: NodeIndex,
        name_token: NodeIndex,
        right: NodeIndex,
    ) -> Type {
        let receiver = self.get_type_of_node(left);
        let name = self.ctx.arena.name_text(name_token);
        let resolution = self.resolve_member_of(&Qualifier::Value(receiver), name, LookupKind::Call(1));
        let qualifier =
            self.record_resolution(name_token, name_token, AccessKind::Plain, resolution, RecordAs::Reference);
        self.get_type_of_node(right);
        self.qualifier_value_type(&qualifier)
    }

    /// Arithmetic and range operators: the conventional member on the left
    /// operand, when the environment declares it.
    pub(crate) fn get_type_of_operator_call(
        &mut self,
        operator: u16,
        left: NodeIndex,
        right: NodeIndex,
    ) -> Type {
        let receiver = self.get_type_of_node(left);
        self.get_type_of_node(right);
        let Some(method) = operator_method_name(operator) else {
            return Type::Unknown;
        };
        match self.lookup_instance_member(&receiver, method, LookupKind::Call(1)) {
            Some(member) => self.resolve_member_type(&member).0,
            None => Type::Unknown,
        }
    }

    /// `receiver[i, j]`: the receiver's `get` with one argument per index.
    pub(crate) fn get_type_of_indexing(&mut self, idx: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let Some((&receiver, indices)) = arena.children_of(idx).split_first() else {
            return Type::Unknown;
        };
        let receiver_type = self.get_type_of_node(receiver);
        let mut count = 0;
        for &index in indices {
            let kind = arena.kind(index);
            if index.is_none()
                || kind == SyntaxKind::OpenBracketToken as u16
                || kind == SyntaxKind::CloseBracketToken as u16
                || kind == SyntaxKind::CommaToken as u16
            {
                continue;
            }
            self.get_type_of_node(index);
            count += 1;
        }
        match self.lookup_instance_member(&receiver_type, "get", LookupKind::Call(count)) {
            Some(member) => self.resolve_member_type(&member).0,
            None => Type::Unknown,
        }
    }

    /// `receiver::name`: the receiver is attributed and the name resolved when
    /// the receiver declares it. `::class` and unresolvable names are not
    /// reported.
    pub(crate) fn get_type_of_callable_reference(&mut self, idx: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_callable_reference(n)) else {
            return Type::Unknown;
        };
        if data.receiver.is_none() || arena.kind(data.name) != SyntaxKind::Identifier as u16 {
            return Type::Unknown;
        }
        let qualifier = self.get_qualifier(data.receiver);
        let name = arena.name_text(data.name);
        let resolution = match self.resolve_member_of(&qualifier, name, LookupKind::Any) {
            found @ Resolution::Member(_) => found,
            _ => return Type::Unknown,
        };
        self.record_resolution(data.name, data.name, AccessKind::Plain, resolution, RecordAs::Reference);
        Type::Unknown
    }
}

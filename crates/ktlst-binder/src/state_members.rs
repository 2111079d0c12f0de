//! Binder pass 3: member and top-level declarations.

use crate::scope::{TypeNameContext, chain_segments};
use crate::state::{BinderState, class_members, type_parameter_names};
use ktlst_parser::parser::node::{NodeArena, modifier_flags};
use ktlst_parser::syntax_kind_ext::*;
use ktlst_parser::NodeIndex;
use ktlst_scanner::SyntaxKind;
use ktlst_types::types::{BOOLEAN, CHAR, DOUBLE, FLOAT, INT, LONG, STRING, UNIT};
use ktlst_types::{EnvironmentBuilder, EnvironmentError, Member, MemberKind, Origin, Type};
use std::sync::Arc;
use tracing::trace;

/// Name of constructor members.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Type of a literal leaf, if `index` is one.
pub fn literal_type(arena: &NodeArena, index: NodeIndex) -> Option<Type> {
    let kind = SyntaxKind::from_u16(arena.kind(index))?;
    let ty = match kind {
        SyntaxKind::NumericLiteral => Type::class(numeric_literal_type(arena.token_text(index))),
        SyntaxKind::StringLiteral => Type::class(STRING),
        SyntaxKind::CharacterLiteral => Type::class(CHAR),
        SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => Type::class(BOOLEAN),
        SyntaxKind::NullKeyword => Type::NULL,
        _ => return None,
    };
    Some(ty)
}

fn numeric_literal_type(text: &str) -> &'static str {
    let lower = text.to_ascii_lowercase();
    let is_radix = lower.starts_with("0x") || lower.starts_with("0b");
    if lower.ends_with('l') {
        LONG
    } else if !is_radix && lower.ends_with('f') {
        FLOAT
    } else if !is_radix && (lower.contains('.') || lower.contains('e')) {
        DOUBLE
    } else {
        INT
    }
}

impl BinderState<'_> {
    pub fn declare_members(&mut self, builder: &mut EnvironmentBuilder) -> Result<(), EnvironmentError> {
        let arena = self.arena;
        let facade = self.unit.facade.clone();
        let package = self.unit.scope.package.clone();
        let mut enclosing = Vec::new();
        for declaration in &self.top_level_declarations() {
            match arena.kind(declaration) {
                CLASS_DECLARATION | OBJECT_DECLARATION => {
                    self.declare_class_members(builder, declaration, &mut enclosing)?;
                }
                PROPERTY_DECLARATION | FUNCTION_DECLARATION => {
                    if let Some(member) = self.member_of(builder, declaration, &facade, &[], &[]) {
                        trace!(name = %member.name, owner = %facade, "declare top-level");
                        builder.add_top_level(&package, member, Origin::Source);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn declare_class_members(
        &self,
        builder: &mut EnvironmentBuilder,
        index: NodeIndex,
        enclosing: &mut Vec<Arc<str>>,
    ) -> Result<(), EnvironmentError> {
        let arena = self.arena;
        let Some(fqn) = self.unit.class_names.get(&index).cloned() else {
            return Ok(());
        };
        let Some(data) = arena.get(index).and_then(|n| arena.get_class(n)) else {
            return Ok(());
        };
        let type_parameters = type_parameter_names(arena, data.type_parameters);
        enclosing.push(fqn.clone());

        if let Some(constructor) = arena
            .get(data.primary_constructor)
            .and_then(|n| arena.get_primary_constructor(n))
        {
            let mut parameter_types = Vec::new();
            let mut fields = Vec::new();
            for parameter in &constructor.parameters {
                let Some(p) = arena.get(parameter).and_then(|n| arena.get_parameter(n)) else {
                    continue;
                };
                let ty = self.resolve_type(builder, p.type_ref, enclosing, &type_parameters);
                if p.binding_keyword.is_some() && p.name.is_some() {
                    fields.push(Member::field(arena.name_text(p.name), ty.clone(), &fqn));
                }
                parameter_types.push(ty);
            }
            let mut init = Member::method(CONSTRUCTOR_NAME, parameter_types, Type::class(&fqn), &fqn);
            init.kind = MemberKind::Constructor;
            builder.add_member(&fqn, init)?;
            for field in fields {
                builder.add_member(&fqn, field)?;
            }
        }

        for member in &class_members(arena, data.body) {
            match arena.kind(member) {
                CLASS_DECLARATION | OBJECT_DECLARATION => {
                    self.declare_class_members(builder, member, enclosing)?;
                }
                PROPERTY_DECLARATION | FUNCTION_DECLARATION | SECONDARY_CONSTRUCTOR => {
                    if let Some(declared) =
                        self.member_of(builder, member, &fqn, enclosing, &type_parameters)
                    {
                        // Member extensions are only callable with two receivers.
                        if declared.receiver.is_none() {
                            builder.add_member(&fqn, declared)?;
                        }
                    }
                }
                _ => {}
            }
        }
        enclosing.pop();
        Ok(())
    }

    fn resolve_type(
        &self,
        builder: &EnvironmentBuilder,
        type_ref: NodeIndex,
        enclosing: &[Arc<str>],
        type_parameters: &[Arc<str>],
    ) -> Type {
        if type_ref.is_none() {
            return Type::Unknown;
        }
        let exists = |fqn: &str| builder.contains_class(fqn);
        self.unit.scope.resolve_type_ref(
            self.arena,
            type_ref,
            TypeNameContext {
                enclosing,
                type_parameters,
            },
            &exists,
        )
    }

    /// Signature of a property, function or secondary constructor.
    fn member_of(
        &self,
        builder: &EnvironmentBuilder,
        index: NodeIndex,
        owner: &str,
        enclosing: &[Arc<str>],
        outer_type_parameters: &[Arc<str>],
    ) -> Option<Member> {
        let arena = self.arena;
        let node = arena.get(index)?;
        match node.kind {
            PROPERTY_DECLARATION => {
                let data = arena.get_property(node)?;
                if data.name.is_none() {
                    return None;
                }
                let ty = if data.type_ref.is_some() {
                    self.resolve_type(builder, data.type_ref, enclosing, outer_type_parameters)
                } else {
                    self.infer_initializer(builder, data.initializer, enclosing)
                };
                let mut member = Member::field(arena.name_text(data.name), ty, owner);
                if data.receiver_type.is_some() {
                    member.receiver = Some(self.resolve_type(
                        builder,
                        data.receiver_type,
                        enclosing,
                        outer_type_parameters,
                    ));
                }
                Some(member)
            }
            FUNCTION_DECLARATION | SECONDARY_CONSTRUCTOR => {
                let data = arena.get_function(node)?;
                let mut type_parameters = outer_type_parameters.to_vec();
                type_parameters.extend(type_parameter_names(arena, data.type_parameters));
                let mut parameters = Vec::new();
                let mut is_vararg = false;
                for parameter in &data.parameters {
                    let Some(p) = arena.get(parameter).and_then(|n| arena.get_parameter(n)) else {
                        continue;
                    };
                    is_vararg |= p.modifiers & modifier_flags::VARARG != 0;
                    parameters.push(self.resolve_type(builder, p.type_ref, enclosing, &type_parameters));
                }
                if node.kind == SECONDARY_CONSTRUCTOR {
                    let mut init =
                        Member::method(CONSTRUCTOR_NAME, parameters, Type::class(owner), owner);
                    init.kind = MemberKind::Constructor;
                    return Some(init);
                }
                if data.name.is_none() {
                    return None;
                }
                let return_type = if data.return_type.is_some() {
                    self.resolve_type(builder, data.return_type, enclosing, &type_parameters)
                } else if data.is_expression_body {
                    self.infer_initializer(builder, data.body, enclosing)
                } else {
                    Type::class(UNIT)
                };
                let mut member =
                    Member::method(arena.name_text(data.name), parameters, return_type, owner);
                member.is_vararg = is_vararg;
                if data.receiver_type.is_some() {
                    member.receiver = Some(self.resolve_type(
                        builder,
                        data.receiver_type,
                        enclosing,
                        &type_parameters,
                    ));
                }
                Some(member)
            }
            _ => None,
        }
    }

    /// Declared type of an unannotated property or expression-bodied
    /// function: literals, constructor calls and their obvious compositions.
    /// Everything else stays unknown until attribution.
    fn infer_initializer(
        &self,
        builder: &EnvironmentBuilder,
        expression: NodeIndex,
        enclosing: &[Arc<str>],
    ) -> Type {
        let arena = self.arena;
        if let Some(ty) = literal_type(arena, expression) {
            return ty;
        }
        let Some(node) = arena.get(expression) else {
            return Type::Unknown;
        };
        match node.kind {
            PARENTHESIZED_EXPRESSION => arena
                .get_parenthesized(node)
                .map_or(Type::Unknown, |p| self.infer_initializer(builder, p.expression, enclosing)),
            PREFIX_UNARY_EXPRESSION => match arena.get_unary_expr(node) {
                Some(unary) if unary.operator == SyntaxKind::ExclamationToken as u16 => {
                    Type::class(BOOLEAN)
                }
                Some(unary) => self.infer_initializer(builder, unary.operand, enclosing),
                None => Type::Unknown,
            },
            IS_EXPRESSION => Type::class(BOOLEAN),
            BINARY_EXPRESSION => match arena.get_binary_expr(node).map(|b| b.operator) {
                Some(op)
                    if [
                        SyntaxKind::EqualsEqualsToken,
                        SyntaxKind::ExclamationEqualsToken,
                        SyntaxKind::EqualsEqualsEqualsToken,
                        SyntaxKind::ExclamationEqualsEqualsToken,
                        SyntaxKind::LessThanToken,
                        SyntaxKind::GreaterThanToken,
                        SyntaxKind::LessThanEqualsToken,
                        SyntaxKind::GreaterThanEqualsToken,
                        SyntaxKind::AmpersandAmpersandToken,
                        SyntaxKind::BarBarToken,
                    ]
                    .iter()
                    .any(|k| *k as u16 == op) =>
                {
                    Type::class(BOOLEAN)
                }
                _ => Type::Unknown,
            },
            CALL_EXPRESSION => {
                let Some(call) = arena.get_call_expr(node) else {
                    return Type::Unknown;
                };
                let Some(segments) = chain_segments(arena, call.callee) else {
                    return Type::Unknown;
                };
                let exists = |fqn: &str| builder.contains_class(fqn);
                self.unit
                    .scope
                    .resolve_class_name(&segments, enclosing, &exists)
                    .map_or(Type::Unknown, |fqn| Type::class(&fqn))
            }
            _ => Type::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktlst_parser::parse_source;

    fn first_literal(source: &str) -> Option<Type> {
        let result = parse_source("l.kt", source);
        let arena = &result.arena;
        (0..arena.len() as u32)
            .map(NodeIndex)
            .find_map(|i| literal_type(arena, i))
    }

    #[test]
    fn test_literal_types() {
        assert_eq!(first_literal("val a = 42"), Some(Type::class(INT)));
        assert_eq!(first_literal("val a = 42L"), Some(Type::class(LONG)));
        assert_eq!(first_literal("val a = 0xFF"), Some(Type::class(INT)));
        assert_eq!(first_literal("val a = 1.5"), Some(Type::class(DOUBLE)));
        assert_eq!(first_literal("val a = 1.5f"), Some(Type::class(FLOAT)));
        assert_eq!(first_literal("val a = 1e3"), Some(Type::class(DOUBLE)));
        assert_eq!(first_literal("val a = \"s\""), Some(Type::class(STRING)));
        assert_eq!(first_literal("val a = 'c'"), Some(Type::class(CHAR)));
        assert_eq!(first_literal("val a = true"), Some(Type::class(BOOLEAN)));
        assert_eq!(first_literal("val a = null"), Some(Type::NULL));
    }
}

//! Member access expressions: `a.b`, `a?.b`, `this.b`, `super.b`, and the
//! `this`/`super` receivers themselves.

use crate::access::{AccessKind, classify};
use crate::error::ResolutionError;
use crate::member_lookup::LookupKind;
use crate::qualified_names::{Qualifier, RecordAs, Resolution};
use crate::state::{CheckerState, Frame};
use ktlst_parser::NodeIndex;
use ktlst_types::Type;

impl<'a> CheckerState<'a> {
    /// Attribute a `PROPERTY_ACCESS_EXPRESSION` used as a property (or, with
    /// `LookupKind::Call`, as a callee) and record its `AccessInfo`.
    pub(crate) fn get_qualifier_of_access(&mut self, idx: NodeIndex, lookup: LookupKind) -> Qualifier {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_access_expr(n)) else {
            return Qualifier::Value(Type::Unknown);
        };
        let access_kind = classify(arena, idx);
        let name = arena.name_text(data.name);

        let resolution = match access_kind {
            AccessKind::This => {
                let receiver = self.get_type_of_this(data.expression);
                self.resolve_on_receiver(receiver, name, lookup)
            }
            AccessKind::Super => self.resolve_super_access(data.expression, name, lookup),
            AccessKind::Plain | AccessKind::NullSafe => {
                let qualifier = self.get_qualifier(data.expression);
                if name.is_empty() {
                    Resolution::Indeterminate
                } else {
                    self.resolve_member_of(&qualifier, name, lookup)
                }
            }
        };
        self.record_resolution(idx, data.name, access_kind, resolution, RecordAs::Access)
    }

    fn resolve_on_receiver(&self, receiver: Option<Type>, name: &str, lookup: LookupKind) -> Resolution {
        match receiver {
            Some(ty) if !name.is_empty() => self.resolve_member_of(&Qualifier::Value(ty), name, lookup),
            _ => Resolution::Indeterminate,
        }
    }

    /// `super.name`: only the superclass and its own supertypes are searched.
    fn resolve_super_access(&mut self, super_idx: NodeIndex, name: &str, lookup: LookupKind) -> Resolution {
        let Some(super_type) = self.get_super_type(super_idx) else {
            return Resolution::Indeterminate;
        };
        if super_type.is_unknown() || name.is_empty() {
            return Resolution::Indeterminate;
        }
        match self.lookup_super_member(&super_type, name, lookup) {
            Some(member) => Resolution::Member(member),
            None => Resolution::Unresolved(ResolutionError::UnsupportedSuperMember {
                name: name.to_string(),
                superclass: super_type.to_string(),
            }),
        }
    }

    // =========================================================================
    // Receivers
    // =========================================================================

    /// Frame named by `this@label`, or the innermost one.
    fn find_frame(&self, label: Option<&str>, class_only: bool) -> Option<&Frame> {
        self.frames.iter().rev().find(|frame| {
            (!class_only || frame.is_class)
                && label.is_none_or(|label| frame.label.as_deref() == Some(label))
        })
    }

    /// Type of a `this` expression; reports when no receiver is in scope.
    pub(crate) fn get_type_of_this(&mut self, idx: NodeIndex) -> Option<Type> {
        let arena = self.ctx.arena;
        let label = arena
            .get(idx)
            .and_then(|n| arena.get_self_reference(n))
            .map(|data| data.label)
            .filter(|label| label.is_some())
            .map(|label| arena.name_text(label));

        let Some(ty) = self.find_frame(label, false).map(|frame| frame.ty.clone()) else {
            let error = match label {
                Some(label) => ResolutionError::UnresolvedReference {
                    name: format!("this@{label}"),
                },
                None => ResolutionError::NoEnclosingClass { keyword: "this" },
            };
            self.ctx.report(idx, error);
            self.ctx.record_type(idx, &Type::Unknown);
            return None;
        };
        self.ctx.record_type(idx, &ty);
        Some(ty)
    }

    /// Target type of a `super` expression: the `super<T>` type when given,
    /// else the enclosing class's superclass.
    pub(crate) fn get_super_type(&mut self, idx: NodeIndex) -> Option<Type> {
        let arena = self.ctx.arena;
        let data = arena.get(idx).and_then(|n| arena.get_self_reference(n));
        let label = data
            .map(|data| data.label)
            .filter(|label| label.is_some())
            .map(|label| arena.name_text(label));

        let Some(superclass) = self
            .find_frame(label, true)
            .map(|frame| frame.superclass.clone())
        else {
            let error = match label {
                Some(label) => ResolutionError::UnresolvedReference {
                    name: format!("super@{label}"),
                },
                None => ResolutionError::NoEnclosingClass { keyword: "super" },
            };
            self.ctx.report(idx, error);
            self.ctx.record_type(idx, &Type::Unknown);
            return None;
        };
        let ty = match data.map(|data| data.super_type) {
            Some(super_type) if super_type.is_some() => self.attribute_type_ref(super_type),
            _ => superclass,
        };
        self.ctx.record_type(idx, &ty);
        Some(ty)
    }
}

//! Declarations and statements.
//!
//! Walks a source file top-down: imports, classes with their constructors
//! and members, functions, properties and statement blocks. Every
//! declaration and statement is a cancellation point.

use crate::attributed::{VariableInfo, VariableKind};
use crate::error::AttributionError;
use crate::state::{CheckerState, Frame};
use ktlst_binder::type_parameter_names;
use ktlst_parser::NodeIndex;
use ktlst_parser::parser::node::modifier_flags;
use ktlst_parser::syntax_kind_ext::*;
use ktlst_scanner::SyntaxKind;
use ktlst_types::types::{ANY, UNIT};
use ktlst_types::{ClassKind, Type};
use std::sync::Arc;
use tracing::{debug, trace};

/// Where a declaration lives; decides how its properties and functions are
/// recorded.
#[derive(Clone, Debug)]
pub(crate) enum Owner {
    /// A bound class, object or file facade.
    Named(Arc<str>),
    /// A function body or block.
    Local,
    /// A local class or object expression, unknown to the environment.
    Anonymous,
}

impl Owner {
    fn name(&self) -> Option<Arc<str>> {
        match self {
            Owner::Named(name) => Some(name.clone()),
            Owner::Local | Owner::Anonymous => None,
        }
    }
}

impl<'a> CheckerState<'a> {
    // =========================================================================
    // Source file
    // =========================================================================

    /// Attribute a whole source file.
    pub fn check_source_file(&mut self, root: NodeIndex) -> Result<(), AttributionError> {
        let arena = self.ctx.arena;
        let Some(file) = arena.get(root).and_then(|n| arena.get_source_file(n)) else {
            return Ok(());
        };
        for import in &file.imports {
            if self.is_cancelled() {
                break;
            }
            self.check_import(import);
        }
        let facade = Owner::Named(self.ctx.unit.facade.clone());
        for declaration in &file.declarations {
            if self.is_cancelled() {
                break;
            }
            self.check_declaration(declaration, &facade);
        }
        if self.is_cancelled() {
            return Err(AttributionError::Cancelled {
                file: self.ctx.file_name.to_string(),
            });
        }
        debug!(
            file = self.ctx.file_name,
            accesses = self.ctx.tables.accesses.len(),
            diagnostics = self.ctx.tables.diagnostics.len(),
            "unit attributed"
        );
        Ok(())
    }

    fn check_import(&mut self, idx: NodeIndex) {
        let arena = self.ctx.arena;
        if let Some(data) = arena.get(idx).and_then(|n| arena.get_import(n)) {
            self.check_import_path(data.path);
        }
    }

    pub(crate) fn check_declaration(&mut self, idx: NodeIndex, owner: &Owner) {
        match self.ctx.arena.kind(idx) {
            CLASS_DECLARATION | OBJECT_DECLARATION => {
                self.check_class(idx);
            }
            FUNCTION_DECLARATION | SECONDARY_CONSTRUCTOR => self.check_function(idx, owner),
            PROPERTY_DECLARATION => self.check_property(idx, owner),
            ANONYMOUS_INITIALIZER => {
                let arena = self.ctx.arena;
                for &child in arena.children_of(idx) {
                    if arena.kind(child) == BLOCK {
                        self.get_type_of_block(child);
                    }
                }
            }
            UNKNOWN => self.check_unknown(idx),
            _ => {}
        }
    }

    /// Recovered regions: attribute whatever composite nodes they contain.
    pub(crate) fn check_unknown(&mut self, idx: NodeIndex) {
        let arena = self.ctx.arena;
        for &child in arena.children_of(idx) {
            let Some(node) = arena.get(child) else {
                continue;
            };
            if node.is_token() {
                continue;
            }
            match node.kind {
                CLASS_DECLARATION | OBJECT_DECLARATION | FUNCTION_DECLARATION | PROPERTY_DECLARATION => {
                    self.check_declaration(child, &Owner::Local);
                }
                TYPE_REFERENCE => {
                    self.attribute_type_ref(child);
                }
                _ => {
                    self.get_type_of_node(child);
                }
            }
        }
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// Attribute a class, object or object expression. Returns the type an
    /// object expression has as a value.
    pub(crate) fn check_class(&mut self, idx: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_class(n)) else {
            return Type::Unknown;
        };
        let bound = self.ctx.unit.class_names.get(&idx).cloned();
        let type_parameters = type_parameter_names(arena, data.type_parameters);
        self.with_type_parameters(type_parameters, |this| {
            let env = this.ctx.env;
            if let Some(fqn) = &bound {
                this.enclosing.push(fqn.clone());
            }
            let member_owner = match &bound {
                Some(fqn) => Owner::Named(fqn.clone()),
                None => Owner::Anonymous,
            };

            this.push_scope();
            if let Some(ctor) = arena
                .get(data.primary_constructor)
                .and_then(|n| arena.get_primary_constructor(n))
            {
                for parameter in &ctor.parameters {
                    this.check_parameter_as(parameter, Some(&member_owner));
                }
            }
            let supertypes: Vec<Type> = data
                .supertypes
                .iter()
                .map(|entry| this.check_supertype_entry(entry))
                .collect();
            let constructor_scope = this.scopes.pop().unwrap_or_default();

            let (frame_type, value_type, superclass) = match &bound {
                Some(fqn) => {
                    let ty = Type::class(fqn);
                    let superclass = first_superclass(this, &env.supertypes_of(&ty));
                    (ty.clone(), ty, superclass)
                }
                None => {
                    // Members of local classes are not in the environment, so
                    // their receiver stays unknown.
                    let value = supertypes
                        .first()
                        .filter(|ty| !ty.is_unknown())
                        .cloned()
                        .unwrap_or_else(|| Type::class(ANY));
                    (Type::Unknown, value, first_superclass(this, &supertypes))
                }
            };
            let is_inner = data.modifiers & modifier_flags::INNER != 0;
            let label = data
                .name
                .is_some()
                .then(|| Arc::from(arena.name_text(data.name)));
            trace!(class = ?bound, "class");
            this.frames.push(Frame {
                ty: frame_type,
                label,
                is_class: true,
                superclass,
                hides_outer_instance: bound.is_some() && !is_inner,
            });

            if let Some(body) = arena.get(data.body).and_then(|n| arena.get_class_body(n)) {
                for member in &body.members {
                    if this.is_cancelled() {
                        break;
                    }
                    match arena.kind(member) {
                        PROPERTY_DECLARATION | ANONYMOUS_INITIALIZER => {
                            this.scopes.push(constructor_scope.clone());
                            this.check_declaration(member, &member_owner);
                            this.pop_scope();
                        }
                        _ => this.check_declaration(member, &member_owner),
                    }
                }
            }

            this.frames.pop();
            if bound.is_some() {
                this.enclosing.pop();
            }
            value_type
        })
    }

    /// `Base(args)`, `Interface`, `Interface by delegate`.
    fn check_supertype_entry(&mut self, entry: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(entry).and_then(|n| arena.get_supertype_entry(n)) else {
            return Type::Unknown;
        };
        let ty = self.attribute_type_ref(data.type_ref);
        for &argument in arena.children_of(data.arguments) {
            if arena.kind(argument) == VALUE_ARGUMENT {
                self.get_type_of_value_argument(argument);
            }
        }
        if let Some(delegate) = self.child_after_keyword(entry, SyntaxKind::ByKeyword) {
            self.get_type_of_node(delegate);
        }
        ty
    }

    /// The node following a keyword token among `idx`'s children.
    fn child_after_keyword(&self, idx: NodeIndex, keyword: SyntaxKind) -> Option<NodeIndex> {
        let arena = self.ctx.arena;
        let children = arena.children_of(idx);
        let position = children
            .iter()
            .position(|&child| arena.kind(child) == keyword as u16)?;
        children.get(position + 1).copied().filter(|child| child.is_some())
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Declare a function or lambda parameter in the current scope.
    pub(crate) fn check_parameter(&mut self, parameter: NodeIndex) -> Type {
        self.check_parameter_as(parameter, None)
    }

    /// Constructor parameters with `val`/`var` are also properties of
    /// `property_owner`.
    fn check_parameter_as(&mut self, parameter: NodeIndex, property_owner: Option<&Owner>) -> Type {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(parameter).and_then(|n| arena.get_parameter(n)) else {
            return Type::Unknown;
        };
        let declared = self.attribute_type_ref(data.type_ref);
        let ty = if data.modifiers & modifier_flags::VARARG != 0 {
            Type::class("kotlin.Array")
        } else {
            declared
        };
        if data.default_value.is_some() {
            self.get_type_of_node(data.default_value);
        }
        let name = arena.name_text(data.name);
        self.declare_local(name, ty.clone());
        let (kind, owner) = match property_owner {
            Some(owner) if data.binding_keyword.is_some() => (VariableKind::Property, owner.name()),
            _ => (VariableKind::Parameter, None),
        };
        if !name.is_empty() {
            self.ctx.record_variable(VariableInfo {
                name: Arc::from(name),
                ty: ty.clone(),
                owner,
                kind,
                node: parameter,
            });
        }
        self.ctx.record_type(parameter, &ty);
        ty
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Functions, secondary constructors and property accessors.
    pub(crate) fn check_function(&mut self, idx: NodeIndex, owner: &Owner) {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_function(n)) else {
            return;
        };
        let kind = arena.kind(idx);
        let name = arena.name_text(data.name);
        let type_parameters = type_parameter_names(arena, data.type_parameters);

        self.with_type_parameters(type_parameters, |this| {
            let receiver = data
                .receiver_type
                .is_some()
                .then(|| this.attribute_type_ref(data.receiver_type));
            let declared_return = data
                .return_type
                .is_some()
                .then(|| this.attribute_type_ref(data.return_type));

            // Visible in its own body, for recursion.
            let is_local_function = matches!(owner, Owner::Local) && kind == FUNCTION_DECLARATION;
            if is_local_function {
                this.declare_local_function(name, declared_return.clone().unwrap_or_default());
            }

            this.push_scope();
            for parameter in &data.parameters {
                this.check_parameter(parameter);
            }
            if let Some(receiver) = &receiver {
                this.frames.push(Frame {
                    ty: receiver.clone(),
                    label: (!name.is_empty()).then(|| Arc::from(name)),
                    is_class: false,
                    superclass: Type::Unknown,
                    hides_outer_instance: false,
                });
            }
            if kind == SECONDARY_CONSTRUCTOR {
                // `: this(...)` / `: super(...)` delegation.
                for &child in arena.children_of(idx) {
                    if child != data.body && arena.kind(child) == CALL_EXPRESSION {
                        this.get_type_of_node(child);
                    }
                }
            }

            let body_type = if data.body.is_none() {
                Type::Unknown
            } else if data.is_expression_body {
                this.get_type_of_node(data.body)
            } else {
                this.get_type_of_block(data.body);
                Type::class(UNIT)
            };

            if receiver.is_some() {
                this.frames.pop();
            }
            this.pop_scope();

            if declared_return.is_none() && data.is_expression_body {
                if is_local_function {
                    this.declare_local_function(name, body_type);
                } else if let Owner::Named(owner) = owner
                    && !name.is_empty()
                {
                    this.inferred_members
                        .insert((owner.clone(), Arc::from(name)), body_type);
                }
            }
        });
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub(crate) fn check_property(&mut self, idx: NodeIndex, owner: &Owner) {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_property(n)) else {
            return;
        };
        let type_parameters = arena
            .children_of(idx)
            .iter()
            .find(|&&child| arena.kind(child) == TYPE_PARAMETER_LIST)
            .map(|&list| type_parameter_names(arena, list))
            .unwrap_or_default();

        self.with_type_parameters(type_parameters, |this| {
            let receiver = data
                .receiver_type
                .is_some()
                .then(|| this.attribute_type_ref(data.receiver_type));
            let declared = data
                .type_ref
                .is_some()
                .then(|| this.attribute_type_ref(data.type_ref));

            if let Some(receiver) = &receiver {
                this.frames.push(Frame {
                    ty: receiver.clone(),
                    label: None,
                    is_class: false,
                    superclass: Type::Unknown,
                    hides_outer_instance: false,
                });
            }
            let initializer_type = this.get_type_of_node(data.initializer);
            if let Some(delegate) = this.child_after_keyword(idx, SyntaxKind::ByKeyword) {
                this.get_type_of_node(delegate);
            }
            let ty = declared.unwrap_or(initializer_type);

            for &child in arena.children_of(idx) {
                if arena.kind(child) == PROPERTY_ACCESSOR {
                    this.check_accessor(child, &ty);
                }
            }
            if receiver.is_some() {
                this.frames.pop();
            }

            if data.name.is_none() {
                this.declare_destructured(idx);
                return;
            }
            let name = arena.name_text(data.name);
            let (kind, owner_name) = match owner {
                Owner::Named(owner) => {
                    if data.type_ref.is_none() {
                        this.inferred_members
                            .insert((owner.clone(), Arc::from(name)), ty.clone());
                    }
                    (VariableKind::Property, Some(owner.clone()))
                }
                Owner::Anonymous => (VariableKind::Property, None),
                Owner::Local => {
                    this.declare_local(name, ty.clone());
                    (VariableKind::Local, None)
                }
            };
            this.ctx.record_variable(VariableInfo {
                name: Arc::from(name),
                ty,
                owner: owner_name,
                kind,
                node: idx,
            });
        });
    }

    /// `get() = field`, `set(value) { field = value }`.
    fn check_accessor(&mut self, idx: NodeIndex, property_type: &Type) {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_function(n)) else {
            return;
        };
        self.push_scope();
        self.declare_local("field", property_type.clone());
        for parameter in &data.parameters {
            let declared = self.check_parameter(parameter);
            if declared.is_unknown()
                && let Some(p) = arena.get(parameter).and_then(|n| arena.get_parameter(n))
            {
                self.declare_local(arena.name_text(p.name), property_type.clone());
            }
        }
        if data.return_type.is_some() {
            self.attribute_type_ref(data.return_type);
        }
        if data.is_expression_body {
            self.get_type_of_node(data.body);
        } else if data.body.is_some() {
            self.get_type_of_block(data.body);
        }
        self.pop_scope();
    }

    /// `val (a, b) = pair`: the names are locals of unknown type.
    fn declare_destructured(&mut self, idx: NodeIndex) {
        let arena = self.ctx.arena;
        let Some(&names) = arena
            .children_of(idx)
            .iter()
            .find(|&&child| arena.kind(child) == UNKNOWN)
        else {
            return;
        };
        let mut after_colon = false;
        for &token in arena.children_of(names) {
            let kind = arena.kind(token);
            if kind == SyntaxKind::ColonToken as u16 {
                after_colon = true;
            } else if kind == SyntaxKind::CommaToken as u16 {
                after_colon = false;
            } else if kind == SyntaxKind::Identifier as u16 && !after_colon {
                let name = arena.name_text(token);
                self.declare_local(name, Type::Unknown);
                self.ctx.record_variable(VariableInfo {
                    name: Arc::from(name),
                    ty: Type::Unknown,
                    owner: None,
                    kind: VariableKind::Local,
                    node: token,
                });
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Value of a block: its last statement, `Unit` when empty.
    pub(crate) fn get_type_of_block(&mut self, idx: NodeIndex) -> Type {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_block(n)) else {
            return Type::Unknown;
        };
        self.push_scope();
        let mut last = Type::class(UNIT);
        for statement in &data.statements {
            if self.is_cancelled() {
                break;
            }
            last = self.check_statement(statement);
        }
        self.pop_scope();
        self.ctx.record_type(idx, &last);
        last
    }

    /// A declaration, assignment or expression statement.
    pub(crate) fn check_statement(&mut self, idx: NodeIndex) -> Type {
        match self.ctx.arena.kind(idx) {
            CLASS_DECLARATION | FUNCTION_DECLARATION | PROPERTY_DECLARATION => {
                self.check_declaration(idx, &Owner::Local);
                Type::class(UNIT)
            }
            OBJECT_DECLARATION if self.is_named_declaration(idx) => {
                self.check_declaration(idx, &Owner::Local);
                Type::class(UNIT)
            }
            ASSIGNMENT => {
                self.check_assignment(idx);
                Type::class(UNIT)
            }
            _ => self.get_type_of_node(idx),
        }
    }

    fn is_named_declaration(&self, idx: NodeIndex) -> bool {
        let arena = self.ctx.arena;
        arena
            .get(idx)
            .and_then(|n| arena.get_class(n))
            .is_some_and(|data| data.name.is_some())
    }

    /// `target = value`, `target += value`.
    pub(crate) fn check_assignment(&mut self, idx: NodeIndex) {
        let arena = self.ctx.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_assignment(n)) else {
            return;
        };
        self.get_type_of_node(data.target);
        self.get_type_of_node(data.value);
    }
}

/// First supertype that is not an interface, else `kotlin.Any`.
fn first_superclass(state: &CheckerState<'_>, supertypes: &[Type]) -> Type {
    let env = state.ctx.env;
    supertypes
        .iter()
        .find(|ty| !ty.is_unknown() && env.class_kind(ty) != Some(ClassKind::Interface))
        .cloned()
        .unwrap_or_else(|| Type::class(ANY))
}

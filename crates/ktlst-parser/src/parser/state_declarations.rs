//! Parser state - file header and declaration parsing.

use super::base::{NodeIndex, NodeList};
use super::node::*;
use super::state::ParserState;
use super::syntax_kind_ext::*;
use ktlst_scanner::SyntaxKind;

fn modifier_bit(kind: SyntaxKind) -> u32 {
    match kind {
        SyntaxKind::OpenKeyword => modifier_flags::OPEN,
        SyntaxKind::AbstractKeyword => modifier_flags::ABSTRACT,
        SyntaxKind::DataKeyword => modifier_flags::DATA,
        SyntaxKind::PrivateKeyword => modifier_flags::PRIVATE,
        SyntaxKind::PublicKeyword => modifier_flags::PUBLIC,
        SyntaxKind::InternalKeyword => modifier_flags::INTERNAL,
        SyntaxKind::ProtectedKeyword => modifier_flags::PROTECTED,
        SyntaxKind::OverrideKeyword => modifier_flags::OVERRIDE,
        SyntaxKind::FinalKeyword => modifier_flags::FINAL,
        SyntaxKind::SealedKeyword => modifier_flags::SEALED,
        SyntaxKind::InnerKeyword => modifier_flags::INNER,
        SyntaxKind::EnumKeyword => modifier_flags::ENUM,
        SyntaxKind::ConstKeyword => modifier_flags::CONST,
        SyntaxKind::LateinitKeyword => modifier_flags::LATEINIT,
        SyntaxKind::CompanionKeyword => modifier_flags::COMPANION,
        _ => modifier_flags::NONE,
    }
}

impl ParserState {
    // =========================================================================
    // File Header
    // =========================================================================

    pub(crate) fn parse_source_file(&mut self) -> NodeIndex {
        self.next_token();
        let mut children = NodeList::new();
        let mut package = NodeIndex::NONE;
        let mut imports = NodeList::new();
        let mut declarations = NodeList::new();

        if self.is_token(SyntaxKind::PackageKeyword) {
            package = self.parse_package_directive();
            children.push(package);
        }

        loop {
            match self.token() {
                SyntaxKind::EndOfFileToken => break,
                SyntaxKind::SemicolonToken => children.push(self.bump()),
                SyntaxKind::ImportKeyword => {
                    let import = self.parse_import_directive();
                    imports.push(import);
                    children.push(import);
                }
                _ => {
                    let mut declaration = self.parse_declaration();
                    if declaration.is_none() {
                        declaration = self.parse_unknown();
                    }
                    declarations.push(declaration);
                    children.push(declaration);
                }
            }
        }

        let end_of_file = self.bump();
        children.push(end_of_file);
        self.arena.add_source_file(
            SOURCE_FILE,
            0,
            children,
            SourceFileData {
                file_name: self.file_name.clone(),
                package,
                imports,
                declarations,
                end_of_file,
            },
        )
    }

    fn parse_package_directive(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        children.push(self.bump());
        let mut trailing = NodeList::new();
        let name = self.parse_name_chain(usize::MAX, false, &mut trailing);
        children.push(name);
        self.eat(SyntaxKind::SemicolonToken, &mut children);
        self.arena
            .add_package(PACKAGE_DIRECTIVE, start, children, PackageData { name })
    }

    fn parse_import_directive(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        children.push(self.bump());
        let mut trailing = NodeList::new();
        let path = self.parse_name_chain(usize::MAX, true, &mut trailing);
        children.push(path);
        let is_star = !trailing.is_empty();
        for leaf in trailing.iter() {
            children.push(leaf);
        }
        let mut alias = NodeIndex::NONE;
        if self.is_token(SyntaxKind::AsKeyword) && !self.has_line_break() {
            children.push(self.bump());
            alias = self.bump_name();
            children.push(alias);
        }
        self.eat(SyntaxKind::SemicolonToken, &mut children);
        self.arena.add_import(
            IMPORT_DIRECTIVE,
            start,
            children,
            ImportData {
                path,
                is_star,
                alias,
            },
        )
    }

    // =========================================================================
    // Modifiers and Annotations
    // =========================================================================

    /// Parse a run of modifiers and annotations into a `MODIFIER_LIST`.
    pub(crate) fn parse_modifiers(&mut self, children: &mut NodeList) -> u32 {
        let start = self.token_pos();
        let mut list = NodeList::new();
        let mut flags = modifier_flags::NONE;
        loop {
            if self.is_token(SyntaxKind::AtToken) {
                list.push(self.parse_annotation());
                continue;
            }
            if !self.is_modifier_start() {
                break;
            }
            flags |= modifier_bit(self.token());
            if self.token_text_is("vararg") {
                flags |= modifier_flags::VARARG;
            }
            list.push(self.bump());
        }
        if !list.is_empty() {
            children.push(self.arena.add_node(MODIFIER_LIST, start, list));
        }
        flags
    }

    /// `@Name`, `@a.b.Name(args)`, `@get:Name`.
    fn parse_annotation(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        children.push(self.bump());
        let mut trailing = NodeList::new();
        children.push(self.parse_name_chain(usize::MAX, false, &mut trailing));
        if self.is_token(SyntaxKind::ColonToken) && self.scanner.token_prefix().is_empty() {
            children.push(self.bump());
            children.push(self.parse_name_chain(usize::MAX, false, &mut trailing));
        }
        if self.is_token(SyntaxKind::OpenParenToken) && self.scanner.token_prefix().is_empty() {
            let mut arguments = NodeList::new();
            children.push(self.parse_value_argument_list(&mut arguments));
        }
        self.arena.add_node(ANNOTATION, start, children)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Parse a declaration, or return NONE if none starts here.
    pub(crate) fn parse_declaration(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        let modifiers = self.parse_modifiers(&mut children);
        match self.token() {
            SyntaxKind::ClassKeyword | SyntaxKind::InterfaceKeyword => {
                self.parse_class_declaration(start, children, modifiers)
            }
            SyntaxKind::ObjectKeyword => self.parse_object_declaration(start, children, modifiers),
            SyntaxKind::FunKeyword => self.parse_function_declaration(start, children, modifiers),
            SyntaxKind::ValKeyword | SyntaxKind::VarKeyword => {
                self.parse_property_declaration(start, children, modifiers)
            }
            SyntaxKind::ConstructorKeyword => {
                self.parse_secondary_constructor(start, children, modifiers)
            }
            SyntaxKind::InitKeyword if self.peek().0 == SyntaxKind::OpenBraceToken => {
                children.push(self.bump());
                children.push(self.parse_block());
                self.arena.add_node(ANONYMOUS_INITIALIZER, start, children)
            }
            _ if children.is_empty() => NodeIndex::NONE,
            token => {
                // Modifiers or annotations with no declaration after them.
                let at_closer = matches!(
                    token,
                    SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
                );
                if !at_closer && !self.has_line_break() {
                    children.push(self.parse_unknown());
                }
                let node = self.arena.add_node(UNKNOWN, start, children);
                self.arena.set_flags(node, node_flags::RECOVERED);
                node
            }
        }
    }

    fn parse_class_declaration(
        &mut self,
        start: u32,
        mut children: NodeList,
        modifiers: u32,
    ) -> NodeIndex {
        let kind = if self.is_token(SyntaxKind::InterfaceKeyword) {
            ClassKind::Interface
        } else {
            ClassKind::Class
        };
        children.push(self.bump());
        let name = self.bump_name();
        children.push(name);
        let type_parameters = self.parse_type_parameters_opt();
        children.push(type_parameters);

        let mut primary_constructor = NodeIndex::NONE;
        if !self.has_line_break()
            && (self.is_token(SyntaxKind::OpenParenToken)
                || self.is_token(SyntaxKind::ConstructorKeyword)
                || self.is_token(SyntaxKind::AtToken)
                || self.is_modifier_start())
        {
            primary_constructor = self.parse_primary_constructor();
            children.push(primary_constructor);
        }

        let supertypes = self.parse_supertype_list(&mut children);
        let body = self.parse_class_body_opt();
        children.push(body);

        self.arena.add_class(
            CLASS_DECLARATION,
            start,
            children,
            ClassData {
                kind,
                modifiers,
                name,
                type_parameters,
                primary_constructor,
                supertypes,
                body,
            },
        )
    }

    /// `object Name : Super { }`, `companion object { }` and object expressions.
    pub(crate) fn parse_object_declaration(
        &mut self,
        start: u32,
        mut children: NodeList,
        modifiers: u32,
    ) -> NodeIndex {
        let kind = if modifiers & modifier_flags::COMPANION != 0 {
            ClassKind::CompanionObject
        } else {
            ClassKind::Object
        };
        children.push(self.bump());
        let name = if self.is_identifier() && !self.has_line_break() {
            self.bump_name()
        } else {
            NodeIndex::NONE
        };
        children.push(name);
        let supertypes = self.parse_supertype_list(&mut children);
        let body = self.parse_class_body_opt();
        children.push(body);

        self.arena.add_class(
            OBJECT_DECLARATION,
            start,
            children,
            ClassData {
                kind,
                modifiers,
                name,
                type_parameters: NodeIndex::NONE,
                primary_constructor: NodeIndex::NONE,
                supertypes,
                body,
            },
        )
    }

    fn parse_primary_constructor(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        self.parse_modifiers(&mut children);
        self.eat(SyntaxKind::ConstructorKeyword, &mut children);
        let mut parameters = NodeList::new();
        if self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_parameter_list(&mut children, &mut parameters);
        }
        self.arena.add_primary_constructor(
            PRIMARY_CONSTRUCTOR,
            start,
            children,
            PrimaryConstructorData { parameters },
        )
    }

    fn parse_supertype_list(&mut self, children: &mut NodeList) -> NodeList {
        let mut supertypes = NodeList::new();
        if !self.is_token(SyntaxKind::ColonToken) {
            return supertypes;
        }
        children.push(self.bump());
        loop {
            let entry = self.parse_supertype_entry();
            if entry.is_none() {
                break;
            }
            supertypes.push(entry);
            children.push(entry);
            if self.eat(SyntaxKind::CommaToken, children).is_none() {
                break;
            }
        }
        supertypes
    }

    fn parse_supertype_entry(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        let type_ref = self.parse_type_reference();
        if type_ref.is_none() {
            return NodeIndex::NONE;
        }
        children.push(type_ref);
        let mut arguments = NodeIndex::NONE;
        if self.is_token(SyntaxKind::OpenParenToken) && !self.has_line_break() {
            let mut list = NodeList::new();
            arguments = self.parse_value_argument_list(&mut list);
            children.push(arguments);
        }
        if self.is_token(SyntaxKind::ByKeyword) {
            children.push(self.bump());
            let saved = self.no_trailing_lambda;
            self.no_trailing_lambda = true;
            children.push(self.parse_expression());
            self.no_trailing_lambda = saved;
        }
        self.arena.add_supertype_entry(
            SUPERTYPE_ENTRY,
            start,
            children,
            SupertypeEntryData {
                type_ref,
                arguments,
            },
        )
    }

    fn parse_class_body_opt(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_class_body()
        } else {
            NodeIndex::NONE
        }
    }

    fn parse_class_body(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        let mut members = NodeList::new();
        children.push(self.bump());
        loop {
            match self.token() {
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::SemicolonToken => children.push(self.bump()),
                _ => {
                    let mut member = self.parse_declaration();
                    if member.is_none() {
                        member = self.parse_unknown();
                    }
                    members.push(member);
                    children.push(member);
                }
            }
        }
        self.eat(SyntaxKind::CloseBraceToken, &mut children);
        self.arena
            .add_class_body(CLASS_BODY, start, children, ClassBodyData { members })
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// `( param, param )` into `children`, collecting `PARAMETER` nodes.
    pub(crate) fn parse_parameter_list(
        &mut self,
        children: &mut NodeList,
        parameters: &mut NodeList,
    ) {
        children.push(self.bump());
        loop {
            match self.token() {
                SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::CommaToken => children.push(self.bump()),
                SyntaxKind::CloseBraceToken => break,
                _ => {
                    let parameter = self.parse_parameter();
                    if parameter.is_none() {
                        children.push(self.parse_unknown_token());
                    } else {
                        parameters.push(parameter);
                        children.push(parameter);
                    }
                }
            }
        }
        self.eat(SyntaxKind::CloseParenToken, children);
    }

    pub(crate) fn parse_parameter(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        let modifiers = self.parse_modifiers(&mut children);
        let mut binding_keyword = NodeIndex::NONE;
        let mut is_var = false;
        if self.is_token(SyntaxKind::ValKeyword) || self.is_token(SyntaxKind::VarKeyword) {
            is_var = self.is_token(SyntaxKind::VarKeyword);
            binding_keyword = self.bump();
            children.push(binding_keyword);
        }
        let name = self.bump_name();
        if name.is_none() && children.is_empty() {
            return NodeIndex::NONE;
        }
        children.push(name);
        let mut type_ref = NodeIndex::NONE;
        if self.is_token(SyntaxKind::ColonToken) {
            children.push(self.bump());
            type_ref = self.parse_type_reference();
            children.push(type_ref);
        }
        let mut default_value = NodeIndex::NONE;
        if self.is_token(SyntaxKind::EqualsToken) {
            children.push(self.bump());
            default_value = self.parse_expression();
            children.push(default_value);
        }
        self.arena.add_parameter(
            PARAMETER,
            start,
            children,
            ParameterData {
                modifiers,
                binding_keyword,
                is_var,
                name,
                type_ref,
                default_value,
            },
        )
    }

    /// `<T, out R : Bound>` as `PARAMETER` nodes, or NONE.
    fn parse_type_parameters_opt(&mut self) -> NodeIndex {
        if !self.is_token(SyntaxKind::LessThanToken) {
            return NodeIndex::NONE;
        }
        let start = self.token_pos();
        let mut children = NodeList::new();
        children.push(self.bump());
        loop {
            match self.token() {
                SyntaxKind::GreaterThanToken | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::CommaToken => children.push(self.bump()),
                _ => {
                    let param_start = self.token_pos();
                    let mut param_children = NodeList::new();
                    // Variance and `reified` in front of the name.
                    while (self.is_token(SyntaxKind::InKeyword)
                        || self.token_text_is("out")
                        || self.token_text_is("reified"))
                        && self.peek().0 == SyntaxKind::Identifier
                    {
                        param_children.push(self.bump());
                    }
                    let name = self.bump_name();
                    if name.is_none() {
                        children.push(self.parse_unknown_token());
                        continue;
                    }
                    param_children.push(name);
                    let mut bound = NodeIndex::NONE;
                    if self.is_token(SyntaxKind::ColonToken) {
                        param_children.push(self.bump());
                        bound = self.parse_type_reference();
                        param_children.push(bound);
                    }
                    children.push(self.arena.add_parameter(
                        PARAMETER,
                        param_start,
                        param_children,
                        ParameterData {
                            modifiers: modifier_flags::NONE,
                            binding_keyword: NodeIndex::NONE,
                            is_var: false,
                            name,
                            type_ref: bound,
                            default_value: NodeIndex::NONE,
                        },
                    ));
                }
            }
        }
        self.eat(SyntaxKind::GreaterThanToken, &mut children);
        self.arena.add_node(TYPE_PARAMETER_LIST, start, children)
    }

    // =========================================================================
    // Functions and Properties
    // =========================================================================

    /// Number of leading name segments that form an extension receiver type.
    ///
    /// `fun a.b.C.name()` has three; `fun name()` has none.
    fn receiver_segments_ahead(&mut self) -> usize {
        self.look_ahead(|scanner| {
            let mut segments = 0usize;
            loop {
                let token = scanner.token();
                if token != SyntaxKind::Identifier && !token.is_soft_keyword() {
                    break;
                }
                segments += 1;
                let mut next = scanner.scan();
                if next == SyntaxKind::LessThanToken {
                    let mut depth = 1u32;
                    while depth > 0 {
                        match scanner.scan() {
                            SyntaxKind::LessThanToken => depth += 1,
                            SyntaxKind::GreaterThanToken => depth -= 1,
                            SyntaxKind::EndOfFileToken
                            | SyntaxKind::OpenBraceToken
                            | SyntaxKind::EqualsToken => return 0,
                            _ => {}
                        }
                    }
                    next = scanner.scan();
                }
                if next == SyntaxKind::QuestionToken {
                    next = scanner.scan();
                }
                if next == SyntaxKind::DotToken || next == SyntaxKind::QuestionDotToken {
                    scanner.scan();
                    continue;
                }
                break;
            }
            segments.saturating_sub(1)
        })
    }

    /// Receiver type and its `.`/`?.` separator, when present.
    fn parse_receiver_opt(&mut self, children: &mut NodeList) -> NodeIndex {
        let segments = self.receiver_segments_ahead();
        if segments == 0 {
            return NodeIndex::NONE;
        }
        let receiver = self.parse_type_reference_limited(segments);
        children.push(receiver);
        if self.is_token(SyntaxKind::QuestionDotToken) {
            children.push(self.bump());
            if let Some(data) = self
                .arena
                .get(receiver)
                .filter(|n| n.kind == TYPE_REFERENCE)
                .map(|n| n.data_index as usize)
            {
                if let Some(type_ref) = self.arena.type_refs.get_mut(data) {
                    type_ref.is_nullable = true;
                }
            }
        } else {
            self.eat(SyntaxKind::DotToken, children);
        }
        receiver
    }

    fn parse_function_declaration(
        &mut self,
        start: u32,
        mut children: NodeList,
        modifiers: u32,
    ) -> NodeIndex {
        children.push(self.bump());
        let type_parameters = self.parse_type_parameters_opt();
        children.push(type_parameters);
        let receiver_type = self.parse_receiver_opt(&mut children);
        let name = self.bump_name();
        children.push(name);
        let mut parameters = NodeList::new();
        if self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_parameter_list(&mut children, &mut parameters);
        }
        let mut return_type = NodeIndex::NONE;
        if self.is_token(SyntaxKind::ColonToken) {
            children.push(self.bump());
            return_type = self.parse_type_reference();
            children.push(return_type);
        }
        self.parse_where_clause_opt(&mut children);
        let (body, is_expression_body) = self.parse_function_body(&mut children);
        self.arena.add_function(
            FUNCTION_DECLARATION,
            start,
            children,
            FunctionData {
                modifiers,
                receiver_type,
                name,
                type_parameters,
                parameters,
                return_type,
                body,
                is_expression_body,
            },
        )
    }

    fn parse_where_clause_opt(&mut self, children: &mut NodeList) {
        if !self.is_token(SyntaxKind::WhereKeyword) {
            return;
        }
        children.push(self.bump());
        loop {
            let name = self.bump_name();
            children.push(name);
            if self.eat(SyntaxKind::ColonToken, children).is_some() {
                children.push(self.parse_type_reference());
            }
            if name.is_none() || self.eat(SyntaxKind::CommaToken, children).is_none() {
                break;
            }
        }
    }

    /// `{ ... }` or `= expression`.
    fn parse_function_body(&mut self, children: &mut NodeList) -> (NodeIndex, bool) {
        if self.is_token(SyntaxKind::OpenBraceToken) {
            let block = self.parse_block();
            children.push(block);
            (block, false)
        } else if self.is_token(SyntaxKind::EqualsToken) {
            children.push(self.bump());
            let expression = self.parse_expression();
            children.push(expression);
            (expression, true)
        } else {
            (NodeIndex::NONE, false)
        }
    }

    fn parse_property_declaration(
        &mut self,
        start: u32,
        mut children: NodeList,
        modifiers: u32,
    ) -> NodeIndex {
        let is_var = self.is_token(SyntaxKind::VarKeyword);
        children.push(self.bump());
        children.push(self.parse_type_parameters_opt());
        let receiver_type = self.parse_receiver_opt(&mut children);
        let name = if self.is_token(SyntaxKind::OpenParenToken) {
            // Destructuring declarations keep their names unattributed.
            children.push(self.parse_unknown());
            NodeIndex::NONE
        } else {
            self.bump_name()
        };
        children.push(name);
        let mut type_ref = NodeIndex::NONE;
        if self.is_token(SyntaxKind::ColonToken) {
            children.push(self.bump());
            type_ref = self.parse_type_reference();
            children.push(type_ref);
        }
        let mut initializer = NodeIndex::NONE;
        if self.is_token(SyntaxKind::EqualsToken) {
            children.push(self.bump());
            initializer = self.parse_expression();
            children.push(initializer);
        } else if self.is_token(SyntaxKind::ByKeyword) {
            children.push(self.bump());
            children.push(self.parse_expression());
        }
        while self.is_accessor_start() {
            children.push(self.parse_property_accessor());
        }
        self.eat(SyntaxKind::SemicolonToken, &mut children);
        self.arena.add_property(
            PROPERTY_DECLARATION,
            start,
            children,
            PropertyData {
                modifiers,
                is_var,
                receiver_type,
                name,
                type_ref,
                initializer,
            },
        )
    }

    /// `get() = ...`, `set(value) { ... }`, `private set`.
    fn is_accessor_start(&mut self) -> bool {
        self.look_ahead(|scanner| {
            let mut token = scanner.token();
            while token.is_modifier() || token == SyntaxKind::AtToken {
                token = scanner.scan();
                if scanner.token() == SyntaxKind::Identifier {
                    // annotation name
                    token = scanner.scan();
                }
            }
            if token != SyntaxKind::GetKeyword && token != SyntaxKind::SetKeyword {
                return false;
            }
            let next = scanner.scan();
            scanner.has_preceding_line_break()
                || matches!(
                    next,
                    SyntaxKind::OpenParenToken
                        | SyntaxKind::EqualsToken
                        | SyntaxKind::CloseBraceToken
                        | SyntaxKind::SemicolonToken
                        | SyntaxKind::EndOfFileToken
                )
        })
    }

    fn parse_property_accessor(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        let modifiers = self.parse_modifiers(&mut children);
        let name = self.bump();
        children.push(name);
        let mut parameters = NodeList::new();
        if self.is_token(SyntaxKind::OpenParenToken) && !self.has_line_break() {
            self.parse_parameter_list(&mut children, &mut parameters);
        }
        let mut return_type = NodeIndex::NONE;
        if self.is_token(SyntaxKind::ColonToken) {
            children.push(self.bump());
            return_type = self.parse_type_reference();
            children.push(return_type);
        }
        let (body, is_expression_body) = if parameters.is_empty()
            && !self.is_token(SyntaxKind::EqualsToken)
            && !self.is_token(SyntaxKind::OpenBraceToken)
        {
            (NodeIndex::NONE, false)
        } else {
            self.parse_function_body(&mut children)
        };
        self.arena.add_function(
            PROPERTY_ACCESSOR,
            start,
            children,
            FunctionData {
                modifiers,
                receiver_type: NodeIndex::NONE,
                name,
                type_parameters: NodeIndex::NONE,
                parameters,
                return_type,
                body,
                is_expression_body,
            },
        )
    }

    fn parse_secondary_constructor(
        &mut self,
        start: u32,
        mut children: NodeList,
        modifiers: u32,
    ) -> NodeIndex {
        let name = self.bump();
        children.push(name);
        let mut parameters = NodeList::new();
        if self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_parameter_list(&mut children, &mut parameters);
        }
        if self.is_token(SyntaxKind::ColonToken) {
            children.push(self.bump());
            let saved = self.no_trailing_lambda;
            self.no_trailing_lambda = true;
            children.push(self.parse_expression());
            self.no_trailing_lambda = saved;
        }
        let (body, is_expression_body) = self.parse_function_body(&mut children);
        self.arena.add_function(
            SECONDARY_CONSTRUCTOR,
            start,
            children,
            FunctionData {
                modifiers,
                receiver_type: NodeIndex::NONE,
                name,
                type_parameters: NodeIndex::NONE,
                parameters,
                return_type: NodeIndex::NONE,
                body,
                is_expression_body,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::state::parse_source;

    fn find(result: &crate::ParseResult, kind: u16) -> Vec<NodeIndex> {
        (0..result.arena.len() as u32)
            .map(NodeIndex)
            .filter(|&i| result.arena.kind(i) == kind)
            .collect()
    }

    #[test]
    fn test_package_and_imports() {
        let result = parse_source(
            "a.kt",
            "package com.example\n\nimport java.nio.ByteBuffer\nimport kotlin.collections.*\nimport a.B as C\n",
        );
        let arena = &result.arena;
        let file = arena
            .get(result.root)
            .and_then(|n| arena.get_source_file(n))
            .unwrap();
        assert!(file.package.is_some());
        assert_eq!(file.imports.len(), 3);
        let imports: Vec<_> = file
            .imports
            .iter()
            .map(|i| arena.get(i).and_then(|n| arena.get_import(n)).unwrap())
            .collect();
        assert!(!imports[0].is_star);
        assert!(imports[1].is_star);
        assert_eq!(arena.name_text(imports[2].alias), "C");
        let path = arena.get(imports[0].path).unwrap();
        let access = arena.get_access_expr(path).unwrap();
        assert_eq!(arena.name_text(access.name), "ByteBuffer");
    }

    #[test]
    fn test_class_with_constructor_and_supertype() {
        let result = parse_source(
            "a.kt",
            "open class Super(val id: String)\nclass Test(id: String) : Super(id), Runnable {\n    override fun run() {}\n}\n",
        );
        let classes = find(&result, CLASS_DECLARATION);
        assert_eq!(classes.len(), 2);
        let arena = &result.arena;
        let sup = arena.get(classes[0]).and_then(|n| arena.get_class(n)).unwrap();
        assert_ne!(sup.modifiers & modifier_flags::OPEN, 0);
        let ctor = arena
            .get(sup.primary_constructor)
            .and_then(|n| arena.get_primary_constructor(n))
            .unwrap();
        let param = arena
            .get(ctor.parameters.nodes[0])
            .and_then(|n| arena.get_parameter(n))
            .unwrap();
        assert!(param.binding_keyword.is_some());
        let test = arena.get(classes[1]).and_then(|n| arena.get_class(n)).unwrap();
        assert_eq!(test.supertypes.len(), 2);
        let first = arena
            .get(test.supertypes.nodes[0])
            .and_then(|n| arena.get_supertype_entry(n))
            .unwrap();
        assert!(first.arguments.is_some());
    }

    #[test]
    fn test_companion_object() {
        let result = parse_source(
            "a.kt",
            "class A {\n    companion object Factory {\n        const val MAX = 1\n    }\n}\n",
        );
        let objects = find(&result, OBJECT_DECLARATION);
        assert_eq!(objects.len(), 1);
        let arena = &result.arena;
        let object = arena.get(objects[0]).and_then(|n| arena.get_class(n)).unwrap();
        assert_eq!(object.kind, ClassKind::CompanionObject);
        assert_eq!(arena.name_text(object.name), "Factory");
    }

    #[test]
    fn test_extension_function_receiver() {
        let result = parse_source("a.kt", "fun String?.shout(): String = this ?: \"\"\n");
        let arena = &result.arena;
        let function = find(&result, FUNCTION_DECLARATION)[0];
        let data = arena.get(function).and_then(|n| arena.get_function(n)).unwrap();
        assert_eq!(arena.name_text(data.name), "shout");
        let receiver = arena
            .get(data.receiver_type)
            .and_then(|n| arena.get_type_ref(n))
            .unwrap();
        assert!(receiver.is_nullable);
        assert!(data.is_expression_body);
    }

    #[test]
    fn test_property_accessors() {
        let source = "class A {\n    var size: Int = 0\n        private set\n    val empty: Boolean\n        get() = size == 0\n}\n";
        let result = parse_source("a.kt", source);
        assert_eq!(find(&result, PROPERTY_ACCESSOR).len(), 2);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_init_block_and_secondary_constructor() {
        let source = "class A(val x: Int) {\n    init { println(x) }\n    constructor() : this(1) {}\n}\n";
        let result = parse_source("a.kt", source);
        assert_eq!(find(&result, ANONYMOUS_INITIALIZER).len(), 1);
        assert_eq!(find(&result, SECONDARY_CONSTRUCTOR).len(), 1);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_soft_modifier_names_stay_names() {
        let result = parse_source("a.kt", "class A(data: String, open: Boolean)\n");
        let arena = &result.arena;
        let params = find(&result, PARAMETER);
        assert_eq!(params.len(), 2);
        let first = arena.get(params[0]).and_then(|n| arena.get_parameter(n)).unwrap();
        assert_eq!(arena.name_text(first.name), "data");
        assert_eq!(first.modifiers, modifier_flags::NONE);
    }
}

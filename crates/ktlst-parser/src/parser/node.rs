//! Arena Node Architecture
//!
//! Each node is a small `Copy` header (kind, flags, position, data index) plus
//! an entry in a typed storage pool selected by `kind`. Leaf nodes are tokens:
//! their pool entry stores the token text and the verbatim whitespace and
//! comments that precede it (the formatting prefix). Composite nodes record
//! their children in source order, so printing is a plain in-order walk.
//!
//! # Design Principles
//!
//! 1. **Every token is a leaf**: nothing scanned is ever dropped
//! 2. **Typed data indirect**: semantic fields point at children by `NodeIndex`
//! 3. **No heap allocation per node**: all storage in arena vectors
//! 4. **Immutable after parse**: rewrites clone the arena

use super::base::{NodeIndex, NodeList};
use ktlst_common::interner::{Atom, Interner};
use serde::Serialize;

/// A compact node header.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Node {
    /// Token `SyntaxKind` for leaves, `syntax_kind_ext` value for composites
    pub kind: u16,
    /// Packed node flags (see `node_flags`)
    pub flags: u16,
    /// Start of the first token's text (prefix excluded)
    pub pos: u32,
    /// End of the last token's text
    pub end: u32,
    /// Index into the type-specific storage pool (u32::MAX = no data)
    pub data_index: u32,
}

impl Node {
    pub const NO_DATA: u32 = u32::MAX;

    #[inline]
    pub fn new(kind: u16, pos: u32, end: u32) -> Node {
        Node {
            kind,
            flags: 0,
            pos,
            end,
            data_index: Self::NO_DATA,
        }
    }

    #[inline]
    pub fn with_data(kind: u16, pos: u32, end: u32, data_index: u32) -> Node {
        Node {
            kind,
            flags: 0,
            pos,
            end,
            data_index,
        }
    }

    #[inline]
    pub fn has_data(&self) -> bool {
        self.data_index != Self::NO_DATA
    }

    #[inline]
    pub fn is_token(&self) -> bool {
        self.kind < super::syntax_kind_ext::FIRST_NODE
    }
}

pub mod node_flags {
    /// Access or call reached through `?.`
    pub const NULL_SAFE: u16 = 1 << 0;
    /// Node produced by error recovery
    pub const RECOVERED: u16 = 1 << 1;
    /// Token text was replaced by a rewrite
    pub const REWRITTEN: u16 = 1 << 2;
}

/// Declaration modifier bits.
pub mod modifier_flags {
    pub const NONE: u32 = 0;
    pub const OPEN: u32 = 1 << 0;
    pub const ABSTRACT: u32 = 1 << 1;
    pub const DATA: u32 = 1 << 2;
    pub const PRIVATE: u32 = 1 << 3;
    pub const PUBLIC: u32 = 1 << 4;
    pub const INTERNAL: u32 = 1 << 5;
    pub const PROTECTED: u32 = 1 << 6;
    pub const OVERRIDE: u32 = 1 << 7;
    pub const FINAL: u32 = 1 << 8;
    pub const SEALED: u32 = 1 << 9;
    pub const INNER: u32 = 1 << 10;
    pub const ENUM: u32 = 1 << 11;
    pub const CONST: u32 = 1 << 12;
    pub const LATEINIT: u32 = 1 << 13;
    pub const COMPANION: u32 = 1 << 14;
    pub const VARARG: u32 = 1 << 15;
}

// =============================================================================
// Typed Data Pools
// =============================================================================

/// Per-node structural info shared by every kind.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ExtendedNodeInfo {
    pub parent: NodeIndex,
    /// Children in source order, tokens included
    pub children: NodeList,
}

/// A token leaf: formatting prefix plus token text.
#[derive(Clone, Debug, Serialize)]
pub struct TokenData {
    /// Verbatim whitespace and comments before the token
    pub prefix: String,
    /// Token text as written (backticks included)
    pub text: String,
    /// Interned identifier value (backticks stripped); NONE for non-names
    pub atom: Atom,
}

#[derive(Clone, Debug, Serialize)]
pub struct SourceFileData {
    pub file_name: String,
    pub package: NodeIndex,
    pub imports: NodeList,
    pub declarations: NodeList,
    /// End-of-file token; its prefix is the trailing trivia
    pub end_of_file: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct PackageData {
    /// Identifier or dotted access chain
    pub name: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ImportData {
    /// Identifier or dotted access chain (without the `.*`)
    pub path: NodeIndex,
    pub is_star: bool,
    pub alias: NodeIndex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ClassKind {
    Class,
    Interface,
    Object,
    CompanionObject,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassData {
    pub kind: ClassKind,
    pub modifiers: u32,
    /// Name identifier; NONE for an unnamed companion object
    pub name: NodeIndex,
    pub type_parameters: NodeIndex,
    pub primary_constructor: NodeIndex,
    pub supertypes: NodeList,
    pub body: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassBodyData {
    pub members: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct PrimaryConstructorData {
    pub parameters: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct ParameterData {
    pub modifiers: u32,
    /// `val`/`var` keyword leaf for constructor properties, else NONE
    pub binding_keyword: NodeIndex,
    pub is_var: bool,
    pub name: NodeIndex,
    pub type_ref: NodeIndex,
    pub default_value: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct SupertypeEntryData {
    pub type_ref: NodeIndex,
    /// Constructor invocation arguments (`Super()`), NONE for interfaces
    pub arguments: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct FunctionData {
    pub modifiers: u32,
    pub receiver_type: NodeIndex,
    pub name: NodeIndex,
    pub type_parameters: NodeIndex,
    pub parameters: NodeList,
    pub return_type: NodeIndex,
    /// Block, or expression for `= expr` bodies
    pub body: NodeIndex,
    pub is_expression_body: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct PropertyData {
    pub modifiers: u32,
    pub is_var: bool,
    pub receiver_type: NodeIndex,
    pub name: NodeIndex,
    pub type_ref: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeRefData {
    /// Identifier or dotted access chain naming the type
    pub name: NodeIndex,
    pub type_arguments: NodeList,
    pub is_nullable: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct BlockData {
    pub statements: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReturnData {
    pub expression: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct AssignmentData {
    pub target: NodeIndex,
    pub operator: u16,
    pub value: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct IfData {
    pub condition: NodeIndex,
    pub then_branch: NodeIndex,
    pub else_branch: NodeIndex,
}

/// Data for `qualifier.member` and `qualifier?.member`.
#[derive(Clone, Debug, Serialize)]
pub struct AccessExprData {
    /// Left-hand expression
    pub expression: NodeIndex,
    /// The `.` or `?.` token leaf
    pub operator: NodeIndex,
    /// Member name identifier leaf
    pub name: NodeIndex,
    pub question_dot_token: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct CallExprData {
    pub callee: NodeIndex,
    pub type_arguments: NodeList,
    /// VALUE_ARGUMENT_LIST, NONE when only a trailing lambda is given
    pub argument_list: NodeIndex,
    pub arguments: NodeList,
    pub trailing_lambda: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ValueArgumentData {
    pub name: NodeIndex,
    pub expression: NodeIndex,
    pub is_spread: bool,
}

/// Data for `this`, `this@Label`, `super`, `super<T>@Label`.
#[derive(Clone, Debug, Serialize)]
pub struct SelfReferenceData {
    pub keyword: NodeIndex,
    pub label: NodeIndex,
    pub super_type: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct BinaryExprData {
    pub left: NodeIndex,
    pub operator: u16,
    pub operator_token: NodeIndex,
    pub right: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct UnaryExprData {
    pub operator: u16,
    pub operand: NodeIndex,
}

/// Data for `as`, `as?`, `is`, `!is`.
#[derive(Clone, Debug, Serialize)]
pub struct TypeOperationData {
    pub expression: NodeIndex,
    pub operator: u16,
    pub type_ref: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ParenthesizedData {
    pub expression: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct LambdaData {
    pub parameters: NodeList,
    pub statements: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct CallableReferenceData {
    pub receiver: NodeIndex,
    pub name: NodeIndex,
}

/// Arena-based storage for one compilation unit.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    pub nodes: Vec<Node>,
    pub extended_info: Vec<ExtendedNodeInfo>,
    pub tokens: Vec<TokenData>,
    pub source_files: Vec<SourceFileData>,
    pub packages: Vec<PackageData>,
    pub imports: Vec<ImportData>,
    pub classes: Vec<ClassData>,
    pub class_bodies: Vec<ClassBodyData>,
    pub primary_constructors: Vec<PrimaryConstructorData>,
    pub parameters: Vec<ParameterData>,
    pub supertype_entries: Vec<SupertypeEntryData>,
    pub functions: Vec<FunctionData>,
    pub properties: Vec<PropertyData>,
    pub type_refs: Vec<TypeRefData>,
    pub blocks: Vec<BlockData>,
    pub returns: Vec<ReturnData>,
    pub assignments: Vec<AssignmentData>,
    pub if_exprs: Vec<IfData>,
    pub access_exprs: Vec<AccessExprData>,
    pub call_exprs: Vec<CallExprData>,
    pub value_arguments: Vec<ValueArgumentData>,
    pub self_references: Vec<SelfReferenceData>,
    pub binary_exprs: Vec<BinaryExprData>,
    pub unary_exprs: Vec<UnaryExprData>,
    pub type_operations: Vec<TypeOperationData>,
    pub parenthesized: Vec<ParenthesizedData>,
    pub lambdas: Vec<LambdaData>,
    pub callable_references: Vec<CallableReferenceData>,
    pub(crate) interner: Interner,
}

//! Parser AST types and the recursive-descent grammar.

pub mod base;
pub mod node;
pub mod node_arena;
pub mod state;
mod state_declarations;
mod state_expressions;
mod state_statements;
mod state_types;

pub use base::{NodeIndex, NodeList};

/// Node kinds. Token kinds (`ktlst_scanner::SyntaxKind`) occupy the values
/// below `FIRST_NODE`; every leaf node uses its token kind.
pub mod syntax_kind_ext {
    pub const FIRST_NODE: u16 = 300;
    pub const SOURCE_FILE: u16 = 300;
    pub const PACKAGE_DIRECTIVE: u16 = 301;
    pub const IMPORT_DIRECTIVE: u16 = 302;
    pub const CLASS_DECLARATION: u16 = 303;
    pub const OBJECT_DECLARATION: u16 = 304;
    pub const CLASS_BODY: u16 = 305;
    pub const PRIMARY_CONSTRUCTOR: u16 = 306;
    pub const PARAMETER: u16 = 307;
    pub const SUPERTYPE_ENTRY: u16 = 308;
    pub const FUNCTION_DECLARATION: u16 = 309;
    pub const PROPERTY_DECLARATION: u16 = 310;
    pub const MODIFIER_LIST: u16 = 311;
    pub const TYPE_REFERENCE: u16 = 312;
    pub const TYPE_ARGUMENT_LIST: u16 = 313;
    pub const TYPE_PARAMETER_LIST: u16 = 314;
    pub const ANONYMOUS_INITIALIZER: u16 = 315;
    pub const SECONDARY_CONSTRUCTOR: u16 = 316;
    pub const PROPERTY_ACCESSOR: u16 = 317;
    pub const ANNOTATION: u16 = 318;
    pub const BLOCK: u16 = 320;
    pub const RETURN_STATEMENT: u16 = 321;
    pub const ASSIGNMENT: u16 = 322;
    pub const IF_EXPRESSION: u16 = 323;
    pub const PROPERTY_ACCESS_EXPRESSION: u16 = 330;
    pub const CALL_EXPRESSION: u16 = 331;
    pub const VALUE_ARGUMENT_LIST: u16 = 332;
    pub const VALUE_ARGUMENT: u16 = 333;
    pub const THIS_EXPRESSION: u16 = 334;
    pub const SUPER_EXPRESSION: u16 = 335;
    pub const PARENTHESIZED_EXPRESSION: u16 = 336;
    pub const BINARY_EXPRESSION: u16 = 337;
    pub const ELVIS_EXPRESSION: u16 = 338;
    pub const PREFIX_UNARY_EXPRESSION: u16 = 339;
    pub const POSTFIX_UNARY_EXPRESSION: u16 = 340;
    pub const AS_EXPRESSION: u16 = 341;
    pub const IS_EXPRESSION: u16 = 342;
    pub const LAMBDA_EXPRESSION: u16 = 343;
    pub const CALLABLE_REFERENCE: u16 = 344;
    pub const INDEXING_EXPRESSION: u16 = 345;
    pub const JUMP_EXPRESSION: u16 = 346;
    pub const UNKNOWN: u16 = 399;

    /// Kind name for debugging and tree dumps.
    pub fn kind_name(kind: u16) -> &'static str {
        match kind {
            SOURCE_FILE => "SourceFile",
            PACKAGE_DIRECTIVE => "PackageDirective",
            IMPORT_DIRECTIVE => "ImportDirective",
            CLASS_DECLARATION => "ClassDeclaration",
            OBJECT_DECLARATION => "ObjectDeclaration",
            CLASS_BODY => "ClassBody",
            PRIMARY_CONSTRUCTOR => "PrimaryConstructor",
            PARAMETER => "Parameter",
            SUPERTYPE_ENTRY => "SupertypeEntry",
            FUNCTION_DECLARATION => "FunctionDeclaration",
            PROPERTY_DECLARATION => "PropertyDeclaration",
            MODIFIER_LIST => "ModifierList",
            TYPE_REFERENCE => "TypeReference",
            TYPE_ARGUMENT_LIST => "TypeArgumentList",
            TYPE_PARAMETER_LIST => "TypeParameterList",
            ANONYMOUS_INITIALIZER => "AnonymousInitializer",
            SECONDARY_CONSTRUCTOR => "SecondaryConstructor",
            PROPERTY_ACCESSOR => "PropertyAccessor",
            ANNOTATION => "Annotation",
            BLOCK => "Block",
            RETURN_STATEMENT => "ReturnStatement",
            ASSIGNMENT => "Assignment",
            IF_EXPRESSION => "IfExpression",
            PROPERTY_ACCESS_EXPRESSION => "PropertyAccessExpression",
            CALL_EXPRESSION => "CallExpression",
            VALUE_ARGUMENT_LIST => "ValueArgumentList",
            VALUE_ARGUMENT => "ValueArgument",
            THIS_EXPRESSION => "ThisExpression",
            SUPER_EXPRESSION => "SuperExpression",
            PARENTHESIZED_EXPRESSION => "ParenthesizedExpression",
            BINARY_EXPRESSION => "BinaryExpression",
            ELVIS_EXPRESSION => "ElvisExpression",
            PREFIX_UNARY_EXPRESSION => "PrefixUnaryExpression",
            POSTFIX_UNARY_EXPRESSION => "PostfixUnaryExpression",
            AS_EXPRESSION => "AsExpression",
            IS_EXPRESSION => "IsExpression",
            LAMBDA_EXPRESSION => "LambdaExpression",
            CALLABLE_REFERENCE => "CallableReference",
            INDEXING_EXPRESSION => "IndexingExpression",
            JUMP_EXPRESSION => "JumpExpression",
            UNKNOWN => "Unknown",
            _ => "Token",
        }
    }
}

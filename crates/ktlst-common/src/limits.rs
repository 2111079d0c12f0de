//! Centralized limits and thresholds.
//!
//! Recursion depths and walk bounds shared by the parser, binder and checker.
//! Every limit degrades gracefully: exceeding it yields an `Unknown` node or
//! the unknown type, never a panic.

/// Maximum nesting depth for recursive-descent expression parsing.
///
/// Past this depth the remaining text of the expression is captured as an
/// `Unknown` node so printing stays lossless.
pub const MAX_PARSE_DEPTH: u32 = 256;

/// Maximum depth for expression attribution.
///
/// ```kotlin
/// a.b.c.d.e.f.g /* ... hundreds of segments ... */
/// ```
pub const MAX_EXPR_ATTRIBUTION_DEPTH: u32 = 500;

/// Maximum number of supertypes visited when walking a supertype chain.
///
/// Guards against cyclic hierarchies in malformed stub metadata.
pub const MAX_SUPERTYPE_WALK: usize = 128;

/// Maximum number of segments in a qualified name chain.
pub const MAX_QUALIFIED_CHAIN_SEGMENTS: usize = 64;

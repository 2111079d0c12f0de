//! Kotlin scanner for the ktlst parser.
//!
//! - `syntax_kind` - token kinds, keyword tables and token flags
//! - `scanner_impl` - the scanner itself; every token carries the verbatim
//!   whitespace/comment trivia that precedes it

pub mod syntax_kind;
pub use syntax_kind::{SyntaxKind, TokenFlags, keyword_kind};

pub mod scanner_impl;
pub use scanner_impl::{ScannerSnapshot, ScannerState};

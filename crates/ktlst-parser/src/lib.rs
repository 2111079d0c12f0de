//! Lossless Kotlin parser.
//!
//! - `parser::base` - `NodeIndex` / `NodeList` handles
//! - `parser::node` - node header, node kinds and typed data pools
//! - `parser::node_arena` - arena construction and typed accessors
//! - `parser::state*` - recursive-descent grammar
//! - `printer` - lossless printer (every token's prefix and text, in order)

pub mod parser;
pub mod printer;

pub use parser::base::{NodeIndex, NodeList};
pub use parser::node::{Node, NodeArena};
pub use parser::state::{ParseResult, ParserState, parse_source};
pub use parser::syntax_kind_ext;
pub use printer::print;

//! Parser state and token helpers shared by the grammar modules.
//!
//! The grammar never fails: a construct it does not understand is captured
//! as an `UNKNOWN` node holding the raw tokens, so the printed tree is always
//! identical to the input.

use super::base::{NodeIndex, NodeList};
use super::node::{NodeArena, node_flags};
use super::syntax_kind_ext;
use ktlst_common::diagnostics::{Diagnostic, diagnostic_codes};
use ktlst_common::limits::MAX_PARSE_DEPTH;
use ktlst_scanner::{ScannerState, SyntaxKind};
use tracing::{debug, trace};

/// Identifier-shaped modifiers the scanner does not treat as keywords.
const IDENTIFIER_MODIFIERS: &[&str] = &[
    "suspend",
    "inline",
    "operator",
    "infix",
    "tailrec",
    "external",
    "annotation",
    "value",
    "expect",
    "actual",
    "vararg",
    "noinline",
    "crossinline",
    "reified",
];

/// Result of parsing one compilation unit.
#[derive(Clone, Debug)]
pub struct ParseResult {
    pub file_name: String,
    pub source: String,
    pub arena: NodeArena,
    /// The `SOURCE_FILE` node
    pub root: NodeIndex,
    pub diagnostics: Vec<Diagnostic>,
}

/// Recursive-descent parser over a single source text.
pub struct ParserState {
    pub(crate) scanner: ScannerState,
    pub(crate) arena: NodeArena,
    pub(crate) file_name: String,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) depth: u32,
    /// Set while parsing `by` delegates in a supertype list, where `{` opens
    /// the class body rather than a trailing lambda.
    pub(crate) no_trailing_lambda: bool,
}

/// Parse a source text into a lossless tree.
pub fn parse_source(file_name: &str, source: &str) -> ParseResult {
    let parser = ParserState::new(file_name, source);
    parser.parse()
}

impl ParserState {
    pub fn new(file_name: &str, source: &str) -> ParserState {
        ParserState {
            scanner: ScannerState::new(source),
            arena: NodeArena::with_capacity(source.len()),
            file_name: file_name.to_string(),
            diagnostics: Vec::new(),
            depth: 0,
            no_trailing_lambda: false,
        }
    }

    /// Parse the whole unit and hand back the arena.
    pub fn parse(mut self) -> ParseResult {
        debug!(file = %self.file_name, len = self.scanner.source().len(), "parse");
        let root = self.parse_source_file();
        ParseResult {
            file_name: self.file_name,
            source: self.scanner.source().to_string(),
            arena: self.arena,
            root,
            diagnostics: self.diagnostics,
        }
    }

    // =========================================================================
    // Token Helpers
    // =========================================================================

    #[inline]
    pub(crate) fn token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.scanner.token() == kind
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.token_pos()
    }

    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.scanner.scan()
    }

    pub(crate) fn has_line_break(&self) -> bool {
        self.scanner.has_preceding_line_break()
    }

    /// The current token can serve as a name (identifiers and soft keywords).
    pub(crate) fn is_identifier(&self) -> bool {
        let token = self.token();
        token == SyntaxKind::Identifier || token.is_soft_keyword()
    }

    pub(crate) fn token_text_is(&self, text: &str) -> bool {
        self.scanner.token_text() == text
    }

    /// Turn the current token into a leaf and advance.
    pub(crate) fn bump(&mut self) -> NodeIndex {
        let kind = self.token();
        self.bump_as(kind)
    }

    /// Turn the current token into a leaf of `kind` and advance.
    pub(crate) fn bump_as(&mut self, kind: SyntaxKind) -> NodeIndex {
        let leaf = self.arena.add_token(
            kind,
            self.scanner.token_pos(),
            self.scanner.token_end(),
            self.scanner.token_prefix(),
            self.scanner.token_text(),
            self.scanner.token_value(),
        );
        self.next_token();
        leaf
    }

    /// Consume a name token as an `Identifier` leaf, or return NONE.
    pub(crate) fn bump_name(&mut self) -> NodeIndex {
        if self.is_identifier() {
            self.bump_as(SyntaxKind::Identifier)
        } else {
            NodeIndex::NONE
        }
    }

    /// Consume `kind` into `children` when present.
    pub(crate) fn eat(&mut self, kind: SyntaxKind, children: &mut NodeList) -> NodeIndex {
        if self.is_token(kind) {
            let leaf = self.bump();
            children.push(leaf);
            leaf
        } else {
            NodeIndex::NONE
        }
    }

    /// Kind and line-break flag of the token after the current one.
    pub(crate) fn peek(&mut self) -> (SyntaxKind, bool) {
        let snapshot = self.scanner.snapshot();
        let kind = self.scanner.scan();
        let line_break = self.scanner.has_preceding_line_break();
        self.scanner.restore(snapshot);
        (kind, line_break)
    }

    /// Run a scanner-only probe and rewind afterwards.
    pub(crate) fn look_ahead<T>(&mut self, probe: impl FnOnce(&mut ScannerState) -> T) -> T {
        let snapshot = self.scanner.snapshot();
        let result = probe(&mut self.scanner);
        self.scanner.restore(snapshot);
        result
    }

    /// Declaration modifier at the current position.
    ///
    /// Modifiers are soft, so `data.size` or `open()` keep their name meaning:
    /// a modifier must be followed on the same line by another modifier, an
    /// annotation or a declaration keyword.
    pub(crate) fn is_modifier_start(&mut self) -> bool {
        let token = self.token();
        let modifier_like = token.is_modifier()
            || (token == SyntaxKind::Identifier
                && IDENTIFIER_MODIFIERS.contains(&self.scanner.token_text()));
        if !modifier_like {
            return false;
        }
        self.look_ahead(|scanner| {
            let next = scanner.scan();
            if scanner.has_preceding_line_break() && next != SyntaxKind::AtToken {
                return matches!(
                    next,
                    SyntaxKind::ClassKeyword | SyntaxKind::FunKeyword | SyntaxKind::ObjectKeyword
                );
            }
            next.is_modifier()
                || matches!(
                    next,
                    SyntaxKind::ClassKeyword
                        | SyntaxKind::InterfaceKeyword
                        | SyntaxKind::ObjectKeyword
                        | SyntaxKind::FunKeyword
                        | SyntaxKind::ValKeyword
                        | SyntaxKind::VarKeyword
                        | SyntaxKind::ConstructorKeyword
                        | SyntaxKind::GetKeyword
                        | SyntaxKind::SetKeyword
                        | SyntaxKind::AtToken
                )
                || (next == SyntaxKind::Identifier
                    && IDENTIFIER_MODIFIERS.contains(&scanner.token_text()))
                || (next == SyntaxKind::Identifier && is_parameter_modifier_context(scanner))
        })
    }

    // =========================================================================
    // Recursion Guard
    // =========================================================================

    /// Returns false once the nesting limit is hit.
    pub(crate) fn enter(&mut self) -> bool {
        if self.depth >= MAX_PARSE_DEPTH {
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    /// Capture an unrecognized construct verbatim.
    ///
    /// Consumes at least one token, keeps brackets balanced and stops at a
    /// token starting a new line at nesting depth 0 (a `catch`, `finally`,
    /// `else` or `while` continuation keeps going) or at an unmatched closer.
    pub(crate) fn parse_unknown(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        let mut depth = 0u32;
        loop {
            let token = self.token();
            if token == SyntaxKind::EndOfFileToken {
                break;
            }
            let is_closer = matches!(
                token,
                SyntaxKind::CloseBraceToken
                    | SyntaxKind::CloseParenToken
                    | SyntaxKind::CloseBracketToken
            );
            if !children.is_empty() && depth == 0 {
                if is_closer || token == SyntaxKind::SemicolonToken {
                    break;
                }
                if self.has_line_break() && !self.is_continuation_keyword() {
                    break;
                }
            }
            if children.is_empty() && is_closer {
                // A stray closer on its own.
                children.push(self.bump());
                break;
            }
            match token {
                SyntaxKind::OpenBraceToken
                | SyntaxKind::OpenParenToken
                | SyntaxKind::OpenBracketToken => depth += 1,
                SyntaxKind::CloseBraceToken
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken => depth = depth.saturating_sub(1),
                _ => {}
            }
            children.push(self.bump());
        }
        let node = self
            .arena
            .add_node(syntax_kind_ext::UNKNOWN, start, children);
        self.arena.set_flags(node, node_flags::RECOVERED);
        let span = self.arena.span_of(node);
        trace!(start = span.start, end = span.end, "unknown construct");
        self.diagnostics.push(Diagnostic::from_code(
            &self.file_name,
            span.start,
            span.len(),
            diagnostic_codes::UNPARSED_SOURCE,
            &[],
        ));
        node
    }

    /// Wrap the current token alone in an `UNKNOWN` node.
    pub(crate) fn parse_unknown_token(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut children = NodeList::new();
        children.push(self.bump());
        let node = self
            .arena
            .add_node(syntax_kind_ext::UNKNOWN, start, children);
        self.arena.set_flags(node, node_flags::RECOVERED);
        let span = self.arena.span_of(node);
        self.diagnostics.push(Diagnostic::from_code(
            &self.file_name,
            span.start,
            span.len(),
            diagnostic_codes::UNPARSED_SOURCE,
            &[],
        ));
        node
    }

    fn is_continuation_keyword(&self) -> bool {
        match self.token() {
            SyntaxKind::ElseKeyword | SyntaxKind::WhileKeyword => true,
            SyntaxKind::Identifier => self.token_text_is("catch") || self.token_text_is("finally"),
            _ => false,
        }
    }
}

/// `private val x` style constructor parameter: modifier then `val`/`var`
/// or a parameter name followed by `:`.
fn is_parameter_modifier_context(scanner: &mut ScannerState) -> bool {
    let next = scanner.scan();
    !scanner.has_preceding_line_break() && next == SyntaxKind::ColonToken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print;

    #[test]
    fn test_empty_source() {
        let result = parse_source("empty.kt", "");
        assert_eq!(print(&result.arena, result.root), "");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_trailing_trivia_lives_on_eof() {
        let source = "val a = 1\n// trailing\n";
        let result = parse_source("a.kt", source);
        let file = result
            .arena
            .get(result.root)
            .and_then(|n| result.arena.get_source_file(n))
            .unwrap();
        let eof = result.arena.token_at(file.end_of_file).unwrap();
        assert_eq!(eof.prefix, "\n// trailing\n");
        assert_eq!(eof.text, "");
    }

    #[test]
    fn test_garbage_becomes_unknown() {
        let source = "class A {\n  ### ???\n}\n";
        let result = parse_source("g.kt", source);
        assert_eq!(print(&result.arena, result.root), source);
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.code == diagnostic_codes::UNPARSED_SOURCE)
        );
    }

    #[test]
    fn test_deep_nesting_stays_lossless() {
        let depth = (MAX_PARSE_DEPTH as usize) + 20;
        let source = format!("val x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
        let result = parse_source("deep.kt", &source);
        assert_eq!(print(&result.arena, result.root), source);
    }

    #[test]
    fn test_soft_keyword_as_name() {
        let source = "val data = open.data\n";
        let result = parse_source("soft.kt", source);
        assert_eq!(print(&result.arena, result.root), source);
        assert!(result.diagnostics.is_empty());
    }
}

//! Scanner implementation.
//!
//! The scanner is pull-based: the parser calls [`ScannerState::scan`] to move
//! to the next token. Whitespace and comments are never dropped; the text
//! between the end of the previous token and the start of the current one is
//! exposed as [`ScannerState::token_prefix`], and the parser stores it on the
//! node that owns the token. Concatenating every prefix and token text in
//! order reproduces the input byte for byte.

use crate::syntax_kind::{SyntaxKind, TokenFlags, keyword_kind, token_flags};
use ktlst_common::comments::{has_line_break, skip_trivia};

/// Saved scanner position for speculative parsing.
#[derive(Clone, Copy, Debug)]
pub struct ScannerSnapshot {
    pos: usize,
    trivia_start: usize,
    token_start: usize,
    token: SyntaxKind,
    token_flags: TokenFlags,
}

/// Kotlin scanner over an owned source text.
#[derive(Clone, Debug)]
pub struct ScannerState {
    source: String,
    /// Next unread byte.
    pos: usize,
    /// Start of the trivia preceding the current token.
    trivia_start: usize,
    /// Start of the current token's own text.
    token_start: usize,
    token: SyntaxKind,
    token_flags: TokenFlags,
}

impl ScannerState {
    pub fn new(source: impl Into<String>) -> Self {
        ScannerState {
            source: source.into(),
            pos: 0,
            trivia_start: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_flags: token_flags::NONE,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Current token kind.
    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    #[inline]
    pub fn token_flags(&self) -> TokenFlags {
        self.token_flags
    }

    /// Byte offset where the current token's text starts.
    #[inline]
    pub fn token_pos(&self) -> u32 {
        self.token_start as u32
    }

    /// Byte offset just past the current token.
    #[inline]
    pub fn token_end(&self) -> u32 {
        self.pos as u32
    }

    /// Byte offset where the current token's leading trivia starts.
    #[inline]
    pub fn trivia_pos(&self) -> u32 {
        self.trivia_start as u32
    }

    /// Verbatim whitespace and comments preceding the current token.
    pub fn token_prefix(&self) -> &str {
        &self.source[self.trivia_start..self.token_start]
    }

    /// Source text of the current token.
    pub fn token_text(&self) -> &str {
        &self.source[self.token_start..self.pos]
    }

    /// Identifier name with backticks removed.
    pub fn token_value(&self) -> &str {
        let text = self.token_text();
        if self.token_flags & token_flags::BACKTICKED != 0 && text.len() >= 2 {
            text.trim_start_matches('`').trim_end_matches('`')
        } else {
            text
        }
    }

    pub fn has_preceding_line_break(&self) -> bool {
        has_line_break(self.token_prefix())
    }

    pub fn snapshot(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            pos: self.pos,
            trivia_start: self.trivia_start,
            token_start: self.token_start,
            token: self.token,
            token_flags: self.token_flags,
        }
    }

    pub fn restore(&mut self, snapshot: ScannerSnapshot) {
        self.pos = snapshot.pos;
        self.trivia_start = snapshot.trivia_start;
        self.token_start = snapshot.token_start;
        self.token = snapshot.token;
        self.token_flags = snapshot.token_flags;
    }

    #[inline]
    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.source.as_bytes().get(pos).copied()
    }

    #[inline]
    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Advance to the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.trivia_start = self.pos;
        self.pos = skip_trivia(&self.source, self.pos);
        self.token_start = self.pos;
        self.token_flags = token_flags::NONE;

        let Some(ch) = self.peek_char() else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = match ch {
            '"' => self.scan_string(),
            '\'' => self.scan_char(),
            '`' => self.scan_backticked_identifier(),
            c if c.is_ascii_digit() => self.scan_number(),
            '.' if self.byte_at(self.pos + 1).is_some_and(|b| b.is_ascii_digit()) => {
                self.scan_number()
            }
            c if is_identifier_start(c) => self.scan_identifier(),
            _ => self.scan_punctuation(),
        };
        self.token
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        let rest = &self.source[self.pos..];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !is_identifier_part(c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += len;
        let text = &self.source[self.token_start..self.pos];
        match keyword_kind(text) {
            Some(SyntaxKind::AsKeyword) if self.byte_at(self.pos) == Some(b'?') => {
                self.pos += 1;
                SyntaxKind::AsSafeKeyword
            }
            Some(kind) => kind,
            None => SyntaxKind::Identifier,
        }
    }

    fn scan_backticked_identifier(&mut self) -> SyntaxKind {
        self.pos += 1;
        while let Some(b) = self.byte_at(self.pos) {
            if b == b'`' {
                self.pos += 1;
                self.token_flags |= token_flags::BACKTICKED;
                return SyntaxKind::Identifier;
            }
            if b == b'\n' || b == b'\r' {
                break;
            }
            self.pos += 1;
        }
        self.token_flags |= token_flags::BACKTICKED | token_flags::UNTERMINATED;
        SyntaxKind::Identifier
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let bytes = self.source.as_bytes();
        let len = bytes.len();
        let mut i = self.pos;

        if bytes[i] == b'0' && i + 1 < len && matches!(bytes[i + 1], b'x' | b'X') {
            self.token_flags |= token_flags::HEX;
            i += 2;
            while i < len && (bytes[i].is_ascii_hexdigit() || bytes[i] == b'_') {
                i += 1;
            }
        } else if bytes[i] == b'0' && i + 1 < len && matches!(bytes[i + 1], b'b' | b'B') {
            self.token_flags |= token_flags::BINARY;
            i += 2;
            while i < len && matches!(bytes[i], b'0' | b'1' | b'_') {
                i += 1;
            }
        } else {
            while i < len && (bytes[i].is_ascii_digit() || bytes[i] == b'_') {
                i += 1;
            }
            // Fraction: `1.5` but not `1..2` or `1.foo()`
            if i + 1 < len && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
                self.token_flags |= token_flags::FLOATING;
                i += 1;
                while i < len && (bytes[i].is_ascii_digit() || bytes[i] == b'_') {
                    i += 1;
                }
            }
            if i < len && matches!(bytes[i], b'e' | b'E') {
                let mut j = i + 1;
                if j < len && matches!(bytes[j], b'+' | b'-') {
                    j += 1;
                }
                if j < len && bytes[j].is_ascii_digit() {
                    self.token_flags |= token_flags::FLOATING;
                    i = j;
                    while i < len && (bytes[i].is_ascii_digit() || bytes[i] == b'_') {
                        i += 1;
                    }
                }
            }
        }

        // Suffixes
        if i < len && matches!(bytes[i], b'f' | b'F') && self.token_flags & token_flags::HEX == 0 {
            self.token_flags |= token_flags::FLOATING | token_flags::FLOAT_SUFFIX;
            i += 1;
        } else {
            if i < len && matches!(bytes[i], b'u' | b'U') {
                self.token_flags |= token_flags::UNSIGNED_SUFFIX;
                i += 1;
            }
            if i < len && bytes[i] == b'L' {
                self.token_flags |= token_flags::LONG_SUFFIX;
                i += 1;
            }
        }

        self.pos = i;
        SyntaxKind::NumericLiteral
    }

    fn scan_char(&mut self) -> SyntaxKind {
        self.pos += 1;
        while let Some(b) = self.byte_at(self.pos) {
            match b {
                b'\\' => self.pos += 2,
                b'\'' => {
                    self.pos += 1;
                    return SyntaxKind::CharacterLiteral;
                }
                b'\n' | b'\r' => break,
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.source.len());
        self.token_flags |= token_flags::UNTERMINATED;
        SyntaxKind::CharacterLiteral
    }

    fn scan_string(&mut self) -> SyntaxKind {
        let mut flags = self.token_flags;
        self.pos = if self.source[self.pos..].starts_with("\"\"\"") {
            flags |= token_flags::RAW_STRING;
            skip_string_body(&self.source, self.pos + 3, true, &mut flags)
        } else {
            skip_string_body(&self.source, self.pos + 1, false, &mut flags)
        };
        self.token_flags = flags;
        SyntaxKind::StringLiteral
    }

    fn scan_punctuation(&mut self) -> SyntaxKind {
        let rest = &self.source[self.pos..];
        let (kind, len) = match_punctuation(rest);
        match kind {
            Some(kind) => {
                self.pos += len;
                kind
            }
            None => {
                let ch_len = rest.chars().next().map(char::len_utf8).unwrap_or(1);
                self.pos += ch_len;
                SyntaxKind::Unknown
            }
        }
    }
}

/// Skip a string body starting after the opening quote(s); returns the
/// position just past the closing quote(s). Templates are skipped with brace
/// matching so that `"${ "}" }"` stays one token.
fn skip_string_body(source: &str, start: usize, raw: bool, flags: &mut TokenFlags) -> usize {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut i = start;
    while i < len {
        match bytes[i] {
            b'\\' if !raw => i += 2,
            b'"' if raw => {
                if source[i..].starts_with("\"\"\"") {
                    i += 3;
                    // Raw strings may end with extra quotes: `""""`
                    while i < len && bytes[i] == b'"' {
                        i += 1;
                    }
                    return i;
                }
                i += 1;
            }
            b'"' => return i + 1,
            b'\n' | b'\r' if !raw => break,
            b'$' if i + 1 < len && bytes[i + 1] == b'{' => {
                *flags |= token_flags::TEMPLATE;
                i = skip_template_expression(source, i + 2, flags);
            }
            b'$' if i + 1 < len && (bytes[i + 1].is_ascii_alphabetic() || bytes[i + 1] == b'_') => {
                *flags |= token_flags::TEMPLATE;
                i += 1;
            }
            _ => i += 1,
        }
    }
    *flags |= token_flags::UNTERMINATED;
    i.min(len)
}

fn skip_template_expression(source: &str, start: usize, flags: &mut TokenFlags) -> usize {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut depth = 1usize;
    let mut i = start;
    while i < len {
        match bytes[i] {
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return i;
                }
            }
            b'"' => {
                i = if source[i..].starts_with("\"\"\"") {
                    skip_string_body(source, i + 3, true, flags)
                } else {
                    skip_string_body(source, i + 1, false, flags)
                };
            }
            _ => i += 1,
        }
    }
    len
}

/// Longest-match punctuation table.
fn match_punctuation(rest: &str) -> (Option<SyntaxKind>, usize) {
    use SyntaxKind::*;
    // `!is` / `!in` only when followed by a non-identifier character
    for (text, kind) in [("!is", NotIsKeyword), ("!in", NotInKeyword)] {
        if rest.starts_with(text)
            && !rest[text.len()..]
                .chars()
                .next()
                .is_some_and(is_identifier_part)
        {
            return (Some(kind), text.len());
        }
    }
    const TABLE: &[(&str, SyntaxKind)] = &[
        ("===", EqualsEqualsEqualsToken),
        ("!==", ExclamationEqualsEqualsToken),
        ("..<", DotDotLessThanToken),
        ("?.", QuestionDotToken),
        ("?:", QuestionColonToken),
        ("::", ColonColonToken),
        ("..", DotDotToken),
        ("->", MinusGreaterThanToken),
        ("!!", ExclamationExclamationToken),
        ("==", EqualsEqualsToken),
        ("!=", ExclamationEqualsToken),
        ("<=", LessThanEqualsToken),
        (">=", GreaterThanEqualsToken),
        ("++", PlusPlusToken),
        ("--", MinusMinusToken),
        ("+=", PlusEqualsToken),
        ("-=", MinusEqualsToken),
        ("*=", AsteriskEqualsToken),
        ("/=", SlashEqualsToken),
        ("%=", PercentEqualsToken),
        ("&&", AmpersandAmpersandToken),
        ("||", BarBarToken),
        ("{", OpenBraceToken),
        ("}", CloseBraceToken),
        ("(", OpenParenToken),
        (")", CloseParenToken),
        ("[", OpenBracketToken),
        ("]", CloseBracketToken),
        (".", DotToken),
        (",", CommaToken),
        (";", SemicolonToken),
        (":", ColonToken),
        ("?", QuestionToken),
        ("@", AtToken),
        ("!", ExclamationToken),
        ("=", EqualsToken),
        ("<", LessThanToken),
        (">", GreaterThanToken),
        ("+", PlusToken),
        ("-", MinusToken),
        ("*", AsteriskToken),
        ("/", SlashToken),
        ("%", PercentToken),
    ];
    TABLE
        .iter()
        .find(|(text, _)| rest.starts_with(text))
        .map(|(text, kind)| (Some(*kind), text.len()))
        .unwrap_or((None, 0))
}

#[inline]
fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

#[inline]
fn is_identifier_part(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<(SyntaxKind, String, String)> {
        let mut scanner = ScannerState::new(source);
        let mut out = Vec::new();
        loop {
            let kind = scanner.scan();
            out.push((
                kind,
                scanner.token_prefix().to_string(),
                scanner.token_text().to_string(),
            ));
            if kind == SyntaxKind::EndOfFileToken {
                break;
            }
        }
        out
    }

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        tokens(source).into_iter().map(|(k, _, _)| k).collect()
    }

    #[test]
    fn test_prefixes_reassemble_source() {
        let source = "val a = test ?. property // tail\n/* c */ ?: null\n";
        let rebuilt: String = tokens(source)
            .into_iter()
            .map(|(_, prefix, text)| prefix + &text)
            .collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_null_safe_and_elvis_tokens() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("a?.b ?: c!!"),
            vec![
                Identifier,
                QuestionDotToken,
                Identifier,
                QuestionColonToken,
                Identifier,
                ExclamationExclamationToken,
                EndOfFileToken
            ]
        );
    }

    #[test]
    fn test_nullable_type_question() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("test : Test ?"),
            vec![Identifier, ColonToken, Identifier, QuestionToken, EndOfFileToken]
        );
    }

    #[test]
    fn test_string_with_escapes_and_templates() {
        let toks = tokens(r#""\r\n" . toByteArray ( ) "${a + "}"} $b""#);
        assert_eq!(toks[0].0, SyntaxKind::StringLiteral);
        assert_eq!(toks[0].2, r#""\r\n""#);
        let template = &toks[5];
        assert_eq!(template.0, SyntaxKind::StringLiteral);
        assert_eq!(template.2, r#""${a + "}"} $b""#);
    }

    #[test]
    fn test_raw_string() {
        let toks = tokens("\"\"\"a \"quoted\" ${x}\"\"\" x");
        assert_eq!(toks[0].0, SyntaxKind::StringLiteral);
        assert_eq!(toks[0].2, "\"\"\"a \"quoted\" ${x}\"\"\"");
        assert_eq!(toks[1].2, "x");
    }

    #[test]
    fn test_numbers() {
        let mut scanner = ScannerState::new("42 0xFFL 1.5e3 2f 1..2 7u");
        scanner.scan();
        assert_eq!(scanner.token_text(), "42");
        scanner.scan();
        assert_eq!(scanner.token_text(), "0xFFL");
        assert_ne!(scanner.token_flags() & token_flags::LONG_SUFFIX, 0);
        scanner.scan();
        assert_eq!(scanner.token_text(), "1.5e3");
        assert_ne!(scanner.token_flags() & token_flags::FLOATING, 0);
        scanner.scan();
        assert_eq!(scanner.token_text(), "2f");
        scanner.scan();
        assert_eq!(scanner.token_text(), "1");
        assert_eq!(scanner.scan(), SyntaxKind::DotDotToken);
        scanner.scan();
        scanner.scan();
        assert_eq!(scanner.token_text(), "7u");
    }

    #[test]
    fn test_keywords_and_soft_keywords() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("this super companion object x as? T !is U"),
            vec![
                ThisKeyword,
                SuperKeyword,
                CompanionKeyword,
                ObjectKeyword,
                Identifier,
                AsSafeKeyword,
                Identifier,
                NotIsKeyword,
                Identifier,
                EndOfFileToken
            ]
        );
    }

    #[test]
    fn test_backticked_identifier() {
        let mut scanner = ScannerState::new("`my name`.x");
        assert_eq!(scanner.scan(), SyntaxKind::Identifier);
        assert_eq!(scanner.token_value(), "my name");
        assert_eq!(scanner.scan(), SyntaxKind::DotToken);
    }

    #[test]
    fn test_unknown_character_is_kept() {
        let toks = tokens("a # b");
        assert_eq!(toks[1].0, SyntaxKind::Unknown);
        assert_eq!(toks[1].2, "#");
    }

    #[test]
    fn test_snapshot_restore() {
        let mut scanner = ScannerState::new("a . b");
        scanner.scan();
        let snap = scanner.snapshot();
        scanner.scan();
        scanner.scan();
        assert_eq!(scanner.token_text(), "b");
        scanner.restore(snap);
        assert_eq!(scanner.token_text(), "a");
        assert_eq!(scanner.scan(), SyntaxKind::DotToken);
        assert_eq!(scanner.token_prefix(), " ");
    }
}

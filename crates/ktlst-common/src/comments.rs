//! Comment and Whitespace Trivia
//!
//! The formatting carriers store trivia text verbatim. This module knows how
//! to find the end of a trivia run in source text and how to split stored
//! trivia back into comments. Kotlin block comments nest.

use serde::Serialize;

/// A range representing a comment inside a trivia string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommentRange {
    /// Start position (byte offset)
    pub pos: u32,
    /// End position (byte offset)
    pub end: u32,
    /// Whether this is a block comment
    pub is_multi_line: bool,
}

impl CommentRange {
    pub fn new(pos: u32, end: u32, is_multi_line: bool) -> Self {
        CommentRange {
            pos,
            end,
            is_multi_line,
        }
    }

    /// Get the comment text from source.
    pub fn get_text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.pos as usize..self.end as usize).unwrap_or("")
    }
}

#[inline]
fn is_whitespace_byte(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\r' | b'\n' | 0x0c)
}

/// Return the end of a `/* ... */` comment starting at `pos`, honoring nesting.
/// An unclosed comment runs to the end of input.
fn block_comment_end(bytes: &[u8], pos: usize) -> usize {
    let len = bytes.len();
    let mut depth = 0usize;
    let mut i = pos;
    while i < len {
        if bytes[i] == b'/' && i + 1 < len && bytes[i + 1] == b'*' {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'*' && i + 1 < len && bytes[i + 1] == b'/' {
            depth = depth.saturating_sub(1);
            i += 2;
            if depth == 0 {
                return i;
            }
        } else {
            i += 1;
        }
    }
    len
}

/// Scan one comment starting at `pos`, returning its end if there is one.
fn comment_end(bytes: &[u8], pos: usize) -> Option<(usize, bool)> {
    if bytes.get(pos) != Some(&b'/') {
        return None;
    }
    match bytes.get(pos + 1) {
        Some(b'/') => {
            let mut end = pos + 2;
            while end < bytes.len() && bytes[end] != b'\n' && bytes[end] != b'\r' {
                end += 1;
            }
            Some((end, false))
        }
        Some(b'*') => Some((block_comment_end(bytes, pos), true)),
        _ => None,
    }
}

/// Find the end of the trivia (whitespace and comments) run starting at `pos`.
pub fn skip_trivia(source: &str, pos: usize) -> usize {
    let bytes = source.as_bytes();
    let mut i = pos;
    while i < bytes.len() {
        if is_whitespace_byte(bytes[i]) {
            i += 1;
            continue;
        }
        match comment_end(bytes, i) {
            Some((end, _)) => i = end,
            None => break,
        }
    }
    i
}

/// Extract all comment ranges from a trivia string.
pub fn get_comment_ranges(trivia: &str) -> Vec<CommentRange> {
    let bytes = trivia.as_bytes();
    let mut comments = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if let Some((end, is_multi_line)) = comment_end(bytes, i) {
            comments.push(CommentRange::new(i as u32, end as u32, is_multi_line));
            i = end;
        } else {
            i += 1;
        }
    }
    comments
}

/// Whether a trivia string contains a line break outside of comments.
pub fn has_line_break(trivia: &str) -> bool {
    let bytes = trivia.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\n' || bytes[i] == b'\r' {
            return true;
        }
        match comment_end(bytes, i) {
            Some((end, true)) => i = end,
            _ => i += 1,
        }
    }
    false
}

/// Check if a comment is a KDoc comment.
pub fn is_kdoc_comment(comment: &CommentRange, source: &str) -> bool {
    let text = comment.get_text(source);
    text.starts_with("/**") && !text.starts_with("/**/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_trivia_nested_block() {
        let src = "  /* a /* b */ c */ // tail\n  x";
        let end = skip_trivia(src, 0);
        assert_eq!(&src[end..], "x");
    }

    #[test]
    fn test_comment_ranges() {
        let trivia = " // one\n /** two */ ";
        let ranges = get_comment_ranges(trivia);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].get_text(trivia), "// one");
        assert!(!ranges[0].is_multi_line);
        assert_eq!(ranges[1].get_text(trivia), "/** two */");
        assert!(is_kdoc_comment(&ranges[1], trivia));
    }

    #[test]
    fn test_line_break_ignores_block_comment_contents() {
        assert!(!has_line_break(" /* a\n b */ "));
        assert!(has_line_break(" // a\n"));
        assert!(has_line_break("\n"));
    }

    #[test]
    fn test_unclosed_block_comment_runs_to_end() {
        let src = "/* never closed";
        assert_eq!(skip_trivia(src, 0), src.len());
    }
}

//! Human-readable output: diagnostics with a source snippet, and the
//! `--dump` listing of attributed accesses.

use ktlst_checker::{AccessInfo, AttributedUnit};
use ktlst_common::{Diagnostic, DiagnosticCategory, LineMap, Position};
use rustc_hash::FxHashMap;

pub struct Reporter {
    color: bool,
    sources: FxHashMap<String, (String, LineMap)>,
}

impl Reporter {
    pub fn new(color: bool) -> Reporter {
        Reporter {
            color,
            sources: FxHashMap::default(),
        }
    }

    /// Register the text of a unit so its diagnostics get positions and
    /// snippets.
    pub fn add_source(&mut self, file: &str, text: &str) {
        self.sources
            .insert(file.to_string(), (text.to_string(), LineMap::build(text)));
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics
            .iter()
            .map(|diagnostic| self.format_diagnostic(diagnostic))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `file:line:col - error KT1001: message`, followed by the source line
    /// with the span underlined.
    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let location = self
            .position(&diagnostic.file, diagnostic.start)
            .map(|p| format!("{}:{}:{}", diagnostic.file, p.line + 1, p.character + 1))
            .unwrap_or_else(|| diagnostic.file.clone());
        let category = match diagnostic.category {
            DiagnosticCategory::Error => self.paint("error", Style::Error),
            DiagnosticCategory::Warning => self.paint("warning", Style::Warning),
            DiagnosticCategory::Suggestion => "suggestion".to_string(),
            DiagnosticCategory::Message => "message".to_string(),
        };
        let code = self.paint(&diagnostic.code_string(), Style::Code);

        let mut output = format!("{location} - {category} {code}: {}", diagnostic.message_text);
        if let Some(snippet) = self.format_snippet(&diagnostic.file, diagnostic.start, diagnostic.length) {
            output.push_str(&snippet);
        }
        output
    }

    fn format_snippet(&self, file: &str, start: u32, length: u32) -> Option<String> {
        if length == 0 {
            return None;
        }
        let (source, _) = self.sources.get(file)?;
        let position = self.position(file, start)?;
        let line_text = source.lines().nth(position.line as usize)?;

        let column = position.character as usize;
        let mut underline = String::new();
        for (i, ch) in line_text.char_indices() {
            if i < column {
                underline.push_str(if ch == '\t' { "    " } else { " " });
            } else if i < column + length as usize {
                underline.push('~');
            } else {
                break;
            }
        }
        if !underline.contains('~') {
            underline.push('~');
        }
        let underline = self.paint(&underline, Style::Underline);
        Some(format!("\n  {:>3}   {line_text}\n        {underline}", position.line + 1))
    }

    /// One line per attributed access:
    /// `line:col name : type owner=<owner> [platform] [synthetic]`.
    pub fn dump_unit(&self, unit: &AttributedUnit) -> Vec<String> {
        unit.accesses()
            .map(|access| {
                let start = name_offset(unit, access);
                let position = self
                    .position(unit.file_name(), start)
                    .unwrap_or(Position::new(0, start));
                format_access(position, access)
            })
            .collect()
    }

    fn position(&self, file: &str, offset: u32) -> Option<Position> {
        self.sources.get(file).map(|(_, map)| map.position(offset))
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color { style.apply(text) } else { text.to_string() }
    }
}

#[derive(Clone, Copy)]
enum Style {
    Error,
    Warning,
    Code,
    Underline,
}

impl Style {
    #[cfg(feature = "cli")]
    fn apply(self, text: &str) -> String {
        use colored::Colorize;
        match self {
            Style::Error => text.red().bold().to_string(),
            Style::Warning => text.yellow().bold().to_string(),
            Style::Code => text.dimmed().to_string(),
            Style::Underline => text.red().to_string(),
        }
    }

    /// Without the `cli` feature there is no terminal styling.
    #[cfg(not(feature = "cli"))]
    fn apply(self, text: &str) -> String {
        text.to_string()
    }
}

/// Start of the member name of an access, or of the node itself.
fn name_offset(unit: &AttributedUnit, access: &AccessInfo) -> u32 {
    let arena = unit.arena();
    arena
        .get(access.node)
        .and_then(|node| arena.get_access_expr(node))
        .map(|data| arena.span_of(data.name).start)
        .unwrap_or_else(|| arena.span_of(access.node).start)
}

pub fn format_access(position: Position, access: &AccessInfo) -> String {
    let mut line = format!(
        "{}:{} {} : {} owner={}",
        position.line + 1,
        position.character + 1,
        access.simple_name,
        access.resolved_type,
        access.resolved_owner().unwrap_or("<none>"),
    );
    if access.is_platform_type {
        line.push_str(" [platform]");
    }
    if access.is_synthetic() {
        line.push_str(" [synthetic]");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_with_snippet() {
        let mut reporter = Reporter::new(false);
        reporter.add_source("a.kt", "val x = 1\nval y = x . nope\n");
        let diagnostic = Diagnostic::from_code("a.kt", 22, 4, 1001, &["nope", "kotlin.Int"]);
        let text = reporter.format_diagnostic(&diagnostic);
        assert_eq!(
            text,
            "a.kt:2:13 - error KT1001: Unresolved member 'nope' on type 'kotlin.Int'.\n    2   val y = x . nope\n                    ~~~~"
        );
    }

    #[cfg(not(feature = "cli"))]
    #[test]
    fn test_library_build_never_styles() {
        let reporter = Reporter::new(true);
        let diagnostic = Diagnostic::from_code("b.kt", 0, 1, 1002, &["x"]);
        assert_eq!(
            reporter.format_diagnostic(&diagnostic),
            "b.kt - error KT1002: Unresolved reference 'x'."
        );
    }

    #[test]
    fn test_unknown_file_has_no_position() {
        let reporter = Reporter::new(false);
        let diagnostic = Diagnostic::from_code("b.kt", 0, 1, 1002, &["x"]);
        assert!(reporter.format_diagnostic(&diagnostic).starts_with("b.kt - error KT1002"));
    }
}

//! Diagnostic types and message lookup.
//!
//! Diagnostics never abort a parse: they are collected next to the tree so
//! that a lossless, attributed tree is always produced.

use serde::Serialize;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const UNRESOLVED_MEMBER: u32 = 1001;
    pub const UNRESOLVED_REFERENCE: u32 = 1002;
    pub const UNSUPPORTED_SUPER_MEMBER: u32 = 1003;
    pub const NO_ENCLOSING_CLASS: u32 = 1004;
    pub const UNKNOWN_TYPE_REFERENCE: u32 = 1005;
    pub const UNPARSED_SOURCE: u32 = 1006;
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_MEMBER,
        category: DiagnosticCategory::Error,
        message: "Unresolved member '{0}' on type '{1}'.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_REFERENCE,
        category: DiagnosticCategory::Error,
        message: "Unresolved reference '{0}'.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNSUPPORTED_SUPER_MEMBER,
        category: DiagnosticCategory::Error,
        message: "Member '{0}' is not declared on superclass '{1}'.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::NO_ENCLOSING_CLASS,
        category: DiagnosticCategory::Error,
        message: "'{0}' is not allowed outside of a class.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNKNOWN_TYPE_REFERENCE,
        category: DiagnosticCategory::Error,
        message: "Unknown type '{0}'.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNPARSED_SOURCE,
        category: DiagnosticCategory::Warning,
        message: "Source could not be parsed and was kept verbatim.",
    },
];

/// A diagnostic attached to a byte range of one compilation unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
        }
    }

    /// Create a diagnostic from a registered code, filling the template.
    #[must_use]
    pub fn from_code(file: &str, start: u32, length: u32, code: u32, args: &[&str]) -> Self {
        let (category, template) = get_diagnostic_message(code)
            .map(|m| (m.category, m.message))
            .unwrap_or((DiagnosticCategory::Error, "{0}"));
        Self {
            file: file.to_string(),
            start,
            length,
            message_text: format_message(template, args),
            category,
            code,
        }
    }

    /// `KT1001`-style display code.
    pub fn code_string(&self) -> String {
        format!("KT{}", self.code)
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_formats_template() {
        let diag = Diagnostic::from_code(
            "Test.kt",
            4,
            2,
            diagnostic_codes::UNRESOLVED_MEMBER,
            &["id", "Test"],
        );
        assert_eq!(diag.message_text, "Unresolved member 'id' on type 'Test'.");
        assert_eq!(diag.category, DiagnosticCategory::Error);
        assert_eq!(diag.code_string(), "KT1001");
    }

    #[test]
    fn test_unknown_code_falls_back() {
        let diag = Diagnostic::from_code("a.kt", 0, 0, 9999, &["raw"]);
        assert_eq!(diag.message_text, "raw");
    }
}

//! Attribution errors.
//!
//! `ResolutionError`s never escape attribution: each one becomes a
//! `Diagnostic` on the unit and the offending node is typed `<unknown>`.
//! Callers only see `AttributionError`: cancellation, or a parse without
//! its bound unit.

use ktlst_common::diagnostics::diagnostic_codes;
use ktlst_common::{Diagnostic, Span};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("unresolved member '{name}' on type '{qualifier}'")]
    UnresolvedMember { name: String, qualifier: String },

    #[error("unresolved reference '{name}'")]
    UnresolvedReference { name: String },

    #[error("member '{name}' is not declared on superclass '{superclass}'")]
    UnsupportedSuperMember { name: String, superclass: String },

    #[error("'{keyword}' is not allowed outside of a class")]
    NoEnclosingClass { keyword: &'static str },

    #[error("unknown type '{name}'")]
    UnknownType { name: String },

    /// A chain segment names both a package and a type. The type wins; this
    /// is traced, never reported.
    #[error("'{segment}' names both a package and a type")]
    AmbiguousChainSegment { segment: String },
}

impl ResolutionError {
    /// Diagnostic code, or `None` for errors that are resolved by rule.
    pub fn code(&self) -> Option<u32> {
        match self {
            ResolutionError::UnresolvedMember { .. } => Some(diagnostic_codes::UNRESOLVED_MEMBER),
            ResolutionError::UnresolvedReference { .. } => {
                Some(diagnostic_codes::UNRESOLVED_REFERENCE)
            }
            ResolutionError::UnsupportedSuperMember { .. } => {
                Some(diagnostic_codes::UNSUPPORTED_SUPER_MEMBER)
            }
            ResolutionError::NoEnclosingClass { .. } => Some(diagnostic_codes::NO_ENCLOSING_CLASS),
            ResolutionError::UnknownType { .. } => Some(diagnostic_codes::UNKNOWN_TYPE_REFERENCE),
            ResolutionError::AmbiguousChainSegment { .. } => None,
        }
    }

    pub fn to_diagnostic(&self, file: &str, span: Span) -> Option<Diagnostic> {
        let code = self.code()?;
        let diagnostic = match self {
            ResolutionError::UnresolvedMember { name, qualifier } => {
                Diagnostic::from_code(file, span.start, span.len(), code, &[name.as_str(), qualifier.as_str()])
            }
            ResolutionError::UnresolvedReference { name } | ResolutionError::UnknownType { name } => {
                Diagnostic::from_code(file, span.start, span.len(), code, &[name.as_str()])
            }
            ResolutionError::UnsupportedSuperMember { name, superclass } => {
                Diagnostic::from_code(file, span.start, span.len(), code, &[name.as_str(), superclass.as_str()])
            }
            ResolutionError::NoEnclosingClass { keyword } => {
                Diagnostic::from_code(file, span.start, span.len(), code, &[*keyword])
            }
            ResolutionError::AmbiguousChainSegment { .. } => return None,
        };
        Some(diagnostic)
    }
}

/// Errors returned by the attribution entry points.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AttributionError {
    /// The caller cancelled; nothing of the unit is kept.
    #[error("attribution of '{file}' was cancelled")]
    Cancelled { file: String },

    /// No bound unit at the parse's position, or one for another file.
    #[error("'{file}' has no bound unit")]
    Unbound { file: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_messages() {
        let err = ResolutionError::UnresolvedMember {
            name: "nope".into(),
            qualifier: "a.Test".into(),
        };
        let diagnostic = err.to_diagnostic("a.kt", Span::new(4, 8)).unwrap();
        assert_eq!(diagnostic.code_string(), "KT1001");
        assert_eq!(diagnostic.message_text, "Unresolved member 'nope' on type 'a.Test'.");
        assert_eq!((diagnostic.start, diagnostic.length), (4, 4));

        let ambiguous = ResolutionError::AmbiguousChainSegment {
            segment: "a".into(),
        };
        assert!(ambiguous.to_diagnostic("a.kt", Span::at(0)).is_none());
    }
}

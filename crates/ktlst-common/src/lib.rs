//! Common types and utilities for the ktlst Kotlin LST parser.
//!
//! This crate provides foundational types used across all ktlst crates:
//! - String interning (`Atom`, `Interner`)
//! - Source spans (`Span`) and line/column mapping (`LineMap`)
//! - Trivia classification for the formatting carriers (`comments`)
//! - Diagnostics with stable codes
//! - Centralized limits

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Position types for line/column source locations
pub mod position;
pub use position::{LineMap, Position};

// Centralized limits and thresholds
pub mod limits;

// Comment and whitespace trivia
pub mod comments;

pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Diagnostics for LSL validation.
//!
//! Validation errors and warnings are converted to [`Diagnostic`] via the
//! [`ToDiagnostic`] trait, so the validator stays free of presentation
//! concerns. A [`DiagnosticCollector`] can be handed straight to the
//! validator as its listener.

pub mod codes;
pub mod convert;
pub mod formatter;
pub mod json;

use lsl_ast::Span;
use lsl_validate::{ValidationError, ValidationListener, ValidationWarning};
use serde::Serialize;

// ============================================================================
// Core Types
// ============================================================================

/// A diagnostic with enough context for display.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<ErrorCode>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

/// A labeled source span within a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub span: Span,
    pub style: LabelStyle,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// Where the problem is (red underline).
    Primary,
    /// A related location (blue underline).
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// A code like E0203 or W0001.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(pub String);

// ============================================================================
// Builder API
// ============================================================================

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(ErrorCode(code.into()));
        self
    }

    pub fn with_label(mut self, span: Span, style: LabelStyle, msg: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            style,
            message: Some(msg.into()),
        });
        self
    }

    pub fn with_primary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Primary, msg)
    }

    pub fn with_secondary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Secondary, msg)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// The first primary label's span, or the first label's.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|l| l.style == LabelStyle::Primary)
            .or(self.labels.first())
            .map(|l| l.span)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================================
// Conversion Trait
// ============================================================================

/// Convert a validation error or warning into a diagnostic.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}

// ============================================================================
// Collecting Listener
// ============================================================================

/// A [`ValidationListener`] that converts everything it receives.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl ValidationListener for DiagnosticCollector {
    fn error(&mut self, error: ValidationError) {
        self.diagnostics.push(error.to_diagnostic());
    }

    fn warning(&mut self, warning: ValidationWarning) {
        self.diagnostics.push(warning.to_diagnostic());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let d = Diagnostic::error("bad thing")
            .with_code("E0200")
            .with_secondary(Span::new(1, 2), "first")
            .with_primary(Span::new(5, 9), "here")
            .with_note("a note")
            .with_help("try this");
        assert_eq!(d.code, Some(ErrorCode("E0200".into())));
        assert_eq!(d.primary_span(), Some(Span::new(5, 9)));
        assert_eq!(d.notes, vec!["a note".to_string()]);
        assert_eq!(d.help.as_deref(), Some("try this"));
        assert!(d.is_error());
    }

    #[test]
    fn collector_counts_by_severity() {
        let mut collector = DiagnosticCollector::new();
        collector.error(ValidationError::undefined_variable("x", Span::new(0, 1)));
        collector.warning(ValidationWarning::new(
            lsl_validate::WarningKind::NoEffect,
            Span::new(2, 3),
        ));
        assert_eq!(collector.error_count(), 1);
        assert_eq!(collector.warning_count(), 1);
        assert!(collector.has_errors());
    }
}

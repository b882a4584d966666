// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Machine-readable diagnostic output.
//!
//! `lslc check --format json` emits one [`DiagnosticReport`] per script.

use serde::Serialize;

use lsl_ast::LineMap;

use crate::codes::ErrorCodeRegistry;
use crate::{Diagnostic, LabelStyle, Severity};

/// Top-level report for one validated script.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    pub version: u32,
    pub file: String,
    pub success: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SourceLocation {
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineCol>,
}

#[derive(Debug, Serialize)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonLabel {
    pub style: LabelStyle,
    pub location: SourceLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Build a report. Line/column positions are only filled in when source
/// text is available.
pub fn to_json_report(diagnostics: &[Diagnostic], source: Option<&str>, file: &str) -> DiagnosticReport {
    let line_map = source.map(LineMap::new);
    let registry = ErrorCodeRegistry::default();

    let locate = |start: usize, end: usize| SourceLocation {
        start,
        end,
        line: line_map.as_ref().map(|map| {
            let (line, column) = map.line_col(start);
            LineCol { line, column }
        }),
    };

    let diagnostics: Vec<JsonDiagnostic> = diagnostics
        .iter()
        .map(|d| {
            let code = d.code.as_ref().map(|c| c.0.clone());
            let category = code
                .as_deref()
                .and_then(|c| registry.get(c))
                .map(|info| info.category.to_string());
            JsonDiagnostic {
                severity: d.severity,
                code,
                category,
                message: d.message.clone(),
                location: d.primary_span().map(|s| locate(s.start, s.end)),
                labels: d
                    .labels
                    .iter()
                    .map(|l| JsonLabel {
                        style: l.style,
                        location: locate(l.span.start, l.span.end),
                        message: l.message.clone().filter(|m| !m.is_empty()),
                    })
                    .collect(),
                notes: d.notes.clone(),
                help: d.help.clone(),
            }
        })
        .collect();

    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        diagnostics,
        error_count,
        warning_count,
    }
}

pub fn to_json_string(report: &DiagnosticReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal formatter for diagnostics.
//!
//! ```text
//! error[E0201]: variable `x` is already defined in this scope
//!   --> door.lsl:7:17
//!    |
//!  5 |         integer x = 1;
//!    |                 - first defined here
//! ...
//!  7 |         integer x = 2;
//!    |                 ^ redefined here
//!    |
//!    = help: ...
//! ```
//!
//! Without source text, locations fall back to byte ranges.

use std::collections::BTreeMap;

use colored::Colorize;

use lsl_ast::LineMap;

use crate::{Diagnostic, LabelStyle, Severity};

/// Formats diagnostics for terminal output.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: Option<&'a str>,
    line_map: LineMap,
}

/// A source line with its labels.
struct AnnotatedLine {
    line_num: usize,
    text: String,
    annotations: Vec<Annotation>,
}

struct Annotation {
    col_start: usize,
    col_end: usize,
    style: LabelStyle,
    message: Option<String>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            file_name: None,
            line_map: LineMap::new(source),
        }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    fn file(&self) -> &str {
        self.file_name.unwrap_or("<script>")
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        let Some(primary) = diagnostic.primary_span() else {
            self.format_footer(&mut out, diagnostic);
            return out;
        };

        if self.source.is_empty() {
            out.push_str(&format!(
                "  {} {} @ {}..{}\n",
                "-->".blue(),
                self.file(),
                primary.start,
                primary.end
            ));
            for label in diagnostic.labels.iter().filter(|l| l.span != primary) {
                if let Some(msg) = label.message.as_deref().filter(|m| !m.is_empty()) {
                    out.push_str(&format!(
                        "   {} {}..{}: {}\n",
                        "-".blue(),
                        label.span.start,
                        label.span.end,
                        msg
                    ));
                }
            }
            self.format_footer(&mut out, diagnostic);
            return out;
        }

        let (line, col) = self.line_map.line_col(primary.start);
        out.push_str(&format!("  {} {}:{}:{}\n", "-->".blue(), self.file(), line, col));

        let annotated = self.collect_annotated_lines(diagnostic);
        let max_line = annotated.last().map(|a| a.line_num).unwrap_or(1);
        let gutter_width = max_line.to_string().len().max(2);

        out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
        let mut prev_line: Option<usize> = None;
        for annotated_line in &annotated {
            if let Some(prev) = prev_line {
                if annotated_line.line_num > prev + 1 {
                    out.push_str(&format!("{}\n", "...".blue()));
                }
            }
            out.push_str(&format!(
                "{:>width$} {} {}\n",
                annotated_line.line_num.to_string().blue().bold(),
                "|".blue(),
                annotated_line.text,
                width = gutter_width + 1,
            ));
            format_annotations(&mut out, annotated_line, gutter_width);
            prev_line = Some(annotated_line.line_num);
        }

        if !diagnostic.notes.is_empty() || diagnostic.help.is_some() {
            out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
        }
        self.format_footer(&mut out, diagnostic);
        out
    }

    /// Format every diagnostic, separated by blank lines.
    pub fn format_all(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics
            .iter()
            .map(|d| self.format(d))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Note => "note".blue().bold(),
        };

        match &diagnostic.code {
            Some(code) => out.push_str(&format!(
                "{}[{}]: {}\n",
                severity,
                code.0.as_str().bold(),
                diagnostic.message.bold()
            )),
            None => out.push_str(&format!("{}: {}\n", severity, diagnostic.message.bold())),
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic) {
        for note in &diagnostic.notes {
            out.push_str(&format!("   {} {}: {}\n", "=".cyan(), "note".cyan().bold(), note));
        }
        if let Some(help) = &diagnostic.help {
            out.push_str(&format!("   {} {}: {}\n", "=".cyan(), "help".cyan().bold(), help));
        }
    }

    fn collect_annotated_lines(&self, diagnostic: &Diagnostic) -> Vec<AnnotatedLine> {
        let mut lines: BTreeMap<usize, AnnotatedLine> = BTreeMap::new();

        for label in &diagnostic.labels {
            let (line_num, col_start) = self.line_map.line_col(label.span.start);
            let (end_line, col_end) = self.line_map.line_col(label.span.end);
            let text = self.line_map.line_text(self.source, line_num).unwrap_or("");

            // Multi-line spans underline to the end of the first line.
            let col_end = if end_line == line_num {
                col_end
            } else {
                text.len() + 1
            };

            lines
                .entry(line_num)
                .or_insert_with(|| AnnotatedLine {
                    line_num,
                    text: text.to_string(),
                    annotations: Vec::new(),
                })
                .annotations
                .push(Annotation {
                    col_start,
                    col_end: col_end.max(col_start + 1),
                    style: label.style,
                    message: label.message.clone().filter(|m| !m.is_empty()),
                });
        }

        lines.into_values().collect()
    }
}

fn format_annotations(out: &mut String, line: &AnnotatedLine, gutter_width: usize) {
    let mut sorted: Vec<&Annotation> = line.annotations.iter().collect();
    sorted.sort_by_key(|a| (a.style == LabelStyle::Secondary, a.col_start));

    let width = sorted.iter().map(|a| a.col_end).max().unwrap_or(1);
    let mut underline = vec![' '; width];
    let mut messages: Vec<(usize, LabelStyle, &str)> = Vec::new();

    // Secondary first so primary carets win where they overlap.
    for ann in sorted.iter().rev() {
        let ch = match ann.style {
            LabelStyle::Primary => '^',
            LabelStyle::Secondary => '-',
        };
        for slot in &mut underline[ann.col_start - 1..ann.col_end - 1] {
            *slot = ch;
        }
    }
    for ann in &sorted {
        if let Some(msg) = &ann.message {
            messages.push((ann.col_start, ann.style, msg));
        }
    }

    let underline: String = underline.into_iter().collect();
    let underline = underline.trim_end();
    let pad = " ".repeat(gutter_width + 1);

    match messages.as_slice() {
        [] => out.push_str(&format!("{} {} {}\n", pad, "|".blue(), color_underline(underline))),
        [(_, style, msg)] => out.push_str(&format!(
            "{} {} {} {}\n",
            pad,
            "|".blue(),
            color_underline(underline),
            style_message(*style, msg)
        )),
        _ => {
            out.push_str(&format!("{} {} {}\n", pad, "|".blue(), color_underline(underline)));
            for (col, style, msg) in messages.iter().rev() {
                out.push_str(&format!(
                    "{} {} {}{} {}\n",
                    pad,
                    "|".blue(),
                    " ".repeat(col.saturating_sub(1)),
                    style_message(*style, "|"),
                    style_message(*style, msg),
                ));
            }
        }
    }
}

fn style_message(style: LabelStyle, msg: &str) -> String {
    match style {
        LabelStyle::Primary => msg.red().bold().to_string(),
        LabelStyle::Secondary => msg.blue().to_string(),
    }
}

/// Color runs of `^` red and runs of `-` blue.
fn color_underline(s: &str) -> String {
    let mut result = String::new();
    let mut run = String::new();
    let mut current = None;

    for ch in s.chars() {
        if Some(ch) != current && !run.is_empty() {
            result.push_str(&flush_run(&run, current));
            run.clear();
        }
        run.push(ch);
        current = Some(ch);
    }
    if !run.is_empty() {
        result.push_str(&flush_run(&run, current));
    }
    result
}

fn flush_run(run: &str, kind: Option<char>) -> String {
    match kind {
        Some('^') => run.red().bold().to_string(),
        Some('-') => run.blue().to_string(),
        _ => run.to_string(),
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Loading and validating a serialized tree.

use std::fs;
use std::process;

use lsl_ast::Script;
use lsl_diagnostics::{Diagnostic, DiagnosticCollector};
use lsl_library::StaticLibrary;
use lsl_validate::{ValidatedScript, Validator};

use crate::{output, show_diagnostics, Format, Options};

/// A validated script with everything reported about it.
pub struct Checked {
    pub script: ValidatedScript,
    pub diagnostics: Vec<Diagnostic>,
    pub source: Option<String>,
}

impl Checked {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }
}

fn read_file(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: reading {}: {}", output::error_label(), output::file_path(path), e);
            process::exit(1);
        }
    }
}

/// The standard catalog, extended by `--library` when given.
fn load_library(opts: &Options) -> StaticLibrary {
    let mut library = StaticLibrary::standard();
    if let Some(path) = &opts.library {
        match StaticLibrary::from_json(&read_file(path)) {
            Ok(extra) => library.merge(extra),
            Err(e) => {
                eprintln!("{}: {}: {}", output::error_label(), output::file_path(path), e);
                process::exit(1);
            }
        }
    }
    library
}

/// Read, deserialize and validate `path`. Exits on I/O or format failures.
pub fn validate_file(path: &str, opts: &Options) -> Checked {
    let tree: Script = match serde_json::from_str(&read_file(path)) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("{}: {} is not a valid syntax tree: {}", output::error_label(), output::file_path(path), e);
            process::exit(1);
        }
    };
    let source = opts.source.as_deref().map(read_file);
    let library = load_library(opts);

    let mut validator = Validator::new(&library);
    let mut collector = DiagnosticCollector::new();
    let script = match validator.validate(&tree, &mut collector) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("{}: {}", output::error_label(), e);
            process::exit(1);
        }
    };
    tracing::debug!(
        path,
        nodes = script.tree.len(),
        diagnostics = collector.diagnostics.len(),
        "validated"
    );

    Checked {
        script,
        diagnostics: collector.into_diagnostics(),
        source,
    }
}

pub fn cmd_check(path: &str, opts: &Options) {
    let checked = validate_file(path, opts);
    show_diagnostics(&checked.diagnostics, checked.source.as_deref(), path, opts.format);

    let errors = checked.error_count();
    if opts.format == Format::Human {
        let warnings = checked.warning_count();
        if errors > 0 {
            eprintln!("\n{}", output::banner_fail("Check", errors));
        } else if warnings > 0 {
            eprintln!("\n{} ({})", output::banner_ok("Check"), output::warning_count(warnings));
        } else {
            println!("{}", output::banner_ok("Check"));
        }
    }
    if errors > 0 {
        process::exit(1);
    }
}

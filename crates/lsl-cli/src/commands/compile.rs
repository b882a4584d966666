// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `lslc compile`: validation followed by C# generation.

use std::fs::File;
use std::io::{self, BufWriter};
use std::process;

use lsl_codegen::{CSharpGenerator, CompilerSettings};

use super::check::validate_file;
use crate::{output, show_diagnostics, Format, Options};

/// Generator settings for the given flags.
pub fn settings_from(opts: &Options) -> CompilerSettings {
    let mut settings = if opts.server {
        CompilerSettings::opensim_server()
    } else {
        CompilerSettings::default()
    };
    if let Some(class) = &opts.class {
        settings = settings.with_class(class);
    }
    if let Some(ns) = &opts.namespace {
        settings = settings.with_namespace(ns);
    }
    if opts.coop {
        settings = settings.with_coop_termination();
    }
    settings
}

pub fn cmd_compile(path: &str, opts: &Options) {
    let checked = validate_file(path, opts);
    // stdout may carry the generated code
    let format = if opts.output.is_none() { Format::Human } else { opts.format };
    show_diagnostics(&checked.diagnostics, checked.source.as_deref(), path, format);

    if checked.script.has_errors {
        if format == Format::Human {
            eprintln!("\n{}", output::banner_fail("Compile", checked.error_count()));
        }
        process::exit(1);
    }

    let mut generator = CSharpGenerator::new(settings_from(opts));
    let result = match &opts.output {
        Some(out) => match File::create(out) {
            Ok(file) => generator.write_to(&checked.script, &mut BufWriter::new(file)),
            Err(e) => {
                eprintln!("{}: creating {}: {}", output::error_label(), output::file_path(out), e);
                process::exit(1);
            }
        },
        None => generator.write_to(&checked.script, &mut io::stdout().lock()),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", output::error_label(), e);
        process::exit(1);
    }
    if let Some(out) = &opts.output {
        if format == Format::Human {
            eprintln!("{} {}", output::banner_ok("Compile"), output::file_path(out));
        }
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! lslc - validate parsed LSL scripts and generate C#.

mod commands;
mod help;
mod output;

use std::env;
use std::process;

use lsl_diagnostics::formatter::DiagnosticFormatter;
use lsl_diagnostics::json::{to_json_report, to_json_string};
use lsl_diagnostics::Diagnostic;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Diagnostic output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Human,
    Json,
}

/// Flags shared by the commands.
#[derive(Debug, Default)]
pub struct Options {
    pub input: Option<String>,
    pub library: Option<String>,
    pub source: Option<String>,
    pub output: Option<String>,
    pub class: Option<String>,
    pub namespace: Option<String>,
    pub coop: bool,
    pub server: bool,
    pub format: Format,
    pub help: bool,
}

impl Options {
    fn parse(args: &[String]) -> Result<Options, String> {
        let mut opts = Options::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| format!("{} requires a value", flag))
            };
            match arg.as_str() {
                "--library" => opts.library = Some(value(arg)?),
                "--source" => opts.source = Some(value(arg)?),
                "-o" | "--output" => opts.output = Some(value(arg)?),
                "--class" => opts.class = Some(value(arg)?),
                "--namespace" => opts.namespace = Some(value(arg)?),
                "--format" => {
                    opts.format = match value(arg)?.as_str() {
                        "json" => Format::Json,
                        "human" => Format::Human,
                        other => return Err(format!("unknown format '{}'", other)),
                    }
                }
                "--json" => opts.format = Format::Json,
                "--coop" => opts.coop = true,
                "--server" => opts.server = true,
                "-h" | "--help" => opts.help = true,
                flag if flag.starts_with('-') => return Err(format!("unknown option '{}'", flag)),
                positional => {
                    if opts.input.is_some() {
                        return Err(format!("unexpected argument '{}'", positional));
                    }
                    opts.input = Some(positional.to_string());
                }
            }
        }
        Ok(opts)
    }
}

fn main() {
    output::init();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        help::print_usage();
        return;
    }

    let opts = match Options::parse(&args[2..]) {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("{}: {}", output::error_label(), msg);
            process::exit(1);
        }
    };

    match args[1].as_str() {
        "check" => {
            if opts.help {
                help::print_check_help();
                return;
            }
            let path = require_input(&opts, "lslc check <tree.json>");
            commands::check::cmd_check(&path, &opts);
        }
        "compile" => {
            if opts.help {
                help::print_compile_help();
                return;
            }
            let path = require_input(&opts, "lslc compile <tree.json> [-o out.cs]");
            commands::compile::cmd_compile(&path, &opts);
        }
        "explain" => {
            if opts.help {
                help::print_explain_help();
                return;
            }
            commands::explain::cmd_explain(opts.input.as_deref());
        }
        "help" | "--help" | "-h" => help::print_usage(),
        "version" | "--version" | "-V" => println!("lslc {}", help::VERSION),
        other => {
            eprintln!("{}: unknown command '{}'", output::error_label(), other);
            help::print_usage();
            process::exit(1);
        }
    }
}

fn require_input(opts: &Options, usage: &str) -> String {
    match &opts.input {
        Some(path) => path.clone(),
        None => {
            eprintln!("Usage: {}", usage);
            process::exit(1);
        }
    }
}

/// Print diagnostics in the selected format.
///
/// Human output goes to stderr; the JSON report goes to stdout.
pub fn show_diagnostics(diagnostics: &[Diagnostic], source: Option<&str>, path: &str, format: Format) {
    match format {
        Format::Human => {
            if diagnostics.is_empty() {
                return;
            }
            let formatter = DiagnosticFormatter::new(source.unwrap_or("")).with_file_name(path);
            eprint!("{}", formatter.format_all(diagnostics));
        }
        Format::Json => {
            let report = to_json_report(diagnostics, source, path);
            match to_json_string(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("{}: serializing report: {}", output::error_label(), e);
                    process::exit(1);
                }
            }
        }
    }
}

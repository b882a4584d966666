// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Help text for CLI commands.

use colored::Colorize;
use crate::output;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_usage() {
    println!(
        "{} {} - LSL validator and C# code generator",
        output::title("lslc"),
        output::version(VERSION)
    );
    println!();
    println!(
        "{}: {} {} {}",
        output::section_header("Usage"),
        output::command("lslc"),
        output::arg("<command>"),
        output::arg("[args]")
    );
    println!();
    println!("{}", output::section_header("Commands:"));
    println!("  {} {}     Validate a parsed script and report diagnostics", output::command("check"), output::arg("<tree.json>"));
    println!("  {} {}   Validate and generate C#", output::command("compile"), output::arg("<tree.json>"));
    println!("  {} {}      Explain a diagnostic code", output::command("explain"), output::arg("<code>"));
    println!("  {}                  Show this help", output::command("help"));
    println!("  {}               Show version", output::command("version"));
    println!();
    println!("{}", output::section_header("Input:"));
    println!("  A JSON-serialized syntax tree produced by an LSL front end.");
    println!();
    println!("{}", output::section_header("Environment:"));
    println!("  {}   Log filter, e.g. {}", output::arg("RUST_LOG"), output::arg("lsl_validate=debug"));
    println!("  {}   Disable colored output", output::arg("NO_COLOR"));
}

pub fn print_check_help() {
    println!("{}", output::section_header("Check"));
    println!();
    println!("Validate a script and print its diagnostics.");
    println!("Exits with status 1 when any error is reported.");
    println!();
    println!("{}: {} {} {} {}", "Usage".yellow(),
        output::command("lslc"),
        output::command("check"),
        output::arg("<tree.json>"),
        output::arg("[options]"));
    println!();
    println!("{}", output::section_header("Options:"));
    println!("  {} {}   Add library functions, constants and events", output::arg("--library"), output::arg("<file>"));
    println!("  {} {}      Output format: human (default) or json", output::arg("--format"), output::arg("<fmt>"));
    println!("  {} {}    Script text, for source lines in diagnostics", output::arg("--source"), output::arg("<file>"));
}

pub fn print_compile_help() {
    println!("{}", output::section_header("Compile"));
    println!();
    println!("Validate a script and write the generated C# code.");
    println!("Nothing is generated when validation reports errors.");
    println!();
    println!("{}: {} {} {} {}", "Usage".yellow(),
        output::command("lslc"),
        output::command("compile"),
        output::arg("<tree.json>"),
        output::arg("[options]"));
    println!();
    println!("{}", output::section_header("Options:"));
    println!("  {} {}          Write to a file instead of stdout", output::arg("-o"), output::arg("<file>"));
    println!("  {} {}   Add library functions, constants and events", output::arg("--library"), output::arg("<file>"));
    println!("  {} {}     Wrap the output in a class", output::arg("--class"), output::arg("<name>"));
    println!("  {} {}   Namespace for the class", output::arg("--namespace"), output::arg("<ns>"));
    println!("  {}              Start from the OpenSim server preset", output::arg("--server"));
    println!("  {}                Insert co-operative termination checks", output::arg("--coop"));
    println!("  {} {}    Script text, for source lines in diagnostics", output::arg("--source"), output::arg("<file>"));
}

pub fn print_explain_help() {
    println!("{}", output::section_header("Explain"));
    println!();
    println!("Show the title and category of a diagnostic code.");
    println!("Without a code, lists every known code.");
    println!();
    println!("{}: {} {} {}", "Usage".yellow(),
        output::command("lslc"),
        output::command("explain"),
        output::arg("[code]"));
}

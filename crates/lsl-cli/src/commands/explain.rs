// SPDX-License-Identifier: (MIT OR Apache-2.0)

use std::process;

use lsl_diagnostics::codes::ErrorCodeRegistry;

use crate::output;

pub fn cmd_explain(code: Option<&str>) {
    let registry = ErrorCodeRegistry::default();
    let Some(code) = code else {
        for info in registry.all() {
            println!("{}  {:<14} {}", output::code(info.code), info.category.to_string(), info.title);
        }
        return;
    };

    let code = code.to_ascii_uppercase();
    match registry.get(&code) {
        Some(info) => {
            let kind = if code.starts_with('W') {
                output::warning_label()
            } else {
                output::error_label()
            };
            println!("{}[{}]: {}", kind, output::code(info.code), info.title);
            println!("  category: {}", info.category);
        }
        None => {
            eprintln!("{}: unknown code '{}'", output::error_label(), code);
            process::exit(1);
        }
    }
}

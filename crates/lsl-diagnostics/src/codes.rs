// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps codes (E0200, W0001, ...) to titles and categories.
//! Used by `lslc explain <code>` and the JSON report.

use std::collections::HashMap;

/// Registry of all known codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Resolution,
    Type,
    ControlFlow,
    StaticContext,
    Lint,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Resolution => write!(f, "Resolution"),
            ErrorCategory::Type => write!(f, "Type"),
            ErrorCategory::ControlFlow => write!(f, "ControlFlow"),
            ErrorCategory::StaticContext => write!(f, "StaticContext"),
            ErrorCategory::Lint => write!(f, "Lint"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                // Names and declarations (E02xx)
                "E0200" => ("undefined variable", Resolution),
                "E0201" => ("variable redefined", Resolution),
                "E0202" => ("parameter redefined", Resolution),
                "E0203" => ("function redefined", Resolution),
                "E0204" => ("library function redefined", Resolution),
                "E0205" => ("library constant redefined", Resolution),
                "E0206" => ("label redefined", Resolution),
                "E0207" => ("jump to undefined label", Resolution),
                "E0208" => ("undefined function", Resolution),
                "E0209" => ("state redefined", Resolution),
                "E0210" => ("default state redefined", Resolution),
                "E0211" => ("missing default state", Resolution),
                "E0212" => ("state change to undefined state", Resolution),
                "E0213" => ("event handler redefined", Resolution),
                "E0214" => ("unknown event handler", Resolution),
                "E0215" => ("state has no event handlers", Resolution),
                "E0216" => ("variable declared in braceless body", Resolution),

                // Types (E03xx)
                "E0300" => ("invalid binary operation", Type),
                "E0301" => ("invalid prefix operation", Type),
                "E0302" => ("invalid postfix operation", Type),
                "E0303" => ("invalid cast", Type),
                "E0304" => ("type mismatch in declaration", Type),
                "E0305" => ("argument count mismatch", Type),
                "E0306" => ("argument type mismatch", Type),
                "E0307" => ("no matching overload", Type),
                "E0308" => ("ambiguous overload", Type),
                "E0309" => ("invalid vector or rotation component", Type),
                "E0310" => ("invalid list element", Type),
                "E0311" => ("invalid condition type", Type),
                "E0313" => ("incorrect event signature", Type),
                "E0314" => ("invalid component access", Type),
                "E0315" => ("library constant modified", Type),
                "E0316" => ("expression is not assignable", Type),
                "E0317" => ("invalid string escape", Type),

                // Control flow (E04xx)
                "E0400" => ("return value from event handler", ControlFlow),
                "E0401" => ("return value from void function", ControlFlow),
                "E0402" => ("return type mismatch", ControlFlow),
                "E0403" => ("missing return value", ControlFlow),
                "E0404" => ("not all code paths return a value", ControlFlow),
                "E0405" => ("dead code after return path", ControlFlow),

                // Global initializers (E05xx)
                "E0500" => ("not allowed in a global initializer", StaticContext),

                // Warnings (W00xx)
                "W0001" => ("unreachable code", Lint),
                "W0002" => ("deprecated library function", Lint),
                "W0003" => ("deprecated library constant", Lint),
                "W0004" => ("deprecated event", Lint),
                "W0005" => ("unused function", Lint),
                "W0006" => ("unused global variable", Lint),
                "W0007" => ("unused local variable", Lint),
                "W0008" => ("unused parameter", Lint),
                "W0009" => ("local hides parameter", Lint),
                "W0010" => ("local hides global", Lint),
                "W0011" => ("parameter hides global", Lint),
                "W0012" => ("constant condition", Lint),
                "W0013" => ("expression has no effect", Lint),
                "W0014" => ("unnecessary semicolon", Lint),
                "W0015" => ("redundant cast", Lint),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    /// Every code, sorted.
    pub fn all(&self) -> Vec<&ErrorCodeInfo> {
        let mut all: Vec<&ErrorCodeInfo> = self.codes.values().collect();
        all.sort_by_key(|info| info.code);
        all
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

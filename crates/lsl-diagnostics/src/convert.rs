// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! ToDiagnostic implementations for validation errors and warnings.

use lsl_validate::{
    DeadCodeType, ValidationError, ValidationErrorKind, ValidationWarning, WarningKind,
};

use crate::{Diagnostic, ToDiagnostic};

impl ToDiagnostic for ValidationError {
    fn to_diagnostic(&self) -> Diagnostic {
        use ValidationErrorKind::*;

        let base = Diagnostic::error(self.kind.to_string()).with_code(self.code());
        let span = self.span;

        match &self.kind {
            VariableRedefined { previous, .. } => base
                .with_secondary(*previous, "first defined here")
                .with_primary(span, "redefined here"),
            FunctionRedefined { previous, .. } => base
                .with_secondary(*previous, "first defined here")
                .with_primary(span, "redefined here"),
            LabelRedefined { previous, .. } => base
                .with_secondary(*previous, "first defined here")
                .with_primary(span, "redefined here"),
            StateRedefined { previous, .. } => base
                .with_secondary(*previous, "first defined here")
                .with_primary(span, "redefined here"),

            UndefinedVariable { .. } => base.with_primary(span, "not found in this scope"),
            UndefinedFunction { .. } => base.with_primary(span, "not a user or library function"),
            JumpToUndefinedLabel { .. } => base
                .with_primary(span, "no visible label with this name")
                .with_note("labels are visible from their own block and any block nested in it"),

            LibraryFunctionRedefined { .. } | LibraryConstantRedefined { .. } => base
                .with_primary(span, "name is reserved by the library")
                .with_help("choose a different name"),

            MissingDefaultState => base
                .with_primary(span, "")
                .with_help("add `default { state_entry() { } }`"),
            StateHasNoEventHandlers { .. } => base
                .with_primary(span, "")
                .with_note("every state needs at least one event handler"),
            VariableInSingleStatementBlock { .. } => base
                .with_primary(span, "declared here")
                .with_help("wrap the body in braces"),

            IncorrectEventSignature { expected, .. } => base
                .with_primary(span, "signature does not match")
                .with_help(format!("declare it as `{expected}`")),

            ArgumentCountMismatch { expected, found, .. } => base.with_primary(
                span,
                format!("expected {expected} argument(s), found {found}"),
            ),
            ArgumentTypeMismatch { expected, .. } => {
                base.with_primary(span, format!("expected {expected}"))
            }
            AmbiguousOverload { .. } => base
                .with_primary(span, "")
                .with_help("add a cast to pick one overload"),

            NotAllCodePathsReturn { .. } => base
                .with_primary(span, "")
                .with_help("add a return statement at the end of the function"),
            DeadCodeAfterReturnPath { .. } => base
                .with_primary(span, "unreachable")
                .with_note("dead code in a function that returns a value is rejected"),

            NotAllowedInStaticContext { .. } => base
                .with_primary(span, "")
                .with_note("global initializers may only use literals and other globals"),

            InvalidStringEscape { .. } => base
                .with_primary(span, "")
                .with_note("valid escapes are \\n, \\t, \\\" and \\\\"),

            _ => base.with_primary(span, ""),
        }
    }
}

impl ToDiagnostic for ValidationWarning {
    fn to_diagnostic(&self) -> Diagnostic {
        use WarningKind::*;

        let base = Diagnostic::warning(self.kind.to_string()).with_code(self.code());
        let span = self.span;

        match &self.kind {
            DeadCode { reason } => {
                let d = base.with_primary(span, "never executed");
                match reason {
                    DeadCodeType::AfterJumpLoopForever => {
                        d.with_note("the jump above loops back unconditionally")
                    }
                    DeadCodeType::AfterJumpOutOfScope => {
                        d.with_note("the jump above leaves this block unconditionally")
                    }
                    _ => d,
                }
            }
            FunctionNeverUsed { .. } | GlobalNeverUsed { .. } | LocalNeverUsed { .. } => {
                base.with_primary(span, "").with_help("remove it")
            }
            ParameterNeverUsed { .. } => base.with_primary(span, ""),
            LocalHidesParameter { .. } | LocalHidesGlobal { .. } | ParameterHidesGlobal { .. } => {
                base.with_primary(span, "").with_help("consider renaming it")
            }
            UselessSemicolon => base.with_primary(span, "").with_help("remove the `;`"),
            RedundantCast { .. } => base.with_primary(span, "").with_help("remove the cast"),
            _ => base.with_primary(span, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LabelStyle, Severity};
    use lsl_ast::Span;

    #[test]
    fn redefinition_points_at_both_sites() {
        let e = ValidationError::variable_redefined("x", Span::new(30, 31), Span::new(10, 11));
        let d = e.to_diagnostic();
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.code.as_ref().map(|c| c.0.as_str()), Some("E0201"));
        assert_eq!(d.labels.len(), 2);
        assert_eq!(d.labels[0].style, LabelStyle::Secondary);
        assert_eq!(d.labels[0].span, Span::new(10, 11));
        assert_eq!(d.primary_span(), Some(Span::new(30, 31)));
    }

    #[test]
    fn dead_code_warning_carries_note() {
        let w = ValidationWarning::new(
            WarningKind::DeadCode {
                reason: DeadCodeType::AfterJumpLoopForever,
            },
            Span::new(4, 9),
        );
        let d = w.to_diagnostic();
        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.code.as_ref().map(|c| c.0.as_str()), Some("W0001"));
        assert_eq!(d.notes.len(), 1);
    }

    #[test]
    fn message_matches_display() {
        let e = ValidationError::undefined_function("foo", Span::new(0, 3));
        assert_eq!(e.to_diagnostic().message, "call to undefined function `foo`");
    }
}

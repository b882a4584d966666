// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Validation errors and warnings.

use lsl_ast::{BinaryOp, LslType, Span};
use thiserror::Error;

use crate::tree::{DeadCodeType, NodeId};

/// A semantic error found while validating a script.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub span: Span,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn undefined_variable(name: &str, span: Span) -> Self {
        Self::new(
            ValidationErrorKind::UndefinedVariable {
                name: name.to_string(),
            },
            span,
        )
    }

    pub fn variable_redefined(name: &str, span: Span, previous: Span) -> Self {
        Self::new(
            ValidationErrorKind::VariableRedefined {
                name: name.to_string(),
                previous,
            },
            span,
        )
    }

    pub fn undefined_function(name: &str, span: Span) -> Self {
        Self::new(
            ValidationErrorKind::UndefinedFunction {
                name: name.to_string(),
            },
            span,
        )
    }

    pub fn invalid_binary(op: BinaryOp, left: LslType, right: LslType, span: Span) -> Self {
        Self::new(ValidationErrorKind::InvalidBinaryOperation { op, left, right }, span)
    }

    pub fn static_context(what: &'static str, span: Span) -> Self {
        Self::new(ValidationErrorKind::NotAllowedInStaticContext { what }, span)
    }
}

/// The kind of validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationErrorKind {
    // Names and declarations
    #[error("undefined variable `{name}`")]
    UndefinedVariable { name: String },

    #[error("variable `{name}` is already defined in this scope")]
    VariableRedefined { name: String, previous: Span },

    #[error("parameter `{name}` is declared more than once")]
    ParameterRedefined { name: String },

    #[error("function `{name}` is already defined")]
    FunctionRedefined { name: String, previous: Span },

    #[error("function `{name}` redefines a library function")]
    LibraryFunctionRedefined { name: String },

    #[error("`{name}` redefines a library constant")]
    LibraryConstantRedefined { name: String },

    #[error("label `{name}` is already defined in this function or event")]
    LabelRedefined { name: String, previous: Span },

    #[error("jump to undefined label `{name}`")]
    JumpToUndefinedLabel { name: String },

    #[error("call to undefined function `{name}`")]
    UndefinedFunction { name: String },

    #[error("state `{name}` is already defined")]
    StateRedefined { name: String, previous: Span },

    #[error("the default state cannot be redefined")]
    DefaultStateRedefined,

    #[error("script has no default state")]
    MissingDefaultState,

    #[error("state change to undefined state `{name}`")]
    StateChangeToUndefined { name: String },

    #[error("event handler `{name}` is already defined in state `{state}`")]
    EventHandlerRedefined { name: String, state: String },

    #[error("`{name}` is not a known event")]
    UnknownEventHandler { name: String },

    #[error("state `{state}` has no event handlers")]
    StateHasNoEventHandlers { state: String },

    #[error("variable `{name}` cannot be declared as the body of a braceless statement")]
    VariableInSingleStatementBlock { name: String },

    // Types
    #[error("operator `{op}` cannot be applied to {left} and {right}")]
    InvalidBinaryOperation {
        op: BinaryOp,
        left: LslType,
        right: LslType,
    },

    #[error("prefix operator `{op}` cannot be applied to {operand}")]
    InvalidPrefix { op: &'static str, operand: LslType },

    #[error("postfix operator `{op}` cannot be applied to {operand}")]
    InvalidPostfix { op: &'static str, operand: LslType },

    #[error("cannot cast {from} to {to}")]
    InvalidCast { from: LslType, to: LslType },

    #[error("cannot initialize `{name}` of type {expected} with a value of type {found}")]
    TypeMismatchInDeclaration {
        name: String,
        expected: LslType,
        found: LslType,
    },

    #[error("`{name}` takes {expected} argument(s) but {found} were supplied")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {index} of `{name}` expects {expected} but found {found}")]
    ArgumentTypeMismatch {
        name: String,
        index: usize,
        expected: LslType,
        found: LslType,
    },

    #[error("no overload of `{name}` accepts ({})", format_types(args))]
    NoMatchingOverload { name: String, args: Vec<LslType> },

    #[error("call to `{name}` matches more than one overload")]
    AmbiguousOverload { name: String },

    #[error("{literal} components must be integer or float, found {found}")]
    InvalidVectorComponent {
        literal: &'static str,
        found: LslType,
    },

    #[error("list elements cannot be of type {found}")]
    InvalidListElement { found: LslType },

    #[error("condition of type {found} cannot be evaluated")]
    InvalidConditionType { found: LslType },

    #[error("event `{name}` must be declared as {expected}")]
    IncorrectEventSignature { name: String, expected: String },

    #[error("component `.{component}` is not available on {ty}")]
    InvalidComponentAccess { component: char, ty: LslType },

    #[error("library constant `{name}` cannot be modified")]
    ModifiedLibraryConstant { name: String },

    #[error("expression cannot be assigned to")]
    NotAssignable,

    #[error("invalid escape sequence `\\{escape}` in string literal")]
    InvalidStringEscape { escape: char },

    // Control flow
    #[error("event handlers cannot return a value")]
    ReturnValueFromEventHandler,

    #[error("function `{name}` returns void and cannot return a value")]
    ReturnValueFromVoidFunction { name: String },

    #[error("`{name}` must return {expected}, found {found}")]
    ReturnTypeMismatch {
        name: String,
        expected: LslType,
        found: LslType,
    },

    #[error("`{name}` must return a value of type {expected}")]
    MissingReturnValue { name: String, expected: LslType },

    #[error("not all code paths in `{name}` return a value")]
    NotAllCodePathsReturn { name: String },

    #[error("unreachable code after a return path in `{name}`")]
    DeadCodeAfterReturnPath { name: String },

    // Global initializers
    #[error("{what} is not allowed in a global variable initializer")]
    NotAllowedInStaticContext { what: &'static str },
}

fn format_types(types: &[LslType]) -> String {
    types
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrorKind {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        use ValidationErrorKind::*;
        match self {
            UndefinedVariable { .. } => "E0200",
            VariableRedefined { .. } => "E0201",
            ParameterRedefined { .. } => "E0202",
            FunctionRedefined { .. } => "E0203",
            LibraryFunctionRedefined { .. } => "E0204",
            LibraryConstantRedefined { .. } => "E0205",
            LabelRedefined { .. } => "E0206",
            JumpToUndefinedLabel { .. } => "E0207",
            UndefinedFunction { .. } => "E0208",
            StateRedefined { .. } => "E0209",
            DefaultStateRedefined => "E0210",
            MissingDefaultState => "E0211",
            StateChangeToUndefined { .. } => "E0212",
            EventHandlerRedefined { .. } => "E0213",
            UnknownEventHandler { .. } => "E0214",
            StateHasNoEventHandlers { .. } => "E0215",
            VariableInSingleStatementBlock { .. } => "E0216",
            InvalidBinaryOperation { .. } => "E0300",
            InvalidPrefix { .. } => "E0301",
            InvalidPostfix { .. } => "E0302",
            InvalidCast { .. } => "E0303",
            TypeMismatchInDeclaration { .. } => "E0304",
            ArgumentCountMismatch { .. } => "E0305",
            ArgumentTypeMismatch { .. } => "E0306",
            NoMatchingOverload { .. } => "E0307",
            AmbiguousOverload { .. } => "E0308",
            InvalidVectorComponent { .. } => "E0309",
            InvalidListElement { .. } => "E0310",
            InvalidConditionType { .. } => "E0311",
            IncorrectEventSignature { .. } => "E0313",
            InvalidComponentAccess { .. } => "E0314",
            ModifiedLibraryConstant { .. } => "E0315",
            NotAssignable => "E0316",
            InvalidStringEscape { .. } => "E0317",
            ReturnValueFromEventHandler => "E0400",
            ReturnValueFromVoidFunction { .. } => "E0401",
            ReturnTypeMismatch { .. } => "E0402",
            MissingReturnValue { .. } => "E0403",
            NotAllCodePathsReturn { .. } => "E0404",
            DeadCodeAfterReturnPath { .. } => "E0405",
            NotAllowedInStaticContext { .. } => "E0500",
        }
    }
}

/// A semantic warning.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct ValidationWarning {
    pub kind: WarningKind,
    pub span: Span,
}

impl ValidationWarning {
    pub fn new(kind: WarningKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WarningKind {
    #[error("unreachable {}", reason.describe())]
    DeadCode { reason: DeadCodeType },

    #[error("library function `{name}` is deprecated")]
    DeprecatedFunction { name: String },

    #[error("library constant `{name}` is deprecated")]
    DeprecatedConstant { name: String },

    #[error("event `{name}` is deprecated")]
    DeprecatedEvent { name: String },

    #[error("function `{name}` is never used")]
    FunctionNeverUsed { name: String },

    #[error("global variable `{name}` is never used")]
    GlobalNeverUsed { name: String },

    #[error("local variable `{name}` is never used")]
    LocalNeverUsed { name: String },

    #[error("parameter `{name}` is never used")]
    ParameterNeverUsed { name: String },

    #[error("local variable `{name}` hides a parameter")]
    LocalHidesParameter { name: String },

    #[error("local variable `{name}` hides a global variable")]
    LocalHidesGlobal { name: String },

    #[error("parameter `{name}` hides a global variable")]
    ParameterHidesGlobal { name: String },

    #[error("condition is always the same")]
    ConstantCondition,

    #[error("expression statement has no effect")]
    NoEffect,

    #[error("unnecessary semicolon")]
    UselessSemicolon,

    #[error("redundant cast to {ty}")]
    RedundantCast { ty: LslType },
}

impl WarningKind {
    pub fn code(&self) -> &'static str {
        use WarningKind::*;
        match self {
            DeadCode { .. } => "W0001",
            DeprecatedFunction { .. } => "W0002",
            DeprecatedConstant { .. } => "W0003",
            DeprecatedEvent { .. } => "W0004",
            FunctionNeverUsed { .. } => "W0005",
            GlobalNeverUsed { .. } => "W0006",
            LocalNeverUsed { .. } => "W0007",
            ParameterNeverUsed { .. } => "W0008",
            LocalHidesParameter { .. } => "W0009",
            LocalHidesGlobal { .. } => "W0010",
            ParameterHidesGlobal { .. } => "W0011",
            ConstantCondition => "W0012",
            NoEffect => "W0013",
            UselessSemicolon => "W0014",
            RedundantCast { .. } => "W0015",
        }
    }
}

/// A violated internal invariant. Never caused by malformed scripts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("node {0:?} is not a {1}")]
    UnexpectedNode(NodeId, &'static str),

    #[error("label pre-pass found no label for the statement at {}..{}", .0.start, .0.end)]
    LabelOutOfSync(Span),
}

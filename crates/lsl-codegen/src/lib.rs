// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! LSL code generator: validated syntax tree → C# for the OpenSim script engine.
//!
//! The output keeps LSL's runtime semantics on top of the host's boxed value
//! types: logical operators do not short-circuit, binary operands are
//! evaluated right to left, and list arguments to user functions are passed
//! by value.

mod expr;
mod generator;
mod host;
mod settings;

pub use generator::CSharpGenerator;
pub use settings::CompilerSettings;

use std::error::Error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum CodegenError {
    /// The tree does not have the shape validation guarantees.
    Internal(String),
    /// The tree cannot be generated, e.g. it carries validation errors.
    InvalidInput(String),
    Io(io::Error),
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CodegenError::Internal(msg) => write!(f, "Internal code generator error: {}", msg),
            CodegenError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CodegenError::Io(err) => write!(f, "Write failed: {}", err),
        }
    }
}

impl Error for CodegenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CodegenError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CodegenError {
    fn from(err: io::Error) -> Self {
        CodegenError::Io(err)
    }
}

pub type CodegenResult<T> = Result<T, CodegenError>;

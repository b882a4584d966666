// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! In-memory library data, built in code or loaded from JSON.

use std::io::Read;

use indexmap::IndexMap;
use lsl_ast::LslType;
use serde::{Deserialize, Serialize};

use crate::signature::{LibraryConstant, LibraryEvent, LibraryFunction};
use crate::LibraryDataProvider;

/// Failure while building or loading library data.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("invalid library data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read library data: {0}")]
    Io(#[from] std::io::Error),
    #[error("duplicate overload of library function `{0}`")]
    DuplicateOverload(String),
    #[error("library constant `{0}` is defined twice")]
    DuplicateConstant(String),
    #[error("library event `{0}` is defined twice")]
    DuplicateEvent(String),
    #[error("library constant `{0}` cannot have type void")]
    VoidConstant(String),
    #[error("only the last parameter of `{0}` may be variadic")]
    MisplacedVariadic(String),
}

/// Serialized form of a library.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryFile {
    #[serde(default)]
    functions: Vec<LibraryFunction>,
    #[serde(default)]
    constants: Vec<LibraryConstant>,
    #[serde(default)]
    events: Vec<LibraryEvent>,
}

/// Library data held in insertion-ordered maps.
#[derive(Debug, Clone, Default)]
pub struct StaticLibrary {
    functions: IndexMap<String, Vec<LibraryFunction>>,
    constants: IndexMap<String, LibraryConstant>,
    events: IndexMap<String, LibraryEvent>,
}

impl StaticLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in core catalog.
    pub fn standard() -> Self {
        let mut lib = StaticLibrary::new();
        for f in crate::catalog::functions() {
            lib.push_function(f);
        }
        for c in crate::catalog::constants() {
            lib.constants.insert(c.name.clone(), c);
        }
        for e in crate::catalog::events() {
            lib.events.insert(e.name.clone(), e);
        }
        tracing::debug!(
            functions = lib.functions.len(),
            constants = lib.constants.len(),
            events = lib.events.len(),
            "loaded standard library catalog"
        );
        lib
    }

    pub fn from_json(json: &str) -> Result<Self, LibraryError> {
        let file: LibraryFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LibraryError> {
        let file: LibraryFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    fn from_file(file: LibraryFile) -> Result<Self, LibraryError> {
        let mut lib = StaticLibrary::new();
        for f in file.functions {
            lib.add_function(f)?;
        }
        for c in file.constants {
            lib.add_constant(c)?;
        }
        for e in file.events {
            lib.add_event(e)?;
        }
        tracing::debug!(
            functions = lib.functions.len(),
            constants = lib.constants.len(),
            events = lib.events.len(),
            "loaded library data"
        );
        Ok(lib)
    }

    /// Serialize back to the JSON form accepted by [`StaticLibrary::from_json`].
    pub fn to_json(&self) -> String {
        let file = LibraryFile {
            functions: self.functions.values().flatten().cloned().collect(),
            constants: self.constants.values().cloned().collect(),
            events: self.events.values().cloned().collect(),
        };
        serde_json::to_string_pretty(&file).unwrap_or_default()
    }

    pub fn add_function(&mut self, function: LibraryFunction) -> Result<(), LibraryError> {
        let variadic_count = function.params.iter().filter(|p| p.variadic).count();
        if variadic_count > 1 || (variadic_count == 1 && !function.is_variadic()) {
            return Err(LibraryError::MisplacedVariadic(function.name));
        }
        let existing = self.functions.get(&function.name).map(Vec::as_slice).unwrap_or(&[]);
        if existing.iter().any(|f| same_params(f, &function)) {
            return Err(LibraryError::DuplicateOverload(function.name));
        }
        self.push_function(function);
        Ok(())
    }

    pub fn add_constant(&mut self, constant: LibraryConstant) -> Result<(), LibraryError> {
        if constant.ty == LslType::Void {
            return Err(LibraryError::VoidConstant(constant.name));
        }
        if self.constants.contains_key(&constant.name) {
            return Err(LibraryError::DuplicateConstant(constant.name));
        }
        self.constants.insert(constant.name.clone(), constant);
        Ok(())
    }

    pub fn add_event(&mut self, event: LibraryEvent) -> Result<(), LibraryError> {
        if self.events.contains_key(&event.name) {
            return Err(LibraryError::DuplicateEvent(event.name));
        }
        self.events.insert(event.name.clone(), event);
        Ok(())
    }

    /// Builder form of [`StaticLibrary::add_function`]. Invalid entries are dropped with a warning.
    pub fn with_function(mut self, function: LibraryFunction) -> Self {
        if let Err(e) = self.add_function(function) {
            tracing::warn!("{e}");
        }
        self
    }

    pub fn with_constant(mut self, constant: LibraryConstant) -> Self {
        if let Err(e) = self.add_constant(constant) {
            tracing::warn!("{e}");
        }
        self
    }

    pub fn with_event(mut self, event: LibraryEvent) -> Self {
        if let Err(e) = self.add_event(event) {
            tracing::warn!("{e}");
        }
        self
    }

    /// Add everything from `other`, keeping existing entries on conflict.
    pub fn merge(&mut self, other: StaticLibrary) {
        for f in other.functions.into_values().flatten() {
            let _ = self.add_function(f);
        }
        for (name, c) in other.constants {
            self.constants.entry(name).or_insert(c);
        }
        for (name, e) in other.events {
            self.events.entry(name).or_insert(e);
        }
    }

    pub fn functions(&self) -> impl Iterator<Item = &LibraryFunction> {
        self.functions.values().flatten()
    }

    pub fn constants(&self) -> impl Iterator<Item = &LibraryConstant> {
        self.constants.values()
    }

    pub fn events(&self) -> impl Iterator<Item = &LibraryEvent> {
        self.events.values()
    }

    fn push_function(&mut self, function: LibraryFunction) {
        self.functions
            .entry(function.name.clone())
            .or_default()
            .push(function);
    }
}

fn same_params(a: &LibraryFunction, b: &LibraryFunction) -> bool {
    a.params.len() == b.params.len()
        && a
            .params
            .iter()
            .zip(&b.params)
            .all(|(x, y)| x.ty == y.ty && x.variadic == y.variadic)
}

impl LibraryDataProvider for StaticLibrary {
    fn function_overloads(&self, name: &str) -> &[LibraryFunction] {
        self.functions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn constant(&self, name: &str) -> Option<&LibraryConstant> {
        self.constants.get(name)
    }

    fn event(&self, name: &str) -> Option<&LibraryEvent> {
        self.events.get(name)
    }
}

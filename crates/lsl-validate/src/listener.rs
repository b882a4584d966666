// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Receiving validation diagnostics.

use crate::error::{ValidationError, ValidationWarning};

/// Receives the errors and warnings of a validation run.
pub trait ValidationListener {
    fn error(&mut self, error: ValidationError);
    fn warning(&mut self, warning: ValidationWarning);
}

/// A listener that keeps everything it is told.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_codes(&self) -> Vec<&'static str> {
        self.errors.iter().map(ValidationError::code).collect()
    }

    pub fn warning_codes(&self) -> Vec<&'static str> {
        self.warnings.iter().map(ValidationWarning::code).collect()
    }
}

impl ValidationListener for ValidationReport {
    fn error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    fn warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A diagnostic waiting to be delivered.
#[derive(Debug, Clone)]
pub(crate) enum Pending {
    Error(ValidationError),
    Warning(ValidationWarning),
}

impl Pending {
    fn sort_key(&self) -> (usize, u8) {
        match self {
            Pending::Error(e) => (e.span.start, 0),
            Pending::Warning(w) => (w.span.start, 1),
        }
    }
}

/// Deliver buffered diagnostics, optionally ordered by source position with
/// errors ahead of warnings at the same offset.
pub(crate) fn flush(mut pending: Vec<Pending>, sort: bool, listener: &mut dyn ValidationListener) {
    if sort {
        pending.sort_by_key(Pending::sort_key);
    }
    for p in pending {
        match p {
            Pending::Error(e) => listener.error(e),
            Pending::Warning(w) => listener.warning(w),
        }
    }
}

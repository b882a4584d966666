// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Library signature data for LSL.
//!
//! The validator never hard-codes the functions, constants and events a
//! runtime offers. It asks a [`LibraryDataProvider`], and this crate ships the
//! in-memory [`StaticLibrary`] plus a core catalog of the standard library.

mod catalog;
mod signature;
mod static_library;

pub use signature::{LibraryConstant, LibraryEvent, LibraryFunction, LibraryParam};
pub use static_library::{LibraryError, StaticLibrary};

/// Lookup capability for library functions, constants and events.
pub trait LibraryDataProvider {
    /// Every overload registered under `name`; empty if there is none.
    fn function_overloads(&self, name: &str) -> &[LibraryFunction];

    fn constant(&self, name: &str) -> Option<&LibraryConstant>;

    fn event(&self, name: &str) -> Option<&LibraryEvent>;

    fn function_exists(&self, name: &str) -> bool {
        !self.function_overloads(name).is_empty()
    }

    fn constant_exists(&self, name: &str) -> bool {
        self.constant(name).is_some()
    }
}

//! Native graphics session
//!
//! A narrow boundary to the helper library that opens an off-screen GL
//! context, loads GL entry points and exercises a few basic calls.
//!
//! ## Architecture
//!
//! - `ffi`: C result struct and exported symbol names
//! - `library`: [`GlBackend`] backed by the dynamically loaded helper
//! - `session`: scoped guard enforcing create → load → test → destroy

pub mod ffi;
pub mod library;
pub mod session;

use thiserror::Error;

pub use library::{LibraryError, NativeLibrary};
pub use session::{GlSession, SessionError, SessionState};

/// A non-zero result returned by the helper library
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct NativeError {
    pub code: i32,
    pub message: String,
}

impl NativeError {
    /// Creates an error, substituting a generic message for an empty one
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            format!("native call failed with code {code}")
        } else {
            message
        };
        Self { code, message }
    }
}

/// The five helper operations, one call each.
///
/// Implementations are driven through [`GlSession`], which guarantees the
/// call order and that every created context is destroyed exactly once.
pub trait GlBackend {
    /// Opens an off-screen surface of `width`×`height` pixels with a GL context
    fn create_context(&mut self, width: i32, height: i32) -> Result<(), NativeError>;

    /// Resolves GL entry points against the current context
    fn load_functions(&mut self) -> Result<(), NativeError>;

    /// GL version exposed by the loaded function table, as `(major, minor)`
    fn loaded_version(&mut self) -> (i32, i32);

    /// Raw `GL_VERSION` string of the current context, when the helper provides it
    fn loaded_version_string(&mut self) -> Option<String> {
        None
    }

    /// Runs the basic call battery; failures are `|`-separated in the message
    fn test_basic_calls(&mut self) -> Result<(), NativeError>;

    /// Releases the context and surface
    fn destroy_context(&mut self) -> Result<(), NativeError>;
}

//! Scoped GL context guard

use thiserror::Error;
use tracing::{debug, error, warn};

use super::{GlBackend, NativeError};

/// Position in the create → load → test → destroy protocol.
///
/// There is no "uninitialized" state: a [`GlSession`] only exists after
/// `createContext` succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    ContextCreated,
    FunctionsLoaded,
    Tested,
    Destroyed,
}

/// Failure of a session operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The helper returned a non-zero code
    #[error(transparent)]
    Native(#[from] NativeError),

    /// The operation is not allowed in the current state
    #[error("'{operation}' is not allowed in state {state:?}")]
    InvalidTransition {
        state: SessionState,
        operation: &'static str,
    },
}

/// Exclusive handle on one open GL context.
///
/// Holding the backend mutably guarantees at most one context at a time.
/// [`GlSession::destroy`] releases the context and reports the result; a
/// session dropped without it is destroyed in `Drop`, so every successful
/// creation is torn down exactly once on every exit path.
pub struct GlSession<'a> {
    backend: &'a mut dyn GlBackend,
    state: SessionState,
}

impl<'a> GlSession<'a> {
    /// Creates a `width`×`height` context
    pub fn create(
        backend: &'a mut dyn GlBackend,
        width: i32,
        height: i32,
    ) -> Result<Self, SessionError> {
        backend.create_context(width, height)?;
        debug!(width, height, "GL context created");
        Ok(Self {
            backend,
            state: SessionState::ContextCreated,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Loads GL entry points; only valid right after creation
    pub fn load_functions(&mut self) -> Result<(), SessionError> {
        self.require(&[SessionState::ContextCreated], "loadFunctions")?;
        self.backend.load_functions()?;
        self.state = SessionState::FunctionsLoaded;
        Ok(())
    }

    /// Version exposed by the loaded function table
    pub fn loaded_version(&mut self) -> Result<(i32, i32), SessionError> {
        self.require(
            &[SessionState::FunctionsLoaded, SessionState::Tested],
            "getLoadedVersion",
        )?;
        Ok(self.backend.loaded_version())
    }

    /// Raw version string of the current context, if the helper reports one
    pub fn loaded_version_string(&mut self) -> Option<String> {
        self.require(
            &[SessionState::FunctionsLoaded, SessionState::Tested],
            "getLoadedVersionString",
        )
        .ok()?;
        self.backend.loaded_version_string()
    }

    /// Runs the basic call battery once
    pub fn test_basic_calls(&mut self) -> Result<(), SessionError> {
        self.require(&[SessionState::FunctionsLoaded], "testBasicCalls")?;
        self.state = SessionState::Tested;
        self.backend.test_basic_calls()?;
        Ok(())
    }

    /// Releases the context
    pub fn destroy(mut self) -> Result<(), SessionError> {
        self.state = SessionState::Destroyed;
        self.backend.destroy_context()?;
        debug!("GL context destroyed");
        Ok(())
    }

    fn require(
        &self,
        allowed: &[SessionState],
        operation: &'static str,
    ) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            warn!(state = ?self.state, operation, "Invalid GL session transition");
            Err(SessionError::InvalidTransition {
                state: self.state,
                operation,
            })
        }
    }
}

impl Drop for GlSession<'_> {
    fn drop(&mut self) {
        if self.state == SessionState::Destroyed {
            return;
        }
        self.state = SessionState::Destroyed;
        if let Err(e) = self.backend.destroy_context() {
            error!(error = %e, "Failed to destroy GL context on drop");
        }
    }
}

//! Helper library loaded at runtime

use std::path::{Path, PathBuf};

use libloading::Library;
use thiserror::Error;
use tracing::{debug, info};

use super::ffi::{self, CreateContextFn, IntFn, ResultFn};
use super::{GlBackend, NativeError};

/// Command that builds the helper library from the repository root
pub const BUILD_HINT: &str = "Build helper lib: `mkdir build && cd build && cmake .. && make -j8`";

/// Failure to load the helper library; fatal for the run
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Failed to load native helper library '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("Native helper library '{}' does not export '{symbol}': {source}", path.display())]
    Symbol {
        path: PathBuf,
        symbol: String,
        #[source]
        source: libloading::Error,
    },
}

/// [`GlBackend`] backed by `libGfxHealthCheck.so`
pub struct NativeLibrary {
    path: PathBuf,
    create_context: CreateContextFn,
    destroy_context: ResultFn,
    load_functions: ResultFn,
    major_version: IntFn,
    minor_version: IntFn,
    version_string: Option<ResultFn>,
    test_basic_calls: ResultFn,
    // Keeps the function pointers above valid; dropped last
    _library: Library,
}

impl NativeLibrary {
    /// Loads the helper library and resolves every exported operation
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let path = path.as_ref().to_path_buf();
        info!(path = %path.display(), "Loading native helper library");

        // SAFETY: the helper has no load-time initializers with preconditions
        let library = unsafe { Library::new(&path) }.map_err(|source| LibraryError::Open {
            path: path.clone(),
            source,
        })?;

        let create_context = symbol::<CreateContextFn>(&library, &path, ffi::CREATE_CONTEXT)?;
        let destroy_context = symbol::<ResultFn>(&library, &path, ffi::DESTROY_CONTEXT)?;
        let load_functions = symbol::<ResultFn>(&library, &path, ffi::LOAD_FUNCTIONS)?;
        let major_version = symbol::<IntFn>(&library, &path, ffi::MAJOR_VERSION)?;
        let minor_version = symbol::<IntFn>(&library, &path, ffi::MINOR_VERSION)?;
        let test_basic_calls = symbol::<ResultFn>(&library, &path, ffi::TEST_BASIC_CALLS)?;
        let version_string = symbol::<ResultFn>(&library, &path, ffi::VERSION_STRING).ok();
        if version_string.is_none() {
            debug!("Helper does not export a version string query");
        }

        Ok(Self {
            path,
            create_context,
            destroy_context,
            load_functions,
            major_version,
            minor_version,
            version_string,
            test_basic_calls,
            _library: library,
        })
    }

    /// Path the library was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn symbol<T: Copy>(library: &Library, path: &Path, name: &[u8]) -> Result<T, LibraryError> {
    // SAFETY: T matches the helper's exported signature for `name`
    unsafe { library.get::<T>(name) }
        .map(|symbol| *symbol)
        .map_err(|source| LibraryError::Symbol {
            path: path.to_path_buf(),
            symbol: String::from_utf8_lossy(name.strip_suffix(b"\0").unwrap_or(name)).into_owned(),
            source,
        })
}

/// Resolves the configured library path.
///
/// Relative paths are tried next to the executable first, then in the
/// current directory.
pub fn resolve_library_path(configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        return configured.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let candidate = exe_dir.join(configured);
        if candidate.exists() {
            return candidate;
        }
    }

    configured.to_path_buf()
}

impl GlBackend for NativeLibrary {
    fn create_context(&mut self, width: i32, height: i32) -> Result<(), NativeError> {
        // SAFETY: resolved from the helper with this exact signature
        let result = unsafe { (self.create_context)(width, height).into_result() };
        debug!(width, height, ok = result.is_ok(), "createGlxContext");
        result
    }

    fn load_functions(&mut self) -> Result<(), NativeError> {
        // SAFETY: resolved from the helper with this exact signature
        let result = unsafe { (self.load_functions)().into_result() };
        debug!(ok = result.is_ok(), "gladLoadFunctions");
        result
    }

    fn loaded_version(&mut self) -> (i32, i32) {
        // SAFETY: resolved from the helper with this exact signature
        let version = unsafe { ((self.major_version)(), (self.minor_version)()) };
        debug!(major = version.0, minor = version.1, "gladGetVersion");
        version
    }

    fn loaded_version_string(&mut self) -> Option<String> {
        let query = self.version_string?;
        // SAFETY: resolved from the helper with this exact signature
        let raw = unsafe { query() };
        if raw.code != 0 {
            return None;
        }
        // SAFETY: the helper returns a NUL-terminated string it owns
        Some(unsafe { raw.message() })
    }

    fn test_basic_calls(&mut self) -> Result<(), NativeError> {
        // SAFETY: resolved from the helper with this exact signature
        let result = unsafe { (self.test_basic_calls)().into_result() };
        debug!(ok = result.is_ok(), "testBasicOpenGlFunctions");
        result
    }

    fn destroy_context(&mut self) -> Result<(), NativeError> {
        // SAFETY: resolved from the helper with this exact signature
        let result = unsafe { (self.destroy_context)().into_result() };
        debug!(ok = result.is_ok(), "destroyGlxContext");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_is_open_error() {
        let err = NativeLibrary::load("/nonexistent/libGfxHealthCheck.so")
            .err()
            .unwrap();
        assert!(matches!(err, LibraryError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/libGfxHealthCheck.so"));
    }

    #[test]
    fn test_absolute_path_is_kept() {
        let path = Path::new("/opt/ghc/libGfxHealthCheck.so");
        assert_eq!(resolve_library_path(path), path);
    }

    #[test]
    fn test_relative_path_falls_back_to_cwd() {
        let path = Path::new("does-not-exist/libGfxHealthCheck.so");
        assert_eq!(resolve_library_path(path), path);
    }
}

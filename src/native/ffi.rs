//! C ABI shared with the native GL helper library
//!
//! # Safety
//!
//! The helper owns every `message` buffer it returns. Callers copy the text
//! out immediately and never free it.

use std::ffi::{CStr, c_char, c_int};

use super::NativeError;

/// `struct { int code; const char* message; }`, `code == 0` is success
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawResult {
    pub code: c_int,
    pub message: *const c_char,
}

impl RawResult {
    /// Copies the message out of the library-owned buffer
    ///
    /// # Safety
    ///
    /// `message` must be null or point to a NUL-terminated string that stays
    /// valid for the duration of this call.
    pub unsafe fn message(&self) -> String {
        if self.message.is_null() {
            return String::new();
        }
        // SAFETY: non-null and NUL-terminated per the helper's contract
        unsafe { CStr::from_ptr(self.message) }
            .to_string_lossy()
            .into_owned()
    }

    /// Converts to a Rust result, copying the message on failure
    ///
    /// # Safety
    ///
    /// Same requirements as [`RawResult::message`].
    pub unsafe fn into_result(self) -> Result<(), NativeError> {
        if self.code == 0 {
            return Ok(());
        }
        // SAFETY: forwarded from the caller
        let message = unsafe { self.message() };
        Err(NativeError::new(self.code, message))
    }
}

pub type CreateContextFn = unsafe extern "C" fn(c_int, c_int) -> RawResult;
pub type ResultFn = unsafe extern "C" fn() -> RawResult;
pub type IntFn = unsafe extern "C" fn() -> c_int;

pub const CREATE_CONTEXT: &[u8] = b"createGlxContext\0";
pub const DESTROY_CONTEXT: &[u8] = b"destroyGlxContext\0";
pub const LOAD_FUNCTIONS: &[u8] = b"gladLoadFunctions\0";
pub const MAJOR_VERSION: &[u8] = b"gladGetMajorVersion\0";
pub const MINOR_VERSION: &[u8] = b"gladGetMinorVersion\0";
pub const VERSION_STRING: &[u8] = b"getOpenGLVersionString\0";
pub const TEST_BASIC_CALLS: &[u8] = b"testBasicOpenGlFunctions\0";

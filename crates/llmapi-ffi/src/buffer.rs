// Text crossing the boundary: borrowed arguments in, owned buffers out.

use llmapi::{LlmError, Result};
use std::ffi::{c_char, CStr, CString};

/// NUL-terminated copy of `text`; fails if `text` has an interior NUL.
pub(crate) fn to_c_string(text: &str) -> Result<CString> {
    CString::new(text).map_err(|_| LlmError::parse("text contains an interior NUL byte"))
}

/// Copy `text` into a fresh NUL-terminated allocation owned by the caller,
/// released with [`llmapi_free_string`].
pub(crate) fn into_owned(text: &str) -> Result<*mut c_char> {
    to_c_string(text).map(CString::into_raw)
}

/// Copy for the last-error slot; interior NULs would truncate the message.
pub(crate) fn error_text(text: &str) -> CString {
    CString::new(text.replace('\0', " ")).unwrap_or_default()
}

/// Borrow a caller-supplied C string as UTF-8.
///
/// # Safety
///
/// `ptr` is null or points to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn read_arg<'a>(ptr: *const c_char, name: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(LlmError::invalid_argument(format!("{} must not be null", name)));
    }
    // SAFETY: non-null and NUL-terminated per the caller contract.
    let text = unsafe { CStr::from_ptr(ptr) };
    text.to_str()
        .map_err(|_| LlmError::invalid_argument(format!("{} is not valid UTF-8", name)))
}

/// Release a string returned by the library. NULL is ignored; releasing the
/// same pointer twice is undefined.
///
/// # Safety
///
/// `s` is null or was returned by this library and not yet released.
#[no_mangle]
pub unsafe extern "C" fn llmapi_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    // SAFETY: every non-null string we hand out comes from `CString::into_raw`.
    drop(unsafe { CString::from_raw(s) });
}

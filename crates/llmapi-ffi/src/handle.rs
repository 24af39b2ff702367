//! The `llmapi_client_t` handle.
//!
//! A handle is a method table followed by an opaque pointer to the Rust
//! client and its last-error slot. Every table entry has an exported free
//! function twin (`llmapi_client_<method>`) that null-checks the handle and
//! dispatches through the table, so both calling conventions reach the same
//! code. Both are generated from the single list in [`method_table!`].

use std::any::Any;
use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use llmapi::{blocking, LlmError, Result, Role};

use crate::buffer::{error_text, into_owned, read_arg, to_c_string};
use crate::status::ErrorCode;

/// `llmapi_stream_callback_t`: `content` is `length` bytes of UTF-8 and is
/// not NUL-terminated. It is only valid for the duration of the call.
///
/// The callback must not call any function on the handle that is streaming;
/// the request holds the client exclusively until it returns.
pub type StreamCallback =
    unsafe extern "C" fn(content: *const c_char, length: usize, user_data: *mut c_void);

const INVALID_CLIENT: &CStr = c"Invalid client";

macro_rules! method_table {
    ($(
        $(#[$attr:meta])*
        $field:ident => $export:ident($($arg:ident: $ty:ty),*) -> $ret:ty, else $fallback:expr;
    )+) => {
        /// `struct llmapi_client_t`. Field order is ABI.
        #[repr(C)]
        pub struct LlmapiClient {
            $( pub $field: unsafe extern "C" fn(*mut LlmapiClient $(, $ty)*) -> $ret, )+
            private: *mut c_void,
        }

        impl LlmapiClient {
            fn with_private(private: *mut c_void) -> Self {
                Self {
                    $( $field: methods::$field, )+
                    private,
                }
            }
        }

        $(
            $(#[$attr])*
            ///
            /// # Safety
            ///
            /// `client` is null or a live handle from `llmapi_client_create`.
            #[no_mangle]
            pub unsafe extern "C" fn $export(client: *mut LlmapiClient $(, $arg: $ty)*) -> $ret {
                if client.is_null() {
                    return $fallback;
                }
                // SAFETY: non-null live handle; the table was filled at creation.
                unsafe { ((*client).$field)(client $(, $arg)*) }
            }
        )+
    };
}

method_table! {
    /// Destroy the handle and the client it owns. Destroying a handle twice
    /// is undefined; the caller must not use it afterwards.
    destroy => llmapi_client_destroy() -> (), else ();
    set_model => llmapi_client_set_model(model: *const c_char) -> ErrorCode, else ErrorCode::InvalidParam;
    add_user_message => llmapi_client_add_user_message(content: *const c_char) -> ErrorCode, else ErrorCode::InvalidParam;
    add_system_message => llmapi_client_add_system_message(content: *const c_char) -> ErrorCode, else ErrorCode::InvalidParam;
    add_assistant_message => llmapi_client_add_assistant_message(content: *const c_char) -> ErrorCode, else ErrorCode::InvalidParam;
    clear => llmapi_client_clear() -> ErrorCode, else ErrorCode::InvalidParam;
    /// Number of messages in the transcript, or -1 for an invalid handle.
    get_message_count => llmapi_client_get_message_count() -> c_int, else -1;
    /// Latest assistant answer as an owned string (free with
    /// `llmapi_free_string`), or NULL when there is none or on error.
    get_answer => llmapi_client_get_answer() -> *mut c_char, else ptr::null_mut();
    /// Whole-response request. Returns the answer as an owned string, or
    /// NULL on failure (see `llmapi_get_last_error`).
    request => llmapi_client_request() -> *mut c_char, else ptr::null_mut();
    /// Streaming request; `callback` runs on the calling thread once per chunk.
    request_stream => llmapi_client_request_stream(callback: Option<StreamCallback>, user_data: *mut c_void) -> ErrorCode, else ErrorCode::InvalidParam;
    /// Message of the last failed operation, NULL after a success. Valid
    /// until the next operation on the same handle.
    get_last_error => llmapi_get_last_error() -> *const c_char, else INVALID_CLIENT.as_ptr();
}

/// What `private` points at.
struct ClientState {
    client: blocking::Client,
    last_error: Option<CString>,
}

impl ClientState {
    fn record(&mut self, err: &LlmError) -> ErrorCode {
        tracing::debug!(error = %err, "llmapi call failed");
        self.last_error = Some(error_text(&err.to_string()));
        ErrorCode::from(err)
    }
}

/// Hand ownership of `client` to a new C handle.
pub fn into_raw_handle(client: blocking::Client) -> *mut LlmapiClient {
    let state = Box::new(ClientState {
        client,
        last_error: None,
    });
    let handle = LlmapiClient::with_private(Box::into_raw(state).cast());
    Box::into_raw(Box::new(handle))
}

/// # Safety
///
/// `this` is null or a live handle.
unsafe fn state_mut<'a>(this: *mut LlmapiClient) -> Option<&'a mut ClientState> {
    if this.is_null() {
        return None;
    }
    // SAFETY: live handle; `private` is null or the `ClientState` it owns.
    unsafe { (*this).private.cast::<ClientState>().as_mut() }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panic: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panic: {}", msg)
    } else {
        "Unknown error".to_string()
    }
}

/// Run `op` on the handle's client. Success clears the last-error slot;
/// an error or a panic is recorded there and translated to its code.
///
/// # Safety
///
/// `this` is null or a live handle.
unsafe fn guarded<T>(
    this: *mut LlmapiClient,
    op: impl FnOnce(&mut blocking::Client) -> Result<T>,
) -> std::result::Result<T, ErrorCode> {
    // SAFETY: forwarded caller contract.
    let Some(state) = (unsafe { state_mut(this) }) else {
        return Err(ErrorCode::InvalidParam);
    };

    match panic::catch_unwind(AssertUnwindSafe(|| op(&mut state.client))) {
        Ok(Ok(value)) => {
            state.last_error = None;
            Ok(value)
        }
        Ok(Err(err)) => Err(state.record(&err)),
        Err(payload) => Err(state.record(&LlmError::unknown(panic_message(payload)))),
    }
}

fn status(result: std::result::Result<(), ErrorCode>) -> ErrorCode {
    match result {
        Ok(()) => ErrorCode::Ok,
        Err(code) => code,
    }
}

/// Table entries. Each one validates its arguments inside [`guarded`] so
/// that argument errors land in the last-error slot like any other failure.
mod methods {
    use super::*;

    pub(super) unsafe extern "C" fn destroy(this: *mut LlmapiClient) {
        if this.is_null() {
            return;
        }
        let released = panic::catch_unwind(AssertUnwindSafe(|| {
            // SAFETY: `this` and `private` were created by `into_raw_handle`
            // and are released here exactly once.
            let handle = unsafe { Box::from_raw(this) };
            if !handle.private.is_null() {
                drop(unsafe { Box::from_raw(handle.private.cast::<ClientState>()) });
            }
        }));
        if released.is_err() {
            tracing::error!("panic while destroying llmapi client");
        }
    }

    pub(super) unsafe extern "C" fn set_model(
        this: *mut LlmapiClient,
        model: *const c_char,
    ) -> ErrorCode {
        let op = |client: &mut blocking::Client| {
            // SAFETY: `model` is null or NUL-terminated (C contract).
            let model = unsafe { read_arg(model, "model") }?;
            client.set_model(model).map(|_| ())
        };
        // SAFETY: caller contract of the public entry points.
        status(unsafe { guarded(this, op) })
    }

    unsafe fn add_message(this: *mut LlmapiClient, content: *const c_char, role: Role) -> ErrorCode {
        let op = |client: &mut blocking::Client| {
            // SAFETY: `content` is null or NUL-terminated (C contract).
            let content = unsafe { read_arg(content, "content") }?;
            match role {
                Role::User => client.user(content),
                Role::System => client.system(content),
                Role::Assistant => client.assistant(content),
            }
            .map(|_| ())
        };
        // SAFETY: forwarded.
        status(unsafe { guarded(this, op) })
    }

    pub(super) unsafe extern "C" fn add_user_message(
        this: *mut LlmapiClient,
        content: *const c_char,
    ) -> ErrorCode {
        // SAFETY: forwarded.
        unsafe { add_message(this, content, Role::User) }
    }

    pub(super) unsafe extern "C" fn add_system_message(
        this: *mut LlmapiClient,
        content: *const c_char,
    ) -> ErrorCode {
        // SAFETY: forwarded.
        unsafe { add_message(this, content, Role::System) }
    }

    pub(super) unsafe extern "C" fn add_assistant_message(
        this: *mut LlmapiClient,
        content: *const c_char,
    ) -> ErrorCode {
        // SAFETY: forwarded.
        unsafe { add_message(this, content, Role::Assistant) }
    }

    pub(super) unsafe extern "C" fn clear(this: *mut LlmapiClient) -> ErrorCode {
        let op = |client: &mut blocking::Client| {
            client.clear();
            Ok(())
        };
        // SAFETY: forwarded.
        status(unsafe { guarded(this, op) })
    }

    pub(super) unsafe extern "C" fn get_message_count(this: *mut LlmapiClient) -> c_int {
        // SAFETY: forwarded.
        let count = unsafe { guarded(this, |client| Ok(client.message_count())) };
        match count {
            Ok(count) => c_int::try_from(count).unwrap_or(c_int::MAX),
            Err(_) => -1,
        }
    }

    pub(super) unsafe extern "C" fn get_answer(this: *mut LlmapiClient) -> *mut c_char {
        let op = |client: &mut blocking::Client| match client.answer() {
            Some(answer) => into_owned(answer),
            None => Ok(ptr::null_mut()),
        };
        // SAFETY: forwarded.
        unsafe { guarded(this, op) }.unwrap_or(ptr::null_mut())
    }

    pub(super) unsafe extern "C" fn request(this: *mut LlmapiClient) -> *mut c_char {
        // Convert before commit so an unrepresentable answer fails the turn.
        let op = |client: &mut blocking::Client| client.request_with(to_c_string);
        // SAFETY: forwarded.
        unsafe { guarded(this, op) }.map_or(ptr::null_mut(), CString::into_raw)
    }

    pub(super) unsafe extern "C" fn request_stream(
        this: *mut LlmapiClient,
        callback: Option<StreamCallback>,
        user_data: *mut c_void,
    ) -> ErrorCode {
        let op = |client: &mut blocking::Client| {
            let callback =
                callback.ok_or_else(|| LlmError::invalid_argument("callback must not be null"))?;
            client
                .request_stream(|chunk| {
                    // SAFETY: `chunk` outlives the call; the callback and
                    // `user_data` are the caller's responsibility.
                    unsafe { callback(chunk.as_ptr().cast(), chunk.len(), user_data) }
                })
                .map(|_| ())
        };
        // SAFETY: forwarded.
        status(unsafe { guarded(this, op) })
    }

    pub(super) unsafe extern "C" fn get_last_error(this: *mut LlmapiClient) -> *const c_char {
        // SAFETY: forwarded.
        match unsafe { state_mut(this) } {
            Some(state) => state
                .last_error
                .as_ref()
                .map_or(ptr::null(), |err| err.as_ptr()),
            None => INVALID_CLIENT.as_ptr(),
        }
    }
}

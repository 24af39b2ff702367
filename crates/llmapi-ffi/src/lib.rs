//! C bindings for `llmapi` (see `include/llmapi.h`).
//!
//! Nothing here unwinds or returns a Rust error across the boundary: every
//! failure becomes an [`ErrorCode`] plus a message in the handle's
//! last-error slot. Strings returned to C are owned by the caller and must
//! be released with [`llmapi_free_string`].
//!
//! A handle must not be used from two threads at once.

#![deny(unsafe_op_in_unsafe_fn)]

mod buffer;
mod handle;
mod status;

use std::ffi::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::time::Duration;

use llmapi::{blocking, BaseUrl, ClientConfig};
use tracing_subscriber::EnvFilter;

pub use buffer::llmapi_free_string;
pub use handle::*;
pub use status::ErrorCode;

/// Per-request timeout of every handle (`LLMAPI_REQUEST_TIMEOUT_SECS`).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

fn client_config(api_key: &str, base_url: BaseUrl) -> ClientConfig {
    ClientConfig::new(api_key)
        .with_base_url(base_url)
        .with_timeout(REQUEST_TIMEOUT)
}

/// Create a client for `base_url` (NULL selects the OpenAI endpoint)
/// authenticating with `api_key`, with a [`REQUEST_TIMEOUT`] per request.
/// Returns NULL if `api_key` is NULL or the client cannot be built.
///
/// # Safety
///
/// Both arguments are null or NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn llmapi_client_create(
    api_key: *const c_char,
    base_url: *const c_char,
) -> *mut LlmapiClient {
    let created = panic::catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: caller contract.
        let api_key = unsafe { buffer::read_arg(api_key, "api_key") }?;
        let base_url = if base_url.is_null() {
            BaseUrl::OpenAi
        } else {
            // SAFETY: caller contract.
            BaseUrl::from(unsafe { buffer::read_arg(base_url, "base_url") }?)
        };
        blocking::Client::from_config(client_config(api_key, base_url))
    }));

    match created {
        Ok(Ok(client)) => into_raw_handle(client),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "failed to create llmapi client");
            ptr::null_mut()
        }
        Err(_) => {
            tracing::error!("panic while creating llmapi client");
            ptr::null_mut()
        }
    }
}

/// Send library logs to stderr, filtered by `LLMAPI_LOG` (default `warn`).
/// Safe to call more than once; later calls keep the first subscriber.
#[no_mangle]
pub extern "C" fn llmapi_init_logging() -> ErrorCode {
    let filter = EnvFilter::try_from_env("LLMAPI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    ErrorCode::Ok
}

//! Handle state exchanged across the C boundary.

use std::ffi::CString;
use std::os::raw::c_int;

use geogrid::prelude::{Error, Query};

/// Status returned by an entry point that succeeded.
pub const GEOGRID_OK: c_int = 0;

/// Status returned by an entry point that failed.
pub const GEOGRID_ERROR: c_int = 1;

/// Opaque query handle. Allocated by `geogrid_query_create`, released by
/// `geogrid_query_destroy`; callers never look inside.
#[repr(C)]
#[allow(non_camel_case_types)]
pub struct geogrid_query_t {
    _opaque: [u8; 0],
}

/// What a `geogrid_query_t` actually points at.
pub(crate) struct Handle {
    pub query: Query,
    error_status: c_int,
    error_message: Option<CString>,
}

impl Handle {
    pub fn new() -> Self {
        Self {
            query: Query::new(),
            error_status: GEOGRID_OK,
            error_message: None,
        }
    }

    /// Resets the error handler; called on entry of every fallible
    /// operation so the recorded state describes the latest call.
    pub fn clear_error(&mut self) {
        self.error_status = GEOGRID_OK;
        self.error_message = None;
    }

    /// Records `error` on the error handler and hands back the failure
    /// status for returning.
    pub fn record_error(&mut self, error: &Error) -> c_int {
        log::error!("{}", error);
        self.error_status = GEOGRID_ERROR;
        self.error_message = CString::new(error.to_string())
            .ok()
            .or_else(|| CString::new("error message contained NUL bytes").ok());
        GEOGRID_ERROR
    }

    /// Records a failure that did not come from the engine (NULL input
    /// pointers, panics).
    pub fn record_message(&mut self, message: &str) -> c_int {
        log::error!("{}", message);
        self.error_status = GEOGRID_ERROR;
        self.error_message = CString::new(message).ok();
        GEOGRID_ERROR
    }

    pub fn error_status(&self) -> c_int {
        self.error_status
    }

    /// Message of the last recorded error. The pointer is owned by the
    /// handle and stays valid until the next API call on it.
    pub fn error_message(&self) -> *const std::os::raw::c_char {
        match &self.error_message {
            Some(message) => message.as_ptr(),
            None => std::ptr::null(),
        }
    }
}

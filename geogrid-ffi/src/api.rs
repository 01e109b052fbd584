//! API entry points.

use std::ffi::CStr;
use std::os::raw::{c_char, c_double, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;

use geogrid::prelude::NODATA_VALUE;

use crate::handle::{geogrid_query_t, Handle, GEOGRID_ERROR, GEOGRID_OK};

unsafe fn handle_mut<'a>(handle: *mut geogrid_query_t) -> Option<&'a mut Handle> {
    (handle as *mut Handle).as_mut()
}

unsafe fn handle_ref<'a>(handle: *const geogrid_query_t) -> Option<&'a Handle> {
    (handle as *const Handle).as_ref()
}

/// Collects a C string array into owned Rust strings. None on NULL
/// pointers or a negative length.
unsafe fn string_array(items: *const *const c_char, len: c_int) -> Option<Vec<String>> {
    if len < 0 {
        return None;
    }
    if len == 0 {
        return Some(Vec::new());
    }
    if items.is_null() {
        return None;
    }
    let mut strings = Vec::with_capacity(len as usize);
    for index in 0..len as usize {
        let item = *items.add(index);
        if item.is_null() {
            return None;
        }
        strings.push(CStr::from_ptr(item).to_string_lossy().into_owned());
    }
    Some(strings)
}

/// Creates a query handle. The handle must be released with
/// `geogrid_query_destroy`. NULL on failure.
#[no_mangle]
pub extern "C" fn geogrid_query_create() -> *mut geogrid_query_t {
    match panic::catch_unwind(|| Box::new(Handle::new())) {
        Ok(handle) => Box::into_raw(handle) as *mut geogrid_query_t,
        Err(_) => ptr::null_mut(),
    }
}

/// Destroys a query handle and nulls the caller's pointer. Tolerates NULL
/// at either level.
///
/// # Safety
/// `handle` must be NULL or point at a pointer obtained from
/// `geogrid_query_create` and not destroyed since.
#[no_mangle]
pub unsafe extern "C" fn geogrid_query_destroy(handle: *mut *mut geogrid_query_t) {
    if handle.is_null() {
        return;
    }
    let inner = *handle;
    if inner.is_null() {
        return;
    }
    drop(Box::from_raw(inner as *mut Handle));
    *handle = ptr::null_mut();
}

/// Prepares the engine for queries: loads `model_paths` in priority
/// order, selects `value_names` for output (may be empty for
/// elevation-only use) and fixes the CRS that future query coordinates
/// are interpreted in. 0 on success.
///
/// # Safety
/// `model_paths` and `value_names` must hold `num_models` /
/// `num_values` valid C strings; `input_crs` must be a valid C string.
#[no_mangle]
pub unsafe extern "C" fn geogrid_query_initialize(
    handle: *mut geogrid_query_t,
    model_paths: *const *const c_char,
    num_models: c_int,
    value_names: *const *const c_char,
    num_values: c_int,
    input_crs: *const c_char,
) -> c_int {
    let handle = match handle_mut(handle) {
        Some(handle) => handle,
        None => return GEOGRID_ERROR,
    };
    handle.clear_error();

    let models = match string_array(model_paths, num_models) {
        Some(models) => models,
        None => return handle.record_message("model path array is NULL"),
    };
    let values = match string_array(value_names, num_values) {
        Some(values) => values,
        None => return handle.record_message("value name array is NULL"),
    };
    if input_crs.is_null() {
        return handle.record_message("input CRS is NULL");
    }
    let crs = CStr::from_ptr(input_crs).to_string_lossy().into_owned();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        handle.query.initialize(&models, &values, &crs)
    }));
    match outcome {
        Ok(Ok(())) => GEOGRID_OK,
        Ok(Err(error)) => handle.record_error(&error),
        Err(_) => handle.record_message("initialization panicked"),
    }
}

/// Sets the squashing cutoff elevation (m) and enables squashing.
/// Geometry below the cutoff is not perturbed.
///
/// # Safety
/// `handle` must be NULL or a live handle.
#[no_mangle]
pub unsafe extern "C" fn geogrid_query_set_squash_min_elev(
    handle: *mut geogrid_query_t,
    value: c_double,
) -> c_int {
    match handle_mut(handle) {
        Some(handle) => {
            handle.clear_error();
            handle.query.set_squash_min_elev(value);
            GEOGRID_OK
        },
        None => GEOGRID_ERROR,
    }
}

/// Turns squashing on or off without touching the cutoff elevation.
///
/// # Safety
/// `handle` must be NULL or a live handle.
#[no_mangle]
pub unsafe extern "C" fn geogrid_query_set_squashing(
    handle: *mut geogrid_query_t,
    value: bool,
) -> c_int {
    match handle_mut(handle) {
        Some(handle) => {
            handle.clear_error();
            handle.query.set_squashing(value);
            GEOGRID_OK
        },
        None => GEOGRID_ERROR,
    }
}

/// Ground surface elevation (m) at a point of the input CRS:
/// `NODATA_VALUE` outside every model footprint, and also on failure,
/// with the failure recorded on the handle.
///
/// # Safety
/// `handle` must be NULL or a live handle.
#[no_mangle]
pub unsafe extern "C" fn geogrid_query_elevation(
    handle: *mut geogrid_query_t,
    x: c_double,
    y: c_double,
) -> c_double {
    let handle = match handle_mut(handle) {
        Some(handle) => handle,
        None => return NODATA_VALUE,
    };
    handle.clear_error();
    match panic::catch_unwind(AssertUnwindSafe(|| handle.query.query_elevation(x, y))) {
        Ok(Ok(elevation)) => elevation,
        Ok(Err(error)) => {
            handle.record_error(&error);
            NODATA_VALUE
        },
        Err(_) => {
            handle.record_message("elevation query panicked");
            NODATA_VALUE
        },
    }
}

/// Samples the models at a point of the input CRS. `values` must hold one
/// double per value name passed at initialization; slots are written in
/// that order. 0 on success; nonzero when the point is outside every
/// model (slots then carry `NODATA_VALUE`, no error is recorded) or on
/// failure (recorded on the handle).
///
/// # Safety
/// `handle` must be NULL or a live handle; `values` must point at enough
/// room for the requested value count.
#[no_mangle]
pub unsafe extern "C" fn geogrid_query_query(
    handle: *mut geogrid_query_t,
    values: *mut c_double,
    x: c_double,
    y: c_double,
    z: c_double,
) -> c_int {
    let handle = match handle_mut(handle) {
        Some(handle) => handle,
        None => return GEOGRID_ERROR,
    };
    handle.clear_error();

    let len = handle.query.value_names().len();
    if values.is_null() && len > 0 {
        return handle.record_message("values buffer is NULL");
    }
    let buffer: &mut [f64] = if len == 0 {
        &mut []
    } else {
        slice::from_raw_parts_mut(values, len)
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| handle.query.query(buffer, x, y, z)));
    match outcome {
        Ok(Ok(true)) => GEOGRID_OK,
        Ok(Ok(false)) => GEOGRID_ERROR,
        Ok(Err(error)) => handle.record_error(&error),
        Err(_) => handle.record_message("query panicked"),
    }
}

/// Releases every model held by the handle. Idempotent.
///
/// # Safety
/// `handle` must be NULL or a live handle.
#[no_mangle]
pub unsafe extern "C" fn geogrid_query_finalize(handle: *mut geogrid_query_t) -> c_int {
    match handle_mut(handle) {
        Some(handle) => {
            handle.clear_error();
            handle.query.finalize();
            GEOGRID_OK
        },
        None => GEOGRID_ERROR,
    }
}

/// Status recorded by the last API call on the handle: 0 when it
/// succeeded (out-of-domain points count as success).
///
/// # Safety
/// `handle` must be NULL or a live handle.
#[no_mangle]
pub unsafe extern "C" fn geogrid_query_error_status(handle: *const geogrid_query_t) -> c_int {
    match handle_ref(handle) {
        Some(handle) => handle.error_status(),
        None => GEOGRID_ERROR,
    }
}

/// Message of the last recorded failure, NULL when there is none. The
/// string is owned by the handle and stays valid until the next API call
/// on it.
///
/// # Safety
/// `handle` must be NULL or a live handle.
#[no_mangle]
pub unsafe extern "C" fn geogrid_query_error_message(
    handle: *const geogrid_query_t,
) -> *const c_char {
    match handle_ref(handle) {
        Some(handle) => handle.error_message(),
        None => ptr::null(),
    }
}

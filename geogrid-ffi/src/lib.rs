//! C API for spatial queries against gridded 3D earth models.
//!
//! A thin opaque-handle façade over [geogrid::prelude::Query]: every entry
//! point takes a `geogrid_query_t` handle, returns an integer status (0
//! success, nonzero failure) or a plain double, and never unwinds across
//! the boundary. Failures are recorded on the handle's error handler,
//! observable through `geogrid_query_error_status` and
//! `geogrid_query_error_message`.
//!
//! ```c
//! geogrid_query_t* query = geogrid_query_create();
//! const char* models[2] = { "bayarea.json", "regional.json" };
//! const char* values[2] = { "vp", "vs" };
//! int status = geogrid_query_initialize(query, models, 2, values, 2, "EPSG:4326");
//!
//! double out[2];
//! status = geogrid_query_query(query, out, 37.75, -122.25, -4.0e+3);
//!
//! geogrid_query_finalize(query);
//! geogrid_query_destroy(&query);
//! ```

mod api;
mod handle;

pub use api::*;
pub use handle::{geogrid_query_t, GEOGRID_ERROR, GEOGRID_OK};

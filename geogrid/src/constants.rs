//! Shared constants.

/// Sentinel emitted wherever "no data here" must be indicated:
/// out-of-domain query points, ground surface outside the model
/// footprint. Returned bit-identical so callers may compare with `==`.
pub const NODATA_VALUE: f64 = -1.0e+20;

//! Caller value selection.

use crate::error::Error;

/// Maps the caller's requested value names onto a model's storage order.
/// The returned vector I satisfies `stored[I[k]] == requested[k]`.
/// An empty request yields an empty vector (elevation-only use).
pub(crate) fn value_indices(
    stored: &[String],
    requested: &[String],
    model: &str,
) -> Result<Vec<usize>, Error> {
    let mut indices = Vec::with_capacity(requested.len());
    for name in requested {
        match stored.iter().position(|stored_name| stored_name == name) {
            Some(index) => indices.push(index),
            None => {
                return Err(Error::UnknownValue {
                    model: model.to_string(),
                    name: name.to_string(),
                });
            },
        }
    }
    Ok(indices)
}

use thiserror::Error;

/// Errors that may rise when preparing or running spatial queries.
#[derive(Debug, Error)]
pub enum Error {
    /// A requested data value is not defined by one of the models.
    #[error("value \"{name}\" is not defined by model \"{model}\"")]
    UnknownValue { model: String, name: String },
    /// A CRS descriptor is not supported, its projection pipeline does
    /// not compile, or a point transform failed.
    #[error("crs \"{definition}\": {reason}")]
    Crs { definition: String, reason: String },
    /// A model container could not be opened or read.
    #[error("failed to read model \"{path}\"")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A model container is not a valid document.
    #[error("model \"{path}\" is not a valid container document")]
    Document {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// A model container violates a structural invariant.
    #[error("malformed model \"{model}\": {reason}")]
    Format { model: String, reason: String },
    /// A query was issued before initialize() or after finalize().
    #[error("query engine is not initialized")]
    NotInitialized,
    /// The output buffer does not hold one slot per requested value.
    #[error("expected room for {expected} values, buffer holds {got}")]
    ValueBufferSize { expected: usize, got: usize },
}

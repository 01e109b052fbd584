#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

pub mod block;
pub mod constants;
pub mod crs;
pub mod error;
pub mod model;
pub mod query;
pub mod reader;
pub mod topography;

mod remap;
mod squash;

#[cfg(test)]
mod tests;

/// Package to include all basic structures
pub mod prelude {
    pub use crate::block::Block;
    pub use crate::constants::NODATA_VALUE;
    pub use crate::crs::CrsTransformer;
    pub use crate::error::Error;
    pub use crate::model::Model;
    pub use crate::query::Query;
    pub use crate::reader::{FileLoader, ModelLoader};
    pub use crate::topography::Topography;
}

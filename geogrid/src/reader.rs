//! Model container reader.
//!
//! Containers are JSON documents, transparently gunzipped when the path
//! ends in `.gz` (requires the `flate2` feature). The document layout
//! mirrors the hierarchical storage format: top-level georeferencing
//! attributes, the stored value names and units, an optional ground
//! surface group, and one group per grid slab carrying a flat row-major
//! dataset plus its shape.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use ndarray::{Array2, Array4};
use serde::Deserialize;

use crate::{block::Block, error::Error, model::Model, topography::Topography};

/// Anything that can produce a fully initialized [Model] from a path.
/// [Query](crate::query::Query) resolves model paths through this seam,
/// so test suites can serve synthetic in-memory models.
pub trait ModelLoader {
    /// Loads the model stored at `path`.
    fn load(&self, path: &str) -> Result<Model, Error>;
}

/// [ModelLoader] reading container documents from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl ModelLoader for FileLoader {
    fn load(&self, path: &str) -> Result<Model, Error> {
        read_model(path)
    }
}

#[derive(Debug, Deserialize)]
struct TopographyDocument {
    resolution_horiz: f64,
    shape: [usize; 2],
    elevation: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct BlockDocument {
    z_top: f64,
    resolution_horiz: f64,
    resolution_vert: f64,
    shape: [usize; 4],
    data: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ModelDocument {
    #[serde(default)]
    name: Option<String>,
    crs: String,
    origin_x: f64,
    origin_y: f64,
    y_azimuth: f64,
    dim_x: f64,
    dim_y: f64,
    dim_z: f64,
    data_values: Vec<String>,
    data_units: Vec<String>,
    #[serde(default)]
    topography: Option<TopographyDocument>,
    blocks: Vec<BlockDocument>,
}

/// Reads the model container stored at `path`.
pub fn read_model<P: AsRef<Path>>(path: P) -> Result<Model, Error> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let file = File::open(path).map_err(|e| Error::Load {
        path: display.clone(),
        source: e,
    })?;

    let document: ModelDocument = if display.ends_with(".gz") {
        #[cfg(feature = "flate2")]
        {
            let reader = BufReader::new(flate2::read::GzDecoder::new(file));
            serde_json::from_reader(reader).map_err(|e| Error::Document {
                path: display.clone(),
                source: e,
            })?
        }
        #[cfg(not(feature = "flate2"))]
        {
            return Err(Error::Format {
                model: display,
                reason: "gzip containers require the flate2 feature".to_string(),
            });
        }
    } else {
        serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::Document {
            path: display.clone(),
            source: e,
        })?
    };

    debug!("read container \"{}\"", display);
    model_from_document(path, document)
}

fn model_from_document(path: &Path, document: ModelDocument) -> Result<Model, Error> {
    let name = match document.name {
        Some(name) => name,
        None => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string()),
    };

    let topography = match document.topography {
        Some(doc) => {
            let [nx_t, ny_t] = doc.shape;
            let nodes =
                Array2::from_shape_vec((nx_t, ny_t), doc.elevation).map_err(|e| Error::Format {
                    model: name.clone(),
                    reason: format!("ground surface dataset: {}", e),
                })?;
            Some(Topography::new(
                (doc.resolution_horiz, doc.resolution_horiz),
                nodes,
            ))
        },
        None => None,
    };

    let mut blocks = Vec::with_capacity(document.blocks.len());
    for (index, doc) in document.blocks.into_iter().enumerate() {
        let [nx, ny, nz, nv] = doc.shape;
        let data = Array4::from_shape_vec((nx, ny, nz, nv), doc.data).map_err(|e| Error::Format {
            model: name.clone(),
            reason: format!("block {} dataset: {}", index, e),
        })?;
        let z_bottom = doc.z_top - nz.saturating_sub(1) as f64 * doc.resolution_vert;
        blocks.push(Block::new(
            doc.z_top,
            z_bottom,
            (doc.resolution_horiz, doc.resolution_horiz),
            doc.resolution_vert,
            data,
        ));
    }

    Model::new(
        name,
        document.crs,
        (document.origin_x, document.origin_y),
        document.y_azimuth,
        (document.dim_x, document.dim_y, document.dim_z),
        document.data_values,
        document.data_units,
        topography,
        blocks,
    )
}

//! Multi-model priority queries.

use log::{debug, trace};

use crate::{
    constants::NODATA_VALUE,
    crs::CrsTransformer,
    error::Error,
    model::Model,
    reader::{FileLoader, ModelLoader},
    remap, squash,
};

/// Per-model query state: the model itself, the pipeline carrying caller
/// coordinates into its CRS, and the caller value selection.
struct Target {
    model: Model,
    transformer: CrsTransformer,
    value_indices: Vec<usize>,
}

/// Spatial query engine over an ordered list of models: the first model
/// whose domain contains a point answers it.
///
/// ```no_run
/// use geogrid::prelude::*;
///
/// let mut query = Query::new();
/// query.initialize(
///     &["bayarea.json", "regional.json"],
///     &["vp", "vs"],
///     "EPSG:4326",
/// )?;
///
/// let mut values = [0.0_f64; 2];
/// let inside = query.query(&mut values, 37.75, -122.25, -4.0e+3)?;
/// let ground = query.query_elevation(37.75, -122.25)?;
///
/// query.finalize();
/// # Ok::<(), Error>(())
/// ```
pub struct Query {
    loader: Box<dyn ModelLoader>,
    targets: Vec<Target>,
    value_names: Vec<String>,
    value_units: Vec<String>,
    squash: bool,
    squash_min_elev: f64,
    initialized: bool,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Query {
    /// Builds a new engine reading model containers from the filesystem.
    pub fn new() -> Self {
        Self::with_loader(Box::new(FileLoader))
    }

    /// Builds a new engine resolving model paths through `loader`.
    pub fn with_loader(loader: Box<dyn ModelLoader>) -> Self {
        Self {
            loader,
            targets: Vec::new(),
            value_names: Vec::new(),
            value_units: Vec::new(),
            squash: false,
            squash_min_elev: 0.0,
            initialized: false,
        }
    }

    /// True when squashing deforms the vertical coordinate.
    pub fn squashing(&self) -> bool {
        self.squash
    }

    /// Elevation (m) at or above which topography is folded out of the
    /// vertical coordinate when squashing.
    pub fn squash_min_elev(&self) -> f64 {
        self.squash_min_elev
    }

    /// Sets the squashing cutoff elevation and enables squashing.
    /// Geometry below the cutoff is not perturbed.
    pub fn set_squash_min_elev(&mut self, elevation: f64) {
        self.squash_min_elev = elevation;
        self.squash = true;
    }

    /// Turns squashing on or off. The cutoff keeps its current value; it
    /// starts out at 0.0, meaning "squash only at or above sea level"
    /// until [Self::set_squash_min_elev] is called.
    pub fn set_squashing(&mut self, squash: bool) {
        self.squash = squash;
    }

    /// Requested value names, in caller order.
    pub fn value_names(&self) -> &[String] {
        &self.value_names
    }

    /// Units per requested value, as declared by the highest priority
    /// model. Empty until initialized.
    pub fn value_units(&self) -> &[String] {
        &self.value_units
    }

    /// Number of models serving queries.
    pub fn num_models(&self) -> usize {
        self.targets.len()
    }

    /// Loads `models` in priority order and prepares their value
    /// selections and projection pipelines. `value_names` may be empty for
    /// elevation-only use; otherwise every model must define every name.
    /// Point coordinates handed to the query operations are interpreted in
    /// `input_crs`.
    ///
    /// Replaces any prior state. On failure the engine stays unusable
    /// until a later initialize succeeds.
    pub fn initialize<T: AsRef<str>, U: AsRef<str>>(
        &mut self,
        models: &[T],
        value_names: &[U],
        input_crs: &str,
    ) -> Result<(), Error> {
        self.finalize();
        self.value_names = value_names
            .iter()
            .map(|name| name.as_ref().to_string())
            .collect();

        let mut targets = Vec::with_capacity(models.len());
        for path in models {
            let model = self.loader.load(path.as_ref())?;
            let value_indices =
                remap::value_indices(model.value_names(), &self.value_names, model.name())?;
            let transformer = CrsTransformer::new(input_crs, model.crs())?;
            debug!("model \"{}\" ready for queries", model.name());
            targets.push(Target {
                model,
                transformer,
                value_indices,
            });
        }

        if let Some(first) = targets.first() {
            self.value_units = first
                .value_indices
                .iter()
                .map(|&index| first.model.value_units()[index].clone())
                .collect();
        }
        self.targets = targets;
        self.initialized = true;
        Ok(())
    }

    /// Ground surface elevation (m) at (x, y) in the input CRS. The first
    /// model whose footprint covers the point answers; [NODATA_VALUE] when
    /// every model misses.
    pub fn query_elevation(&self, x: f64, y: f64) -> Result<f64, Error> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        for target in &self.targets {
            let (xm, ym, _) = match target.transformer.transform(x, y, 0.0) {
                Ok(point) => point,
                Err(error) => {
                    trace!("\"{}\": {}", target.model.name(), error);
                    continue;
                },
            };
            let (xl, yl, _) = target.model.local_from_crs(xm, ym, 0.0);
            let elevation = target.model.elevation(xl, yl);
            if elevation != NODATA_VALUE {
                return Ok(elevation);
            }
        }
        Ok(NODATA_VALUE)
    }

    /// Samples the models at (x, y, z) in the input CRS. `values` must
    /// hold one slot per requested value name and is written in the
    /// requested order. Yields false with [NODATA_VALUE] in every slot
    /// when no model contains the point: out-of-domain is a result, not
    /// an error.
    pub fn query(&self, values: &mut [f64], x: f64, y: f64, z: f64) -> Result<bool, Error> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        if values.len() != self.value_names.len() {
            return Err(Error::ValueBufferSize {
                expected: self.value_names.len(),
                got: values.len(),
            });
        }

        for target in &self.targets {
            let (xm, ym, zm) = match target.transformer.transform(x, y, z) {
                Ok(point) => point,
                Err(error) => {
                    trace!("\"{}\": {}", target.model.name(), error);
                    continue;
                },
            };
            let (xl, yl, mut zl) = target.model.local_from_crs(xm, ym, zm);
            if self.squash {
                let ground = target.model.elevation(xl, yl);
                zl = squash::squashed_z(zl, ground, self.squash_min_elev);
            }
            if target
                .model
                .query(values, &target.value_indices, xl, yl, zl)
            {
                return Ok(true);
            }
        }

        for slot in values.iter_mut() {
            *slot = NODATA_VALUE;
        }
        Ok(false)
    }

    /// Releases every model. Idempotent; a finalized engine can be
    /// reinitialized.
    pub fn finalize(&mut self) {
        self.targets.clear();
        self.value_names.clear();
        self.value_units.clear();
        self.initialized = false;
    }
}

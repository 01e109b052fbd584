//! Layered model: metadata, grid stack, local frame.

use itertools::Itertools;
use log::trace;

use crate::{block::Block, constants::NODATA_VALUE, error::Error, topography::Topography};

/// A georeferenced layered volumetric model: an axis-aligned rectangular
/// volume in its own CRS, discretized as blocks stacked in z, bounded from
/// above by an optional ground surface. The local frame has its origin at
/// the model corner, x and y along the model axes and z as elevation
/// (negative below sea level).
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Model name, used in error reports and traces
    name: String,
    /// CRS descriptor of model coordinates
    crs: String,
    /// Local frame origin in model CRS coordinates
    origin: (f64, f64),
    /// Azimuth of the local +y axis, degrees east of north
    y_azimuth: f64,
    /// Horizontal extent (m) of the local frame
    extent: (f64, f64),
    /// Elevation (m) of the grid bottom and top
    z_range: (f64, f64),
    /// Stored value names, in storage order
    value_names: Vec<String>,
    /// Units per stored value
    value_units: Vec<String>,
    /// Ground surface, flat z = 0 when absent
    topography: Option<Topography>,
    /// Grid slabs, ordered by decreasing z_top
    blocks: Vec<Block>,
}

// metadata attributes agree within this much, relative to their magnitude
fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1.0e-6 * a.abs().max(b.abs()).max(1.0)
}

impl Model {
    /// Builds a new [Model] and validates every structural invariant:
    /// nonempty unique value names, blocks partitioning [z_min, z_max]
    /// top-down without gaps or overlap, per-block grids spanning the
    /// model extents, and a ground surface covering the footprint.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        crs: String,
        origin: (f64, f64),
        y_azimuth: f64,
        dims: (f64, f64, f64),
        value_names: Vec<String>,
        value_units: Vec<String>,
        topography: Option<Topography>,
        blocks: Vec<Block>,
    ) -> Result<Self, Error> {
        let malformed = |reason: String| Error::Format {
            model: name.clone(),
            reason,
        };

        let (dim_x, dim_y, dim_z) = dims;
        if !(dim_x > 0.0 && dim_y > 0.0 && dim_z > 0.0) {
            return Err(malformed(format!(
                "dimensions ({}, {}, {}) are not positive",
                dim_x, dim_y, dim_z
            )));
        }
        if value_names.is_empty() {
            return Err(malformed("no value names".to_string()));
        }
        if value_names.iter().duplicates().next().is_some() {
            return Err(malformed("duplicate value names".to_string()));
        }
        if value_units.len() != value_names.len() {
            return Err(malformed(format!(
                "{} value names but {} units",
                value_names.len(),
                value_units.len()
            )));
        }

        let z_top = match blocks.first() {
            Some(block) => block.z_top(),
            None => return Err(malformed("no blocks".to_string())),
        };
        if z_top < 0.0 {
            return Err(malformed(format!("top of grid at z = {}", z_top)));
        }
        for (index, pair) in blocks.iter().tuple_windows::<(_, _)>().enumerate() {
            let (upper, lower) = pair;
            if !close(upper.z_bottom(), lower.z_top()) {
                return Err(malformed(format!(
                    "blocks {} and {} do not stack: z = {} vs {}",
                    index,
                    index + 1,
                    upper.z_bottom(),
                    lower.z_top()
                )));
            }
        }
        let z_bottom = blocks[blocks.len() - 1].z_bottom();
        if !close(z_top - z_bottom, dim_z) {
            return Err(malformed(format!(
                "blocks span [{}, {}] but dim_z = {}",
                z_bottom, z_top, dim_z
            )));
        }

        for (index, block) in blocks.iter().enumerate() {
            let (nx, ny, nz) = block.num_nodes();
            if nx < 2 || ny < 2 || nz < 2 {
                return Err(malformed(format!(
                    "block {} grid is degenerate: {}x{}x{} nodes",
                    index, nx, ny, nz
                )));
            }
            if block.num_values() != value_names.len() {
                return Err(malformed(format!(
                    "block {} stores {} values, expected {}",
                    index,
                    block.num_values(),
                    value_names.len()
                )));
            }
            if block.z_top() <= block.z_bottom() {
                return Err(malformed(format!("block {} has no thickness", index)));
            }
            let (dx, dy) = block.resolution_horiz();
            if !close((nx - 1) as f64 * dx, dim_x) || !close((ny - 1) as f64 * dy, dim_y) {
                return Err(malformed(format!(
                    "block {} grid does not span the {} x {} m extent",
                    index, dim_x, dim_y
                )));
            }
            let thickness = (nz - 1) as f64 * block.resolution_vert();
            if !close(thickness, block.z_top() - block.z_bottom()) {
                return Err(malformed(format!(
                    "block {} grid spans {} m of its {} m thickness",
                    index,
                    thickness,
                    block.z_top() - block.z_bottom()
                )));
            }
        }

        if let Some(topography) = &topography {
            let (nx_t, ny_t) = topography.num_nodes();
            if nx_t < 2 || ny_t < 2 {
                return Err(malformed(format!(
                    "ground surface grid is degenerate: {}x{} nodes",
                    nx_t, ny_t
                )));
            }
            let (x_span, y_span) = topography.extent();
            if !close(x_span, dim_x) || !close(y_span, dim_y) {
                return Err(malformed(format!(
                    "ground surface covers {} x {} m of the {} x {} m footprint",
                    x_span, y_span, dim_x, dim_y
                )));
            }
        }

        Ok(Self {
            name,
            crs,
            origin,
            y_azimuth,
            extent: (dim_x, dim_y),
            z_range: (z_bottom, z_top),
            value_names,
            value_units,
            topography,
            blocks,
        })
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// CRS descriptor of model coordinates.
    pub fn crs(&self) -> &str {
        &self.crs
    }

    /// Local frame origin in model CRS coordinates.
    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    /// Azimuth of the local +y axis, degrees east of north.
    pub fn y_azimuth(&self) -> f64 {
        self.y_azimuth
    }

    /// Horizontal extent (m) of the local frame.
    pub fn extent(&self) -> (f64, f64) {
        self.extent
    }

    /// Elevation (m) of the grid bottom and top.
    pub fn z_range(&self) -> (f64, f64) {
        self.z_range
    }

    /// Stored value names, in storage order.
    pub fn value_names(&self) -> &[String] {
        &self.value_names
    }

    /// Units per stored value.
    pub fn value_units(&self) -> &[String] {
        &self.value_units
    }

    /// Ground surface, None when the model top is flat at z = 0.
    pub fn topography(&self) -> Option<&Topography> {
        self.topography.as_ref()
    }

    /// Grid slabs, ordered by decreasing z_top.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Converts a point in the model CRS into the local frame: origin
    /// subtracted, axes rotated by -azimuth.
    pub fn local_from_crs(&self, xm: f64, ym: f64, zm: f64) -> (f64, f64, f64) {
        let (sin_az, cos_az) = self.y_azimuth.to_radians().sin_cos();
        let dx = xm - self.origin.0;
        let dy = ym - self.origin.1;
        (dx * cos_az - dy * sin_az, dx * sin_az + dy * cos_az, zm)
    }

    /// True when the local point lies inside the model domain. The ground
    /// surface bounds the domain from above when topography exists; the
    /// bound is strict, with no tolerance margin.
    pub fn contains(&self, x: f64, y: f64, z: f64) -> bool {
        let (x_max, y_max) = self.extent;
        let (z_min, z_max) = self.z_range;
        if !(x >= 0.0 && x <= x_max && y >= 0.0 && y <= y_max) {
            return false;
        }
        let top = match &self.topography {
            Some(topography) => topography.elevation(x, y),
            None => z_max,
        };
        if top == NODATA_VALUE {
            // footprint corner beyond the surface grid counts as outside
            return false;
        }
        z >= z_min && z <= top
    }

    /// Ground surface elevation (m) at a local point: the topography
    /// lookup, 0.0 for a flat-top model, [NODATA_VALUE] outside the
    /// horizontal footprint.
    pub fn elevation(&self, x: f64, y: f64) -> f64 {
        let (x_max, y_max) = self.extent;
        if !(x >= 0.0 && x <= x_max && y >= 0.0 && y <= y_max) {
            return NODATA_VALUE;
        }
        match &self.topography {
            Some(topography) => topography.elevation(x, y),
            None => 0.0,
        }
    }

    /// Samples the model at a local point. The slab owning z interpolates;
    /// on a shared slab boundary the upper slab wins. `values[k]` receives
    /// the value of storage index `indices[k]`. Returns false when the
    /// point falls outside the domain, leaving `values` untouched.
    pub fn query(&self, values: &mut [f64], indices: &[usize], x: f64, y: f64, z: f64) -> bool {
        if !self.contains(x, y, z) {
            trace!("({}, {}, {}) is outside model \"{}\"", x, y, z, self.name);
            return false;
        }
        let (z_min, z_max) = self.z_range;
        // under topography the domain tops out above the grid; such points
        // sample the top grid plane
        let z_grid = z.clamp(z_min, z_max);
        for block in &self.blocks {
            if block.spans(z_grid) {
                block.query(values, indices, x, y, z_grid);
                return true;
            }
        }
        false
    }
}

//! Point transformation between the caller CRS and each model CRS.

use geodesy::prelude::*;

use crate::error::Error;

/// Forward-transforms 3D points from a source CRS into a destination CRS
/// through one Rust Geodesy pipeline compiled at construction. The z axis
/// means elevation in meters (positive up) on both sides; projection
/// operators pass it through untouched.
///
/// Supported CRS descriptors:
/// - `EPSG:4326`: geographic WGS84, axis order (latitude, longitude), degrees
/// - `EPSG:32601`..`EPSG:32660`: UTM north, meters
/// - `EPSG:32701`..`EPSG:32760`: UTM south, meters
/// - any Rust Geodesy operator definition (e.g. `utm zone=10`), taken as
///   mapping geographic coordinates onto the projected frame
pub struct CrsTransformer {
    ctx: Minimal,
    op: OpHandle,
    definition: String,
}

impl CrsTransformer {
    /// Compiles the pipeline carrying `src_crs` coordinates onto `dst_crs`.
    pub fn new(src_crs: &str, dst_crs: &str) -> Result<Self, Error> {
        let definition = format!("{} | {}", inbound_stage(src_crs)?, outbound_stage(dst_crs)?);
        let mut ctx = Minimal::new();
        let op = ctx.op(&definition).map_err(|e| Error::Crs {
            definition: definition.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            ctx,
            op,
            definition,
        })
    }

    /// Forward-transforms one point.
    pub fn transform(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64), Error> {
        let mut points = [Coor4D::raw(x, y, z, 0.0)];
        let converted = self
            .ctx
            .apply(self.op, Fwd, &mut points)
            .map_err(|e| Error::Crs {
                definition: self.definition.clone(),
                reason: e.to_string(),
            })?;
        if converted != points.len() {
            return Err(Error::Crs {
                definition: self.definition.clone(),
                reason: format!("({}, {}, {}) is not transformable", x, y, z),
            });
        }
        Ok((points[0][0], points[0][1], points[0][2]))
    }
}

/// Forward (geographic -> projected) definition for one CRS descriptor,
/// None for a geographic CRS.
fn projection(crs: &str) -> Result<Option<String>, Error> {
    let trimmed = crs.trim();
    if trimmed.is_empty() {
        return Err(Error::Crs {
            definition: crs.to_string(),
            reason: "empty descriptor".to_string(),
        });
    }
    if let Some(code) = trimmed
        .strip_prefix("EPSG:")
        .or_else(|| trimmed.strip_prefix("epsg:"))
    {
        let code = code.parse::<u32>().map_err(|_| Error::Crs {
            definition: crs.to_string(),
            reason: "EPSG code is not numeric".to_string(),
        })?;
        return match code {
            4326 => Ok(None),
            32601..=32660 => Ok(Some(format!("utm zone={}", code - 32600))),
            32701..=32760 => Ok(Some(format!(
                "utm zone={} | helmert y=10000000",
                code - 32700
            ))),
            _ => Err(Error::Crs {
                definition: crs.to_string(),
                reason: "EPSG code is not supported".to_string(),
            }),
        };
    }
    // raw Rust Geodesy definition
    Ok(Some(trimmed.to_string()))
}

/// Pipeline stage carrying source coordinates into the internal
/// geographic representation.
fn inbound_stage(crs: &str) -> Result<String, Error> {
    match projection(crs)? {
        None => Ok("geo:in".to_string()),
        Some(forward) => {
            // invert the forward definition, step by step in reverse order
            let inverted = forward
                .split('|')
                .rev()
                .map(|step| format!("{} inv", step.trim()))
                .collect::<Vec<_>>()
                .join(" | ");
            Ok(inverted)
        },
    }
}

/// Pipeline stage carrying the internal geographic representation onto
/// destination coordinates.
fn outbound_stage(crs: &str) -> Result<String, Error> {
    match projection(crs)? {
        None => Ok("geo:out".to_string()),
        Some(forward) => Ok(forward),
    }
}

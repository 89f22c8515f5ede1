use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Top-level roof algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoofType {
    Flat,
    Gable,
    #[default]
    Hip,
}

/// How the ends of a gable roof are finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GableType {
    /// Roof surfaces overhang the gable walls.
    #[default]
    Open,
    /// Roof surfaces are thickened in place over a slab.
    Box,
}

/// User-facing roof options.
///
/// Missing fields take their default, so `{"type": "GABLE"}` is a complete
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoofConfig {
    #[serde(rename = "type")]
    pub kind: RoofType,
    pub gable_type: GableType,
    /// Ridge elevation above the footprint median.
    pub height: f64,
    /// Vertical extrusion depth of the roof covering.
    pub thickness: f64,
    /// Horizontal eave overhang.
    pub outset: f64,
}

impl Default for RoofConfig {
    fn default() -> Self {
        Self {
            kind: RoofType::Hip,
            gable_type: GableType::Open,
            height: 1.0,
            thickness: 0.1,
            outset: 0.1,
        }
    }
}

impl RoofConfig {
    /// Checks that every numeric option is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] if `height` is not positive,
    /// `thickness` or `outset` is negative, or any value is not finite.
    pub fn validate(&self) -> Result<()> {
        check("height", self.height, self.height > 0.0, "finite and > 0")?;
        check("thickness", self.thickness, self.thickness >= 0.0, "finite and >= 0")?;
        check("outset", self.outset, self.outset >= 0.0, "finite and >= 0")?;
        Ok(())
    }
}

fn check(option: &'static str, value: f64, in_range: bool, requirement: &'static str) -> Result<()> {
    if value.is_finite() && in_range {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            option,
            value,
            requirement,
        }
        .into())
    }
}

use serde::{Deserialize, Serialize};

use crate::core::types::DataPoint;
use crate::error::{PlotError, PlotResult};

/// Ordered curve samples used for reference lines and graph overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    points: Vec<DataPoint>,
}

impl Curve {
    pub fn new(points: Vec<DataPoint>) -> PlotResult<Self> {
        if points.is_empty() {
            return Err(PlotError::InvalidData(
                "curve needs at least one point".to_owned(),
            ));
        }
        if points.iter().any(|point| !point.is_finite()) {
            return Err(PlotError::InvalidData(
                "curve points must be finite".to_owned(),
            ));
        }
        if points.windows(2).any(|pair| pair[1].x < pair[0].x) {
            return Err(PlotError::InvalidData(
                "curve points must be ordered by x".to_owned(),
            ));
        }
        Ok(Self { points })
    }

    /// Horizontal reference line at `y` spanning `[lo, hi]`.
    pub fn horizontal(y: f64, lo: f64, hi: f64) -> PlotResult<Self> {
        Self::new(vec![DataPoint::new(lo, y), DataPoint::new(hi, y)])
    }

    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    #[must_use]
    pub fn x_min(&self) -> f64 {
        self.points[0].x
    }

    #[must_use]
    pub fn x_max(&self) -> f64 {
        self.points[self.points.len() - 1].x
    }
}

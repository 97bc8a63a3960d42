use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Curve, Distribution, DrawStyle, MarkerStyle, StackedAggregate};
use crate::error::{PlotError, PlotResult};
use crate::style::Color;

/// Value-cloned payload handed to the surface for one draw call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawObject {
    Distribution(Distribution),
    Stacked(StackedAggregate),
    Curve(Curve),
}

/// Synthetic replacement label for one tick position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickLabel {
    pub value: f64,
    pub text: String,
}

/// Resolved styling for one axis side of the base layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSide {
    pub title: Option<String>,
    pub title_size: f64,
    pub label_size: f64,
    pub title_offset: f64,
    pub label_offset: f64,
    pub divisions: (u32, u32),
    pub tick_length: f64,
}

impl AxisSide {
    fn validate(&self) -> PlotResult<()> {
        for (name, value) in [
            ("title_size", self.title_size),
            ("label_size", self.label_size),
            ("title_offset", self.title_offset),
            ("label_offset", self.label_offset),
            ("tick_length", self.tick_length),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlotError::InvalidData(format!(
                    "axis {name} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}

/// Fully materialized axis formatting, applied to the base layer only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisFrame {
    pub x: AxisSide,
    pub y: AxisSide,
    pub log_x: bool,
    pub log_y: bool,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    /// Replacement tick labels for the x axis (unrolled sub-panels).
    pub x_tick_labels: SmallVec<[TickLabel; 4]>,
}

impl AxisFrame {
    pub fn validate(&self) -> PlotResult<()> {
        self.x.validate()?;
        self.y.validate()?;
        for (axis, range, log) in [
            ("x", self.x_range, self.log_x),
            ("y", self.y_range, self.log_y),
        ] {
            let Some((lo, hi)) = range else {
                continue;
            };
            if !lo.is_finite() || !hi.is_finite() || hi <= lo {
                return Err(PlotError::InvalidData(format!(
                    "{axis} range must be finite and non-empty"
                )));
            }
            if log && lo <= 0.0 {
                return Err(PlotError::InvalidData(format!(
                    "log-scaled {axis} range must have a positive lower bound"
                )));
            }
        }
        for label in &self.x_tick_labels {
            if !label.value.is_finite() || label.text.is_empty() {
                return Err(PlotError::InvalidData(
                    "tick labels must be finite and non-empty".to_owned(),
                ));
            }
        }
        Ok(())
    }
}

/// One draw call issued to the surface.
///
/// The first (base) draw of a panel carries the axis frame; overlays never
/// do, so user-chosen ranges are applied exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRequest {
    pub series: String,
    pub object: DrawObject,
    pub mode: String,
    pub overlay: bool,
    pub style: DrawStyle,
    pub axis: Option<AxisFrame>,
}

impl DrawRequest {
    pub fn validate(&self) -> PlotResult<()> {
        if self.series.is_empty() {
            return Err(PlotError::InvalidData(
                "draw request needs a series name".to_owned(),
            ));
        }
        if self.overlay && self.axis.is_some() {
            return Err(PlotError::InvalidData(
                "overlay draws must not carry an axis frame".to_owned(),
            ));
        }
        if !self.overlay && self.axis.is_none() {
            return Err(PlotError::InvalidData(
                "base draws must carry an axis frame".to_owned(),
            ));
        }
        if !self.style.line_width.is_finite() || self.style.line_width <= 0.0 {
            return Err(PlotError::InvalidData(
                "line width must be finite and > 0".to_owned(),
            ));
        }
        self.style.line_color.validate()?;
        if let Some(fill) = self.style.fill_color {
            fill.validate()?;
        }
        if let Some(axis) = &self.axis {
            axis.validate()?;
        }
        Ok(())
    }
}

/// Horizontal text alignment relative to `TextPrimitive::x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// Draw command for one label in normalized surface coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub angle_deg: f64,
    pub color: Color,
    pub h_align: TextHAlign,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(text: impl Into<String>, x: f64, y: f64, size: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            size,
            angle_deg: 0.0,
            color: Color::BLACK,
            h_align: TextHAlign::Left,
        }
    }

    #[must_use]
    pub fn with_angle(mut self, angle_deg: f64) -> Self {
        self.angle_deg = angle_deg;
        self
    }

    #[must_use]
    pub fn with_align(mut self, h_align: TextHAlign) -> Self {
        self.h_align = h_align;
        self
    }

    pub fn validate(&self) -> PlotResult<()> {
        if self.text.is_empty() {
            return Err(PlotError::InvalidData(
                "text primitive must not be empty".to_owned(),
            ));
        }
        if !self.x.is_finite() || !self.y.is_finite() || !self.angle_deg.is_finite() {
            return Err(PlotError::InvalidData(
                "text position and angle must be finite".to_owned(),
            ));
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(PlotError::InvalidData(
                "text size must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// One rendered legend entry in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntryFrame {
    pub panel_index: usize,
    pub series: String,
    pub label: String,
    pub mode: String,
    pub line_color: Color,
    pub fill_color: Option<Color>,
    pub marker: MarkerStyle,
}

/// Materialized legend box in normalized surface coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendFrame {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub columns: u32,
    pub text_size: f64,
    pub fill_color: Color,
    pub entries: Vec<LegendEntryFrame>,
}

impl LegendFrame {
    pub fn validate(&self) -> PlotResult<()> {
        for (name, value) in [
            ("x1", self.x1),
            ("y1", self.y1),
            ("x2", self.x2),
            ("y2", self.y2),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PlotError::InvalidData(format!(
                    "legend corner `{name}` must be finite and in [0, 1]"
                )));
            }
        }
        if self.x2 <= self.x1 || self.y2 <= self.y1 {
            return Err(PlotError::InvalidData(
                "legend box must have positive extent".to_owned(),
            ));
        }
        if self.columns == 0 {
            return Err(PlotError::InvalidData(
                "legend needs at least one column".to_owned(),
            ));
        }
        if !self.text_size.is_finite() || self.text_size <= 0.0 {
            return Err(PlotError::InvalidData(
                "legend text size must be finite and > 0".to_owned(),
            ));
        }
        self.fill_color.validate()
    }
}

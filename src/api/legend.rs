use serde::{Deserialize, Serialize};

use crate::api::panel::Panel;
use crate::error::{PlotError, PlotResult};
use crate::render::{LegendEntryFrame, LegendFrame};
use crate::style::{Color, StyleSheet};

/// Six canonical legend positions relative to the reference panel's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegendAnchor {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

/// One ordered legend entry referencing a series that already exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub panel_index: usize,
    pub series: String,
    pub label: String,
    pub mode: String,
}

/// Anchored legend box computed from a reference panel's margins.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    reference_panel: usize,
    corners: (f64, f64, f64, f64),
    entries: Vec<LegendEntry>,
    text_size_scale: f64,
    columns: u32,
    fill_color: Color,
    alpha: f64,
}

impl Legend {
    /// Computes the four corners directly from the reference panel's margins,
    /// a width, a height and an offset. No iterative layout.
    pub fn new(
        reference_panel: &Panel,
        width: f64,
        height: f64,
        anchor: LegendAnchor,
        offset: f64,
    ) -> PlotResult<Self> {
        for (name, value) in [("width", width), ("height", height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlotError::Configuration(format!(
                    "legend {name} must be finite and > 0"
                )));
            }
        }
        if !offset.is_finite() || offset < 0.0 {
            return Err(PlotError::Configuration(
                "legend offset must be finite and >= 0".to_owned(),
            ));
        }
        let margins = reference_panel.margins();
        let (l, t, b, r) = (margins.left, margins.top, margins.bottom, margins.right);
        let o = offset;

        let (x1, x2) = match anchor {
            LegendAnchor::TopLeft | LegendAnchor::BottomLeft => (l + o, l + o + width),
            LegendAnchor::TopCenter | LegendAnchor::BottomCenter => {
                let center = l + 0.5 * (1.0 - l - r);
                (center - 0.5 * width, center + 0.5 * width)
            }
            LegendAnchor::TopRight | LegendAnchor::BottomRight => {
                (1.0 - r - o - width, 1.0 - r - o)
            }
        };
        let (y1, y2) = match anchor {
            LegendAnchor::TopLeft | LegendAnchor::TopCenter | LegendAnchor::TopRight => {
                (1.0 - t - o - height, 1.0 - t - o)
            }
            LegendAnchor::BottomLeft
            | LegendAnchor::BottomCenter
            | LegendAnchor::BottomRight => (b + o, b + o + height),
        };

        Ok(Self {
            reference_panel: reference_panel.index(),
            corners: (x1, y1, x2, y2),
            entries: Vec::new(),
            text_size_scale: 1.0,
            columns: 1,
            fill_color: Color::WHITE.with_alpha(0.0),
            alpha: 1.0,
        })
    }

    #[must_use]
    pub fn reference_panel(&self) -> usize {
        self.reference_panel
    }

    #[must_use]
    pub fn corners(&self) -> (f64, f64, f64, f64) {
        self.corners
    }

    #[must_use]
    pub fn n_entries(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    /// Appends an entry. The caller (`Plot`) has already verified that the
    /// referenced series exists in the named panel.
    pub(crate) fn push_entry(&mut self, entry: LegendEntry) {
        self.entries.push(entry);
    }

    pub fn scale_text_size(&mut self, scale: f64) -> PlotResult<()> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PlotError::InvalidData(
                "legend text scale must be finite and > 0".to_owned(),
            ));
        }
        self.text_size_scale = scale;
        Ok(())
    }

    pub fn set_n_columns(&mut self, columns: u32) -> PlotResult<()> {
        if columns == 0 {
            return Err(PlotError::Configuration(
                "legend needs at least one column".to_owned(),
            ));
        }
        self.columns = columns;
        Ok(())
    }

    pub fn set_fill_color(&mut self, color: Color) -> PlotResult<()> {
        color.validate()?;
        self.fill_color = color;
        Ok(())
    }

    pub fn set_alpha(&mut self, alpha: f64) -> PlotResult<()> {
        if !alpha.is_finite() || !(0.0..=1.0).contains(&alpha) {
            return Err(PlotError::InvalidData(
                "legend alpha must be in [0, 1]".to_owned(),
            ));
        }
        self.alpha = alpha;
        Ok(())
    }

    /// Materializes the legend for the surface, pulling entry colors from
    /// the owning panels' current series styles.
    pub(crate) fn frame(&self, panels: &[Panel], sheet: &StyleSheet) -> PlotResult<LegendFrame> {
        let (x1, y1, x2, y2) = self.corners;
        let mut entries = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let panel = panels
                .get(entry.panel_index)
                .ok_or_else(|| PlotError::Configuration(format!(
                    "legend entry references panel {} of {}",
                    entry.panel_index,
                    panels.len()
                )))?;
            let series = panel
                .series(&entry.series)
                .ok_or_else(|| PlotError::NotFound {
                    selector: entry.series.clone(),
                })?;
            entries.push(LegendEntryFrame {
                panel_index: entry.panel_index,
                series: entry.series.clone(),
                label: entry.label.clone(),
                mode: entry.mode.clone(),
                line_color: series.style.line_color,
                fill_color: series.style.fill_color,
                marker: series.style.marker,
            });
        }
        Ok(LegendFrame {
            x1,
            y1,
            x2,
            y2,
            columns: self.columns,
            text_size: sheet.legend_text_size * self.text_size_scale,
            fill_color: self.fill_color.with_alpha(self.alpha * self.fill_color.alpha),
            entries,
        })
    }
}

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::legend::{Legend, LegendAnchor, LegendEntry};
use crate::api::panel::Panel;
use crate::core::{Curve, Distribution, DrawStyle, PanelRegion};
use crate::error::{PlotError, PlotResult};
use crate::render::{Surface, TextHAlign, TextPrimitive};
use crate::style::StyleSheet;

/// One entry of the split list: a clean boundary, or a pair encoding a
/// visual gap between two panels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PanelSplit {
    At(f64),
    Gap { lower: f64, boundary: f64 },
}

impl PanelSplit {
    #[must_use]
    pub const fn at(fraction: f64) -> Self {
        Self::At(fraction)
    }

    #[must_use]
    pub const fn gap(lower: f64, boundary: f64) -> Self {
        Self::Gap { lower, boundary }
    }
}

/// Top-level composition: an ordered stack of panels partitioning one
/// surface, plus the legends anchored to them.
///
/// The panel stack is built once at construction and never resized.
pub struct Plot<S: Surface> {
    surface: S,
    stylesheet: StyleSheet,
    panels: Vec<Panel>,
    legends: Vec<Legend>,
}

impl<S: Surface> Plot<S> {
    /// Books one panel per split entry from top to bottom, plus a final
    /// panel covering the remainder down to zero.
    pub fn new(surface: S, splits: &[PanelSplit], stylesheet: StyleSheet) -> PlotResult<Self> {
        stylesheet.validate()?;
        let regions = partition_regions(splits)?;
        let mut panels = Vec::with_capacity(regions.len());
        for (index, region) in regions.into_iter().enumerate() {
            panels.push(Panel::new(index, region, stylesheet.clone())?);
        }
        Ok(Self {
            surface,
            stylesheet,
            panels,
            legends: Vec::new(),
        })
    }

    #[must_use]
    pub fn n_panels(&self) -> usize {
        self.panels.len()
    }

    #[must_use]
    pub fn n_legends(&self) -> usize {
        self.legends.len()
    }

    pub fn panel(&self, index: usize) -> PlotResult<&Panel> {
        self.panels.get(index).ok_or_else(|| {
            PlotError::Configuration(format!(
                "panel index {index} out of range for {} panels",
                self.panels.len()
            ))
        })
    }

    pub fn panel_mut(&mut self, index: usize) -> PlotResult<&mut Panel> {
        let count = self.panels.len();
        self.panels.get_mut(index).ok_or_else(|| {
            PlotError::Configuration(format!(
                "panel index {index} out of range for {count} panels"
            ))
        })
    }

    pub fn legend(&self, index: usize) -> PlotResult<&Legend> {
        self.legends.get(index).ok_or_else(|| {
            PlotError::Configuration(format!(
                "legend index {index} out of range for {} legends",
                self.legends.len()
            ))
        })
    }

    pub fn legend_mut(&mut self, index: usize) -> PlotResult<&mut Legend> {
        let count = self.legends.len();
        self.legends.get_mut(index).ok_or_else(|| {
            PlotError::Configuration(format!(
                "legend index {index} out of range for {count} legends"
            ))
        })
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }

    #[must_use]
    pub fn stylesheet(&self) -> &StyleSheet {
        &self.stylesheet
    }

    // ---- broadcast fan-outs ---------------------------------------------

    /// Registers a distribution copy in every panel.
    pub fn add_dist(&mut self, dist: &Distribution, name: &str, group: &str) -> PlotResult<()> {
        for panel in &mut self.panels {
            panel.add_dist(dist, name, group)?;
        }
        Ok(())
    }

    /// Registers a curve copy in every panel.
    pub fn add_curve(&mut self, curve: &Curve, name: &str, group: &str) -> PlotResult<()> {
        for panel in &mut self.panels {
            panel.add_curve(curve, name, group)?;
        }
        Ok(())
    }

    /// Builds the same stack in every panel.
    pub fn create_stack(&mut self, members: &[&str], name: &str, group: &str) -> PlotResult<()> {
        for panel in &mut self.panels {
            panel.create_stack(members, name, group)?;
        }
        Ok(())
    }

    /// Applies one draw style to a name or group in every panel.
    pub fn set_series_style(&mut self, selector: &str, style: DrawStyle) -> PlotResult<()> {
        for panel in &mut self.panels {
            panel.set_series_style(selector, style.clone())?;
        }
        Ok(())
    }

    pub fn set_x_lims(&mut self, lo: f64, hi: f64) -> PlotResult<()> {
        for panel in &mut self.panels {
            panel.set_x_lims(lo, hi)?;
        }
        Ok(())
    }

    pub fn set_n_x_divisions(&mut self, primary: u32, secondary: u32) {
        for panel in &mut self.panels {
            panel.set_n_x_divisions(primary, secondary);
        }
    }

    pub fn scale_x_label_size(&mut self, value: f64) -> PlotResult<()> {
        for panel in &mut self.panels {
            panel.scale_x_label_size(value)?;
        }
        Ok(())
    }

    pub fn scale_y_label_size(&mut self, value: f64) -> PlotResult<()> {
        for panel in &mut self.panels {
            panel.scale_y_label_size(value)?;
        }
        Ok(())
    }

    pub fn scale_x_title_size(&mut self, value: f64) -> PlotResult<()> {
        for panel in &mut self.panels {
            panel.scale_x_title_size(value)?;
        }
        Ok(())
    }

    pub fn scale_y_title_size(&mut self, value: f64) -> PlotResult<()> {
        for panel in &mut self.panels {
            panel.scale_y_title_size(value)?;
        }
        Ok(())
    }

    pub fn scale_x_label_offset(&mut self, value: f64) -> PlotResult<()> {
        for panel in &mut self.panels {
            panel.scale_x_label_offset(value)?;
        }
        Ok(())
    }

    pub fn scale_y_label_offset(&mut self, value: f64) -> PlotResult<()> {
        for panel in &mut self.panels {
            panel.scale_y_label_offset(value)?;
        }
        Ok(())
    }

    pub fn scale_x_title_offset(&mut self, value: f64) -> PlotResult<()> {
        for panel in &mut self.panels {
            panel.scale_x_title_offset(value)?;
        }
        Ok(())
    }

    pub fn scale_y_title_offset(&mut self, value: f64) -> PlotResult<()> {
        for panel in &mut self.panels {
            panel.scale_y_title_offset(value)?;
        }
        Ok(())
    }

    // ---- legends ---------------------------------------------------------

    /// Books a legend anchored to `reference_panel` and returns its index.
    pub fn add_legend(
        &mut self,
        reference_panel: usize,
        width: f64,
        height: f64,
        anchor: LegendAnchor,
        offset: f64,
    ) -> PlotResult<usize> {
        let panel = self.panel(reference_panel)?;
        let legend = Legend::new(panel, width, height, anchor, offset)?;
        self.legends.push(legend);
        Ok(self.legends.len() - 1)
    }

    /// Appends a legend entry, verifying the referenced series exists in the
    /// named panel at call time. No forward references.
    pub fn add_legend_entry(
        &mut self,
        legend_index: usize,
        panel_index: usize,
        series: &str,
        label: &str,
        mode: &str,
    ) -> PlotResult<()> {
        let panel = self.panel(panel_index)?;
        if !panel.has_series(series) {
            return Err(PlotError::NotFound {
                selector: series.to_owned(),
            });
        }
        let entry = LegendEntry {
            panel_index,
            series: series.to_owned(),
            label: label.to_owned(),
            mode: mode.to_owned(),
        };
        self.legend_mut(legend_index)?.push_entry(entry);
        Ok(())
    }

    // ---- drawing ---------------------------------------------------------

    /// Draws the named series/groups of one panel in the given order.
    pub fn draw_panel(&mut self, index: usize, selectors: &[&str]) -> PlotResult<()> {
        let count = self.panels.len();
        let panel = self.panels.get(index).ok_or_else(|| {
            PlotError::Configuration(format!(
                "panel index {index} out of range for {count} panels"
            ))
        })?;
        panel.draw(&mut self.surface, selectors)
    }

    /// Draws every visible series of one panel in registration order.
    pub fn draw_panel_all(&mut self, index: usize) -> PlotResult<()> {
        let count = self.panels.len();
        let panel = self.panels.get(index).ok_or_else(|| {
            PlotError::Configuration(format!(
                "panel index {index} out of range for {count} panels"
            ))
        })?;
        panel.draw_all(&mut self.surface)
    }

    /// Renders one legend with its entries in insertion order.
    pub fn draw_legend(&mut self, index: usize) -> PlotResult<()> {
        let legend = self.legends.get(index).ok_or_else(|| {
            PlotError::Configuration(format!(
                "legend index {index} out of range for {} legends",
                self.legends.len()
            ))
        })?;
        let frame = legend.frame(&self.panels, &self.stylesheet)?;
        self.surface.draw_legend(&frame)
    }

    // ---- annotations -----------------------------------------------------

    /// Draws an annotation just above the frame's top-left corner.
    pub fn draw_channel_label(&mut self, text: &str) -> PlotResult<()> {
        let margins = self.stylesheet.canvas_margins;
        let primitive = TextPrimitive::new(
            text,
            margins.left + 0.005,
            1.0 - margins.top + self.stylesheet.header_offset_rel * margins.top,
            self.stylesheet.annotation_text_size,
        );
        self.surface.draw_text(&primitive)
    }

    /// Draws a left-aligned header over the frame.
    pub fn draw_header(&mut self, text: &str) -> PlotResult<()> {
        self.draw_frame_title(text, TextHAlign::Left)
    }

    /// Draws a right-aligned title over the frame, typically a dataset tag.
    pub fn draw_right_title(&mut self, text: &str) -> PlotResult<()> {
        self.draw_frame_title(text, TextHAlign::Right)
    }

    fn draw_frame_title(&mut self, text: &str, align: TextHAlign) -> PlotResult<()> {
        let margins = self.stylesheet.canvas_margins;
        let x = match align {
            TextHAlign::Left => margins.left,
            TextHAlign::Center => margins.left + 0.5 * (1.0 - margins.left - margins.right),
            TextHAlign::Right => 1.0 - margins.right,
        };
        let primitive = TextPrimitive::new(
            text,
            x,
            1.0 - margins.top + self.stylesheet.header_offset_rel * margins.top,
            self.stylesheet.header_size_rel * margins.top,
        )
        .with_align(align);
        self.surface.draw_text(&primitive)
    }

    // ---- output ----------------------------------------------------------

    /// Persists the rendered surface.
    pub fn save(&mut self, path: &str) -> PlotResult<()> {
        self.surface.save(path)?;
        info!(path, "saved plot");
        Ok(())
    }
}

/// Walks the split list from the top of the surface downward.
///
/// Fractions are monotonically non-increasing; a pair entry opens a gap
/// between its panel's lower bound and the next panel's upper bound.
pub(crate) fn partition_regions(splits: &[PanelSplit]) -> PlotResult<Vec<PanelRegion>> {
    let mut regions = Vec::with_capacity(splits.len() + 1);
    let mut upper = 1.0;
    for split in splits {
        let (lower, boundary) = match *split {
            PanelSplit::At(fraction) => (fraction, fraction),
            PanelSplit::Gap { lower, boundary } => (lower, boundary),
        };
        for value in [lower, boundary] {
            if !value.is_finite() || !(0.0..1.0).contains(&value) || value == 0.0 {
                return Err(PlotError::Configuration(format!(
                    "split fraction {value} must lie in (0, 1)"
                )));
            }
        }
        if lower > upper {
            return Err(PlotError::Configuration(format!(
                "split fractions must be non-increasing: {lower} follows {upper}"
            )));
        }
        if boundary > lower {
            return Err(PlotError::Configuration(format!(
                "gap boundary {boundary} must not exceed its panel's lower bound {lower}"
            )));
        }
        regions.push(PanelRegion::new(lower, upper));
        upper = boundary;
    }
    regions.push(PanelRegion::new(0.0, upper));
    Ok(regions)
}

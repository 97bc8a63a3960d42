use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::api::unroll::{self, UnrollConfig};
use crate::core::{
    Axis, Curve, Distribution, DrawStyle, Margins, PanelRegion, Series, SeriesPayload,
    StackedAggregate,
};
use crate::error::{PlotError, PlotResult};
use crate::render::{AxisFrame, AxisSide, DrawObject, DrawRequest, Surface, TickLabel};
use crate::style::StyleSheet;

/// Lower bound substituted for non-positive range limits on log axes.
pub const LOG_RANGE_FLOOR: f64 = 1e-5;

/// Headroom divisor applied to explicit upper limits of stacked base layers.
const STACK_RANGE_HEADROOM: f64 = 1.05;

/// Per-axis style policy, applied lazily to the base layer of a draw call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisOptions {
    pub title: Option<String>,
    pub lims: Option<(f64, f64)>,
    pub label_size_scale: Option<f64>,
    pub title_size_scale: Option<f64>,
    pub label_offset_scale: Option<f64>,
    pub title_offset_scale: Option<f64>,
    pub divisions: Option<(u32, u32)>,
    pub log: bool,
}

/// One rectangular region of the surface with its own series registry,
/// stacking/normalization operations and axis policy.
#[derive(Debug, Clone)]
pub struct Panel {
    index: usize,
    region: PanelRegion,
    margins: Margins,
    height: f64,
    stylesheet: StyleSheet,
    series: IndexMap<String, Series>,
    x_axis: AxisOptions,
    y_axis: AxisOptions,
    tick_scale: f64,
    x_tick_labels: SmallVec<[TickLabel; 4]>,
    unroll: Option<UnrollConfig>,
}

impl Panel {
    /// Books a panel covering `region` of the surface.
    ///
    /// The panel's margins map its fractional extent into the stylesheet's
    /// margin budget so panel edges align exactly across the stack.
    pub fn new(index: usize, region: PanelRegion, stylesheet: StyleSheet) -> PlotResult<Self> {
        let base = stylesheet.canvas_margins;
        base.validate()?;
        let usable = base.usable_height();
        let top = base.top + (1.0 - region.upper) * usable;
        let bottom = base.bottom + region.lower * usable;
        let margins = Margins::new(base.left, top, bottom, base.right);
        let height = 1.0 - top - bottom;
        debug!(
            index,
            lower = region.lower,
            upper = region.upper,
            "booking panel"
        );
        Ok(Self {
            index,
            region,
            margins,
            height,
            stylesheet,
            series: IndexMap::new(),
            x_axis: AxisOptions::default(),
            y_axis: AxisOptions::default(),
            tick_scale: 1.0,
            x_tick_labels: SmallVec::new(),
            unroll: None,
        })
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn region(&self) -> PanelRegion {
        self.region
    }

    #[must_use]
    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Effective draw-height fraction after margin correction.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn stylesheet(&self) -> &StyleSheet {
        &self.stylesheet
    }

    #[must_use]
    pub fn n_series(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn has_series(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    #[must_use]
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    #[must_use]
    pub fn is_unrolled(&self) -> bool {
        self.unroll.is_some()
    }

    pub(crate) fn unroll_config(&self) -> Option<&UnrollConfig> {
        self.unroll.as_ref()
    }

    pub(crate) fn x_axis(&self) -> &AxisOptions {
        &self.x_axis
    }

    pub(crate) fn y_axis(&self) -> &AxisOptions {
        &self.y_axis
    }

    // ---- registration ----------------------------------------------------

    /// Registers a copy of `dist` under a unique `name` with a group tag.
    ///
    /// The group `"invisible"` keeps a series out of default draws.
    pub fn add_dist(&mut self, dist: &Distribution, name: &str, group: &str) -> PlotResult<()> {
        self.check_free_name(name)?;
        debug!(panel = self.index, series = name, group, "registering distribution");
        self.series.insert(
            name.to_owned(),
            Series::new(name, group, SeriesPayload::Distribution(dist.clone())),
        );
        Ok(())
    }

    /// Registers a copy of `curve` under a unique `name` with a group tag.
    pub fn add_curve(&mut self, curve: &Curve, name: &str, group: &str) -> PlotResult<()> {
        self.check_free_name(name)?;
        debug!(panel = self.index, series = name, group, "registering curve");
        self.series.insert(
            name.to_owned(),
            Series::new(name, group, SeriesPayload::Curve(curve.clone())),
        );
        Ok(())
    }

    fn check_free_name(&self, name: &str) -> PlotResult<()> {
        if self.series.contains_key(name) {
            return Err(PlotError::DuplicateName {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    // ---- resolution ------------------------------------------------------

    /// Resolves a selector that is either an exact series name or a group
    /// tag. Exact names win; group matches come back in registration order.
    pub fn resolve(&self, selector: &str) -> PlotResult<Vec<&Series>> {
        if let Some(series) = self.series.get(selector) {
            return Ok(vec![series]);
        }
        let matches: Vec<&Series> = self
            .series
            .values()
            .filter(|series| series.group == selector)
            .collect();
        if matches.is_empty() {
            return Err(PlotError::NotFound {
                selector: selector.to_owned(),
            });
        }
        Ok(matches)
    }

    fn resolve_names(&self, selector: &str) -> PlotResult<Vec<String>> {
        Ok(self
            .resolve(selector)?
            .into_iter()
            .map(|series| series.name.clone())
            .collect())
    }

    /// Returns a copy of the named distribution, or the bin-wise sum over a
    /// group. Stacked aggregates are opaque to readout.
    pub fn get(&self, selector: &str) -> PlotResult<Distribution> {
        let resolved = self.resolve(selector)?;
        let mut total: Option<Distribution> = None;
        for series in resolved {
            let dist = series.payload.as_distribution(&series.name)?;
            match &mut total {
                None => total = Some(dist.clone()),
                Some(sum) => sum.add(dist)?,
            }
        }
        total.ok_or_else(|| PlotError::NotFound {
            selector: selector.to_owned(),
        })
    }

    // ---- stacking --------------------------------------------------------

    /// Builds one stacked aggregate from the resolved members, in the order
    /// given. The first member is drawn as the base layer.
    pub fn create_stack(
        &mut self,
        members: &[&str],
        name: &str,
        group: &str,
    ) -> PlotResult<()> {
        self.check_free_name(name)?;
        let mut aggregate = StackedAggregate::new();
        for selector in members {
            for series in self.resolve(selector)? {
                match &series.payload {
                    SeriesPayload::Distribution(dist) => {
                        aggregate.push(series.name.clone(), dist.clone())?;
                    }
                    SeriesPayload::Stacked(_) => {
                        return Err(PlotError::NestedStack {
                            name: series.name.clone(),
                        });
                    }
                    SeriesPayload::Curve(_) => {
                        return Err(PlotError::TypeMismatch {
                            name: series.name.clone(),
                            kind: series.payload.kind(),
                            operation: "stacking",
                        });
                    }
                }
            }
        }
        debug!(panel = self.index, stack = name, members = aggregate.len(), "created stack");
        let mut series = Series::new(name, group, SeriesPayload::Stacked(aggregate));
        series.style.draw_mode = "hist".to_owned();
        self.series.insert(name.to_owned(), series);
        Ok(())
    }

    // ---- normalization ---------------------------------------------------

    /// Divides every resolved numerator bin-wise by the summed denominator.
    ///
    /// The denominator's errors are zeroed first: it acts as an exact
    /// reference, not a fluctuating quantity.
    pub fn normalize(&mut self, numerators: &[&str], denominators: &[&str]) -> PlotResult<()> {
        let mut denominator: Option<Distribution> = None;
        for selector in denominators {
            let summed = self.get(selector)?;
            match &mut denominator {
                None => denominator = Some(summed),
                Some(total) => total.add(&summed)?,
            }
        }
        let Some(mut denominator) = denominator else {
            return Err(PlotError::InvalidData(
                "normalize needs at least one denominator selector".to_owned(),
            ));
        };
        denominator.clear_errors();

        for selector in numerators {
            for name in self.resolve_names(selector)? {
                let series = self
                    .series
                    .get_mut(&name)
                    .ok_or_else(|| PlotError::NotFound {
                        selector: name.clone(),
                    })?;
                match &mut series.payload {
                    SeriesPayload::Distribution(dist) => dist.divide(&denominator)?,
                    SeriesPayload::Stacked(_) => {
                        return Err(PlotError::StackedNormalize { name });
                    }
                    SeriesPayload::Curve(_) => {
                        return Err(PlotError::TypeMismatch {
                            name,
                            kind: "curve",
                            operation: "normalization",
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Divides every distribution's bin contents by its own bin width.
    ///
    /// Stack member copies are width-divided as well, so stacked and
    /// standalone views of the same input stay consistent.
    pub fn normalize_by_bin_width(&mut self) {
        for series in self.series.values_mut() {
            match &mut series.payload {
                SeriesPayload::Distribution(dist) => dist.divide_by_bin_width(),
                SeriesPayload::Stacked(stack) => stack.divide_members_by_bin_width(),
                SeriesPayload::Curve(_) => {}
            }
        }
    }

    // ---- styling ---------------------------------------------------------

    /// Assigns draw style to a named series or every series in a group.
    ///
    /// Stacked aggregates are skipped with a warning: stacks style their
    /// members individually, not as a unit.
    pub fn set_series_style(&mut self, selector: &str, style: DrawStyle) -> PlotResult<()> {
        for name in self.resolve_names(selector)? {
            let series = self
                .series
                .get_mut(&name)
                .ok_or_else(|| PlotError::NotFound {
                    selector: name.clone(),
                })?;
            if series.payload.is_stack() {
                warn!(panel = self.index, series = %name, "cannot style a stacked aggregate");
                continue;
            }
            series.style = style.clone();
        }
        Ok(())
    }

    // ---- axis policy -----------------------------------------------------

    pub fn set_x_label(&mut self, label: impl Into<String>) {
        self.x_axis.title = Some(label.into());
    }

    pub fn set_y_label(&mut self, label: impl Into<String>) {
        self.y_axis.title = Some(label.into());
    }

    pub fn set_x_lims(&mut self, lo: f64, hi: f64) -> PlotResult<()> {
        self.x_axis.lims = Some(check_range(lo, hi)?);
        Ok(())
    }

    pub fn set_y_lims(&mut self, lo: f64, hi: f64) -> PlotResult<()> {
        self.y_axis.lims = Some(check_range(lo, hi)?);
        Ok(())
    }

    pub fn set_log_x(&mut self) {
        self.x_axis.log = true;
    }

    pub fn set_log_y(&mut self) {
        self.y_axis.log = true;
    }

    pub fn scale_x_label_size(&mut self, value: f64) -> PlotResult<()> {
        self.x_axis.label_size_scale = Some(check_scale(value)?);
        Ok(())
    }

    pub fn scale_y_label_size(&mut self, value: f64) -> PlotResult<()> {
        self.y_axis.label_size_scale = Some(check_scale(value)?);
        Ok(())
    }

    pub fn scale_x_title_size(&mut self, value: f64) -> PlotResult<()> {
        self.x_axis.title_size_scale = Some(check_scale(value)?);
        Ok(())
    }

    pub fn scale_y_title_size(&mut self, value: f64) -> PlotResult<()> {
        self.y_axis.title_size_scale = Some(check_scale(value)?);
        Ok(())
    }

    pub fn scale_x_label_offset(&mut self, value: f64) -> PlotResult<()> {
        self.x_axis.label_offset_scale = Some(check_scale(value)?);
        Ok(())
    }

    pub fn scale_y_label_offset(&mut self, value: f64) -> PlotResult<()> {
        self.y_axis.label_offset_scale = Some(check_scale(value)?);
        Ok(())
    }

    pub fn scale_x_title_offset(&mut self, value: f64) -> PlotResult<()> {
        self.x_axis.title_offset_scale = Some(check_scale(value)?);
        Ok(())
    }

    pub fn scale_y_title_offset(&mut self, value: f64) -> PlotResult<()> {
        self.y_axis.title_offset_scale = Some(check_scale(value)?);
        Ok(())
    }

    pub fn set_n_x_divisions(&mut self, primary: u32, secondary: u32) {
        self.x_axis.divisions = Some((primary, secondary));
    }

    pub fn set_n_y_divisions(&mut self, primary: u32, secondary: u32) {
        self.y_axis.divisions = Some((primary, secondary));
    }

    // ---- unroll ----------------------------------------------------------

    /// One-way transition into the unrolled sub-panel layout.
    ///
    /// `selection` picks which coarse bins participate and in what order;
    /// the default is all bins left to right.
    pub fn unroll(
        &mut self,
        bin_labels: Vec<String>,
        label_pos: f64,
        label_angle: f64,
        label_scale: f64,
        selection: Option<Vec<usize>>,
    ) -> PlotResult<()> {
        if self.unroll.is_some() {
            return Err(PlotError::Configuration(format!(
                "panel {} is already unrolled",
                self.index
            )));
        }
        let config = UnrollConfig::new(bin_labels, label_pos, label_angle, label_scale, selection)?;
        self.unroll = Some(config);
        Ok(())
    }

    // ---- drawing ---------------------------------------------------------

    /// Draws the resolved entries in caller order. The first non-empty entry
    /// is the base layer and alone receives the axis-style pass.
    pub fn draw<S: Surface>(&self, surface: &mut S, selectors: &[&str]) -> PlotResult<()> {
        if self.unroll.is_some() {
            return unroll::draw_unrolled(self, surface, selectors);
        }
        self.draw_flat(surface, selectors)
    }

    /// Draws every series not tagged `"invisible"`, in registration order.
    pub fn draw_all<S: Surface>(&self, surface: &mut S) -> PlotResult<()> {
        let visible: Vec<&str> = self
            .series
            .values()
            .filter(|series| series.is_visible_by_default())
            .map(|series| series.name.as_str())
            .collect();
        self.draw(surface, &visible)
    }

    pub(crate) fn draw_flat<S: Surface>(
        &self,
        surface: &mut S,
        selectors: &[&str],
    ) -> PlotResult<()> {
        surface.set_margins(self.margins)?;
        let names = self.draw_list(selectors);
        let mut is_first = true;
        for name in names {
            let series = &self.series[&name];
            if is_first {
                let frame = self.build_axis_frame(series)?;
                if frame.log_x {
                    surface.set_log_scale(Axis::X, true)?;
                }
                if frame.log_y {
                    surface.set_log_scale(Axis::Y, true)?;
                }
                if let Some((lo, hi)) = frame.x_range {
                    surface.set_range(Axis::X, lo, hi)?;
                }
                if let Some((lo, hi)) = frame.y_range {
                    surface.set_range(Axis::Y, lo, hi)?;
                }
                surface.draw(&self.draw_request(series, false, Some(frame)))?;
                is_first = false;
            } else {
                surface.draw(&self.draw_request(series, true, None))?;
            }
        }
        Ok(())
    }

    /// Expands draw selectors into series names, preserving caller order.
    /// Unmatched selectors and empty stacks are skipped with a warning.
    pub(crate) fn draw_list(&self, selectors: &[&str]) -> Vec<String> {
        let mut names = Vec::new();
        for &selector in selectors {
            let resolved = match self.resolve(selector) {
                Ok(resolved) => resolved,
                Err(_) => {
                    warn!(panel = self.index, selector, "draw selector matched nothing");
                    continue;
                }
            };
            for series in resolved {
                if let SeriesPayload::Stacked(stack) = &series.payload {
                    if stack.is_empty() {
                        warn!(panel = self.index, series = %series.name, "skipping empty stack");
                        continue;
                    }
                }
                names.push(series.name.clone());
            }
        }
        names
    }

    fn draw_request(
        &self,
        series: &Series,
        overlay: bool,
        axis: Option<AxisFrame>,
    ) -> DrawRequest {
        let object = match &series.payload {
            SeriesPayload::Distribution(dist) => DrawObject::Distribution(dist.clone()),
            SeriesPayload::Stacked(stack) => DrawObject::Stacked(stack.clone()),
            SeriesPayload::Curve(curve) => DrawObject::Curve(curve.clone()),
        };
        DrawRequest {
            series: series.name.clone(),
            object,
            mode: series.style.draw_mode.clone(),
            overlay,
            style: series.style.clone(),
            axis,
        }
    }

    /// Materializes the axis formatting applied to the base layer.
    ///
    /// An axis without a configured title collapses its title and label
    /// sizes to zero, so shared axes across stacked panels show labels only
    /// where configured. Synthetic replacement tick labels keep x labels
    /// alive even without an x title.
    pub(crate) fn build_axis_frame(&self, base: &Series) -> PlotResult<AxisFrame> {
        let sheet = &self.stylesheet;
        let x_labeled = self.x_axis.title.is_some() || !self.x_tick_labels.is_empty();
        let y_labeled = self.y_axis.title.is_some();

        let x = AxisSide {
            title: self.x_axis.title.clone(),
            title_size: side_size(x_labeled, sheet.axis_title_size, self.x_axis.title_size_scale),
            label_size: side_size(x_labeled, sheet.axis_label_size, self.x_axis.label_size_scale),
            title_offset: sheet.x_title_offset
                * self.x_axis.title_offset_scale.unwrap_or(1.0),
            label_offset: sheet.axis_label_offset
                * self.x_axis.label_offset_scale.unwrap_or(1.0),
            divisions: self.x_axis.divisions.unwrap_or(sheet.n_divisions),
            tick_length: sheet.base_tick_length * self.tick_scale,
        };
        let y = AxisSide {
            title: self.y_axis.title.clone(),
            title_size: side_size(y_labeled, sheet.axis_title_size, self.y_axis.title_size_scale),
            label_size: side_size(y_labeled, sheet.axis_label_size, self.y_axis.label_size_scale),
            title_offset: sheet.y_title_offset
                * self.y_axis.title_offset_scale.unwrap_or(1.0),
            label_offset: sheet.axis_label_offset
                * self.y_axis.label_offset_scale.unwrap_or(1.0),
            divisions: self.y_axis.divisions.unwrap_or(sheet.n_divisions),
            // Ticks keep a constant absolute length regardless of how thin
            // the panel is.
            tick_length: sheet.base_tick_length / self.height * self.tick_scale,
        };

        let x_range = apply_log_floor(self.x_axis.lims, self.x_axis.log);
        let mut y_range = apply_log_floor(self.y_axis.lims, self.y_axis.log);
        if base.payload.is_stack() {
            if let Some((lo, hi)) = y_range {
                y_range = Some((lo, hi / STACK_RANGE_HEADROOM));
            }
        }

        let frame = AxisFrame {
            x,
            y,
            log_x: self.x_axis.log,
            log_y: self.y_axis.log,
            x_range,
            y_range,
            x_tick_labels: self.x_tick_labels.clone(),
        };
        frame.validate()?;
        Ok(frame)
    }

    // ---- unroll support --------------------------------------------------

    /// Clones this panel into one unrolled sub-panel slot.
    pub(crate) fn clone_for_slot(&self, left: f64, right: f64, tick_scale: f64) -> Self {
        let mut sub = self.clone();
        sub.unroll = None;
        sub.margins = Margins::new(left, self.margins.top, self.margins.bottom, 1.0 - right);
        sub.tick_scale = tick_scale;
        sub
    }

    pub(crate) fn suppress_y_decorations(&mut self) {
        self.y_axis.title = None;
    }

    pub(crate) fn suppress_x_title(&mut self) {
        self.x_axis.title = None;
    }

    pub(crate) fn restrict_x(&mut self, lo: f64, hi: f64) -> PlotResult<()> {
        self.x_axis.lims = Some(check_range(lo, hi)?);
        Ok(())
    }

    pub(crate) fn force_y_lims(&mut self, lo: f64, hi: f64) -> PlotResult<()> {
        self.y_axis.lims = Some(check_range(lo, hi)?);
        Ok(())
    }

    pub(crate) fn set_x_divisions_raw(&mut self, divisions: (u32, u32)) {
        self.x_axis.divisions = Some(divisions);
    }

    pub(crate) fn set_x_tick_labels(&mut self, labels: SmallVec<[TickLabel; 4]>) {
        self.x_tick_labels = labels;
    }
}

fn side_size(labeled: bool, base: f64, scale: Option<f64>) -> f64 {
    if labeled {
        base * scale.unwrap_or(1.0)
    } else {
        0.0
    }
}

fn apply_log_floor(lims: Option<(f64, f64)>, log: bool) -> Option<(f64, f64)> {
    let (lo, hi) = lims?;
    if log && lo <= 0.0 {
        Some((LOG_RANGE_FLOOR, hi))
    } else {
        Some((lo, hi))
    }
}

fn check_range(lo: f64, hi: f64) -> PlotResult<(f64, f64)> {
    if !lo.is_finite() || !hi.is_finite() || hi <= lo {
        return Err(PlotError::InvalidData(
            "axis range must be finite and non-empty".to_owned(),
        ));
    }
    Ok((lo, hi))
}

fn check_scale(value: f64) -> PlotResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PlotError::InvalidData(
            "scale factor must be finite and > 0".to_owned(),
        ));
    }
    Ok(value)
}

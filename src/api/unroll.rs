//! Sub-division of one panel's x-axis into per-bin sub-panels, so a
//! flattened 2-D distribution reads as one labeled 1-D strip.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::api::panel::Panel;
use crate::core::SeriesPayload;
use crate::error::{PlotError, PlotResult};
use crate::render::{Surface, TextHAlign, TextPrimitive, TickLabel};

/// Fraction of a segment's width shaved off each side so neighboring
/// sub-panels show a visible seam.
const SEGMENT_SEAM_FRACTION: f64 = 0.002;

/// Headroom factors for y-ranges derived from the first resolved series.
const Y_HEADROOM_UPPER: f64 = 1.2;
const Y_HEADROOM_LOWER: f64 = 0.9;

/// Every sub-panel gets four primary x divisions with synthetic labels.
const SUB_PANEL_X_DIVISIONS: (u32, u32) = (4, 0);

/// Configuration captured by the one-way `flat -> unrolled` transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnrollConfig {
    bin_labels: Vec<String>,
    label_pos: f64,
    label_angle: f64,
    label_scale: f64,
    selection: Vec<usize>,
}

impl UnrollConfig {
    pub(crate) fn new(
        bin_labels: Vec<String>,
        label_pos: f64,
        label_angle: f64,
        label_scale: f64,
        selection: Option<Vec<usize>>,
    ) -> PlotResult<Self> {
        if bin_labels.is_empty() {
            return Err(PlotError::Configuration(
                "unroll needs at least one coarse bin label".to_owned(),
            ));
        }
        if !label_pos.is_finite() || !(0.0..=1.0).contains(&label_pos) {
            return Err(PlotError::Configuration(
                "unroll label position must be in [0, 1]".to_owned(),
            ));
        }
        if !label_angle.is_finite() {
            return Err(PlotError::Configuration(
                "unroll label angle must be finite".to_owned(),
            ));
        }
        if !label_scale.is_finite() || label_scale <= 0.0 {
            return Err(PlotError::Configuration(
                "unroll label scale must be finite and > 0".to_owned(),
            ));
        }
        let n_bins = bin_labels.len();
        let selection = selection.unwrap_or_else(|| (0..n_bins).collect());
        if selection.is_empty() {
            return Err(PlotError::Configuration(
                "unroll selection must not be empty".to_owned(),
            ));
        }
        if let Some(out_of_range) = selection.iter().find(|index| **index >= n_bins) {
            return Err(PlotError::Configuration(format!(
                "unroll selection index {out_of_range} out of range for {n_bins} bins"
            )));
        }
        Ok(Self {
            bin_labels,
            label_pos,
            label_angle,
            label_scale,
            selection,
        })
    }

    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.bin_labels.len()
    }

    #[must_use]
    pub fn bin_labels(&self) -> &[String] {
        &self.bin_labels
    }

    #[must_use]
    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    #[must_use]
    pub fn label_pos(&self) -> f64 {
        self.label_pos
    }

    #[must_use]
    pub fn label_angle(&self) -> f64 {
        self.label_angle
    }

    #[must_use]
    pub fn label_scale(&self) -> f64 {
        self.label_scale
    }
}

/// Draws an unrolled panel: one independently-scaled sub-panel per selected
/// coarse bin, tiled across the parent's usable width.
pub(crate) fn draw_unrolled<S: Surface>(
    panel: &Panel,
    surface: &mut S,
    selectors: &[&str],
) -> PlotResult<()> {
    let Some(config) = panel.unroll_config() else {
        return panel.draw_flat(surface, selectors);
    };

    let names = panel.draw_list(selectors);
    let Some(first) = names.first() else {
        return Ok(());
    };
    let first_series = panel
        .series(first)
        .ok_or_else(|| PlotError::NotFound {
            selector: first.clone(),
        })?;

    let (x_lo, x_hi) = match panel.x_axis().lims {
        Some(lims) => lims,
        None => (first_series.payload.x_min(), first_series.payload.x_max()),
    };
    let span = x_hi - x_lo;
    if !span.is_finite() || span <= 0.0 {
        return Err(PlotError::InvalidData(
            "unroll range must be finite and non-empty".to_owned(),
        ));
    }

    let n_bins = config.n_bins();
    // Boundaries snap to a 4-significant-figure grid of the span so
    // floating-point jitter cannot misalign sub-panel seams.
    let boundaries: Vec<f64> = (0..=n_bins)
        .map(|i| round_to_span_grid(x_lo + span * i as f64 / n_bins as f64, span))
        .collect();

    let selection = config.selection();
    let n_selected = selection.len();
    let margins = panel.margins();
    let usable_width = margins.usable_width();
    let slot_width = usable_width / n_selected as f64;
    let tick_scale = 2.0 / n_bins as f64;

    let derived_y = match panel.y_axis().lims {
        Some(_) => None,
        None => derive_y_range(&first_series.payload),
    };

    let mut cursor = margins.left;
    for (slot, &bin) in selection.iter().enumerate() {
        let slot_left = cursor;
        let slot_right = if slot == n_selected - 1 {
            1.0 - margins.right
        } else {
            cursor + slot_width
        };
        cursor = slot_right;

        let seg_lo = boundaries[bin];
        let seg_hi = boundaries[bin + 1];
        let seg_width = seg_hi - seg_lo;
        let seam = SEGMENT_SEAM_FRACTION * seg_width;

        let mut sub = panel.clone_for_slot(slot_left, slot_right, tick_scale);
        sub.restrict_x(seg_lo + seam, seg_hi - seam)?;
        if slot != 0 {
            sub.suppress_y_decorations();
        }
        if slot != n_selected - 1 {
            sub.suppress_x_title();
        }
        sub.set_x_divisions_raw(SUB_PANEL_X_DIVISIONS);
        sub.set_x_tick_labels(quartile_labels(seg_lo, seg_width));
        if let Some((lo, hi)) = derived_y {
            sub.force_y_lims(lo, hi)?;
        }

        sub.draw_flat(surface, selectors)?;

        let label = &config.bin_labels()[bin];
        let text = TextPrimitive::new(
            label.clone(),
            0.5 * (slot_left + slot_right),
            config.label_pos(),
            panel.stylesheet().annotation_text_size * config.label_scale(),
        )
        .with_angle(config.label_angle())
        .with_align(TextHAlign::Center);
        surface.draw_text(&text)?;
    }
    Ok(())
}

/// Rounds `value` to 4 significant figures relative to the total span.
fn round_to_span_grid(value: f64, span: f64) -> f64 {
    let exponent = span.abs().log10().ceil() as i32 - 4;
    let magnitude = 10f64.powi(exponent);
    (value / magnitude).round() * magnitude
}

fn derive_y_range(payload: &SeriesPayload) -> Option<(f64, f64)> {
    let (min, max) = match payload {
        SeriesPayload::Distribution(dist) => (dist.min_content(), dist.max_content()),
        SeriesPayload::Stacked(stack) => {
            if stack.is_empty() {
                return None;
            }
            (0.0, stack.summed_max())
        }
        SeriesPayload::Curve(curve) => {
            let ys = curve.points().iter().map(|point| OrderedFloat(point.y));
            let min = ys.clone().min()?.into_inner();
            let max = ys.max()?.into_inner();
            (min, max)
        }
    };
    Some(with_headroom(min, max))
}

fn with_headroom(min: f64, max: f64) -> (f64, f64) {
    let lo = if min >= 0.0 {
        min * Y_HEADROOM_LOWER
    } else {
        min * Y_HEADROOM_UPPER
    };
    let hi = if max >= 0.0 {
        max * Y_HEADROOM_UPPER
    } else {
        max * Y_HEADROOM_LOWER
    };
    if hi > lo { (lo, hi) } else { (lo, lo + 1.0) }
}

fn quartile_labels(seg_lo: f64, seg_width: f64) -> SmallVec<[TickLabel; 4]> {
    (0..4)
        .map(|quarter| {
            let value = seg_lo + seg_width * f64::from(quarter) * 0.25;
            TickLabel {
                value,
                text: format_significant(value, 3),
            }
        })
        .collect()
}

/// Formats `value` with up to `digits` significant digits.
fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits as i32 - 1 - magnitude).max(0) as usize;
    format!("{value:.decimals$}")
}

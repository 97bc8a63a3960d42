use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::curve::Curve;
use crate::core::distribution::Distribution;
use crate::error::{PlotError, PlotResult};
use crate::style::Color;

/// Group tag assigned to series that are registered but not drawn by default.
pub const INVISIBLE_GROUP: &str = "invisible";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerStyle {
    None,
    Circle,
    Square,
    Diamond,
    Cross,
}

/// Mutable visual attributes plus the accumulated draw-mode token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawStyle {
    pub draw_mode: String,
    pub marker: MarkerStyle,
    pub marker_size: f64,
    pub line_color: Color,
    pub line_width: f64,
    pub fill_color: Option<Color>,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            draw_mode: String::new(),
            marker: MarkerStyle::Circle,
            marker_size: 1.0,
            line_color: Color::BLACK,
            line_width: 1.0,
            fill_color: None,
        }
    }
}

/// Ordered composite of distributions drawn bottom-up as one unit.
///
/// Members are deep copies taken at stacking time; the first member is the
/// base layer. The aggregate is opaque to summation, readout and
/// normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedAggregate {
    members: Vec<(String, Distribution)>,
}

impl StackedAggregate {
    #[must_use]
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Appends a member copy. All members must share one binning.
    pub fn push(&mut self, name: impl Into<String>, dist: Distribution) -> PlotResult<()> {
        let name = name.into();
        if let Some((_, first)) = self.members.first() {
            let mut probe = first.clone();
            // Same-binning check without mutating the stored member.
            probe.add(&dist)?;
        }
        debug!(member = %name, "added distribution to stack");
        self.members.push((name, dist));
        Ok(())
    }

    #[must_use]
    pub fn members(&self) -> &[(String, Distribution)] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn x_min(&self) -> f64 {
        self.members.first().map_or(0.0, |(_, dist)| dist.x_min())
    }

    #[must_use]
    pub fn x_max(&self) -> f64 {
        self.members.first().map_or(0.0, |(_, dist)| dist.x_max())
    }

    /// Largest bin-wise total over all members, used for auto-ranging.
    #[must_use]
    pub fn summed_max(&self) -> f64 {
        let Some((_, first)) = self.members.first() else {
            return 0.0;
        };
        let mut total = first.clone();
        for (_, member) in &self.members[1..] {
            // Members share one binning by construction.
            let _ = total.add(member);
        }
        total.max_content()
    }

    pub fn divide_members_by_bin_width(&mut self) {
        for (_, member) in &mut self.members {
            member.divide_by_bin_width();
        }
    }
}

impl Default for StackedAggregate {
    fn default() -> Self {
        Self::new()
    }
}

/// Closed set of payload kinds a series can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SeriesPayload {
    Distribution(Distribution),
    Stacked(StackedAggregate),
    Curve(Curve),
}

impl SeriesPayload {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Distribution(_) => "distribution",
            Self::Stacked(_) => "stack",
            Self::Curve(_) => "curve",
        }
    }

    #[must_use]
    pub fn is_stack(&self) -> bool {
        matches!(self, Self::Stacked(_))
    }

    #[must_use]
    pub fn x_min(&self) -> f64 {
        match self {
            Self::Distribution(dist) => dist.x_min(),
            Self::Stacked(stack) => stack.x_min(),
            Self::Curve(curve) => curve.x_min(),
        }
    }

    #[must_use]
    pub fn x_max(&self) -> f64 {
        match self {
            Self::Distribution(dist) => dist.x_max(),
            Self::Stacked(stack) => stack.x_max(),
            Self::Curve(curve) => curve.x_max(),
        }
    }

    pub fn as_distribution(&self, name: &str) -> PlotResult<&Distribution> {
        match self {
            Self::Distribution(dist) => Ok(dist),
            Self::Stacked(_) => Err(PlotError::StackedRead {
                name: name.to_owned(),
            }),
            Self::Curve(_) => Err(PlotError::TypeMismatch {
                name: name.to_owned(),
                kind: self.kind(),
                operation: "distribution readout",
            }),
        }
    }
}

/// One named, grouped, styled data object registered in a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub group: String,
    pub payload: SeriesPayload,
    pub style: DrawStyle,
}

impl Series {
    #[must_use]
    pub fn new(name: impl Into<String>, group: impl Into<String>, payload: SeriesPayload) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            payload,
            style: DrawStyle::default(),
        }
    }

    #[must_use]
    pub fn is_visible_by_default(&self) -> bool {
        self.group != INVISIBLE_GROUP
    }
}

use crate::core::{Axis, Margins};
use crate::error::PlotResult;
use crate::render::{DrawRequest, LegendFrame, Surface, TextPrimitive};

/// Compact log entry for one surface call, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    SetMargins(Margins),
    SetLogScale { axis: Axis, enabled: bool },
    SetRange { axis: Axis, lo: f64, hi: f64 },
    Draw {
        series: String,
        mode: String,
        overlay: bool,
        with_axis_frame: bool,
    },
    Text(String),
    Legend { entries: usize },
    Save(String),
}

/// Validating in-memory surface used by tests and headless callers.
///
/// Every frame is validated before being recorded, so tests catch invalid
/// geometry without a real backend.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<SurfaceCommand>,
    pub draws: Vec<DrawRequest>,
    pub texts: Vec<TextPrimitive>,
    pub legends: Vec<LegendFrame>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    /// Margin settings in issue order, for layout assertions.
    #[must_use]
    pub fn margin_calls(&self) -> Vec<Margins> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                SurfaceCommand::SetMargins(margins) => Some(*margins),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn set_margins(&mut self, margins: Margins) -> PlotResult<()> {
        margins.validate()?;
        self.commands.push(SurfaceCommand::SetMargins(margins));
        Ok(())
    }

    fn set_log_scale(&mut self, axis: Axis, enabled: bool) -> PlotResult<()> {
        self.commands
            .push(SurfaceCommand::SetLogScale { axis, enabled });
        Ok(())
    }

    fn set_range(&mut self, axis: Axis, lo: f64, hi: f64) -> PlotResult<()> {
        self.commands.push(SurfaceCommand::SetRange { axis, lo, hi });
        Ok(())
    }

    fn draw(&mut self, request: &DrawRequest) -> PlotResult<()> {
        request.validate()?;
        self.commands.push(SurfaceCommand::Draw {
            series: request.series.clone(),
            mode: request.mode.clone(),
            overlay: request.overlay,
            with_axis_frame: request.axis.is_some(),
        });
        self.draws.push(request.clone());
        Ok(())
    }

    fn draw_text(&mut self, text: &TextPrimitive) -> PlotResult<()> {
        text.validate()?;
        self.commands.push(SurfaceCommand::Text(text.text.clone()));
        self.texts.push(text.clone());
        Ok(())
    }

    fn draw_legend(&mut self, legend: &LegendFrame) -> PlotResult<()> {
        legend.validate()?;
        self.commands.push(SurfaceCommand::Legend {
            entries: legend.entries.len(),
        });
        self.legends.push(legend.clone());
        Ok(())
    }

    fn save(&mut self, path: &str) -> PlotResult<()> {
        self.commands.push(SurfaceCommand::Save(path.to_owned()));
        Ok(())
    }
}

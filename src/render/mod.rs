mod frame;
mod recording;

pub use frame::{
    AxisFrame, AxisSide, DrawObject, DrawRequest, LegendEntryFrame, LegendFrame, TextHAlign,
    TextPrimitive, TickLabel,
};
pub use recording::{RecordingSurface, SurfaceCommand};

use crate::core::{Axis, Margins};
use crate::error::PlotResult;

/// Contract implemented by any drawing backend.
///
/// The engine issues these calls in draw order and never inspects rendering
/// results, so backends stay isolated from layout and registry logic.
pub trait Surface {
    fn set_margins(&mut self, margins: Margins) -> PlotResult<()>;
    fn set_log_scale(&mut self, axis: Axis, enabled: bool) -> PlotResult<()>;
    fn set_range(&mut self, axis: Axis, lo: f64, hi: f64) -> PlotResult<()>;
    fn draw(&mut self, request: &DrawRequest) -> PlotResult<()>;
    fn draw_text(&mut self, text: &TextPrimitive) -> PlotResult<()>;
    fn draw_legend(&mut self, legend: &LegendFrame) -> PlotResult<()>;
    fn save(&mut self, path: &str) -> PlotResult<()>;
}

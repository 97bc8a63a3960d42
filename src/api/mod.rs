pub mod legend;
pub mod panel;
pub mod plot;
pub mod source;
pub mod unroll;

pub use legend::{Legend, LegendAnchor, LegendEntry};
pub use panel::{AxisOptions, Panel};
pub use plot::{PanelSplit, Plot};
pub use source::{MemorySource, SeriesSource};
pub use unroll::UnrollConfig;

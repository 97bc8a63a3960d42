pub mod curve;
pub mod distribution;
pub mod series;
pub mod types;

pub use curve::Curve;
pub use distribution::Distribution;
pub use series::{DrawStyle, INVISIBLE_GROUP, MarkerStyle, Series, SeriesPayload, StackedAggregate};
pub use types::{Axis, DataPoint, Margins, PanelRegion};

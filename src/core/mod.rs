pub mod aggregator;
pub mod axis;
pub mod format;
pub mod primitives;
pub mod scale;
pub mod series;
pub mod spline;
pub mod stats;
pub mod types;

pub use aggregator::{DataAggregator, StackTotals, Stacking};
pub use axis::{Axis, AxisConversion, AxisId, AxisPosition, DataType};
pub use format::ValueFormat;
pub use scale::LinearScale;
pub use series::{ChartType, Dimension, OhlcColumns, Series, SeriesStyle};
pub use stats::{BoxStats, QuartileMethod};
pub use types::{DataPoint, Point, Rect, is_valid};

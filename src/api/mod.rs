mod chart;
mod invalidation;
mod options;
mod render_pass;

pub use chart::{Chart, PRIMARY_X, PRIMARY_Y};
pub use invalidation::Invalidation;
pub use options::{BoxPlotOptions, ChartOptions, FinanceOptions, FunnelMode, FunnelOptions};
pub use render_pass::PlotGroup;

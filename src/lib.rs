//! chart-plotters: data-to-geometry plotting engine.
//!
//! Series are turned into draw calls on a [`render::RenderEngine`] by one
//! plotter per chart family (bar, area, line, finance, funnel, box plot),
//! and every plotted symbol is recorded for hit-testing.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod plot;
pub mod render;
pub mod telemetry;

pub use api::{Chart, ChartOptions};
pub use error::{ChartError, ChartResult};

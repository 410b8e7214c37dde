use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid plot rectangle: width={width}, height={height}")]
    InvalidPlotRect { width: f64, height: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("unknown series index {0}")]
    UnknownSeries(usize),

    #[error("render backend failure: {0}")]
    Backend(String),
}

use crate::error::{ChartError, ChartResult};

/// Affine map between a data domain and a pixel range.
///
/// The range may be descending (vertical axes grow downward in pixel space).
/// Non-finite inputs propagate as non-finite outputs so plotting loops can
/// treat them as "don't draw" instead of failing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64, range_start: f64, range_end: f64) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        if !range_start.is_finite() || !range_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start,
            range_end,
        })
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn domain_to_pixel(self, value: f64) -> f64 {
        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    /// Degenerate (zero-length) pixel ranges map every pixel to the domain start.
    #[must_use]
    pub fn pixel_to_domain(self, pixel: f64) -> f64 {
        let range_span = self.range_end - self.range_start;
        if range_span == 0.0 {
            return self.domain_start;
        }
        let normalized = (pixel - self.range_start) / range_span;
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }

    /// Pixels covered by one data unit (always non-negative).
    #[must_use]
    pub fn pixels_per_unit(self) -> f64 {
        ((self.range_end - self.range_start) / (self.domain_end - self.domain_start)).abs()
    }
}

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel-stats")]
use rayon::prelude::*;

use crate::core::types::is_valid;

/// Whether the median takes part in both halves when splitting an odd-length
/// sample for quartile computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QuartileMethod {
    #[default]
    InclusiveMedian,
    ExclusiveMedian,
}

/// Tukey fence multiplier applied to the interquartile range.
pub const OUTLIER_IQR_FACTOR: f64 = 1.5;

/// Five-number summary of one box-plot point, plus mean and outliers.
///
/// When outliers are detected, `min`/`max` are the most extreme values that
/// are not outliers (the whisker ends).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub min: f64,
    pub first_quartile: f64,
    pub median: f64,
    pub third_quartile: f64,
    pub max: f64,
    pub mean: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Returns `None` when the sample has no finite values.
    #[must_use]
    pub fn compute(values: &[f64], method: QuartileMethod, detect_outliers: bool) -> Option<Self> {
        let mut data: Vec<f64> = values.iter().copied().filter(|v| is_valid(*v)).collect();
        if data.is_empty() {
            return None;
        }
        data.sort_by(f64::total_cmp);

        let len = data.len();
        let median = median_of(&data);
        let half = len / 2;
        let (lower, upper) = if len % 2 == 1 {
            match method {
                QuartileMethod::InclusiveMedian => (&data[..=half], &data[half..]),
                QuartileMethod::ExclusiveMedian => (&data[..half], &data[half + 1..]),
            }
        } else {
            (&data[..half], &data[half..])
        };
        let first_quartile = if lower.is_empty() { median } else { median_of(lower) };
        let third_quartile = if upper.is_empty() { median } else { median_of(upper) };
        let mean = data.iter().sum::<f64>() / len as f64;

        let mut min = data[0];
        let mut max = data[len - 1];
        let mut outliers = Vec::new();
        if detect_outliers {
            let iqr = third_quartile - first_quartile;
            let lower_fence = first_quartile - OUTLIER_IQR_FACTOR * iqr;
            let upper_fence = third_quartile + OUTLIER_IQR_FACTOR * iqr;
            let (inside, outside): (Vec<f64>, Vec<f64>) = data
                .iter()
                .partition(|v| **v >= lower_fence && **v <= upper_fence);
            if let (Some(first), Some(last)) = (inside.first(), inside.last()) {
                min = *first;
                max = *last;
            }
            outliers = outside;
        }

        Some(Self {
            min,
            first_quartile,
            median,
            third_quartile,
            max,
            mean,
            outliers,
        })
    }

    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.third_quartile - self.first_quartile
    }
}

/// Computes summaries for every point of a box-plot series.
#[must_use]
pub fn compute_all(
    samples: &[Vec<f64>],
    method: QuartileMethod,
    detect_outliers: bool,
) -> Vec<Option<BoxStats>> {
    #[cfg(feature = "parallel-stats")]
    {
        samples
            .par_iter()
            .map(|values| BoxStats::compute(values, method, detect_outliers))
            .collect()
    }

    #[cfg(not(feature = "parallel-stats"))]
    {
        samples
            .iter()
            .map(|values| BoxStats::compute(values, method, detect_outliers))
            .collect()
    }
}

fn median_of(sorted: &[f64]) -> f64 {
    let len = sorted.len();
    if len % 2 == 1 {
        sorted[len / 2]
    } else {
        0.5 * (sorted[len / 2 - 1] + sorted[len / 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusive_quartiles_of_symmetric_sample() {
        let stats = BoxStats::compute(&[5.0, 1.0, 4.0, 2.0, 3.0], QuartileMethod::InclusiveMedian, true)
            .expect("stats");
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.first_quartile, 2.0);
        assert_eq!(stats.third_quartile, 4.0);
        assert_eq!(stats.iqr(), 2.0);
        assert!(stats.outliers.is_empty());
        assert_eq!((stats.min, stats.max), (1.0, 5.0));
        assert_eq!(stats.mean, 3.0);
    }

    #[test]
    fn exclusive_quartiles_drop_the_median_from_halves() {
        let stats = BoxStats::compute(&[1.0, 2.0, 3.0, 4.0, 5.0], QuartileMethod::ExclusiveMedian, false)
            .expect("stats");
        assert_eq!(stats.first_quartile, 1.5);
        assert_eq!(stats.third_quartile, 4.5);
    }

    #[test]
    fn even_length_sample_averages_the_middle_pair() {
        let stats = BoxStats::compute(&[1.0, 2.0, 3.0, 4.0], QuartileMethod::InclusiveMedian, false)
            .expect("stats");
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.first_quartile, 1.5);
        assert_eq!(stats.third_quartile, 3.5);
    }

    #[test]
    fn outliers_redefine_whisker_ends() {
        let stats = BoxStats::compute(
            &[1.0, 2.0, 3.0, 4.0, 5.0, 40.0],
            QuartileMethod::InclusiveMedian,
            true,
        )
        .expect("stats");
        assert_eq!(stats.outliers, vec![40.0]);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.min, 1.0);
    }

    #[test]
    fn degenerate_samples_do_not_panic() {
        assert!(BoxStats::compute(&[], QuartileMethod::InclusiveMedian, true).is_none());
        assert!(BoxStats::compute(&[f64::NAN], QuartileMethod::ExclusiveMedian, true).is_none());

        let single = BoxStats::compute(&[7.0], QuartileMethod::ExclusiveMedian, true).expect("single");
        assert_eq!(single.first_quartile, 7.0);
        assert_eq!(single.third_quartile, 7.0);
        assert!(single.outliers.is_empty());

        let flat = BoxStats::compute(&[2.0, 2.0, 2.0], QuartileMethod::InclusiveMedian, true).expect("flat");
        assert_eq!(flat.iqr(), 0.0);
        assert!(flat.outliers.is_empty());
    }
}

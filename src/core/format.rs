use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::primitives::unix_millis_to_datetime;
use crate::error::{ChartError, ChartResult};

/// Axis value formatter.
///
/// Parsed from short format strings: `n2` (fixed decimals), `p0` (percent),
/// `g` (general). Date axes use a `chrono` strftime pattern instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ValueFormat {
    #[default]
    General,
    Fixed(u8),
    Percent(u8),
    Date(String),
}

pub const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%d";

impl ValueFormat {
    /// Formats a numeric axis value.
    #[must_use]
    pub fn format_number(&self, value: f64) -> String {
        if !value.is_finite() {
            return String::new();
        }
        match self {
            Self::General => format_general(value),
            Self::Fixed(decimals) => format!("{value:.prec$}", prec = usize::from(*decimals)),
            Self::Percent(decimals) => {
                format!("{:.prec$}%", value * 100.0, prec = usize::from(*decimals))
            }
            Self::Date(pattern) => format_date(value, pattern),
        }
    }

    /// Formats an epoch-millisecond value; numeric formats fall back to the
    /// default date pattern.
    #[must_use]
    pub fn format_date(&self, millis: f64) -> String {
        match self {
            Self::Date(pattern) => format_date(millis, pattern),
            _ => format_date(millis, DEFAULT_DATE_PATTERN),
        }
    }
}

impl FromStr for ValueFormat {
    type Err = ChartError;

    fn from_str(raw: &str) -> ChartResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("g") {
            return Ok(Self::General);
        }
        if trimmed.contains('%') && trimmed.len() > 1 && !trimmed.starts_with(['p', 'P']) {
            return Ok(Self::Date(trimmed.to_owned()));
        }

        let (kind, digits) = trimmed.split_at(1);
        let decimals = if digits.is_empty() {
            2
        } else {
            digits.parse::<u8>().map_err(|_| {
                ChartError::InvalidOption(format!("unsupported value format `{raw}`"))
            })?
        };
        match kind {
            "n" | "N" | "f" | "F" => Ok(Self::Fixed(decimals)),
            "p" | "P" => Ok(Self::Percent(decimals)),
            _ => Err(ChartError::InvalidOption(format!(
                "unsupported value format `{raw}`"
            ))),
        }
    }
}

fn format_general(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.6}");
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}

fn format_date(millis: f64, pattern: &str) -> String {
    unix_millis_to_datetime(millis)
        .map(|time| time.format(pattern).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_numeric_formats() {
        assert_eq!("n2".parse::<ValueFormat>().expect("n2"), ValueFormat::Fixed(2));
        assert_eq!("p0".parse::<ValueFormat>().expect("p0"), ValueFormat::Percent(0));
        assert_eq!("".parse::<ValueFormat>().expect("empty"), ValueFormat::General);
        assert!("x3".parse::<ValueFormat>().is_err());
    }

    #[test]
    fn strftime_patterns_become_date_formats() {
        let format = "%d/%m/%Y".parse::<ValueFormat>().expect("date");
        assert_eq!(format, ValueFormat::Date("%d/%m/%Y".to_owned()));
        // 2021-01-02T00:00:00Z
        assert_eq!(format.format_date(1_609_545_600_000.0), "02/01/2021");
    }

    #[test]
    fn general_format_trims_trailing_zeros() {
        assert_eq!(ValueFormat::General.format_number(3.0), "3");
        assert_eq!(ValueFormat::General.format_number(2.5), "2.5");
        assert_eq!(ValueFormat::Percent(1).format_number(0.256), "25.6%");
    }
}

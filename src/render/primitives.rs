use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses `#rrggbb` / `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> ChartResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 && digits.len() != 8 {
            return Err(ChartError::InvalidData(format!("invalid hex color `{hex}`")));
        }
        let channel = |start: usize| {
            u8::from_str_radix(&digits[start..start + 2], 16)
                .map(|value| f64::from(value) / 255.0)
                .map_err(|_| ChartError::InvalidData(format!("invalid hex color `{hex}`")))
        };
        let alpha = if digits.len() == 8 { channel(6)? } else { 1.0 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    #[must_use]
    pub const fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Current pen state of a render engine, consulted by the next draw call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: Some(Color::rgb(0.0, 0.0, 0.0)),
            stroke_width: 1.0,
        }
    }
}

/// Ordered series colors; indices wrap around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        let colors = [
            "#88bde6", "#fbb258", "#90cd97", "#f6aac9", "#bfa554", "#bc99c7", "#eddd46",
            "#f07e6e", "#8c8c8c", "#5da5da",
        ]
        .iter()
        .map(|hex| Color::from_hex(hex).unwrap_or(Color::rgb(0.5, 0.5, 0.5)))
        .collect();
        Self { colors }
    }
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> ChartResult<Self> {
        if colors.is_empty() {
            return Err(ChartError::InvalidOption(
                "palette must contain at least one color".to_owned(),
            ));
        }
        for color in &colors {
            color.validate()?;
        }
        Ok(Self { colors })
    }

    #[must_use]
    pub fn color(&self, index: usize) -> Color {
        self.colors
            .get(index % self.colors.len().max(1))
            .copied()
            .unwrap_or(Color::rgb(0.5, 0.5, 0.5))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_with_optional_alpha() {
        let color = Color::from_hex("#ff000080").expect("hex");
        assert_eq!(color.red, 1.0);
        assert!((color.alpha - 128.0 / 255.0).abs() <= 1e-12);
        assert!(Color::from_hex("#12").is_err());
    }

    #[test]
    fn palette_wraps_indices() {
        let palette = Palette::default();
        assert_eq!(palette.color(0), palette.color(palette.len()));
        assert!(Palette::new(Vec::new()).is_err());
    }
}

//! Duration-to-fill-colour mapping.
//!
//! A node's fill is the fast colour blended toward the slow colour in
//! CIE L*a*b*, weighted by
//!
//! ```text
//! fade = min(duration / (max_duration * fade_scale), 1.0)
//! ```
//!
//! A single step (usually `spring.context.refresh`) spans almost the whole
//! startup, so `fade_scale` below 1 saturates to the slow colour well before
//! the maximum.

use std::time::Duration;

use palette::white_point::D65;
use palette::{FromColor, Lab, Mix, Srgb};

use bootviz_error::{Error, Result};

pub const DEFAULT_FAST_COLOR: &str = "#00FF00";
pub const DEFAULT_SLOW_COLOR: &str = "#FF0000";
pub const DEFAULT_FADE_SCALE: f64 = 0.25;

type LabColor = Lab<D65, f64>;

/// User-facing colour settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorOptions {
    /// Hex RGB for the fastest steps.
    pub fast_color: String,
    /// Hex RGB for steps at or beyond the saturation point.
    pub slow_color: String,
    /// Fraction of the maximum duration at which colour saturates.
    pub fade_scale: f64,
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            fast_color: DEFAULT_FAST_COLOR.to_string(),
            slow_color: DEFAULT_SLOW_COLOR.to_string(),
            fade_scale: DEFAULT_FADE_SCALE,
        }
    }
}

/// Colour gradient bound to one snapshot's maximum duration.
#[derive(Debug, Clone)]
pub struct ColorScale {
    fast: LabColor,
    slow: LabColor,
    fade_scale: f64,
    max_duration: Duration,
}

impl ColorScale {
    pub fn new(options: &ColorOptions, max_duration: Duration) -> Result<Self> {
        if !options.fade_scale.is_finite() || options.fade_scale <= 0.0 {
            return Err(Error::config_invalid(format!(
                "fade scale must be a positive number, got {}",
                options.fade_scale
            ))
            .with_operation("color::new")
            .with_context("fade_scale", options.fade_scale.to_string()));
        }

        Ok(Self {
            fast: parse_hex(&options.fast_color, "fast_color")?,
            slow: parse_hex(&options.slow_color, "slow_color")?,
            fade_scale: options.fade_scale,
            max_duration,
        })
    }

    /// Normalised position of `duration` on the gradient, in `[0, 1]`.
    pub fn fade(&self, duration: Duration) -> f64 {
        let saturation = self.max_duration.as_secs_f64() * self.fade_scale;
        if saturation <= 0.0 {
            // Only reachable when every step took zero time.
            return if duration.is_zero() { 0.0 } else { 1.0 };
        }
        (duration.as_secs_f64() / saturation).min(1.0)
    }

    /// Fill colour for a step of the given duration, as `#rrggbb`.
    pub fn fill_for(&self, duration: Duration) -> String {
        self.blend(self.fade(duration))
    }

    /// Blend in Lab space, clamp back into sRGB and format as hex.
    pub fn blend(&self, fade: f64) -> String {
        let mixed = self.fast.mix(self.slow, fade.clamp(0.0, 1.0));
        let rgb: Srgb<u8> = Srgb::<f64>::from_color(mixed).into_format();
        format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
    }
}

fn parse_hex(raw: &str, field: &'static str) -> Result<LabColor> {
    let rgb: Srgb<u8> = raw.trim().parse().map_err(|e| {
        Error::config_invalid(format!("{field} '{raw}' is not a hex RGB colour"))
            .with_operation("color::parse_hex")
            .with_context(field, raw)
            .set_source(e)
    })?;
    Ok(LabColor::from_color(rgb.into_format::<f64>()))
}

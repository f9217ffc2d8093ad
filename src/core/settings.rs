//! Engine configuration — consumed read-only by the core.
//!
//! Everything here is validated once at startup; an invalid value is fatal
//! before the first gesture, never mid-turn.

use std::time::Duration;

use thiserror::Error;

/// How the book claims terminal space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeMode {
    /// Fixed page size in terminal cells.
    Fixed { width: u16, height: u16 },
    /// Fill whatever area the layout hands us.
    Stretch,
}

/// Tunable behavior of the flip engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Total duration of a committed full turn. Shorter drags scale down
    /// proportionally.
    pub flip_duration: Duration,
    /// Corner hit zones span `diagonal / corner_sensitivity`; larger values
    /// shrink the zones.
    pub corner_sensitivity: f64,
    /// Duration of the hard-cover hover lift; `None` disables the lift and
    /// hard covers fold like soft pages on hover.
    pub cover_lift: Option<Duration>,
    /// Suppress click-to-turn everywhere except the corner zones.
    pub disable_flip_by_click: bool,
    /// Show the first (and a trailing solo) page alone as a stiff cover.
    pub show_cover: bool,
    /// Virtual page-turn positions; 0 keeps the book at its real size.
    pub total_virtual_pages: usize,
    /// Page sizing policy for the terminal layout.
    pub size: SizeMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            flip_duration: Duration::from_millis(1000),
            corner_sensitivity: 5.0,
            cover_lift: Some(Duration::from_millis(300)),
            disable_flip_by_click: false,
            show_cover: true,
            total_virtual_pages: 0,
            size: SizeMode::Stretch,
        }
    }
}

/// Rejected configuration values, reported before the UI starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("flip duration must be greater than zero")]
    ZeroFlipDuration,
    #[error("corner sensitivity must be greater than zero")]
    BadCornerSensitivity,
    #[error("cover lift duration must be greater than zero (omit it to disable the lift)")]
    ZeroCoverLift,
    #[error("fixed page size must be at least {min_width}x{min_height} cells, got {width}x{height}")]
    PageTooSmall {
        width: u16,
        height: u16,
        min_width: u16,
        min_height: u16,
    },
}

/// Smallest page that still has room for a corner zone and a line of text.
pub const MIN_PAGE_WIDTH: u16 = 8;
pub const MIN_PAGE_HEIGHT: u16 = 6;

impl Settings {
    /// Check every field, returning the settings unchanged on success.
    pub fn validate(self) -> Result<Self, SettingsError> {
        if self.flip_duration.is_zero() {
            return Err(SettingsError::ZeroFlipDuration);
        }
        if !(self.corner_sensitivity > 0.0) {
            return Err(SettingsError::BadCornerSensitivity);
        }
        if matches!(self.cover_lift, Some(d) if d.is_zero()) {
            return Err(SettingsError::ZeroCoverLift);
        }
        if let SizeMode::Fixed { width, height } = self.size {
            if width < MIN_PAGE_WIDTH || height < MIN_PAGE_HEIGHT {
                return Err(SettingsError::PageTooSmall {
                    width,
                    height,
                    min_width: MIN_PAGE_WIDTH,
                    min_height: MIN_PAGE_HEIGHT,
                });
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn zero_flip_duration_is_rejected() {
        let settings = Settings {
            flip_duration: Duration::ZERO,
            ..Settings::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::ZeroFlipDuration));
    }

    #[test]
    fn non_finite_sensitivity_is_rejected() {
        let settings = Settings {
            corner_sensitivity: f64::NAN,
            ..Settings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::BadCornerSensitivity)
        );
    }

    #[test]
    fn tiny_fixed_page_is_rejected() {
        let settings = Settings {
            size: SizeMode::Fixed {
                width: 4,
                height: 3,
            },
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::PageTooSmall { .. })
        ));
    }

    #[test]
    fn disabled_cover_lift_is_fine() {
        let settings = Settings {
            cover_lift: None,
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }
}

//! Color temperature control.

use serde::{Deserialize, Serialize};

/// Color temperature in Kelvin, with valid values from 1000K to 8000K.
///
/// Lower values produce warmer (more yellow/orange) light, while higher
/// values produce cooler (more blue) light. Typical values:
/// - 2700K: Warm white (incandescent-like)
/// - 4000K: Neutral white
/// - 6500K: Daylight
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ColorTemperature {
    pub(crate) kelvin: u16,
}

impl ColorTemperature {
    const MIN: u16 = 1000;
    const MAX: u16 = 8000;
    const DEFAULT: u16 = 2700;

    /// Create a new ColorTemperature with the default value (2700K, warm white).
    ///
    /// # Examples
    ///
    /// ```
    /// use lightify_rs::ColorTemperature;
    ///
    /// assert_eq!(ColorTemperature::new().kelvin(), 2700);
    /// ```
    pub fn new() -> Self {
        ColorTemperature {
            kelvin: Self::DEFAULT,
        }
    }

    /// Get the kelvin value.
    pub fn kelvin(&self) -> u16 {
        self.kelvin
    }

    /// Create a new ColorTemperature with the given value.
    ///
    /// Returns `None` if value is outside the valid range (1000-8000).
    ///
    /// # Examples
    ///
    /// ```
    /// use lightify_rs::ColorTemperature;
    ///
    /// assert!(ColorTemperature::create(999).is_none());
    /// assert!(ColorTemperature::create(1000).is_some());
    /// assert!(ColorTemperature::create(8000).is_some());
    /// assert!(ColorTemperature::create(8001).is_none());
    /// ```
    pub fn create(kelvin: u16) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&kelvin) {
            Some(ColorTemperature { kelvin })
        } else {
            None
        }
    }

    /// Returns the warm-white default if value is invalid.
    pub fn create_or(kelvin: u16) -> Self {
        Self::create(kelvin).unwrap_or_default()
    }
}

impl Default for ColorTemperature {
    fn default() -> Self {
        Self::new()
    }
}

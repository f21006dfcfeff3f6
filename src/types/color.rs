//! RGBA color representation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An RGBA color with red, green, blue, and alpha components (0-255 each).
///
/// The alpha channel rides along on the wire and in device reports; most
/// Lightify bulbs treat it as an intensity byte and expect 255.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub(crate) red: u8,
    pub(crate) green: u8,
    pub(crate) blue: u8,
    pub(crate) alpha: u8,
}

impl Rgba {
    /// Create a fully opaque color with the given RGB values.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 255,
        }
    }

    /// Create a color with an explicit alpha component.
    pub fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }
}

impl FromStr for Rgba {
    type Err = String;

    /// Parse from comma-separated string (e.g., "255,128,0" or "255,128,0,200").
    ///
    /// # Examples
    ///
    /// ```
    /// use lightify_rs::Rgba;
    ///
    /// assert_eq!("255,128,0".parse(), Ok(Rgba::rgb(255, 128, 0)));
    /// assert_eq!("1,2,3,4".parse(), Ok(Rgba::rgba(1, 2, 3, 4)));
    /// ```
    fn from_str(s: &str) -> Result<Self, String> {
        let parts: Vec<u8> = s.split(',').map(|c| c.parse().unwrap_or(0)).collect();
        match parts.len() {
            3 => Ok(Self::rgb(parts[0], parts[1], parts[2])),
            4 => Ok(Self::rgba(parts[0], parts[1], parts[2], parts[3])),
            _ => Err("Expected format: r,g,b or r,g,b,a".into()),
        }
    }
}

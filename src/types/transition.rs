//! Fade timing for state-changing commands.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fade duration carried by the brightness, temperature, color, and soft
/// on/off commands, expressed in tenths of a second.
///
/// The wire field is 16 bits, so the longest expressible fade is a little
/// under two hours; longer durations saturate.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub(crate) deciseconds: u16,
}

impl Transition {
    /// No fade; the device applies the new state at once.
    pub fn immediate() -> Self {
        Transition { deciseconds: 0 }
    }

    /// Create a transition from a raw tenth-of-a-second count.
    pub fn from_deciseconds(deciseconds: u16) -> Self {
        Transition { deciseconds }
    }

    /// Create a transition from a [`Duration`], rounding down to whole
    /// tenths of a second.
    ///
    /// # Examples
    ///
    /// ```
    /// use lightify_rs::Transition;
    /// use std::time::Duration;
    ///
    /// assert_eq!(Transition::from_duration(Duration::from_secs(2)).deciseconds(), 20);
    /// assert_eq!(Transition::from_duration(Duration::from_millis(150)).deciseconds(), 1);
    /// ```
    pub fn from_duration(duration: Duration) -> Self {
        let deciseconds = u16::try_from(duration.as_millis() / 100).unwrap_or(u16::MAX);
        Transition { deciseconds }
    }

    pub fn deciseconds(&self) -> u16 {
        self.deciseconds
    }
}

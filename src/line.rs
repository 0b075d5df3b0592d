//! Output line primitives
//!
//! A [`Line`] is a platform pin number. Lines are either driven to a digital
//! [`Level`] or run in PWM mode at some [`DutyCycle`].

use core::fmt;

/// Maximum number of lines a coordinator can own.
pub const MAX_LINES: usize = 16;

/// Fixed-capacity set of lines, in board order.
pub type LineSet = heapless::Vec<Line, MAX_LINES>;

/// A single addressable output line (platform pin number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Line(pub u8);

impl Line {
    pub const fn pin(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Digital output level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

impl Level {
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

/// PWM duty cycle in percent, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct DutyCycle(u8);

impl DutyCycle {
    pub const OFF: Self = Self(0);
    pub const FULL: Self = Self(100);

    /// Create a duty cycle, saturating at 100%.
    pub const fn new(percent: u8) -> Self {
        if percent > 100 { Self::FULL } else { Self(percent) }
    }

    pub const fn percent(self) -> u8 {
        self.0
    }
}

use embassy_time::Duration;

use crate::display::DISPLAY_BITS;
use crate::error::{EffectError, Result};
use crate::line::{Line, LineSet, MAX_LINES};

/// Board pin map (BCM numbering) of the eight effect LEDs.
pub const DEFAULT_LINES: [Line; 8] = [
    Line(17),
    Line(27),
    Line(22),
    Line(5),
    Line(6),
    Line(13),
    Line(19),
    Line(26),
];

pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 50;

/// Time allowed for the indicator to stop on its own before it is killed.
pub const DEFAULT_RECONCILE_TIMEOUT: Duration = Duration::from_secs(1);

/// Number of lines a numeric display needs: one indicator plus the bits.
pub const REQUIRED_LINES: usize = DISPLAY_BITS + 1;

/// Timings of a single flash pulse
#[derive(Debug, Clone, Copy)]
pub struct FlashTimings {
    /// How long the lines stay high
    pub on: Duration,
    /// Low gap between two pulses, none by default so pulses run back to back
    pub off: Duration,
}

/// Timings of a breathing ramp
#[derive(Debug, Clone, Copy)]
pub struct RampTimings {
    /// Duration of every duty cycle step
    pub step: Duration,
    /// Pause at the top and at the bottom of the ramp
    pub pause: Duration,
}

/// Configuration for the effect coordinator
#[derive(Debug, Clone)]
pub struct EffectConfig {
    /// Lines owned by the coordinator, in board order.
    ///
    /// The first line doubles as the numeric display indicator, the next
    /// seven carry the bits (most significant first).
    pub lines: LineSet,
    pub pwm_frequency_hz: u32,
    pub flash: FlashTimings,
    pub breath: RampTimings,
    /// Ramp of the background indicator launched by the numeric display
    pub indicator: RampTimings,
    pub reconcile_timeout: Duration,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            lines: DEFAULT_LINES.into_iter().collect(),
            pwm_frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
            flash: FlashTimings {
                on: Duration::from_millis(200),
                off: Duration::from_millis(0),
            },
            breath: RampTimings {
                step: Duration::from_millis(50),
                pause: Duration::from_millis(50),
            },
            indicator: RampTimings {
                step: Duration::from_millis(200),
                pause: Duration::from_secs(1),
            },
            reconcile_timeout: DEFAULT_RECONCILE_TIMEOUT,
        }
    }
}

impl EffectConfig {
    /// Default timings with a custom pin map.
    pub fn with_lines(lines: &[Line]) -> Result<Self> {
        let lines = LineSet::from_slice(lines).map_err(|()| EffectError::TooManyLines {
            max: MAX_LINES,
            actual: lines.len(),
        })?;
        let config = Self {
            lines,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lines.len() < REQUIRED_LINES {
            return Err(EffectError::NotEnoughLines {
                required: REQUIRED_LINES,
                actual: self.lines.len(),
            });
        }
        for (i, line) in self.lines.iter().enumerate() {
            if self.lines[..i].contains(line) {
                return Err(EffectError::DuplicateLine(*line));
            }
        }
        Ok(())
    }

    /// Line driven by the background indicator.
    pub fn indicator_line(&self) -> Line {
        self.lines[0]
    }

    /// Lines carrying the numeric display bits, most significant first.
    pub fn display_lines(&self) -> &[Line] {
        &self.lines[1..REQUIRED_LINES]
    }
}

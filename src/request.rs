//! Effect requests
//!
//! Converts requests coming from the calling layer (HTTP handlers, MQTT, ...)
//! into coordinator calls.

use crate::OutputDriver;
use crate::coordinator::Coordinator;
use crate::effect::{FlashTarget, Repeat};
use crate::error::Result;
use crate::line::Line;

/// Pulses per flash when the request does not say.
pub const DEFAULT_FLASH_TIMES: u32 = 1;

/// A request to run an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "effect", rename_all = "snake_case"))]
pub enum EffectRequest {
    Flash {
        times: Option<u32>,
        /// Explicit lines; overrides `even`
        lines: Option<Vec<Line>>,
        /// Pulse the even instead of the odd lines
        #[cfg_attr(feature = "serde", serde(default))]
        even: bool,
    },
    Breath {
        /// Number of breaths, `None` breathes until stopped
        times: Option<u32>,
        /// 1-based line positions
        lines: Option<Vec<usize>>,
    },
    ShowNumber {
        number: i64,
        #[cfg_attr(feature = "serde", serde(default = "indicator_default"))]
        indicator: bool,
    },
    Cleanup,
}

#[cfg(feature = "serde")]
const fn indicator_default() -> bool {
    true
}

impl<D: OutputDriver + 'static> Coordinator<D> {
    /// Run the effect described by `request`.
    pub async fn dispatch(&self, request: EffectRequest) -> Result<()> {
        match request {
            EffectRequest::Flash { times, lines, even } => {
                let target = match (lines, even) {
                    (Some(lines), _) => FlashTarget::Lines(lines),
                    (None, true) => FlashTarget::Even,
                    (None, false) => FlashTarget::Odd,
                };
                self.flash(times.unwrap_or(DEFAULT_FLASH_TIMES), &target)
                    .await
            }
            EffectRequest::Breath { times, lines } => {
                self.breath(Repeat::from(times), lines.as_deref()).await
            }
            EffectRequest::ShowNumber { number, indicator } => {
                self.show_number(number, indicator).await
            }
            EffectRequest::Cleanup => self.cleanup().await,
        }
    }
}

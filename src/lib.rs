//! Mutually exclusive light effects on shared GPIO/PWM lines
//!
//! A [`Coordinator`] owns a fixed set of output lines and runs one effect at
//! a time on them: flash, breath, or a 7-bit numeric display with an optional
//! breathing indicator running in the background.

pub mod config;
pub mod coordinator;
pub mod display;
pub mod driver;
pub mod effect;
pub mod error;
pub mod line;
mod mutex;
pub mod oscillator;
pub mod request;

pub use config::{EffectConfig, FlashTimings, RampTimings};
pub use coordinator::Coordinator;
pub use driver::SharedDriver;
pub use effect::{FlashTarget, Repeat};
pub use error::{EffectError, Result};
pub use line::{DutyCycle, Level, Line, LineSet};
pub use mutex::StopRequest;
pub use oscillator::{BreathTask, Reconciliation};
pub use request::EffectRequest;

pub use embassy_time::Duration;

/// Abstract output driver trait
///
/// Implement this trait to support different boards. Calls are made from the
/// coordinator's executor and from the indicator worker thread, never at the
/// same time.
pub trait OutputDriver: Send {
    /// Configure `lines` as outputs, driven low
    fn configure_output(&mut self, lines: &[Line]);

    /// Drive a line to a digital level
    fn write(&mut self, line: Line, level: Level);

    /// Start PWM on a line
    fn start_pwm(&mut self, line: Line, frequency_hz: u32, duty: DutyCycle);

    /// Update the duty cycle of a running PWM
    fn set_duty(&mut self, line: Line, duty: DutyCycle);

    /// Stop PWM and give the line back to digital control
    fn stop_pwm(&mut self, line: Line);

    /// Release every line resource
    fn release(&mut self);
}

//! Foreground effects
//!
//! Effects are plain async loops. Every timed wait is a checkpoint: the loop
//! looks at its [`StopFlag`] right before it writes the next step, and ramp
//! pauses are cut into step-sized slices, so a stop request takes effect
//! after at most one step.

pub(crate) mod breath;
pub(crate) mod flash;

use core::ops::ControlFlow;

use embassy_time::{Duration, Timer};

use crate::OutputDriver;
use crate::config::RampTimings;
use crate::driver::SharedDriver;
use crate::error::{EffectError, Result};
use crate::line::{DutyCycle, Level, Line};

pub use flash::FlashTarget;

/// Number of duty cycle steps between off and full brightness.
pub const RAMP_STEPS: u8 = 10;

const STEP_PERCENT: u8 = 100 / RAMP_STEPS;

/// Something an effect loop polls at its checkpoints.
pub(crate) trait StopFlag {
    fn is_stop_requested(&self) -> bool;
}

/// How many times an effect repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Times(u32),
    /// Run until a stop is requested.
    Forever,
}

impl Default for Repeat {
    fn default() -> Self {
        Self::Times(1)
    }
}

impl From<Option<u32>> for Repeat {
    fn from(times: Option<u32>) -> Self {
        times.map_or(Self::Forever, Self::Times)
    }
}

impl Repeat {
    pub(crate) fn validate(self) -> Result<Self> {
        match self {
            Self::Times(0) => Err(EffectError::ZeroRepeat),
            other => Ok(other),
        }
    }

    /// Returns true if iteration `done` (0-based count of finished runs) may start.
    pub(crate) const fn allows(self, done: u32) -> bool {
        match self {
            Self::Times(times) => done < times,
            Self::Forever => true,
        }
    }
}

/// Rising half of a breath: 0%, 10%, ..., 90%.
pub(crate) fn ramp_up() -> impl Iterator<Item = DutyCycle> {
    (0..RAMP_STEPS).map(|step| DutyCycle::new(step * STEP_PERCENT))
}

/// Falling half of a breath: 100%, 90%, ..., 0%.
pub(crate) fn ramp_down() -> impl Iterator<Item = DutyCycle> {
    (0..=RAMP_STEPS)
        .rev()
        .map(|step| DutyCycle::new(step * STEP_PERCENT))
}

/// Run one full breath, handing every duty cycle to `apply`.
///
/// Returns `Break` as soon as `stop` is observed at a checkpoint.
pub(crate) async fn breathe_once<S, F>(
    timings: &RampTimings,
    stop: &S,
    mut apply: F,
) -> ControlFlow<()>
where
    S: StopFlag + ?Sized,
    F: FnMut(DutyCycle),
{
    for duty in ramp_up() {
        if stop.is_stop_requested() {
            return ControlFlow::Break(());
        }
        apply(duty);
        Timer::after(timings.step).await;
    }
    if pause(timings, stop).await.is_break() {
        return ControlFlow::Break(());
    }

    for duty in ramp_down() {
        if stop.is_stop_requested() {
            return ControlFlow::Break(());
        }
        apply(duty);
        Timer::after(timings.step).await;
    }
    if pause(timings, stop).await.is_break() {
        return ControlFlow::Break(());
    }

    ControlFlow::Continue(())
}

/// Hold the ramp for `timings.pause`, in slices no longer than one step.
///
/// Returns `Break` if `stop` is observed between two slices.
async fn pause<S>(timings: &RampTimings, stop: &S) -> ControlFlow<()>
where
    S: StopFlag + ?Sized,
{
    let slice = if timings.step == Duration::from_ticks(0) {
        timings.pause
    } else {
        timings.step
    };
    let mut remaining = timings.pause;
    while remaining > Duration::from_ticks(0) {
        if stop.is_stop_requested() {
            return ControlFlow::Break(());
        }
        let wait = remaining.min(slice);
        Timer::after(wait).await;
        remaining -= wait;
    }
    ControlFlow::Continue(())
}

#[derive(Clone, Copy)]
enum TeardownKind {
    DriveLow,
    StopPwm,
}

/// Restores the lines of an effect when the effect ends.
///
/// Lives for the whole effect loop, so lines are restored on normal exit,
/// on stop and when the effect future is dropped mid-step.
pub(crate) struct Teardown<'a, D: OutputDriver> {
    driver: &'a SharedDriver<D>,
    lines: &'a [Line],
    kind: TeardownKind,
}

impl<'a, D: OutputDriver> Teardown<'a, D> {
    pub(crate) fn drive_low(driver: &'a SharedDriver<D>, lines: &'a [Line]) -> Self {
        Self {
            driver,
            lines,
            kind: TeardownKind::DriveLow,
        }
    }

    pub(crate) fn stop_pwm(driver: &'a SharedDriver<D>, lines: &'a [Line]) -> Self {
        Self {
            driver,
            lines,
            kind: TeardownKind::StopPwm,
        }
    }
}

impl<D: OutputDriver> Drop for Teardown<'_, D> {
    fn drop(&mut self) {
        match self.kind {
            TeardownKind::DriveLow => self.driver.write_all(self.lines, Level::Low),
            TeardownKind::StopPwm => self.driver.stop_pwm_all(self.lines),
        }
    }
}

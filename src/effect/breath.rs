use log::debug;

use super::{Repeat, StopFlag, Teardown, breathe_once};
use crate::OutputDriver;
use crate::config::RampTimings;
use crate::driver::SharedDriver;
use crate::error::{EffectError, Result};
use crate::line::{Line, LineSet};

/// Pick lines by 1-based position; `None` selects every owned line.
pub(crate) fn select_lines(owned: &[Line], positions: Option<&[usize]>) -> Result<LineSet> {
    let Some(positions) = positions else {
        return Ok(owned.iter().copied().collect());
    };
    if positions.is_empty() {
        return Err(EffectError::EmptySelection);
    }

    let mut lines = LineSet::new();
    for &position in positions {
        let line = position
            .checked_sub(1)
            .and_then(|index| owned.get(index))
            .copied()
            .ok_or(EffectError::LineIndex(position))?;
        if !lines.contains(&line) {
            let _ = lines.push(line);
        }
    }
    Ok(lines)
}

/// Ramp PWM up and down on `lines` until `repeat` runs out or a stop arrives.
pub(crate) async fn run<D: OutputDriver>(
    driver: &SharedDriver<D>,
    lines: &[Line],
    repeat: Repeat,
    frequency_hz: u32,
    timings: &RampTimings,
    stop: &impl StopFlag,
) {
    driver.start_pwm_all(lines, frequency_hz);
    let _teardown = Teardown::stop_pwm(driver, lines);

    let mut done = 0;
    while repeat.allows(done) {
        if stop.is_stop_requested() {
            break;
        }
        let flow = breathe_once(timings, stop, |duty| driver.set_duty_all(lines, duty)).await;
        if flow.is_break() {
            break;
        }
        done = done.saturating_add(1);
    }
    debug!("breath: finished after {done} breaths");
}

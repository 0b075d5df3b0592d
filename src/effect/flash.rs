use embassy_time::{Duration, Timer};
use log::debug;

use super::{StopFlag, Teardown};
use crate::OutputDriver;
use crate::config::FlashTimings;
use crate::driver::SharedDriver;
use crate::error::{EffectError, Result};
use crate::line::{Level, Line, LineSet};

/// Lines pulsed by a flash.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlashTarget {
    /// 1st, 3rd, 5th, ... configured line
    #[default]
    Odd,
    /// 2nd, 4th, 6th, ... configured line
    Even,
    All,
    /// Explicit line identifiers, each must be owned by the coordinator
    Lines(Vec<Line>),
}

impl FlashTarget {
    pub(crate) fn resolve(&self, owned: &[Line]) -> Result<LineSet> {
        let lines: LineSet = match self {
            Self::Odd => owned.iter().copied().step_by(2).collect(),
            Self::Even => owned.iter().copied().skip(1).step_by(2).collect(),
            Self::All => owned.iter().copied().collect(),
            Self::Lines(lines) => {
                let mut set = LineSet::new();
                for &line in lines {
                    if !owned.contains(&line) {
                        return Err(EffectError::UnknownLine(line));
                    }
                    if !set.contains(&line) {
                        // Owned lines are unique and fit, so neither can this.
                        let _ = set.push(line);
                    }
                }
                set
            }
        };
        if lines.is_empty() {
            return Err(EffectError::EmptySelection);
        }
        Ok(lines)
    }
}

/// Pulse `lines` high then low `times` times.
pub(crate) async fn run<D: OutputDriver>(
    driver: &SharedDriver<D>,
    lines: &[Line],
    times: u32,
    timings: &FlashTimings,
    stop: &impl StopFlag,
) {
    let _teardown = Teardown::drive_low(driver, lines);

    for done in 0..times {
        if stop.is_stop_requested() {
            debug!("flash: stopped after {done} of {times} pulses");
            return;
        }
        if done > 0 && timings.off > Duration::from_ticks(0) {
            Timer::after(timings.off).await;
            if stop.is_stop_requested() {
                debug!("flash: stopped after {done} of {times} pulses");
                return;
            }
        }
        driver.write_all(lines, Level::High);
        Timer::after(timings.on).await;
        driver.write_all(lines, Level::Low);
    }
}

//! Background indicator
//!
//! A [`BreathTask`] breathes a single line on its own worker thread, so the
//! numeric display can return to its caller while the indicator keeps going.
//!
//! Stopping is cooperative first: the ramp loop sees the stop flag at its next
//! checkpoint, stops PWM and signals completion. [`BreathTask::reconcile`]
//! bounds that wait. Past the deadline it aborts the worker's ramp and releases
//! the line from the caller's side, so the line is low when it returns no
//! matter what the worker is doing.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, with_timeout};
use futures::executor::block_on;
use log::{debug, warn};

use crate::OutputDriver;
use crate::config::RampTimings;
use crate::driver::SharedDriver;
use crate::effect::{StopFlag, breathe_once};
use crate::error::Result;
use crate::line::{DutyCycle, Level, Line};

/// How a [`BreathTask`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The worker observed the stop flag and released its line in time.
    Stopped,
    /// The worker missed the deadline; it was aborted and the line released
    /// by the caller.
    ForceStopped,
}

struct TaskState {
    stop: AtomicBool,
    /// Set while PWM on the line belongs to the task.
    line_held: AtomicBool,
    finished: AtomicBool,
    abort: Signal<CriticalSectionRawMutex, ()>,
    done: Signal<CriticalSectionRawMutex, ()>,
}

impl TaskState {
    fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            line_held: AtomicBool::new(true),
            finished: AtomicBool::new(false),
            abort: Signal::new(),
            done: Signal::new(),
        }
    }

    fn apply_duty<D: OutputDriver>(&self, driver: &SharedDriver<D>, line: Line, duty: DutyCycle) {
        driver.with(|driver| {
            if self.line_held.load(Ordering::Acquire) {
                driver.set_duty(line, duty);
            }
        });
    }

    /// Stop PWM and drive the line low, once. Returns false if already released.
    fn release_line<D: OutputDriver>(&self, driver: &SharedDriver<D>, line: Line) -> bool {
        driver.with(|driver| {
            if !self.line_held.swap(false, Ordering::AcqRel) {
                return false;
            }
            driver.stop_pwm(line);
            driver.write(line, Level::Low);
            true
        })
    }
}

impl StopFlag for TaskState {
    fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Handle to a breathing indicator running on a worker thread.
///
/// Dropping the handle without reconciling aborts the worker, which then
/// releases the line by itself.
pub struct BreathTask {
    line: Line,
    state: Arc<TaskState>,
    worker: Option<JoinHandle<()>>,
}

impl BreathTask {
    /// Start PWM on `line` and breathe it on a fresh worker thread.
    pub fn start<D: OutputDriver + 'static>(
        driver: SharedDriver<D>,
        line: Line,
        frequency_hz: u32,
        timings: RampTimings,
    ) -> Result<Self> {
        let state = Arc::new(TaskState::new());
        driver.with(|driver| driver.start_pwm(line, frequency_hz, DutyCycle::OFF));

        let worker_state = Arc::clone(&state);
        let worker_driver = driver.clone();
        let spawned = thread::Builder::new()
            .name(format!("indicator-{}", line.pin()))
            .spawn(move || run_worker(&worker_driver, line, &timings, &worker_state));

        match spawned {
            Ok(worker) => {
                debug!("indicator: breathing on {line}");
                Ok(Self {
                    line,
                    state,
                    worker: Some(worker),
                })
            }
            Err(err) => {
                state.release_line(&driver, line);
                Err(err.into())
            }
        }
    }

    pub fn line(&self) -> Line {
        self.line
    }

    /// Ask the ramp loop to stop at its next checkpoint.
    pub fn request_stop(&self) {
        self.state.stop.store(true, Ordering::Release);
    }

    /// Returns true once the worker has released its line and exited the loop.
    pub fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::Acquire)
    }

    /// Stop the indicator, waiting at most `timeout` for it to comply.
    ///
    /// The line is stopped and low when this returns, whatever the outcome.
    pub async fn reconcile<D: OutputDriver>(
        mut self,
        driver: &SharedDriver<D>,
        timeout: Duration,
    ) -> Reconciliation {
        self.request_stop();

        let outcome = if with_timeout(timeout, self.state.done.wait()).await.is_ok() {
            Reconciliation::Stopped
        } else {
            warn!(
                "indicator: {} ignored stop for {} ms, forcing it down",
                self.line,
                timeout.as_millis()
            );
            self.state.abort.signal(());
            self.state.release_line(driver, self.line);
            Reconciliation::ForceStopped
        };

        // An aborted worker that is still stuck is left detached.
        if let Some(worker) = self.worker.take() {
            if worker.is_finished() && worker.join().is_err() {
                warn!("indicator: worker for {} panicked", self.line);
            }
        }
        outcome
    }
}

impl Drop for BreathTask {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.request_stop();
            self.state.abort.signal(());
        }
    }
}

impl fmt::Debug for BreathTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreathTask")
            .field("line", &self.line)
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

fn run_worker<D: OutputDriver>(
    driver: &SharedDriver<D>,
    line: Line,
    timings: &RampTimings,
    state: &TaskState,
) {
    block_on(async {
        let ramp = async {
            while breathe_once(timings, state, |duty| state.apply_duty(driver, line, duty))
                .await
                .is_continue()
            {}
        };
        if let Either::Second(()) = select(ramp, state.abort.wait()).await {
            debug!("indicator: {line} aborted");
        }
    });

    state.release_line(driver, line);
    state.finished.store(true, Ordering::Release);
    state.done.signal(());
}

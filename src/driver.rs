//! Shared access to the output driver.
//!
//! The coordinator and the indicator worker thread both write to the board.
//! Every access runs inside a critical section, so a single driver call is
//! never interleaved with another one.

use std::sync::Arc;

use core::cell::RefCell;

use critical_section::Mutex;

use crate::OutputDriver;
use crate::line::{DutyCycle, Level, Line};

/// Cloneable, thread-safe handle to an [`OutputDriver`].
pub struct SharedDriver<D> {
    inner: Arc<Mutex<RefCell<D>>>,
}

impl<D> Clone for SharedDriver<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: OutputDriver> SharedDriver<D> {
    pub fn new(driver: D) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RefCell::new(driver))),
        }
    }

    /// Run `f` with exclusive access to the driver.
    pub fn with<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        critical_section::with(|cs| {
            let mut driver = self.inner.borrow(cs).borrow_mut();
            f(&mut driver)
        })
    }

    pub fn write_all(&self, lines: &[Line], level: Level) {
        self.with(|driver| {
            for &line in lines {
                driver.write(line, level);
            }
        });
    }

    pub fn start_pwm_all(&self, lines: &[Line], frequency_hz: u32) {
        self.with(|driver| {
            for &line in lines {
                driver.start_pwm(line, frequency_hz, DutyCycle::OFF);
            }
        });
    }

    pub fn set_duty_all(&self, lines: &[Line], duty: DutyCycle) {
        self.with(|driver| {
            for &line in lines {
                driver.set_duty(line, duty);
            }
        });
    }

    pub fn stop_pwm_all(&self, lines: &[Line]) {
        self.with(|driver| {
            for &line in lines {
                driver.stop_pwm(line);
            }
        });
    }
}

//! Effect coordinator
//!
//! Owns the output lines for the whole process lifetime. Every effect runs
//! under the effect mutex, so at most one of flash, breath, numeric display
//! and cleanup touches the lines at a time. The only exception is the
//! numeric display indicator, which keeps breathing on its own worker until
//! the next effect reconciles it.

use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

use crate::OutputDriver;
use crate::config::EffectConfig;
use crate::display;
use crate::driver::SharedDriver;
use crate::effect::{FlashTarget, Repeat, breath, flash};
use crate::error::{EffectError, Result};
use crate::line::Level;
use crate::mutex::{EffectMutex, EffectPermit, StopRequest};
use crate::oscillator::BreathTask;

pub struct Coordinator<D: OutputDriver> {
    driver: SharedDriver<D>,
    config: EffectConfig,
    mutex: EffectMutex,
    /// Lines may hold a displayed number or a running indicator.
    cleanup_required: AtomicBool,
    closed: AtomicBool,
}

impl<D: OutputDriver + 'static> Coordinator<D> {
    /// Validate `config` and configure every line as an output.
    pub fn new(mut driver: D, config: EffectConfig) -> Result<Self> {
        config.validate()?;
        driver.configure_output(&config.lines);
        info!("coordinator: configured {} output lines", config.lines.len());

        Ok(Self {
            driver: SharedDriver::new(driver),
            config,
            mutex: EffectMutex::new(),
            cleanup_required: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    /// Returns true while an effect holds the lines.
    pub fn is_active(&self) -> bool {
        self.mutex.is_active()
    }

    pub fn is_cleanup_required(&self) -> bool {
        self.cleanup_required.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Ask the running effect to finish at its next checkpoint.
    ///
    /// Does nothing and returns [`StopRequest::Idle`] when no effect runs.
    pub fn request_stop(&self) -> StopRequest {
        let request = self.mutex.request_stop();
        if request == StopRequest::Signalled {
            debug!("coordinator: stop requested");
        }
        request
    }

    /// Pulse the `target` lines `times` times.
    pub async fn flash(&self, times: u32, target: &FlashTarget) -> Result<()> {
        Repeat::Times(times).validate()?;
        let lines = target.resolve(&self.config.lines)?;

        let mut permit = self.acquire().await?;
        self.cleanup_if_required(&mut permit).await;

        debug!("flash: {times} pulses on {} lines", lines.len());
        flash::run(&self.driver, &lines, times, &self.config.flash, &permit).await;
        Ok(())
    }

    /// Breathe the lines at 1-based `positions`, or every line when `None`.
    pub async fn breath(&self, repeat: Repeat, positions: Option<&[usize]>) -> Result<()> {
        let repeat = repeat.validate()?;
        let lines = breath::select_lines(&self.config.lines, positions)?;

        let mut permit = self.acquire().await?;
        self.cleanup_if_required(&mut permit).await;

        debug!("breath: {repeat:?} on {} lines", lines.len());
        breath::run(
            &self.driver,
            &lines,
            repeat,
            self.config.pwm_frequency_hz,
            &self.config.breath,
            &permit,
        )
        .await;
        Ok(())
    }

    /// Show `value` on the display lines until the next cleanup.
    ///
    /// With `indicator` set, the first line breathes in the background.
    pub async fn show_number(&self, value: i64, indicator: bool) -> Result<()> {
        let levels = display::encode(value)?;

        let mut permit = self.acquire().await?;
        self.cleanup_if_required(&mut permit).await;

        if indicator {
            let task = BreathTask::start(
                self.driver.clone(),
                self.config.indicator_line(),
                self.config.pwm_frequency_hz,
                self.config.indicator,
            )?;
            permit.indicator = Some(task);
        }
        self.cleanup_required.store(true, Ordering::Release);
        display::write(&self.driver, self.config.display_lines(), &levels);
        debug!("display: showing {value}");
        Ok(())
    }

    /// Stop the indicator and drive every line low.
    pub async fn cleanup(&self) -> Result<()> {
        let mut permit = self.acquire().await?;
        self.clean_locked(&mut permit).await;
        Ok(())
    }

    /// Clean up and release the lines.
    ///
    /// Refused with [`EffectError::Busy`] while an effect runs. Closing twice
    /// is a no-op.
    pub async fn close(&self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        if self.is_active() {
            return Err(EffectError::Busy);
        }

        let mut permit = self.mutex.acquire().await;
        if self.is_closed() {
            return Ok(());
        }
        self.cleanup_if_required(&mut permit).await;
        self.driver.with(|driver| driver.release());
        self.closed.store(true, Ordering::Release);
        info!("coordinator: closed, lines released");
        Ok(())
    }

    async fn acquire(&self) -> Result<EffectPermit<'_>> {
        if self.is_closed() {
            return Err(EffectError::Closed);
        }
        let permit = self.mutex.acquire().await;
        // Closed while waiting for the lock
        if self.is_closed() {
            return Err(EffectError::Closed);
        }
        Ok(permit)
    }

    async fn cleanup_if_required(&self, permit: &mut EffectPermit<'_>) {
        if self.is_cleanup_required() {
            self.clean_locked(permit).await;
        }
    }

    async fn clean_locked(&self, permit: &mut EffectPermit<'_>) {
        if let Some(indicator) = permit.indicator.take() {
            let outcome = indicator
                .reconcile(&self.driver, self.config.reconcile_timeout)
                .await;
            debug!("cleanup: indicator {outcome:?}");
        }
        self.driver.write_all(&self.config.lines, Level::Low);
        self.cleanup_required.store(false, Ordering::Release);
    }
}

//! Effect mutex
//!
//! A single async lock serializes every effect. Two flags live next to it:
//! `active` tells whether an effect currently holds the lock, and
//! `stop_requested` asks the holder to finish at its next checkpoint. Both
//! are readable without taking the lock.

use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};

use crate::effect::StopFlag;
use crate::oscillator::BreathTask;

/// Outcome of [`Coordinator::request_stop`](crate::Coordinator::request_stop).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRequest {
    /// A running effect was asked to stop.
    Signalled,
    /// Nothing was running.
    Idle,
}

/// State guarded by the effect lock.
#[derive(Debug, Default)]
pub(crate) struct EffectSlot {
    /// Indicator launched by the last numeric display, if any.
    pub(crate) indicator: Option<BreathTask>,
}

#[derive(Debug, Default)]
struct EffectSignals {
    active: AtomicBool,
    stop_requested: AtomicBool,
}

pub(crate) struct EffectMutex {
    lock: Mutex<CriticalSectionRawMutex, EffectSlot>,
    signals: EffectSignals,
}

impl EffectMutex {
    pub(crate) fn new() -> Self {
        Self {
            lock: Mutex::new(EffectSlot::default()),
            signals: EffectSignals::default(),
        }
    }

    /// Wait for the lock, then mark an effect as active with a clean stop flag.
    pub(crate) async fn acquire(&self) -> EffectPermit<'_> {
        let slot = self.lock.lock().await;
        self.signals.active.store(true, Ordering::Release);
        self.signals.stop_requested.store(false, Ordering::Release);
        EffectPermit {
            slot,
            signals: &self.signals,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.signals.active.load(Ordering::Acquire)
    }

    pub(crate) fn request_stop(&self) -> StopRequest {
        if self.is_active() {
            self.signals.stop_requested.store(true, Ordering::Release);
            StopRequest::Signalled
        } else {
            StopRequest::Idle
        }
    }
}

/// Exclusive right to drive the lines. Releases the mutex on drop.
pub(crate) struct EffectPermit<'a> {
    slot: MutexGuard<'a, CriticalSectionRawMutex, EffectSlot>,
    signals: &'a EffectSignals,
}

impl StopFlag for EffectPermit<'_> {
    fn is_stop_requested(&self) -> bool {
        self.signals.stop_requested.load(Ordering::Acquire)
    }
}

impl Deref for EffectPermit<'_> {
    type Target = EffectSlot;

    fn deref(&self) -> &EffectSlot {
        &self.slot
    }
}

impl DerefMut for EffectPermit<'_> {
    fn deref_mut(&mut self) -> &mut EffectSlot {
        &mut self.slot
    }
}

impl Drop for EffectPermit<'_> {
    fn drop(&mut self) {
        // The guard field is dropped after this, so `active` goes down first.
        self.signals.active.store(false, Ordering::Release);
    }
}

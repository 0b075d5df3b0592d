//! Shared test helpers: an in-memory board and fast timings.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use embassy_time::{Duration, Instant, Timer};
use myrtio_pin_effects::{
    DutyCycle, EffectConfig, FlashTimings, Level, Line, OutputDriver, RampTimings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    Low,
    High,
    Pwm(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Configure(Vec<Line>),
    Write(Line, Level),
    StartPwm(Line, u8),
    SetDuty(Line, u8),
    StopPwm(Line),
    Release,
}

impl Event {
    pub fn line(&self) -> Option<Line> {
        match self {
            Self::Write(line, _)
            | Self::StartPwm(line, _)
            | Self::SetDuty(line, _)
            | Self::StopPwm(line) => Some(*line),
            Self::Configure(_) | Self::Release => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct BoardState {
    pub lines: BTreeMap<Line, LineState>,
    pub events: Vec<Event>,
    pub released: bool,
}

/// Recording board. Clones share the same state.
#[derive(Clone, Default)]
pub struct MockBoard {
    state: Arc<Mutex<BoardState>>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn driver(&self) -> MockDriver {
        MockDriver {
            state: Arc::clone(&self.state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap()
    }

    pub fn line(&self, line: Line) -> Option<LineState> {
        self.lock().lines.get(&line).copied()
    }

    pub fn snapshot(&self) -> BTreeMap<Line, LineState> {
        self.lock().lines.clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    pub fn event_count(&self) -> usize {
        self.lock().events.len()
    }

    pub fn events_for(&self, line: Line) -> Vec<Event> {
        self.lock()
            .events
            .iter()
            .filter(|event| event.line() == Some(line))
            .cloned()
            .collect()
    }

    pub fn duties(&self, line: Line) -> Vec<u8> {
        self.events_for(line)
            .into_iter()
            .filter_map(|event| match event {
                Event::SetDuty(_, duty) => Some(duty),
                _ => None,
            })
            .collect()
    }

    pub fn is_released(&self) -> bool {
        self.lock().released
    }

    pub fn all_low(&self, lines: &[Line]) -> bool {
        lines
            .iter()
            .all(|line| self.line(*line) == Some(LineState::Low))
    }
}

pub struct MockDriver {
    state: Arc<Mutex<BoardState>>,
}

impl MockDriver {
    fn record(&mut self, event: Event, update: Option<(Line, LineState)>) {
        let mut state = self.state.lock().unwrap();
        if let Some((line, line_state)) = update {
            state.lines.insert(line, line_state);
        }
        state.events.push(event);
    }
}

impl OutputDriver for MockDriver {
    fn configure_output(&mut self, lines: &[Line]) {
        let mut state = self.state.lock().unwrap();
        for &line in lines {
            state.lines.insert(line, LineState::Low);
        }
        state.events.push(Event::Configure(lines.to_vec()));
    }

    fn write(&mut self, line: Line, level: Level) {
        let line_state = if level.is_high() {
            LineState::High
        } else {
            LineState::Low
        };
        self.record(Event::Write(line, level), Some((line, line_state)));
    }

    fn start_pwm(&mut self, line: Line, _frequency_hz: u32, duty: DutyCycle) {
        self.record(
            Event::StartPwm(line, duty.percent()),
            Some((line, LineState::Pwm(duty.percent()))),
        );
    }

    fn set_duty(&mut self, line: Line, duty: DutyCycle) {
        self.record(
            Event::SetDuty(line, duty.percent()),
            Some((line, LineState::Pwm(duty.percent()))),
        );
    }

    fn stop_pwm(&mut self, line: Line) {
        self.record(Event::StopPwm(line), Some((line, LineState::Low)));
    }

    fn release(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.released = true;
        state.events.push(Event::Release);
    }
}

/// Default pin map with millisecond timings.
pub fn fast_config() -> EffectConfig {
    EffectConfig {
        flash: FlashTimings {
            on: Duration::from_millis(5),
            off: Duration::from_millis(5),
        },
        breath: RampTimings {
            step: Duration::from_millis(1),
            pause: Duration::from_millis(1),
        },
        indicator: RampTimings {
            step: Duration::from_millis(2),
            pause: Duration::from_millis(5),
        },
        reconcile_timeout: Duration::from_millis(500),
        ..EffectConfig::default()
    }
}

/// Poll `condition` every millisecond until it holds or `timeout` passes.
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        Timer::after(Duration::from_millis(1)).await;
    }
    condition()
}

use std::time::Duration;

use crate::error::SessionError;

const SECOND: Duration = Duration::from_secs(1);

/// Notification produced by a running timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Whole seconds remaining (countdown) or elapsed (stopwatch)
    Tick(u32),
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TimerKind {
    Countdown { remaining: u32 },
    Stopwatch { elapsed: u32, limit: u32 },
}

#[derive(Debug, Clone, Copy)]
struct ActiveTimer {
    kind: TimerKind,
    // Time accumulated towards the next whole second
    carry: Duration,
}

/// One-second cadence timer driven by frame time.
///
/// The service never reads a clock: callers feed it elapsed time through
/// [`TimerService::advance`] and receive the ticks crossed during that slice.
/// At most one timer runs at a time; starting another replaces it.
#[derive(Debug, Default)]
pub struct TimerService {
    active: Option<ActiveTimer>,
    // Frame time left over after the last completion
    overflow: Duration,
}

impl TimerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts counting down from `from_secs`. Returns the tick for the initial
    /// value; later ticks count down to 1 and the count reaching zero yields
    /// `Complete` instead of a zero tick.
    pub fn start_countdown(&mut self, from_secs: u32) -> Result<TimerEvent, SessionError> {
        if from_secs == 0 {
            return Err(SessionError::InvalidDuration(0.0));
        }
        self.replace(TimerKind::Countdown {
            remaining: from_secs,
        });
        Ok(TimerEvent::Tick(from_secs))
    }

    /// Starts counting up once per second. A fractional limit completes on the
    /// first whole second at or past it.
    pub fn start_stopwatch(&mut self, limit_secs: f64) -> Result<(), SessionError> {
        if !limit_secs.is_finite() || limit_secs <= 0.0 {
            return Err(SessionError::InvalidDuration(limit_secs));
        }
        self.replace(TimerKind::Stopwatch {
            elapsed: 0,
            limit: limit_secs.ceil() as u32,
        });
        Ok(())
    }

    /// Stops the running timer; nothing further is reported for it.
    pub fn cancel(&mut self) {
        self.overflow = Duration::ZERO;
        if self.active.take().is_some() {
            log::debug!("timer cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Time that went unused because the timer completed part-way through the
    /// last [`TimerService::advance`]. Reading it resets it to zero.
    pub fn take_overflow(&mut self) -> Duration {
        std::mem::take(&mut self.overflow)
    }

    /// Feeds `frame_time` and returns every event crossed, in order.
    pub fn advance(&mut self, frame_time: Duration) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        let Some(timer) = self.active.as_mut() else {
            return events;
        };

        let mut finished = false;
        timer.carry += frame_time;
        while timer.carry >= SECOND {
            timer.carry -= SECOND;
            match &mut timer.kind {
                TimerKind::Countdown { remaining } => {
                    *remaining -= 1;
                    if *remaining == 0 {
                        events.push(TimerEvent::Complete);
                        finished = true;
                        break;
                    }
                    events.push(TimerEvent::Tick(*remaining));
                }
                TimerKind::Stopwatch { elapsed, limit } => {
                    *elapsed += 1;
                    events.push(TimerEvent::Tick(*elapsed));
                    if *elapsed >= *limit {
                        events.push(TimerEvent::Complete);
                        finished = true;
                        break;
                    }
                }
            }
        }

        if finished {
            self.overflow = timer.carry;
            self.active = None;
        }
        events
    }

    fn replace(&mut self, kind: TimerKind) {
        if self.active.is_some() {
            log::debug!("starting {kind:?} replaces a running timer");
        }
        self.overflow = Duration::ZERO;
        self.active = Some(ActiveTimer {
            kind,
            carry: Duration::ZERO,
        });
    }
}

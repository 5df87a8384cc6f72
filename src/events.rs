use crate::mode::Mode;
use crate::target::TargetId;

/// Requests fed into the controller by the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    RequestStart(Mode),
    TargetStruck(TargetId),
    RequestAbort,
}

/// Notifications raised by the controller, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    CountdownTick(u32),
    StopwatchTick(u32),
    TargetArmed(TargetId),
    TargetDisarmed(TargetId),
    ScoreChanged(u32),
    SessionEnded {
        final_score: u32,
        is_new_record: bool,
        mode: Mode,
    },
    SessionAborted,
}

/// Observer for session output. Every hook defaults to doing nothing.
///
/// Starting a session resets the score to zero without a score-changed
/// notification, so the first countdown tick of a session also means the
/// score display should show 0.
pub trait SessionListener {
    fn on_countdown_tick(&mut self, _remaining: u32) {}
    fn on_stopwatch_tick(&mut self, _elapsed: u32) {}
    fn on_target_armed(&mut self, _target: TargetId) {}
    fn on_target_disarmed(&mut self, _target: TargetId) {}
    fn on_score_changed(&mut self, _score: u32) {}
    fn on_session_ended(&mut self, _final_score: u32, _is_new_record: bool, _mode: Mode) {}
    fn on_session_aborted(&mut self) {}
}

impl SessionEvent {
    pub fn deliver(&self, listener: &mut dyn SessionListener) {
        match *self {
            SessionEvent::CountdownTick(remaining) => listener.on_countdown_tick(remaining),
            SessionEvent::StopwatchTick(elapsed) => listener.on_stopwatch_tick(elapsed),
            SessionEvent::TargetArmed(target) => listener.on_target_armed(target),
            SessionEvent::TargetDisarmed(target) => listener.on_target_disarmed(target),
            SessionEvent::ScoreChanged(score) => listener.on_score_changed(score),
            SessionEvent::SessionEnded {
                final_score,
                is_new_record,
                mode,
            } => listener.on_session_ended(final_score, is_new_record, mode),
            SessionEvent::SessionAborted => listener.on_session_aborted(),
        }
    }
}

/// Delivers a batch of events to `listener` in order
pub fn deliver_all(events: &[SessionEvent], listener: &mut dyn SessionListener) {
    for event in events {
        event.deliver(listener);
    }
}

use rand::rngs::StdRng;
use rand::Rng;
use std::time::Duration;

use crate::error::{SessionError, StoreError};
use crate::events::{InputEvent, SessionEvent};
use crate::high_score::HighScoreStore;
use crate::mode::Mode;
use crate::score::ScoreTracker;
use crate::session::{Session, SessionConfig, SessionState};
use crate::target::{TargetId, TargetSelector};
use crate::timer::{TimerEvent, TimerService};

/// Drives one reaction session at a time: countdown, active play, end of
/// session and record keeping.
///
/// All input is processed synchronously. Each operation returns the events it
/// raised so the front-end can render, play sounds and so on. Requests that
/// make no sense in the current state are ignored and produce no events.
#[derive(Debug)]
pub struct SessionController<S: HighScoreStore, R: Rng = StdRng> {
    config: SessionConfig,
    session: Session,
    score: ScoreTracker,
    timer: TimerService,
    selector: TargetSelector<R>,
    store: S,
}

impl<S: HighScoreStore> SessionController<S, StdRng> {
    pub fn new(config: SessionConfig, store: S) -> Result<Self, SessionError> {
        Self::with_selector(config, store, TargetSelector::from_entropy())
    }
}

impl<S: HighScoreStore, R: Rng> SessionController<S, R> {
    pub fn with_selector(
        config: SessionConfig,
        store: S,
        selector: TargetSelector<R>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let mode = Mode::default();
        Ok(Self {
            session: Session::new(mode, config.duration_secs(mode)),
            config,
            score: ScoreTracker::new(),
            timer: TimerService::new(),
            selector,
            store,
        })
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn score(&self) -> u32 {
        self.score.current()
    }

    pub fn score_tracker(&self) -> &ScoreTracker {
        &self.score
    }

    pub fn armed_target(&self) -> Option<TargetId> {
        self.session.armed_target
    }

    pub fn target_count(&self) -> usize {
        self.config.target_count
    }

    /// Stored best for `mode`; unreadable storage reports 0.
    pub fn best(&self, mode: Mode) -> u32 {
        self.store.get(mode).unwrap_or_else(|e| {
            log::warn!("could not read {mode} record: {e}");
            0
        })
    }

    pub fn clear_best(&mut self, mode: Mode) -> Result<(), StoreError> {
        log::info!("clearing {mode} record");
        self.store.clear(mode)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Routes a single inbound request.
    pub fn dispatch(&mut self, input: InputEvent) -> Vec<SessionEvent> {
        match input {
            InputEvent::RequestStart(mode) => self.request_start(mode),
            InputEvent::TargetStruck(target) => self.on_target_struck(target),
            InputEvent::RequestAbort => self.request_abort(),
        }
    }

    /// Processes one frame: every input in arrival order, then the timer.
    ///
    /// Inputs go first so a strike landing in the same frame as the final
    /// stopwatch second still scores.
    pub fn step<I>(&mut self, frame_time: Duration, inputs: I) -> Vec<SessionEvent>
    where
        I: IntoIterator<Item = InputEvent>,
    {
        let mut events = Vec::new();
        for input in inputs {
            events.extend(self.dispatch(input));
        }
        events.extend(self.advance(frame_time));
        events
    }

    pub fn request_start(&mut self, mode: Mode) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.session.is_running() {
            log::debug!(
                "start ignored, session already in {}",
                self.session.state
            );
            return events;
        }

        let first_tick = match self.timer.start_countdown(self.config.countdown_secs) {
            Ok(event) => event,
            Err(e) => {
                log::error!("could not start countdown: {e}");
                return events;
            }
        };

        self.session = Session::new(mode, self.config.duration_secs(mode));
        self.session.state = SessionState::Countdown;
        self.score.reset();
        log::info!("starting {mode} session");

        self.on_timer_event(first_tick, &mut events);
        events
    }

    /// Handles a hit reported by the front-end. Only the armed target counts.
    pub fn on_target_struck(&mut self, target: TargetId) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.session.state != SessionState::Active {
            log::debug!("strike on {target} ignored in {}", self.session.state);
            return events;
        }
        if self.session.armed_target != Some(target) {
            log::debug!("strike on unarmed target {target} ignored");
            return events;
        }

        events.push(SessionEvent::TargetDisarmed(target));
        let score = self.score.increment();
        events.push(SessionEvent::ScoreChanged(score));

        self.session.previous_armed_target = Some(target);
        self.arm_next(&mut events);
        events
    }

    /// Cancels a countdown or active session and returns to Idle.
    pub fn request_abort(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if !self.session.is_running() {
            log::debug!("abort ignored in {}", self.session.state);
            return events;
        }

        self.timer.cancel();
        if let Some(target) = self.session.armed_target.take() {
            events.push(SessionEvent::TargetDisarmed(target));
        }
        self.session.state = SessionState::Idle;
        self.session.countdown_remaining = None;
        log::info!("{} session aborted", self.session.mode);

        events.push(SessionEvent::SessionAborted);
        events
    }

    /// Feeds frame time to the running timer and reacts to what it reports.
    pub fn advance(&mut self, frame_time: Duration) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let mut pending = frame_time;

        loop {
            let timer_events = self.timer.advance(pending);
            pending = self.timer.take_overflow();
            for event in timer_events {
                self.on_timer_event(event, &mut events);
            }
            // leftover countdown time carries into the stopwatch
            if pending.is_zero() || !self.timer.is_running() {
                break;
            }
        }

        events
    }

    fn on_timer_event(&mut self, event: TimerEvent, events: &mut Vec<SessionEvent>) {
        match (self.session.state, event) {
            (SessionState::Countdown, TimerEvent::Tick(remaining)) => {
                self.session.countdown_remaining = Some(remaining);
                events.push(SessionEvent::CountdownTick(remaining));
            }
            (SessionState::Countdown, TimerEvent::Complete) => self.begin_active(events),
            (SessionState::Active, TimerEvent::Tick(elapsed)) => {
                self.session.elapsed_secs = elapsed;
                events.push(SessionEvent::StopwatchTick(elapsed));
            }
            (SessionState::Active, TimerEvent::Complete) => self.end_session(events),
            (state, event) => log::debug!("timer {event:?} ignored in {state}"),
        }
    }

    fn begin_active(&mut self, events: &mut Vec<SessionEvent>) {
        self.session.countdown_remaining = None;
        if let Err(e) = self.timer.start_stopwatch(self.session.duration_secs) {
            log::error!("could not start stopwatch: {e}");
            self.session.state = SessionState::Idle;
            return;
        }

        self.session.state = SessionState::Active;
        self.session.elapsed_secs = 0;
        self.arm_next(events);
    }

    fn arm_next(&mut self, events: &mut Vec<SessionEvent>) {
        let next = self
            .selector
            .pick(self.session.previous_armed_target, self.config.target_count);
        self.session.armed_target = Some(next);
        events.push(SessionEvent::TargetArmed(next));
    }

    fn end_session(&mut self, events: &mut Vec<SessionEvent>) {
        self.session.state = SessionState::Ended;
        if let Some(target) = self.session.armed_target.take() {
            events.push(SessionEvent::TargetDisarmed(target));
        }

        let mode = self.session.mode;
        let final_score = self.score.current();
        let is_new_record = match self.store.set_if_greater(mode, final_score) {
            Ok(is_new) => is_new,
            Err(e) => {
                log::warn!("failed to persist {mode} score {final_score}: {e}");
                false
            }
        };
        log::info!("{mode} session ended with {final_score} (new record: {is_new_record})");

        events.push(SessionEvent::SessionEnded {
            final_score,
            is_new_record,
            mode,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::high_score::MemoryHighScoreStore;
    use assert_matches::assert_matches;

    const SECOND: Duration = Duration::from_secs(1);

    type TestController = SessionController<MemoryHighScoreStore, StdRng>;

    fn controller() -> TestController {
        SessionController::with_selector(
            SessionConfig::default(),
            MemoryHighScoreStore::new(),
            TargetSelector::seeded(11),
        )
        .unwrap()
    }

    fn active_controller() -> TestController {
        let mut c = controller();
        c.request_start(Mode::ThirtySecond);
        c.advance(SECOND * 3);
        assert_eq!(c.state(), SessionState::Active);
        c
    }

    fn strike_armed(c: &mut TestController) -> Vec<SessionEvent> {
        let target = c.armed_target().unwrap();
        c.on_target_struck(target)
    }

    struct FailingStore;

    impl HighScoreStore for FailingStore {
        fn get(&self, _mode: Mode) -> Result<u32, StoreError> {
            Err(StoreError::Unavailable)
        }

        fn set_if_greater(&mut self, _mode: Mode, _candidate: u32) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable)
        }

        fn clear(&mut self, _mode: Mode) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = SessionConfig {
            target_count: 1,
            ..Default::default()
        };
        let result = SessionController::new(config, MemoryHighScoreStore::new());
        assert_matches!(result, Err(SessionError::InvalidTargetCount { count: 1, .. }));
    }

    #[test]
    fn start_enters_countdown_with_initial_tick() {
        let mut c = controller();
        let events = c.request_start(Mode::SixtySecond);

        assert_eq!(events, vec![SessionEvent::CountdownTick(3)]);
        assert_eq!(c.state(), SessionState::Countdown);
        assert_eq!(c.session().mode, Mode::SixtySecond);
        assert_eq!(c.session().duration_secs, 60.0);
        assert!(c.armed_target().is_none());
    }

    #[test]
    fn score_is_zero_when_countdown_starts() {
        let mut c = active_controller();
        strike_armed(&mut c);
        strike_armed(&mut c);
        c.advance(SECOND * 30);
        assert_eq!(c.score(), 2);

        let events = c.request_start(Mode::ThirtySecond);
        assert_eq!(events.first(), Some(&SessionEvent::CountdownTick(3)));
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::ScoreChanged(_))));
        assert_eq!(c.score(), 0);
        assert_eq!(c.score_tracker().to_string(), "0");
    }

    #[test]
    fn countdown_completion_arms_first_target() {
        let mut c = controller();
        c.request_start(Mode::ThirtySecond);

        assert_eq!(c.advance(SECOND), vec![SessionEvent::CountdownTick(2)]);
        assert_eq!(c.advance(SECOND), vec![SessionEvent::CountdownTick(1)]);

        let events = c.advance(SECOND);
        assert_eq!(c.state(), SessionState::Active);
        let armed = c.armed_target().unwrap();
        assert_eq!(events, vec![SessionEvent::TargetArmed(armed)]);
        assert!(armed < 12);
    }

    #[test]
    fn countdown_overflow_carries_into_stopwatch() {
        let mut c = controller();
        c.request_start(Mode::ThirtySecond);

        let events = c.advance(Duration::from_millis(4_500));
        assert_matches!(
            events.as_slice(),
            [
                SessionEvent::CountdownTick(2),
                SessionEvent::CountdownTick(1),
                SessionEvent::TargetArmed(_),
                SessionEvent::StopwatchTick(1)
            ]
        );
        assert_eq!(c.session().elapsed_secs, 1);
    }

    #[test]
    fn strike_on_armed_target_scores_and_rearms() {
        let mut c = active_controller();
        let first = c.armed_target().unwrap();

        let events = strike_armed(&mut c);
        let second = c.armed_target().unwrap();

        assert_ne!(first, second);
        assert_eq!(
            events,
            vec![
                SessionEvent::TargetDisarmed(first),
                SessionEvent::ScoreChanged(1),
                SessionEvent::TargetArmed(second),
            ]
        );
        assert_eq!(c.session().previous_armed_target, Some(first));
        assert_eq!(c.score(), 1);
    }

    #[test]
    fn strike_on_wrong_target_is_ignored() {
        let mut c = active_controller();
        let armed = c.armed_target().unwrap();
        let wrong = (armed + 1) % c.target_count();

        assert!(c.on_target_struck(wrong).is_empty());
        assert_eq!(c.armed_target(), Some(armed));
        assert_eq!(c.score(), 0);
    }

    #[test]
    fn strikes_outside_active_are_ignored() {
        let mut c = controller();
        assert!(c.on_target_struck(0).is_empty());

        c.request_start(Mode::ThirtySecond);
        for target in 0..12 {
            assert!(c.on_target_struck(target).is_empty());
        }
        assert_eq!(c.score(), 0);
    }

    #[test]
    fn start_while_running_changes_nothing() {
        let mut c = active_controller();
        strike_armed(&mut c);
        let before = c.session().clone();

        assert!(c.request_start(Mode::SixtySecond).is_empty());
        assert_eq!(c.session(), &before);
        assert_eq!(c.score(), 1);

        let mut c = controller();
        c.request_start(Mode::ThirtySecond);
        c.advance(SECOND);
        assert!(c.request_start(Mode::ThirtySecond).is_empty());
        assert_eq!(c.session().countdown_remaining, Some(2));
    }

    #[test]
    fn session_end_disarms_and_reports_record() {
        let mut c = active_controller();
        strike_armed(&mut c);
        strike_armed(&mut c);
        let armed = c.armed_target().unwrap();

        let events = c.advance(SECOND * 30);
        assert_eq!(events.len(), 32);
        assert_eq!(events[29], SessionEvent::StopwatchTick(30));
        assert_eq!(events[30], SessionEvent::TargetDisarmed(armed));
        assert_eq!(
            events[31],
            SessionEvent::SessionEnded {
                final_score: 2,
                is_new_record: true,
                mode: Mode::ThirtySecond,
            }
        );
        assert_eq!(c.state(), SessionState::Ended);
        assert!(c.armed_target().is_none());
        assert_eq!(c.best(Mode::ThirtySecond), 2);
    }

    #[test]
    fn strike_in_final_frame_counts_before_timeout() {
        let mut c = active_controller();
        c.advance(SECOND * 29 + Duration::from_millis(990));
        let armed = c.armed_target().unwrap();

        let events = c.step(
            Duration::from_millis(10),
            [InputEvent::TargetStruck(armed)],
        );

        assert!(events.contains(&SessionEvent::ScoreChanged(1)));
        assert_matches!(
            events.last(),
            Some(SessionEvent::SessionEnded { final_score: 1, .. })
        );
    }

    #[test]
    fn abort_cancels_timers_and_returns_to_idle() {
        let mut c = active_controller();
        let armed = c.armed_target().unwrap();

        let events = c.dispatch(InputEvent::RequestAbort);
        assert_eq!(
            events,
            vec![
                SessionEvent::TargetDisarmed(armed),
                SessionEvent::SessionAborted
            ]
        );
        assert_eq!(c.state(), SessionState::Idle);
        assert!(c.advance(SECOND * 120).is_empty());
        assert_eq!(c.best(Mode::ThirtySecond), 0);
    }

    #[test]
    fn abort_during_countdown_silences_it() {
        let mut c = controller();
        c.request_start(Mode::ThirtySecond);
        c.request_abort();

        assert!(c.advance(SECOND * 5).is_empty());
        assert_eq!(c.state(), SessionState::Idle);
    }

    #[test]
    fn abort_when_idle_is_ignored() {
        let mut c = controller();
        assert!(c.request_abort().is_empty());
    }

    #[test]
    fn ended_session_can_restart() {
        let mut c = active_controller();
        strike_armed(&mut c);
        c.advance(SECOND * 30);
        assert_eq!(c.state(), SessionState::Ended);

        let events = c.request_start(Mode::ThirtySecond);
        assert_eq!(events, vec![SessionEvent::CountdownTick(3)]);
        assert_eq!(c.score(), 0);
        assert_eq!(c.session().previous_armed_target, None);
    }

    #[test]
    fn persistence_failure_still_reports_end_without_record() {
        let mut c = SessionController::with_selector(
            SessionConfig::default(),
            FailingStore,
            TargetSelector::seeded(5),
        )
        .unwrap();
        c.request_start(Mode::SixtySecond);
        c.advance(SECOND * 3);
        let armed = c.armed_target().unwrap();
        c.on_target_struck(armed);

        let events = c.advance(SECOND * 60);
        assert_eq!(
            events.last(),
            Some(&SessionEvent::SessionEnded {
                final_score: 1,
                is_new_record: false,
                mode: Mode::SixtySecond,
            })
        );
        assert_eq!(c.best(Mode::SixtySecond), 0);
    }

    #[test]
    fn duration_override_shortens_session_but_keeps_bucket() {
        let config = SessionConfig {
            duration_override_secs: Some(2.0),
            ..Default::default()
        };
        let mut c = SessionController::with_selector(
            config,
            MemoryHighScoreStore::new(),
            TargetSelector::seeded(2),
        )
        .unwrap();
        c.request_start(Mode::SixtySecond);
        c.advance(SECOND * 3);
        strike_armed(&mut c);

        let events = c.advance(SECOND * 2);
        assert_matches!(
            events.last(),
            Some(SessionEvent::SessionEnded {
                final_score: 1,
                is_new_record: true,
                mode: Mode::SixtySecond
            })
        );
        assert_eq!(c.best(Mode::SixtySecond), 1);
        assert_eq!(c.best(Mode::ThirtySecond), 0);
    }
}

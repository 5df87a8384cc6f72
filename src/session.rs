use crate::error::SessionError;
use crate::mode::Mode;
use crate::target::TargetId;

pub const DEFAULT_TARGET_COUNT: usize = 12;
pub const DEFAULT_COUNTDOWN_SECS: u32 = 3;
pub const MIN_TARGET_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum SessionState {
    #[default]
    Idle,
    Countdown,
    Active,
    Ended,
}

/// Fixed parameters of the controller, validated once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub target_count: usize,
    pub countdown_secs: u32,
    /// Overrides the mode's own duration when set; the record bucket still
    /// follows the mode.
    pub duration_override_secs: Option<f64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            duration_override_secs: None,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.target_count < MIN_TARGET_COUNT {
            return Err(SessionError::InvalidTargetCount {
                count: self.target_count,
                min: MIN_TARGET_COUNT,
            });
        }
        if self.countdown_secs == 0 {
            return Err(SessionError::InvalidDuration(0.0));
        }
        if let Some(secs) = self.duration_override_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(SessionError::InvalidDuration(secs));
            }
        }
        Ok(())
    }

    pub fn duration_secs(&self, mode: Mode) -> f64 {
        self.duration_override_secs
            .unwrap_or_else(|| mode.duration_secs() as f64)
    }
}

/// One play-through, owned by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub state: SessionState,
    pub mode: Mode,
    pub duration_secs: f64,
    pub armed_target: Option<TargetId>,
    pub previous_armed_target: Option<TargetId>,
    /// Whole seconds since Active began
    pub elapsed_secs: u32,
    /// Seconds left on the pre-game countdown, while in Countdown
    pub countdown_remaining: Option<u32>,
}

impl Session {
    pub fn new(mode: Mode, duration_secs: f64) -> Self {
        Self {
            state: SessionState::Idle,
            mode,
            duration_secs,
            armed_target: None,
            previous_armed_target: None,
            elapsed_secs: 0,
            countdown_remaining: None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Countdown | SessionState::Active)
    }

    pub fn seconds_remaining(&self) -> f64 {
        (self.duration_secs - self.elapsed_secs as f64).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_config_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_rings_smaller_than_two() {
        for count in [0, 1] {
            let config = SessionConfig {
                target_count: count,
                ..Default::default()
            };
            assert_matches!(
                config.validate(),
                Err(SessionError::InvalidTargetCount { min: 2, .. })
            );
        }
    }

    #[test]
    fn rejects_non_positive_durations() {
        let config = SessionConfig {
            countdown_secs: 0,
            ..Default::default()
        };
        assert_matches!(config.validate(), Err(SessionError::InvalidDuration(_)));

        let config = SessionConfig {
            duration_override_secs: Some(-5.0),
            ..Default::default()
        };
        assert_matches!(config.validate(), Err(SessionError::InvalidDuration(_)));
    }

    #[test]
    fn duration_follows_mode_unless_overridden() {
        let config = SessionConfig::default();
        assert_eq!(config.duration_secs(Mode::SixtySecond), 60.0);

        let config = SessionConfig {
            duration_override_secs: Some(10.0),
            ..Default::default()
        };
        assert_eq!(config.duration_secs(Mode::SixtySecond), 10.0);
    }

    #[test]
    fn new_session_is_idle_and_unarmed() {
        let session = Session::new(Mode::ThirtySecond, 30.0);
        assert_eq!(session.state, SessionState::Idle);
        assert!(session.armed_target.is_none());
        assert!(!session.is_running());
        assert_eq!(session.seconds_remaining(), 30.0);
    }
}

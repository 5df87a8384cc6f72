use std::fmt;

/// Hit counter for the running session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTracker {
    score: u32,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.score = 0;
    }

    /// Adds one hit and returns the new total.
    pub fn increment(&mut self) -> u32 {
        self.score = self.score.wrapping_add(1);
        self.score
    }

    pub fn current(&self) -> u32 {
        self.score
    }
}

// Score box display
impl fmt::Display for ScoreTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.score)
    }
}

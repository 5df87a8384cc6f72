use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Session length bucket. Also partitions the high-score records.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
pub enum Mode {
    #[default]
    #[strum(to_string = "30s")]
    #[value(name = "30")]
    ThirtySecond,
    #[strum(to_string = "60s")]
    #[value(name = "60")]
    SixtySecond,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::ThirtySecond, Mode::SixtySecond];

    pub fn duration_secs(&self) -> u32 {
        match self {
            Mode::ThirtySecond => 30,
            Mode::SixtySecond => 60,
        }
    }

    /// Storage key of the best score for this mode
    pub fn key(&self) -> &'static str {
        match self {
            Mode::ThirtySecond => "HighScore30s",
            Mode::SixtySecond => "HighScore60s",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Mode::ThirtySecond => Mode::SixtySecond,
            Mode::SixtySecond => Mode::ThirtySecond,
        }
    }
}

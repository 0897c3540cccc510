//! Run state and counters.

use std::fmt;

/// Where the bot is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotState {
    Stopped,
    Running,
    /// Terminal: an activation failed and the toggle control is disabled.
    Faulted,
}

impl BotState {
    /// Text of the toggle control in this state.
    pub fn control_label(self) -> &'static str {
        match self {
            BotState::Stopped => "Start",
            BotState::Running => "Stop",
            BotState::Faulted => "Error",
        }
    }

    pub fn title(self) -> String {
        format!("Busy Bot - {}", self)
    }

    /// Whether the toggle control accepts input.
    pub fn control_enabled(self) -> bool {
        self != BotState::Faulted
    }
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BotState::Stopped => "Stopped",
            BotState::Running => "Running",
            BotState::Faulted => "Faulted",
        };
        f.write_str(name)
    }
}

/// Progress through the current block and the number of blocks written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunCounters {
    /// Lines typed in the current block, always below the block size.
    pub line: u32,
    /// One more than the number of completed blocks.
    pub execution: u64,
}

impl Default for RunCounters {
    fn default() -> Self {
        Self {
            line: 0,
            execution: 1,
        }
    }
}

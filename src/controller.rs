//! The bot controller: startup validation, state transitions and the tick
//! algorithm.
//!
//! The controller is synchronous and owns no timer. Whoever drives it (see
//! [`crate::runner`]) calls [`BotController::tick`] once per elapsed interval
//! and keeps its timer in step with [`BotController::state`].

use crate::config::Settings;
use crate::error::{BotError, Result};
use crate::platform::{Desktop, Keystroke};
use crate::state::{BotState, RunCounters};
use std::time::Duration;
use tracing::{debug, info, warn};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The bot is not running; nothing was touched.
    Idle,
    /// A line was typed.
    Typed {
        line: u32,
        execution: u64,
        block_completed: bool,
    },
    /// The target window could not be activated and the bot is now faulted.
    Faulted,
}

/// A transition the toggle control would request, with the confirmation to
/// ask for first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub target: BotState,
    pub title: &'static str,
    pub question: &'static str,
}

/// Drives a [`Desktop`] according to [`Settings`].
pub struct BotController<D: Desktop> {
    settings: Settings,
    desktop: D,
    interval: Duration,
    state: BotState,
    counters: RunCounters,
}

impl<D: Desktop> BotController<D> {
    /// Validates the settings against the desktop and builds a stopped
    /// controller.
    ///
    /// The target window must exist and the interval must parse. Validation
    /// only looks the window up; it never activates it or sends input.
    pub fn new(settings: Settings, mut desktop: D) -> Result<Self> {
        let window = desktop
            .find_window(&settings.find_class)
            .ok_or_else(|| BotError::window_not_found(&settings.find_class))?;
        let interval = settings.parsed_interval()?;

        info!(
            "Target window '{}' found ({}), interval {:?}, {} lines per block",
            settings.find_class, window, interval, settings.lines_to_write
        );

        Ok(Self {
            settings,
            desktop,
            interval,
            state: BotState::Stopped,
            counters: RunCounters::default(),
        })
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The confirmation a toggle would need, or `None` when the control is
    /// disabled.
    pub fn toggle_request(&self) -> Option<ConfirmRequest> {
        match self.state {
            BotState::Running => Some(ConfirmRequest {
                target: BotState::Stopped,
                title: "User Request Stop",
                question: "Do you wish to halt?",
            }),
            BotState::Stopped => Some(ConfirmRequest {
                target: BotState::Running,
                title: "User Request Start",
                question: "Do you wish to start?",
            }),
            BotState::Faulted => None,
        }
    }

    /// Applies a transition. Confirmation is the caller's job.
    ///
    /// Faulted is reachable from anywhere and never left; requesting the
    /// current state does nothing.
    pub fn transition(&mut self, target: BotState) -> Result<()> {
        if self.state == BotState::Faulted {
            return Err(BotError::control_disabled(self.state.to_string()));
        }
        if self.state != target {
            info!("{} -> {}", self.state, target);
            self.state = target;
        }
        Ok(())
    }

    /// Runs one tick of the bot.
    ///
    /// The window is looked up again every time since the target application
    /// may have been closed or restarted since the last tick.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.state != BotState::Running {
            return Ok(TickOutcome::Idle);
        }

        let activated = match self.desktop.find_window(&self.settings.find_class) {
            Some(window) => self.desktop.set_foreground(window),
            None => false,
        };
        if !activated {
            warn!(
                "Unable to activate a window using class '{}', faulting",
                self.settings.find_class
            );
            self.transition(BotState::Faulted)?;
            return Ok(TickOutcome::Faulted);
        }

        let text = format!("{} - {}", self.counters.execution, self.settings.message);
        self.desktop.send(&Keystroke::Text(text))?;
        self.counters.line += 1;

        let block_completed = self.counters.line % self.settings.lines_to_write.get() == 0;
        if block_completed {
            self.desktop.send(&Keystroke::LineStart)?;
            self.desktop.send(&Keystroke::NewLine)?;
            self.counters.line = 0;
            self.counters.execution += 1;
        } else {
            self.desktop.send(&Keystroke::Tab)?;
        }

        debug!(
            "Tick: line {}, execution {}, block completed: {}",
            self.counters.line, self.counters.execution, block_completed
        );
        Ok(TickOutcome::Typed {
            line: self.counters.line,
            execution: self.counters.execution,
            block_completed,
        })
    }
}

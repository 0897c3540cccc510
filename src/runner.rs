//! The dispatch loop.
//!
//! Timer ticks and user commands are both handled from one `select!` loop, so
//! the controller is only ever touched by one thing at a time. While a
//! confirmation is pending the timer is suspended and the loop is parked on the
//! prompt, so a tick can never land between the question and the answer.

use crate::controller::{BotController, TickOutcome};
use crate::error::Result;
use crate::platform::Desktop;
use crate::state::{BotState, RunCounters};
use crate::surface::{Answer, Command, ControlSurface};
use crate::timer::PeriodicTimer;
use tracing::{debug, info, warn};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub state: BotState,
    pub counters: RunCounters,
    /// Ticks that typed a line.
    pub lines_typed: u64,
}

pub struct Runner<D: Desktop, S: ControlSurface> {
    controller: BotController<D>,
    surface: S,
    timer: PeriodicTimer,
    lines_typed: u64,
}

impl<D: Desktop, S: ControlSurface> Runner<D, S> {
    pub fn new(controller: BotController<D>, surface: S) -> Self {
        let timer = PeriodicTimer::new(controller.interval());
        Self {
            controller,
            surface,
            timer,
            lines_typed: 0,
        }
    }

    /// Runs until the user quits or input closes.
    ///
    /// Only errors the bot cannot report to the user itself end the run early
    /// (e.g. the OS refusing injected input).
    pub async fn run(mut self) -> Result<RunSummary> {
        self.sync_timer();
        self.show_state();

        loop {
            tokio::select! {
                _ = self.timer.tick() => self.on_tick()?,
                command = self.surface.next_command() => match command {
                    Some(Command::Toggle) => self.on_toggle().await?,
                    Some(Command::Status) => self.show_state(),
                    Some(Command::Quit) | None => break,
                },
            }
        }

        info!("Shutting down in state {}", self.controller.state());
        Ok(RunSummary {
            state: self.controller.state(),
            counters: self.controller.counters(),
            lines_typed: self.lines_typed,
        })
    }

    fn on_tick(&mut self) -> Result<()> {
        match self.controller.tick()? {
            TickOutcome::Idle => {}
            TickOutcome::Typed { .. } => self.lines_typed += 1,
            TickOutcome::Faulted => {
                self.sync_timer();
                self.show_state();
                let message = format!(
                    "Unable to find a window using class {}. Busy bot is stopped and disabled. \
                     Please stop it and check the configuration.",
                    self.controller.settings().find_class
                );
                self.surface.show_error("Configuration Error", &message);
            }
        }
        Ok(())
    }

    async fn on_toggle(&mut self) -> Result<()> {
        let Some(request) = self.controller.toggle_request() else {
            warn!("Toggle ignored, control is disabled");
            self.surface.show_error(
                "Control Disabled",
                "Busy bot is faulted. Restart it after fixing the configuration.",
            );
            return Ok(());
        };

        self.timer.suspend();
        let answer = self.surface.confirm(&request).await;
        self.timer.resume();

        debug!("{} answered {:?}", request.title, answer);
        if answer == Answer::Yes {
            self.controller.transition(request.target)?;
            self.sync_timer();
            self.show_state();
        }
        Ok(())
    }

    fn sync_timer(&mut self) {
        if self.controller.state() == BotState::Running {
            self.timer.start();
        } else {
            self.timer.stop();
        }
    }

    fn show_state(&mut self) {
        self.surface
            .show_state(self.controller.state(), self.controller.counters());
    }
}

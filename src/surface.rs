//! The user-facing side: toggle requests, confirmations, state and errors.

use crate::controller::ConfirmRequest;
use crate::state::{BotState, RunCounters};
use async_trait::async_trait;
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::debug;

/// A request coming from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Press the Start/Stop control.
    Toggle,
    /// Show the current state and counters.
    Status,
    Quit,
}

/// Answer to a confirmation prompt. Only `Yes` leads to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Cancel,
}

impl Answer {
    /// Parses a typed answer, `None` if it is not recognised.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => Some(Answer::Yes),
            "n" | "no" => Some(Answer::No),
            "c" | "cancel" => Some(Answer::Cancel),
            _ => None,
        }
    }
}

impl Command {
    /// Parses a typed console command, `None` if it is not recognised.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "" | "t" | "toggle" | "s" | "start" | "stop" => Some(Command::Toggle),
            "status" | "?" => Some(Command::Status),
            "q" | "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Everything the dispatcher needs from a user interface.
#[async_trait]
pub trait ControlSurface: Send {
    /// Next user request, `None` once input is closed.
    ///
    /// Must be cancel safe: it is raced against the timer.
    async fn next_command(&mut self) -> Option<Command>;

    /// Asks the user to confirm a transition.
    async fn confirm(&mut self, request: &ConfirmRequest) -> Answer;

    /// Reflects the state on the toggle control and title.
    fn show_state(&mut self, state: BotState, counters: RunCounters);

    fn show_error(&mut self, title: &str, message: &str);
}

/// Terminal control surface reading commands from stdin.
///
/// Ctrl+C quits: at the command line directly, and from a pending prompt by
/// cancelling it and quitting on the next command read.
pub struct ConsoleSurface<R = Stdin> {
    lines: Lines<BufReader<R>>,
    interrupts: mpsc::UnboundedReceiver<()>,
    interrupted: bool,
}

enum Input {
    Line(String),
    Closed,
    Interrupted,
}

impl Default for ConsoleSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSurface {
    /// Reads stdin and listens for Ctrl+C. Must be called inside a tokio
    /// runtime.
    pub fn new() -> Self {
        let (interrupt_tx, interrupts) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if interrupt_tx.send(()).is_err() {
                    break;
                }
            }
        });
        Self::with_input(tokio::io::stdin(), interrupts)
    }
}

impl<R: AsyncRead + Unpin + Send> ConsoleSurface<R> {
    /// A surface over any line-based input, with interrupts delivered on a
    /// channel.
    pub fn with_input(input: R, interrupts: mpsc::UnboundedReceiver<()>) -> Self {
        Self {
            lines: BufReader::new(input).lines(),
            interrupts,
            interrupted: false,
        }
    }

    fn print_help(&self) {
        println!(
            "{}",
            "Commands: <enter>/t toggle Start/Stop, status, q quit".dimmed()
        );
    }

    async fn read_line(&mut self) -> Input {
        tokio::select! {
            line = self.lines.next_line() => match line {
                Ok(Some(line)) => Input::Line(line),
                Ok(None) => Input::Closed,
                Err(e) => {
                    debug!("Failed to read input: {}", e);
                    Input::Closed
                }
            },
            Some(()) = self.interrupts.recv() => Input::Interrupted,
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> ControlSurface for ConsoleSurface<R> {
    async fn next_command(&mut self) -> Option<Command> {
        if self.interrupted {
            return Some(Command::Quit);
        }
        loop {
            match self.read_line().await {
                Input::Line(line) => match Command::parse(&line) {
                    Some(command) => return Some(command),
                    None => self.print_help(),
                },
                Input::Interrupted => return Some(Command::Quit),
                Input::Closed => return None,
            }
        }
    }

    async fn confirm(&mut self, request: &ConfirmRequest) -> Answer {
        println!("{}", request.title.bold());
        loop {
            print!("{} [y]es / [n]o / [c]ancel: ", request.question);
            if let Err(e) = std::io::stdout().flush() {
                debug!("Failed to flush prompt: {}", e);
            }
            match self.read_line().await {
                Input::Line(line) => {
                    if let Some(answer) = Answer::parse(&line) {
                        return answer;
                    }
                }
                Input::Interrupted => {
                    println!();
                    self.interrupted = true;
                    return Answer::Cancel;
                }
                Input::Closed => {
                    println!();
                    return Answer::Cancel;
                }
            }
        }
    }

    fn show_state(&mut self, state: BotState, counters: RunCounters) {
        let label = format!("[ {} ]", state.control_label());
        let label = match state {
            BotState::Stopped => label.green().bold(),
            BotState::Running => label.yellow().bold(),
            BotState::Faulted => label.red().bold().strikethrough(),
        };
        println!(
            "{}  {}  {}",
            label,
            state.title().bold(),
            format!("(line {}, execution {})", counters.line, counters.execution).dimmed()
        );
        if state.control_enabled() {
            self.print_help();
        }
    }

    fn show_error(&mut self, title: &str, message: &str) {
        eprintln!("{} {}", format!("{}:", title).red().bold(), message);
    }
}

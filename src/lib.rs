//! # Busy Bot
//!
//! Keeps a window busy by typing into it at a fixed interval.
//!
//! On every tick the bot brings the target window (found by its window class
//! name) to the foreground and types `"{execution} - {message}"` followed by a
//! tab. Every `LinesToWrite` lines it ends the block with a line break instead
//! and bumps the execution counter. If the window cannot be activated the bot
//! faults and stays faulted until restarted.
//!
//! ## Example
//!
//! ```
//! use busy_bot::{BotController, BotState, Settings, SimulatedDesktop};
//!
//! let desktop = SimulatedDesktop::with_window("Calc");
//! let settings = Settings::new("00:00:01", "Calc", "hi", 3);
//!
//! let mut bot = BotController::new(settings, desktop.clone()).unwrap();
//! bot.transition(BotState::Running).unwrap();
//! for _ in 0..3 {
//!     bot.tick().unwrap();
//! }
//!
//! assert_eq!(
//!     desktop.transcript(),
//!     "1 - hi{TAB}1 - hi{TAB}1 - hi{HOME}{ENTER}"
//! );
//! assert_eq!(bot.counters().execution, 2);
//! ```
//!
//! ## Configuration
//!
//! Settings are read from `appsettings.json`:
//!
//! ```json
//! {
//!   "Interval": "00:00:10",
//!   "FindClass": "Notepad",
//!   "Message": "None",
//!   "LinesToWrite": 10
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod platform;
pub mod runner;
pub mod state;
pub mod surface;
pub mod timer;

pub use config::Settings;
pub use controller::{BotController, TickOutcome};
pub use error::{BotError, Result};
pub use platform::{Desktop, Keystroke, SimulatedDesktop, WindowHandle};
pub use runner::{RunSummary, Runner};
pub use state::{BotState, RunCounters};
pub use surface::{Answer, Command, ConsoleSurface, ControlSurface};

//! Window lookup, activation and keystroke injection.
//!
//! The bot only needs three OS capabilities, collected in the [`Desktop`]
//! trait. [`native`] returns the implementation for the current OS and
//! [`SimulatedDesktop`] stands in for it in dry runs and tests.

pub mod simulated;
#[cfg(windows)]
pub mod windows;

use crate::error::Result;
use std::fmt;

pub use simulated::SimulatedDesktop;

/// Opaque, non-zero OS window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A unit of input sent to the focused window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keystroke {
    /// Literal text, typed character by character.
    Text(String),
    /// Move the caret to the start of the line.
    LineStart,
    /// Line break.
    NewLine,
    /// Tab / indent.
    Tab,
}

impl Keystroke {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keystroke::Text(text) => write!(f, "text {:?}", text),
            Keystroke::LineStart => f.write_str("{HOME}"),
            Keystroke::NewLine => f.write_str("{ENTER}"),
            Keystroke::Tab => f.write_str("{TAB}"),
        }
    }
}

/// OS capabilities the bot controller drives.
pub trait Desktop {
    /// Resolves a window class name to a handle, `None` when no such window
    /// exists.
    fn find_window(&mut self, class_name: &str) -> Option<WindowHandle>;

    /// Tries to bring the window to the foreground so it receives keyboard
    /// input.
    fn set_foreground(&mut self, window: WindowHandle) -> bool;

    /// Sends input to whichever window currently has focus.
    fn send(&mut self, keystroke: &Keystroke) -> Result<()>;
}

impl<D: Desktop + ?Sized> Desktop for Box<D> {
    fn find_window(&mut self, class_name: &str) -> Option<WindowHandle> {
        (**self).find_window(class_name)
    }

    fn set_foreground(&mut self, window: WindowHandle) -> bool {
        (**self).set_foreground(window)
    }

    fn send(&mut self, keystroke: &Keystroke) -> Result<()> {
        (**self).send(keystroke)
    }
}

/// The desktop of the running OS.
#[cfg(windows)]
pub fn native() -> Result<Box<dyn Desktop + Send>> {
    Ok(Box::new(windows::Win32Desktop::new()))
}

/// The desktop of the running OS.
#[cfg(not(windows))]
pub fn native() -> Result<Box<dyn Desktop + Send>> {
    Err(crate::error::BotError::unsupported_platform(
        "keystroke injection is only implemented for Windows, use --simulate for a dry run",
    ))
}

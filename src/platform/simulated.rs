//! In-memory desktop used for `--simulate` dry runs and tests.

use super::{Desktop, Keystroke, WindowHandle};
use crate::error::{BotError, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// A desktop whose windows are opened and closed programmatically.
///
/// Clones share state, so a test can keep one handle and hand another to the
/// controller, then close the target window mid-run.
///
/// ```
/// use busy_bot::platform::{Desktop, Keystroke, SimulatedDesktop};
///
/// let desktop = SimulatedDesktop::with_window("Notepad");
/// let mut view = desktop.clone();
/// let window = view.find_window("Notepad").unwrap();
/// assert!(view.set_foreground(window));
/// view.send(&Keystroke::Tab).unwrap();
/// assert_eq!(desktop.transcript(), "{TAB}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulatedDesktop {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    windows: Vec<(String, WindowHandle)>,
    next_handle: u64,
    foreground: Option<WindowHandle>,
    refuse_activation: bool,
    refuse_input: bool,
    lookups: usize,
    activations: usize,
    sent: Vec<Keystroke>,
}

impl SimulatedDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    /// A desktop with one window of the given class already open.
    pub fn with_window(class_name: &str) -> Self {
        let desktop = Self::new();
        desktop.open_window(class_name);
        desktop
    }

    /// Opens a window and returns its handle. Reopening a class yields a new
    /// handle, like a restarted application would.
    pub fn open_window(&self, class_name: &str) -> WindowHandle {
        let mut state = self.lock();
        state.next_handle += 1;
        let handle = WindowHandle(0x1000 + state.next_handle);
        state.windows.push((class_name.to_string(), handle));
        handle
    }

    /// Closes every window of the given class.
    pub fn close_window(&self, class_name: &str) {
        let mut state = self.lock();
        let closed: Vec<WindowHandle> = state
            .windows
            .iter()
            .filter(|(class, _)| class == class_name)
            .map(|(_, handle)| *handle)
            .collect();
        state.windows.retain(|(class, _)| class != class_name);
        if state.foreground.is_some_and(|fg| closed.contains(&fg)) {
            state.foreground = None;
        }
    }

    /// Makes every later activation attempt fail, e.g. to mimic focus
    /// stealing prevention.
    pub fn refuse_activation(&self, refuse: bool) {
        self.lock().refuse_activation = refuse;
    }

    /// Makes every later keystroke fail to send.
    pub fn refuse_input(&self, refuse: bool) {
        self.lock().refuse_input = refuse;
    }

    pub fn foreground(&self) -> Option<WindowHandle> {
        self.lock().foreground
    }

    /// Number of window lookups performed so far.
    pub fn lookups(&self) -> usize {
        self.lock().lookups
    }

    /// Number of activation attempts so far.
    pub fn activations(&self) -> usize {
        self.lock().activations
    }

    /// Every keystroke sent so far, in order.
    pub fn sent(&self) -> Vec<Keystroke> {
        self.lock().sent.clone()
    }

    /// Sent keystrokes rendered as one string, with special keys in
    /// `{HOME}`/`{ENTER}`/`{TAB}` notation.
    pub fn transcript(&self) -> String {
        self.lock()
            .sent
            .iter()
            .map(|keystroke| match keystroke {
                Keystroke::Text(text) => text.clone(),
                other => other.to_string(),
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Desktop for SimulatedDesktop {
    fn find_window(&mut self, class_name: &str) -> Option<WindowHandle> {
        let mut state = self.lock();
        state.lookups += 1;
        state
            .windows
            .iter()
            .find(|(class, _)| class == class_name)
            .map(|(_, handle)| *handle)
    }

    fn set_foreground(&mut self, window: WindowHandle) -> bool {
        let mut state = self.lock();
        state.activations += 1;
        let exists = state.windows.iter().any(|(_, handle)| *handle == window);
        if !exists || state.refuse_activation {
            return false;
        }
        state.foreground = Some(window);
        true
    }

    fn send(&mut self, keystroke: &Keystroke) -> Result<()> {
        let mut state = self.lock();
        if state.refuse_input {
            return Err(BotError::key_send_failed(
                keystroke.to_string(),
                "input refused by simulated desktop",
            ));
        }
        info!("[simulated] send {}", keystroke);
        state.sent.push(keystroke.clone());
        Ok(())
    }
}

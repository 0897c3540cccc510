//! Win32 desktop: `FindWindowW`, `SetForegroundWindow` and `SendInput`.

use super::{Desktop, Keystroke, WindowHandle};
use crate::error::{BotError, Result};
use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::ptr;
use tracing::debug;
use winapi::shared::windef::HWND;
use winapi::um::winuser::{
    FindWindowW, SendInput, SetForegroundWindow, INPUT, INPUT_KEYBOARD, KEYBDINPUT,
    KEYEVENTF_KEYUP, KEYEVENTF_UNICODE, VK_HOME, VK_RETURN, VK_TAB,
};

#[derive(Debug, Default)]
pub struct Win32Desktop;

impl Win32Desktop {
    pub fn new() -> Self {
        Self
    }
}

impl Desktop for Win32Desktop {
    fn find_window(&mut self, class_name: &str) -> Option<WindowHandle> {
        let class: Vec<u16> = OsStr::new(class_name)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();
        let hwnd = unsafe { FindWindowW(class.as_ptr(), ptr::null()) };
        if hwnd.is_null() {
            debug!("FindWindowW(\"{}\") returned no window", class_name);
            None
        } else {
            Some(WindowHandle(hwnd as usize as u64))
        }
    }

    fn set_foreground(&mut self, window: WindowHandle) -> bool {
        let hwnd = window.0 as usize as HWND;
        unsafe { SetForegroundWindow(hwnd) != 0 }
    }

    fn send(&mut self, keystroke: &Keystroke) -> Result<()> {
        let inputs: Vec<INPUT> = match keystroke {
            Keystroke::Text(text) => text.encode_utf16().flat_map(unicode_press).collect(),
            Keystroke::LineStart => virtual_key_press(VK_HOME as u16).to_vec(),
            Keystroke::NewLine => virtual_key_press(VK_RETURN as u16).to_vec(),
            Keystroke::Tab => virtual_key_press(VK_TAB as u16).to_vec(),
        };
        send_inputs(keystroke, inputs)
    }
}

fn send_inputs(keystroke: &Keystroke, mut inputs: Vec<INPUT>) -> Result<()> {
    if inputs.is_empty() {
        return Ok(());
    }
    let count = inputs.len() as u32;
    let sent = unsafe {
        SendInput(
            count,
            inputs.as_mut_ptr(),
            std::mem::size_of::<INPUT>() as i32,
        )
    };
    if sent != count {
        let os_error = std::io::Error::last_os_error();
        return Err(BotError::key_send_failed(
            keystroke.to_string(),
            format!("SendInput accepted {} of {} events: {}", sent, count, os_error),
        ));
    }
    Ok(())
}

fn unicode_press(unit: u16) -> [INPUT; 2] {
    [
        keyboard_input(0, unit, KEYEVENTF_UNICODE),
        keyboard_input(0, unit, KEYEVENTF_UNICODE | KEYEVENTF_KEYUP),
    ]
}

fn virtual_key_press(vk: u16) -> [INPUT; 2] {
    [keyboard_input(vk, 0, 0), keyboard_input(vk, 0, KEYEVENTF_KEYUP)]
}

fn keyboard_input(vk: u16, scan: u16, flags: u32) -> INPUT {
    let mut input: INPUT = unsafe { std::mem::zeroed() };
    input.type_ = INPUT_KEYBOARD;
    unsafe {
        *input.u.ki_mut() = KEYBDINPUT {
            wVk: vk,
            wScan: scan,
            dwFlags: flags,
            time: 0,
            dwExtraInfo: 0,
        };
    }
    input
}

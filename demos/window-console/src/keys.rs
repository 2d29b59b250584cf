//! Physical key names in the SDL scancode naming scheme ("A", "Left",
//! "Return", "Left Shift"), so games match on the names they know.

use compact_str::{CompactString, format_compact};
use winit::keyboard::KeyCode;

/// The scancode name of a physical key.
///
/// Keys without an entry keep winit's name.
pub fn scancode_name(code: KeyCode) -> CompactString {
    let name = match code {
        KeyCode::Enter => "Return",
        KeyCode::Escape => "Escape",
        KeyCode::Backspace => "Backspace",
        KeyCode::Tab => "Tab",
        KeyCode::Space => "Space",
        KeyCode::Minus => "-",
        KeyCode::Equal => "=",
        KeyCode::BracketLeft => "[",
        KeyCode::BracketRight => "]",
        KeyCode::Backslash => "\\",
        KeyCode::Semicolon => ";",
        KeyCode::Quote => "'",
        KeyCode::Backquote => "`",
        KeyCode::Comma => ",",
        KeyCode::Period => ".",
        KeyCode::Slash => "/",
        KeyCode::CapsLock => "CapsLock",
        KeyCode::PrintScreen => "PrintScreen",
        KeyCode::ScrollLock => "ScrollLock",
        KeyCode::Pause => "Pause",
        KeyCode::Insert => "Insert",
        KeyCode::Home => "Home",
        KeyCode::PageUp => "PageUp",
        KeyCode::Delete => "Delete",
        KeyCode::End => "End",
        KeyCode::PageDown => "PageDown",
        KeyCode::ArrowRight => "Right",
        KeyCode::ArrowLeft => "Left",
        KeyCode::ArrowDown => "Down",
        KeyCode::ArrowUp => "Up",
        KeyCode::NumLock => "Numlock",
        KeyCode::NumpadDivide => "Keypad /",
        KeyCode::NumpadMultiply => "Keypad *",
        KeyCode::NumpadSubtract => "Keypad -",
        KeyCode::NumpadAdd => "Keypad +",
        KeyCode::NumpadEnter => "Keypad Enter",
        KeyCode::NumpadDecimal => "Keypad .",
        KeyCode::ControlLeft => "Left Ctrl",
        KeyCode::ShiftLeft => "Left Shift",
        KeyCode::AltLeft => "Left Alt",
        KeyCode::SuperLeft => "Left GUI",
        KeyCode::ControlRight => "Right Ctrl",
        KeyCode::ShiftRight => "Right Shift",
        KeyCode::AltRight => "Right Alt",
        KeyCode::SuperRight => "Right GUI",
        KeyCode::ContextMenu => "Menu",
        // letters, digits, keypad digits and function keys
        _ => return derived_name(code),
    };

    CompactString::const_new(name)
}

/// "KeyA" -> "A", "Digit7" -> "7", "Numpad7" -> "Keypad 7"; anything else,
/// such as "F5", is already the scancode name.
fn derived_name(code: KeyCode) -> CompactString {
    let debug = format_compact!("{code:?}");
    if let Some(letter) = debug.strip_prefix("Key").filter(|rest| is_single_char(rest)) {
        return CompactString::new(letter);
    }
    if let Some(digit) = debug.strip_prefix("Digit").filter(|rest| is_single_char(rest)) {
        return CompactString::new(digit);
    }
    if let Some(digit) = debug.strip_prefix("Numpad").filter(|rest| is_single_char(rest)) {
        return format_compact!("Keypad {digit}");
    }

    debug
}

fn is_single_char(s: &str) -> bool {
    s.chars().count() == 1
}

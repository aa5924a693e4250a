//! Keyboard input for menu navigation
//!
//! Menus react to a small, toolkit-agnostic set of keys. Front ends translate
//! their native events into [`Key`] before handing them to a
//! [`MenuTree`](crate::components::menu::MenuTree):
//!
//! - Wayland / evdev clients can use [`Key::from_keycode`] with the raw
//!   `wl_keyboard::key` code, passing the composed character for typeahead.
//! - Text-based transports (scenario files, tests) use [`Key::from_name`].
//!
//! ## Reference
//!
//! Keycode source: Linux kernel `<linux/input-event-codes.h>`

use std::fmt;

/// Linux kernel keycode constants (evdev scancodes)
pub mod keycodes {
    /// Escape key (scancode 1)
    pub const ESC: u32 = 1;

    /// Enter/Return key (scancode 28)
    pub const ENTER: u32 = 28;

    /// Tab key (scancode 15)
    pub const TAB: u32 = 15;

    /// Space bar (scancode 57)
    pub const SPACE: u32 = 57;

    // Arrow keys
    /// Up arrow (scancode 103)
    pub const UP: u32 = 103;

    /// Down arrow (scancode 108)
    pub const DOWN: u32 = 108;

    /// Left arrow (scancode 105)
    pub const LEFT: u32 = 105;

    /// Right arrow (scancode 106)
    pub const RIGHT: u32 = 106;

    // Navigation keys
    /// Home key
    pub const HOME: u32 = 102;

    /// End key
    pub const END: u32 = 107;

    /// Keypad Enter
    pub const KP_ENTER: u32 = 96;
}

/// A key as seen by the menu interaction model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Enter,
    Space,
    Escape,
    Tab,
    /// Printable character, used for typeahead
    Character(char),
}

impl Key {
    /// Translate an evdev keycode.
    ///
    /// `text` is the character the keymap produced for this press (if any);
    /// it is only consulted for keys that are not navigation keys.
    pub fn from_keycode(code: u32, text: Option<char>) -> Option<Self> {
        let key = match code {
            keycodes::ESC => Key::Escape,
            keycodes::ENTER | keycodes::KP_ENTER => Key::Enter,
            keycodes::TAB => Key::Tab,
            keycodes::SPACE => Key::Space,
            keycodes::UP => Key::ArrowUp,
            keycodes::DOWN => Key::ArrowDown,
            keycodes::LEFT => Key::ArrowLeft,
            keycodes::RIGHT => Key::ArrowRight,
            keycodes::HOME => Key::Home,
            keycodes::END => Key::End,
            _ => return text.filter(|c| !c.is_control()).map(Key::Character),
        };
        Some(key)
    }

    /// Parse a key name such as `ArrowDown`, `Escape` or a single character.
    ///
    /// Names follow the DOM `KeyboardEvent.key` values, matched
    /// case-insensitively. `Esc` and `Return` are accepted as aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(if c == ' ' {
                Key::Space
            } else {
                Key::Character(c)
            });
        }

        let key = match name.to_ascii_lowercase().as_str() {
            "arrowup" | "up" => Key::ArrowUp,
            "arrowdown" | "down" => Key::ArrowDown,
            "arrowleft" | "left" => Key::ArrowLeft,
            "arrowright" | "right" => Key::ArrowRight,
            "home" => Key::Home,
            "end" => Key::End,
            "enter" | "return" => Key::Enter,
            "space" | "spacebar" => Key::Space,
            "escape" | "esc" => Key::Escape,
            "tab" => Key::Tab,
            _ => return None,
        };
        Some(key)
    }

    pub fn is_printable(&self) -> bool {
        matches!(self, Key::Character(c) if !c.is_control() && !c.is_whitespace())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Character(c) => write!(f, "{c}"),
            other => write!(f, "{other:?}"),
        }
    }
}

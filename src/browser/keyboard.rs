//! Keyboard key definitions and utilities.
//!
//! The wire protocol encodes non-printable keys as code points in the
//! Unicode private use area starting at `U+E000`. [`Key`] names those
//! keys and [`KeyInput`] mixes them with literal text.
//!
//! # Example
//!
//! ```ignore
//! use wire_webdriver::{Key, KeyInput};
//!
//! element.press(Key::Enter).await?;
//! element.send_keys(&[KeyInput::from("hello"), Key::Tab.into()]).await?;
//!
//! // Symbolic names parse case-insensitively
//! let shift: Key = "shift".parse()?;
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ============================================================================
// Key Enum
// ============================================================================

/// Non-printable keys understood by the remote end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    // ========================================================================
    // Navigation & Control
    // ========================================================================
    /// Releases all held modifiers.
    Null,
    /// Cancel key
    Cancel,
    /// Help key
    Help,
    /// Backspace key
    Backspace,
    /// Tab key
    Tab,
    /// Clear key
    Clear,
    /// Return key
    Return,
    /// Enter key
    Enter,
    /// Pause key
    Pause,
    /// Escape key
    Escape,
    /// Space bar
    Space,
    /// Insert key
    Insert,
    /// Delete key
    Delete,

    // ========================================================================
    // Modifiers
    // ========================================================================
    /// Shift modifier
    Shift,
    /// Control modifier
    Control,
    /// Alt modifier
    Alt,
    /// Meta / Command modifier
    Meta,

    // ========================================================================
    // Page Navigation
    // ========================================================================
    /// Page Up key
    PageUp,
    /// Page Down key
    PageDown,
    /// End key
    End,
    /// Home key
    Home,

    // ========================================================================
    // Arrow Keys
    // ========================================================================
    /// Arrow Left
    ArrowLeft,
    /// Arrow Up
    ArrowUp,
    /// Arrow Right
    ArrowRight,
    /// Arrow Down
    ArrowDown,

    // ========================================================================
    // Function Keys
    // ========================================================================
    /// F1 through F12 (1-based).
    F(u8),
}

impl Key {
    /// Returns the protocol code point for this key.
    ///
    /// Function keys outside `F1..=F12` fall back to [`Key::Null`].
    #[must_use]
    pub fn code(self) -> char {
        let offset: u32 = match self {
            Key::Null => 0x00,
            Key::Cancel => 0x01,
            Key::Help => 0x02,
            Key::Backspace => 0x03,
            Key::Tab => 0x04,
            Key::Clear => 0x05,
            Key::Return => 0x06,
            Key::Enter => 0x07,
            Key::Shift => 0x08,
            Key::Control => 0x09,
            Key::Alt => 0x0A,
            Key::Pause => 0x0B,
            Key::Escape => 0x0C,
            Key::Space => 0x0D,
            Key::PageUp => 0x0E,
            Key::PageDown => 0x0F,
            Key::End => 0x10,
            Key::Home => 0x11,
            Key::ArrowLeft => 0x12,
            Key::ArrowUp => 0x13,
            Key::ArrowRight => 0x14,
            Key::ArrowDown => 0x15,
            Key::Insert => 0x16,
            Key::Delete => 0x17,
            Key::F(n @ 1..=12) => 0x30 + u32::from(n),
            Key::F(_) => 0x00,
            Key::Meta => 0x3D,
        };
        char::from_u32(0xE000 + offset).unwrap_or('\u{E000}')
    }

    /// Returns `true` for keys that stay held until [`Key::Null`].
    #[inline]
    #[must_use]
    pub fn is_modifier(self) -> bool {
        matches!(self, Key::Shift | Key::Control | Key::Alt | Key::Meta)
    }
}

impl FromStr for Key {
    type Err = Error;

    /// Parses a symbolic key name such as `"Shift"`, `"ctrl"` or `"F5"`.
    fn from_str(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let key = match lower.as_str() {
            "null" => Key::Null,
            "cancel" => Key::Cancel,
            "help" => Key::Help,
            "backspace" | "back_space" => Key::Backspace,
            "tab" => Key::Tab,
            "clear" => Key::Clear,
            "return" => Key::Return,
            "enter" => Key::Enter,
            "shift" => Key::Shift,
            "control" | "ctrl" => Key::Control,
            "alt" | "option" => Key::Alt,
            "meta" | "command" | "cmd" => Key::Meta,
            "pause" => Key::Pause,
            "escape" | "esc" => Key::Escape,
            "space" => Key::Space,
            "pageup" | "page_up" => Key::PageUp,
            "pagedown" | "page_down" => Key::PageDown,
            "end" => Key::End,
            "home" => Key::Home,
            "left" | "arrowleft" | "left_arrow" => Key::ArrowLeft,
            "up" | "arrowup" | "up_arrow" => Key::ArrowUp,
            "right" | "arrowright" | "right_arrow" => Key::ArrowRight,
            "down" | "arrowdown" | "down_arrow" => Key::ArrowDown,
            "insert" => Key::Insert,
            "delete" | "del" => Key::Delete,
            other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                Some(n @ 1..=12) => Key::F(n),
                _ => return Err(Error::config(format!("unknown key name: {name}"))),
            },
        };
        Ok(key)
    }
}

// ============================================================================
// KeyInput
// ============================================================================

/// One entry of a key sequence: literal text or a named key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    /// Typed character by character.
    Text(String),
    /// Pressed as a single key.
    Key(Key),
}

impl From<&str> for KeyInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for KeyInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Key> for KeyInput {
    fn from(key: Key) -> Self {
        Self::Key(key)
    }
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Key(key) => write!(f, "{}", key.code()),
        }
    }
}

/// Encodes a key sequence as the protocol's `value` array.
#[must_use]
pub fn encode(keys: &[KeyInput]) -> Vec<String> {
    keys.iter().map(ToString::to_string).collect()
}

// ============================================================================
// Tests
// ============================================================================

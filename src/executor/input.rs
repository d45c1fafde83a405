use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

use crate::errors::{TinderError, TinderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl std::fmt::Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Press,
    Release,
    Click,
}

/// A single named key, independent of the input backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Enter,
    Space,
    Tab,
    Escape,
    Backspace,
    Delete,
    Shift,
    Control,
    Alt,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    Char(char),
}

impl KeyCode {
    /// Case-insensitive key name, or any single character.
    pub fn parse(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(KeyCode::Char(c));
        }

        let lower = name.trim().to_lowercase();
        let key = match lower.as_str() {
            "enter" | "return" => KeyCode::Enter,
            "space" => KeyCode::Space,
            "tab" => KeyCode::Tab,
            "escape" | "esc" => KeyCode::Escape,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "shift" => KeyCode::Shift,
            "ctrl" | "control" => KeyCode::Control,
            "alt" => KeyCode::Alt,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            other => {
                let n: u8 = other.strip_prefix('f')?.parse().ok()?;
                if !(1..=12).contains(&n) {
                    return None;
                }
                KeyCode::F(n)
            }
        };
        Some(key)
    }
}

/// OS-level pointer and keyboard primitives. Coordinates are absolute
/// screen pixels.
pub trait InputDriver {
    fn cursor_position(&self) -> TinderResult<(i32, i32)>;
    fn move_cursor(&mut self, x: i32, y: i32) -> TinderResult<()>;
    fn button(&mut self, button: MouseButton, action: ButtonAction) -> TinderResult<()>;
    fn key(&mut self, key: KeyCode) -> TinderResult<()>;
    fn text(&mut self, text: &str) -> TinderResult<()>;
}

pub struct EnigoDriver {
    enigo: Enigo,
}

impl EnigoDriver {
    pub fn new() -> TinderResult<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| TinderError::Actuation(format!("failed to open input connection: {e}")))?;
        Ok(Self { enigo })
    }
}

fn actuation(e: impl std::fmt::Display) -> TinderError {
    TinderError::Actuation(e.to_string())
}

impl InputDriver for EnigoDriver {
    fn cursor_position(&self) -> TinderResult<(i32, i32)> {
        self.enigo.location().map_err(actuation)
    }

    fn move_cursor(&mut self, x: i32, y: i32) -> TinderResult<()> {
        self.enigo.move_mouse(x, y, Coordinate::Abs).map_err(actuation)
    }

    fn button(&mut self, button: MouseButton, action: ButtonAction) -> TinderResult<()> {
        let button = match button {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
            MouseButton::Middle => Button::Middle,
        };
        let direction = match action {
            ButtonAction::Press => Direction::Press,
            ButtonAction::Release => Direction::Release,
            ButtonAction::Click => Direction::Click,
        };
        self.enigo.button(button, direction).map_err(actuation)
    }

    fn key(&mut self, key: KeyCode) -> TinderResult<()> {
        let key = match key {
            KeyCode::Enter => Key::Return,
            KeyCode::Space => Key::Space,
            KeyCode::Tab => Key::Tab,
            KeyCode::Escape => Key::Escape,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Shift => Key::Shift,
            KeyCode::Control => Key::Control,
            KeyCode::Alt => Key::Alt,
            KeyCode::Up => Key::UpArrow,
            KeyCode::Down => Key::DownArrow,
            KeyCode::Left => Key::LeftArrow,
            KeyCode::Right => Key::RightArrow,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::F(n) => function_key(n)?,
            KeyCode::Char(c) => Key::Unicode(c),
        };
        self.enigo.key(key, Direction::Click).map_err(actuation)
    }

    fn text(&mut self, text: &str) -> TinderResult<()> {
        self.enigo.text(text).map_err(actuation)
    }
}

fn function_key(n: u8) -> TinderResult<Key> {
    let key = match n {
        1 => Key::F1,
        2 => Key::F2,
        3 => Key::F3,
        4 => Key::F4,
        5 => Key::F5,
        6 => Key::F6,
        7 => Key::F7,
        8 => Key::F8,
        9 => Key::F9,
        10 => Key::F10,
        11 => Key::F11,
        12 => Key::F12,
        _ => return Err(TinderError::Actuation(format!("no function key F{n}"))),
    };
    Ok(key)
}

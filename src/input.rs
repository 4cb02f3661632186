use std::fmt;

use crate::affordance::{Rect, ScreenPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Advances a cycle control.
    Left,
    /// Steps a cycle control back.
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Down,
    Enter,
}

/// A primitive input gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Click { at: ScreenPoint, button: MouseButton },
    Press(Key),
    Hold(ScreenPoint),
    Release(ScreenPoint),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Click {
                at,
                button: MouseButton::Left,
            } => write!(f, "click {at}"),
            Action::Click {
                at,
                button: MouseButton::Right,
            } => write!(f, "right-click {at}"),
            Action::Press(Key::Down) => f.write_str("key down"),
            Action::Press(Key::Enter) => f.write_str("key enter"),
            Action::Hold(at) => write!(f, "hold {at}"),
            Action::Release(at) => write!(f, "release {at}"),
        }
    }
}

/// Mouse/keyboard automation of the instrument window.
pub trait InputBackend {
    fn click(&mut self, at: ScreenPoint, button: MouseButton) -> anyhow::Result<()>;
    fn press_key(&mut self, key: Key) -> anyhow::Result<()>;
    fn hold(&mut self, at: ScreenPoint) -> anyhow::Result<()>;
    fn release(&mut self, at: ScreenPoint) -> anyhow::Result<()>;
    /// Current window rectangle in absolute pixels.
    fn window_rect(&self) -> Rect;
}

/// Backend that performs nothing and keeps a log of what it was asked to do.
pub struct Recorder {
    window: Rect,
    actions: Vec<Action>,
}

impl Recorder {
    pub fn new(window: Rect) -> Self {
        Recorder {
            window,
            actions: Vec::new(),
        }
    }

    /// Hand back the recorded actions, leaving the log empty.
    pub fn take(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    fn record(&mut self, action: Action) -> anyhow::Result<()> {
        log::info!("Input: {action}");
        self.actions.push(action);
        Ok(())
    }
}

impl InputBackend for Recorder {
    fn click(&mut self, at: ScreenPoint, button: MouseButton) -> anyhow::Result<()> {
        self.record(Action::Click { at, button })
    }

    fn press_key(&mut self, key: Key) -> anyhow::Result<()> {
        self.record(Action::Press(key))
    }

    fn hold(&mut self, at: ScreenPoint) -> anyhow::Result<()> {
        self.record(Action::Hold(at))
    }

    fn release(&mut self, at: ScreenPoint) -> anyhow::Result<()> {
        self.record(Action::Release(at))
    }

    fn window_rect(&self) -> Rect {
        self.window
    }
}

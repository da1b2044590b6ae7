//! Keyboard input contract.

/// Key symbols the firmware reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Up,
    Down,
    Return,
    Escape,
    /// Printable character.
    Char(u8),
    Unknown,
}

/// What happened to the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Press,
    Release,
    /// Anything else, including the empty-queue event.
    Other,
}

/// One keyboard event. Consumed exactly once per poll iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub code: KeyCode,
}

impl KeyEvent {
    /// The neutral event an empty queue yields.
    pub const NONE: KeyEvent = KeyEvent {
        kind: KeyEventKind::Other,
        code: KeyCode::Unknown,
    };

    pub const fn press(code: KeyCode) -> Self {
        KeyEvent {
            kind: KeyEventKind::Press,
            code,
        }
    }

    pub const fn release(code: KeyCode) -> Self {
        KeyEvent {
            kind: KeyEventKind::Release,
            code,
        }
    }

    pub fn is_press(&self) -> bool {
        self.kind == KeyEventKind::Press
    }
}

/// Source of keyboard events.
///
/// `poll` is the firmware's only suspension point: it blocks until at least
/// one event is queued. `pop_keyboard_event` never blocks and yields
/// [`KeyEvent::NONE`] once the queue is drained.
pub trait InputSource {
    fn poll(&mut self);
    fn pop_keyboard_event(&mut self) -> KeyEvent;
}

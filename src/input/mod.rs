//! Turning key presses into game commands.

pub mod script;

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use crate::{error::SessionError, game::Direction};

pub use script::ScriptedInput;

/// How long one poll waits before re-checking the cancel token.
const CANCEL_POLL: Duration = Duration::from_millis(100);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    PlaceLight,
    /// Space; leaves the title screen.
    Confirm,
    Quit,
    /// Any other key. Ignored.
    Unknown,
}

/// Map keyboard input to game commands.
pub fn command_for_key(key: KeyEvent) -> Command {
    match key.code {
        KeyCode::Up | KeyCode::Char('w' | 'W' | 'k' | 'K') => Command::Move(Direction::North),
        KeyCode::Down | KeyCode::Char('s' | 'S' | 'j' | 'J') => Command::Move(Direction::South),
        KeyCode::Left | KeyCode::Char('a' | 'A' | 'h' | 'H') => Command::Move(Direction::West),
        KeyCode::Right | KeyCode::Char('d' | 'D' | 'l' | 'L') => Command::Move(Direction::East),
        KeyCode::Enter | KeyCode::Char('t' | 'T') => Command::PlaceLight,
        KeyCode::Char(' ') => Command::Confirm,
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Command::Quit,
        _ => Command::Unknown,
    }
}

/// Ctrl-C. Raw mode delivers it as a key instead of a signal.
pub fn is_interrupt(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Shared flag requesting the session to stop at its next input wait.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Blocking source of one command per turn.
pub trait InputSource {
    /// Waits for the next command. `None` means the wait was cancelled.
    fn next_command(&mut self, cancel: &CancelToken) -> Result<Option<Command>, SessionError>;
}

/// Reads key presses from the terminal. Expects raw mode to be active.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl TerminalInput {
    pub const fn new() -> Self {
        Self
    }
}

impl InputSource for TerminalInput {
    fn next_command(&mut self, cancel: &CancelToken) -> Result<Option<Command>, SessionError> {
        loop {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            if !event::poll(CANCEL_POLL)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if is_interrupt(key) {
                warn!("interrupt received");
                cancel.cancel();
                return Ok(None);
            }
            return Ok(Some(resolve_key(key)));
        }
    }
}

/// Maps a pressed key, tracing only keys that do something.
fn resolve_key(key: KeyEvent) -> Command {
    let command = command_for_key(key);
    if command != Command::Unknown {
        debug!(?key.code, ?command, "key");
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys() {
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::Up)),
            Command::Move(Direction::North)
        );
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::Char('s'))),
            Command::Move(Direction::South)
        );
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::Char('A'))),
            Command::Move(Direction::West)
        );
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::Right)),
            Command::Move(Direction::East)
        );
    }

    #[test]
    fn test_legacy_letter_scheme() {
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::Char('k'))),
            Command::Move(Direction::North)
        );
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::Char('j'))),
            Command::Move(Direction::South)
        );
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::Char('h'))),
            Command::Move(Direction::West)
        );
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::Char('l'))),
            Command::Move(Direction::East)
        );
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::Enter)),
            Command::PlaceLight
        );
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::Char('T'))),
            Command::PlaceLight
        );
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::Char(' '))),
            Command::Confirm
        );
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::Char('q'))),
            Command::Quit
        );
        assert_eq!(command_for_key(KeyEvent::from(KeyCode::Esc)), Command::Quit);
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::Char('x'))),
            Command::Unknown
        );
        assert_eq!(
            command_for_key(KeyEvent::from(KeyCode::F(5))),
            Command::Unknown
        );
    }

    #[test]
    fn test_interrupt_detection() {
        assert!(is_interrupt(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!is_interrupt(KeyEvent::from(KeyCode::Char('c'))));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured<F: FnOnce()>(f: F) -> String {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = log.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_ignored_keys_are_not_traced() {
        let output = captured(|| {
            assert_eq!(
                resolve_key(KeyEvent::from(KeyCode::Char('x'))),
                Command::Unknown
            );
            assert_eq!(resolve_key(KeyEvent::from(KeyCode::F(2))), Command::Unknown);
        });
        assert!(output.is_empty());
    }

    #[test]
    fn test_recognised_keys_are_traced() {
        let output = captured(|| {
            assert_eq!(
                resolve_key(KeyEvent::from(KeyCode::Char('t'))),
                Command::PlaceLight
            );
        });
        assert!(output.contains("PlaceLight"));
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }
}

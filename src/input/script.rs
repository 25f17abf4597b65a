use std::{fs, path::Path};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use super::{CancelToken, Command, InputSource, command_for_key, is_interrupt};
use crate::error::SessionError;

/// Key presses replayed from a script instead of the keyboard.
///
/// One key per character; blank lines and lines starting with `#` are
/// skipped. Letters, digits and `.` are pressed as themselves. Lines are
/// trimmed, so `_` stands in for Space. `=` is Enter, `~` is Esc and `^` is
/// Ctrl-C. When the script runs out the player quits.
pub struct ScriptedInput {
    script_keys: Vec<KeyEvent>,
    current_key_index: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let script = fs::read_to_string(path).map_err(|source| SessionError::Script {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&script))
    }

    pub fn parse(script: &str) -> Self {
        let mut script_keys = Vec::new();
        for line in script.lines() {
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }
            for char_code in trimmed_line.chars() {
                match char_to_key(char_code) {
                    Some(key) => script_keys.push(key),
                    None => warn!(key = %char_code.escape_default(), "unknown key in script"),
                }
            }
        }

        Self {
            script_keys,
            current_key_index: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.script_keys.len() - self.current_key_index
    }
}

impl InputSource for ScriptedInput {
    fn next_command(&mut self, cancel: &CancelToken) -> Result<Option<Command>, SessionError> {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        let Some(key) = self.script_keys.get(self.current_key_index).copied() else {
            return Ok(Some(Command::Quit));
        };
        self.current_key_index += 1;
        if is_interrupt(key) {
            cancel.cancel();
            return Ok(None);
        }
        Ok(Some(command_for_key(key)))
    }
}

fn char_to_key(c: char) -> Option<KeyEvent> {
    let code = match c {
        '_' => KeyCode::Char(' '),
        '=' => KeyCode::Enter,
        '~' => KeyCode::Esc,
        '^' => return Some(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        c if c.is_ascii_alphanumeric() || c == '.' => KeyCode::Char(c),
        _ => return None,
    };
    Some(KeyEvent::from(code))
}

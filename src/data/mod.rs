//! Narrative text: title lore and the lines shown as keys are found.

pub const TITLE: &str = "Ash Light";

pub const TITLE_LORE: [&str; 3] = [
    "The fire is fading...",
    "You descend with only a few embers in hand.",
    "Each light you leave behind is one step closer to the dark.",
];

pub const TITLE_PROMPT: &str = "[Press Space to Begin]";

pub const HEADER: &str = "Find every key and escape. Don't lose your last light.";

pub const CONTROLS: &str = "Controls: [WASD/arrows] move  [T] or [Enter] drop torch  [Q] quit";

pub const VICTORY: &str = "You escaped with every key! Victory!";

pub const EXIT_OPEN: &str = "The exit is open.";

pub const FAREWELL: &str = "Goodbye.";

pub const GAME_OVER: &str = "The last ember gutters out. Game over.";

pub fn opening(total: usize) -> String {
    if total == 1 {
        "Somewhere in the dark lies a single key.".to_string()
    } else {
        format!("Somewhere in the dark lie {total} keys.")
    }
}

pub fn key_found(collected: usize, total: usize) -> String {
    format!("You pocket a key. ({collected}/{total})")
}

/// Shown once, when one key remains.
pub fn ancient_stirring(collected: usize, total: usize) -> String {
    format!("Key {collected}/{total}. Something ancient stirs in the deep...")
}

/// Shown once, when the last key is taken.
pub fn all_keys(collected: usize, total: usize) -> String {
    format!("You have every key ({collected}/{total})! Find the exit!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_lines_carry_counts() {
        assert!(key_found(1, 3).contains("1/3"));
        assert!(ancient_stirring(2, 3).contains("2/3"));
        assert!(all_keys(1, 1).contains("1/1"));
    }

    #[test]
    fn test_opening_pluralises() {
        assert!(opening(1).contains("a single key"));
        assert!(opening(4).contains("4 keys"));
    }
}

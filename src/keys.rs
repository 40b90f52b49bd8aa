//! Keyboard command tables for the recognizer and the dataset capture program.

use crate::labels::Mode;
use crate::session::Command;

/// A key press, independent of the windowing backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Char(char),
    Escape,
}

/// Recognizer keys: `1` digits, `2` letters, `3` actions, Escape quits
pub fn recognizer_command(key: KeyPress) -> Option<Command> {
    match key {
        KeyPress::Escape => Some(Command::Quit),
        KeyPress::Char('1') => Some(Command::Select(Mode::Digits)),
        KeyPress::Char('2') => Some(Command::Select(Mode::Letters)),
        KeyPress::Char('3') => Some(Command::Select(Mode::Actions)),
        KeyPress::Char(_) => None,
    }
}

/// What a key means to the dataset capture program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureAction {
    /// Save the current sample into this class folder
    Save(&'static str),
    Quit,
}

const DIGIT_CLASSES: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

const LETTER_CLASSES: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S",
    "T", "U", "V", "W", "X", "Y", "Z",
];

/// Capture keys: digits and letters save into their own class, `*` `+` `-`
/// into three action classes, Escape quits, anything else is ignored
pub fn capture_action(key: KeyPress) -> Option<CaptureAction> {
    match key {
        KeyPress::Escape => Some(CaptureAction::Quit),
        KeyPress::Char(c @ '0'..='9') => {
            Some(CaptureAction::Save(DIGIT_CLASSES[c as usize - '0' as usize]))
        }
        KeyPress::Char(c) if c.is_ascii_alphabetic() => {
            let upper = c.to_ascii_uppercase();
            Some(CaptureAction::Save(
                LETTER_CLASSES[upper as usize - 'A' as usize],
            ))
        }
        KeyPress::Char('*') => Some(CaptureAction::Save("Coppier_Fichier")),
        KeyPress::Char('+') => Some(CaptureAction::Save("Creer_Dossier")),
        KeyPress::Char('-') => Some(CaptureAction::Save("Jeu")),
        KeyPress::Char(_) => None,
    }
}

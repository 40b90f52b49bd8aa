//! Recognition modes and the class-index → label tables they select.
//!
//! Every program reads its labels from here so the tables cannot drift apart.

use std::fmt;

/// Number of classes the shipped network was trained on.
///
/// This is the width of the final dense layer and therefore the length of
/// every probability vector.
pub const TRAINED_CLASSES: usize = 29;

/// The recognition category currently selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// No category selected; prediction is suppressed
    #[default]
    Idle,
    Digits,
    Letters,
    Actions,
}

const DIGITS: &[(usize, &str)] = &[
    (0, "ZERO"),
    (1, "ONE"),
    (2, "TWO"),
    (3, "THREE"),
    (4, "FOUR"),
    (5, "FIVE"),
    (6, "SIX"),
    (7, "SEVEN"),
    (8, "EIGHT"),
    (9, "NINE"),
];

const LETTERS: &[(usize, &str)] = &[
    (0, "A"),
    (1, "B"),
    (2, "C"),
    (3, "D"),
    (4, "E"),
    (5, "F"),
    (6, "G"),
    (7, "H"),
    (8, "I"),
    (9, "J"),
    (10, "K"),
    (11, "L"),
    (12, "M"),
];

const ACTIONS: &[(usize, &str)] = &[
    (13, "Creer Dossier"),
    (14, "Coppier Fichier"),
    (15, "Jeu"),
    (16, "Ecrire Fichier"),
];

impl Mode {
    /// The (global class index, label) pairs of this mode's category group,
    /// in declaration order. Empty for [`Mode::Idle`].
    pub fn group(self) -> &'static [(usize, &'static str)] {
        match self {
            Mode::Idle => &[],
            Mode::Digits => DIGITS,
            Mode::Letters => LETTERS,
            Mode::Actions => ACTIONS,
        }
    }

    /// Text shown on the status line
    pub fn status_text(self) -> &'static str {
        match self {
            Mode::Idle => "MODE: NONE",
            Mode::Digits => "MODE: DIGITS (0-9)",
            Mode::Letters => "MODE: LETTERS (A-M)",
            Mode::Actions => "MODE: ACTIONS",
        }
    }

    /// Overlay accent color
    pub fn color(self) -> [u8; 3] {
        match self {
            Mode::Idle => [255, 255, 0],
            Mode::Digits => [52, 152, 219],
            Mode::Letters => [155, 89, 182],
            Mode::Actions => [230, 126, 34],
        }
    }

    pub fn is_active(self) -> bool {
        self != Mode::Idle
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Idle => "idle",
            Mode::Digits => "digits",
            Mode::Letters => "letters",
            Mode::Actions => "actions",
        };
        f.write_str(name)
    }
}

/// Folder names of every class the capture program can record.
///
/// Digits, the full alphabet, then the action gestures.
pub const DATASET_CLASSES: [&str; 45] = [
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "A", "B", "C", "D", "E", "F", "G", "H", "I",
    "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
    "Creer_Dossier", "Coppier_Fichier", "Jeu", "Musique", "Ouvrire_un_Site_Web", "Video",
    "Ecrire_Dans_un_Fichier", "PDF_ou_Word", "fichier_signes",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_has_no_group() {
        assert!(Mode::Idle.group().is_empty());
        assert!(!Mode::Idle.is_active());
    }

    #[test]
    fn groups_fit_trained_class_count() {
        for mode in [Mode::Digits, Mode::Letters, Mode::Actions] {
            assert!(mode.group().iter().all(|&(i, _)| i < TRAINED_CLASSES));
        }
    }

    #[test]
    fn digits_and_letters_share_the_index_space() {
        assert_eq!(Mode::Digits.group()[0], (0, "ZERO"));
        assert_eq!(Mode::Letters.group()[0], (0, "A"));
        assert_eq!(Mode::Actions.group()[0].0, 13);
    }

    #[test]
    fn dataset_classes_are_unique() {
        let mut names = DATASET_CLASSES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DATASET_CLASSES.len());
    }
}

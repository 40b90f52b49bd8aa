//! Ranking of the active mode's labels by classifier confidence.

use crate::labels::Mode;

/// Slots shown in the window's prediction panel
pub const WINDOW_BUDGET: usize = 4;

/// Lines printed per tick by the console sink
pub const CONSOLE_BUDGET: usize = 3;

/// One ranked entry
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: &'static str,
    /// Probability in [0, 1]
    pub probability: f32,
}

impl Prediction {
    /// Confidence as a percentage
    pub fn confidence(&self) -> f32 {
        self.probability * 100.0
    }
}

/// Rank the labels of `mode`'s group by probability, descending.
///
/// Indices past the end of `probabilities` are skipped. Equal probabilities
/// keep the group's declaration order. At most `budget` entries are returned,
/// and none at all for [`Mode::Idle`].
pub fn rank(mode: Mode, probabilities: &[f32], budget: usize) -> Vec<Prediction> {
    let mut ranked: Vec<Prediction> = mode
        .group()
        .iter()
        .filter_map(|&(index, label)| {
            probabilities.get(index).map(|&probability| Prediction {
                label,
                probability,
            })
        })
        .collect();

    // sort_by is stable, so ties stay in table order
    ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    ranked.truncate(budget);
    ranked
}

/// Text for one display slot, `---: 0.0%` when the slot is empty
pub fn slot_text(position: usize, prediction: Option<&Prediction>) -> String {
    match prediction {
        Some(p) => format!("{}. {}: {:.1}%", position + 1, p.label, p.confidence()),
        None => format!("{}. ---: 0.0%", position + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::TRAINED_CLASSES;

    fn vector_with(head: &[f32]) -> Vec<f32> {
        let rest = (1.0 - head.iter().sum::<f32>()) / (TRAINED_CLASSES - head.len()) as f32;
        let mut v = head.to_vec();
        v.resize(TRAINED_CLASSES, rest);
        v
    }

    #[test]
    fn zero_wins_in_digits_mode() {
        let probs = vector_with(&[0.7, 0.1, 0.05]);
        let ranked = rank(Mode::Digits, &probs, WINDOW_BUDGET);
        assert_eq!(ranked[0].label, "ZERO");
        assert!((ranked[0].confidence() - 70.0).abs() < 1e-4);
        assert_eq!(slot_text(0, ranked.first()), "1. ZERO: 70.0%");
        assert_eq!(ranked[1].label, "ONE");
    }

    #[test]
    fn idle_yields_nothing() {
        let probs = vector_with(&[0.9]);
        assert!(rank(Mode::Idle, &probs, WINDOW_BUDGET).is_empty());
        assert_eq!(slot_text(2, None), "3. ---: 0.0%");
    }

    #[test]
    fn ranking_is_sorted_bounded_and_in_group() {
        let probs: Vec<f32> = (0..TRAINED_CLASSES).map(|i| ((i * 7) % 11) as f32).collect();
        for mode in [Mode::Digits, Mode::Letters, Mode::Actions] {
            for budget in [0, 1, 3, 4, 20] {
                let ranked = rank(mode, &probs, budget);
                assert!(ranked.len() <= budget);
                assert!(ranked
                    .windows(2)
                    .all(|w| w[0].probability >= w[1].probability));
                assert!(ranked
                    .iter()
                    .all(|p| mode.group().iter().any(|&(_, l)| l == p.label)));
            }
        }
    }

    #[test]
    fn ties_keep_declaration_order() {
        let probs = vec![0.25; TRAINED_CLASSES];
        let ranked = rank(Mode::Letters, &probs, 3);
        let labels: Vec<_> = ranked.iter().map(|p| p.label).collect();
        assert_eq!(labels, ["A", "B", "C"]);
    }

    #[test]
    fn actions_past_the_vector_are_skipped() {
        // Only indices 0..=14 exist, so Jeu (15) and Ecrire Fichier (16) drop out
        let mut probs = vec![0.0; 15];
        probs[13] = 0.2;
        probs[14] = 0.6;
        let ranked = rank(Mode::Actions, &probs, WINDOW_BUDGET);
        let labels: Vec<_> = ranked.iter().map(|p| p.label).collect();
        assert_eq!(labels, ["Coppier Fichier", "Creer Dossier"]);
    }
}

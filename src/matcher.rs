//! Fuzzy name matching between the two record sources.
//!
//! Names for the same case rarely agree byte-for-byte across a spreadsheet
//! and a gazette scan: OCR garbles characters, clerks vary punctuation and
//! casing, and honorifics come and go. Both names are therefore reduced to
//! letters and spaces before scoring with the Sørensen–Dice bigram
//! coefficient, which is tolerant of single-character noise while still
//! penalising genuinely different names ("Peter Otieno" vs "Peter Otieno
//! Junior" scores below the default 0.85 cut-off).

use tracing::trace;

/// Decides whether two free-text names refer to the same case.
///
/// The threshold comes from [`crate::config::EngineConfig::match_threshold`];
/// it is the tunable trade-off between false positives (too low) and false
/// negatives (too high).
#[derive(Debug, Clone, Copy)]
pub struct NameMatcher {
    threshold: f64,
}

impl NameMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// The similarity threshold this matcher decides at.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Reduce a name to its comparable core: letters and whitespace only,
    /// trimmed, case-folded.
    pub fn normalize(name: &str) -> String {
        name.chars()
            .filter(|c| c.is_alphabetic() || c.is_whitespace())
            .collect::<String>()
            .trim()
            .to_lowercase()
    }

    /// Sørensen–Dice similarity of the two normalized names, in [0,1].
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        strsim::sorensen_dice(&Self::normalize(a), &Self::normalize(b))
    }

    /// True when the names clear the threshold. Either name normalizing to
    /// the empty string short-circuits to false regardless of score —
    /// an empty name matches nothing, even another empty name.
    pub fn is_match(&self, a: &str, b: &str) -> bool {
        let na = Self::normalize(a);
        let nb = Self::normalize(b);
        if na.is_empty() || nb.is_empty() {
            return false;
        }
        let score = strsim::sorensen_dice(&na, &nb);
        trace!(score, a = %na, b = %nb, "name comparison");
        score >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> NameMatcher {
        NameMatcher::new(0.85)
    }

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(
            NameMatcher::normalize("  JOHN (1) KAMAU-MWANGI,  "),
            "john  kamaumwangi"
        );
    }

    #[test]
    fn identical_names_match() {
        assert!(matcher().is_match("John Kamau Mwangi", "JOHN KAMAU MWANGI"));
    }

    #[test]
    fn punctuation_noise_still_matches() {
        assert!(matcher().is_match("John Kamau Mwangi", "John Kamau, Mwangi."));
    }

    #[test]
    fn different_names_do_not_match() {
        assert!(!matcher().is_match("John Kamau Mwangi", "Peter Otieno"));
    }

    #[test]
    fn suffix_pushes_below_threshold() {
        // Scenario from the reconciliation contract: an extra "Junior"
        // drops the bigram overlap below 0.85.
        assert!(!matcher().is_match("Peter Otieno", "Peter Otieno Junior"));
    }

    #[test]
    fn symmetric() {
        let m = matcher();
        for (a, b) in [
            ("John Kamau", "Jon Kamau"),
            ("Mary Wanjiku", "Peter Otieno"),
            ("", "anything"),
        ] {
            assert_eq!(m.is_match(a, b), m.is_match(b, a), "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn empty_after_normalization_never_matches() {
        let m = matcher();
        assert!(!m.is_match("", ""));
        assert!(!m.is_match("123-456", "123-456")); // digits strip to empty
        assert!(!m.is_match("   ", "John"));
    }

    #[test]
    fn threshold_is_respected() {
        let lenient = NameMatcher::new(0.5);
        let strict = NameMatcher::new(0.99);
        assert!(lenient.is_match("Peter Otieno", "Peter Otieno Junior"));
        assert!(!strict.is_match("John Kamao", "John Kamau"));
    }
}

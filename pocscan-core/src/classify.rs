use crate::model::MaturityLabel;

/// Decide whether a record is reported, and under which label.
///
/// Only a (normalized) maturity of exactly "Proof-of-Concept" is reported; the
/// weaponized flag then picks between the two labels.
pub fn classify(maturity: Option<&str>, is_weaponized: bool) -> Option<MaturityLabel> {
    match (maturity, is_weaponized) {
        (Some("Proof-of-Concept"), true) => Some(MaturityLabel::Weaponized),
        (Some("Proof-of-Concept"), false) => Some(MaturityLabel::ProofOfConcept),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_table() {
        assert_eq!(
            classify(Some("Proof-of-Concept"), true),
            Some(MaturityLabel::Weaponized)
        );
        assert_eq!(
            classify(Some("Proof-of-Concept"), false),
            Some(MaturityLabel::ProofOfConcept)
        );
        assert_eq!(classify(Some("None"), true), None);
        assert_eq!(classify(Some("None"), false), None);
        assert_eq!(classify(None, true), None);
        assert_eq!(classify(None, false), None);
    }

    #[test]
    fn test_raw_functional_is_not_matched() {
        // Normalization happens before classification
        assert_eq!(classify(Some("Functional"), false), None);
    }
}

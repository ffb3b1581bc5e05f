//! Section-level review state derived from individual gate states.

use crate::status::ReviewGateState;

/// Fold a section's review gates into one section-level state.
///
/// Any `ChangesRequested` gate dominates. Otherwise the section is
/// `Approved` only when every gate is, `InReview` once any gate has made
/// progress, and `Pending` when nothing has moved (including the empty
/// gate list).
///
/// The partial-approval row of this table is inferred product behavior,
/// not a documented business rule; keep it a plain function so a rule
/// change stays a one-line edit.
pub fn derive_section_review_state(gates: &[ReviewGateState]) -> ReviewGateState {
    if gates.iter().any(|g| *g == ReviewGateState::ChangesRequested) {
        return ReviewGateState::ChangesRequested;
    }
    if !gates.is_empty() && gates.iter().all(|g| *g == ReviewGateState::Approved) {
        return ReviewGateState::Approved;
    }
    if gates
        .iter()
        .any(|g| matches!(g, ReviewGateState::Approved | ReviewGateState::InReview))
    {
        return ReviewGateState::InReview;
    }
    ReviewGateState::Pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ReviewGateState::*;

    #[test]
    fn empty_gate_list_is_pending() {
        assert_eq!(derive_section_review_state(&[]), Pending);
    }

    #[test]
    fn all_pending_stays_pending() {
        assert_eq!(derive_section_review_state(&[Pending, Pending]), Pending);
    }

    #[test]
    fn all_approved_promotes_section() {
        assert_eq!(derive_section_review_state(&[Approved, Approved]), Approved);
    }

    #[test]
    fn partial_approval_is_in_review() {
        assert_eq!(derive_section_review_state(&[Approved, Pending]), InReview);
        assert_eq!(derive_section_review_state(&[InReview, Pending]), InReview);
    }

    #[test]
    fn changes_requested_dominates_everything() {
        assert_eq!(
            derive_section_review_state(&[Approved, ChangesRequested, Approved]),
            ChangesRequested
        );
    }
}

//! Outcome computation over a collection of tagged dice.
//!
//! Natural 1s and 6s are criticals, immune to modification: a kept 6 always
//! succeeds and a kept 1 always fails (horror 1s tracked separately). Every
//! other kept die is compared against the success threshold after penalty
//! and result modifier, clamped back into the 1..=6 face range.

use serde::{Deserialize, Serialize};

use super::dice::DieRoll;

/// Parameters needed to resolve a dice collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeParams {
    /// Displayed face value that counts as a success for non-natural dice.
    pub success_on: u32,
    /// Per-die face reduction.
    pub penalty: u32,
    /// Displayed-face delta.
    pub result_modifier: i32,
    /// Successes required for overall success.
    pub successes_needed: u32,
}

/// The resolved result of a dice collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    /// Successes among kept dice.
    pub success_count: u32,
    /// Failures among kept dice (natural 1s on regular dice plus non-natural
    /// dice under the threshold).
    pub failure_count: u32,
    /// Natural 1s among kept horror dice, tracked separately for their
    /// narrative weight.
    pub horror_failure_count: u32,
    /// True if `success_count >= successes_needed`.
    pub is_success: bool,
    /// The finalized dice, dropped dice included, with displayed faces set.
    pub dice: Vec<DieRoll>,
}

/// Mark dropped dice per advantage/disadvantage.
///
/// Among not-yet-dropped dice, advantage drops the lowest natural face and
/// disadvantage the highest; ties resolve to the first matching die in roll
/// order. Both can apply to one roll, dropping two different dice, unless
/// only one die exists.
pub fn apply_advantage_drop(dice: &mut [DieRoll], advantage: bool, disadvantage: bool) {
    if advantage {
        if let Some(idx) = pick_drop_index(dice, true) {
            dice[idx].is_dropped = true;
        }
    }
    if disadvantage {
        if let Some(idx) = pick_drop_index(dice, false) {
            dice[idx].is_dropped = true;
        }
    }
}

/// Index of the lowest (or highest) not-yet-dropped die, first in roll order
/// on ties.
fn pick_drop_index(dice: &[DieRoll], lowest: bool) -> Option<usize> {
    let target = dice
        .iter()
        .filter(|d| !d.is_dropped)
        .map(|d| d.raw)
        .reduce(|a, b| if lowest { a.min(b) } else { a.max(b) })?;
    dice.iter().position(|d| !d.is_dropped && d.raw == target)
}

/// The displayed face for a die: naturals stay put, everything else takes
/// the penalty and result modifier, clamped into 1..=6.
fn displayed_face(die: &DieRoll, params: &OutcomeParams) -> u32 {
    if die.is_natural() {
        die.raw
    } else {
        (die.raw as i32 - params.penalty as i32 + params.result_modifier).clamp(1, 6) as u32
    }
}

/// Resolve a dice collection into success/failure counts.
///
/// Displayed faces are computed for every die, dropped ones included, for
/// transparency; only kept dice contribute to the counts.
pub fn compute_outcome(mut dice: Vec<DieRoll>, params: &OutcomeParams) -> RollOutcome {
    for die in &mut dice {
        die.displayed = displayed_face(die, params);
    }

    let kept = || dice.iter().filter(|d| d.is_kept());

    let mut success_count = kept().filter(|d| d.is_natural_six()).count() as u32;
    let mut failure_count = kept()
        .filter(|d| d.is_natural_one() && !d.is_horror)
        .count() as u32;
    let horror_failure_count = kept()
        .filter(|d| d.is_natural_one() && d.is_horror)
        .count() as u32;

    for die in kept().filter(|d| !d.is_natural()) {
        if die.displayed >= params.success_on {
            success_count += 1;
        } else {
            failure_count += 1;
        }
    }

    RollOutcome {
        success_count,
        failure_count,
        horror_failure_count,
        is_success: success_count >= params.successes_needed,
        dice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::dice::tag_results;

    fn params(success_on: u32, penalty: u32, result_modifier: i32, needed: u32) -> OutcomeParams {
        OutcomeParams {
            success_on,
            penalty,
            result_modifier,
            successes_needed: needed,
        }
    }

    #[test]
    fn natural_faces_bypass_modifiers() {
        // Kept faces [6,1,3,3], last die horror, penalty 1, success on 4.
        let dice = tag_results(&[6, 1, 3], &[3]);
        let outcome = compute_outcome(dice, &params(4, 1, 0, 1));
        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.failure_count, 3);
        assert_eq!(outcome.horror_failure_count, 0);
        assert!(outcome.is_success);
        assert_eq!(outcome.dice[0].displayed, 6);
        assert_eq!(outcome.dice[1].displayed, 1);
        assert_eq!(outcome.dice[2].displayed, 2);
        assert_eq!(outcome.dice[3].displayed, 2);
    }

    #[test]
    fn horror_natural_ones_tracked_separately() {
        let dice = tag_results(&[1], &[1, 1]);
        let outcome = compute_outcome(dice, &params(4, 0, 0, 1));
        assert_eq!(outcome.failure_count, 1);
        assert_eq!(outcome.horror_failure_count, 2);
        assert!(!outcome.is_success);
    }

    #[test]
    fn displayed_face_clamped_to_die_range() {
        let dice = tag_results(&[2, 5], &[]);
        let outcome = compute_outcome(dice, &params(3, 9, 0, 0));
        assert_eq!(outcome.dice[0].displayed, 1);
        assert_eq!(outcome.dice[1].displayed, 1);

        let dice = tag_results(&[2, 5], &[]);
        let outcome = compute_outcome(dice, &params(3, 0, 9, 0));
        assert_eq!(outcome.dice[0].displayed, 6);
        assert_eq!(outcome.dice[1].displayed, 6);
    }

    #[test]
    fn result_modifier_lifts_faces_over_threshold() {
        let dice = tag_results(&[3, 3], &[]);
        let outcome = compute_outcome(dice, &params(4, 0, 1, 2));
        assert_eq!(outcome.success_count, 2);
        assert!(outcome.is_success);
    }

    #[test]
    fn advantage_drops_lowest_die() {
        let mut dice = tag_results(&[2, 5, 6], &[]);
        apply_advantage_drop(&mut dice, true, false);
        assert!(dice[0].is_dropped);
        assert!(!dice[1].is_dropped);
        assert!(!dice[2].is_dropped);

        let outcome = compute_outcome(dice, &params(4, 0, 0, 1));
        // Dropped 2 contributes to neither successes nor failures.
        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.failure_count, 0);
    }

    #[test]
    fn disadvantage_drops_highest_die() {
        let mut dice = tag_results(&[2, 5, 6], &[]);
        apply_advantage_drop(&mut dice, false, true);
        assert!(dice[2].is_dropped);
    }

    #[test]
    fn both_drop_two_different_dice() {
        let mut dice = tag_results(&[2, 5, 6], &[]);
        apply_advantage_drop(&mut dice, true, true);
        assert!(dice[0].is_dropped);
        assert!(dice[2].is_dropped);
        assert!(!dice[1].is_dropped);
    }

    #[test]
    fn single_die_only_dropped_once() {
        let mut dice = tag_results(&[4], &[]);
        apply_advantage_drop(&mut dice, true, true);
        assert!(dice[0].is_dropped);
        let outcome = compute_outcome(dice, &params(4, 0, 0, 1));
        assert_eq!(outcome.success_count, 0);
        assert_eq!(outcome.failure_count, 0);
    }

    #[test]
    fn ties_resolve_to_first_in_roll_order() {
        let mut dice = tag_results(&[3, 3, 3], &[]);
        apply_advantage_drop(&mut dice, true, true);
        assert!(dice[0].is_dropped);
        assert!(dice[1].is_dropped);
        assert!(!dice[2].is_dropped);
    }

    #[test]
    fn dropped_dice_keep_displayed_faces() {
        let mut dice = tag_results(&[2, 6], &[]);
        apply_advantage_drop(&mut dice, true, false);
        let outcome = compute_outcome(dice, &params(4, 1, 0, 1));
        assert!(outcome.dice[0].is_dropped);
        assert_eq!(outcome.dice[0].displayed, 1);
    }

    #[test]
    fn overall_success_against_needed() {
        let dice = tag_results(&[6, 6, 2], &[]);
        let outcome = compute_outcome(dice, &params(5, 0, 0, 2));
        assert_eq!(outcome.success_count, 2);
        assert!(outcome.is_success);

        let dice = tag_results(&[6, 2, 2], &[]);
        let outcome = compute_outcome(dice, &params(5, 0, 0, 2));
        assert!(!outcome.is_success);
    }

    #[test]
    fn zero_needed_always_succeeds() {
        let outcome = compute_outcome(Vec::new(), &params(4, 0, 0, 0));
        assert!(outcome.is_success);
        assert_eq!(outcome.success_count, 0);
    }

    #[test]
    fn replay_reproduces_counts() {
        // Round-trip property: replaying a finalized collection through the
        // computer with the same parameters reproduces the same counts.
        let p = params(4, 1, 1, 2);
        let mut dice = tag_results(&[6, 4, 1, 3], &[1, 5]);
        apply_advantage_drop(&mut dice, true, false);
        let first = compute_outcome(dice, &p);
        let second = compute_outcome(first.dice.clone(), &p);
        assert_eq!(first.success_count, second.success_count);
        assert_eq!(first.failure_count, second.failure_count);
        assert_eq!(first.horror_failure_count, second.horror_failure_count);
        assert_eq!(first.is_success, second.is_success);
    }
}

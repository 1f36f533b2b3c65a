//! Dice pool ledger: snapshots and maintenance operations.
//!
//! A [`PoolSnapshot`] is always derived fresh from the character so that
//! every spend and plan sees the latest committed state. The maintenance
//! operations (adjust, set, refresh) preserve the pool's horror composition
//! and keep every field inside the pool invariant.

use serde::{Deserialize, Serialize};
use vb_core::Character;

use crate::record::{ChatRecord, RecordPayload, RecordSink};

/// A freshly derived view of a character's dice pool resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Dice currently available.
    pub pool_value: u32,
    /// The character's horror level (caps horror dice in the pool).
    pub horror_limit: u32,
    /// Horror dice currently available.
    pub available_horror: u32,
    /// Regular dice currently available.
    pub available_regular: u32,
}

impl PoolSnapshot {
    /// Capture the current resource bounds. Never cached.
    pub fn capture(ch: &Character) -> Self {
        Self::with_pool(ch, ch.dicepool.value)
    }

    /// Capture resource bounds against an explicit pool value, used when a
    /// request was built against a stale pool display.
    pub fn with_pool(ch: &Character, pool_value: u32) -> Self {
        let horror_limit = ch.horror;
        let available_horror = match ch.dicepool.horror_in_pool {
            Some(stored) => stored.min(pool_value).min(horror_limit),
            None => horror_limit.min(pool_value),
        };
        Self {
            pool_value,
            horror_limit,
            available_horror,
            available_regular: pool_value - available_horror,
        }
    }
}

/// Bounds on the horror portion of a prospective spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorrorSpendBounds {
    /// The fewest horror dice that must be part of the spend.
    pub min_horror: u32,
    /// The most horror dice that can be part of the spend.
    pub max_horror: u32,
    /// The requested horror count clamped into `[min_horror, max_horror]`.
    pub clamped: u32,
}

/// Clamp a requested horror sub-amount for a spend of `dice_to_use` dice.
pub fn horror_spend_bounds(
    snapshot: &PoolSnapshot,
    dice_to_use: u32,
    requested_horror: u32,
) -> HorrorSpendBounds {
    let min_horror = dice_to_use.saturating_sub(snapshot.available_regular);
    let max_horror = snapshot.available_horror.min(dice_to_use);
    let min_horror = min_horror.min(max_horror);
    HorrorSpendBounds {
        min_horror,
        max_horror,
        clamped: requested_horror.clamp(min_horror, max_horror),
    }
}

/// Before/after view of a pool value change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolChange {
    /// Pool value before the change.
    pub old_value: u32,
    /// Pool value after the change.
    pub new_value: u32,
    /// Horror dice in the pool before the change.
    pub old_horror_in_pool: u32,
    /// Horror dice in the pool after the change.
    pub new_horror_in_pool: u32,
}

/// Before/after view of a damage change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageChange {
    /// Damage before the change.
    pub old_damage: u32,
    /// Damage after the change.
    pub new_damage: u32,
}

/// Before/after view of a horror level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorrorChange {
    /// Horror level before the change.
    pub old_horror: u32,
    /// Horror level after the change.
    pub new_horror: u32,
    /// Horror dice in the pool before the change.
    pub old_horror_in_pool: u32,
    /// Horror dice in the pool after the change.
    pub new_horror_in_pool: u32,
}

/// The result of refreshing a dice pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    /// Damage before the refresh.
    pub old_damage: u32,
    /// Damage after the refresh.
    pub new_damage: u32,
    /// Damage healed by the refresh.
    pub healed_damage: u32,
    /// Pool value before the refresh.
    pub old_value: u32,
    /// Pool value after the refresh.
    pub new_value: u32,
    /// Horror dice in the pool before the refresh.
    pub old_horror_in_pool: u32,
    /// Horror dice in the pool after the refresh.
    pub new_horror_in_pool: u32,
}

/// Resolve the horror composition after the pool value moves to `next`.
///
/// Decreases preserve the existing composition as far as it fits; increases
/// refill horror dice first, up to the horror limit.
fn horror_after_value_change(ch: &Character, next: u32) -> u32 {
    let snapshot = PoolSnapshot::capture(ch);
    let prev_horror = snapshot.available_horror;
    let max_horror_at_next = snapshot.horror_limit.min(next);

    if next <= snapshot.pool_value {
        return prev_horror.min(max_horror_at_next);
    }

    let added = next - snapshot.pool_value;
    let missing_horror = max_horror_at_next.saturating_sub(prev_horror);
    (prev_horror + added.min(missing_horror)).min(max_horror_at_next)
}

/// Adjust damage by a delta, clamped into `0..=max`. The pool is re-clamped
/// against the new effective ceiling.
pub fn adjust_damage(ch: &mut Character, delta: i32) -> DamageChange {
    let old_damage = ch.damage;
    let next = (old_damage as i64 + delta as i64).clamp(0, ch.dicepool.max as i64) as u32;
    ch.damage = next;
    ch.recalc();
    DamageChange {
        old_damage,
        new_damage: next,
    }
}

/// Adjust the horror level by a delta, clamped into `0..=max`. Horror dice
/// already in the pool are clamped down to the new level.
pub fn adjust_horror(ch: &mut Character, delta: i32) -> HorrorChange {
    let snapshot = PoolSnapshot::capture(ch);
    let old_horror = ch.horror;
    let next = (old_horror as i64 + delta as i64).clamp(0, ch.dicepool.max as i64) as u32;
    let next_in_pool = snapshot
        .available_horror
        .min(next)
        .min(snapshot.pool_value);

    ch.horror = next;
    ch.dicepool.horror_in_pool = Some(next_in_pool);
    ch.recalc();

    HorrorChange {
        old_horror,
        new_horror: next,
        old_horror_in_pool: snapshot.available_horror,
        new_horror_in_pool: next_in_pool,
    }
}

/// Adjust the pool value by a delta, clamped into `0..=present_max`.
pub fn adjust_value(ch: &mut Character, delta: i32) -> PoolChange {
    let snapshot = PoolSnapshot::capture(ch);
    let next =
        (snapshot.pool_value as i64 + delta as i64).clamp(0, ch.present_max() as i64) as u32;
    commit_value(ch, snapshot, next)
}

/// Set the pool value directly, clamped into `0..=present_max`.
pub fn set_value(ch: &mut Character, value: u32) -> PoolChange {
    let snapshot = PoolSnapshot::capture(ch);
    let next = value.min(ch.present_max());
    commit_value(ch, snapshot, next)
}

fn commit_value(ch: &mut Character, before: PoolSnapshot, next: u32) -> PoolChange {
    let next_horror = horror_after_value_change(ch, next);
    ch.dicepool.value = next;
    ch.dicepool.horror_in_pool = Some(next_horror);
    ch.recalc();
    PoolChange {
        old_value: before.pool_value,
        new_value: next,
        old_horror_in_pool: before.available_horror,
        new_horror_in_pool: next_horror,
    }
}

/// Refresh the pool to its effective ceiling, optionally healing all damage.
///
/// The refreshed pool's horror composition is refilled to
/// `min(horror_limit, new_value)`.
pub fn refresh(ch: &mut Character, heal_damage: bool) -> RefreshOutcome {
    let old_damage = ch.damage;
    let snapshot = PoolSnapshot::capture(ch);

    let new_damage = if heal_damage { 0 } else { old_damage };
    let new_value = ch.dicepool.max.saturating_sub(new_damage);
    let new_horror_in_pool = ch.horror.min(new_value);

    ch.damage = new_damage;
    ch.dicepool.value = new_value;
    ch.dicepool.horror_in_pool = Some(new_horror_in_pool);
    ch.recalc();

    RefreshOutcome {
        old_damage,
        new_damage,
        healed_damage: old_damage - new_damage,
        old_value: snapshot.pool_value,
        new_value,
        old_horror_in_pool: snapshot.available_horror,
        new_horror_in_pool,
    }
}

/// Refresh the pool and publish the change as a pool record.
pub fn refresh_and_post(
    ch: &mut Character,
    heal_damage: bool,
    sink: &mut dyn RecordSink,
) -> RefreshOutcome {
    let outcome = refresh(ch, heal_damage);
    sink.publish(ChatRecord::new(ch.id, RecordPayload::Refresh(outcome)));
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vb_core::Character;

    use crate::record::{MemoryRecordStore, RollCategory};

    fn character(value: u32, max: u32, horror: u32, horror_in_pool: Option<u32>) -> Character {
        let mut ch = Character::new("Edwin Price");
        ch.dicepool.value = value;
        ch.dicepool.max = max;
        ch.horror = horror;
        ch.dicepool.horror_in_pool = horror_in_pool;
        ch
    }

    #[test]
    fn snapshot_with_stored_horror() {
        let ch = character(4, 6, 3, Some(1));
        let snap = PoolSnapshot::capture(&ch);
        assert_eq!(snap.pool_value, 4);
        assert_eq!(snap.horror_limit, 3);
        assert_eq!(snap.available_horror, 1);
        assert_eq!(snap.available_regular, 3);
    }

    #[test]
    fn snapshot_derives_missing_horror() {
        let ch = character(4, 6, 3, None);
        let snap = PoolSnapshot::capture(&ch);
        assert_eq!(snap.available_horror, 3);
        assert_eq!(snap.available_regular, 1);
    }

    #[test]
    fn snapshot_clamps_oversized_stored_horror() {
        let ch = character(2, 6, 3, Some(5));
        let snap = PoolSnapshot::capture(&ch);
        assert_eq!(snap.available_horror, 2);
        assert_eq!(snap.available_regular, 0);
    }

    #[test]
    fn horror_bounds_clamp_selection() {
        let ch = character(5, 6, 2, Some(2));
        let snap = PoolSnapshot::capture(&ch);
        // Spending 4 of 5 dice: 3 regular available, so at least 1 horror.
        let bounds = horror_spend_bounds(&snap, 4, 0);
        assert_eq!(bounds.min_horror, 1);
        assert_eq!(bounds.max_horror, 2);
        assert_eq!(bounds.clamped, 1);
        let bounds = horror_spend_bounds(&snap, 4, 9);
        assert_eq!(bounds.clamped, 2);
    }

    #[test]
    fn adjust_value_decrease_preserves_composition() {
        let mut ch = character(5, 6, 3, Some(2));
        let change = adjust_value(&mut ch, -2);
        assert_eq!(change.new_value, 3);
        assert_eq!(change.new_horror_in_pool, 2);
    }

    #[test]
    fn adjust_value_increase_refills_horror_first() {
        let mut ch = character(2, 6, 3, Some(1));
        let change = adjust_value(&mut ch, 3);
        assert_eq!(change.new_value, 5);
        // Horror refills to its limit of 3 before regular dice come back.
        assert_eq!(change.new_horror_in_pool, 3);
    }

    #[test]
    fn adjust_value_clamped_by_damage() {
        let mut ch = character(2, 6, 0, Some(0));
        ch.damage = 3;
        let change = adjust_value(&mut ch, 10);
        assert_eq!(change.new_value, 3);
    }

    #[test]
    fn set_value_caps_at_present_max() {
        let mut ch = character(1, 6, 0, Some(0));
        ch.damage = 2;
        let change = set_value(&mut ch, 9);
        assert_eq!(change.new_value, 4);
    }

    #[test]
    fn adjust_horror_clamps_pool_composition() {
        let mut ch = character(4, 6, 3, Some(3));
        let change = adjust_horror(&mut ch, -2);
        assert_eq!(change.new_horror, 1);
        assert_eq!(change.new_horror_in_pool, 1);
    }

    #[test]
    fn adjust_damage_shrinks_pool() {
        let mut ch = character(6, 6, 0, Some(0));
        let change = adjust_damage(&mut ch, 2);
        assert_eq!(change.new_damage, 2);
        assert_eq!(ch.dicepool.value, 4);
    }

    #[test]
    fn refresh_restores_pool_and_horror() {
        let mut ch = character(1, 6, 2, Some(0));
        ch.damage = 2;
        let outcome = refresh(&mut ch, false);
        assert_eq!(outcome.new_value, 4);
        assert_eq!(outcome.new_horror_in_pool, 2);
        assert_eq!(outcome.healed_damage, 0);
        assert_eq!(ch.damage, 2);
    }

    #[test]
    fn refresh_with_heal_clears_damage() {
        let mut ch = character(1, 6, 0, Some(0));
        ch.damage = 2;
        let outcome = refresh(&mut ch, true);
        assert_eq!(outcome.new_damage, 0);
        assert_eq!(outcome.healed_damage, 2);
        assert_eq!(outcome.new_value, 6);
        assert_eq!(ch.damage, 0);
    }

    #[test]
    fn refresh_and_post_publishes_pool_record() {
        let mut ch = character(1, 6, 0, Some(0));
        ch.damage = 1;
        let mut store = MemoryRecordStore::new();
        let outcome = refresh_and_post(&mut ch, false, &mut store);
        assert_eq!(outcome.new_value, 5);
        assert_eq!(store.len(), 1);
        assert_eq!(store.last().unwrap().category(), RollCategory::Dicepool);
    }

    proptest! {
        #[test]
        fn maintenance_ops_preserve_invariant(
            value in 0u32..10,
            max in 0u32..10,
            horror in 0u32..10,
            stored in proptest::option::of(0u32..10),
            delta in -10i32..10,
            op in 0u8..5,
        ) {
            let mut ch = character(value, max, horror, stored);
            ch.recalc();
            match op {
                0 => { adjust_value(&mut ch, delta); }
                1 => { adjust_damage(&mut ch, delta); }
                2 => { adjust_horror(&mut ch, delta); }
                3 => { set_value(&mut ch, delta.unsigned_abs()); }
                _ => { refresh(&mut ch, delta % 2 == 0); }
            }
            let hip = ch.dicepool.horror_in_pool.unwrap();
            prop_assert!(ch.dicepool.value <= ch.present_max());
            prop_assert!(hip <= ch.dicepool.value);
            prop_assert!(hip <= ch.horror);
        }
    }
}

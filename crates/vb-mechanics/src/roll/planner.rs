//! Roll requests and the pure planning step.
//!
//! Planning converts a character's chosen dice plus bonus and
//! advantage/disadvantage modifiers into a concrete allocation of normal and
//! horror dice. It is a pure function of the request and a pool snapshot.

use serde::{Deserialize, Serialize};
use vb_core::item::ItemId;
use vb_core::{Character, RollKind, Skill};

use crate::error::{EngineError, EngineResult};
use crate::pool::PoolSnapshot;

/// An immutable, per-invocation description of a requested roll.
///
/// Constructed once (usually via a
/// [`RollRequestBuilder`](crate::session::RollRequestBuilder)), validated,
/// and passed by value into the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRequest {
    /// The skill being tested.
    pub skill: Skill,
    /// The skill's current rating; becomes the success threshold.
    pub skill_current: u32,
    /// The context of the roll.
    pub kind: RollKind,
    /// Pool dice the character chose to spend on this roll.
    pub dice_to_use: u32,
    /// Per-die face reduction.
    pub penalty: u32,
    /// Extra dice rolled for free alongside the pool dice.
    pub bonus_dice: u32,
    /// Delta applied to each non-natural die's displayed face.
    pub result_modifier: i32,
    /// Roll with advantage.
    pub advantage: bool,
    /// Roll with disadvantage.
    pub disadvantage: bool,
    /// Successes required for the roll to succeed overall.
    pub successes_needed: u32,
    /// Weapon attached to this roll, if any.
    pub weapon: Option<ItemId>,
    /// Spell attached to this roll, if any.
    pub spell: Option<ItemId>,
    /// Knacks the player selected to modify this roll.
    pub knacks: Vec<ItemId>,
}

impl RollRequest {
    /// A bare request for a complex roll of the given skill.
    pub fn new(skill: Skill, skill_current: u32) -> Self {
        Self {
            skill,
            skill_current,
            kind: RollKind::Complex,
            dice_to_use: 0,
            penalty: 0,
            bonus_dice: 0,
            result_modifier: 0,
            advantage: false,
            disadvantage: false,
            successes_needed: 0,
            weapon: None,
            spell: None,
            knacks: Vec::new(),
        }
    }
}

/// The concrete dice allocation derived from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollPlan {
    /// Displayed face value that counts as a success for non-natural dice.
    pub success_on: u32,
    /// Pool dice that will be debited.
    pub dice_to_use: u32,
    /// Normal dice to roll (pool allocation plus bonus and extra dice).
    pub dice_to_roll: u32,
    /// Horror dice to roll.
    pub horror_dice_to_roll: u32,
    /// Per-die face reduction, applied at display time.
    pub penalty: u32,
    /// Bonus dice included in `dice_to_roll`.
    pub bonus_dice: u32,
    /// Displayed-face delta for non-natural dice.
    pub result_modifier: i32,
    /// Whether the roll has advantage.
    pub advantage: bool,
    /// Whether the roll has disadvantage.
    pub disadvantage: bool,
}

/// Validate a request against the character before rolling.
///
/// Reactions must use exactly one pool die; advantage/disadvantage requires
/// at least one die; at least one die must be rolled; a weapon that tracks
/// ammunition must have ammo left.
pub fn validate_request(ch: &Character, request: &RollRequest) -> EngineResult<()> {
    if request.kind == RollKind::Reaction && request.dice_to_use != 1 {
        return Err(EngineError::ReactionRequiresOneDie);
    }

    let base_dice = request.dice_to_use + request.bonus_dice;
    if base_dice == 0 {
        if request.advantage || request.disadvantage {
            return Err(EngineError::AdvantageRequiresDice);
        }
        return Err(EngineError::NoDiceRequested);
    }

    if let Some(weapon_id) = request.weapon {
        let weapon = ch
            .weapon(weapon_id)
            .map_err(|_| EngineError::UnknownWeapon(weapon_id))?;
        if weapon.ammunition.tracks_ammo() && weapon.ammunition.current == 0 {
            return Err(EngineError::WeaponOutOfAmmo(weapon_id));
        }
    }

    if let Some(spell_id) = request.spell {
        ch.spell(spell_id)
            .map_err(|_| EngineError::UnknownSpell(spell_id))?;
    }

    Ok(())
}

/// Plan a roll against a pool snapshot. Pure; no side effects.
///
/// Allocation: when the horror level covers the whole pool, every requested
/// die is horror. Otherwise normal dice are drawn first, up to
/// `pool_value - horror_limit`, and the remainder spills into horror. Bonus
/// dice always join the normal batch. Advantage adds one die
/// unconditionally; disadvantage adds one only if any die would otherwise be
/// rolled.
pub fn plan_roll(snapshot: &PoolSnapshot, request: &RollRequest) -> RollPlan {
    let (mut dice_to_roll, horror_dice_to_roll) = if snapshot.horror_limit >= snapshot.pool_value
    {
        (0, request.dice_to_use)
    } else {
        let normal_dice = snapshot.pool_value - snapshot.horror_limit;
        if normal_dice >= request.dice_to_use {
            (request.dice_to_use, 0)
        } else {
            (normal_dice, request.dice_to_use - normal_dice)
        }
    };

    dice_to_roll += request.bonus_dice;

    if request.advantage {
        dice_to_roll += 1;
    }
    if request.disadvantage && dice_to_roll + horror_dice_to_roll > 0 {
        dice_to_roll += 1;
    }

    RollPlan {
        // The success threshold is the raw skill value. The penalty is
        // applied to die faces at display time, never to the threshold;
        // shifting both would double-count it.
        success_on: request.skill_current,
        dice_to_use: request.dice_to_use,
        dice_to_roll,
        horror_dice_to_roll,
        penalty: request.penalty,
        bonus_dice: request.bonus_dice,
        result_modifier: request.result_modifier,
        advantage: request.advantage,
        disadvantage: request.disadvantage,
    }
}

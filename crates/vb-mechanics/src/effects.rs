//! Composition of situational modifiers from knacks and injuries.
//!
//! Knacks contribute additive deltas (bonus dice, result modifier,
//! advantage/disadvantage, reroll allowance) when selected and applicable.
//! Injuries contribute flat penalties automatically; duplicates sharing a
//! source identity are grouped and never stack.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vb_core::item::{Frequency, ItemId, Knack};
use vb_core::{Character, RollKind, Skill};

use crate::error::{EngineError, EngineResult};

/// Echo of one knack applied to a completed roll, stored on the published
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedKnack {
    /// The knack's item ID.
    pub knack: ItemId,
    /// Display name at roll time.
    pub name: String,
    /// Knack tier.
    pub tier: u32,
    /// Usage frequency.
    pub frequency: Frequency,
    /// True if applying the knack consumed one of its uses.
    pub spent: bool,
    /// Bonus dice this knack contributed.
    pub bonus_dice: u32,
    /// Result modifier this knack contributed.
    pub result_modifier: i32,
    /// Whether this knack granted advantage.
    pub advantage: bool,
    /// Whether this knack imposed disadvantage.
    pub disadvantage: bool,
    /// Reroll allowance this knack contributed.
    pub reroll_allowance: u32,
}

/// The combined deltas of every selected knack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDelta {
    /// Summed bonus dice.
    pub bonus_dice: u32,
    /// Summed result modifier.
    pub result_modifier: i32,
    /// OR of the advantage flags.
    pub advantage: bool,
    /// OR of the disadvantage flags.
    pub disadvantage: bool,
    /// Summed reroll allowance. Informational only; not auto-enforced.
    pub reroll_allowance: u32,
    /// Per-knack echo for the published record.
    pub applied: Vec<AppliedKnack>,
}

/// Knacks whose roll effects match the roll, regardless of remaining uses.
///
/// Use this to show exhausted-but-applicable knacks; selection validation
/// goes through [`applicable_knacks`].
pub fn matching_knacks(ch: &Character, skill: Skill, kind: RollKind) -> Vec<&Knack> {
    ch.knacks
        .iter()
        .filter(|k| k.applies_to(skill, kind))
        .collect()
}

/// Knacks that match the roll and can be used right now.
pub fn applicable_knacks(ch: &Character, skill: Skill, kind: RollKind) -> Vec<&Knack> {
    matching_knacks(ch, skill, kind)
        .into_iter()
        .filter(|k| k.usable_now())
        .collect()
}

/// Re-validate a knack selection against current applicability.
///
/// Stale selections (after a skill switch, or a use exhausted since
/// selection) are rejected outright rather than silently dropped.
pub fn validate_knack_selection<'a>(
    ch: &'a Character,
    skill: Skill,
    kind: RollKind,
    selected: &[ItemId],
) -> EngineResult<Vec<&'a Knack>> {
    selected
        .iter()
        .map(|&id| {
            let knack = ch.knack(id).map_err(|_| EngineError::UnknownKnack(id))?;
            if knack.applies_to(skill, kind) && knack.usable_now() {
                Ok(knack)
            } else {
                Err(EngineError::StaleKnackSelection(id))
            }
        })
        .collect()
}

/// Sum the deltas of the selected knacks.
pub fn compose_effects(selected: &[&Knack]) -> EffectDelta {
    let mut delta = EffectDelta::default();

    for knack in selected {
        let modifier = knack
            .roll_effects
            .as_ref()
            .map(|e| e.modifier)
            .unwrap_or_default();

        delta.bonus_dice += modifier.bonus_dice;
        delta.result_modifier += modifier.result_modifier;
        delta.advantage |= modifier.advantage;
        delta.disadvantage |= modifier.disadvantage;
        delta.reroll_allowance += modifier.reroll_allowance;

        delta.applied.push(AppliedKnack {
            knack: knack.id,
            name: knack.name.clone(),
            tier: knack.tier,
            frequency: knack.usage.frequency,
            spent: knack.usage.frequency.is_limited(),
            bonus_dice: modifier.bonus_dice,
            result_modifier: modifier.result_modifier,
            advantage: modifier.advantage,
            disadvantage: modifier.disadvantage,
            reroll_allowance: modifier.reroll_allowance,
        });
    }

    delta
}

/// Decrement the remaining-use counter of each selected limited knack,
/// floored at zero. Called strictly after the roll has executed
/// successfully. Returns how many knacks were updated.
pub fn spend_knack_uses(ch: &mut Character, selected: &[ItemId]) -> u32 {
    let mut updated = 0;
    for &id in selected {
        let Ok(knack) = ch.knack_mut(id) else {
            continue;
        };
        if !knack.usage.frequency.is_limited() || knack.usage.remaining == 0 {
            continue;
        }
        knack.usage.remaining -= 1;
        updated += 1;
    }
    updated
}

/// One injury identity group contributing a penalty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryImpactEntry {
    /// Display name of the group.
    pub name: String,
    /// Instances in the group.
    pub count: u32,
    /// The penalty the group contributes (its maximum, once).
    pub penalty: u32,
}

/// Injury penalties applying to one roll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryImpact {
    /// Total penalty across groups.
    pub penalty: u32,
    /// Contributing groups, sorted by name.
    pub entries: Vec<InjuryImpactEntry>,
}

/// Compute the injury penalty for a roll.
///
/// Injuries are grouped by identity; a group whose members apply to this
/// roll contributes its maximum single penalty exactly once.
pub fn injury_impact(ch: &Character, skill: Skill, kind: RollKind) -> InjuryImpact {
    let mut groups: BTreeMap<String, Vec<&vb_core::item::Injury>> = BTreeMap::new();
    for injury in ch.injuries.iter().filter(|i| i.active) {
        groups.entry(injury.identity_key()).or_default().push(injury);
    }

    let mut impact = InjuryImpact::default();
    for group in groups.values() {
        let matching: Vec<_> = group
            .iter()
            .filter(|i| i.applies_to(skill, kind))
            .collect();
        if matching.is_empty() {
            continue;
        }
        let penalty = matching.iter().map(|i| i.penalty()).max().unwrap_or(0);
        if penalty == 0 {
            continue;
        }
        impact.penalty += penalty;
        impact.entries.push(InjuryImpactEntry {
            name: group[0].name.clone(),
            count: group.len() as u32,
            penalty,
        });
    }

    impact.entries.sort_by(|a, b| a.name.cmp(&b.name));
    impact
}

/// Count of active injuries, the default modifier for an injury roll.
pub fn active_injury_count(ch: &Character) -> u32 {
    ch.injuries.iter().filter(|i| i.active).count() as u32
}

/// Count of active traumas with the roll-modifier flag enabled, the default
/// modifier for a trauma roll.
pub fn trauma_roll_modifier(ch: &Character) -> u32 {
    ch.traumas
        .iter()
        .filter(|t| t.active && t.roll_modifier)
        .count() as u32
}

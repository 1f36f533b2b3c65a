//! Weapons: attack context and ammunition bookkeeping for skill rolls.

use serde::{Deserialize, Serialize};

use super::ItemId;
use crate::skill::Skill;

/// Ammunition state and consumption policy for a weapon.
///
/// A `max` of 0 means the weapon does not track ammunition at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ammunition {
    /// Magazine capacity; 0 disables ammo tracking.
    pub max: u32,
    /// Rounds currently loaded.
    pub current: u32,
    /// Weapon property: every use empties the magazine.
    pub reload_after_usage: bool,
    /// Weapon property: every use consumes one round.
    pub decrease_after_usage: bool,
}

impl Ammunition {
    /// Returns true if this weapon tracks ammunition.
    pub fn tracks_ammo(&self) -> bool {
        self.max > 0
    }
}

/// A weapon usable in skill rolls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    /// Unique item ID.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// The skill used to attack with this weapon.
    pub skill: Skill,
    /// Damage dealt on a successful use.
    pub damage: u32,
    /// Successes needed to inflict an injury; 0 means the weapon never does.
    pub injury_rating: u32,
    /// Free-form special rules text.
    pub special_rules: String,
    /// Ammunition state.
    pub ammunition: Ammunition,
}

impl Weapon {
    /// Create a melee weapon with no ammo tracking.
    pub fn new(name: impl Into<String>, skill: Skill, damage: u32) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            skill,
            damage,
            injury_rating: 0,
            special_rules: String::new(),
            ammunition: Ammunition::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untracked_ammo_by_default() {
        let weapon = Weapon::new("Crowbar", Skill::MeleeCombat, 2);
        assert!(!weapon.ammunition.tracks_ammo());
    }

    #[test]
    fn tracked_ammo() {
        let mut weapon = Weapon::new("Revolver", Skill::RangedCombat, 3);
        weapon.ammunition = Ammunition {
            max: 6,
            current: 6,
            ..Ammunition::default()
        };
        assert!(weapon.ammunition.tracks_ammo());
    }
}

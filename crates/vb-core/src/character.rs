//! Character entities and dice pool state.
//!
//! The dice pool is the character's central resource: `value` dice are
//! available now, `max` bounds the pool before damage, and `horror_in_pool`
//! tracks how many of the available dice are horror dice. All three are
//! re-clamped whenever derived data is recalculated.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::item::{Injury, ItemId, Knack, Spell, Trauma, Weapon};
use crate::skill::SkillBlock;

/// Unique identifier for a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    /// Generate a new random character ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Whether an entity is a player character or an NPC. Selects which
/// injury/trauma resolution tables apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorCategory {
    /// A player character.
    Character,
    /// A non-player character.
    Npc,
}

/// Persisted dice pool state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DicePoolState {
    /// Dice currently available.
    pub value: u32,
    /// Pool ceiling before damage reduction.
    pub max: u32,
    /// How many of `value` are horror dice. `None` means "derive from the
    /// default composition" (as many horror dice as the horror level allows).
    pub horror_in_pool: Option<u32>,
}

impl Default for DicePoolState {
    fn default() -> Self {
        Self {
            value: 0,
            max: 6,
            horror_in_pool: None,
        }
    }
}

/// One display slot of the prepared dice pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSlot {
    /// 1-based slot index.
    pub index: u32,
    /// True if this slot's die has been spent.
    pub used: bool,
    /// True if this slot holds a horror die.
    pub horror: bool,
}

/// A character entity owning a dice pool, skills, and items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Unique ID.
    pub id: CharacterId,
    /// Display name.
    pub name: String,
    /// Player character or NPC.
    pub category: ActorCategory,
    /// The dice pool.
    pub dicepool: DicePoolState,
    /// Damage taken; reduces the effective pool ceiling.
    pub damage: u32,
    /// Horror level; caps how many pool dice can be horror dice.
    pub horror: u32,
    /// Skill ratings.
    pub skills: SkillBlock,
    /// Knacks owned by this character.
    pub knacks: Vec<Knack>,
    /// Injuries on this character.
    pub injuries: Vec<Injury>,
    /// Traumas on this character.
    pub traumas: Vec<Trauma>,
    /// Weapons carried by this character.
    pub weapons: Vec<Weapon>,
    /// Spells known by this character.
    pub spells: Vec<Spell>,
}

impl Character {
    /// Create a character with an empty pool and no items.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            category: ActorCategory::Character,
            dicepool: DicePoolState::default(),
            damage: 0,
            horror: 0,
            skills: SkillBlock::default(),
            knacks: Vec::new(),
            injuries: Vec::new(),
            traumas: Vec::new(),
            weapons: Vec::new(),
            spells: Vec::new(),
        }
    }

    /// The effective pool ceiling after damage: `max(0, max - damage)`.
    /// Derived, never persisted.
    pub fn present_max(&self) -> u32 {
        self.dicepool.max.saturating_sub(self.damage)
    }

    /// Re-clamp the dice pool after any change to `damage`, `horror`, or the
    /// pool fields themselves.
    ///
    /// `value` is capped at [`Character::present_max`]; `horror_in_pool` is
    /// resolved from storage (or the default composition) and clamped into
    /// `0..=min(value, horror)`.
    pub fn recalc(&mut self) {
        let present_max = self.present_max();
        self.dicepool.value = self.dicepool.value.min(present_max);

        let fallback = self.horror.min(self.dicepool.value);
        let effective = self.dicepool.horror_in_pool.unwrap_or(fallback);
        self.dicepool.horror_in_pool = Some(effective.min(self.dicepool.value).min(self.horror));
    }

    /// The prepared per-slot view of the pool, up to `present_max` slots.
    ///
    /// Active slots reflect the actual in-pool composition; used slots
    /// attribute spent horror capacity first.
    pub fn pool_slots(&self) -> Vec<PoolSlot> {
        let present_max = self.present_max();
        let value = self.dicepool.value.min(present_max);

        let fallback = self.horror.min(value);
        let stored = self.dicepool.horror_in_pool.unwrap_or(fallback);
        let active_horror = stored.min(value).min(self.horror);

        let horror_slots = self.horror.min(present_max);
        let spent_horror = horror_slots.saturating_sub(active_horror);

        (1..=present_max)
            .map(|index| {
                let used = index > value;
                let horror = if used {
                    index - value <= spent_horror
                } else {
                    index <= active_horror
                };
                PoolSlot {
                    index,
                    used,
                    horror,
                }
            })
            .collect()
    }

    /// Look up a weapon by ID.
    pub fn weapon(&self, id: ItemId) -> CoreResult<&Weapon> {
        self.weapons
            .iter()
            .find(|w| w.id == id)
            .ok_or(CoreError::ItemNotFound(id))
    }

    /// Look up a weapon by ID, mutably.
    pub fn weapon_mut(&mut self, id: ItemId) -> CoreResult<&mut Weapon> {
        self.weapons
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(CoreError::ItemNotFound(id))
    }

    /// Look up a spell by ID.
    pub fn spell(&self, id: ItemId) -> CoreResult<&Spell> {
        self.spells
            .iter()
            .find(|s| s.id == id)
            .ok_or(CoreError::ItemNotFound(id))
    }

    /// Look up a knack by ID.
    pub fn knack(&self, id: ItemId) -> CoreResult<&Knack> {
        self.knacks
            .iter()
            .find(|k| k.id == id)
            .ok_or(CoreError::ItemNotFound(id))
    }

    /// Look up a knack by ID, mutably.
    pub fn knack_mut(&mut self, id: ItemId) -> CoreResult<&mut Knack> {
        self.knacks
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or(CoreError::ItemNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn character(value: u32, max: u32, damage: u32, horror: u32) -> Character {
        let mut ch = Character::new("Mina Hargrove");
        ch.dicepool.value = value;
        ch.dicepool.max = max;
        ch.damage = damage;
        ch.horror = horror;
        ch
    }

    #[test]
    fn present_max_subtracts_damage() {
        let ch = character(6, 6, 2, 0);
        assert_eq!(ch.present_max(), 4);
    }

    #[test]
    fn present_max_floors_at_zero() {
        let ch = character(6, 6, 9, 0);
        assert_eq!(ch.present_max(), 0);
    }

    #[test]
    fn recalc_caps_value_at_present_max() {
        let mut ch = character(6, 6, 2, 0);
        ch.recalc();
        assert_eq!(ch.dicepool.value, 4);
    }

    #[test]
    fn recalc_derives_missing_horror_composition() {
        let mut ch = character(5, 6, 0, 3);
        ch.recalc();
        assert_eq!(ch.dicepool.horror_in_pool, Some(3));
    }

    #[test]
    fn recalc_clamps_stored_horror() {
        let mut ch = character(2, 6, 0, 3);
        ch.dicepool.horror_in_pool = Some(5);
        ch.recalc();
        assert_eq!(ch.dicepool.horror_in_pool, Some(2));
    }

    #[test]
    fn pool_slots_active_composition() {
        let mut ch = character(4, 6, 0, 2);
        ch.dicepool.horror_in_pool = Some(1);
        let slots = ch.pool_slots();
        assert_eq!(slots.len(), 6);
        // One active horror die, then three active regular dice.
        assert!(slots[0].horror && !slots[0].used);
        assert!(!slots[1].horror && !slots[1].used);
        assert!(!slots[3].used);
        // Spent horror capacity is attributed to the first used slot.
        assert!(slots[4].used && slots[4].horror);
        assert!(slots[5].used && !slots[5].horror);
    }

    #[test]
    fn pool_slots_respect_damage() {
        let ch = character(2, 6, 3, 0);
        assert_eq!(ch.pool_slots().len(), 3);
    }

    #[test]
    fn item_lookup_errors_on_unknown_id() {
        let ch = Character::new("Mina Hargrove");
        assert!(ch.weapon(ItemId::new()).is_err());
        assert!(ch.spell(ItemId::new()).is_err());
        assert!(ch.knack(ItemId::new()).is_err());
    }

    #[test]
    fn serde_round_trip() {
        let mut ch = character(4, 6, 1, 2);
        ch.dicepool.horror_in_pool = Some(2);
        let json = serde_json::to_string(&ch).unwrap();
        let back: Character = serde_json::from_str(&json).unwrap();
        assert_eq!(back.dicepool, ch.dicepool);
        assert_eq!(back.id, ch.id);
    }

    proptest! {
        #[test]
        fn recalc_establishes_pool_invariant(
            value in 0u32..20,
            max in 0u32..12,
            damage in 0u32..12,
            horror in 0u32..12,
            stored in proptest::option::of(0u32..20),
        ) {
            let mut ch = character(value, max, damage, horror);
            ch.dicepool.horror_in_pool = stored;
            ch.recalc();

            let hip = ch.dicepool.horror_in_pool.unwrap();
            prop_assert!(ch.dicepool.value <= ch.present_max());
            prop_assert!(hip <= ch.dicepool.value);
            prop_assert!(hip <= ch.horror);
        }
    }
}

//! In-progress roll request builders, keyed per character and purpose.
//!
//! A [`RollRequestBuilder`] replaces ad-hoc shared dialog state: the
//! presentation layer mutates a builder while gathering parameters, then
//! seals it into an immutable [`RollRequest`] that is passed by value into
//! the workflow. Builders are held in a [`RollSessions`] map keyed by
//! `(character, purpose)` so concurrent dialogs never leak into each other.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use vb_core::item::ItemId;
use vb_core::{Character, CharacterId, RollKind, Skill};

use crate::error::{EngineError, EngineResult};
use crate::roll::RollRequest;

/// Advantage/disadvantage as a single selector, mirroring how the choice is
/// presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdvantageSelector {
    /// Neither.
    #[default]
    None,
    /// Advantage only.
    Advantage,
    /// Disadvantage only.
    Disadvantage,
    /// Both at once.
    Both,
}

impl AdvantageSelector {
    fn flags(self) -> (bool, bool) {
        match self {
            Self::None => (false, false),
            Self::Advantage => (true, false),
            Self::Disadvantage => (false, true),
            Self::Both => (true, true),
        }
    }
}

/// Key identifying one in-progress request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    /// The character the request is for.
    pub character: CharacterId,
    /// The roll kind being prepared.
    pub purpose: RollKind,
}

/// A mutable builder for one roll request.
///
/// Snapshots the skill rating and pool value at open time; transient
/// modifiers reset whenever the session is reopened.
#[derive(Debug, Clone)]
pub struct RollRequestBuilder {
    skill: Skill,
    skill_current: u32,
    pool_value: u32,
    kind: RollKind,
    dice_to_use: u32,
    penalty: u32,
    bonus_dice: u32,
    result_modifier: i32,
    successes_needed: u32,
    selector: AdvantageSelector,
    weapon: Option<ItemId>,
    spell: Option<ItemId>,
    knacks: Vec<ItemId>,
}

impl RollRequestBuilder {
    /// Open a builder for a skill roll, snapshotting the character's current
    /// rating and pool. Reactions preset their single pool die.
    pub fn open(ch: &Character, skill: Skill, kind: RollKind) -> Self {
        let dice_to_use = if kind == RollKind::Reaction && ch.dicepool.value > 0 {
            1
        } else {
            0
        };
        Self {
            skill,
            skill_current: ch.skills.rating(skill).current,
            pool_value: ch.dicepool.value,
            kind,
            dice_to_use,
            penalty: 0,
            bonus_dice: 0,
            result_modifier: 0,
            successes_needed: 0,
            selector: AdvantageSelector::None,
            weapon: None,
            spell: None,
            knacks: Vec::new(),
        }
    }

    /// Open a builder for an attack with a weapon. The weapon's skill drives
    /// the roll; a weapon that tracks ammunition must have ammo left.
    pub fn with_weapon(ch: &Character, weapon_id: ItemId) -> EngineResult<Self> {
        let weapon = ch
            .weapon(weapon_id)
            .map_err(|_| EngineError::UnknownWeapon(weapon_id))?;
        if weapon.ammunition.tracks_ammo() && weapon.ammunition.current == 0 {
            return Err(EngineError::WeaponOutOfAmmo(weapon_id));
        }
        let mut builder = Self::open(ch, weapon.skill, RollKind::Complex);
        builder.weapon = Some(weapon_id);
        Ok(builder)
    }

    /// Open a builder for casting a spell. The spell's skill drives the roll
    /// and its difficulty presets the successes needed.
    pub fn with_spell(ch: &Character, spell_id: ItemId) -> EngineResult<Self> {
        let spell = ch
            .spell(spell_id)
            .map_err(|_| EngineError::UnknownSpell(spell_id))?;
        let mut builder = Self::open(ch, spell.skill, RollKind::Complex);
        builder.spell = Some(spell_id);
        builder.successes_needed = spell.difficulty;
        Ok(builder)
    }

    /// Switch the tested skill, re-snapshotting its rating.
    pub fn switch_skill(&mut self, ch: &Character, skill: Skill) -> &mut Self {
        self.skill = skill;
        self.skill_current = ch.skills.rating(skill).current;
        self
    }

    /// Set the pool dice to spend, clamped into `0..=pool`. Reactions ignore
    /// this; their cost is fixed.
    pub fn dice_to_use(&mut self, dice: u32) -> &mut Self {
        if self.kind != RollKind::Reaction {
            self.dice_to_use = dice.min(self.pool_value);
        }
        self
    }

    /// Set the penalty.
    pub fn penalty(&mut self, penalty: u32) -> &mut Self {
        self.penalty = penalty;
        self
    }

    /// Set the bonus dice.
    pub fn bonus_dice(&mut self, bonus: u32) -> &mut Self {
        self.bonus_dice = bonus;
        self
    }

    /// Set the result modifier.
    pub fn result_modifier(&mut self, modifier: i32) -> &mut Self {
        self.result_modifier = modifier;
        self
    }

    /// Set the successes needed.
    pub fn successes_needed(&mut self, needed: u32) -> &mut Self {
        self.successes_needed = needed;
        self
    }

    /// Set advantage/disadvantage.
    pub fn advantage(&mut self, selector: AdvantageSelector) -> &mut Self {
        self.selector = selector;
        self
    }

    /// Select the knacks to apply.
    pub fn select_knacks(&mut self, knacks: Vec<ItemId>) -> &mut Self {
        self.knacks = knacks;
        self
    }

    /// Seal the builder into an immutable request.
    pub fn build(&self) -> RollRequest {
        let (advantage, disadvantage) = self.selector.flags();
        RollRequest {
            skill: self.skill,
            skill_current: self.skill_current,
            kind: self.kind,
            dice_to_use: self.dice_to_use,
            penalty: self.penalty,
            bonus_dice: self.bonus_dice,
            result_modifier: self.result_modifier,
            advantage,
            disadvantage,
            successes_needed: self.successes_needed,
            weapon: self.weapon,
            spell: self.spell,
            knacks: self.knacks.clone(),
        }
    }
}

/// The set of in-progress request builders, keyed by character and purpose.
#[derive(Debug, Default)]
pub struct RollSessions {
    sessions: HashMap<SessionKey, RollRequestBuilder>,
}

impl RollSessions {
    /// Create an empty session map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or reopen) the session for a character and purpose. Reopening
    /// re-snapshots the character and resets transient modifiers.
    pub fn open(
        &mut self,
        ch: &Character,
        skill: Skill,
        kind: RollKind,
    ) -> &mut RollRequestBuilder {
        let key = SessionKey {
            character: ch.id,
            purpose: kind,
        };
        let builder = RollRequestBuilder::open(ch, skill, kind);
        match self.sessions.entry(key) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(builder);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(builder),
        }
    }

    /// The in-progress builder for a key, if one is open.
    pub fn get_mut(&mut self, key: SessionKey) -> Option<&mut RollRequestBuilder> {
        self.sessions.get_mut(&key)
    }

    /// Remove and return the builder for a key, ending the session.
    pub fn take(&mut self, key: SessionKey) -> Option<RollRequestBuilder> {
        self.sessions.remove(&key)
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True if no session is open.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vb_core::item::{Ammunition, Spell, Weapon};

    fn character() -> Character {
        let mut ch = Character::new("Vera Okafor");
        ch.dicepool.value = 4;
        ch.dicepool.max = 6;
        ch.skills.rating_mut(Skill::Lore).current = 4;
        ch.skills.rating_mut(Skill::RangedCombat).current = 3;
        ch
    }

    #[test]
    fn builder_snapshots_skill_and_pool() {
        let ch = character();
        let request = RollRequestBuilder::open(&ch, Skill::Lore, RollKind::Complex)
            .dice_to_use(2)
            .build();
        assert_eq!(request.skill_current, 4);
        assert_eq!(request.dice_to_use, 2);
        assert_eq!(request.kind, RollKind::Complex);
    }

    #[test]
    fn dice_to_use_clamped_to_pool() {
        let ch = character();
        let request = RollRequestBuilder::open(&ch, Skill::Lore, RollKind::Complex)
            .dice_to_use(9)
            .build();
        assert_eq!(request.dice_to_use, 4);
    }

    #[test]
    fn reaction_cost_is_locked() {
        let ch = character();
        let request = RollRequestBuilder::open(&ch, Skill::Agility, RollKind::Reaction)
            .dice_to_use(3)
            .build();
        assert_eq!(request.dice_to_use, 1);
    }

    #[test]
    fn reaction_with_empty_pool_presets_zero() {
        let mut ch = character();
        ch.dicepool.value = 0;
        let request = RollRequestBuilder::open(&ch, Skill::Agility, RollKind::Reaction).build();
        assert_eq!(request.dice_to_use, 0);
    }

    #[test]
    fn advantage_selector_maps_to_flags() {
        let ch = character();
        let request = RollRequestBuilder::open(&ch, Skill::Lore, RollKind::Complex)
            .advantage(AdvantageSelector::Both)
            .build();
        assert!(request.advantage);
        assert!(request.disadvantage);
    }

    #[test]
    fn skill_switch_resnapshots_rating() {
        let ch = character();
        let mut builder = RollRequestBuilder::open(&ch, Skill::Lore, RollKind::Complex);
        builder.switch_skill(&ch, Skill::RangedCombat);
        assert_eq!(builder.build().skill_current, 3);
    }

    #[test]
    fn weapon_builder_uses_weapon_skill() {
        let mut ch = character();
        let weapon = Weapon::new("Revolver", Skill::RangedCombat, 3);
        let weapon_id = weapon.id;
        ch.weapons.push(weapon);

        let request = RollRequestBuilder::with_weapon(&ch, weapon_id)
            .unwrap()
            .build();
        assert_eq!(request.skill, Skill::RangedCombat);
        assert_eq!(request.weapon, Some(weapon_id));
    }

    #[test]
    fn weapon_builder_rejects_empty_magazine() {
        let mut ch = character();
        let mut weapon = Weapon::new("Revolver", Skill::RangedCombat, 3);
        weapon.ammunition = Ammunition {
            max: 6,
            current: 0,
            ..Ammunition::default()
        };
        let weapon_id = weapon.id;
        ch.weapons.push(weapon);

        assert!(matches!(
            RollRequestBuilder::with_weapon(&ch, weapon_id),
            Err(EngineError::WeaponOutOfAmmo(_))
        ));
    }

    #[test]
    fn spell_builder_presets_difficulty() {
        let mut ch = character();
        let spell = Spell::new("Ward of Dust", 2);
        let spell_id = spell.id;
        ch.spells.push(spell);

        let request = RollRequestBuilder::with_spell(&ch, spell_id).unwrap().build();
        assert_eq!(request.successes_needed, 2);
        assert_eq!(request.skill, Skill::Lore);
        assert_eq!(request.spell, Some(spell_id));
    }

    #[test]
    fn sessions_keyed_by_character_and_purpose() {
        let ch = character();
        let other = character();
        let mut sessions = RollSessions::new();
        sessions.open(&ch, Skill::Lore, RollKind::Complex);
        sessions.open(&ch, Skill::Agility, RollKind::Reaction);
        sessions.open(&other, Skill::Lore, RollKind::Complex);
        assert_eq!(sessions.len(), 3);

        let key = SessionKey {
            character: ch.id,
            purpose: RollKind::Complex,
        };
        assert!(sessions.get_mut(key).is_some());
        assert!(sessions.take(key).is_some());
        assert_eq!(sessions.len(), 2);
        assert!(sessions.take(key).is_none());
    }

    #[test]
    fn reopening_resets_transients() {
        let ch = character();
        let mut sessions = RollSessions::new();
        sessions
            .open(&ch, Skill::Lore, RollKind::Complex)
            .dice_to_use(3)
            .penalty(2);
        let request = sessions.open(&ch, Skill::Lore, RollKind::Complex).build();
        assert_eq!(request.dice_to_use, 0);
        assert_eq!(request.penalty, 0);
    }
}

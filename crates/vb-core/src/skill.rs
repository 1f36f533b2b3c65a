//! Skill identifiers, ratings, and roll kinds.
//!
//! Skills form a closed set so that an unknown skill key is unrepresentable:
//! every lookup on a [`SkillBlock`] is total.

use serde::{Deserialize, Serialize};

/// A character skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Skill {
    /// Dodging, balance, fine motor control.
    Agility,
    /// Running, climbing, swimming, feats of strength.
    Athletics,
    /// Perception, quick thinking, street smarts.
    Wits,
    /// Charm, persuasion, intimidation.
    Presence,
    /// Gut feelings and reading people.
    Intuition,
    /// Academic learning and research.
    Knowledge,
    /// Willpower and composure under stress.
    Resolve,
    /// Close-quarters fighting.
    MeleeCombat,
    /// Firearms and thrown weapons.
    RangedCombat,
    /// Forbidden and esoteric knowledge.
    Lore,
}

impl Skill {
    /// All skills, in sheet order.
    pub const ALL: [Skill; 10] = [
        Self::Agility,
        Self::Athletics,
        Self::Wits,
        Self::Presence,
        Self::Intuition,
        Self::Knowledge,
        Self::Resolve,
        Self::MeleeCombat,
        Self::RangedCombat,
        Self::Lore,
    ];

    /// The canonical key for this skill.
    pub fn key(self) -> &'static str {
        match self {
            Self::Agility => "agility",
            Self::Athletics => "athletics",
            Self::Wits => "wits",
            Self::Presence => "presence",
            Self::Intuition => "intuition",
            Self::Knowledge => "knowledge",
            Self::Resolve => "resolve",
            Self::MeleeCombat => "meleeCombat",
            Self::RangedCombat => "rangedCombat",
            Self::Lore => "lore",
        }
    }

    /// Parse a skill from its canonical key (case-insensitive).
    pub fn from_key(key: &str) -> Option<Self> {
        let lower = key.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.key().to_lowercase() == lower)
    }
}

impl std::fmt::Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// The context a roll is made in, used to match applicable modifier effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RollKind {
    /// A standard skill check.
    Complex,
    /// A reaction roll costing exactly one pool die.
    Reaction,
    /// Deciphering a tome.
    TomeUnderstand,
    /// Attuning to a tome.
    TomeAttune,
}

impl RollKind {
    /// The base kind this kind is a variant of.
    ///
    /// Tome rolls are mechanically complex skill checks and match effects
    /// configured for [`RollKind::Complex`].
    pub fn base(self) -> Self {
        match self {
            Self::TomeUnderstand | Self::TomeAttune => Self::Complex,
            other => other,
        }
    }

    /// Returns true if this kind is a tome-roll variant.
    pub fn is_tome(self) -> bool {
        matches!(self, Self::TomeUnderstand | Self::TomeAttune)
    }
}

impl std::fmt::Display for RollKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complex => write!(f, "complex"),
            Self::Reaction => write!(f, "reaction"),
            Self::TomeUnderstand => write!(f, "tome-understand"),
            Self::TomeAttune => write!(f, "tome-attune"),
        }
    }
}

/// A skill's current and maximum rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRating {
    /// Current rating, used as the success threshold for rolls.
    pub current: u32,
    /// Maximum rating the skill can be restored to.
    pub max: u32,
}

impl SkillRating {
    /// Create a rating with `current == max`.
    pub fn new(value: u32) -> Self {
        Self {
            current: value,
            max: value,
        }
    }
}

/// The full set of skill ratings on a character sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillBlock {
    /// Agility rating.
    pub agility: SkillRating,
    /// Athletics rating.
    pub athletics: SkillRating,
    /// Wits rating.
    pub wits: SkillRating,
    /// Presence rating.
    pub presence: SkillRating,
    /// Intuition rating.
    pub intuition: SkillRating,
    /// Knowledge rating.
    pub knowledge: SkillRating,
    /// Resolve rating.
    pub resolve: SkillRating,
    /// Melee combat rating.
    pub melee_combat: SkillRating,
    /// Ranged combat rating.
    pub ranged_combat: SkillRating,
    /// Lore rating.
    pub lore: SkillRating,
}

impl SkillBlock {
    /// Get the rating for a skill.
    pub fn rating(&self, skill: Skill) -> SkillRating {
        match skill {
            Skill::Agility => self.agility,
            Skill::Athletics => self.athletics,
            Skill::Wits => self.wits,
            Skill::Presence => self.presence,
            Skill::Intuition => self.intuition,
            Skill::Knowledge => self.knowledge,
            Skill::Resolve => self.resolve,
            Skill::MeleeCombat => self.melee_combat,
            Skill::RangedCombat => self.ranged_combat,
            Skill::Lore => self.lore,
        }
    }

    /// Get a mutable reference to the rating for a skill.
    pub fn rating_mut(&mut self, skill: Skill) -> &mut SkillRating {
        match skill {
            Skill::Agility => &mut self.agility,
            Skill::Athletics => &mut self.athletics,
            Skill::Wits => &mut self.wits,
            Skill::Presence => &mut self.presence,
            Skill::Intuition => &mut self.intuition,
            Skill::Knowledge => &mut self.knowledge,
            Skill::Resolve => &mut self.resolve,
            Skill::MeleeCombat => &mut self.melee_combat,
            Skill::RangedCombat => &mut self.ranged_combat,
            Skill::Lore => &mut self.lore,
        }
    }
}

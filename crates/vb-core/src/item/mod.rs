//! Item types owned by a character.
//!
//! Knacks contribute roll modifiers, injuries contribute penalties, traumas
//! feed the trauma roll, weapons and spells attach context to skill rolls.

pub mod injury;
pub mod knack;
pub mod spell;
pub mod trauma;
pub mod weapon;

pub use injury::{Injury, InjuryRollEffects};
pub use knack::{Frequency, Knack, KnackModifier, KnackRollEffects, Usage};
pub use spell::Spell;
pub use trauma::Trauma;
pub use weapon::{Ammunition, Weapon};

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::skill::{RollKind, Skill};

/// Unique identifier for an item owned by a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Generate a new random item ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Which skills an effect applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillSelection {
    /// Applies to every skill.
    Any,
    /// Applies only to the listed skills.
    Listed(Vec<Skill>),
}

impl SkillSelection {
    /// Returns true if this selection covers the given skill.
    pub fn matches(&self, skill: Skill) -> bool {
        match self {
            Self::Any => true,
            Self::Listed(skills) => skills.contains(&skill),
        }
    }
}

/// Which roll kinds an effect applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindSelection {
    /// Applies to every roll kind.
    Any,
    /// Applies only to the listed kinds.
    Listed(Vec<RollKind>),
}

impl KindSelection {
    /// Returns true if this selection covers the given roll kind.
    ///
    /// Variants of a base kind (tome rolls) also match a selection listing
    /// the base kind, so an effect configured for complex rolls applies to
    /// tome rolls as well.
    pub fn matches(&self, kind: RollKind) -> bool {
        match self {
            Self::Any => true,
            Self::Listed(kinds) => {
                kinds.contains(&kind) || (kind.base() != kind && kinds.contains(&kind.base()))
            }
        }
    }
}

/// The skill and roll-kind scope of a roll effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollApplicability {
    /// Skills the effect applies to.
    pub skills: SkillSelection,
    /// Roll kinds the effect applies to.
    pub kinds: KindSelection,
}

impl RollApplicability {
    /// An applicability that matches every roll.
    pub fn any() -> Self {
        Self {
            skills: SkillSelection::Any,
            kinds: KindSelection::Any,
        }
    }

    /// Returns true if the effect applies to a roll of the given skill and kind.
    pub fn matches(&self, skill: Skill, kind: RollKind) -> bool {
        self.skills.matches(skill) && self.kinds.matches(kind)
    }
}

impl Default for RollApplicability {
    fn default() -> Self {
        Self::any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_everything() {
        let app = RollApplicability::any();
        for skill in Skill::ALL {
            assert!(app.matches(skill, RollKind::Complex));
            assert!(app.matches(skill, RollKind::Reaction));
        }
    }

    #[test]
    fn listed_skills_restrict() {
        let app = RollApplicability {
            skills: SkillSelection::Listed(vec![Skill::Lore, Skill::Knowledge]),
            kinds: KindSelection::Any,
        };
        assert!(app.matches(Skill::Lore, RollKind::Complex));
        assert!(!app.matches(Skill::Agility, RollKind::Complex));
    }

    #[test]
    fn tome_kind_matches_complex_selection() {
        let app = RollApplicability {
            skills: SkillSelection::Any,
            kinds: KindSelection::Listed(vec![RollKind::Complex]),
        };
        assert!(app.matches(Skill::Lore, RollKind::TomeUnderstand));
        assert!(app.matches(Skill::Lore, RollKind::TomeAttune));
        assert!(!app.matches(Skill::Lore, RollKind::Reaction));
    }

    #[test]
    fn explicit_tome_selection_still_works() {
        let app = RollApplicability {
            skills: SkillSelection::Any,
            kinds: KindSelection::Listed(vec![RollKind::TomeAttune]),
        };
        assert!(app.matches(Skill::Lore, RollKind::TomeAttune));
        assert!(!app.matches(Skill::Lore, RollKind::TomeUnderstand));
        assert!(!app.matches(Skill::Lore, RollKind::Complex));
    }

    #[test]
    fn empty_listed_matches_nothing() {
        let app = RollApplicability {
            skills: SkillSelection::Listed(Vec::new()),
            kinds: KindSelection::Any,
        };
        assert!(!app.matches(Skill::Lore, RollKind::Complex));
    }

    #[test]
    fn item_id_display_is_short() {
        let id = ItemId::new();
        assert_eq!(id.to_string().len(), 8);
    }
}

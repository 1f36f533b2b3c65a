//! Spells: casting context for skill rolls.

use serde::{Deserialize, Serialize};

use super::ItemId;
use crate::skill::Skill;

/// A spell a character can attempt to cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    /// Unique item ID.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// The skill used to cast this spell.
    pub skill: Skill,
    /// Successes needed for the casting to take effect.
    pub difficulty: u32,
    /// Range in yards; 0 means self or touch.
    pub range: u32,
    /// Free-form special rules text.
    pub special_rules: String,
}

impl Spell {
    /// Create a lore spell with the given difficulty.
    pub fn new(name: impl Into<String>, difficulty: u32) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            skill: Skill::Lore,
            difficulty,
            range: 0,
            special_rules: String::new(),
        }
    }
}

//! Injuries: conditions that penalize matching skill rolls.

use serde::{Deserialize, Serialize};

use super::{ItemId, RollApplicability};
use crate::skill::{RollKind, Skill};

/// An injury's roll effect: where it applies and the penalty it imposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryRollEffects {
    /// Which rolls the penalty applies to.
    pub applicability: RollApplicability,
    /// Per-die face reduction applied by the roll engine.
    pub penalty: u32,
}

/// A lasting injury on a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Injury {
    /// Unique item ID.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Identity of the source this injury was created from. Duplicates
    /// sharing a source are grouped and never stack.
    pub source: Option<String>,
    /// Inactive injuries are ignored entirely.
    pub active: bool,
    /// Roll effect, if the injury penalizes rolls.
    pub roll_effects: Option<InjuryRollEffects>,
}

impl Injury {
    /// Create an active injury with no roll effect.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            source: None,
            active: true,
            roll_effects: None,
        }
    }

    /// The key duplicates are grouped under: the source identity when
    /// present, otherwise the lowercased name.
    pub fn identity_key(&self) -> String {
        match &self.source {
            Some(source) if !source.trim().is_empty() => format!("source:{}", source.trim()),
            _ => format!("name:{}", self.name.trim().to_lowercase()),
        }
    }

    /// Returns true if this injury penalizes the given roll.
    pub fn applies_to(&self, skill: Skill, kind: RollKind) -> bool {
        self.active
            && self
                .roll_effects
                .as_ref()
                .is_some_and(|e| e.applicability.matches(skill, kind))
    }

    /// The penalty this injury contributes, or 0 without a roll effect.
    pub fn penalty(&self) -> u32 {
        self.roll_effects.as_ref().map_or(0, |e| e.penalty)
    }
}

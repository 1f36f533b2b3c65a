//! Knacks: character abilities that can modify skill rolls.

use serde::{Deserialize, Serialize};

use super::{ItemId, RollApplicability};
use crate::skill::{RollKind, Skill};

/// How often a knack can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Frequency {
    /// Always on; never consumes a use.
    Passive,
    /// Once per combat turn.
    OncePerTurn,
    /// Once per scene.
    OncePerScene,
    /// Once per session.
    OncePerSession,
    /// Usable at will; never consumes a use.
    Unlimited,
}

impl Frequency {
    /// Returns true if this frequency tracks a limited number of uses.
    pub fn is_limited(self) -> bool {
        !matches!(self, Self::Passive | Self::Unlimited)
    }
}

/// Usage tracking for a knack. Reset automation is intentionally manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// How often the knack can be used.
    pub frequency: Frequency,
    /// Maximum uses per period.
    pub max: u32,
    /// Uses remaining in the current period.
    pub remaining: u32,
}

impl Default for Usage {
    fn default() -> Self {
        Self {
            frequency: Frequency::Passive,
            max: 0,
            remaining: 0,
        }
    }
}

/// The modifier deltas a knack contributes to a roll it applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnackModifier {
    /// Extra dice added to the normal roll pool, costing nothing.
    pub bonus_dice: u32,
    /// Delta applied to each non-natural die's displayed face.
    pub result_modifier: i32,
    /// Grants advantage on the roll.
    pub advantage: bool,
    /// Imposes disadvantage on the roll.
    pub disadvantage: bool,
    /// Dice the player may reroll afterwards. Recorded on the published
    /// result; enforcement is intentionally deferred.
    pub reroll_allowance: u32,
}

/// A knack's roll effect: where it applies and what it contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnackRollEffects {
    /// Which rolls the effect applies to.
    pub applicability: RollApplicability,
    /// The contributed deltas.
    pub modifier: KnackModifier,
}

/// A character ability that can contribute roll modifiers when selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Knack {
    /// Unique item ID.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Knack tier.
    pub tier: u32,
    /// Usage tracking.
    pub usage: Usage,
    /// Roll effect, if the knack has one.
    pub roll_effects: Option<KnackRollEffects>,
}

impl Knack {
    /// Create a passive knack with no roll effect.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            tier: 0,
            usage: Usage::default(),
            roll_effects: None,
        }
    }

    /// Returns true if this knack's roll effect applies to the given roll.
    pub fn applies_to(&self, skill: Skill, kind: RollKind) -> bool {
        self.roll_effects
            .as_ref()
            .is_some_and(|e| e.applicability.matches(skill, kind))
    }

    /// Returns true if the knack can be used right now.
    ///
    /// Passive and unlimited knacks are always usable; frequency-limited
    /// knacks require at least one remaining use.
    pub fn usable_now(&self) -> bool {
        if self.usage.frequency.is_limited() {
            self.usage.remaining > 0
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{KindSelection, SkillSelection};

    fn limited_knack(remaining: u32) -> Knack {
        Knack {
            usage: Usage {
                frequency: Frequency::OncePerScene,
                max: 1,
                remaining,
            },
            roll_effects: Some(KnackRollEffects {
                applicability: RollApplicability::any(),
                modifier: KnackModifier {
                    bonus_dice: 1,
                    ..KnackModifier::default()
                },
            }),
            ..Knack::new("Steady Hands")
        }
    }

    #[test]
    fn passive_always_usable() {
        let knack = Knack::new("Bookworm");
        assert!(knack.usable_now());
    }

    #[test]
    fn limited_requires_remaining_uses() {
        assert!(limited_knack(1).usable_now());
        assert!(!limited_knack(0).usable_now());
    }

    #[test]
    fn no_roll_effect_never_applies() {
        let knack = Knack::new("Bookworm");
        assert!(!knack.applies_to(Skill::Lore, RollKind::Complex));
    }

    #[test]
    fn applies_respects_applicability() {
        let mut knack = limited_knack(1);
        knack.roll_effects = Some(KnackRollEffects {
            applicability: RollApplicability {
                skills: SkillSelection::Listed(vec![Skill::RangedCombat]),
                kinds: KindSelection::Listed(vec![RollKind::Complex]),
            },
            modifier: KnackModifier::default(),
        });
        assert!(knack.applies_to(Skill::RangedCombat, RollKind::Complex));
        assert!(!knack.applies_to(Skill::MeleeCombat, RollKind::Complex));
        assert!(!knack.applies_to(Skill::RangedCombat, RollKind::Reaction));
    }

    #[test]
    fn frequency_limited_flags() {
        assert!(!Frequency::Passive.is_limited());
        assert!(!Frequency::Unlimited.is_limited());
        assert!(Frequency::OncePerTurn.is_limited());
        assert!(Frequency::OncePerScene.is_limited());
        assert!(Frequency::OncePerSession.is_limited());
    }
}

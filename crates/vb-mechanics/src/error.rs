//! Error types for the mechanics engine.
//!
//! Every rejection a caller can trigger is a reason-coded variant; the engine
//! never fails silently for a player-initiated spend or roll.

use vb_core::item::ItemId;

use crate::record::RecordId;
use crate::spend::SpendReason;

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while planning, executing, or rerolling a roll.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The resource debit backing a roll was rejected; nothing was published.
    #[error("dice pool spend rejected: {0}")]
    SpendRejected(SpendReason),

    /// The caller lacks ownership or an elevated role.
    #[error("permission denied")]
    PermissionDenied,

    /// A selected knack does not exist on this character.
    #[error("knack not found: {0}")]
    UnknownKnack(ItemId),

    /// A selected knack no longer applies to this roll (e.g. after a skill
    /// switch) or has no uses left. The caller must resubmit a corrected
    /// selection.
    #[error("knack selection is no longer applicable: {0}")]
    StaleKnackSelection(ItemId),

    /// The request would roll no dice at all.
    #[error("at least one die must be rolled")]
    NoDiceRequested,

    /// Advantage or disadvantage was selected on a roll with no dice.
    #[error("advantage or disadvantage requires rolling at least one die")]
    AdvantageRequiresDice,

    /// Reaction rolls must use exactly one pool die.
    #[error("reaction rolls use exactly one pool die")]
    ReactionRequiresOneDie,

    /// The referenced weapon does not exist on this character.
    #[error("weapon not found: {0}")]
    UnknownWeapon(ItemId),

    /// The weapon tracks ammunition and has none left.
    #[error("weapon is out of ammunition: {0}")]
    WeaponOutOfAmmo(ItemId),

    /// The referenced spell does not exist on this character.
    #[error("spell not found: {0}")]
    UnknownSpell(ItemId),

    /// The referenced published record does not exist.
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    /// The referenced record is not a rerollable skill roll.
    #[error("record cannot be rerolled: {0}")]
    RecordNotRerollable(RecordId),

    /// The record was published for a different character.
    #[error("record belongs to a different character")]
    RecordCharacterMismatch,

    /// No dice were selected for the reroll.
    #[error("no dice selected for reroll")]
    EmptySelection,

    /// A selected die is locked: it was dropped, or it is a horror die
    /// showing a natural 1.
    #[error("die {0} cannot be rerolled")]
    ForbiddenRerollSelection(usize),

    /// A selected die index does not exist in the record.
    #[error("die index {0} is out of range")]
    InvalidRerollSelection(usize),

    /// Straining requires the character to have taken damage.
    #[error("no damage to strain")]
    NoDamageToStrain,
}

impl EngineError {
    /// The machine-readable reason code for this error, for the
    /// notification layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SpendRejected(reason) => reason.code(),
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::UnknownKnack(_) => "KNACK_NOT_FOUND",
            Self::StaleKnackSelection(_) => "KNACK_SELECTION_STALE",
            Self::NoDiceRequested => "NO_DICE_REQUESTED",
            Self::AdvantageRequiresDice => "ADVANTAGE_REQUIRES_DICE",
            Self::ReactionRequiresOneDie => "REACTION_REQUIRES_ONE_DIE",
            Self::UnknownWeapon(_) => "WEAPON_NOT_FOUND",
            Self::WeaponOutOfAmmo(_) => "WEAPON_OUT_OF_AMMO",
            Self::UnknownSpell(_) => "SPELL_NOT_FOUND",
            Self::RecordNotFound(_) => "RECORD_NOT_FOUND",
            Self::RecordNotRerollable(_) => "RECORD_NOT_REROLLABLE",
            Self::RecordCharacterMismatch => "RECORD_CHARACTER_MISMATCH",
            Self::EmptySelection => "REROLL_SELECTION_EMPTY",
            Self::ForbiddenRerollSelection(_) => "REROLL_DIE_FORBIDDEN",
            Self::InvalidRerollSelection(_) => "REROLL_DIE_OUT_OF_RANGE",
            Self::NoDamageToStrain => "NO_DAMAGE_TO_STRAIN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            EngineError::SpendRejected(SpendReason::InsufficientHorror).code(),
            "INSUFFICIENT_HORROR"
        );
        assert_eq!(EngineError::NoDamageToStrain.code(), "NO_DAMAGE_TO_STRAIN");
        assert_eq!(EngineError::PermissionDenied.code(), "PERMISSION_DENIED");
    }
}

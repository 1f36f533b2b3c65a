//! Published roll records and the notification seam.
//!
//! The engine never renders chat itself: it publishes typed records tagged
//! with a [`RollCategory`] through a [`RecordSink`], and raises reason-coded
//! [`Warning`]s through a [`Notifier`]. A published skill record carries
//! everything needed to reproduce and extend its outcome, so the reroll
//! workflow can operate on it alone.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vb_core::item::ItemId;
use vb_core::{CharacterId, RollKind, Skill};

use crate::effects::AppliedKnack;
use crate::pool::RefreshOutcome;
use crate::roll::DieRoll;
use crate::spend::{DieFlavor, SpendReason};
use crate::tables::TableKind;

/// Unique identifier for a published record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Generate a new random record ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Machine-readable tag classifying a published record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RollCategory {
    /// A resolved skill roll; the only rerollable category.
    Skill,
    /// A simple-action die spend.
    SimpleAction,
    /// A dice pool discard.
    DicepoolDiscard,
    /// A dice pool refresh.
    Dicepool,
    /// An injury or trauma roll.
    InjuryTrauma,
}

/// Why a weapon consumed ammunition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AmmoSpendReason {
    /// Weapon property: the magazine empties after every use.
    ReloadAfterUsage,
    /// Weapon property: one round per use.
    DecreaseAfterUsage,
    /// A kept natural 1 in the final roll expended a round.
    NaturalOne,
}

/// Weapon resolution attached to a skill roll record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponUsage {
    /// The weapon used.
    pub weapon: ItemId,
    /// True if the roll scored at least one success.
    pub usage_success: bool,
    /// Damage dealt (0 on a miss).
    pub damage: u32,
    /// True if the roll met the weapon's injury rating.
    pub inflict_injury: bool,
    /// The weapon's special rules text, passed through for display.
    pub special_rules: String,
    /// Ammunition before the roll.
    pub ammo_old: u32,
    /// Ammunition after the roll.
    pub ammo_new: u32,
    /// Why ammunition was consumed, if it was.
    pub ammo_spend_reason: Option<AmmoSpendReason>,
}

/// Spell resolution attached to a skill roll record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellUsage {
    /// The spell cast.
    pub spell: ItemId,
    /// True if the roll met the spell's difficulty.
    pub usage_success: bool,
    /// The spell's difficulty at roll time.
    pub difficulty: u32,
}

/// The full payload of a published skill roll.
///
/// Round-trips losslessly: replaying `dice` through the outcome computer
/// with the stored parameters reproduces the stored counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRollRecord {
    /// The roll's context.
    pub kind: RollKind,
    /// The skill tested.
    pub skill: Skill,
    /// Success threshold for non-natural dice.
    pub success_on: u32,
    /// Pool dice debited.
    pub dice_to_use: u32,
    /// Horror dice rolled.
    pub horror_dice_rolled: u32,
    /// Penalty applied at display time.
    pub penalty: u32,
    /// Bonus dice rolled for free.
    pub bonus_dice: u32,
    /// Displayed-face delta.
    pub result_modifier: i32,
    /// Successes needed for overall success.
    pub successes_needed: u32,
    /// Rolled with advantage.
    pub advantage: bool,
    /// Rolled with disadvantage.
    pub disadvantage: bool,
    /// The finalized dice collection, dropped dice included.
    pub dice: Vec<DieRoll>,
    /// Successes among kept dice.
    pub success_count: u32,
    /// Failures among kept dice.
    pub failure_count: u32,
    /// Natural 1s among kept horror dice.
    pub horror_failure_count: u32,
    /// Overall success.
    pub is_success: bool,
    /// Pool value before the debit.
    pub old_pool_value: u32,
    /// Pool value after the debit.
    pub new_pool_value: u32,
    /// Weapon resolution, if a weapon was used.
    pub weapon: Option<WeaponUsage>,
    /// Spell resolution, if a spell was cast.
    pub spell: Option<SpellUsage>,
    /// Knacks applied to this roll.
    pub applied_knacks: Vec<AppliedKnack>,
    /// Total reroll allowance granted by applied knacks.
    pub reroll_allowance: u32,
    /// True if this record is a reroll of another.
    pub is_reroll: bool,
    /// The record this one rerolls, if any.
    pub reroll_of: Option<RecordId>,
}

/// Payload of a simple-action die spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleActionRecord {
    /// Which flavor of die was spent.
    pub flavor: DieFlavor,
    /// Pool value before the spend.
    pub old_pool_value: u32,
    /// Pool value after the spend.
    pub new_pool_value: u32,
}

/// Payload of a dice pool discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardRecord {
    /// Dice discarded in total.
    pub amount: u32,
    /// Regular dice among them.
    pub discarded_regular: u32,
    /// Horror dice among them.
    pub discarded_horror: u32,
    /// Pool value before the discard.
    pub old_pool_value: u32,
    /// Pool value after the discard.
    pub new_pool_value: u32,
}

/// Payload of an injury or trauma roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryTraumaRecord {
    /// Injury or trauma.
    pub kind: TableKind,
    /// The die face rolled.
    pub die_result: u32,
    /// The modifier added to the die.
    pub modifier: i32,
    /// The lookup total.
    pub total: u32,
    /// The matched range label, if a table entry matched.
    pub table_range: Option<String>,
    /// The matched result name, if a table entry matched.
    pub table_result: Option<String>,
    /// The matched result description.
    pub table_description: String,
}

/// A record payload, one variant per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "kebab-case")]
pub enum RecordPayload {
    /// A resolved skill roll. Boxed: the payload dwarfs the other variants.
    Skill(Box<SkillRollRecord>),
    /// A simple-action die spend.
    SimpleAction(SimpleActionRecord),
    /// A dice pool discard.
    Discard(DiscardRecord),
    /// A dice pool refresh.
    Refresh(RefreshOutcome),
    /// An injury or trauma roll.
    InjuryTrauma(InjuryTraumaRecord),
}

impl RecordPayload {
    /// The category tag for this payload.
    pub fn category(&self) -> RollCategory {
        match self {
            Self::Skill(_) => RollCategory::Skill,
            Self::SimpleAction(_) => RollCategory::SimpleAction,
            Self::Discard(_) => RollCategory::DicepoolDiscard,
            Self::Refresh(_) => RollCategory::Dicepool,
            Self::InjuryTrauma(_) => RollCategory::InjuryTrauma,
        }
    }

    /// The presentation template this payload renders with.
    pub fn template_key(&self) -> &'static str {
        match self {
            Self::Skill(_) => "chat/roll-result",
            Self::SimpleAction(_) => "chat/simple-action-spend",
            Self::Discard(_) => "chat/dicepool-discard",
            Self::Refresh(_) => "chat/dicepool-reset",
            Self::InjuryTrauma(_) => "chat/injury-trauma-roll-card",
        }
    }
}

/// A published, chat-attached record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    /// Unique record ID.
    pub id: RecordId,
    /// The character the record belongs to.
    pub character: CharacterId,
    /// The payload.
    pub payload: RecordPayload,
}

impl ChatRecord {
    /// Create a record with a fresh ID.
    pub fn new(character: CharacterId, payload: RecordPayload) -> Self {
        Self {
            id: RecordId::new(),
            character,
            payload,
        }
    }

    /// The record's category tag.
    pub fn category(&self) -> RollCategory {
        self.payload.category()
    }
}

/// Where published records go. Once published a record is immutable; a
/// reroll publishes a new record rather than editing the original.
pub trait RecordSink {
    /// Publish a record, returning its ID.
    fn publish(&mut self, record: ChatRecord) -> RecordId;

    /// Load a previously published record.
    fn load(&self, id: RecordId) -> Option<&ChatRecord>;
}

/// An in-memory record store.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Vec<ChatRecord>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records published so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing has been published.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recently published record.
    pub fn last(&self) -> Option<&ChatRecord> {
        self.records.last()
    }
}

impl RecordSink for MemoryRecordStore {
    fn publish(&mut self, record: ChatRecord) -> RecordId {
        let id = record.id;
        self.records.push(record);
        id
    }

    fn load(&self, id: RecordId) -> Option<&ChatRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}

/// A discrete warning signal keyed by reason code. The engine never formats
/// user-facing strings; the notification layer maps codes to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// The resource debit behind a roll failed; nothing was published.
    RollSpendFailed(SpendReason),
    /// The caller may not perform the attempted action.
    PermissionDenied,
    /// Straining requires damage.
    NoDamageToStrain,
    /// The weapon has no ammunition left.
    WeaponOutOfAmmo,
    /// Ammo reconciliation after a reroll was skipped because external state
    /// had moved on.
    AmmoReconciliationSkipped,
}

impl Warning {
    /// The machine-readable reason code.
    pub fn code(self) -> &'static str {
        match self {
            Self::RollSpendFailed(reason) => reason.code(),
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::NoDamageToStrain => "NO_DAMAGE_TO_STRAIN",
            Self::WeaponOutOfAmmo => "WEAPON_OUT_OF_AMMO",
            Self::AmmoReconciliationSkipped => "AMMO_RECONCILIATION_SKIPPED",
        }
    }
}

/// Receives warning signals for display to the user.
pub trait Notifier {
    /// Raise a warning.
    fn warn(&mut self, warning: Warning);
}

/// A notifier that drops every warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn warn(&mut self, _warning: Warning) {}
}

/// A notifier that collects warnings, for tests and batching callers.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    /// The warnings raised so far.
    pub warnings: Vec<Warning>,
}

impl Notifier for CollectingNotifier {
    fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}

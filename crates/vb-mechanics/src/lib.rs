//! Dice pool resource accounting and skill roll resolution for Veilbound.
//!
//! The engine turns a roll request into dice, successes, and resource
//! changes: a ledger snapshots the two-flavored pool (regular and horror
//! dice), a spend executor validates and commits debits, a planner converts
//! requests into dice allocations, an outcome computer applies the
//! natural-face rules, and workflows sequence rolling, debiting, secondary
//! effects, and record publication. A reroll workflow replays published
//! results, and a modifier composer folds in knack and injury effects.

pub mod effects;
pub mod error;
pub mod pool;
pub mod record;
pub mod roll;
pub mod session;
pub mod spend;
pub mod tables;
pub mod workflow;

pub use effects::{AppliedKnack, EffectDelta, InjuryImpact};
pub use error::{EngineError, EngineResult};
pub use pool::{PoolSnapshot, RefreshOutcome};
pub use record::{
    ChatRecord, MemoryRecordStore, Notifier, NullNotifier, RecordId, RecordPayload, RecordSink,
    RollCategory, SkillRollRecord, Warning,
};
pub use roll::{DieRoll, DieSize, NullObserver, RollObserver, RollOutcome, RollPlan, RollRequest};
pub use session::{AdvantageSelector, RollRequestBuilder, RollSessions, SessionKey};
pub use spend::{Caller, SpendContext, SpendOutcome, SpendReason, SpendRequest, SpendSource};
pub use tables::{Diagnostics, ResolutionTable, TableConfig, TableKind, TableRegistry};
pub use workflow::{
    InjuryRollRequest, InjuryRollWorkflow, RerollWorkflow, SkillRollWorkflow, StrainOutcome,
};

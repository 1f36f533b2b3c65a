//! Roll workflows: orchestration from request to published record.
//!
//! Each workflow sequences the pure stages (plan, execute, outcome) around
//! the commit boundary: the resource debit gates publication, so a roll is
//! never shown as resolved while its cost silently fails.

pub mod injury;
pub mod reroll;
pub mod skill;

pub use injury::{InjuryRollOutput, InjuryRollRequest, InjuryRollWorkflow, StrainOutcome};
pub use reroll::{RerollOutput, RerollWorkflow};
pub use skill::{SkillRollOutput, SkillRollWorkflow};

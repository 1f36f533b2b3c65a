//! Core types for Veilbound: characters, dice pools, skills, and items.
//!
//! This crate defines the data model the mechanics engine operates on. It
//! carries no rolling or resource logic of its own; a [`Character`] can be
//! built programmatically or deserialized from JSON.

/// Character entities, dice pool state, and derived-data recalculation.
pub mod character;
/// Error types used throughout the crate.
pub mod error;
/// Item types owned by a character: knacks, injuries, traumas, weapons, spells.
pub mod item;
/// Skill identifiers, ratings, and roll kinds.
pub mod skill;

pub use character::{ActorCategory, Character, CharacterId, DicePoolState, PoolSlot};
pub use error::{CoreError, CoreResult};
pub use item::{ItemId, KindSelection, RollApplicability, SkillSelection};
pub use skill::{RollKind, Skill, SkillBlock, SkillRating};

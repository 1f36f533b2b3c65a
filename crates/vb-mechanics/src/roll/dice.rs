//! Die faces, tagged results, and batch rolling.
//!
//! Normal and horror dice are rolled as two independently visible batches so
//! their provenance survives display and reroll.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// The die used for a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DieSize {
    /// A six-sided die, used for skill rolls.
    D6,
    /// A three-sided die, used for specialized rolls.
    D3,
}

impl DieSize {
    /// Returns the number of faces on this die.
    pub fn faces(self) -> u32 {
        match self {
            Self::D6 => 6,
            Self::D3 => 3,
        }
    }
}

impl std::fmt::Display for DieSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.faces())
    }
}

/// One die of a resolved roll.
///
/// `raw` is the natural face; `displayed` is the face after penalty and
/// result modifier are applied (natural 1s and 6s are never modified).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieRoll {
    /// The natural face rolled.
    pub raw: u32,
    /// The face shown after modifiers.
    pub displayed: u32,
    /// True if this die came from the horror batch.
    pub is_horror: bool,
    /// True if advantage/disadvantage dropped this die from counting.
    pub is_dropped: bool,
}

impl DieRoll {
    /// Create an undropped die showing its natural face.
    pub fn new(raw: u32, is_horror: bool) -> Self {
        Self {
            raw,
            displayed: raw,
            is_horror,
            is_dropped: false,
        }
    }

    /// True if the natural face is a 1.
    pub fn is_natural_one(&self) -> bool {
        self.raw == 1
    }

    /// True if the natural face is a 6.
    pub fn is_natural_six(&self) -> bool {
        self.raw == 6
    }

    /// True if the natural face is a critical, immune to modification.
    pub fn is_natural(&self) -> bool {
        self.is_natural_one() || self.is_natural_six()
    }

    /// True if this die counts toward the outcome.
    pub fn is_kept(&self) -> bool {
        !self.is_dropped
    }
}

/// Roll `count` faces of the given die size.
pub fn roll_faces(rng: &mut StdRng, size: DieSize, count: u32) -> Vec<u32> {
    (0..count)
        .map(|_| rng.random_range(1..=size.faces()))
        .collect()
}

/// Combine normal and horror faces into one ordered, tagged collection.
/// Normal dice come first, preserving batch provenance by flag.
pub fn tag_results(normal: &[u32], horror: &[u32]) -> Vec<DieRoll> {
    normal
        .iter()
        .map(|&raw| DieRoll::new(raw, false))
        .chain(horror.iter().map(|&raw| DieRoll::new(raw, true)))
        .collect()
}

/// A hook notified whenever a batch of dice hits the table, for
/// visualization layers. Notification is fire-and-forget: implementations
/// must not fail, and the engine never waits on them.
pub trait RollObserver {
    /// Called once per rolled batch with the raw faces.
    fn dice_rolled(&mut self, size: DieSize, horror: bool, faces: &[u32]);
}

/// An observer that ignores every roll.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RollObserver for NullObserver {
    fn dice_rolled(&mut self, _size: DieSize, _horror: bool, _faces: &[u32]) {}
}

//! Traumas: mental conditions feeding the trauma roll modifier.

use serde::{Deserialize, Serialize};

use super::ItemId;

/// A lasting trauma on a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trauma {
    /// Unique item ID.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Identity of the source this trauma was created from.
    pub source: Option<String>,
    /// Inactive traumas are ignored entirely.
    pub active: bool,
    /// Whether this trauma contributes +1 to future trauma rolls.
    pub roll_modifier: bool,
}

impl Trauma {
    /// Create an active trauma that does not modify trauma rolls.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            source: None,
            active: true,
            roll_modifier: false,
        }
    }

    /// The key duplicates are grouped under.
    pub fn identity_key(&self) -> String {
        match &self.source {
            Some(source) if !source.trim().is_empty() => format!("source:{}", source.trim()),
            _ => format!("name:{}", self.name.trim().to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let trauma = Trauma::new("Shocked");
        assert!(trauma.active);
        assert!(!trauma.roll_modifier);
        assert_eq!(trauma.identity_key(), "name:shocked");
    }
}

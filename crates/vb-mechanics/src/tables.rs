//! Injury and trauma resolution tables.
//!
//! Tables are looked up by name from a registry configured per actor
//! category (character/NPC) and trauma variant. Built-in tables back every
//! lookup so resolution never dead-ends. Misconfigurations surface as
//! structured [`Diagnostics`] scoped to one resolution call, merged upward
//! by the caller.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vb_core::ActorCategory;

/// Which table family a roll resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Physical injuries.
    Injury,
    /// Mental traumas.
    Trauma,
}

/// Which trauma table variant is in play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TraumaVariant {
    /// The standard trauma table.
    #[default]
    Standard,
    /// The variant without personality-altering results.
    NoPersonality,
}

/// One row of a resolution table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Lowest total matching this row.
    pub min: u32,
    /// Highest total matching this row; `None` means open-ended.
    pub max: Option<u32>,
    /// The result name.
    pub result: String,
    /// Optional longer description.
    pub description: String,
}

impl TableEntry {
    fn contains(&self, total: u32) -> bool {
        total >= self.min && self.max.is_none_or(|max| total <= max)
    }

    fn range_label(&self) -> String {
        match self.max {
            None => format!("{}+", self.min),
            Some(max) if max == self.min => self.min.to_string(),
            Some(max) => format!("{}\u{2013}{}", self.min, max),
        }
    }
}

/// A named lookup table mapping roll totals to results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionTable {
    /// Table name, used as its registry key.
    pub name: String,
    /// Rows, expected in ascending range order.
    pub entries: Vec<TableEntry>,
}

/// A matched table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    /// The matched range, e.g. `5–7` or `11+`.
    pub range_label: String,
    /// The result name.
    pub result: String,
    /// The result description.
    pub description: String,
}

/// A structured diagnostic raised during table resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableDiagnostic {
    /// A configured table name has no table behind it.
    UnknownTable {
        /// The missing table name.
        name: String,
    },
    /// A row matched the total but carries an empty result name.
    MissingResultName {
        /// The table the row belongs to.
        table: String,
        /// The total that matched.
        total: u32,
    },
    /// The total exceeded the table's top range; the single-value top row
    /// was treated as open-ended.
    OverflowTopEntry {
        /// The table that overflowed.
        table: String,
        /// The table's highest bounded total.
        table_max: u32,
        /// The rolled total.
        total: u32,
    },
}

/// Diagnostics collected over one resolution call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<TableDiagnostic>,
}

impl Diagnostics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: TableDiagnostic) {
        self.entries.push(diagnostic);
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The recorded diagnostics.
    pub fn entries(&self) -> &[TableDiagnostic] {
        &self.entries
    }

    /// Absorb another collector's entries.
    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Emit every diagnostic as a tracing warning.
    pub fn log_all(&self) {
        for diagnostic in &self.entries {
            match diagnostic {
                TableDiagnostic::UnknownTable { name } => {
                    tracing::warn!(table = %name, "configured resolution table not found");
                }
                TableDiagnostic::MissingResultName { table, total } => {
                    tracing::warn!(
                        table = %table,
                        total,
                        "table row matched but has an empty result name"
                    );
                }
                TableDiagnostic::OverflowTopEntry {
                    table,
                    table_max,
                    total,
                } => {
                    tracing::warn!(
                        table = %table,
                        table_max,
                        total,
                        "total exceeds table; treating top entry as open-ended"
                    );
                }
            }
        }
    }
}

impl ResolutionTable {
    /// Look up a total, recording diagnostics for misconfigured rows.
    ///
    /// Returns `None` when nothing usable matched, so the caller can fall
    /// through to the next table in its chain.
    pub fn lookup(&self, total: u32, diagnostics: &mut Diagnostics) -> Option<ResolvedEntry> {
        if let Some(entry) = self.entries.iter().find(|e| e.contains(total)) {
            if entry.result.trim().is_empty() {
                diagnostics.push(TableDiagnostic::MissingResultName {
                    table: self.name.clone(),
                    total,
                });
                return None;
            }
            return Some(ResolvedEntry {
                range_label: entry.range_label(),
                result: entry.result.clone(),
                description: entry.description.clone(),
            });
        }

        // Totals above the table: treat a single-value top row as "max+".
        let table_max = self.entries.iter().filter_map(|e| e.max).max()?;
        if total <= table_max {
            return None;
        }
        let top = self
            .entries
            .iter()
            .find(|e| e.min == table_max && e.max == Some(table_max))?;
        if top.result.trim().is_empty() {
            diagnostics.push(TableDiagnostic::MissingResultName {
                table: self.name.clone(),
                total,
            });
            return None;
        }
        diagnostics.push(TableDiagnostic::OverflowTopEntry {
            table: self.name.clone(),
            table_max,
            total,
        });
        Some(ResolvedEntry {
            range_label: format!("{table_max}+"),
            result: top.result.clone(),
            description: top.description.clone(),
        })
    }
}

/// Which named table resolves each (category, kind, variant) combination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Injury table for player characters.
    pub character_injury: Option<String>,
    /// Standard trauma table for player characters.
    pub character_trauma: Option<String>,
    /// No-personality trauma table for player characters.
    pub character_trauma_no_personality: Option<String>,
    /// Injury table for NPCs.
    pub npc_injury: Option<String>,
    /// Trauma table for NPCs.
    pub npc_trauma: Option<String>,
    /// Which trauma variant is in play.
    pub trauma_variant: TraumaVariant,
}

impl TableConfig {
    fn configured_name(&self, category: ActorCategory, kind: TableKind) -> Option<&str> {
        match (category, kind) {
            (ActorCategory::Character, TableKind::Injury) => self.character_injury.as_deref(),
            (ActorCategory::Character, TableKind::Trauma) => match self.trauma_variant {
                TraumaVariant::Standard => self.character_trauma.as_deref(),
                TraumaVariant::NoPersonality => self.character_trauma_no_personality.as_deref(),
            },
            (ActorCategory::Npc, TableKind::Injury) => self.npc_injury.as_deref(),
            (ActorCategory::Npc, TableKind::Trauma) => self.npc_trauma.as_deref(),
        }
    }
}

/// A registry of named resolution tables plus the active configuration.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: HashMap<String, ResolutionTable>,
    /// The active table configuration.
    pub config: TableConfig,
}

impl TableRegistry {
    /// Create an empty registry with the given configuration.
    pub fn new(config: TableConfig) -> Self {
        Self {
            tables: HashMap::new(),
            config,
        }
    }

    /// Register a table under its name, replacing any previous one.
    pub fn insert(&mut self, table: ResolutionTable) {
        self.tables.insert(table.name.clone(), table);
    }

    fn lookup_named(
        &self,
        name: &str,
        total: u32,
        diagnostics: &mut Diagnostics,
    ) -> Option<ResolvedEntry> {
        let Some(table) = self.tables.get(name) else {
            diagnostics.push(TableDiagnostic::UnknownTable {
                name: name.to_string(),
            });
            return None;
        };
        table.lookup(total, diagnostics)
    }

    /// Resolve a roll total for a category and kind.
    ///
    /// Chain: the configured table for the combination, then (for NPCs) the
    /// configured character table, then the built-in fallback. Returns
    /// `None` only when even the built-in table has no matching row.
    pub fn resolve(
        &self,
        category: ActorCategory,
        kind: TableKind,
        total: u32,
        diagnostics: &mut Diagnostics,
    ) -> Option<ResolvedEntry> {
        if let Some(name) = self.config.configured_name(category, kind) {
            if let Some(entry) = self.lookup_named(name, total, diagnostics) {
                return Some(entry);
            }
        }

        if category == ActorCategory::Npc {
            if let Some(name) = self.config.configured_name(ActorCategory::Character, kind) {
                if let Some(entry) = self.lookup_named(name, total, diagnostics) {
                    return Some(entry);
                }
            }
        }

        let builtin = match kind {
            TableKind::Injury => builtin_injury_table(),
            TableKind::Trauma => builtin_trauma_table(self.config.trauma_variant),
        };
        builtin.lookup(total, diagnostics)
    }
}

fn entry(min: u32, max: Option<u32>, result: &str) -> TableEntry {
    TableEntry {
        min,
        max,
        result: result.to_string(),
        description: String::new(),
    }
}

/// The built-in injury table.
pub fn builtin_injury_table() -> ResolutionTable {
    ResolutionTable {
        name: "builtin-injury".to_string(),
        entries: vec![
            entry(1, Some(1), "Heavy Blow"),
            entry(2, Some(2), "Slowed"),
            entry(3, Some(3), "Nasty Cut"),
            entry(4, Some(4), "Concussed"),
            entry(5, Some(5), "Injured Arm"),
            entry(6, Some(6), "Injured Leg"),
            entry(7, Some(7), "Loss of a Sense"),
            entry(8, Some(8), "Severely Injured"),
            entry(9, Some(9), "Comatose"),
            entry(10, Some(10), "Dire"),
            entry(11, None, "Dead"),
        ],
    }
}

/// The built-in trauma table for a variant.
pub fn builtin_trauma_table(variant: TraumaVariant) -> ResolutionTable {
    let entries = match variant {
        TraumaVariant::Standard => vec![
            entry(1, Some(2), "Subtle Strangeness"),
            entry(3, Some(3), "Shocked"),
            entry(4, Some(4), "Stunned"),
            entry(5, Some(7), "Overcome by Horror"),
            entry(8, Some(10), "Mind Undone"),
            entry(11, None, "Lost Forever"),
        ],
        TraumaVariant::NoPersonality => vec![
            entry(1, Some(2), "Subtle Strangeness"),
            entry(3, Some(4), "Shocked"),
            entry(5, Some(7), "Stunned"),
            entry(8, Some(10), "Mind Undone"),
            entry(11, None, "Lost Forever"),
        ],
    };
    ResolutionTable {
        name: match variant {
            TraumaVariant::Standard => "builtin-trauma".to_string(),
            TraumaVariant::NoPersonality => "builtin-trauma-no-personality".to_string(),
        },
        entries,
    }
}

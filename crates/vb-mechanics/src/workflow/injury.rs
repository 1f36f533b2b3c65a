//! Injury and trauma rolls, and the strain action that triggers them.
//!
//! An injury/trauma roll is one die plus a modifier, resolved against the
//! configured lookup tables. Straining heals all damage and refreshes the
//! pool, at the cost of an immediate injury roll.

use rand::rngs::StdRng;
use vb_core::Character;

use crate::effects;
use crate::error::{EngineError, EngineResult};
use crate::pool::{self, RefreshOutcome};
use crate::record::{
    ChatRecord, InjuryTraumaRecord, Notifier, RecordId, RecordPayload, RecordSink, Warning,
};
use crate::roll::dice::{roll_faces, DieSize, RollObserver};
use crate::spend::Caller;
use crate::tables::{Diagnostics, ResolvedEntry, TableKind, TableRegistry};

/// A requested injury or trauma roll.
#[derive(Debug, Clone, Copy)]
pub struct InjuryRollRequest {
    /// Injury or trauma.
    pub kind: TableKind,
    /// Modifier added to the die. `None` uses the default: the count of
    /// active injuries for injury rolls, the trauma roll modifier for
    /// trauma rolls.
    pub modifier: Option<i32>,
    /// The die to roll. Specialized sources use a d3.
    pub die: DieSize,
}

impl InjuryRollRequest {
    /// A d6 roll of the given kind with the default modifier.
    pub fn new(kind: TableKind) -> Self {
        Self {
            kind,
            modifier: None,
            die: DieSize::D6,
        }
    }
}

/// The published result of an injury or trauma roll.
#[derive(Debug, Clone)]
pub struct InjuryRollOutput {
    /// The published record's ID.
    pub record: RecordId,
    /// The die face rolled.
    pub die_result: u32,
    /// The modifier applied.
    pub modifier: i32,
    /// The lookup total.
    pub total: u32,
    /// The matched table row, if any.
    pub entry: Option<ResolvedEntry>,
    /// Diagnostics collected during table resolution.
    pub diagnostics: Diagnostics,
}

/// The combined result of straining oneself.
#[derive(Debug, Clone)]
pub struct StrainOutcome {
    /// The pool refresh that healing produced.
    pub refresh: RefreshOutcome,
    /// The injury roll the strain forced.
    pub injury: InjuryRollOutput,
}

/// Orchestrates injury/trauma rolls and the strain action.
pub struct InjuryRollWorkflow<'a> {
    rng: &'a mut StdRng,
    sink: &'a mut dyn RecordSink,
    notifier: &'a mut dyn Notifier,
    observer: &'a mut dyn RollObserver,
}

impl<'a> InjuryRollWorkflow<'a> {
    /// Create a workflow over the given collaborators.
    pub fn new(
        rng: &'a mut StdRng,
        sink: &'a mut dyn RecordSink,
        notifier: &'a mut dyn Notifier,
        observer: &'a mut dyn RollObserver,
    ) -> Self {
        Self {
            rng,
            sink,
            notifier,
            observer,
        }
    }

    /// Roll one die, add the modifier, resolve against the tables, publish.
    ///
    /// Table misconfigurations are returned as diagnostics and logged; they
    /// never fail the roll.
    pub fn run(
        &mut self,
        ch: &Character,
        tables: &TableRegistry,
        request: &InjuryRollRequest,
    ) -> InjuryRollOutput {
        let faces = roll_faces(self.rng, request.die, 1);
        self.observer.dice_rolled(request.die, false, &faces);
        let die_result = faces[0];

        let modifier = request.modifier.unwrap_or_else(|| match request.kind {
            TableKind::Injury => effects::active_injury_count(ch) as i32,
            TableKind::Trauma => effects::trauma_roll_modifier(ch) as i32,
        });
        let total = (die_result as i32 + modifier).max(0) as u32;

        let mut diagnostics = Diagnostics::new();
        let entry = tables.resolve(ch.category, request.kind, total, &mut diagnostics);
        diagnostics.log_all();

        let record = self.sink.publish(ChatRecord::new(
            ch.id,
            RecordPayload::InjuryTrauma(InjuryTraumaRecord {
                kind: request.kind,
                die_result,
                modifier,
                total,
                table_range: entry.as_ref().map(|e| e.range_label.clone()),
                table_result: entry.as_ref().map(|e| e.result.clone()),
                table_description: entry
                    .as_ref()
                    .map(|e| e.description.clone())
                    .unwrap_or_default(),
            }),
        ));

        InjuryRollOutput {
            record,
            die_result,
            modifier,
            total,
            entry,
            diagnostics,
        }
    }

    /// Strain oneself: heal all damage, refresh the pool, and immediately
    /// roll for an injury.
    ///
    /// Requires ownership (or the elevated role) and at least one point of
    /// damage; both are rejected with a warning before anything mutates.
    pub fn strain(
        &mut self,
        ch: &mut Character,
        caller: &Caller,
        tables: &TableRegistry,
    ) -> EngineResult<StrainOutcome> {
        if !caller.may_spend() {
            self.notifier.warn(Warning::PermissionDenied);
            return Err(EngineError::PermissionDenied);
        }
        if ch.damage == 0 {
            self.notifier.warn(Warning::NoDamageToStrain);
            return Err(EngineError::NoDamageToStrain);
        }

        let refresh = pool::refresh_and_post(ch, true, self.sink);

        let injury = self.run(ch, tables, &InjuryRollRequest::new(TableKind::Injury));

        Ok(StrainOutcome { refresh, injury })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use vb_core::item::{Injury, Trauma};

    use crate::record::{CollectingNotifier, MemoryRecordStore, RollCategory};
    use crate::roll::dice::NullObserver;

    fn character() -> Character {
        let mut ch = Character::new("Nora Fen");
        ch.dicepool.max = 6;
        ch.dicepool.value = 2;
        ch
    }

    struct Harness {
        rng: StdRng,
        store: MemoryRecordStore,
        notifier: CollectingNotifier,
        observer: NullObserver,
        tables: TableRegistry,
    }

    impl Harness {
        fn new(seed: u64) -> Self {
            Self {
                rng: StdRng::seed_from_u64(seed),
                store: MemoryRecordStore::new(),
                notifier: CollectingNotifier::default(),
                observer: NullObserver,
                tables: TableRegistry::default(),
            }
        }

        fn workflow(&mut self) -> InjuryRollWorkflow<'_> {
            InjuryRollWorkflow::new(
                &mut self.rng,
                &mut self.store,
                &mut self.notifier,
                &mut self.observer,
            )
        }
    }

    #[test]
    fn injury_roll_resolves_and_publishes() {
        let ch = character();
        let mut harness = Harness::new(8);
        let tables = harness.tables.clone();
        let output = harness
            .workflow()
            .run(&ch, &tables, &InjuryRollRequest::new(TableKind::Injury));

        assert!((1..=6).contains(&output.die_result));
        assert_eq!(output.modifier, 0);
        assert_eq!(output.total, output.die_result);
        assert!(output.entry.is_some());
        assert!(output.diagnostics.is_empty());
        assert_eq!(harness.store.len(), 1);
        assert_eq!(
            harness.store.last().unwrap().category(),
            RollCategory::InjuryTrauma
        );
    }

    #[test]
    fn injury_modifier_defaults_to_active_injury_count() {
        let mut ch = character();
        ch.injuries.push(Injury::new("Nasty Cut"));
        ch.injuries.push(Injury::new("Slowed"));
        let mut inactive = Injury::new("Old Scar");
        inactive.active = false;
        ch.injuries.push(inactive);

        let mut harness = Harness::new(8);
        let tables = harness.tables.clone();
        let output = harness
            .workflow()
            .run(&ch, &tables, &InjuryRollRequest::new(TableKind::Injury));
        assert_eq!(output.modifier, 2);
        assert_eq!(output.total, output.die_result + 2);
    }

    #[test]
    fn trauma_modifier_counts_enabled_flags() {
        let mut ch = character();
        let mut trauma = Trauma::new("Shocked");
        trauma.roll_modifier = true;
        ch.traumas.push(trauma);
        ch.traumas.push(Trauma::new("Stunned"));

        let mut harness = Harness::new(8);
        let tables = harness.tables.clone();
        let output = harness
            .workflow()
            .run(&ch, &tables, &InjuryRollRequest::new(TableKind::Trauma));
        assert_eq!(output.modifier, 1);
    }

    #[test]
    fn explicit_modifier_overrides_default() {
        let mut ch = character();
        ch.injuries.push(Injury::new("Nasty Cut"));

        let mut harness = Harness::new(8);
        let tables = harness.tables.clone();
        let request = InjuryRollRequest {
            modifier: Some(5),
            ..InjuryRollRequest::new(TableKind::Injury)
        };
        let output = harness.workflow().run(&ch, &tables, &request);
        assert_eq!(output.modifier, 5);
    }

    #[test]
    fn d3_roll_stays_in_range() {
        let ch = character();
        let mut harness = Harness::new(8);
        let tables = harness.tables.clone();
        let request = InjuryRollRequest {
            die: DieSize::D3,
            ..InjuryRollRequest::new(TableKind::Injury)
        };
        for _ in 0..20 {
            let output = harness.workflow().run(&ch, &tables, &request);
            assert!((1..=3).contains(&output.die_result));
        }
    }

    #[test]
    fn strain_requires_damage() {
        let mut ch = character();
        let mut harness = Harness::new(8);
        let tables = harness.tables.clone();
        let result = harness.workflow().strain(&mut ch, &Caller::owner(), &tables);
        assert!(matches!(result, Err(EngineError::NoDamageToStrain)));
        assert_eq!(harness.notifier.warnings, vec![Warning::NoDamageToStrain]);
        assert!(harness.store.is_empty());
    }

    #[test]
    fn strain_requires_permission() {
        let mut ch = character();
        ch.damage = 2;
        let mut harness = Harness::new(8);
        let tables = harness.tables.clone();
        let result = harness
            .workflow()
            .strain(&mut ch, &Caller::observer(), &tables);
        assert!(matches!(result, Err(EngineError::PermissionDenied)));
        assert_eq!(ch.damage, 2);
    }

    #[test]
    fn strain_heals_refreshes_and_rolls_injury() {
        let mut ch = character();
        ch.damage = 2;
        ch.dicepool.value = 1;
        ch.horror = 1;

        let mut harness = Harness::new(8);
        let tables = harness.tables.clone();
        let outcome = harness
            .workflow()
            .strain(&mut ch, &Caller::owner(), &tables)
            .unwrap();

        assert_eq!(ch.damage, 0);
        assert_eq!(ch.dicepool.value, 6);
        assert_eq!(outcome.refresh.healed_damage, 2);
        assert_eq!(outcome.refresh.new_horror_in_pool, 1);
        // Two records: the refresh and the injury roll.
        assert_eq!(harness.store.len(), 2);
        assert!(outcome.injury.entry.is_some());
    }
}

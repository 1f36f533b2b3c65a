//! End-to-end tests of the roll pipeline: request → workflow → published
//! record → reroll.

use rand::rngs::StdRng;
use rand::SeedableRng;
use vb_core::item::{Ammunition, Weapon};
use vb_core::{Character, RollKind, Skill};
use vb_mechanics::record::CollectingNotifier;
use vb_mechanics::workflow::RerollOutput;
use vb_mechanics::{
    Caller, EngineError, MemoryRecordStore, NullObserver, RecordId, RecordPayload, RecordSink,
    RerollWorkflow, RollRequestBuilder, RollSessions, SkillRollWorkflow, SpendReason,
};

fn investigator() -> Character {
    let mut ch = Character::new("Harriet Voss");
    ch.dicepool.value = 5;
    ch.dicepool.max = 6;
    ch.horror = 2;
    ch.dicepool.horror_in_pool = Some(2);
    ch.skills.rating_mut(Skill::Wits).current = 4;
    ch.skills.rating_mut(Skill::RangedCombat).current = 3;
    ch
}

struct Table {
    rng: StdRng,
    store: MemoryRecordStore,
    notifier: CollectingNotifier,
    observer: NullObserver,
}

impl Table {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            store: MemoryRecordStore::new(),
            notifier: CollectingNotifier::default(),
            observer: NullObserver,
        }
    }

    fn roll(
        &mut self,
        ch: &mut Character,
        request: &vb_mechanics::RollRequest,
    ) -> Result<vb_mechanics::workflow::SkillRollOutput, EngineError> {
        SkillRollWorkflow::new(
            &mut self.rng,
            &mut self.store,
            &mut self.notifier,
            &mut self.observer,
        )
        .run(ch, &Caller::owner(), request)
    }

    fn reroll(
        &mut self,
        ch: &mut Character,
        source: RecordId,
        selected: &[usize],
    ) -> Result<RerollOutput, EngineError> {
        RerollWorkflow::new(
            &mut self.rng,
            &mut self.store,
            &mut self.notifier,
            &mut self.observer,
        )
        .run(ch, &Caller::owner(), source, selected)
    }
}

#[test]
fn session_to_published_record() {
    let mut ch = investigator();
    let mut sessions = RollSessions::new();
    let request = sessions
        .open(&ch, Skill::Wits, RollKind::Complex)
        .dice_to_use(3)
        .successes_needed(1)
        .build();

    let mut table = Table::new(1);
    let output = table.roll(&mut ch, &request).unwrap();

    // Pool debited by the requested dice; composition intact.
    assert_eq!(ch.dicepool.value, 2);
    assert_eq!(output.spend.applied.regular, 3);
    assert_eq!(output.spend.applied.horror, 0);

    // The record reproduces the roll's inputs for later reroll.
    let record = table.store.load(output.record).unwrap();
    let RecordPayload::Skill(payload) = &record.payload else {
        panic!("expected a skill payload");
    };
    assert_eq!(payload.success_on, 4);
    assert_eq!(payload.dice_to_use, 3);
    assert_eq!(payload.dice.len(), 3);
    assert_eq!(payload.success_count, output.outcome.success_count);
}

#[test]
fn reroll_extends_published_record() {
    let mut ch = investigator();
    let request = RollRequestBuilder::open(&ch, Skill::Wits, RollKind::Complex)
        .dice_to_use(4)
        .successes_needed(2)
        .build();

    let mut table = Table::new(7);
    let output = table.roll(&mut ch, &request).unwrap();
    let pool_after_roll = ch.dicepool.value;

    let (selectable, dice_len) = {
        let RecordPayload::Skill(payload) = &table.store.load(output.record).unwrap().payload
        else {
            panic!("expected a skill payload");
        };
        let selectable: Vec<usize> = payload
            .dice
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.is_dropped && !(d.is_horror && d.raw == 1))
            .map(|(i, _)| i)
            .take(2)
            .collect();
        (selectable, payload.dice.len())
    };
    assert!(!selectable.is_empty());

    let reroll = table.reroll(&mut ch, output.record, &selectable).unwrap();

    // A reroll never re-debits the pool.
    assert_eq!(ch.dicepool.value, pool_after_roll);
    assert_eq!(reroll.outcome.dice.len(), dice_len);

    let RecordPayload::Skill(rerolled) = &table.store.load(reroll.record).unwrap().payload else {
        panic!("expected a skill payload");
    };
    assert!(rerolled.is_reroll);
    assert_eq!(rerolled.reroll_of, Some(output.record));
    assert_eq!(rerolled.old_pool_value, 5);
    assert_eq!(rerolled.new_pool_value, 1);
}

#[test]
fn aborted_spend_wastes_dice_but_changes_nothing() {
    let mut ch = investigator();
    // Build the request, then shrink the pool behind the session's back.
    let request = RollRequestBuilder::open(&ch, Skill::Wits, RollKind::Complex)
        .dice_to_use(4)
        .build();
    ch.dicepool.value = 2;
    ch.recalc();

    let mut table = Table::new(3);
    let result = table.roll(&mut ch, &request);

    assert!(matches!(
        result,
        Err(EngineError::SpendRejected(SpendReason::InsufficientDicepool))
    ));
    assert_eq!(ch.dicepool.value, 2);
    assert!(table.store.is_empty());
}

#[test]
fn weapon_attack_round_trips_ammo_state() {
    let mut ch = investigator();
    let mut weapon = Weapon::new("Revolver", Skill::RangedCombat, 3);
    weapon.injury_rating = 2;
    weapon.ammunition = Ammunition {
        max: 6,
        current: 6,
        ..Ammunition::default()
    };
    let weapon_id = weapon.id;
    ch.weapons.push(weapon);

    let request = RollRequestBuilder::with_weapon(&ch, weapon_id)
        .unwrap()
        .dice_to_use(3)
        .successes_needed(1)
        .build();
    assert_eq!(request.skill, Skill::RangedCombat);

    let mut table = Table::new(19);
    let output = table.roll(&mut ch, &request).unwrap();

    let RecordPayload::Skill(payload) = &table.store.load(output.record).unwrap().payload else {
        panic!("expected a skill payload");
    };
    let usage = payload.weapon.as_ref().unwrap();
    assert_eq!(usage.usage_success, output.outcome.success_count > 0);
    assert_eq!(
        usage.inflict_injury,
        output.outcome.success_count >= 2
    );
    // The weapon's live ammo matches what the record says happened.
    assert_eq!(ch.weapon(weapon_id).unwrap().ammunition.current, usage.ammo_new);
}

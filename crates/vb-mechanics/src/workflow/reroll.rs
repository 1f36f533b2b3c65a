//! The selective reroll workflow.
//!
//! Operates only on a published skill record, never on live state. Selected
//! dice are replaced with fresh faces and the whole collection is re-run
//! through the outcome computer; counts are recomputed from scratch, never
//! patched. The reroll publishes a new record flagged as a reroll of the
//! original and does not re-debit the dice pool.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use vb_core::Character;

use crate::error::{EngineError, EngineResult};
use crate::record::{
    AmmoSpendReason, ChatRecord, Notifier, RecordId, RecordPayload, RecordSink, SkillRollRecord,
    Warning,
};
use crate::roll::dice::{roll_faces, DieRoll, DieSize, RollObserver};
use crate::roll::outcome::{compute_outcome, OutcomeParams};
use crate::roll::RollOutcome;
use crate::spend::Caller;

/// What a completed reroll hands back to the caller.
#[derive(Debug, Clone)]
pub struct RerollOutput {
    /// The new record's ID.
    pub record: RecordId,
    /// The recomputed outcome over the mixed old/new collection.
    pub outcome: RollOutcome,
}

/// Orchestrates a selective reroll of a published skill roll.
pub struct RerollWorkflow<'a> {
    rng: &'a mut StdRng,
    sink: &'a mut dyn RecordSink,
    notifier: &'a mut dyn Notifier,
    observer: &'a mut dyn RollObserver,
}

struct RerollPlan {
    payload: SkillRollRecord,
    normal_indices: Vec<usize>,
    horror_indices: Vec<usize>,
}

/// A die is selectable only if it was not dropped and is not a horror die
/// showing a natural 1; horror 1s are permanently locked against reroll.
fn is_selectable(die: &DieRoll) -> bool {
    !die.is_dropped && !(die.is_horror && die.is_natural_one())
}

impl<'a> RerollWorkflow<'a> {
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

    /// Run a reroll of `selected` die indices against a published record.
    pub fn run(
        &mut self,
        ch: &mut Character,
        caller: &Caller,
        source: RecordId,
        selected: &[usize],
    ) -> EngineResult<RerollOutput> {
        if !caller.may_spend() {
            return Err(EngineError::PermissionDenied);
        }

        let plan = self.plan(ch, source, selected)?;
        let (normal_faces, horror_faces) = self.execute(&plan);
        let outcome = splice_and_resolve(&plan, &normal_faces, &horror_faces);

        self.reconcile_weapon_ammo(ch, &plan.payload, &outcome);

        let payload = rebuild_payload(ch, &plan.payload, &outcome, source);
        let record_id = self
            .sink
            .publish(ChatRecord::new(ch.id, RecordPayload::Skill(Box::new(payload))));

        Ok(RerollOutput {
            record: record_id,
            outcome,
        })
    }

    /// Load the record and partition the selection into batches. Any
    /// out-of-range or locked index fails the whole selection so the caller
    /// can resubmit a corrected one.
    fn plan(
        &self,
        ch: &Character,
        source: RecordId,
        selected: &[usize],
    ) -> EngineResult<RerollPlan> {
        let record = self
            .sink
            .load(source)
            .ok_or(EngineError::RecordNotFound(source))?;
        if record.character != ch.id {
            return Err(EngineError::RecordCharacterMismatch);
        }
        let RecordPayload::Skill(payload) = &record.payload else {
            return Err(EngineError::RecordNotRerollable(source));
        };

        if selected.is_empty() {
            return Err(EngineError::EmptySelection);
        }

        let chosen: BTreeSet<usize> = selected.iter().copied().collect();
        let mut normal_indices = Vec::new();
        let mut horror_indices = Vec::new();
        for &idx in &chosen {
            let die = payload
                .dice
                .get(idx)
                .ok_or(EngineError::InvalidRerollSelection(idx))?;
            if !is_selectable(die) {
                return Err(EngineError::ForbiddenRerollSelection(idx));
            }
            if die.is_horror {
                horror_indices.push(idx);
            } else {
                normal_indices.push(idx);
            }
        }

        Ok(RerollPlan {
            payload: payload.as_ref().clone(),
            normal_indices,
            horror_indices,
        })
    }

    /// Roll replacement faces for each batch.
    fn execute(&mut self, plan: &RerollPlan) -> (Vec<u32>, Vec<u32>) {
        let normal = if plan.normal_indices.is_empty() {
            Vec::new()
        } else {
            let faces = roll_faces(self.rng, DieSize::D6, plan.normal_indices.len() as u32);
            self.observer.dice_rolled(DieSize::D6, false, &faces);
            faces
        };
        let horror = if plan.horror_indices.is_empty() {
            Vec::new()
        } else {
            let faces = roll_faces(self.rng, DieSize::D6, plan.horror_indices.len() as u32);
            self.observer.dice_rolled(DieSize::D6, true, &faces);
            faces
        };
        (normal, horror)
    }

    /// Adjust weapon ammo to match the rerolled outcome, but only when the
    /// weapon's ammo is still in one of the two states implied by the
    /// original roll. If external state has moved on, skip rather than
    /// guess.
    fn reconcile_weapon_ammo(
        &mut self,
        ch: &mut Character,
        payload: &SkillRollRecord,
        outcome: &RollOutcome,
    ) {
        let Some(usage) = &payload.weapon else {
            return;
        };
        if usage.ammo_spend_reason != Some(AmmoSpendReason::NaturalOne) {
            return;
        }
        let Ok(weapon) = ch.weapon_mut(usage.weapon) else {
            tracing::warn!(weapon = %usage.weapon, "weapon gone; skipping ammo reconciliation");
            self.notifier.warn(Warning::AmmoReconciliationSkipped);
            return;
        };
        if !weapon.ammunition.tracks_ammo() {
            return;
        }

        let ammo_old = usage.ammo_old;
        let ammo_spent = ammo_old.saturating_sub(1);
        let current = weapon.ammunition.current;
        if current != ammo_old && current != ammo_spent {
            tracing::warn!(
                weapon = %usage.weapon,
                current,
                "ammo changed externally; skipping reconciliation"
            );
            self.notifier.warn(Warning::AmmoReconciliationSkipped);
            return;
        }

        let fumbled = outcome
            .dice
            .iter()
            .any(|d| d.is_kept() && d.is_natural_one());
        let expected = if fumbled { ammo_spent } else { ammo_old };
        if expected != current {
            weapon.ammunition.current = expected;
        }
    }
}

/// Replace the selected raw faces at their original indices and recompute
/// the outcome over the entire mixed collection.
fn splice_and_resolve(plan: &RerollPlan, normal: &[u32], horror: &[u32]) -> RollOutcome {
    let mut dice = plan.payload.dice.clone();
    for (&idx, &raw) in plan.normal_indices.iter().zip(normal) {
        dice[idx] = DieRoll::new(raw, false);
    }
    for (&idx, &raw) in plan.horror_indices.iter().zip(horror) {
        dice[idx] = DieRoll::new(raw, true);
    }

    compute_outcome(
        dice,
        &OutcomeParams {
            success_on: plan.payload.success_on,
            penalty: plan.payload.penalty,
            result_modifier: plan.payload.result_modifier,
            successes_needed: plan.payload.successes_needed,
        },
    )
}

/// Build the republished payload: same inputs and pool values, new dice and
/// counts, flagged as a reroll. Weapon and spell display data is recomputed
/// from the character's current items where they still exist.
fn rebuild_payload(
    ch: &Character,
    original: &SkillRollRecord,
    outcome: &RollOutcome,
    source: RecordId,
) -> SkillRollRecord {
    let mut payload = original.clone();
    payload.dice = outcome.dice.clone();
    payload.success_count = outcome.success_count;
    payload.failure_count = outcome.failure_count;
    payload.horror_failure_count = outcome.horror_failure_count;
    payload.is_success = outcome.is_success;
    payload.is_reroll = true;
    payload.reroll_of = Some(source);

    if let Some(usage) = &mut payload.weapon {
        if let Ok(weapon) = ch.weapon(usage.weapon) {
            usage.usage_success = outcome.success_count > 0;
            usage.damage = if usage.usage_success { weapon.damage } else { 0 };
            usage.inflict_injury =
                weapon.injury_rating > 0 && outcome.success_count >= weapon.injury_rating;
        }
    }
    if let Some(usage) = &mut payload.spell {
        if let Ok(spell) = ch.spell(usage.spell) {
            usage.usage_success = outcome.success_count >= spell.difficulty;
            usage.difficulty = spell.difficulty;
        }
    }

    payload
}

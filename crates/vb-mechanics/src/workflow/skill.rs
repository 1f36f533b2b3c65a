//! The skill roll workflow: Plan → Execute → Outcome → Effects → Publish.
//!
//! Dice are rolled before the pool is debited, but the debit gates
//! everything that follows: if the spend is rejected the rolled faces are
//! discarded, no ammo or knack use is consumed, nothing is published, and
//! the caller gets an explicit error. Only a committed spend publishes a
//! record.

use rand::rngs::StdRng;
use vb_core::Character;

use crate::effects::{self, EffectDelta};
use crate::error::{EngineError, EngineResult};
use crate::pool::PoolSnapshot;
use crate::record::{
    AmmoSpendReason, ChatRecord, Notifier, RecordId, RecordPayload, RecordSink, SkillRollRecord,
    SpellUsage, Warning, WeaponUsage,
};
use crate::roll::dice::{roll_faces, tag_results, DieSize, RollObserver};
use crate::roll::outcome::{apply_advantage_drop, compute_outcome, OutcomeParams};
use crate::roll::planner::{plan_roll, validate_request, RollPlan, RollRequest};
use crate::roll::RollOutcome;
use crate::spend::{self, Caller, SpendContext, SpendOutcome, SpendReason, SpendRequest, SpendSource};

/// Everything a completed skill roll hands back to the caller.
#[derive(Debug, Clone)]
pub struct SkillRollOutput {
    /// The published record's ID.
    pub record: RecordId,
    /// The plan the roll executed.
    pub plan: RollPlan,
    /// The resolved outcome.
    pub outcome: RollOutcome,
    /// The spend envelope for the pool debit.
    pub spend: SpendOutcome,
}

/// Orchestrates one skill roll end to end.
pub struct SkillRollWorkflow<'a> {
    rng: &'a mut StdRng,
    sink: &'a mut dyn RecordSink,
    notifier: &'a mut dyn Notifier,
    observer: &'a mut dyn RollObserver,
}

impl<'a> SkillRollWorkflow<'a> {
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

    /// Run the full workflow for a request.
    pub fn run(
        &mut self,
        ch: &mut Character,
        caller: &Caller,
        request: &RollRequest,
    ) -> EngineResult<SkillRollOutput> {
        // Selections are re-validated against current applicability right
        // before execution; stale ones are rejected, not silently dropped.
        let delta = {
            let selected =
                effects::validate_knack_selection(ch, request.skill, request.kind, &request.knacks)?;
            effects::compose_effects(&selected)
        };
        let injury = effects::injury_impact(ch, request.skill, request.kind);
        let effective = effective_request(request, &delta, injury.penalty);

        validate_request(ch, &effective)?;

        let snapshot = PoolSnapshot::capture(ch);
        let plan = plan_roll(&snapshot, &effective);

        let (normal, horror) = self.execute(&plan);
        let outcome = Self::resolve(&plan, &effective, &normal, &horror);

        let weapon = plan_weapon_usage(ch, &effective, &outcome)?;
        let spell = plan_spell_usage(ch, &effective, &outcome)?;

        let spend = self.apply_effects(ch, caller, &effective, &plan, weapon.as_ref())?;
        effects::spend_knack_uses(ch, &request.knacks);

        let record = SkillRollRecord {
            kind: effective.kind,
            skill: effective.skill,
            success_on: plan.success_on,
            dice_to_use: plan.dice_to_use,
            horror_dice_rolled: plan.horror_dice_to_roll,
            penalty: plan.penalty,
            bonus_dice: plan.bonus_dice,
            result_modifier: plan.result_modifier,
            successes_needed: effective.successes_needed,
            advantage: plan.advantage,
            disadvantage: plan.disadvantage,
            dice: outcome.dice.clone(),
            success_count: outcome.success_count,
            failure_count: outcome.failure_count,
            horror_failure_count: outcome.horror_failure_count,
            is_success: outcome.is_success,
            old_pool_value: spend.before.pool,
            new_pool_value: spend.after.pool,
            weapon,
            spell,
            applied_knacks: delta.applied,
            reroll_allowance: delta.reroll_allowance,
            is_reroll: false,
            reroll_of: None,
        };
        let record_id = self
            .sink
            .publish(ChatRecord::new(ch.id, RecordPayload::Skill(Box::new(record))));

        Ok(SkillRollOutput {
            record: record_id,
            plan,
            outcome,
            spend,
        })
    }

    /// Roll the plan's batches, horror first when nonzero. The observer is
    /// notified per batch, fire-and-forget; outcome computation waits for
    /// both batches.
    fn execute(&mut self, plan: &RollPlan) -> (Vec<u32>, Vec<u32>) {
        let horror = if plan.horror_dice_to_roll > 0 {
            let faces = roll_faces(self.rng, DieSize::D6, plan.horror_dice_to_roll);
            self.observer.dice_rolled(DieSize::D6, true, &faces);
            faces
        } else {
            Vec::new()
        };

        let normal = roll_faces(self.rng, DieSize::D6, plan.dice_to_roll);
        self.observer.dice_rolled(DieSize::D6, false, &normal);

        (normal, horror)
    }

    fn resolve(
        plan: &RollPlan,
        effective: &RollRequest,
        normal: &[u32],
        horror: &[u32],
    ) -> RollOutcome {
        let mut dice = tag_results(normal, horror);
        apply_advantage_drop(&mut dice, plan.advantage, plan.disadvantage);
        compute_outcome(
            dice,
            &OutcomeParams {
                success_on: plan.success_on,
                penalty: plan.penalty,
                result_modifier: plan.result_modifier,
                successes_needed: effective.successes_needed,
            },
        )
    }

    /// The commit boundary. The pool debit is authoritative: if it fails,
    /// the workflow aborts before any secondary effect is applied and before
    /// anything is published. Ammo is only consumed here, after the debit.
    fn apply_effects(
        &mut self,
        ch: &mut Character,
        caller: &Caller,
        effective: &RollRequest,
        plan: &RollPlan,
        weapon: Option<&WeaponUsage>,
    ) -> EngineResult<SpendOutcome> {
        let spend = spend::spend(
            ch,
            caller,
            &SpendRequest {
                total: plan.dice_to_use,
                horror: Some(plan.horror_dice_to_roll),
                context: SpendContext::Roll(effective.kind),
                source: SpendSource::Workflow,
            },
        );
        if !spend.ok {
            let reason = spend.reason.unwrap_or(SpendReason::AmountInvalid);
            self.notifier.warn(Warning::RollSpendFailed(reason));
            return Err(EngineError::SpendRejected(reason));
        }

        if let Some(usage) = weapon {
            if let Ok(weapon) = ch.weapon_mut(usage.weapon) {
                weapon.ammunition.current = usage.ammo_new;
            }
        }

        Ok(spend)
    }
}

/// Fold knack deltas and the injury penalty into the request the roll
/// actually executes.
fn effective_request(request: &RollRequest, delta: &EffectDelta, injury_penalty: u32) -> RollRequest {
    let mut effective = request.clone();
    effective.bonus_dice += delta.bonus_dice;
    effective.result_modifier += delta.result_modifier;
    effective.advantage |= delta.advantage;
    effective.disadvantage |= delta.disadvantage;
    effective.penalty += injury_penalty;
    effective
}

/// Compute the weapon resolution for an outcome without touching state.
///
/// Ammo policy: reload-after-use empties the magazine on any use;
/// decrease-after-use always consumes one round; otherwise one round is
/// expended only when the final kept dice contain a natural 1 and the
/// weapon tracks ammunition.
fn plan_weapon_usage(
    ch: &Character,
    effective: &RollRequest,
    outcome: &RollOutcome,
) -> EngineResult<Option<WeaponUsage>> {
    let Some(weapon_id) = effective.weapon else {
        return Ok(None);
    };
    let weapon = ch
        .weapon(weapon_id)
        .map_err(|_| EngineError::UnknownWeapon(weapon_id))?;

    let ammo = weapon.ammunition;
    let usage_success = outcome.success_count > 0;
    let mut usage = WeaponUsage {
        weapon: weapon_id,
        usage_success,
        damage: if usage_success { weapon.damage } else { 0 },
        inflict_injury: weapon.injury_rating > 0
            && outcome.success_count >= weapon.injury_rating,
        special_rules: weapon.special_rules.clone(),
        ammo_old: ammo.current,
        ammo_new: ammo.current,
        ammo_spend_reason: None,
    };

    if ammo.reload_after_usage {
        usage.ammo_spend_reason = Some(AmmoSpendReason::ReloadAfterUsage);
        usage.ammo_new = 0;
    } else if ammo.decrease_after_usage {
        usage.ammo_spend_reason = Some(AmmoSpendReason::DecreaseAfterUsage);
        usage.ammo_new = ammo.current.saturating_sub(1);
    } else {
        let fumbled = outcome
            .dice
            .iter()
            .any(|d| d.is_kept() && d.is_natural_one());
        if fumbled && ammo.tracks_ammo() {
            usage.ammo_spend_reason = Some(AmmoSpendReason::NaturalOne);
            usage.ammo_new = ammo.current.saturating_sub(1);
        }
    }

    Ok(Some(usage))
}

/// Compute the spell resolution: the casting succeeds iff the roll scored
/// at least the spell's difficulty.
fn plan_spell_usage(
    ch: &Character,
    effective: &RollRequest,
    outcome: &RollOutcome,
) -> EngineResult<Option<SpellUsage>> {
    let Some(spell_id) = effective.spell else {
        return Ok(None);
    };
    let spell = ch
        .spell(spell_id)
        .map_err(|_| EngineError::UnknownSpell(spell_id))?;
    Ok(Some(SpellUsage {
        spell: spell_id,
        usage_success: outcome.success_count >= spell.difficulty,
        difficulty: spell.difficulty,
    }))
}

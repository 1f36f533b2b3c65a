//! Spend validation and execution against the dice pool.
//!
//! Every operation returns the same [`SpendOutcome`] envelope so downstream
//! record/notification code is decoupled from the business logic. The commit
//! takes `&mut Character`, making the snapshot → validate → commit sequence a
//! single exclusive critical section.

use serde::{Deserialize, Serialize};
use vb_core::{Character, RollKind};

use crate::pool::PoolSnapshot;
use crate::record::{ChatRecord, DiscardRecord, RecordPayload, RecordSink, SimpleActionRecord};

/// Who is asking for the spend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caller {
    /// The caller owns the character.
    pub is_owner: bool,
    /// The caller holds an elevated (game master) role.
    pub is_gm: bool,
}

impl Caller {
    /// A caller that owns the character.
    pub fn owner() -> Self {
        Self {
            is_owner: true,
            is_gm: false,
        }
    }

    /// A caller with the elevated role.
    pub fn gm() -> Self {
        Self {
            is_owner: false,
            is_gm: true,
        }
    }

    /// A caller with no rights over the character.
    pub fn observer() -> Self {
        Self::default()
    }

    /// Returns true if this caller may mutate the character's resources.
    pub fn may_spend(&self) -> bool {
        self.is_owner || self.is_gm
    }
}

/// Why a spend was rejected. The first failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpendReason {
    /// The requested amount was zero or less.
    AmountInvalid,
    /// The horror part exceeds the requested total.
    HorrorExceedsTotal,
    /// The total exceeds the dice currently in the pool.
    InsufficientDicepool,
    /// The horror part exceeds the horror dice available.
    InsufficientHorror,
    /// The regular part exceeds the regular dice available.
    InsufficientRegular,
    /// The caller may not spend this character's dice.
    PermissionDenied,
}

impl SpendReason {
    /// The machine-readable reason code, for the notification layer.
    pub fn code(self) -> &'static str {
        match self {
            Self::AmountInvalid => "AMOUNT_INVALID",
            Self::HorrorExceedsTotal => "HORROR_EXCEEDS_TOTAL",
            Self::InsufficientDicepool => "INSUFFICIENT_DICEPOOL",
            Self::InsufficientHorror => "INSUFFICIENT_HORROR",
            Self::InsufficientRegular => "INSUFFICIENT_REGULAR",
            Self::PermissionDenied => "PERMISSION_DENIED",
        }
    }
}

impl std::fmt::Display for SpendReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// What kind of action a spend belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendContext {
    /// A simple action spending one die.
    Simple,
    /// The cost of a skill roll of the given kind.
    Roll(RollKind),
    /// A discard without an action.
    Discard,
}

/// Where a spend was initiated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendSource {
    /// The character sheet.
    Sheet,
    /// A roll workflow.
    Workflow,
    /// A direct API call.
    Api,
}

/// Which flavor of die a simple action spends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DieFlavor {
    /// A regular pool die.
    Regular,
    /// A horror pool die.
    Horror,
}

/// A requested spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendRequest {
    /// Total dice to spend.
    pub total: u32,
    /// Horror sub-amount. `None` resolves automatically: horror dice are the
    /// fallback once regular dice are exhausted, never the first choice.
    pub horror: Option<u32>,
    /// What the spend is for.
    pub context: SpendContext,
    /// Where the spend came from.
    pub source: SpendSource,
}

/// The regular/horror split of a spend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendBreakdown {
    /// Regular dice.
    pub regular: u32,
    /// Horror dice.
    pub horror: u32,
}

/// Pool totals before or after a spend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolBalance {
    /// Dice in the pool.
    pub pool: u32,
    /// Horror dice among them.
    pub horror: u32,
}

impl PoolBalance {
    fn of(snapshot: &PoolSnapshot) -> Self {
        Self {
            pool: snapshot.pool_value,
            horror: snapshot.available_horror,
        }
    }
}

/// The uniform envelope returned by every spend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendOutcome {
    /// Whether the spend was (or would be) applied.
    pub ok: bool,
    /// Rejection reason when `ok` is false.
    pub reason: Option<SpendReason>,
    /// What the spend was for.
    pub context: SpendContext,
    /// Where the spend came from.
    pub source: SpendSource,
    /// The total that was requested.
    pub requested_total: u32,
    /// The requested split after auto-resolution.
    pub requested: SpendBreakdown,
    /// The total actually applied (0 on rejection).
    pub applied_total: u32,
    /// The split actually applied.
    pub applied: SpendBreakdown,
    /// Pool totals before the spend.
    pub before: PoolBalance,
    /// Pool totals after the spend.
    pub after: PoolBalance,
    /// Whether a chat record was posted for this spend.
    pub chat_posted: bool,
}

/// The result of a feasibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendCheck {
    /// Whether the spend would succeed.
    pub ok: bool,
    /// Rejection reason when `ok` is false.
    pub reason: Option<SpendReason>,
    /// The most dice that could be spent right now.
    pub max_spendable: u32,
}

struct Validated {
    total: u32,
    regular: u32,
    horror: u32,
}

/// Auto-resolve the horror part of a spend: horror dice fill in only after
/// regular dice are exhausted.
fn auto_horror_part(total: u32, snapshot: &PoolSnapshot) -> u32 {
    let missing_after_regular = total.saturating_sub(snapshot.available_regular);
    snapshot.available_horror.min(missing_after_regular)
}

fn resolve_horror(total: u32, horror: Option<u32>, snapshot: &PoolSnapshot) -> u32 {
    horror.unwrap_or_else(|| auto_horror_part(total, snapshot))
}

fn validate(snapshot: &PoolSnapshot, total: u32, horror: u32) -> Result<Validated, SpendReason> {
    if total == 0 {
        return Err(SpendReason::AmountInvalid);
    }
    if horror > total {
        return Err(SpendReason::HorrorExceedsTotal);
    }
    if snapshot.pool_value < total {
        return Err(SpendReason::InsufficientDicepool);
    }
    if snapshot.available_horror < horror {
        return Err(SpendReason::InsufficientHorror);
    }
    let regular = total - horror;
    if snapshot.available_regular < regular {
        return Err(SpendReason::InsufficientRegular);
    }
    Ok(Validated {
        total,
        regular,
        horror,
    })
}

fn rejection(
    request: &SpendRequest,
    resolved_horror: u32,
    before: PoolBalance,
    reason: SpendReason,
) -> SpendOutcome {
    SpendOutcome {
        ok: false,
        reason: Some(reason),
        context: request.context,
        source: request.source,
        requested_total: request.total,
        requested: SpendBreakdown {
            regular: request.total.saturating_sub(resolved_horror),
            horror: resolved_horror,
        },
        applied_total: 0,
        applied: SpendBreakdown::default(),
        before,
        after: before,
        chat_posted: false,
    }
}

/// Check whether a spend would succeed, without mutating anything.
pub fn can_spend(ch: &Character, total: u32, horror: Option<u32>) -> SpendCheck {
    let snapshot = PoolSnapshot::capture(ch);
    let horror = resolve_horror(total, horror, &snapshot);
    match validate(&snapshot, total, horror) {
        Ok(_) => SpendCheck {
            ok: true,
            reason: None,
            max_spendable: snapshot.pool_value,
        },
        Err(reason) => SpendCheck {
            ok: false,
            reason: Some(reason),
            max_spendable: snapshot.pool_value,
        },
    }
}

/// Project the before/after of a spend without mutating anything.
pub fn preview_spend(ch: &Character, request: &SpendRequest) -> SpendOutcome {
    let snapshot = PoolSnapshot::capture(ch);
    let before = PoolBalance::of(&snapshot);
    let horror = resolve_horror(request.total, request.horror, &snapshot);

    match validate(&snapshot, request.total, horror) {
        Ok(validated) => SpendOutcome {
            ok: true,
            reason: None,
            context: request.context,
            source: request.source,
            requested_total: request.total,
            requested: SpendBreakdown {
                regular: validated.regular,
                horror: validated.horror,
            },
            applied_total: validated.total,
            applied: SpendBreakdown {
                regular: validated.regular,
                horror: validated.horror,
            },
            before,
            after: PoolBalance {
                pool: before.pool - validated.total,
                horror: before.horror - validated.horror,
            },
            chat_posted: false,
        },
        Err(reason) => rejection(request, horror, before, reason),
    }
}

/// Validate and commit a spend.
///
/// Permission is checked before any validation runs. On success the pool
/// value drops by the total and the horror composition by the resolved
/// horror part, both floored at zero.
pub fn spend(ch: &mut Character, caller: &Caller, request: &SpendRequest) -> SpendOutcome {
    let snapshot = PoolSnapshot::capture(ch);
    let before = PoolBalance::of(&snapshot);
    let horror = resolve_horror(request.total, request.horror, &snapshot);

    if !caller.may_spend() {
        return rejection(request, horror, before, SpendReason::PermissionDenied);
    }

    let validated = match validate(&snapshot, request.total, horror) {
        Ok(validated) => validated,
        Err(reason) => return rejection(request, horror, before, reason),
    };

    ch.dicepool.value = snapshot.pool_value - validated.total;
    ch.dicepool.horror_in_pool = Some(snapshot.available_horror - validated.horror);
    ch.recalc();

    let after_snapshot = PoolSnapshot::capture(ch);
    SpendOutcome {
        ok: true,
        reason: None,
        context: request.context,
        source: request.source,
        requested_total: request.total,
        requested: SpendBreakdown {
            regular: validated.regular,
            horror: validated.horror,
        },
        applied_total: validated.total,
        applied: SpendBreakdown {
            regular: validated.regular,
            horror: validated.horror,
        },
        before,
        after: PoolBalance::of(&after_snapshot),
        chat_posted: false,
    }
}

/// Spend a single die for a simple action, posting a record on success.
pub fn spend_simple_action_die(
    ch: &mut Character,
    caller: &Caller,
    flavor: DieFlavor,
    sink: &mut dyn RecordSink,
) -> SpendOutcome {
    let request = SpendRequest {
        total: 1,
        horror: Some(match flavor {
            DieFlavor::Regular => 0,
            DieFlavor::Horror => 1,
        }),
        context: SpendContext::Simple,
        source: SpendSource::Sheet,
    };
    let mut outcome = spend(ch, caller, &request);
    if outcome.ok {
        sink.publish(ChatRecord::new(
            ch.id,
            RecordPayload::SimpleAction(SimpleActionRecord {
                flavor,
                old_pool_value: outcome.before.pool,
                new_pool_value: outcome.after.pool,
            }),
        ));
        outcome.chat_posted = true;
    }
    outcome
}

/// Discard dice without an action: regular dice are consumed first, horror
/// dice only for the remainder. Posts a record on success.
pub fn discard_dice(
    ch: &mut Character,
    caller: &Caller,
    amount: u32,
    sink: &mut dyn RecordSink,
) -> SpendOutcome {
    let snapshot = PoolSnapshot::capture(ch);
    let regular = snapshot.available_regular.min(amount);
    let horror = amount - regular;

    let request = SpendRequest {
        total: amount,
        horror: Some(horror),
        context: SpendContext::Discard,
        source: SpendSource::Sheet,
    };
    let mut outcome = spend(ch, caller, &request);
    if outcome.ok {
        sink.publish(ChatRecord::new(
            ch.id,
            RecordPayload::Discard(DiscardRecord {
                amount,
                discarded_regular: regular,
                discarded_horror: horror,
                old_pool_value: outcome.before.pool,
                new_pool_value: outcome.after.pool,
            }),
        ));
        outcome.chat_posted = true;
    }
    outcome
}

/// Discard the full current pool value.
pub fn discard_all_dice(
    ch: &mut Character,
    caller: &Caller,
    sink: &mut dyn RecordSink,
) -> SpendOutcome {
    let amount = PoolSnapshot::capture(ch).pool_value;
    discard_dice(ch, caller, amount, sink)
}

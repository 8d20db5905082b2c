//! Lock-aware and plain normalization of weight sets.
//!
//! [`normalize_locked`] is the pass run after direct edits and pruning: it
//! leaves locked influences alone and rescales the unlocked ones so the set
//! sums to 1.0 again. [`normalize_plain`] ignores locks entirely and is used
//! for freshly built sets such as mirrored weights.

use crate::error::{EngineError, EngineResult, EngineWarning, WarningCode};
use crate::weights::{InfluenceId, WeightSet, WEIGHT_EPSILON};

/// What a lock-aware normalization pass did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalizeOutcome {
    /// The set has no entries.
    Empty,
    /// Unlocked weights were multiplied by `factor`.
    Scaled { factor: f64 },
    /// Locked weights consume the whole budget; unlocked weights were zeroed.
    BudgetExhausted { locked_total: f64, discarded: f64 },
    /// Unlocked weights were all zero; the first unlocked entry took the
    /// remaining budget.
    Seeded { influence: InfluenceId, weight: f64 },
    /// Every entry is locked and the budget is not filled.
    AllLocked { locked_total: f64 },
}

impl NormalizeOutcome {
    /// Returns the warning the caller should surface, if any.
    ///
    /// Exhausting the budget with locks is a valid terminal state, but it
    /// silently discards weight, so it is reported.
    pub fn warning(&self) -> Option<EngineWarning> {
        match *self {
            NormalizeOutcome::BudgetExhausted {
                locked_total,
                discarded,
            } if discarded > 0.0 || locked_total > 1.0 + WEIGHT_EPSILON => {
                Some(EngineWarning::new(
                    WarningCode::LockedBudgetExhausted,
                    format!(
                        "locked influences hold {:.4} of the budget; \
                         {:.4} of unlocked weight was set to zero",
                        locked_total, discarded
                    ),
                ))
            }
            NormalizeOutcome::AllLocked { locked_total } => Some(EngineWarning::new(
                WarningCode::LockedBudgetUnfilled,
                format!(
                    "all influences are locked and sum to {:.4}; unlock one to fill the budget",
                    locked_total
                ),
            )),
            _ => None,
        }
    }
}

/// Rebalances unlocked entries so the whole set sums to 1.0.
///
/// Relative proportions among unlocked entries are preserved. The set is
/// marked settled afterwards.
pub fn normalize_locked(set: &mut WeightSet) -> NormalizeOutcome {
    let outcome = rebalance(set);
    set.mark_settled();
    if let Some(warning) = outcome.warning() {
        tracing::warn!(code = %warning.code, "{}", warning.message);
    }
    outcome
}

fn rebalance(set: &mut WeightSet) -> NormalizeOutcome {
    if set.is_empty() {
        return NormalizeOutcome::Empty;
    }

    let locked_total = set.locked_total();
    let has_unlocked = set.iter().any(|e| !e.locked);

    if locked_total >= 1.0 - WEIGHT_EPSILON {
        let mut discarded = 0.0;
        for entry in set.entries_mut().iter_mut().filter(|e| !e.locked) {
            discarded += entry.weight;
            entry.weight = 0.0;
        }
        return NormalizeOutcome::BudgetExhausted {
            locked_total,
            discarded,
        };
    }

    if !has_unlocked {
        return NormalizeOutcome::AllLocked { locked_total };
    }

    let remaining = 1.0 - locked_total;
    let unlocked_total = set.unlocked_total();

    if unlocked_total > WEIGHT_EPSILON {
        let factor = remaining / unlocked_total;
        for entry in set.entries_mut().iter_mut().filter(|e| !e.locked) {
            entry.weight *= factor;
        }
        return NormalizeOutcome::Scaled { factor };
    }

    let mut seeded = None;
    for entry in set.entries_mut().iter_mut().filter(|e| !e.locked) {
        if seeded.is_none() {
            entry.weight = remaining;
            seeded = Some(entry.influence);
        } else {
            entry.weight = 0.0;
        }
    }
    match seeded {
        Some(influence) => NormalizeOutcome::Seeded {
            influence,
            weight: remaining,
        },
        None => NormalizeOutcome::AllLocked { locked_total },
    }
}

/// Scales every entry, locked or not, so the set sums to 1.0.
pub fn normalize_plain(set: &mut WeightSet) -> EngineResult<()> {
    let total = set.total_weight();
    if total <= WEIGHT_EPSILON {
        return Err(EngineError::degenerate(format!(
            "cannot normalize {} influence(s) summing to {}",
            set.len(),
            total
        )));
    }
    for entry in set.entries_mut() {
        entry.weight /= total;
    }
    set.mark_settled();
    Ok(())
}

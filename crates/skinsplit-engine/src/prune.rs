//! Threshold pruning of weak influences.

use crate::error::{EngineError, EngineResult};
use crate::normalize::{normalize_locked, NormalizeOutcome};
use crate::weights::{InfluenceId, WeightSet, WEIGHT_EPSILON};

/// Result of a prune pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PruneReport {
    /// Influences removed from the set, in slider order.
    pub removed: Vec<InfluenceId>,
    /// Normalization run after removal, `None` if nothing was removed.
    pub normalization: Option<NormalizeOutcome>,
}

impl PruneReport {
    /// Returns true if the set was left untouched.
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Removes unlocked influences lighter than `threshold`, then renormalizes.
///
/// Locked influences are never pruned. The set is left as is if every entry
/// would be removed, or if only locked entries would remain without filling
/// the budget.
pub fn prune(set: &mut WeightSet, threshold: f64) -> EngineResult<PruneReport> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(EngineError::invalid_operation(format!(
            "prune threshold must be a non-negative number, got {}",
            threshold
        )));
    }

    let removed: Vec<InfluenceId> = set
        .iter()
        .filter(|e| !e.locked && e.weight < threshold)
        .map(|e| e.influence)
        .collect();

    let unlocked = set.iter().filter(|e| !e.locked).count();
    let strands_locks =
        removed.len() == unlocked && set.locked_total() < 1.0 - WEIGHT_EPSILON;
    if removed.is_empty() || strands_locks {
        return Ok(PruneReport {
            removed: Vec::new(),
            normalization: None,
        });
    }

    set.retain(|e| e.locked || e.weight >= threshold);
    let outcome = normalize_locked(set);
    tracing::debug!(
        removed = removed.len(),
        remaining = set.len(),
        threshold,
        "pruned weak influences"
    );

    Ok(PruneReport {
        removed,
        normalization: Some(outcome),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::WeightEntry;
    use pretty_assertions::assert_eq;

    fn id(n: u32) -> InfluenceId {
        InfluenceId(n)
    }

    #[test]
    fn test_prune_removes_and_renormalizes() {
        let mut set = WeightSet::load([(id(0), 0.5), (id(1), 0.05), (id(2), 0.45)]);

        let report = prune(&mut set, 0.1).unwrap();

        assert_eq!(report.removed, vec![id(1)]);
        assert_eq!(set.len(), 2);
        assert!((set.weight_of(id(0)).unwrap() - 0.5 / 0.95).abs() < 1e-9);
        assert!((set.weight_of(id(2)).unwrap() - 0.45 / 0.95).abs() < 1e-9);
        assert!((set.total_weight() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_prune_keeps_light_locked_entries() {
        let mut set = WeightSet::from_entries([
            WeightEntry::new(id(0), 0.9),
            WeightEntry::locked(id(1), 0.02),
            WeightEntry::new(id(2), 0.08),
        ]);

        let report = prune(&mut set, 0.1).unwrap();

        assert_eq!(report.removed, vec![id(2)]);
        assert_eq!(set.weight_of(id(1)), Some(0.02));
        assert!((set.weight_of(id(0)).unwrap() - 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_prune_never_empties_set() {
        let mut set = WeightSet::load([(id(0), 0.5), (id(1), 0.5)]);
        let report = prune(&mut set, 0.9).unwrap();
        assert!(report.is_noop());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_prune_never_leaves_only_underfilled_locks() {
        let mut set = WeightSet::from_entries([
            WeightEntry::locked(id(0), 0.3),
            WeightEntry::new(id(1), 0.05),
            WeightEntry::new(id(2), 0.65),
        ]);

        let report = prune(&mut set, 0.9).unwrap();

        assert!(report.is_noop());
        assert_eq!(report.normalization, None);
        assert_eq!(set.len(), 3);
        assert_eq!(set.weight_of(id(0)), Some(0.3));
    }

    #[test]
    fn test_prune_down_to_full_locks() {
        let mut set = WeightSet::from_entries([
            WeightEntry::locked(id(0), 1.0),
            WeightEntry::new(id(1), 0.0),
        ]);

        let report = prune(&mut set, 0.1).unwrap();

        assert_eq!(report.removed, vec![id(1)]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.weight_of(id(0)), Some(1.0));
    }

    #[test]
    fn test_prune_nothing_below_threshold() {
        let mut set = WeightSet::load([(id(0), 0.6), (id(1), 0.4)]);
        let report = prune(&mut set, 0.1).unwrap();
        assert!(report.is_noop());
        assert_eq!(report.normalization, None);
    }

    #[test]
    fn test_prune_empty_set_is_noop() {
        let mut set = WeightSet::new();
        assert!(prune(&mut set, 0.1).unwrap().is_noop());
        assert!(set.is_empty());
    }

    #[test]
    fn test_prune_rejects_bad_threshold() {
        let mut set = WeightSet::load([(id(0), 1.0)]);
        assert!(prune(&mut set, -0.1).is_err());
        assert!(prune(&mut set, f64::NAN).is_err());
    }
}

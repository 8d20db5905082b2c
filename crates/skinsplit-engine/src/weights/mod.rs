//! Weight entries and the per-point weight set.
//!
//! A [`WeightSet`] is the ordered list of bone influences of one point. Its
//! order is the display order of the partition slider, so operations keep it
//! stable and only [`WeightSet::reduce_to_capacity`] reorders entries.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};


/// Weights at or below this value are treated as absent.
pub const WEIGHT_EPSILON: f64 = 1e-4;

/// Index of a bone in the host skeleton table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InfluenceId(pub u32);

impl fmt::Display for InfluenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bone#{}", self.0)
    }
}

/// Index of a point (vertex) in the host mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub usize);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One influence of a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    /// Bone this entry refers to.
    pub influence: InfluenceId,
    /// Share of the point's total weight, in `[0, 1]`.
    pub weight: f64,
    /// Locked entries are skipped by automatic redistribution.
    #[serde(default)]
    pub locked: bool,
}

impl WeightEntry {
    /// Creates a new unlocked entry.
    pub fn new(influence: InfluenceId, weight: f64) -> Self {
        Self {
            influence,
            weight,
            locked: false,
        }
    }

    /// Creates a new locked entry.
    pub fn locked(influence: InfluenceId, weight: f64) -> Self {
        Self {
            influence,
            weight,
            locked: true,
        }
    }
}

/// Ordered influences of a single point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightSet {
    entries: Vec<WeightEntry>,
    #[serde(skip)]
    dirty: bool,
}

impl WeightSet {
    /// Creates an empty weight set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a weight set from raw host pairs.
    ///
    /// Pairs with a weight at or below [`WEIGHT_EPSILON`] (or a non-finite
    /// weight) are dropped. Repeated influences are merged. The result is not
    /// normalized.
    pub fn load(raw: impl IntoIterator<Item = (InfluenceId, f64)>) -> Self {
        Self::load_with_epsilon(raw, WEIGHT_EPSILON)
    }

    /// Same as [`WeightSet::load`] with an explicit drop threshold.
    pub fn load_with_epsilon(
        raw: impl IntoIterator<Item = (InfluenceId, f64)>,
        epsilon: f64,
    ) -> Self {
        let entries = raw
            .into_iter()
            .filter(|(_, weight)| weight.is_finite() && *weight > epsilon)
            .map(|(influence, weight)| WeightEntry::new(influence, weight));
        Self::from_entries(entries)
    }

    /// Builds a weight set from entries, merging repeated influences.
    ///
    /// A merged entry keeps the position of its first occurrence and is
    /// locked if any occurrence was.
    pub fn from_entries(entries: impl IntoIterator<Item = WeightEntry>) -> Self {
        let mut merged: Vec<WeightEntry> = Vec::new();
        for entry in entries {
            let weight = if entry.weight.is_finite() {
                entry.weight.max(0.0)
            } else {
                0.0
            };
            match merged.iter_mut().find(|e| e.influence == entry.influence) {
                Some(existing) => {
                    existing.weight += weight;
                    existing.locked |= entry.locked;
                }
                None => merged.push(WeightEntry { weight, ..entry }),
            }
        }
        Self {
            entries: merged,
            dirty: false,
        }
    }

    /// Returns the entries in slider order.
    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [WeightEntry] {
        &mut self.entries
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&WeightEntry) -> bool) {
        self.entries.retain(keep);
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the entries in slider order.
    pub fn iter(&self) -> std::slice::Iter<'_, WeightEntry> {
        self.entries.iter()
    }

    /// Returns the slider index of an influence.
    pub fn position(&self, influence: InfluenceId) -> Option<usize> {
        self.entries.iter().position(|e| e.influence == influence)
    }

    /// Returns the entry of an influence.
    pub fn get(&self, influence: InfluenceId) -> Option<&WeightEntry> {
        self.entries.iter().find(|e| e.influence == influence)
    }

    /// Returns the weight of an influence.
    pub fn weight_of(&self, influence: InfluenceId) -> Option<f64> {
        self.get(influence).map(|e| e.weight)
    }

    /// Returns true if the influence is present and locked.
    pub fn is_locked(&self, influence: InfluenceId) -> bool {
        self.get(influence).is_some_and(|e| e.locked)
    }

    /// Sets the weight of an unlocked influence.
    ///
    /// The set becomes dirty and must be normalized before it is committed.
    pub fn set_weight(&mut self, influence: InfluenceId, weight: f64) -> EngineResult<()> {
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(EngineError::invalid_operation(format!(
                "weight {} for {} is outside [0, 1]",
                weight, influence
            )));
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.influence == influence)
            .ok_or_else(|| not_an_influence(influence))?;
        if entry.locked {
            return Err(EngineError::invalid_operation(format!(
                "{} is locked; unlock it before editing",
                influence
            )));
        }
        entry.weight = weight;
        self.dirty = true;
        Ok(())
    }

    /// Flips the lock flag of an influence and returns the new state.
    pub fn toggle_lock(&mut self, influence: InfluenceId) -> EngineResult<bool> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.influence == influence)
            .ok_or_else(|| not_an_influence(influence))?;
        entry.locked = !entry.locked;
        Ok(entry.locked)
    }

    pub(crate) fn set_locked(&mut self, influence: InfluenceId, locked: bool) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.influence == influence) {
            entry.locked = locked;
        }
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Sum of locked weights.
    pub fn locked_total(&self) -> f64 {
        self.entries.iter().filter(|e| e.locked).map(|e| e.weight).sum()
    }

    /// Sum of unlocked weights.
    pub fn unlocked_total(&self) -> f64 {
        self.entries.iter().filter(|e| !e.locked).map(|e| e.weight).sum()
    }

    /// Returns true if a direct edit is waiting for normalization.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_settled(&mut self) {
        self.dirty = false;
    }

    /// Returns true if the set is clean and its weights sum to 1.0 within
    /// `tolerance`.
    pub fn is_settled(&self, tolerance: f64) -> bool {
        !self.dirty && (self.total_weight() - 1.0).abs() <= tolerance
    }

    /// Returns a copy with every lock flag cleared.
    pub fn to_unlocked(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|e| WeightEntry::new(e.influence, e.weight))
                .collect(),
            dirty: self.dirty,
        }
    }

    /// Returns the `(influence, weight)` pairs in slider order.
    pub fn pairs(&self) -> Vec<(InfluenceId, f64)> {
        self.entries.iter().map(|e| (e.influence, e.weight)).collect()
    }

    /// Keeps the `capacity` heaviest entries and renormalizes them to 1.0.
    ///
    /// Entries are returned heaviest first; equal weights keep their slider
    /// order. Lock flags are carried over.
    pub fn reduce_to_capacity(&self, capacity: usize) -> EngineResult<WeightSet> {
        let mut ranked: Vec<WeightEntry> = self.entries.clone();
        ranked.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
        ranked.truncate(capacity);

        let total: f64 = ranked.iter().map(|e| e.weight).sum();
        if total <= WEIGHT_EPSILON {
            return Err(EngineError::degenerate(format!(
                "the {} heaviest influence(s) carry no weight",
                ranked.len()
            )));
        }
        for entry in &mut ranked {
            entry.weight /= total;
        }
        Ok(WeightSet {
            entries: ranked,
            dirty: false,
        })
    }
}

fn not_an_influence(influence: InfluenceId) -> EngineError {
    EngineError::invalid_operation(format!("{} is not an influence of this vertex", influence))
}

impl<'a> IntoIterator for &'a WeightSet {
    type Item = &'a WeightEntry;
    type IntoIter = std::slice::Iter<'a, WeightEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

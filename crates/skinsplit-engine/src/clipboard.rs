//! Weight copy/paste between points.

use crate::error::{EngineError, EngineResult};
use crate::weights::WeightSet;

/// Holds at most one copied weight set.
///
/// The snapshot is an owned copy: editing the source afterwards does not
/// change what gets pasted.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    snapshot: Option<WeightSet>,
}

impl Clipboard {
    /// Creates an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a copy of `set` with every lock flag cleared.
    pub fn copy(&mut self, set: &WeightSet) {
        self.snapshot = Some(set.to_unlocked());
    }

    /// Returns a fresh, unlocked copy of the stored snapshot.
    ///
    /// A snapshot of a point without influences counts as empty.
    pub fn paste(&self) -> EngineResult<WeightSet> {
        self.snapshot
            .as_ref()
            .filter(|set| !set.is_empty())
            .map(WeightSet::to_unlocked)
            .ok_or(EngineError::EmptyClipboard)
    }

    /// Returns the stored snapshot without copying it.
    pub fn peek(&self) -> Option<&WeightSet> {
        self.snapshot.as_ref()
    }

    /// Number of influences in the snapshot.
    pub fn len(&self) -> usize {
        self.snapshot.as_ref().map_or(0, WeightSet::len)
    }

    /// Returns true if nothing (or an empty set) was copied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops the snapshot.
    pub fn clear(&mut self) {
        self.snapshot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::InfluenceId;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_paste_before_copy_fails() {
        let clipboard = Clipboard::new();
        assert_eq!(clipboard.paste(), Err(EngineError::EmptyClipboard));
        assert!(clipboard.is_empty());
    }

    #[test]
    fn test_copy_paste_round_trip_unlocks() {
        let mut set = WeightSet::load([(InfluenceId(4), 0.7), (InfluenceId(2), 0.3)]);
        set.toggle_lock(InfluenceId(4)).unwrap();

        let mut clipboard = Clipboard::new();
        clipboard.copy(&set);
        let pasted = clipboard.paste().unwrap();

        assert_eq!(pasted.pairs(), set.pairs());
        assert!(pasted.iter().all(|e| !e.locked));
        assert_eq!(clipboard.len(), 2);
    }

    #[test]
    fn test_snapshot_does_not_alias_source() {
        let mut set = WeightSet::load([(InfluenceId(0), 0.5), (InfluenceId(1), 0.5)]);
        let mut clipboard = Clipboard::new();
        clipboard.copy(&set);

        set.set_weight(InfluenceId(0), 0.1).unwrap();

        let pasted = clipboard.paste().unwrap();
        assert_eq!(pasted.weight_of(InfluenceId(0)), Some(0.5));
    }

    #[test]
    fn test_paste_twice_yields_independent_sets() {
        let mut clipboard = Clipboard::new();
        clipboard.copy(&WeightSet::load([(InfluenceId(0), 1.0)]));

        let mut first = clipboard.paste().unwrap();
        first.set_weight(InfluenceId(0), 0.2).unwrap();
        let second = clipboard.paste().unwrap();
        assert_eq!(second.weight_of(InfluenceId(0)), Some(1.0));
    }

    #[test]
    fn test_empty_snapshot_cannot_be_pasted() {
        let mut clipboard = Clipboard::new();
        clipboard.copy(&WeightSet::new());

        assert!(clipboard.is_empty());
        assert!(clipboard.peek().is_some());
        assert_eq!(clipboard.paste(), Err(EngineError::EmptyClipboard));
    }

    #[test]
    fn test_clear() {
        let mut clipboard = Clipboard::new();
        clipboard.copy(&WeightSet::load([(InfluenceId(0), 1.0)]));
        clipboard.clear();
        assert!(clipboard.peek().is_none());
        assert!(clipboard.paste().is_err());
    }
}

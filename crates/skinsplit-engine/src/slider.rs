//! Partition slider: drag-based weight redistribution.
//!
//! The slider lays the weight set out as contiguous intervals on `[0, 1]`.
//! Boundary `i` separates entry `i` from entry `i + 1`. Dragging a boundary
//! moves weight between the nearest unlocked entry on its left and the
//! nearest unlocked entry on its right, skipping locked entries in between.
//!
//! ## Invariants
//!
//! 1. A drag update changes exactly two entries and conserves their sum, so
//!    the total weight never changes and no normalization pass is needed.
//! 2. No weight ever goes below zero; overflow passes through to the other
//!    target.
//! 3. Only the slider that grabbed a boundary reacts to drag and release
//!    events, identified by its [`SliderToken`].

use serde::{Deserialize, Serialize};

use crate::config::SliderMetrics;
use crate::weights::{InfluenceId, WeightSet};

/// Identity of one slider widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SliderToken(pub u64);

/// Drag state of a slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliderState {
    /// No boundary is held.
    #[default]
    Idle,
    /// A boundary is being dragged by `owner`.
    Dragging { boundary: usize, owner: SliderToken },
}

/// Pointer input routed to a slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderEvent {
    /// Pointer pressed on a boundary.
    Grab { owner: SliderToken, boundary: usize },
    /// Pointer moved by `delta`, in weight units (positive moves right).
    Drag { owner: SliderToken, delta: f64 },
    /// Pointer released.
    Release { owner: SliderToken },
}

impl SliderEvent {
    /// Returns the slider the event is addressed to.
    pub fn owner(&self) -> SliderToken {
        match *self {
            SliderEvent::Grab { owner, .. }
            | SliderEvent::Drag { owner, .. }
            | SliderEvent::Release { owner } => owner,
        }
    }
}

/// Finds the nearest unlocked entry at or left of `start`.
fn nearest_unlocked_left(set: &WeightSet, start: usize) -> Option<usize> {
    let entries = set.entries();
    if entries.is_empty() {
        return None;
    }
    let start = start.min(entries.len() - 1);
    (0..=start).rev().find(|&i| !entries[i].locked)
}

/// Finds the nearest unlocked entry at or right of `start`.
fn nearest_unlocked_right(set: &WeightSet, start: usize) -> Option<usize> {
    let entries = set.entries();
    (start..entries.len()).find(|&i| !entries[i].locked)
}

/// Returns the `(left, right)` entry indices a drag of `boundary` moves
/// weight between, or `None` if the boundary is a fixed divider.
pub fn drag_targets(set: &WeightSet, boundary: usize) -> Option<(usize, usize)> {
    if boundary + 1 >= set.len() {
        return None;
    }
    let left = nearest_unlocked_left(set, boundary)?;
    let right = nearest_unlocked_right(set, boundary + 1)?;
    Some((left, right))
}

/// Returns true if `boundary` can be grabbed.
pub fn can_grab(set: &WeightSet, boundary: usize) -> bool {
    drag_targets(set, boundary).is_some()
}

/// Moves `delta` of weight from entry `right` to entry `left`.
///
/// Whichever side would go negative is clamped to zero and the overflow is
/// taken from the other side, keeping `left + right` constant.
pub fn transfer(set: &mut WeightSet, left: usize, right: usize, delta: f64) -> bool {
    if !delta.is_finite() || delta == 0.0 || left == right {
        return false;
    }
    let entries = set.entries_mut();
    if left >= entries.len() || right >= entries.len() {
        return false;
    }

    let pair_total = entries[left].weight + entries[right].weight;
    let mut left_weight = entries[left].weight + delta;
    let mut right_weight = entries[right].weight - delta;

    if left_weight < 0.0 {
        let overflow = -left_weight;
        left_weight = 0.0;
        right_weight -= overflow;
    } else if right_weight < 0.0 {
        let overflow = -right_weight;
        right_weight = 0.0;
        left_weight -= overflow;
    }

    // Rounding may leave the clamped side a hair off; pin it to the pair sum.
    if left_weight == 0.0 {
        right_weight = pair_total;
    } else if right_weight == 0.0 {
        left_weight = pair_total;
    }

    let changed = left_weight != entries[left].weight || right_weight != entries[right].weight;
    entries[left].weight = left_weight;
    entries[right].weight = right_weight;
    changed
}

/// Drag state machine for one slider widget.
#[derive(Debug, Clone)]
pub struct PartitionSlider {
    token: SliderToken,
    state: SliderState,
}

impl PartitionSlider {
    /// Creates an idle slider with the given identity.
    pub fn new(token: SliderToken) -> Self {
        Self {
            token,
            state: SliderState::Idle,
        }
    }

    /// Returns this slider's identity.
    pub fn token(&self) -> SliderToken {
        self.token
    }

    /// Returns the current drag state.
    pub fn state(&self) -> SliderState {
        self.state
    }

    /// Returns true while a boundary is held.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SliderState::Dragging { .. })
    }

    /// Starts dragging `boundary`.
    ///
    /// Ignored (returns false) while already dragging or if the boundary is a
    /// fixed divider.
    pub fn grab(&mut self, set: &WeightSet, boundary: usize) -> bool {
        if self.is_dragging() || !can_grab(set, boundary) {
            return false;
        }
        self.state = SliderState::Dragging {
            boundary,
            owner: self.token,
        };
        true
    }

    /// Applies a drag delta to the held boundary. Returns true if any weight
    /// changed.
    pub fn drag(&mut self, set: &mut WeightSet, delta: f64) -> bool {
        let SliderState::Dragging { boundary, .. } = self.state else {
            return false;
        };
        // Targets are resolved per update so lock changes mid-drag apply.
        match drag_targets(set, boundary) {
            Some((left, right)) => transfer(set, left, right, delta),
            None => false,
        }
    }

    /// Ends the drag. Returns true if a drag was in progress.
    pub fn release(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = SliderState::Idle;
        was_dragging
    }

    /// Routes an event to this slider. Events addressed to other sliders are
    /// ignored. Returns true if weights changed.
    pub fn handle(&mut self, set: &mut WeightSet, event: SliderEvent) -> bool {
        if event.owner() != self.token {
            return false;
        }
        match event {
            SliderEvent::Grab { boundary, .. } => {
                self.grab(set, boundary);
                false
            }
            SliderEvent::Drag { delta, .. } => self.drag(set, delta),
            SliderEvent::Release { .. } => {
                self.release();
                false
            }
        }
    }
}

// =============================================================================
// Layout
// =============================================================================

/// One entry's interval on the slider track, in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Slider index of the entry.
    pub index: usize,
    /// Influence the segment belongs to.
    pub influence: InfluenceId,
    /// Left edge, from the start of the track.
    pub start: f64,
    /// Segment width.
    pub width: f64,
    /// Whether the segment is wide enough for a label.
    pub show_label: bool,
}

/// One boundary on the slider track, in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    /// Boundary index (between entries `index` and `index + 1`).
    pub index: usize,
    /// Position from the start of the track.
    pub position: f64,
    /// Fixed dividers cannot be grabbed.
    pub grabbable: bool,
}

/// Pixel layout of a weight set on a slider track.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderLayout {
    /// Track width in pixels.
    pub width: f64,
    /// Entry intervals in slider order.
    pub segments: Vec<Segment>,
    /// Boundaries between consecutive segments.
    pub boundaries: Vec<Boundary>,
    handle_width: f64,
}

impl SliderLayout {
    /// Lays out `set` on a track `width` pixels wide.
    ///
    /// Weights are scaled by their total so the segments always fill the
    /// track, even while a direct edit is waiting for normalization.
    pub fn compute(set: &WeightSet, width: f64, metrics: &SliderMetrics) -> Self {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let total = set.total_weight();
        let scale = if total > 0.0 { width / total } else { 0.0 };

        let mut segments = Vec::with_capacity(set.len());
        let mut boundaries = Vec::with_capacity(set.len().saturating_sub(1));
        let mut cursor = 0.0;

        for (index, entry) in set.iter().enumerate() {
            let segment_width = entry.weight * scale;
            segments.push(Segment {
                index,
                influence: entry.influence,
                start: cursor,
                width: segment_width,
                show_label: segment_width > metrics.min_label_width,
            });
            cursor += segment_width;

            if index + 1 < set.len() {
                boundaries.push(Boundary {
                    index,
                    position: cursor,
                    grabbable: can_grab(set, index),
                });
            }
        }

        Self {
            width,
            segments,
            boundaries,
            handle_width: metrics.handle_width,
        }
    }

    /// Returns the grabbable boundary under pixel `x`, if any.
    ///
    /// When handles overlap the closest boundary wins.
    pub fn hit_test(&self, x: f64) -> Option<usize> {
        let half = self.handle_width / 2.0;
        self.boundaries
            .iter()
            .filter(|b| b.grabbable && (x - b.position).abs() <= half)
            .min_by(|a, b| {
                (x - a.position)
                    .abs()
                    .partial_cmp(&(x - b.position).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|b| b.index)
    }

    /// Converts a pointer movement in pixels to a weight delta.
    pub fn delta_for(&self, dx: f64) -> f64 {
        if self.width > 0.0 {
            dx / self.width
        } else {
            0.0
        }
    }
}

/// Formats the label drawn inside a segment, e.g. `"Arm_L 40%"`.
pub fn segment_label(name: &str, weight: f64) -> String {
    format!("{} {:.0}%", name, weight * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::WeightEntry;
    use pretty_assertions::assert_eq;

    fn id(n: u32) -> InfluenceId {
        InfluenceId(n)
    }

    fn make_set(entries: &[(f64, bool)]) -> WeightSet {
        WeightSet::from_entries(entries.iter().enumerate().map(|(i, &(w, locked))| WeightEntry {
            influence: id(i as u32),
            weight: w,
            locked,
        }))
    }

    fn weights(set: &WeightSet) -> Vec<f64> {
        set.iter().map(|e| e.weight).collect()
    }

    const OWNER: SliderToken = SliderToken(1);

    #[test]
    fn test_adjacent_targets() {
        let set = make_set(&[(0.5, false), (0.3, false), (0.2, false)]);
        assert_eq!(drag_targets(&set, 0), Some((0, 1)));
        assert_eq!(drag_targets(&set, 1), Some((1, 2)));
        assert_eq!(drag_targets(&set, 2), None);
    }

    #[test]
    fn test_targets_skip_locked_entries() {
        let set = make_set(&[(0.2, false), (0.3, true), (0.1, true), (0.4, false)]);
        assert_eq!(drag_targets(&set, 1), Some((0, 3)));
        assert_eq!(drag_targets(&set, 2), Some((0, 3)));
    }

    #[test]
    fn test_locked_tail_boundary_not_grabbable() {
        let set = make_set(&[(0.5, false), (0.2, false), (0.3, true)]);
        assert!(can_grab(&set, 0));
        assert!(!can_grab(&set, 1));
    }

    #[test]
    fn test_locked_head_boundary_not_grabbable() {
        let set = make_set(&[(0.3, true), (0.7, false)]);
        assert!(!can_grab(&set, 0));
    }

    #[test]
    fn test_drag_conserves_pair_sum() {
        let mut set = make_set(&[(0.5, false), (0.3, false), (0.2, false)]);
        let mut slider = PartitionSlider::new(OWNER);
        assert!(slider.grab(&set, 0));

        let before = set.entries()[0].weight + set.entries()[1].weight;
        assert!(slider.drag(&mut set, 0.1));
        let after = set.entries()[0].weight + set.entries()[1].weight;

        assert!((before - after).abs() < 1e-12);
        assert!((set.entries()[0].weight - 0.6).abs() < 1e-12);
        assert_eq!(set.entries()[2].weight, 0.2);
    }

    #[test]
    fn test_drag_clamps_left_with_pass_through() {
        let mut set = make_set(&[(0.2, false), (0.5, false), (0.3, false)]);
        let mut slider = PartitionSlider::new(OWNER);
        slider.grab(&set, 0);
        slider.drag(&mut set, -0.5);

        assert_eq!(set.entries()[0].weight, 0.0);
        assert!((set.entries()[1].weight - 0.7).abs() < 1e-12);
        assert!((set.total_weight() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_drag_clamps_right_with_pass_through() {
        let mut set = make_set(&[(0.4, false), (0.1, false), (0.5, false)]);
        let mut slider = PartitionSlider::new(OWNER);
        slider.grab(&set, 0);
        slider.drag(&mut set, 0.9);

        assert!((set.entries()[0].weight - 0.5).abs() < 1e-12);
        assert_eq!(set.entries()[1].weight, 0.0);
    }

    #[test]
    fn test_drag_across_locked_leaves_locked_untouched() {
        let mut set = make_set(&[(0.2, false), (0.3, true), (0.5, false)]);
        let mut slider = PartitionSlider::new(OWNER);
        assert!(slider.grab(&set, 0));
        slider.drag(&mut set, 0.1);

        let w = weights(&set);
        assert!((w[0] - 0.3).abs() < 1e-12);
        assert_eq!(w[1], 0.3);
        assert!((w[2] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_drag_without_grab_is_noop() {
        let mut set = make_set(&[(0.5, false), (0.5, false)]);
        let mut slider = PartitionSlider::new(OWNER);
        assert!(!slider.drag(&mut set, 0.2));
        assert_eq!(weights(&set), vec![0.5, 0.5]);
    }

    #[test]
    fn test_grab_while_dragging_ignored() {
        let set = make_set(&[(0.4, false), (0.3, false), (0.3, false)]);
        let mut slider = PartitionSlider::new(OWNER);
        assert!(slider.grab(&set, 0));
        assert!(!slider.grab(&set, 1));
        assert_eq!(
            slider.state(),
            SliderState::Dragging {
                boundary: 0,
                owner: OWNER
            }
        );
    }

    #[test]
    fn test_grab_fixed_divider_stays_idle() {
        let set = make_set(&[(0.5, false), (0.5, true)]);
        let mut slider = PartitionSlider::new(OWNER);
        assert!(!slider.grab(&set, 0));
        assert_eq!(slider.state(), SliderState::Idle);
    }

    #[test]
    fn test_release_returns_to_idle_without_rollback() {
        let mut set = make_set(&[(0.5, false), (0.5, false)]);
        let mut slider = PartitionSlider::new(OWNER);
        slider.grab(&set, 0);
        slider.drag(&mut set, 0.25);
        assert!(slider.release());
        assert_eq!(slider.state(), SliderState::Idle);
        assert_eq!(weights(&set), vec![0.75, 0.25]);
        assert!(!slider.release());
    }

    #[test]
    fn test_lock_mid_drag_stops_updates() {
        let mut set = make_set(&[(0.5, false), (0.5, false)]);
        let mut slider = PartitionSlider::new(OWNER);
        slider.grab(&set, 0);
        set.toggle_lock(id(1)).unwrap();
        assert!(!slider.drag(&mut set, 0.1));
        assert_eq!(weights(&set), vec![0.5, 0.5]);
    }

    #[test]
    fn test_events_for_other_owner_ignored() {
        let mut set = make_set(&[(0.5, false), (0.5, false)]);
        let mut first = PartitionSlider::new(SliderToken(1));
        let mut second = PartitionSlider::new(SliderToken(2));

        first.handle(&mut set, SliderEvent::Grab { owner: SliderToken(1), boundary: 0 });
        let changed = second.handle(
            &mut set,
            SliderEvent::Drag {
                owner: SliderToken(1),
                delta: 0.2,
            },
        );
        assert!(!changed);
        assert!(!second.is_dragging());

        second.handle(&mut set, SliderEvent::Release { owner: SliderToken(2) });
        assert!(first.is_dragging());

        assert!(first.handle(&mut set, SliderEvent::Drag { owner: SliderToken(1), delta: 0.2 }));
        assert!((set.entries()[0].weight - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_delta_ignored() {
        let mut set = make_set(&[(0.5, false), (0.5, false)]);
        assert!(!transfer(&mut set, 0, 1, f64::NAN));
        assert!(!transfer(&mut set, 0, 1, f64::INFINITY));
        assert_eq!(weights(&set), vec![0.5, 0.5]);
    }

    #[test]
    fn test_layout_positions_and_grabbable() {
        let set = make_set(&[(0.5, false), (0.25, false), (0.25, true)]);
        let layout = SliderLayout::compute(&set, 200.0, &SliderMetrics::default());

        assert_eq!(layout.segments.len(), 3);
        assert_eq!(layout.segments[1].start, 100.0);
        assert_eq!(layout.segments[1].width, 50.0);
        assert!(layout.segments[0].show_label);

        let positions: Vec<_> = layout.boundaries.iter().map(|b| b.position).collect();
        assert_eq!(positions, vec![100.0, 150.0]);
        let grabbable: Vec<_> = layout.boundaries.iter().map(|b| b.grabbable).collect();
        assert_eq!(grabbable, vec![true, false]);
    }

    #[test]
    fn test_layout_hides_narrow_labels() {
        let set = make_set(&[(0.9, false), (0.1, false)]);
        let layout = SliderLayout::compute(&set, 200.0, &SliderMetrics::default());
        assert!(layout.segments[0].show_label);
        assert!(!layout.segments[1].show_label);
    }

    #[test]
    fn test_hit_test() {
        let set = make_set(&[(0.5, false), (0.25, false), (0.25, true)]);
        let layout = SliderLayout::compute(&set, 200.0, &SliderMetrics::default());
        assert_eq!(layout.hit_test(103.0), Some(0));
        assert_eq!(layout.hit_test(120.0), None);
        // Fixed divider at 150 is never hit.
        assert_eq!(layout.hit_test(150.0), None);
    }

    #[test]
    fn test_delta_for_pixels() {
        let set = make_set(&[(0.5, false), (0.5, false)]);
        let layout = SliderLayout::compute(&set, 250.0, &SliderMetrics::default());
        assert_eq!(layout.delta_for(25.0), 0.1);
        let empty = SliderLayout::compute(&set, 0.0, &SliderMetrics::default());
        assert_eq!(empty.delta_for(25.0), 0.0);
    }

    #[test]
    fn test_segment_label() {
        assert_eq!(segment_label("Arm_L", 0.4), "Arm_L 40%");
        assert_eq!(segment_label("Spine", 0.126), "Spine 13%");
    }
}

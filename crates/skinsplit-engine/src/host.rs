//! Host collaborator traits.
//!
//! The engine never owns mesh data. A host editor implements these traits
//! over its own mesh, skeleton, picking and undo systems:
//!
//! - [`SkinStore`]: per-point influence storage with a fixed capacity
//! - [`Skeleton`]: bone names and point positions
//! - [`PointPicker`]: nearest-point queries
//! - [`History`]: undo snapshots taken before every write
//!
//! [`Host`] is implemented automatically for any type providing all four.

use crate::error::{EngineError, EngineResult, EngineWarning, HostError, WarningCode};
use crate::weights::{InfluenceId, PointId, WeightSet};

/// Per-point influence storage.
pub trait SkinStore {
    /// Returns the stored `(influence, weight)` pairs of a point, or `None`
    /// if the point does not exist.
    fn weights_of(&self, point: PointId) -> Option<Vec<(InfluenceId, f64)>>;

    /// Replaces the influences of a point.
    ///
    /// The engine only calls this with at most the configured capacity of
    /// entries, summing to 1.0.
    fn set_weights(
        &mut self,
        point: PointId,
        weights: &[(InfluenceId, f64)],
    ) -> Result<(), HostError>;
}

/// Bone names and point positions.
pub trait Skeleton {
    /// Returns the display name of a bone.
    fn name_of(&self, influence: InfluenceId) -> Option<String>;

    /// Looks a bone up by name.
    fn id_of(&self, name: &str) -> Option<InfluenceId>;

    /// Returns the position of a point in the space mirroring happens in.
    fn position_of(&self, point: PointId) -> Option<[f64; 3]>;
}

/// Nearest-point queries.
pub trait PointPicker {
    /// Returns the point under a viewport cursor, if one is close enough.
    fn nearest_point(&self, cursor: [f64; 2]) -> Option<PointId>;

    /// Returns the point closest to a position.
    fn nearest_point_to_position(&self, position: [f64; 3]) -> Option<PointId>;
}

/// Undo recording.
pub trait History {
    /// Called before the weights of `point` are written.
    fn record_before_mutation(&mut self, point: PointId);
}

/// Everything an edit session needs from its host.
pub trait Host: SkinStore + Skeleton + PointPicker + History {}

impl<T: SkinStore + Skeleton + PointPicker + History> Host for T {}

/// Resolves a bone name for display, falling back to `"Bone <index>"` when the
/// skeleton has no name for it.
pub fn display_name<S: Skeleton + ?Sized>(skeleton: &S, influence: InfluenceId) -> String {
    skeleton
        .name_of(influence)
        .unwrap_or_else(|| format!("Bone {}", influence.0))
}

/// What a commit wrote to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    /// Point that was written.
    pub point: PointId,
    /// Weights as stored: at most `capacity` entries, heaviest first.
    pub stored: WeightSet,
    /// Set when influences beyond the capacity were dropped.
    pub warning: Option<EngineWarning>,
}

/// Reduces `set` to `capacity` influences and writes it to `point`.
///
/// The set must be settled (no pending direct edit) and non-empty. History is
/// recorded immediately before the write.
pub fn commit<H: SkinStore + History + ?Sized>(
    host: &mut H,
    point: PointId,
    set: &WeightSet,
    capacity: usize,
) -> EngineResult<CommitReport> {
    if set.is_dirty() {
        return Err(EngineError::invalid_operation(
            "weight set has edits that were not normalized",
        ));
    }
    if set.is_empty() {
        return Err(EngineError::degenerate(format!(
            "vertex {} would be left without influences",
            point
        )));
    }

    let stored = set.reduce_to_capacity(capacity)?;
    let warning = (set.len() > capacity).then(|| {
        EngineWarning::new(
            WarningCode::CapacityTruncated,
            format!(
                "vertex {} has {} influences; kept the {} heaviest",
                point,
                set.len(),
                capacity
            ),
        )
    });
    if let Some(ref warning) = warning {
        tracing::warn!(code = %warning.code, "{}", warning.message);
    }

    host.record_before_mutation(point);
    host.set_weights(point, &stored.pairs())?;
    tracing::debug!(point = point.0, influences = stored.len(), "committed vertex weights");

    Ok(CommitReport {
        point,
        stored,
        warning,
    })
}

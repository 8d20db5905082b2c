//! In-memory host fixture.

use skinsplit_engine::{
    History, HostError, InfluenceId, PointId, PointPicker, Skeleton, SkinStore,
};

/// Maximum cursor distance (pixels) for a click to pick a vertex.
pub const PICK_RADIUS: f64 = 30.0;

/// A vertex of the fixture mesh.
#[derive(Debug, Clone)]
pub struct FixturePoint {
    pub position: [f64; 3],
    pub weights: Vec<(InfluenceId, f64)>,
}

/// Host with a named skeleton, a list of vertices and an undo log.
///
/// The cursor space is the XY plane of the vertex positions scaled by
/// `pixels_per_unit`.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    pub bones: Vec<String>,
    pub points: Vec<FixturePoint>,
    pub history: Vec<PointId>,
    pub writes: usize,
    pub capacity: usize,
    pub read_only: bool,
    pub pixels_per_unit: f64,
}

impl MemoryHost {
    /// Creates a host with the given bone names and no vertices.
    pub fn new(bones: &[&str]) -> Self {
        Self {
            bones: bones.iter().map(|b| b.to_string()).collect(),
            points: Vec::new(),
            history: Vec::new(),
            writes: 0,
            capacity: 4,
            read_only: false,
            pixels_per_unit: 100.0,
        }
    }

    /// A small humanoid skeleton using `_L`/`_R` suffixes.
    pub fn humanoid() -> Self {
        Self::new(&[
            "Hips", "Spine", "Chest", "Neck", "Head", "Arm_L", "Arm_R", "Forearm_L", "Forearm_R",
            "Hand_L", "Hand_R", "Leg_L", "Leg_R",
        ])
    }

    /// Returns the id of a bone by name. Panics if it does not exist.
    pub fn bone(&self, name: &str) -> InfluenceId {
        self.id_of(name)
            .unwrap_or_else(|| panic!("fixture has no bone named '{}'", name))
    }

    /// Adds a vertex with weights given by bone name.
    pub fn add_point(&mut self, position: [f64; 3], weights: &[(&str, f64)]) -> PointId {
        let weights = weights
            .iter()
            .map(|(name, weight)| (self.bone(name), *weight))
            .collect();
        self.points.push(FixturePoint { position, weights });
        PointId(self.points.len() - 1)
    }

    /// Returns the stored weights of a vertex by bone name, in stored order.
    pub fn named_weights(&self, point: PointId) -> Vec<(String, f64)> {
        self.points[point.0]
            .weights
            .iter()
            .map(|(id, w)| (self.bones[id.0 as usize].clone(), *w))
            .collect()
    }

    /// Returns the stored weight of one bone on a vertex (0 if absent).
    pub fn weight(&self, point: PointId, bone: &str) -> f64 {
        let id = self.bone(bone);
        self.points[point.0]
            .weights
            .iter()
            .find(|(i, _)| *i == id)
            .map_or(0.0, |(_, w)| *w)
    }

    /// Cursor position of a vertex.
    pub fn cursor_of(&self, point: PointId) -> [f64; 2] {
        let p = self.points[point.0].position;
        [p[0] * self.pixels_per_unit, p[1] * self.pixels_per_unit]
    }
}

impl SkinStore for MemoryHost {
    fn weights_of(&self, point: PointId) -> Option<Vec<(InfluenceId, f64)>> {
        self.points.get(point.0).map(|p| p.weights.clone())
    }

    fn set_weights(
        &mut self,
        point: PointId,
        weights: &[(InfluenceId, f64)],
    ) -> Result<(), HostError> {
        if self.read_only {
            return Err(HostError::new("mesh is read-only"));
        }
        if weights.len() > self.capacity {
            return Err(HostError::new(format!(
                "{} influences exceed capacity {}",
                weights.len(),
                self.capacity
            )));
        }
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > 1e-3 {
            return Err(HostError::new(format!("weights sum to {}", total)));
        }
        let slot = self
            .points
            .get_mut(point.0)
            .ok_or_else(|| HostError::new(format!("no vertex {}", point)))?;
        slot.weights = weights.to_vec();
        self.writes += 1;
        Ok(())
    }
}

impl Skeleton for MemoryHost {
    fn name_of(&self, influence: InfluenceId) -> Option<String> {
        self.bones.get(influence.0 as usize).cloned()
    }

    fn id_of(&self, name: &str) -> Option<InfluenceId> {
        self.bones
            .iter()
            .position(|b| b == name)
            .map(|i| InfluenceId(i as u32))
    }

    fn position_of(&self, point: PointId) -> Option<[f64; 3]> {
        self.points.get(point.0).map(|p| p.position)
    }
}

impl PointPicker for MemoryHost {
    fn nearest_point(&self, cursor: [f64; 2]) -> Option<PointId> {
        let mut best = None;
        let mut best_distance = PICK_RADIUS;
        for index in 0..self.points.len() {
            let screen = self.cursor_of(PointId(index));
            let distance = (screen[0] - cursor[0]).hypot(screen[1] - cursor[1]);
            if distance < best_distance {
                best_distance = distance;
                best = Some(PointId(index));
            }
        }
        best
    }

    fn nearest_point_to_position(&self, position: [f64; 3]) -> Option<PointId> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let d: f64 = p
                    .position
                    .iter()
                    .zip(position.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (i, d)
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| PointId(i))
    }
}

impl History for MemoryHost {
    fn record_before_mutation(&mut self, point: PointId) {
        self.history.push(point);
    }
}

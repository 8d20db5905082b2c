//! Engine configuration profiles.
//!
//! This module provides:
//! - `EngineConfig`, the capacity and tolerance settings for a session
//! - `SliderMetrics`, the pixel metrics of the partition slider track
//! - Pre-defined profiles: default, extended, strict

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Axis negated when mirroring a point position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorAxis {
    X,
    Y,
    Z,
}

impl MirrorAxis {
    /// Returns the component index of this axis in an `[x, y, z]` position.
    pub fn index(&self) -> usize {
        match self {
            MirrorAxis::X => 0,
            MirrorAxis::Y => 1,
            MirrorAxis::Z => 2,
        }
    }

    /// Returns `position` reflected across the plane orthogonal to this axis.
    pub fn reflect(&self, position: [f64; 3]) -> [f64; 3] {
        let mut mirrored = position;
        mirrored[self.index()] = -mirrored[self.index()];
        mirrored
    }
}

/// Pixel metrics for the partition slider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderMetrics {
    /// Width of the grab area around a boundary, in pixels.
    pub handle_width: f64,
    /// Minimum segment width for a label to be drawn, in pixels.
    pub min_label_width: f64,
}

impl Default for SliderMetrics {
    fn default() -> Self {
        Self {
            handle_width: Self::DEFAULT_HANDLE_WIDTH,
            min_label_width: Self::DEFAULT_MIN_LABEL_WIDTH,
        }
    }
}

impl SliderMetrics {
    /// Default grab width around a boundary.
    pub const DEFAULT_HANDLE_WIDTH: f64 = 10.0;

    /// Default minimum segment width for labels.
    pub const DEFAULT_MIN_LABEL_WIDTH: f64 = 30.0;
}

/// Settings shared by every operation of an edit session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Profile name.
    pub name: String,
    /// Maximum influences per point the host store accepts.
    pub capacity: usize,
    /// Weights at or below this value are dropped on load.
    pub load_epsilon: f64,
    /// Allowed deviation of a settled weight sum from 1.0.
    pub sum_tolerance: f64,
    /// Axis negated to find the mirror point.
    pub mirror_axis: MirrorAxis,
    /// Squared distance under which a point matches a mirrored position.
    pub mirror_tolerance_sq: f64,
    /// Partition slider metrics.
    #[serde(default)]
    pub slider: SliderMetrics,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            capacity: Self::DEFAULT_CAPACITY,
            load_epsilon: crate::weights::WEIGHT_EPSILON,
            sum_tolerance: 1e-3,
            mirror_axis: MirrorAxis::X,
            mirror_tolerance_sq: 1e-4,
            slider: SliderMetrics::default(),
        }
    }
}

impl EngineConfig {
    /// Influences per vertex accepted by most GPU skinning pipelines.
    pub const DEFAULT_CAPACITY: usize = 4;

    /// Creates a new config with the given name and default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns the extended profile for hosts storing 8 influences per point.
    pub fn extended() -> Self {
        Self {
            name: "extended".to_string(),
            capacity: 8,
            ..Default::default()
        }
    }

    /// Returns the strict profile with tighter tolerances.
    pub fn strict() -> Self {
        Self {
            name: "strict".to_string(),
            sum_tolerance: 1e-4,
            mirror_tolerance_sq: 1e-6,
            ..Default::default()
        }
    }

    /// Looks up a profile by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "extended" => Some(Self::extended()),
            "strict" => Some(Self::strict()),
            _ => None,
        }
    }

    /// Parses a config from JSON and validates it.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EngineError::invalid_config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the host capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the mirror axis.
    pub fn with_mirror_axis(mut self, axis: MirrorAxis) -> Self {
        self.mirror_axis = axis;
        self
    }

    /// Checks that every setting is usable.
    pub fn validate(&self) -> EngineResult<()> {
        if self.capacity == 0 {
            return Err(EngineError::invalid_config("capacity must be at least 1"));
        }
        let positive = [
            ("load_epsilon", self.load_epsilon),
            ("sum_tolerance", self.sum_tolerance),
            ("mirror_tolerance_sq", self.mirror_tolerance_sq),
            ("slider.handle_width", self.slider.handle_width),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::invalid_config(format!(
                    "{} must be a positive number, got {}",
                    field, value
                )));
            }
        }
        if !self.slider.min_label_width.is_finite() || self.slider.min_label_width < 0.0 {
            return Err(EngineError::invalid_config(format!(
                "slider.min_label_width must be non-negative, got {}",
                self.slider.min_label_width
            )));
        }
        Ok(())
    }
}

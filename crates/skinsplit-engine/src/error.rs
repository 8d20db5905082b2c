//! Error and warning types for weight editing.

use thiserror::Error;

use crate::weights::PointId;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error reported by a host collaborator (store, skeleton, picker).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    /// Human-readable reason supplied by the host.
    pub message: String,
}

impl HostError {
    /// Creates a new host error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that can occur while editing weights.
///
/// Every error is returned before any entry of the affected weight set has
/// been modified.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The edit is not allowed (locked entry, unknown influence, bad value).
    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    /// Paste was requested before anything was copied.
    #[error("Clipboard is empty; copy weights from a vertex first")]
    EmptyClipboard,

    /// No point sits at the mirrored position of the source point.
    #[error("No mirror target for vertex {source_point} at {position:?}")]
    MirrorTargetNotFound {
        source_point: PointId,
        position: [f64; 3],
    },

    /// All weights collapsed to zero with nothing locked to hold the budget.
    #[error("Degenerate weight set: {message}")]
    DegenerateWeightSet { message: String },

    /// The host does not know the requested point.
    #[error("Unknown vertex {0}")]
    UnknownPoint(PointId),

    /// An edit was requested with no point selected.
    #[error("No vertex selected")]
    NoSelection,

    /// A host collaborator rejected the request.
    #[error("Host rejected request: {0}")]
    Host(#[from] HostError),

    /// Engine configuration is unusable.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl EngineError {
    /// Creates a new invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates a new degenerate weight set error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateWeightSet {
            message: message.into(),
        }
    }

    /// Creates a new invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Get the error code for reporting.
    ///
    /// Codes are stable and can be matched on by hosts.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidOperation { .. } => "WEIGHT_001",
            EngineError::EmptyClipboard => "WEIGHT_002",
            EngineError::MirrorTargetNotFound { .. } => "WEIGHT_003",
            EngineError::DegenerateWeightSet { .. } => "WEIGHT_004",
            EngineError::UnknownPoint(_) => "WEIGHT_005",
            EngineError::NoSelection => "WEIGHT_006",
            EngineError::Host(_) => "WEIGHT_007",
            EngineError::InvalidConfig { .. } => "WEIGHT_008",
        }
    }

    /// Get the error category for grouping related errors.
    pub fn category(&self) -> &'static str {
        match self {
            EngineError::InvalidOperation { .. } | EngineError::DegenerateWeightSet { .. } => {
                "weights"
            }
            EngineError::EmptyClipboard => "clipboard",
            EngineError::MirrorTargetNotFound { .. } => "mirror",
            EngineError::UnknownPoint(_) | EngineError::NoSelection => "selection",
            EngineError::Host(_) => "host",
            EngineError::InvalidConfig { .. } => "config",
        }
    }
}

/// Warning codes for non-fatal conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// W001: Mirrored bone name has no counterpart in the skeleton
    MirrorBoneUnresolved,
    /// W002: Locked influences consume the whole budget
    LockedBudgetExhausted,
    /// W003: Every influence is locked and the budget is not filled
    LockedBudgetUnfilled,
    /// W004: Commit dropped influences beyond the host capacity
    CapacityTruncated,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::MirrorBoneUnresolved => "W001",
            WarningCode::LockedBudgetExhausted => "W002",
            WarningCode::LockedBudgetUnfilled => "W003",
            WarningCode::CapacityTruncated => "W004",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A non-fatal condition the caller is expected to surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineWarning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable warning message.
    pub message: String,
}

impl EngineWarning {
    /// Creates a new warning.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EngineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

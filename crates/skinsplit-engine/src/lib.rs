//! SkinSplit Bone-Weight Partition Engine
//!
//! This crate provides the data model and algorithms for interactively
//! redistributing a point's skin weights across its bone influences.
//!
//! # Overview
//!
//! A point (vertex) carries a small set of bone influences whose weights sum
//! to 1.0. The engine lets a host editor:
//!
//! - **Edit** individual weights and re-balance the rest around them
//! - **Lock** influences so automatic redistribution leaves them alone
//! - **Drag** boundaries of a partition slider, moving weight between the
//!   nearest unlocked neighbours
//! - **Prune** influences below a threshold
//! - **Copy/paste** weights between points
//! - **Mirror** weights onto the symmetric point of the mesh
//!
//! The host owns the mesh, the skeleton, picking and undo. It plugs in through
//! the traits in [`host`].
//!
//! # Example
//!
//! ```
//! use skinsplit_engine::{InfluenceId, WeightSet};
//! use skinsplit_engine::normalize::normalize_locked;
//!
//! let mut set = WeightSet::load([
//!     (InfluenceId(0), 0.5),
//!     (InfluenceId(1), 0.3),
//!     (InfluenceId(2), 0.2),
//! ]);
//!
//! set.toggle_lock(InfluenceId(0)).unwrap();
//! set.set_weight(InfluenceId(1), 0.0).unwrap();
//! normalize_locked(&mut set);
//!
//! assert_eq!(set.weight_of(InfluenceId(0)), Some(0.5));
//! assert!((set.weight_of(InfluenceId(2)).unwrap() - 0.5).abs() < 1e-9);
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error and warning types
//! - [`config`]: Engine configuration profiles
//! - [`weights`]: Weight entries and the per-point weight set
//! - [`normalize`]: Lock-aware and plain normalization
//! - [`slider`]: Partition slider drag state machine and layout
//! - [`prune`]: Threshold pruning
//! - [`mirror`]: Left/right mirroring of bone names and weights
//! - [`clipboard`]: Weight copy/paste
//! - [`host`]: Host collaborator traits
//! - [`session`]: Edit session tying everything to a selected point

pub mod clipboard;
pub mod config;
pub mod error;
pub mod host;
pub mod mirror;
pub mod normalize;
pub mod prune;
pub mod session;
pub mod slider;
pub mod weights;

// Re-export commonly used types at the crate root
pub use clipboard::Clipboard;
pub use config::{EngineConfig, MirrorAxis, SliderMetrics};
pub use error::{EngineError, EngineResult, EngineWarning, HostError, WarningCode};
pub use host::{History, Host, PointPicker, Skeleton, SkinStore};
pub use mirror::{mirror_bone_name, MirrorOutcome};
pub use session::EditSession;
pub use slider::{PartitionSlider, SliderEvent, SliderState, SliderToken};
pub use weights::{InfluenceId, PointId, WeightEntry, WeightSet, WEIGHT_EPSILON};

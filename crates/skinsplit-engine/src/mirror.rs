//! Left/right mirroring of vertex weights.
//!
//! Mirroring copies the weights of a point onto the point at its reflected
//! position, swapping every sided bone for its counterpart. Bone names are
//! mapped by the first matching convention:
//!
//! 1. `Left` / `Right` anywhere in the name (`LeftHand` -> `RightHand`)
//! 2. a `_L` / `_R` side token (`Arm_L` -> `Arm_R`, `hand_l` -> `hand_r`)
//! 3. a trailing `.L` / `.R` (`thigh.L` -> `thigh.R`, `thigh.L.001` -> `thigh.R.001`)
//!
//! Names matching none of these are center bones and map to themselves.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, EngineWarning, WarningCode};
use crate::host::{commit, CommitReport, History, PointPicker, Skeleton, SkinStore};
use crate::normalize::normalize_plain;
use crate::weights::{PointId, WeightEntry, WeightSet};

static SIDE_WORD_REGEX: OnceLock<Regex> = OnceLock::new();
static SIDE_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
static SIDE_SUFFIX_REGEX: OnceLock<Regex> = OnceLock::new();

fn side_word_regex() -> &'static Regex {
    SIDE_WORD_REGEX.get_or_init(|| Regex::new("Left|Right").expect("invalid regex pattern"))
}

fn side_token_regex() -> &'static Regex {
    // The side letter must end the name or be followed by a separator, so
    // `Spine_Lower` is not a left bone.
    SIDE_TOKEN_REGEX
        .get_or_init(|| Regex::new(r"_([LRlr])($|[^A-Za-z0-9])").expect("invalid regex pattern"))
}

fn side_suffix_regex() -> &'static Regex {
    SIDE_SUFFIX_REGEX
        .get_or_init(|| Regex::new(r"\.([LRlr])(\.\d+)?$").expect("invalid regex pattern"))
}

fn swap_side(side: &str) -> &'static str {
    match side {
        "L" => "R",
        "R" => "L",
        "l" => "r",
        "r" => "l",
        "Left" => "Right",
        _ => "Left",
    }
}

/// Returns the name of the bone on the other side of the body.
pub fn mirror_bone_name(name: &str) -> String {
    let word = side_word_regex();
    if word.is_match(name) {
        return word
            .replace_all(name, |caps: &Captures| swap_side(&caps[0]).to_string())
            .into_owned();
    }

    let token = side_token_regex();
    if token.is_match(name) {
        return token
            .replace_all(name, |caps: &Captures| format!("_{}{}", swap_side(&caps[1]), &caps[2]))
            .into_owned();
    }

    let suffix = side_suffix_regex();
    if suffix.is_match(name) {
        return suffix
            .replace(name, |caps: &Captures| {
                let copy = caps.get(2).map_or("", |m| m.as_str());
                format!(".{}{}", swap_side(&caps[1]), copy)
            })
            .into_owned();
    }

    name.to_string()
}

/// Finds the point at the reflected position of `source`.
///
/// Fails with `MirrorTargetNotFound` when no point lies within the tolerance
/// or the only match is `source` itself.
pub fn find_mirror_point<H: Skeleton + PointPicker + ?Sized>(
    host: &H,
    source: PointId,
    config: &EngineConfig,
) -> EngineResult<PointId> {
    let position = host
        .position_of(source)
        .ok_or(EngineError::UnknownPoint(source))?;
    let mirrored = config.mirror_axis.reflect(position);
    let not_found = EngineError::MirrorTargetNotFound {
        source_point: source,
        position: mirrored,
    };

    let Some(candidate) = host.nearest_point_to_position(mirrored) else {
        return Err(not_found);
    };
    if candidate == source {
        return Err(not_found);
    }
    let Some(candidate_position) = host.position_of(candidate) else {
        return Err(not_found);
    };

    let distance_sq: f64 = candidate_position
        .iter()
        .zip(mirrored.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum();
    if distance_sq < config.mirror_tolerance_sq {
        Ok(candidate)
    } else {
        Err(not_found)
    }
}

/// Maps every influence of `source` to its mirrored bone.
///
/// Influences whose mirrored bone does not exist are dropped and reported as
/// `MirrorBoneUnresolved` warnings. The returned set is unlocked and not
/// normalized.
pub fn mirror_weights<S: Skeleton + ?Sized>(
    skeleton: &S,
    source: &WeightSet,
) -> (WeightSet, Vec<EngineWarning>) {
    let mut entries = Vec::with_capacity(source.len());
    let mut warnings = Vec::new();

    for entry in source {
        let Some(name) = skeleton.name_of(entry.influence) else {
            warnings.push(unresolved(format!(
                "{} has no name in the skeleton; its weight was not mirrored",
                entry.influence
            )));
            continue;
        };
        let mirrored = mirror_bone_name(&name);
        match skeleton.id_of(&mirrored) {
            Some(influence) => entries.push(WeightEntry::new(influence, entry.weight)),
            None => warnings.push(unresolved(format!(
                "mirror of '{}' is '{}', which is not in the skeleton; its weight was dropped",
                name, mirrored
            ))),
        }
    }

    (WeightSet::from_entries(entries), warnings)
}

fn unresolved(message: String) -> EngineWarning {
    let warning = EngineWarning::new(WarningCode::MirrorBoneUnresolved, message);
    tracing::warn!(code = %warning.code, "{}", warning.message);
    warning
}

/// Result of mirroring a point's weights.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorOutcome {
    /// Point that received the mirrored weights.
    pub target: PointId,
    /// What was written to the target.
    pub commit: CommitReport,
    /// Influences that could not be mirrored. The caller must surface these.
    pub warnings: Vec<EngineWarning>,
}

/// Mirrors the settled weights of `source` onto its symmetric point and
/// commits them there.
///
/// Succeeds as long as at least one influence resolves.
pub fn mirror_to_point<H>(
    host: &mut H,
    source: PointId,
    weights: &WeightSet,
    config: &EngineConfig,
) -> EngineResult<MirrorOutcome>
where
    H: SkinStore + Skeleton + PointPicker + History + ?Sized,
{
    if weights.is_dirty() {
        return Err(EngineError::invalid_operation(
            "cannot mirror weights with edits that were not normalized",
        ));
    }

    let target = find_mirror_point(&*host, source, config)?;
    let (mut mirrored, mut warnings) = mirror_weights(&*host, weights);
    if mirrored.is_empty() {
        return Err(EngineError::degenerate(format!(
            "none of the {} influence(s) of vertex {} could be mirrored",
            weights.len(),
            source
        )));
    }
    normalize_plain(&mut mirrored)?;

    let report = commit(host, target, &mirrored, config.capacity)?;
    warnings.extend(report.warning.clone());
    tracing::debug!(
        source = source.0,
        target = target.0,
        warnings = warnings.len(),
        "mirrored vertex weights"
    );

    Ok(MirrorOutcome {
        target,
        commit: report,
        warnings,
    })
}

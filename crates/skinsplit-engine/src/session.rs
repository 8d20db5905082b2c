//! Edit session for the currently selected point.
//!
//! An [`EditSession`] owns the weight set of the selected point, the
//! clipboard and the partition slider. Every editing method follows the
//! same pipeline:
//!
//! 1. apply the edit to a working copy of the weight set
//! 2. normalize it if the edit requires it
//! 3. commit the copy to the host
//! 4. keep the copy as the new weight set
//!
//! If any step fails the session's weight set is left exactly as it was.

use crate::clipboard::Clipboard;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, EngineWarning};
use crate::host::{commit, CommitReport, Host, PointPicker, SkinStore};
use crate::mirror::{mirror_to_point, MirrorOutcome};
use crate::normalize::normalize_locked;
use crate::prune::{prune, PruneReport};
use crate::slider::{PartitionSlider, SliderEvent, SliderLayout, SliderToken};
use crate::weights::{InfluenceId, PointId, WeightSet};

/// Result of an edit that was committed to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct EditReport {
    /// What was written to the store.
    pub commit: CommitReport,
    /// Non-fatal conditions raised by the edit.
    pub warnings: Vec<EngineWarning>,
}

impl EditReport {
    fn new(commit: CommitReport, mut warnings: Vec<EngineWarning>) -> Self {
        warnings.extend(commit.warning.clone());
        Self { commit, warnings }
    }
}

#[derive(Debug, Clone)]
struct Selection {
    point: PointId,
    weights: WeightSet,
}

/// Weight editing state for one host editor.
#[derive(Debug)]
pub struct EditSession {
    config: EngineConfig,
    selection: Option<Selection>,
    clipboard: Clipboard,
    slider: PartitionSlider,
}

impl EditSession {
    /// Creates a session with a validated config.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            selection: None,
            clipboard: Clipboard::new(),
            slider: PartitionSlider::new(SliderToken(0)),
        })
    }

    /// Returns the session config.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the selected point.
    pub fn selected_point(&self) -> Option<PointId> {
        self.selection.as_ref().map(|s| s.point)
    }

    /// Returns the weight set of the selected point.
    pub fn weights(&self) -> Option<&WeightSet> {
        self.selection.as_ref().map(|s| &s.weights)
    }

    /// Returns the clipboard.
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Returns the session's partition slider.
    pub fn slider(&self) -> &PartitionSlider {
        &self.slider
    }

    fn selection(&self) -> EngineResult<&Selection> {
        self.selection.as_ref().ok_or(EngineError::NoSelection)
    }

    fn load<S: SkinStore + ?Sized>(&self, host: &S, point: PointId) -> EngineResult<WeightSet> {
        let raw = host.weights_of(point).ok_or(EngineError::UnknownPoint(point))?;
        Ok(WeightSet::load_with_epsilon(raw, self.config.load_epsilon))
    }

    /// Selects a point, replacing the current weight set with its stored
    /// weights.
    ///
    /// Any drag in progress ends. Locks do not carry over between points.
    pub fn select_point<S: SkinStore + ?Sized>(
        &mut self,
        host: &S,
        point: PointId,
    ) -> EngineResult<&WeightSet> {
        let weights = self.load(host, point)?;
        self.slider.release();
        tracing::debug!(point = point.0, influences = weights.len(), "selected vertex");
        let selection = self.selection.insert(Selection { point, weights });
        Ok(&selection.weights)
    }

    /// Selects the point under a viewport cursor. A miss keeps the current
    /// selection and returns `None`.
    pub fn select_at_cursor<H: SkinStore + PointPicker + ?Sized>(
        &mut self,
        host: &H,
        cursor: [f64; 2],
    ) -> EngineResult<Option<PointId>> {
        let Some(point) = host.nearest_point(cursor) else {
            return Ok(None);
        };
        self.select_point(host, point)?;
        Ok(Some(point))
    }

    /// Drops the selection and its weight set.
    pub fn clear_selection(&mut self) {
        self.slider.release();
        self.selection = None;
    }

    /// Reloads the selected point from the store, e.g. after the host undid
    /// a change. Locks of influences still present are kept.
    pub fn refresh<S: SkinStore + ?Sized>(&mut self, host: &S) -> EngineResult<&WeightSet> {
        let current = self.selection()?;
        let point = current.point;
        let locked: Vec<InfluenceId> = current
            .weights
            .iter()
            .filter(|e| e.locked)
            .map(|e| e.influence)
            .collect();

        let mut weights = self.load(host, point)?;
        for influence in locked {
            weights.set_locked(influence, true);
        }
        let selection = self.selection.insert(Selection { point, weights });
        Ok(&selection.weights)
    }

    /// Writes the current weight set to the host.
    pub fn commit<H: Host + ?Sized>(&mut self, host: &mut H) -> EngineResult<CommitReport> {
        let selection = self.selection()?;
        commit(host, selection.point, &selection.weights, self.config.capacity)
    }

    /// Runs `edit` on a copy of the weight set, commits the copy and keeps
    /// it only if the commit succeeded.
    fn apply<H, F>(&mut self, host: &mut H, edit: F) -> EngineResult<EditReport>
    where
        H: Host + ?Sized,
        F: FnOnce(&mut WeightSet) -> EngineResult<Vec<EngineWarning>>,
    {
        let selection = self.selection()?;
        let point = selection.point;
        let mut working = selection.weights.clone();

        let warnings = edit(&mut working)?;
        let report = commit(host, point, &working, self.config.capacity)?;

        if let Some(selection) = self.selection.as_mut() {
            selection.weights = working;
        }
        Ok(EditReport::new(report, warnings))
    }

    /// Sets an influence to `weight`, rebalances the other unlocked
    /// influences around the locked ones, and commits.
    pub fn set_weight<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        influence: InfluenceId,
        weight: f64,
    ) -> EngineResult<EditReport> {
        self.apply(host, |set| {
            set.set_weight(influence, weight)?;
            Ok(normalize_locked(set).warning().into_iter().collect())
        })
    }

    /// Flips the lock of an influence and returns the new state.
    ///
    /// Locks live only in the session, so nothing is committed.
    pub fn toggle_lock(&mut self, influence: InfluenceId) -> EngineResult<bool> {
        let selection = self.selection.as_mut().ok_or(EngineError::NoSelection)?;
        selection.weights.toggle_lock(influence)
    }

    /// Removes unlocked influences lighter than `threshold` and commits.
    ///
    /// Returns `None` for the commit when nothing was removed.
    pub fn prune<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        threshold: f64,
    ) -> EngineResult<(PruneReport, Option<EditReport>)> {
        let mut working = self.selection()?.weights.clone();
        let report = prune(&mut working, threshold)?;
        if report.is_noop() {
            return Ok((report, None));
        }

        let warnings: Vec<EngineWarning> = report
            .normalization
            .and_then(|outcome| outcome.warning())
            .into_iter()
            .collect();
        let edit = self.apply(host, move |set| {
            *set = working;
            Ok(warnings)
        })?;
        Ok((report, Some(edit)))
    }

    /// Copies the current weights to the clipboard. Returns the number of
    /// influences copied.
    pub fn copy(&mut self) -> EngineResult<usize> {
        let selection = self.selection.as_ref().ok_or(EngineError::NoSelection)?;
        self.clipboard.copy(&selection.weights);
        tracing::debug!(point = selection.point.0, "copied vertex weights");
        Ok(self.clipboard.len())
    }

    /// Replaces the current weights with the clipboard and commits.
    pub fn paste<H: Host + ?Sized>(&mut self, host: &mut H) -> EngineResult<EditReport> {
        self.selection()?;
        let pasted = self.clipboard.paste()?;
        self.apply(host, move |set| {
            *set = pasted;
            Ok(Vec::new())
        })
    }

    /// Mirrors the current weights onto the symmetric point.
    ///
    /// The selection does not change; the mirrored point is written directly.
    pub fn mirror<H: Host + ?Sized>(&mut self, host: &mut H) -> EngineResult<MirrorOutcome> {
        let selection = self.selection()?;
        mirror_to_point(host, selection.point, &selection.weights, &self.config)
    }

    /// Routes a pointer event to the session's slider. Commits and returns
    /// the report when a drag moved weight.
    pub fn handle_slider<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        event: SliderEvent,
    ) -> EngineResult<Option<EditReport>> {
        let mut working = self.selection()?.weights.clone();
        if !self.slider.handle(&mut working, event) {
            return Ok(None);
        }
        let report = self.apply(host, move |set| {
            *set = working;
            Ok(Vec::new())
        })?;
        Ok(Some(report))
    }

    /// Lays the current weights out on a slider track `width` pixels wide.
    pub fn layout(&self, width: f64) -> Option<SliderLayout> {
        self.weights()
            .map(|weights| SliderLayout::compute(weights, width, &self.config.slider))
    }
}

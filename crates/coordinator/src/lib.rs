//! Linked-view coordination: combines per-view brush and hover gestures into
//! one canonical selection state held by the entry store.

use std::collections::BTreeMap;

use analytics::{attribute_summary, members_of, parties_in_range};
use crossbeam_channel::Sender;
use entry_store::{Entry, EntryPatch, EntryStore, EntryTable, SubscriptionId};
use serde::Serialize;
use shared::{
    attributes::Attribute,
    domain::{InteractionMode, PartyId, PartySet, ViewId, Year},
    error::StoreError,
    protocol::{
        AggregateKey, BrushExtent, HoverTarget, MalformedAggregateKey, QuartileBand, StoreChange,
        ViewCommand,
    },
};
use thiserror::Error;
use tracing::debug;

pub mod config;
mod interaction;
mod selection;
mod view;

pub use config::{load_settings, load_settings_from, CoordinatorSettings};
pub use interaction::{InteractionState, ModeTransition};
pub use selection::{intersect_engaged, EmptyBrushPolicy};
pub use view::ViewAdapter;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("view '{0}' is not a registered brush view")]
    UnknownView(ViewId),
    #[error(transparent)]
    MalformedAggregate(#[from] MalformedAggregateKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Hover wiring is disabled while the source view is in brush mode.
    HoverWhileBrushing,
    /// Brush capture is disabled while the source view is in hover mode.
    BrushWhileHovering,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Applied,
    Ignored { reason: IgnoreReason },
    ModeChanged { transition: ModeTransition },
}

/// Sole writer of the entry store for one session.
///
/// Each registered brush view owns one slot; the canonical selection is the
/// intersection of the active slots and is pushed into the store's brushed
/// flags after every brush change.
#[derive(Debug)]
pub struct SelectionCoordinator {
    store: EntryStore,
    views: BTreeMap<ViewId, InteractionState>,
    canonical: Option<PartySet>,
    policy: EmptyBrushPolicy,
}

impl SelectionCoordinator {
    pub fn new(store: EntryStore, settings: &CoordinatorSettings) -> Self {
        let mut coordinator = Self {
            store,
            views: BTreeMap::new(),
            canonical: None,
            policy: settings.empty_brush_policy,
        };
        for view_id in settings.brush_view_ids() {
            coordinator.register_view(view_id);
        }
        if let Some(year) = settings.initial_year() {
            coordinator.store.set_year(year);
        }
        coordinator
    }

    /// Adds a brush slot (disengaged, hover mode). Returns false when the
    /// view was already registered.
    pub fn register_view(&mut self, view_id: ViewId) -> bool {
        if self.views.contains_key(&view_id) {
            return false;
        }
        debug!(view = %view_id, "registered brush view");
        self.views.insert(view_id, InteractionState::default());
        true
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn table(&self) -> &EntryTable {
        self.store.table()
    }

    pub fn entries(&self) -> &[Entry] {
        self.store.entries()
    }

    pub fn entries_in_year(&self, year: Year) -> Vec<&Entry> {
        self.store.entries_in_year(year)
    }

    pub fn policy(&self) -> EmptyBrushPolicy {
        self.policy
    }

    /// The current intersection of active brushes; `None` when no view is
    /// brushing.
    pub fn canonical_selection(&self) -> Option<&PartySet> {
        self.canonical.as_ref()
    }

    pub fn interaction(&self, view_id: &ViewId) -> Option<&InteractionState> {
        self.views.get(view_id)
    }

    pub fn mode_of(&self, view_id: &ViewId) -> Option<InteractionMode> {
        self.views.get(view_id).map(InteractionState::mode)
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&StoreChange, &EntryTable) + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    pub fn subscribe_channel(&mut self, tx: Sender<StoreChange>) -> SubscriptionId {
        self.store.subscribe_channel(tx)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn bind_changed(
        &mut self,
        callback: impl FnMut(&StoreChange, &EntryTable) + 'static,
    ) -> SubscriptionId {
        self.store.bind_changed(callback)
    }

    /// Stores `selection` in the view's slot and pushes the new canonical
    /// selection into the store.
    pub fn apply_brush(
        &mut self,
        view_id: &ViewId,
        selection: Option<PartySet>,
    ) -> Result<(), CoordinatorError> {
        self.record_brush(view_id, selection, None)
    }

    /// Like [`SelectionCoordinator::apply_brush`], also remembering the brush
    /// geometry for when the view re-enters brush mode.
    pub fn record_brush(
        &mut self,
        view_id: &ViewId,
        selection: Option<PartySet>,
        extent: Option<BrushExtent>,
    ) -> Result<(), CoordinatorError> {
        let state = self
            .views
            .get_mut(view_id)
            .ok_or_else(|| CoordinatorError::UnknownView(view_id.clone()))?;
        debug!(
            view = %view_id,
            selected = selection.as_ref().map(PartySet::len),
            "brush slot updated"
        );
        state.record_brush(selection, extent);
        self.push_canonical();
        Ok(())
    }

    pub fn set_hover_single(
        &mut self,
        party_id: PartyId,
        year: Year,
        on: bool,
    ) -> Result<(), CoordinatorError> {
        self.store
            .update_entry(EntryPatch::for_entry(party_id, year).hovered(on))?;
        Ok(())
    }

    pub fn set_hover_batch(&mut self, party_ids: Option<&PartySet>) {
        self.store.set_batch_hover(party_ids);
    }

    /// Hover on a synthetic aggregate point becomes a batch hover over the
    /// real parties it stands for, taken from the active year (or from every
    /// year when no year filter is set). Turning it off is a batch clear:
    /// every hovered flag is reset, point hovers included.
    pub fn set_hover_aggregate(&mut self, key: AggregateKey, on: bool) {
        if !on {
            self.store.set_batch_hover(None);
            return;
        }
        let members = members_of(self.table().entries_in_active_year(), key);
        debug!(aggregate = %key, members = members.len(), "aggregate hover");
        self.store.set_batch_hover(Some(&members));
    }

    /// Same as [`SelectionCoordinator::set_hover_aggregate`], taking the
    /// synthetic record identifier (`faction_<id>`, `country_<id>`).
    pub fn set_hover_synthetic(
        &mut self,
        synthetic_id: &str,
        on: bool,
    ) -> Result<(), CoordinatorError> {
        let key = synthetic_id.parse::<AggregateKey>()?;
        self.set_hover_aggregate(key, on);
        Ok(())
    }

    /// Hover on one box-plot quartile region: every party of the active year
    /// whose value falls inside the region is hovered. Like aggregate hover,
    /// turning it off clears every hovered flag.
    pub fn set_hover_band(
        &mut self,
        attribute: Attribute,
        band: QuartileBand,
        brushed_only: bool,
        on: bool,
    ) {
        if !on {
            self.store.set_batch_hover(None);
            return;
        }

        let members = {
            let candidates: Vec<&Entry> = self
                .table()
                .entries_in_active_year()
                .into_iter()
                .filter(|entry| !brushed_only || entry.brushed)
                .collect();
            let summary = attribute_summary(candidates.iter().copied(), attribute, false);
            match summary.stats() {
                Some(stats) => parties_in_range(
                    candidates.iter().copied(),
                    attribute,
                    stats.band_range(band),
                ),
                None => PartySet::new(),
            }
        };
        debug!(%attribute, band = band.label(), members = members.len(), "quartile band hover");
        self.store.set_batch_hover(Some(&members));
    }

    pub fn set_year(&mut self, year: Year) {
        self.store.set_year(year);
    }

    /// Toggles a view between hover and brush mode. Entering brush mode
    /// re-applies the view's stored selection and turns off the point hover
    /// the view still holds; entering hover mode keeps the selection active
    /// in the intersection and closes the view's tooltip.
    pub fn set_mode(
        &mut self,
        view_id: &ViewId,
        mode: InteractionMode,
    ) -> Result<ModeTransition, CoordinatorError> {
        let state = self
            .views
            .get_mut(view_id)
            .ok_or_else(|| CoordinatorError::UnknownView(view_id.clone()))?;
        let transition = state.enter(view_id, mode);
        debug!(view = %view_id, from = ?transition.from, to = ?transition.to, "interaction mode");
        if let Some((party_id, year)) = transition.released_hover {
            self.set_hover_single(party_id, year, false)?;
        }
        if transition.reapply_selection {
            self.push_canonical();
        }
        Ok(transition)
    }

    /// Single entry point for view gestures, honouring each source view's
    /// interaction mode. Hover-off commands always pass so a leave can never
    /// strand a hovered flag.
    pub fn dispatch(&mut self, command: ViewCommand) -> Result<DispatchOutcome, CoordinatorError> {
        debug!(command = command.name(), "dispatching view command");
        match command {
            ViewCommand::Brush {
                view_id,
                selection,
                extent,
            } => {
                let mode = self
                    .mode_of(&view_id)
                    .ok_or_else(|| CoordinatorError::UnknownView(view_id.clone()))?;
                if mode == InteractionMode::Hover {
                    return Ok(self.ignored(&view_id, IgnoreReason::BrushWhileHovering));
                }
                self.record_brush(&view_id, selection, extent)?;
            }
            ViewCommand::Hover { source, target, on } => {
                if let Some(view_id) = source.as_ref().filter(|_| on) {
                    if self.mode_of(view_id) == Some(InteractionMode::Brush) {
                        return Ok(self.ignored(view_id, IgnoreReason::HoverWhileBrushing));
                    }
                }
                self.apply_hover(source.as_ref(), target, on)?;
            }
            ViewCommand::YearChange { year } => self.set_year(year),
            ViewCommand::SetMode { view_id, mode } => {
                let transition = self.set_mode(&view_id, mode)?;
                return Ok(DispatchOutcome::ModeChanged { transition });
            }
        }
        Ok(DispatchOutcome::Applied)
    }

    fn apply_hover(
        &mut self,
        source: Option<&ViewId>,
        target: HoverTarget,
        on: bool,
    ) -> Result<(), CoordinatorError> {
        match target {
            HoverTarget::Point { party_id, year } => {
                self.set_hover_single(party_id, year, on)?;
                if let Some(state) = source.and_then(|view_id| self.views.get_mut(view_id)) {
                    state.hover_point = on.then_some((party_id, year));
                }
            }
            HoverTarget::Batch { party_ids } => {
                self.set_hover_batch(on.then_some(&party_ids));
            }
            HoverTarget::Aggregate { key } => self.set_hover_aggregate(key, on),
            HoverTarget::QuartileBand {
                attribute,
                band,
                brushed_only,
            } => self.set_hover_band(attribute, band, brushed_only, on),
        }
        Ok(())
    }

    fn ignored(&self, view_id: &ViewId, reason: IgnoreReason) -> DispatchOutcome {
        debug!(view = %view_id, ?reason, "ignoring gesture for current interaction mode");
        DispatchOutcome::Ignored { reason }
    }

    fn push_canonical(&mut self) {
        let canonical = intersect_engaged(
            self.views.values().map(InteractionState::selection),
            self.policy,
        );
        self.store.set_brush(canonical.as_ref());
        self.canonical = canonical;
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

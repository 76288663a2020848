//! Per-view interaction state: hover/brush mode, the view's own brush slot
//! and the geometry needed to redraw it.

use serde::Serialize;
use shared::{
    domain::{InteractionMode, PartyId, PartySet, ViewId, Year},
    protocol::BrushExtent,
};

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState {
    pub(crate) mode: InteractionMode,
    pub(crate) selection: Option<PartySet>,
    pub(crate) extent: Option<BrushExtent>,
    /// Row under this view's pointer; its tooltip is open while set.
    pub(crate) hover_point: Option<(PartyId, Year)>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            mode: InteractionMode::Hover,
            selection: None,
            extent: None,
            hover_point: None,
        }
    }
}

impl InteractionState {
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// This view's brush slot; kept while the view is in hover mode.
    pub fn selection(&self) -> Option<&PartySet> {
        self.selection.as_ref()
    }

    pub fn extent(&self) -> Option<&BrushExtent> {
        self.extent.as_ref()
    }

    pub fn tooltip_open(&self) -> bool {
        self.hover_point.is_some()
    }

    pub fn hover_point(&self) -> Option<(PartyId, Year)> {
        self.hover_point
    }

    /// The extent always describes the current selection: a selection
    /// recorded without geometry has none to restore.
    pub(crate) fn record_brush(&mut self, selection: Option<PartySet>, extent: Option<BrushExtent>) {
        self.extent = if selection.is_some() { extent } else { None };
        self.selection = selection;
    }

    pub(crate) fn enter(&mut self, view_id: &ViewId, to: InteractionMode) -> ModeTransition {
        let from = self.mode;
        let mut transition = ModeTransition {
            view_id: view_id.clone(),
            from,
            to,
            restore_extent: None,
            clear_tooltip: false,
            reapply_selection: false,
            released_hover: None,
        };
        if from == to {
            return transition;
        }

        self.mode = to;
        match to {
            InteractionMode::Brush => {
                transition.restore_extent = self.extent.clone();
                transition.reapply_selection = self.selection.is_some();
                transition.released_hover = self.hover_point.take();
                transition.clear_tooltip = transition.released_hover.is_some();
            }
            InteractionMode::Hover => {
                self.hover_point = None;
                transition.clear_tooltip = true;
            }
        }
        transition
    }
}

/// What a view adapter has to do after a mode toggle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeTransition {
    pub view_id: ViewId,
    pub from: InteractionMode,
    pub to: InteractionMode,
    /// Brush geometry to draw again when entering brush mode.
    pub restore_extent: Option<BrushExtent>,
    pub clear_tooltip: bool,
    /// The view's stored selection was pushed again on entering brush mode.
    pub reapply_selection: bool,
    /// Point hover the view still held when it entered brush mode; the
    /// coordinator turns it off since the view can no longer send its leave.
    pub released_hover: Option<(PartyId, Year)>,
}

impl ModeTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

use std::{cell::RefCell, rc::Rc};

use entry_store::{EntryTable, SubscriptionId};
use shared::{domain::ViewId, protocol::StoreChange};
use tracing::debug;

use crate::SelectionCoordinator;

/// A rendering surface kept in sync with the store. Views only read the
/// table they are handed; every write goes back through the coordinator.
pub trait ViewAdapter {
    fn view_id(&self) -> &ViewId;

    fn redraw(&mut self, change: &StoreChange, table: &EntryTable);
}

impl SelectionCoordinator {
    /// Subscribes `view` so it redraws after every store mutation, in
    /// attachment order.
    pub fn attach_view<V: ViewAdapter + 'static>(&mut self, view: Rc<RefCell<V>>) -> SubscriptionId {
        let view_id = view.borrow().view_id().clone();
        let id = self.subscribe(move |change, table| view.borrow_mut().redraw(change, table));
        debug!(view = %view_id, ?id, "attached view");
        id
    }
}

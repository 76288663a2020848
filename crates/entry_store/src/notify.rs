//! Ordered subscriber list for store change notifications.

use crossbeam_channel::{Sender, TrySendError};
use shared::protocol::StoreChange;

use crate::EntryTable;

pub type ChangeCallback = Box<dyn FnMut(&StoreChange, &EntryTable)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Subscriber {
    Callback(ChangeCallback),
    Queue(Sender<StoreChange>),
}

#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Subscriber)>,
}

impl Subscribers {
    pub(crate) fn add_callback(&mut self, callback: ChangeCallback) -> SubscriptionId {
        self.push(Subscriber::Callback(callback))
    }

    pub(crate) fn add_queue(&mut self, tx: Sender<StoreChange>) -> SubscriptionId {
        self.push(Subscriber::Queue(tx))
    }

    fn push(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, subscriber));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Delivers `change` to every subscriber in subscription order.
    pub(crate) fn notify(&mut self, change: &StoreChange, table: &EntryTable) {
        let mut disconnected = Vec::new();
        for (id, subscriber) in &mut self.entries {
            match subscriber {
                Subscriber::Callback(callback) => callback(change, table),
                Subscriber::Queue(tx) => match tx.try_send(change.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!(
                            subscription = id.0,
                            ?change,
                            "change queue is full; dropping notification"
                        );
                    }
                    Err(TrySendError::Disconnected(_)) => disconnected.push(*id),
                },
            }
        }

        if !disconnected.is_empty() {
            tracing::debug!(count = disconnected.len(), "removing disconnected change queues");
            self.entries.retain(|(id, _)| !disconnected.contains(id));
        }
    }
}

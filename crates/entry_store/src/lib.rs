use std::collections::{hash_map, HashMap, HashSet};

use crossbeam_channel::Sender;
use shared::{
    domain::{PartyId, PartySet, Year},
    error::StoreError,
    protocol::StoreChange,
};
use tracing::debug;

mod entry;
mod notify;

pub use entry::{AttributeValues, Entry, EntryPatch, PartyRecord};
pub use notify::{ChangeCallback, SubscriptionId};

use notify::Subscribers;

/// Read-only side of the store: the loaded entries, the party index and the
/// active year filter. Subscribers receive it on every notification.
#[derive(Debug, Default)]
pub struct EntryTable {
    entries: Vec<Entry>,
    index: HashMap<PartyId, Vec<usize>>,
    active_year: Option<Year>,
}

impl EntryTable {
    /// All entries in load order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_year(&self) -> Option<Year> {
        self.active_year
    }

    pub fn get(&self, party_id: PartyId, year: Year) -> Option<&Entry> {
        self.position_of(party_id, year)
            .map(|position| &self.entries[position])
    }

    /// Every year-instance of one party, in load order.
    pub fn entries_for_party(&self, party_id: PartyId) -> impl Iterator<Item = &Entry> + '_ {
        self.index
            .get(&party_id)
            .into_iter()
            .flatten()
            .map(|position| &self.entries[*position])
    }

    pub fn entries_in_year(&self, year: Year) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|entry| entry.year == year)
            .collect()
    }

    /// Entries of the active year, or every entry when no year is set.
    pub fn entries_in_active_year(&self) -> Vec<&Entry> {
        match self.active_year {
            Some(year) => self.entries_in_year(year),
            None => self.entries.iter().collect(),
        }
    }

    pub fn party_ids(&self) -> PartySet {
        self.index.keys().copied().collect()
    }

    pub fn brushed_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.brushed).count()
    }

    pub fn hovered_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.hovered).count()
    }

    fn position_of(&self, party_id: PartyId, year: Year) -> Option<usize> {
        self.index
            .get(&party_id)?
            .iter()
            .copied()
            .find(|position| self.entries[*position].year == year)
    }

    fn push(&mut self, entry: Entry) {
        self.index
            .entry(entry.party_id)
            .or_default()
            .push(self.entries.len());
        self.entries.push(entry);
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (position, entry) in self.entries.iter().enumerate() {
            self.index.entry(entry.party_id).or_default().push(position);
        }
    }
}

/// Owner of the party-year entries and of the change subscribers.
///
/// Every mutation runs to completion and then notifies each subscriber
/// exactly once before returning.
#[derive(Default)]
pub struct EntryStore {
    table: EntryTable,
    subscribers: Subscribers,
    bound: Option<SubscriptionId>,
}

impl std::fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore")
            .field("entries", &self.table.len())
            .field("active_year", &self.table.active_year)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &EntryTable {
        &self.table
    }

    pub fn entries(&self) -> &[Entry] {
        self.table.entries()
    }

    pub fn entries_in_year(&self, year: Year) -> Vec<&Entry> {
        self.table.entries_in_year(year)
    }

    pub fn active_year(&self) -> Option<Year> {
        self.table.active_year()
    }

    pub fn get(&self, party_id: PartyId, year: Year) -> Option<&Entry> {
        self.table.get(party_id, year)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn add_entry(&mut self, record: PartyRecord) -> Result<(), StoreError> {
        let entry = Entry::try_from(record)?;
        let (party_id, year) = entry.key();
        if self.table.get(party_id, year).is_some() {
            return Err(StoreError::DuplicateEntry { party_id, year });
        }

        self.table.push(entry);
        debug!(%party_id, %year, "added entry");
        self.notify(StoreChange::EntryAdded { party_id, year });
        Ok(())
    }

    /// Inserts a whole batch with a single notification. The batch is
    /// validated up front; on error nothing is inserted.
    pub fn load(
        &mut self,
        records: impl IntoIterator<Item = PartyRecord>,
    ) -> Result<usize, StoreError> {
        let mut seen = HashSet::new();
        let mut batch = Vec::new();
        for record in records {
            let entry = Entry::try_from(record)?;
            let (party_id, year) = entry.key();
            if self.table.get(party_id, year).is_some() || !seen.insert((party_id, year)) {
                return Err(StoreError::DuplicateEntry { party_id, year });
            }
            batch.push(entry);
        }

        let count = batch.len();
        for entry in batch {
            self.table.push(entry);
        }
        debug!(count, total = self.table.len(), "loaded entries");
        self.notify(StoreChange::EntriesLoaded { count });
        Ok(count)
    }

    pub fn update_entry(&mut self, patch: EntryPatch) -> Result<(), StoreError> {
        let (party_id, year) = patch.key()?;
        let position = self
            .table
            .position_of(party_id, year)
            .ok_or(StoreError::UnknownEntry { party_id, year })?;

        patch.apply_to(&mut self.table.entries[position]);
        debug!(%party_id, %year, "updated entry");
        self.notify(StoreChange::EntryUpdated { party_id, year });
        Ok(())
    }

    /// Removes every year-instance of a party. Positions of later entries
    /// shift, so the index is rebuilt.
    pub fn delete_party(&mut self, party_id: PartyId) -> Result<usize, StoreError> {
        let count = match self.table.index.entry(party_id) {
            hash_map::Entry::Occupied(slot) => slot.remove().len(),
            hash_map::Entry::Vacant(_) => return Err(StoreError::UnknownParty(party_id)),
        };

        self.table.entries.retain(|entry| entry.party_id != party_id);
        self.table.rebuild_index();
        debug!(%party_id, count, "deleted party entries");
        self.notify(StoreChange::EntriesDeleted { party_id, count });
        Ok(count)
    }

    pub fn set_year(&mut self, year: Year) {
        self.table.active_year = Some(year);
        debug!(%year, "active year changed");
        self.notify(StoreChange::YearChanged { year });
    }

    /// Marks exactly the entries whose party is in `selection` as brushed;
    /// `None` clears every brushed flag.
    pub fn set_brush(&mut self, selection: Option<&PartySet>) {
        for entry in &mut self.table.entries {
            entry.brushed = selection.is_some_and(|ids| ids.contains(&entry.party_id));
        }
        let brushed = self.table.brushed_count();
        debug!(brushed, "brush applied");
        self.notify(StoreChange::BrushChanged { brushed });
    }

    /// Same shape as [`EntryStore::set_brush`], targeting the hovered flags.
    pub fn set_batch_hover(&mut self, selection: Option<&PartySet>) {
        for entry in &mut self.table.entries {
            entry.hovered = selection.is_some_and(|ids| ids.contains(&entry.party_id));
        }
        let hovered = self.table.hovered_count();
        debug!(hovered, "batch hover applied");
        self.notify(StoreChange::HoverChanged { hovered });
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&StoreChange, &EntryTable) + 'static,
    ) -> SubscriptionId {
        self.subscribers.add_callback(Box::new(callback))
    }

    /// Registers a queue subscriber. Full queues drop notifications and
    /// disconnected queues are unsubscribed on the next notification.
    pub fn subscribe_channel(&mut self, tx: Sender<StoreChange>) -> SubscriptionId {
        self.subscribers.add_queue(tx)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if self.bound == Some(id) {
            self.bound = None;
        }
        self.subscribers.remove(id)
    }

    /// Single-slot binding: replaces the callback installed by a previous
    /// `bind_changed`, leaving every other subscriber in place.
    pub fn bind_changed(
        &mut self,
        callback: impl FnMut(&StoreChange, &EntryTable) + 'static,
    ) -> SubscriptionId {
        if let Some(previous) = self.bound.take() {
            self.subscribers.remove(previous);
        }
        let id = self.subscribe(callback);
        self.bound = Some(id);
        id
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self, change: StoreChange) {
        self.subscribers.notify(&change, &self.table);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

use thiserror::Error;

use crate::domain::{KeyField, PartyId, Year};

/// Failures raised by entry store mutations. Every variant is raised before
/// any mutation happens, so the store is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("entry is missing its {0} identifier")]
    MissingIdentifier(KeyField),
    #[error("no entry for party {party_id} in year {year}")]
    UnknownEntry { party_id: PartyId, year: Year },
    #[error("no entries for party {0}")]
    UnknownParty(PartyId),
    #[error("an entry for party {party_id} in year {year} already exists")]
    DuplicateEntry { party_id: PartyId, year: Year },
}

impl StoreError {
    pub fn is_missing_identifier(&self) -> bool {
        matches!(self, Self::MissingIdentifier(_))
    }
}

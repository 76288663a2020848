use std::{fs, path::Path};

use anyhow::{Context, Result};
use entry_store::{EntryStore, PartyRecord};
use shared::domain::KeyField;
use tracing::{info, warn};

/// Reads a JSON array of party rows. Rows missing `party_id` or `year` are
/// skipped with a warning; any other problem aborts the load.
pub fn read_records(path: &Path) -> Result<Vec<PartyRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset '{}'", path.display()))?;
    let rows: Vec<PartyRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("dataset '{}' is not a JSON array of rows", path.display()))?;

    let total = rows.len();
    let records: Vec<PartyRecord> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(row, record)| {
            let field = match (record.party_id, record.year) {
                (Some(_), Some(_)) => return Some(record),
                (None, _) => KeyField::PartyId,
                (_, None) => KeyField::Year,
            };
            warn!(row, %field, "skipping dataset row without identifier");
            None
        })
        .collect();
    info!(
        path = %path.display(),
        kept = records.len(),
        skipped = total - records.len(),
        "read dataset"
    );
    Ok(records)
}

pub fn load_store(path: &Path) -> Result<EntryStore> {
    let mut store = EntryStore::new();
    store
        .load(read_records(path)?)
        .with_context(|| format!("failed to load dataset '{}'", path.display()))?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use shared::domain::{PartyId, Year};

    use super::*;

    #[test]
    fn rows_without_identifiers_are_skipped() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[
                {{ "party_id": 102, "year": 2019, "party": "SPD", "lrgen": 3.6 }},
                {{ "year": 2019, "party": "anonymous" }},
                {{ "party_id": 103, "party": "undated" }},
                {{ "party_id": 102, "year": 2014, "country": 3, "family": 5 }}
            ]"#
        )
        .expect("write");

        let store = load_store(file.path()).expect("load");
        assert_eq!(store.len(), 2);
        assert!(store.get(PartyId(102), Year(2014)).is_some());
    }

    #[test]
    fn duplicate_rows_abort_the_load() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{ "party_id": 1, "year": 2019 }}, {{ "party_id": 1, "year": 2019 }}]"#
        )
        .expect("write");
        assert!(load_store(file.path()).is_err());
    }
}

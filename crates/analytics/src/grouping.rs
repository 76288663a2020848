//! Per-category mean aggregation (faction and country averages).

use std::collections::BTreeMap;

use entry_store::Entry;
use serde::Serialize;
use shared::{
    attributes::Attribute,
    domain::{country_name, faction_name, PartySet},
    protocol::AggregateKey,
};

/// Synthetic record standing for a whole group of entries. It carries no
/// back-reference to its members and no hover/brush flags of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAggregate {
    pub key: AggregateKey,
    pub member_count: usize,
    pub values: BTreeMap<Attribute, Option<f64>>,
}

impl GroupAggregate {
    /// Mean of `attribute` over the members defining it; `None` when no
    /// member defines it or it was not requested.
    pub fn value(&self, attribute: Attribute) -> Option<f64> {
        self.values.get(&attribute).copied().flatten()
    }

    pub fn label(&self) -> Option<&'static str> {
        match self.key {
            AggregateKey::Faction(family) => faction_name(family),
            AggregateKey::Country(country) => country_name(country),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

pub fn aggregate_by_faction<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
    dims: &[Attribute],
) -> Vec<GroupAggregate> {
    aggregate_by(entries, dims, |entry| AggregateKey::Faction(entry.family))
}

pub fn aggregate_by_country<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
    dims: &[Attribute],
) -> Vec<GroupAggregate> {
    aggregate_by(entries, dims, |entry| AggregateKey::Country(entry.country))
}

/// Groups entries by `group_of` and averages each requested dimension over
/// the entries that define it. Output is ordered by group key.
fn aggregate_by<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
    dims: &[Attribute],
    group_of: impl Fn(&Entry) -> AggregateKey,
) -> Vec<GroupAggregate> {
    let mut groups: BTreeMap<AggregateKey, (usize, Vec<Mean>)> = BTreeMap::new();
    for entry in entries {
        let (members, means) = groups
            .entry(group_of(entry))
            .or_insert_with(|| (0, vec![Mean::default(); dims.len()]));
        *members += 1;
        for (mean, attribute) in means.iter_mut().zip(dims) {
            if let Some(value) = entry.value(*attribute) {
                mean.add(value);
            }
        }
    }

    groups
        .into_iter()
        .map(|(key, (member_count, means))| GroupAggregate {
            key,
            member_count,
            values: dims
                .iter()
                .copied()
                .zip(means.into_iter().map(Mean::value))
                .collect(),
        })
        .collect()
}

/// Real parties represented by an aggregate key within `entries`.
pub fn members_of<'a>(entries: impl IntoIterator<Item = &'a Entry>, key: AggregateKey) -> PartySet {
    entries
        .into_iter()
        .filter(|entry| match key {
            AggregateKey::Faction(family) => entry.family == family,
            AggregateKey::Country(country) => entry.country == country,
        })
        .map(|entry| entry.party_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use entry_store::PartyRecord;
    use shared::domain::{CountryId, FamilyId, PartyId};

    fn entries() -> Vec<Entry> {
        vec![
            PartyRecord::new(1, 2019)
                .country(3)
                .family(5)
                .value(Attribute::Lrgen, 3.0)
                .value(Attribute::Nationalism, 2.0),
            PartyRecord::new(2, 2019)
                .country(3)
                .family(5)
                .value(Attribute::Lrgen, 5.0),
            PartyRecord::new(3, 2019)
                .country(6)
                .family(7)
                .value(Attribute::Lrgen, 2.0),
            PartyRecord::new(4, 2019)
                .country(6)
                .family(5)
                .value(Attribute::Lrgen, f64::NAN),
        ]
        .into_iter()
        .map(|record| Entry::try_from(record).expect("entry"))
        .collect()
    }

    #[test]
    fn faction_means_skip_undefined_values() {
        let entries = entries();
        let aggregates =
            aggregate_by_faction(&entries, &[Attribute::Lrgen, Attribute::Nationalism]);

        assert_eq!(aggregates.len(), 2);
        let socialists = &aggregates[0];
        assert_eq!(socialists.key, AggregateKey::Faction(FamilyId(5)));
        assert_eq!(socialists.key.to_string(), "faction_5");
        assert_eq!(socialists.member_count, 3);
        assert_eq!(socialists.value(Attribute::Lrgen), Some(4.0));
        assert_eq!(socialists.value(Attribute::Nationalism), Some(2.0));
        assert_eq!(socialists.label(), Some("Socialist"));

        let greens = &aggregates[1];
        assert_eq!(greens.value(Attribute::Lrgen), Some(2.0));
        assert_eq!(greens.value(Attribute::Nationalism), None);
        assert_eq!(greens.value(Attribute::Vote), None);
    }

    #[test]
    fn country_means_group_by_country_code() {
        let entries = entries();
        let aggregates = aggregate_by_country(&entries, &[Attribute::Lrgen]);
        let keys: Vec<_> = aggregates.iter().map(|aggregate| aggregate.key).collect();
        assert_eq!(
            keys,
            vec![
                AggregateKey::Country(CountryId(3)),
                AggregateKey::Country(CountryId(6))
            ]
        );
        assert_eq!(aggregates[1].value(Attribute::Lrgen), Some(2.0));
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(aggregate_by_faction(std::iter::empty::<&Entry>(), &[Attribute::Lrgen]).is_empty());
    }

    #[test]
    fn members_of_resolves_real_parties() {
        let entries = entries();
        assert_eq!(
            members_of(&entries, AggregateKey::Faction(FamilyId(5))),
            [PartyId(1), PartyId(2), PartyId(4)].into_iter().collect()
        );
        assert!(members_of(&entries, AggregateKey::Country(CountryId(99))).is_empty());
    }
}

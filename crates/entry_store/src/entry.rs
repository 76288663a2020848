use std::fmt;

use serde::{
    de::{IgnoredAny, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use shared::{
    attributes::{Attribute, ATTRIBUTE_COUNT},
    domain::{CountryId, FamilyId, KeyField, PartyId, Year},
    error::StoreError,
};

/// One (party, year) observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub party_id: PartyId,
    pub year: Year,
    pub party: String,
    pub country: CountryId,
    pub family: FamilyId,
    #[serde(flatten)]
    pub values: AttributeValues,
    pub hovered: bool,
    pub brushed: bool,
}

impl Entry {
    pub fn value(&self, attribute: Attribute) -> Option<f64> {
        self.values.get(attribute)
    }

    pub fn key(&self) -> (PartyId, Year) {
        (self.party_id, self.year)
    }
}

impl TryFrom<PartyRecord> for Entry {
    type Error = StoreError;

    fn try_from(record: PartyRecord) -> Result<Self, Self::Error> {
        let party_id = record
            .party_id
            .ok_or(StoreError::MissingIdentifier(KeyField::PartyId))?;
        let year = record
            .year
            .ok_or(StoreError::MissingIdentifier(KeyField::Year))?;

        Ok(Self {
            party_id: PartyId(party_id),
            year: Year(year),
            party: record.party.unwrap_or_default(),
            country: CountryId(record.country.unwrap_or_default()),
            family: FamilyId(record.family.unwrap_or_default()),
            values: record.values,
            hovered: false,
            brushed: false,
        })
    }
}

/// Per-attribute numeric values. Undefined, NaN and infinite inputs are all
/// stored as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeValues {
    values: [Option<f64>; ATTRIBUTE_COUNT],
}

impl AttributeValues {
    pub fn get(&self, attribute: Attribute) -> Option<f64> {
        self.values[attribute.index()]
    }

    pub fn set(&mut self, attribute: Attribute, value: Option<f64>) {
        self.values[attribute.index()] = value.filter(|v| v.is_finite());
    }

    pub fn with(mut self, attribute: Attribute, value: f64) -> Self {
        self.set(attribute, Some(value));
        self
    }

    /// Defined values in catalog order.
    pub fn defined(&self) -> impl Iterator<Item = (Attribute, f64)> + '_ {
        Attribute::ALL
            .into_iter()
            .filter_map(|attribute| self.get(attribute).map(|value| (attribute, value)))
    }
}

impl Serialize for AttributeValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (attribute, value) in self.defined() {
            map.serialize_entry(attribute.key(), &value)?;
        }
        map.end()
    }
}

struct AttributeValuesVisitor;

impl<'de> Visitor<'de> for AttributeValuesVisitor {
    type Value = AttributeValues;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of attribute keys to numbers")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut values = AttributeValues::default();
        while let Some(key) = access.next_key::<String>()? {
            match key.parse::<Attribute>() {
                Ok(attribute) => values.set(attribute, access.next_value::<Option<f64>>()?),
                // columns outside the catalog are carried by ingestion but unused here
                Err(_) => {
                    access.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(values)
    }
}

impl<'de> Deserialize<'de> for AttributeValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttributeValuesVisitor)
    }
}

/// Raw ingestion row. Every field is optional so that rows with missing
/// identifiers can be reported instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyRecord {
    #[serde(default)]
    pub party_id: Option<i64>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub country: Option<i64>,
    #[serde(default)]
    pub family: Option<i64>,
    #[serde(flatten)]
    pub values: AttributeValues,
}

impl PartyRecord {
    pub fn new(party_id: i64, year: i32) -> Self {
        Self {
            party_id: Some(party_id),
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn party(mut self, name: impl Into<String>) -> Self {
        self.party = Some(name.into());
        self
    }

    pub fn country(mut self, country: i64) -> Self {
        self.country = Some(country);
        self
    }

    pub fn family(mut self, family: i64) -> Self {
        self.family = Some(family);
        self
    }

    pub fn value(mut self, attribute: Attribute, value: f64) -> Self {
        self.values.set(attribute, Some(value));
        self
    }
}

/// Typed partial update. Only the fields that are `Some` (or listed in
/// `values`) overwrite the target entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub party_id: Option<PartyId>,
    pub year: Option<Year>,
    pub party: Option<String>,
    pub country: Option<CountryId>,
    pub family: Option<FamilyId>,
    pub values: Vec<(Attribute, Option<f64>)>,
    pub hovered: Option<bool>,
    pub brushed: Option<bool>,
}

impl EntryPatch {
    pub fn for_entry(party_id: PartyId, year: Year) -> Self {
        Self {
            party_id: Some(party_id),
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn hovered(mut self, hovered: bool) -> Self {
        self.hovered = Some(hovered);
        self
    }

    pub fn brushed(mut self, brushed: bool) -> Self {
        self.brushed = Some(brushed);
        self
    }

    pub fn party(mut self, name: impl Into<String>) -> Self {
        self.party = Some(name.into());
        self
    }

    pub fn value(mut self, attribute: Attribute, value: Option<f64>) -> Self {
        self.values.push((attribute, value));
        self
    }

    pub(crate) fn key(&self) -> Result<(PartyId, Year), StoreError> {
        let party_id = self
            .party_id
            .ok_or(StoreError::MissingIdentifier(KeyField::PartyId))?;
        let year = self
            .year
            .ok_or(StoreError::MissingIdentifier(KeyField::Year))?;
        Ok((party_id, year))
    }

    pub(crate) fn apply_to(self, entry: &mut Entry) {
        if let Some(party) = self.party {
            entry.party = party;
        }
        if let Some(country) = self.country {
            entry.country = country;
        }
        if let Some(family) = self.family {
            entry.family = family;
        }
        for (attribute, value) in self.values {
            entry.values.set(attribute, value);
        }
        if let Some(hovered) = self.hovered {
            entry.hovered = hovered;
        }
        if let Some(brushed) = self.brushed {
            entry.brushed = brushed;
        }
    }
}

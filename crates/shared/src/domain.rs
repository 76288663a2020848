use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(PartyId, i64);
id_newtype!(CountryId, i64);
id_newtype!(FamilyId, i64);
id_newtype!(Year, i32);

/// Set of parties as produced by a brush or consumed by a batch hover.
pub type PartySet = BTreeSet<PartyId>;

/// Survey waves present in the merged dataset.
pub const SURVEY_YEARS: [Year; 7] = [
    Year(1999),
    Year(2002),
    Year(2006),
    Year(2010),
    Year(2014),
    Year(2019),
    Year(2024),
];

/// Identifies one rendering surface (scatter plot, parallel coordinates, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ViewId(pub String);

impl ViewId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    Hover,
    Brush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyField {
    PartyId,
    Year,
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PartyId => f.write_str("party_id"),
            Self::Year => f.write_str("year"),
        }
    }
}

/// CHES party family labels, keyed by the `family` code.
pub fn faction_name(family: FamilyId) -> Option<&'static str> {
    let name = match family.0 {
        1 => "Radical Right",
        2 => "Conservatives",
        3 => "Liberal",
        4 => "Christian-Democratic",
        5 => "Socialist",
        6 => "Radical Left",
        7 => "Green",
        8 => "Regionalist",
        9 => "No family",
        10 => "Confessional",
        11 => "Agrarian/Center",
        _ => return None,
    };
    Some(name)
}

pub fn country_name(country: CountryId) -> Option<&'static str> {
    let name = match country.0 {
        1 => "Belgium",
        2 => "Denmark",
        3 => "Germany",
        4 => "Greece",
        5 => "Spain",
        6 => "France",
        7 => "Ireland",
        8 => "Italy",
        10 => "Netherlands",
        11 => "United Kingdom",
        12 => "Portugal",
        13 => "Austria",
        14 => "Finland",
        16 => "Sweden",
        20 => "Bulgaria",
        21 => "Czech Republic",
        22 => "Estonia",
        23 => "Hungary",
        24 => "Latvia",
        25 => "Lithuania",
        26 => "Poland",
        27 => "Romania",
        28 => "Slovakia",
        29 => "Slovenia",
        31 => "Croatia",
        40 => "Cyprus",
        _ => return None,
    };
    Some(name)
}

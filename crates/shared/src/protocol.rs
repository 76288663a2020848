use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    attributes::Attribute,
    domain::{CountryId, FamilyId, InteractionMode, PartyId, PartySet, ViewId, Year},
};

/// Gestures a view adapter can report to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ViewCommand {
    Brush {
        view_id: ViewId,
        selection: Option<PartySet>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extent: Option<BrushExtent>,
    },
    Hover {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<ViewId>,
        target: HoverTarget,
        on: bool,
    },
    YearChange {
        year: Year,
    },
    SetMode {
        view_id: ViewId,
        mode: InteractionMode,
    },
}

impl ViewCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Brush { .. } => "brush",
            Self::Hover { .. } => "hover",
            Self::YearChange { .. } => "year_change",
            Self::SetMode { .. } => "set_mode",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HoverTarget {
    /// One (party, year) row.
    Point { party_id: PartyId, year: Year },
    /// Every year-instance of every listed party.
    Batch { party_ids: PartySet },
    /// A synthetic faction or country aggregate point.
    Aggregate { key: AggregateKey },
    /// One quartile region of a box plot over the active year.
    QuartileBand {
        attribute: Attribute,
        band: QuartileBand,
        #[serde(default)]
        brushed_only: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuartileBand {
    Lower,
    LowerMiddle,
    UpperMiddle,
    Upper,
}

impl QuartileBand {
    pub const ALL: [QuartileBand; 4] = [
        Self::Lower,
        Self::LowerMiddle,
        Self::UpperMiddle,
        Self::Upper,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Lower => "Q0-Q1",
            Self::LowerMiddle => "Q1-Q2",
            Self::UpperMiddle => "Q2-Q3",
            Self::Upper => "Q3-Q4",
        }
    }
}

/// Visual geometry of a brush, kept so it can be redrawn when a view
/// re-enters brush mode. The coordinator never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BrushExtent {
    Rect { x0: f64, y0: f64, x1: f64, y1: f64 },
    Axes { intervals: Vec<AxisInterval> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisInterval {
    pub attribute: Attribute,
    pub low: f64,
    pub high: f64,
}

/// Identifier of a synthetic aggregate record, rendered as `faction_<id>`
/// or `country_<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AggregateKey {
    Faction(FamilyId),
    Country(CountryId),
}

impl fmt::Display for AggregateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Faction(family) => write!(f, "faction_{family}"),
            Self::Country(country) => write!(f, "country_{country}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed aggregate key '{0}'")]
pub struct MalformedAggregateKey(pub String);

impl FromStr for AggregateKey {
    type Err = MalformedAggregateKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || MalformedAggregateKey(raw.to_string());
        let (kind, code) = raw.split_once('_').ok_or_else(malformed)?;
        let code = code.parse::<i64>().map_err(|_| malformed())?;
        match kind {
            "faction" => Ok(Self::Faction(FamilyId(code))),
            "country" => Ok(Self::Country(CountryId(code))),
            _ => Err(malformed()),
        }
    }
}

impl From<AggregateKey> for String {
    fn from(value: AggregateKey) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for AggregateKey {
    type Error = MalformedAggregateKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// What a change notification is about. Subscribers re-read the entries
/// they render; the payload only narrows what changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StoreChange {
    EntryAdded { party_id: PartyId, year: Year },
    EntriesLoaded { count: usize },
    EntryUpdated { party_id: PartyId, year: Year },
    EntriesDeleted { party_id: PartyId, count: usize },
    YearChanged { year: Year },
    BrushChanged { brushed: usize },
    HoverChanged { hovered: usize },
}

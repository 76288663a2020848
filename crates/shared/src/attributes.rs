//! Numeric policy-position attributes carried by every entry.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::Year;

pub const ATTRIBUTE_COUNT: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Vote,
    Epvote,
    EuPosition,
    EuIntmark,
    EuForeign,
    Lrgen,
    Lrecon,
    Spendvtax,
    Deregulation,
    Redistribution,
    CivlibLaworder,
    Sociallifestyle,
    ReligiousPrinciples,
    ImmigratePolicy,
    Multiculturalism,
    Environment,
    Regions,
    EthnicMinorities,
    Nationalism,
    Mds1,
    Mds2,
}

impl Attribute {
    pub const ALL: [Attribute; ATTRIBUTE_COUNT] = [
        Self::Vote,
        Self::Epvote,
        Self::EuPosition,
        Self::EuIntmark,
        Self::EuForeign,
        Self::Lrgen,
        Self::Lrecon,
        Self::Spendvtax,
        Self::Deregulation,
        Self::Redistribution,
        Self::CivlibLaworder,
        Self::Sociallifestyle,
        Self::ReligiousPrinciples,
        Self::ImmigratePolicy,
        Self::Multiculturalism,
        Self::Environment,
        Self::Regions,
        Self::EthnicMinorities,
        Self::Nationalism,
        Self::Mds1,
        Self::Mds2,
    ];

    /// Position of this attribute in [`Attribute::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column key as it appears in the dataset.
    pub fn key(self) -> &'static str {
        match self {
            Self::Vote => "vote",
            Self::Epvote => "epvote",
            Self::EuPosition => "eu_position",
            Self::EuIntmark => "eu_intmark",
            Self::EuForeign => "eu_foreign",
            Self::Lrgen => "lrgen",
            Self::Lrecon => "lrecon",
            Self::Spendvtax => "spendvtax",
            Self::Deregulation => "deregulation",
            Self::Redistribution => "redistribution",
            Self::CivlibLaworder => "civlib_laworder",
            Self::Sociallifestyle => "sociallifestyle",
            Self::ReligiousPrinciples => "religious_principles",
            Self::ImmigratePolicy => "immigrate_policy",
            Self::Multiculturalism => "multiculturalism",
            Self::Environment => "environment",
            Self::Regions => "regions",
            Self::EthnicMinorities => "ethnic_minorities",
            Self::Nationalism => "nationalism",
            Self::Mds1 => "mds1",
            Self::Mds2 => "mds2",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Vote => "Vote share",
            Self::Epvote => "EP vote share",
            Self::EuPosition => "EU position",
            Self::EuIntmark => "EU internal market",
            Self::EuForeign => "EU foreign policy",
            Self::Lrgen => "Left-right general",
            Self::Lrecon => "Left-right economic",
            Self::Spendvtax => "Spending vs taxes",
            Self::Deregulation => "Deregulation",
            Self::Redistribution => "Redistribution",
            Self::CivlibLaworder => "Law and order",
            Self::Sociallifestyle => "Social lifestyle",
            Self::ReligiousPrinciples => "Religious principles",
            Self::ImmigratePolicy => "Immigration policy",
            Self::Multiculturalism => "Multiculturalism",
            Self::Environment => "Environment",
            Self::Regions => "Regional decentralization",
            Self::EthnicMinorities => "Ethnic minorities",
            Self::Nationalism => "Nationalism",
            Self::Mds1 => "MDS dimension 1",
            Self::Mds2 => "MDS dimension 2",
        }
    }

    /// First survey wave in which the question was asked.
    pub fn min_year(self) -> Year {
        match self {
            Self::EuIntmark => Year(2002),
            Self::Spendvtax
            | Self::Deregulation
            | Self::Redistribution
            | Self::CivlibLaworder
            | Self::Sociallifestyle
            | Self::ReligiousPrinciples
            | Self::ImmigratePolicy
            | Self::Multiculturalism
            | Self::Regions
            | Self::EthnicMinorities => Year(2006),
            Self::Environment => Year(2010),
            Self::Nationalism => Year(2014),
            _ => Year(1999),
        }
    }

    pub fn is_available_in(self, year: Year) -> bool {
        year >= self.min_year()
    }

    /// Attributes asked in the given survey wave, in catalog order.
    pub fn available_in(year: Year) -> impl Iterator<Item = Attribute> {
        Self::ALL
            .into_iter()
            .filter(move |attribute| attribute.is_available_in(year))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attribute '{0}'")]
pub struct UnknownAttribute(pub String);

impl FromStr for Attribute {
    type Err = UnknownAttribute;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|attribute| attribute.key().eq_ignore_ascii_case(raw))
            .ok_or_else(|| UnknownAttribute(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_matches_index() {
        for (position, attribute) in Attribute::ALL.iter().enumerate() {
            assert_eq!(attribute.index(), position);
        }
    }

    #[test]
    fn parses_column_keys() {
        assert_eq!("civlib_laworder".parse::<Attribute>(), Ok(Attribute::CivlibLaworder));
        assert_eq!(" LRGEN ".parse::<Attribute>(), Ok(Attribute::Lrgen));
        assert!("leftgen".parse::<Attribute>().is_err());
    }

    #[test]
    fn availability_follows_survey_waves() {
        assert!(!Attribute::Nationalism.is_available_in(Year(2010)));
        assert!(Attribute::Nationalism.is_available_in(Year(2014)));
        assert_eq!(Attribute::available_in(Year(1999)).count(), 8);
        assert_eq!(Attribute::available_in(Year(2024)).count(), ATTRIBUTE_COUNT);
    }

    #[test]
    fn serde_uses_column_keys() {
        let json = serde_json::to_string(&Attribute::EthnicMinorities).expect("serialize");
        assert_eq!(json, "\"ethnic_minorities\"");
    }
}

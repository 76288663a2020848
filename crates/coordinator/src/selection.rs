use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use shared::domain::PartySet;

/// How an engaged brush that selects nothing takes part in the
/// intersection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyBrushPolicy {
    /// Treat it exactly like a disengaged brush: it neither narrows nor
    /// clears the canonical selection.
    #[default]
    Ignore,
    /// The user explicitly selected nothing: the canonical selection
    /// becomes the empty set.
    ClearSelection,
}

impl fmt::Display for EmptyBrushPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => f.write_str("ignore"),
            Self::ClearSelection => f.write_str("clear_selection"),
        }
    }
}

impl FromStr for EmptyBrushPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "clear" | "clear_selection" => Ok(Self::ClearSelection),
            other => Err(format!("unknown empty brush policy '{other}'")),
        }
    }
}

/// Reduces per-view brush slots to the canonical selection.
///
/// `None` slots are disengaged. The result is `None` when no slot is
/// active, otherwise the intersection of the active sets.
pub fn intersect_engaged<'a>(
    selections: impl IntoIterator<Item = Option<&'a PartySet>>,
    policy: EmptyBrushPolicy,
) -> Option<PartySet> {
    let mut canonical: Option<PartySet> = None;
    for selection in selections.into_iter().flatten() {
        if selection.is_empty() {
            match policy {
                EmptyBrushPolicy::Ignore => continue,
                EmptyBrushPolicy::ClearSelection => return Some(PartySet::new()),
            }
        }
        canonical = Some(match canonical {
            None => selection.clone(),
            Some(acc) => acc.intersection(selection).copied().collect(),
        });
    }
    canonical
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::PartyId;

    fn set(ids: &[i64]) -> PartySet {
        ids.iter().copied().map(PartyId).collect()
    }

    #[test]
    fn no_active_slot_means_no_selection() {
        assert_eq!(intersect_engaged([None, None], EmptyBrushPolicy::Ignore), None);
        assert_eq!(
            intersect_engaged(std::iter::empty::<Option<&PartySet>>(), EmptyBrushPolicy::Ignore),
            None
        );
    }

    #[test]
    fn intersects_every_active_slot() {
        let a = set(&[1, 2, 3]);
        let b = set(&[2, 3, 4]);
        let c = set(&[3, 4, 5]);
        assert_eq!(
            intersect_engaged([Some(&a), None, Some(&b), Some(&c)], EmptyBrushPolicy::Ignore),
            Some(set(&[3]))
        );
    }

    #[test]
    fn intersection_is_order_independent() {
        let slots = [
            Some(set(&[1, 2, 3])),
            None,
            Some(set(&[2, 3, 4])),
            Some(set(&[])),
            Some(set(&[3, 9])),
        ];
        let forward = intersect_engaged(slots.iter().map(Option::as_ref), EmptyBrushPolicy::Ignore);
        let backward =
            intersect_engaged(slots.iter().rev().map(Option::as_ref), EmptyBrushPolicy::Ignore);
        assert_eq!(forward, backward);
        assert_eq!(forward, Some(set(&[3])));
    }

    #[test]
    fn disjoint_active_slots_select_nothing() {
        let a = set(&[1]);
        let b = set(&[2]);
        assert_eq!(
            intersect_engaged([Some(&a), Some(&b)], EmptyBrushPolicy::Ignore),
            Some(PartySet::new())
        );
    }

    #[test]
    fn empty_brush_is_inactive_under_ignore_policy() {
        let empty = PartySet::new();
        let a = set(&[1, 2]);
        assert_eq!(intersect_engaged([Some(&empty)], EmptyBrushPolicy::Ignore), None);
        assert_eq!(
            intersect_engaged([Some(&empty), Some(&a)], EmptyBrushPolicy::Ignore),
            Some(a.clone())
        );
    }

    #[test]
    fn empty_brush_clears_under_clear_policy() {
        let empty = PartySet::new();
        let a = set(&[1, 2]);
        assert_eq!(
            intersect_engaged([Some(&a), Some(&empty)], EmptyBrushPolicy::ClearSelection),
            Some(PartySet::new())
        );
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("ignore".parse::<EmptyBrushPolicy>(), Ok(EmptyBrushPolicy::Ignore));
        assert_eq!(
            " Clear ".parse::<EmptyBrushPolicy>(),
            Ok(EmptyBrushPolicy::ClearSelection)
        );
        assert!("drop".parse::<EmptyBrushPolicy>().is_err());
    }
}

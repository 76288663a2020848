//! Box-plot statistics.
//!
//! Quantiles use the R-7 estimator (the default of R, NumPy and d3): for a
//! probability `p` over `n` ascending values the quantile is interpolated at
//! zero-based rank `h = (n - 1) * p` between `x[floor(h)]` and
//! `x[floor(h) + 1]`.

use entry_store::Entry;
use serde::Serialize;
use shared::{
    attributes::Attribute,
    domain::PartySet,
    protocol::QuartileBand,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantileStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl QuantileStats {
    /// Inclusive value range covered by one box-plot hover region.
    pub fn band_range(&self, band: QuartileBand) -> (f64, f64) {
        match band {
            QuartileBand::Lower => (self.min, self.q1),
            QuartileBand::LowerMiddle => (self.q1, self.median),
            QuartileBand::UpperMiddle => (self.median, self.q3),
            QuartileBand::Upper => (self.q3, self.max),
        }
    }

    pub fn interquartile_range(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Result of summarising a sequence. Empty or all-undefined input yields
/// `NoData` so renderers can skip the box instead of drawing NaN geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuantileSummary {
    NoData,
    Stats(QuantileStats),
}

impl QuantileSummary {
    pub fn stats(&self) -> Option<&QuantileStats> {
        match self {
            Self::NoData => None,
            Self::Stats(stats) => Some(stats),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// R-7 quantile over an ascending slice. `p` is clamped to `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let h = last as f64 * p.clamp(0.0, 1.0);
    let lower = h.floor() as usize;
    let upper = (lower + 1).min(last);
    let fraction = h - lower as f64;
    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

/// Summarises the finite values of `values`; NaN and infinities are skipped.
pub fn compute_quantile_stats(values: impl IntoIterator<Item = f64>) -> QuantileSummary {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return QuantileSummary::NoData;
    }
    sorted.sort_by(f64::total_cmp);

    let quantile = |p| quantile_sorted(&sorted, p).unwrap_or(f64::NAN);
    QuantileSummary::Stats(QuantileStats {
        min: sorted[0],
        q1: quantile(0.25),
        median: quantile(0.5),
        q3: quantile(0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Summary of one attribute over `entries`, optionally restricted to the
/// brushed ones.
pub fn attribute_summary<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
    attribute: Attribute,
    brushed_only: bool,
) -> QuantileSummary {
    compute_quantile_stats(
        entries
            .into_iter()
            .filter(|entry| !brushed_only || entry.brushed)
            .filter_map(|entry| entry.value(attribute)),
    )
}

/// Parties whose defined value for `attribute` lies in the inclusive range.
pub fn parties_in_range<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
    attribute: Attribute,
    (low, high): (f64, f64),
) -> PartySet {
    entries
        .into_iter()
        .filter(|entry| {
            entry
                .value(attribute)
                .is_some_and(|value| low <= value && value <= high)
        })
        .map(|entry| entry.party_id)
        .collect()
}

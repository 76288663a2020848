//! Pure summaries the views render: box-plot quantiles and per-group means.

mod grouping;
mod quantile;

pub use grouping::{aggregate_by_country, aggregate_by_faction, members_of, GroupAggregate};
pub use quantile::{
    attribute_summary, compute_quantile_stats, parties_in_range, quantile_sorted,
    QuantileStats, QuantileSummary,
};

//! Statistics calculation engine.
//!
//! Computes derived metrics from the prepared match and delivery tables:
//! - Grouped sums and counts
//! - Ratios between aggregates (e.g. batting average)
//! - Dominant value per group (e.g. most wins per season)
//! - Deterministic top-N rankings
//!
//! Every analysis is described by a [`Query`] and run by one engine.

mod aggregate;
mod filter;
mod query;
mod rank;

pub use aggregate::*;
pub use filter::*;
pub use query::*;
pub use rank::*;

//! Core data models for cricket insights.

mod columns;
mod event;
mod match_record;
mod stats;
mod table;

pub use columns::*;
pub use event::*;
pub use match_record::*;
pub use stats::*;
pub use table::*;

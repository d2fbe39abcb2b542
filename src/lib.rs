//! # Cricket Insights
//!
//! Batch analytics over IPL match and ball-by-ball delivery tables.
//!
//! ## Architecture
//!
//! - **storage**: Table loaders (CSV, JSONL, Parquet)
//! - **schema**: Column aliasing and typed normalization
//! - **join**: Left join of deliveries onto matches
//! - **calculate**: Grouped aggregation, ratios, argmax and top-N ranking
//! - **dataset**: One prepared analysis pass
//! - **dashboard**: Named panels and reports
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod join;
pub mod models;
pub mod schema;
pub mod storage;

pub use dataset::{AnalysisError, Dataset};
pub use models::*;

//! CSV-backed persistence for TrendVision.
//!
//! The post store is a flat CSV file that every pipeline stage reads in full
//! and rewrites in full. Writes go through a temp file in the same directory
//! and are renamed into place, so an interrupted stage leaves the previous
//! file untouched.

pub mod error;
pub mod forecast;
pub mod merge;
pub mod posts;

mod atomic;
mod row;

pub use error::StoreError;
pub use forecast::ForecastFile;
pub use merge::{merge, MergeReport};
pub use posts::PostStore;

//! Core data types, unit conversions, icon classification and the merge
//! engine for wxfuse
//!
//! This crate is free of I/O. Source adapters produce [`SourceReport`]s,
//! and [`merge`] folds them into one [`AggregateRecord`] under a strict
//! first-known-value-wins precedence.

pub mod daylight;
pub mod fields;
pub mod icons;
pub mod merge;
pub mod types;
pub mod units;

pub use daylight::*;
pub use fields::*;
pub use icons::*;
pub use merge::*;
pub use types::*;
pub use units::*;

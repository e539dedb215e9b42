//! covid19ru - COVID-19 snapshots of Russian regions
//!
//! Validates daily case snapshots, scrapes the provider's map page into
//! snapshot rows and renders comparative growth charts.

pub mod charts;
pub mod check;
pub mod config;
pub mod data;
pub mod fetch;

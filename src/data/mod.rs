//! Data module - snapshot loading and region filtering

mod loader;
mod processor;

pub use loader::{
    csv_files, SchemaFormat, SnapshotError, SnapshotFile, FORMAT2_SINCE, REQUIRED_COLUMNS,
    SNAPSHOT_DATE_FORMAT,
};
pub use processor::{CaseRow, RegionFilter, TRACKED_COUNTRY};

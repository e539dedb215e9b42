//! Check module - day-over-day snapshot validation

mod checker;
mod state;

pub use checker::{
    check_all, CheckError, CheckOutcome, Checker, FileError, Metric, RegionCountTable,
    ALL_REGIONS_SINCE,
};
pub use state::{CheckerState, RegionCounts, Snapshot};

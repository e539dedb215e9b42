//! Fetch module - provider polling and reformatting into snapshot rows

mod error;
mod monitor;
mod pending;
mod reformat;
pub mod regions;
mod source;

pub use error::FetchError;
pub use monitor::Monitor;
pub use pending::{pending_timestamp, timestring, PendingRecord, RegionReport, TIMESTAMP_FORMAT};
pub use reformat::{active_cases, reformat, write_csv, Reformatted, CSSE2_HEADER};
pub use regions::UnknownRegionMode;
pub use source::{
    extract_config, fetch, parse_regions, FixtureSource, HttpSource, PageSource,
    DEFAULT_SOURCE_URL,
};

use crate::charts::RegionKey;
use crate::data::SnapshotError;
use crate::fetch::FetchError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("Polars error: {0}")]
    Table(#[from] PolarsError),
    #[error(transparent)]
    Pending(#[from] FetchError),
    #[error("Cannot walk snapshot folder: {0}")]
    Walk(String),
    #[error("No time line for {0:?}")]
    MissingTimeLine(RegionKey),
    #[error("Time line sequences differ in length")]
    Misaligned,
    #[error("Nothing to plot")]
    NoData,
    #[error("Rendering failed: {0}")]
    Render(String),
}

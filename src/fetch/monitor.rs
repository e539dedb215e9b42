//! Continuous polling of the provider.

use crate::fetch::regions::UnknownRegionMode;
use crate::fetch::{fetch, reformat, write_csv, FetchError, PageSource, Reformatted};
use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Fetches, reformats and dumps one record per interval, forever.
pub struct Monitor<S: PageSource> {
    source: S,
    pending_dir: PathBuf,
    interval: Duration,
}

impl<S: PageSource> Monitor<S> {
    pub fn new(source: S, pending_dir: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            source,
            pending_dir: pending_dir.into(),
            interval,
        }
    }

    /// One poll: JSON dump, lenient reformat, CSV dump.
    pub fn poll_once(&self) -> Result<Reformatted, FetchError> {
        let record = fetch(&self.source, Some(&self.pending_dir))?;
        let formatted = reformat(&record, UnknownRegionMode::Lenient)?;
        write_csv(&record, &formatted, &self.pending_dir)?;
        Ok(formatted)
    }

    /// Poll once and log any failure instead of returning it.
    pub fn tick(&self) -> Option<Reformatted> {
        match self.poll_once() {
            Ok(formatted) => Some(formatted),
            Err(err) => {
                warn!(error = %err, "poll failed, ignoring");
                None
            }
        }
    }

    /// Poll until the process is interrupted.
    pub fn run(&self) -> ! {
        loop {
            self.tick();
            self.countdown();
        }
    }

    fn countdown(&self) {
        let secs = self.interval.as_secs();
        if secs == 0 {
            thread::sleep(self.interval);
            return;
        }
        let mut stdout = std::io::stdout();
        for remaining in (1..=secs).rev() {
            print!("{remaining}..");
            let _ = stdout.flush();
            thread::sleep(Duration::from_secs(1));
        }
        println!();
    }
}

//! covid19ru - snapshot checker, provider scraper and chart renderer.

mod cli;

use std::env;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("covid19ru=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = env::args().collect();
    std::process::exit(cli::run_with_args(&args));
}

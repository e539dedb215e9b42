use anyhow::{bail, Context, Result};
use covid19ru::charts::{self, Language, PlotOptions};
use covid19ru::check::check_all;
use covid19ru::config::Settings;
use covid19ru::fetch::{fetch, reformat, write_csv, HttpSource, Monitor, UnknownRegionMode};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const USAGE: &str =
    "usage: covid19ru <check|fetch|dry-run|monitor|plot|plot-sliding|plot-monitoring> [--en] [--out <path>] [--show] [--threshold <n>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Check,
    Fetch,
    DryRun,
    Monitor,
    Plot,
    PlotSliding,
    PlotMonitoring,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("check") => Some(Command::Check),
        Some("fetch") => Some(Command::Fetch),
        Some("dry-run") => Some(Command::DryRun),
        Some("monitor") => Some(Command::Monitor),
        Some("plot") => Some(Command::Plot),
        Some("plot-sliding") => Some(Command::PlotSliding),
        Some("plot-monitoring") => Some(Command::PlotMonitoring),
        _ => None,
    }
}

/// Flags shared by the chart subcommands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartFlags {
    pub english: bool,
    pub out: Option<PathBuf>,
    pub show: bool,
    pub threshold: Option<f64>,
}

pub fn parse_chart_flags(args: &[String]) -> Result<ChartFlags> {
    let mut flags = ChartFlags::default();
    let mut it = args.iter().skip(2);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--en" => flags.english = true,
            "--show" => flags.show = true,
            "--out" => {
                let path = it.next().context("--out needs a path")?;
                flags.out = Some(PathBuf::from(path));
            }
            "--threshold" => {
                let value = it.next().context("--threshold needs a number")?;
                let threshold = value
                    .parse::<f64>()
                    .with_context(|| format!("invalid threshold {value}"))?;
                flags.threshold = Some(threshold);
            }
            other => bail!("unknown flag {other}"),
        }
    }
    Ok(flags)
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let settings = match Settings::from_env(|key| env::var(key).ok()) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("config error: {err}");
            return 2;
        }
    };

    let result = match command {
        Command::Check => return handle_check(&settings),
        Command::Fetch => handle_fetch(&settings, true),
        Command::DryRun => handle_fetch(&settings, false),
        Command::Monitor => handle_monitor(&settings),
        Command::Plot | Command::PlotSliding | Command::PlotMonitoring => {
            parse_chart_flags(args).and_then(|flags| handle_plot(&settings, command, &flags))
        }
    };
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    }
}

fn handle_check(settings: &Settings) -> i32 {
    let errors = check_all(&settings.data_root);
    for err in &errors {
        error!(file = %err.file.display(), "{}", err.message);
    }
    if errors.is_empty() {
        info!(root = %settings.data_root.display(), "all snapshots consistent");
        0
    } else {
        info!(count = errors.len(), "snapshot errors found");
        1
    }
}

fn source(settings: &Settings) -> Result<HttpSource> {
    HttpSource::new(settings.source_url.clone(), settings.request_timeout())
        .context("building HTTP client")
}

fn handle_fetch(settings: &Settings, dump: bool) -> Result<()> {
    let source = source(settings)?;
    let dump_dir = dump.then_some(settings.pending_dir.as_path());
    let record = fetch(&source, dump_dir).with_context(|| format!("fetching {}", source.url()))?;
    let formatted = reformat(&record, UnknownRegionMode::Strict)?;

    if dump {
        write_csv(&record, &formatted, &settings.pending_dir)?;
    } else {
        for line in &formatted.lines {
            println!("{line}");
        }
    }
    info!(regions = formatted.lines.len(), "provider data reformatted");
    Ok(())
}

fn handle_monitor(settings: &Settings) -> Result<()> {
    if !settings.pending_dir.is_dir() {
        bail!("pending folder {} does not exist", settings.pending_dir.display());
    }
    let monitor = Monitor::new(source(settings)?, &settings.pending_dir, settings.poll_interval());
    monitor.run()
}

fn default_out(command: Command) -> &'static str {
    match command {
        Command::PlotSliding => "covid19ru_sliding.png",
        Command::PlotMonitoring => "covid19ru_monitoring.png",
        _ => "covid19ru.png",
    }
}

fn handle_plot(settings: &Settings, command: Command, flags: &ChartFlags) -> Result<()> {
    let out = flags
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_out(command)));

    let mut options = PlotOptions::default();
    if flags.english {
        options.language = Language::English;
    }
    if let Some(threshold) = flags.threshold {
        options.min_threshold = threshold;
    }

    let root = settings.data_root.as_path();
    match command {
        Command::PlotSliding => {
            charts::plot_sliding(root, options, &out)?;
        }
        Command::PlotMonitoring => {
            charts::plot_monitoring(
                root,
                &settings.pending_dir,
                charts::default_monitoring_since(),
                &out,
            )?;
        }
        _ => {
            charts::plot(root, options, &out)?;
        }
    }

    if flags.show {
        show(&out)?;
    }
    Ok(())
}

fn show(path: &Path) -> Result<()> {
    open::that(path).with_context(|| format!("opening {}", path.display()))
}

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use lineprof::log::configure_from_spec;
use lineprof::{load_stats, show_text, ReportOptions};

#[derive(Parser, Debug)]
#[command(name = "lprof")]
#[command(about = "Print line timings saved by a lineprof profiler")]
struct Cli {
    /// Stats file written by `LineProfiler::dump_stats`
    path: PathBuf,

    /// Seconds per displayed time unit, e.g. 1e-6 to show microseconds
    #[arg(short, long, value_parser = parse_unit)]
    unit: Option<f64>,

    /// Leave out functions that recorded no time
    #[arg(short = 'z', long)]
    skip_zero: bool,

    /// Append a summary table of all functions
    #[arg(short, long)]
    summarize: bool,

    /// Enable logging: a level (`debug`) or `module=level` pairs (`lineprof::stats=trace`)
    #[arg(short, long)]
    log_level: Option<String>,
}

fn parse_unit(value: &str) -> Result<f64, String> {
    let unit: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if unit.is_finite() && unit > 0.0 {
        Ok(unit)
    } else {
        Err(format!("unit must be a positive number of seconds, got {value}"))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(spec) = &cli.log_level {
        configure_from_spec(spec)?;
    }

    let stats = load_stats(&cli.path)
        .with_context(|| format!("could not load {}", cli.path.display()))?;

    let mut options = ReportOptions::new()
        .strip_zeros(cli.skip_zero)
        .summarize(cli.summarize);
    if let Some(unit) = cli.unit {
        options = options.output_unit(unit);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    show_text(&stats, &mut out, &options)?;
    out.flush()?;
    Ok(())
}

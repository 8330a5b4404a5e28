use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use crop_advisor::advisor;
use crop_advisor::catalog::{get_crop_threshold, get_crop_thresholds, CropThresholdView};
use crop_advisor::config::{load_config, AdvisorConfig};
use crop_advisor::file_processor::load_from_config;
use crop_advisor::metrics::METRICS;
use crop_advisor::{DayGrouping, WindowSpec};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "crop_advisor", version)]
#[command(about = "Crop advisories and suitability from historical daily weather", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, env = "CROP_ADVISOR_CONFIG")]
    config: Option<PathBuf>,

    /// Directory of weather CSV exports (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List locations with record counts and date spans
    Locations,
    /// Show the threshold catalog, or one crop
    Thresholds { crop: Option<String> },
    /// Advisories for a crop over a window
    Recommend {
        #[command(flatten)]
        window: WindowArgs,
        #[arg(long)]
        crop: String,
    },
    /// Advisories over the last days at one location
    Recent {
        #[arg(long)]
        location: String,
        #[arg(long)]
        crop: String,
        /// Last day of the window (defaults to the latest observation)
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        days: Option<i64>,
    },
    /// Suitability of one crop, or of every crop, at a location
    Suitability {
        #[arg(long)]
        location: String,
        #[arg(long)]
        crop: Option<String>,
        #[arg(long)]
        min_score: Option<f64>,
    },
    /// Per-day averages over a window
    Forecast {
        #[command(flatten)]
        window: WindowArgs,
        /// Group by calendar date instead of day of month
        #[arg(long)]
        by_date: bool,
    },
}

#[derive(Args, Debug)]
struct WindowArgs {
    /// Calendar month (1-12), across all years
    #[arg(long)]
    month: Option<u32>,
    /// ISO week (1-53), across all years
    #[arg(long, conflicts_with = "month")]
    week: Option<u32>,
    /// Week within --month (1-5)
    #[arg(long, requires = "month")]
    week_of_month: Option<u32>,
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
    /// Restrict a --from/--to window to one location, or select a whole location
    #[arg(long)]
    location: Option<String>,
}

impl WindowArgs {
    fn to_spec(&self) -> Result<WindowSpec> {
        let spec = match (self.month, self.week, self.week_of_month, self.from, self.to) {
            (Some(month), None, Some(week), None, None) => WindowSpec::month_week(month, week),
            (Some(month), None, None, None, None) => WindowSpec::month(month),
            (None, Some(week), None, None, None) => WindowSpec::iso_week(week),
            (None, None, None, Some(from), Some(to)) => {
                let spec = WindowSpec::date_range(from, to);
                return Ok(match &self.location {
                    Some(location) => spec.at_location(location.as_str()),
                    None => spec,
                });
            }
            (None, None, None, None, None) => match &self.location {
                Some(location) => return Ok(WindowSpec::location(location.as_str())),
                None => bail!("no window given: use --month, --week, --month with --week-of-month, --from with --to, or --location"),
            },
            _ => bail!("use exactly one of --month, --week, --month with --week-of-month, or --from with --to"),
        };
        if self.location.is_some() {
            bail!("--location can only be combined with --from/--to");
        }
        Ok(spec)
    }
}

fn resolve_config(cli: &Cli) -> Result<AdvisorConfig> {
    let config = match &cli.config {
        Some(path) => load_config(path).with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AdvisorConfig::default(),
    };
    let mut config = config.with_env_overrides()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;

    // The catalog does not need the weather history.
    if let Command::Thresholds { crop } = &cli.command {
        return match crop {
            Some(name) => print_json(&CropThresholdView::from(get_crop_threshold(name)?)),
            None => print_json(&get_crop_thresholds().iter().map(CropThresholdView::from).collect::<Vec<_>>()),
        };
    }

    info!("Loading weather data from {}", config.data_dir.display());
    let dataset = load_from_config(&config)
        .with_context(|| format!("Failed to load weather data from {}", config.data_dir.display()))?;

    match &cli.command {
        Command::Thresholds { .. } => {}
        Command::Locations => print_json(&advisor::location_summary(&dataset))?,
        Command::Recommend { window, crop } => {
            print_json(&advisor::recommendation_report(&dataset, &window.to_spec()?, crop)?)?
        }
        Command::Recent { location, crop, end, days } => {
            let days = days.unwrap_or(config.rolling_window_days);
            print_json(&advisor::recent_advisory(&dataset, location, *end, days, crop)?)?
        }
        Command::Suitability { location, crop, min_score } => {
            let min_score = min_score.unwrap_or(config.min_match_score);
            match crop {
                Some(crop) => print_json(&advisor::crop_suitability(&dataset, location, crop, min_score)?)?,
                None => print_json(&advisor::suitable_crops(&dataset, location, min_score)?)?,
            }
        }
        Command::Forecast { window, by_date } => {
            let grouping = if *by_date { DayGrouping::Date } else { DayGrouping::DayOfMonth };
            print_json(&advisor::forecast(&dataset, &window.to_spec()?, grouping)?)?
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = run(&cli);
    // Logged for failed runs too.
    METRICS.lock().print_summary();
    result
}

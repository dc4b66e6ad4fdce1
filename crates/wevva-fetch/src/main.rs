//! wevva-fetch - print today's and yesterday's hourly temperatures as JSON.
//!
//! Intended as the data source of the `wevva` collector. Reads the API key
//! from `WEATHER_API_KEY`; logs go to stderr so stdout holds only the report.

mod client;

use anyhow::Context;
use clap::Parser;
use time::OffsetDateTime;
use tracing::warn;

use wevva_types::{DailyReport, DayLabel, TemperatureRecord};

use crate::client::{Result, WeatherClient};

/// Environment variable holding the OpenWeatherMap API key.
const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Fetch hourly feels-like temperatures for today and yesterday.
#[derive(Parser, Debug)]
#[command(name = "wevva-fetch")]
#[command(version, about, long_about = None)]
struct Args {
    /// Latitude of the location.
    #[arg(long, default_value_t = 51.5074, allow_negative_numbers = true)]
    lat: f64,

    /// Longitude of the location.
    #[arg(long, default_value_t = 0.1278, allow_negative_numbers = true)]
    lon: f64,

    /// Override the API root.
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wevva_fetch=info".parse()?),
        )
        .init();

    let api_key = std::env::var(API_KEY_ENV).with_context(|| format!("{} not set", API_KEY_ENV))?;
    let mut client = WeatherClient::new(api_key, args.lat, args.lon);
    if let Some(base_url) = args.base_url {
        client = client.with_base_url(base_url);
    }

    let now = OffsetDateTime::now_utc();
    let (today, yesterday) = futures::join!(client.today(), client.yesterday(now));

    let reports = vec![
        report(DayLabel::Today, today),
        report(DayLabel::Yesterday, yesterday),
    ];
    println!("{}", serde_json::to_string(&reports)?);
    Ok(())
}

/// Build a day's report, degrading a failed request to an empty list.
fn report(day: DayLabel, fetched: Result<Vec<TemperatureRecord>>) -> DailyReport {
    let temperatures = fetched.unwrap_or_else(|e| {
        warn!("Failed to fetch {} temperatures: {}", day, e);
        Vec::new()
    });
    DailyReport::new(day, temperatures)
}

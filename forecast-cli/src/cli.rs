use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use forecast_core::{Config, ForecastDay, ForecastError, ForecastService, WeatherSummary};
use tracing::warn;

use crate::fallback::fallback_summary;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Village forecast CLI")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the forecast service key.
    Configure,

    /// List known locations and their grid points.
    Locations,

    /// Show the forecast summary for a location.
    Show {
        /// Location id, e.g. "seoul".
        location: String,

        /// today, tomorrow or day-after.
        #[arg(long, default_value = "today")]
        day: ForecastDay,

        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,

        /// Print a placeholder summary instead of failing.
        #[arg(long)]
        fallback: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Locations => list_locations(),
            Command::Show {
                location,
                day,
                json,
                fallback,
            } => show(&location, day, json, fallback).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = inquire::Text::new("Forecast service key:")
        .with_help_message("Issued by the public data portal; raw or percent-encoded")
        .prompt()
        .context("Failed to read service key")?;

    config.set_service_key(key.trim().to_string());
    config.save()?;

    println!(
        "Saved service key to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn list_locations() -> anyhow::Result<()> {
    let config = Config::load()?;
    for (id, location) in config.location_directory().iter() {
        println!(
            "{id:<12} {label} (nx={nx}, ny={ny})",
            label = location.label,
            nx = location.nx,
            ny = location.ny
        );
    }
    Ok(())
}

async fn show(location: &str, day: ForecastDay, json: bool, fallback: bool) -> anyhow::Result<()> {
    let config = Config::load()?;

    let result: Result<WeatherSummary, ForecastError> = async {
        let service = ForecastService::from_config(&config)?;
        let weather = service.fetch_weather(location, day).await?;
        Ok::<_, ForecastError>(WeatherSummary::clone(&weather))
    }
    .await;

    let weather = match result {
        Ok(weather) => weather,
        Err(err) if fallback => {
            warn!(error = %err, "weather fetch failed, using fallback");
            let directory = config.location_directory();
            let station = directory.resolve(location).ok().map(|l| l.label.as_str());
            fallback_summary(station, day, Utc::now())
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&weather)?);
    } else {
        print_summary(&weather);
    }
    Ok(())
}

fn print_summary(weather: &WeatherSummary) {
    println!("{} · {}", weather.station_name, weather.date_time_label);
    println!("{}", weather.summary);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_with_defaults() {
        let cli = Cli::try_parse_from(["forecast", "show", "seoul"]).expect("should parse");
        match cli.command {
            Command::Show {
                location,
                day,
                json,
                fallback,
            } => {
                assert_eq!(location, "seoul");
                assert_eq!(day, ForecastDay::Today);
                assert!(!json);
                assert!(!fallback);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_day_and_flags() {
        let cli = Cli::try_parse_from([
            "forecast",
            "-v",
            "show",
            "busan",
            "--day",
            "day-after",
            "--json",
            "--fallback",
        ])
        .expect("should parse");

        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Command::Show {
                day: ForecastDay::DayAfter,
                json: true,
                fallback: true,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_day() {
        let err = Cli::try_parse_from(["forecast", "show", "seoul", "--day", "yesterday"])
            .unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }
}

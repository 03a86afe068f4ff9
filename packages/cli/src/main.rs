#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the isochrone map tool.
//!
//! Run with a subcommand for scripted use, or with none to be guided
//! through an analysis with interactive menus.
//!
//! Uses `indicatif-log-bridge` (via [`isochrone_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the request progress bar never fight for the terminal.

mod analyze;
mod interactive;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use isochrone_map_analysis_models::{Profile, RangeKind, RangeSpec};
use isochrone_map_boundary::{DEFAULT_SAMPLING_INTERVAL, SamplingInterval};
use isochrone_map_ors::ServiceConfig;

#[derive(Parser)]
#[command(
    name = "isochrone_map",
    about = "Compare reachable area across travel profiles around a region or point"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Service configuration overrides (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace isochrones along the boundary of a KML or `GeoJSON` region
    Region {
        /// Boundary file (.kml, .geojson, or .json)
        #[arg(long)]
        file: PathBuf,
        /// Use every Nth boundary vertex as a sample point (5-50, steps of 5)
        #[arg(long, default_value_t = DEFAULT_SAMPLING_INTERVAL)]
        sampling: usize,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Compute isochrones around a single `lon,lat` coordinate
    Point {
        /// Coordinate as "longitude,latitude" (e.g., "106.8,-6.2")
        #[arg(long, allow_hyphen_values = true)]
        coordinate: String,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// List supported travel profiles
    Profiles,
}

/// Options shared by region and point analyses.
#[derive(Args)]
struct AnalysisArgs {
    /// Comma-separated time thresholds in minutes (default: 5,10,15)
    #[arg(long, value_delimiter = ',', conflicts_with = "meters")]
    minutes: Vec<u32>,
    /// Comma-separated distance thresholds in meters
    #[arg(long, value_delimiter = ',')]
    meters: Vec<u32>,
    /// Comma-separated travel profiles (default: driving-car,cycling-regular,foot-walking)
    #[arg(long, value_delimiter = ',')]
    profiles: Vec<Profile>,
    /// `OpenRouteService` API key
    #[arg(long, env = "ORS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Where to write the map layers
    #[arg(long, default_value = "isochrones.geojson")]
    output: PathBuf,
}

impl AnalysisArgs {
    fn range(&self) -> RangeSpec {
        if !self.meters.is_empty() {
            RangeSpec::from_meters(&self.meters)
        } else if !self.minutes.is_empty() {
            RangeSpec::from_minutes(&self.minutes)
        } else {
            RangeSpec::from_input(RangeKind::Time, RangeKind::Time.menu_defaults())
        }
    }

    fn profiles(&self) -> Vec<Profile> {
        if self.profiles.is_empty() {
            Profile::DEFAULT_SELECTION.to_vec()
        } else {
            self.profiles.clone()
        }
    }

    fn api_key(&self) -> Result<String, Box<dyn std::error::Error>> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| "No API key: pass --api-key or set ORS_API_KEY".into())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = isochrone_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::embedded(),
    };

    let Some(command) = cli.command else {
        return interactive::run(&multi, &config).await;
    };

    match command {
        Commands::Region {
            file,
            sampling,
            analysis,
        } => {
            let run = isochrone_map_analysis::region_run(
                &file,
                SamplingInterval::new(sampling)?,
                analysis.range(),
                analysis.profiles(),
            )?;
            let api_key = analysis.api_key()?;
            analyze::execute(&multi, &config, api_key, run, &analysis.output).await?;
        }
        Commands::Point {
            coordinate,
            analysis,
        } => {
            let run = isochrone_map_analysis::point_run(
                &coordinate,
                analysis.range(),
                analysis.profiles(),
            )?;
            let api_key = analysis.api_key()?;
            analyze::execute(&multi, &config, api_key, run, &analysis.output).await?;
        }
        Commands::Profiles => analyze::list_profiles(),
    }

    Ok(())
}

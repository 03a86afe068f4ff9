#![allow(clippy::module_name_repetitions)]

//! Interactive front end for the isochrone map tool.
//!
//! Walks the user through choosing an input, thresholds, profiles, and
//! sampling density with `dialoguer` menus, then runs the analysis.

use std::path::PathBuf;

use dialoguer::{Input, MultiSelect, Password, Select};
use isochrone_map_analysis::AnalysisRun;
use isochrone_map_analysis_models::{Profile, RangeKind, RangeSpec};
use isochrone_map_boundary::SamplingInterval;
use isochrone_map_cli_utils::MultiProgress;
use isochrone_map_ors::ServiceConfig;

/// What the analysis is centered on.
enum InputMode {
    Region,
    Point,
}

impl InputMode {
    const ALL: &[Self] = &[Self::Region, Self::Point];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Region => "Region boundary (KML or GeoJSON file)",
            Self::Point => "Single point (longitude,latitude)",
        }
    }
}

/// Prompts for every analysis setting, then runs the analysis.
///
/// # Errors
///
/// Returns an error if a prompt fails, the boundary or coordinate cannot
/// be parsed, or the layer file cannot be written.
pub async fn run(
    multi: &MultiProgress,
    config: &ServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Isochrone Map");
    println!();

    let labels: Vec<&str> = InputMode::ALL.iter().map(InputMode::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to analyze?")
        .items(&labels)
        .default(0)
        .interact()?;
    let mode = &InputMode::ALL[idx];

    let api_key = prompt_api_key()?;
    let range = prompt_range()?;
    if range.is_empty() {
        println!("No thresholds selected.");
        return Ok(());
    }
    let profiles = prompt_profiles()?;
    if profiles.is_empty() {
        println!("No profiles selected.");
        return Ok(());
    }

    let run = match mode {
        InputMode::Region => {
            let path: String = Input::new()
                .with_prompt("Boundary file path")
                .interact_text()?;
            let interval = prompt_sampling()?;
            let region = isochrone_map_boundary::load_region(&PathBuf::from(path.trim()))?;
            AnalysisRun::for_region(region, interval, range, profiles)?
        }
        InputMode::Point => {
            let coordinate: String = Input::new()
                .with_prompt("Coordinate (longitude,latitude)")
                .interact_text()?;
            isochrone_map_analysis::point_run(&coordinate, range, profiles)?
        }
    };

    let output: String = Input::new()
        .with_prompt("Write map layers to")
        .default("isochrones.geojson".to_string())
        .interact_text()?;

    crate::analyze::execute(multi, config, api_key, run, &PathBuf::from(output)).await
}

/// Uses `ORS_API_KEY` when set, otherwise asks for the key without
/// echoing it.
fn prompt_api_key() -> Result<String, Box<dyn std::error::Error>> {
    if let Ok(key) = std::env::var("ORS_API_KEY")
        && !key.trim().is_empty()
    {
        log::info!("Using API key from ORS_API_KEY");
        return Ok(key);
    }

    Ok(Password::new()
        .with_prompt("OpenRouteService API key")
        .interact()?)
}

fn prompt_range() -> Result<RangeSpec, Box<dyn std::error::Error>> {
    let kinds = [RangeKind::Time, RangeKind::Distance];
    let idx = Select::new()
        .with_prompt("Measure reachability by")
        .items(&["Travel time", "Travel distance"])
        .default(0)
        .interact()?;
    let kind = kinds[idx];

    let options = kind.menu_options();
    let labels: Vec<String> = options
        .iter()
        .map(|value| format!("{value} {}", kind.input_unit()))
        .collect();
    let defaults: Vec<bool> = options
        .iter()
        .map(|value| kind.menu_defaults().contains(value))
        .collect();

    let selected = MultiSelect::new()
        .with_prompt("Select thresholds (space=toggle, enter=confirm)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    let values: Vec<u32> = selected.iter().map(|&i| options[i]).collect();
    Ok(RangeSpec::from_input(kind, &values))
}

fn prompt_profiles() -> Result<Vec<Profile>, Box<dyn std::error::Error>> {
    let labels: Vec<String> = Profile::ALL.iter().map(ToString::to_string).collect();
    let defaults: Vec<bool> = Profile::ALL
        .iter()
        .map(|profile| Profile::DEFAULT_SELECTION.contains(profile))
        .collect();

    let selected = MultiSelect::new()
        .with_prompt("Select travel profiles (space=toggle, a=all, enter=confirm)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    Ok(selected.iter().map(|&i| Profile::ALL[i]).collect())
}

fn prompt_sampling() -> Result<SamplingInterval, Box<dyn std::error::Error>> {
    let options: Vec<usize> = SamplingInterval::options().collect();
    let labels: Vec<String> = options
        .iter()
        .map(|n| format!("Every {n} vertices"))
        .collect();
    let default = options
        .iter()
        .position(|&n| n == SamplingInterval::default().get().get())
        .unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Boundary sampling density")
        .items(&labels)
        .default(default)
        .interact()?;

    Ok(SamplingInterval::new(options[idx])?)
}

//! Runs a prepared analysis against `OpenRouteService` and presents the
//! results.

use std::path::Path;

use isochrone_map_analysis::{AnalysisRun, Dispatcher, FailureKind};
use isochrone_map_analysis_models::Profile;
use isochrone_map_cli_utils::{MultiProgress, RequestProgress};
use isochrone_map_ors::{OrsClient, ServiceConfig};

/// Dispatches every request of `run`, prints the area report, and writes
/// the map layers to `output`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the layer file
/// cannot be written. Individual request failures are reported, not
/// returned.
pub async fn execute(
    multi: &MultiProgress,
    config: &ServiceConfig,
    api_key: String,
    mut run: AnalysisRun,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = OrsClient::new(api_key, config)?;

    log::info!(
        "Requesting isochrones from {} at {} point(s) for {} profile(s) ({} request(s))",
        config.name,
        run.sample_points().len(),
        run.profiles().len(),
        run.planned_requests()
    );

    Dispatcher::from_config(&client, config)
        .with_progress(RequestProgress::new(multi))
        .dispatch(&mut run)
        .await;

    println!();
    print!("{}", isochrone_map_analysis::report(&run));

    if !run.failures().is_empty() {
        println!();
        println!("{} request(s) failed and were skipped:", run.failures().len());
        for failure in run.failures() {
            println!("  {failure}");
        }
        if run
            .failures()
            .iter()
            .any(|f| f.kind == FailureKind::Unauthorized)
        {
            println!("Check that your OpenRouteService API key is valid.");
        }
    }

    isochrone_map_analysis::write_layers(&run, output)?;
    println!();
    println!("Map layers written to {}", output.display());

    Ok(())
}

/// Prints every supported travel profile with its map color.
pub fn list_profiles() {
    println!("{:<20} COLOR", "PROFILE");
    println!("{}", "-".repeat(30));
    for profile in Profile::ALL {
        println!("{:<20} {}", profile.as_ref(), profile.color());
    }
}

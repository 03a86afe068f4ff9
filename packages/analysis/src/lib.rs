#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Isochrone aggregation engine.
//!
//! An [`AnalysisRun`] holds the sample points of a region boundary (or a
//! single user-entered point), the requested thresholds and profiles, and
//! everything the run produces. The [`Dispatcher`] walks every
//! `(profile, sample point)` pair through the isochrone service with
//! rate-limit retry and pacing, folding each response into per-profile
//! totals. [`summary::report`] and [`layers::render_layers`] turn a
//! finished run into the area report and the map layers.
//!
//! Reported areas are plain sums over every returned isochrone. Isochrones
//! from neighboring sample points overlap, so the totals overstate the
//! true reachable area; they are meant for comparing profiles against each
//! other, not as a geographic measurement.

pub mod aggregate;
pub mod dispatch;
pub mod layers;
pub mod progress;
pub mod retry;
pub mod run;
pub mod summary;

use std::path::Path;

use isochrone_map_analysis_models::{Profile, RangeSpec};
use isochrone_map_boundary::{BoundaryError, SamplingInterval};
use thiserror::Error;

pub use dispatch::Dispatcher;
pub use layers::{render_layers, write_layers};
pub use run::{AnalysisInput, AnalysisRun, FailureKind, PointFailure};
pub use summary::{AreaReport, report};

/// Errors that stop an analysis run before or after dispatch.
///
/// Per-point request failures never surface here; they are collected on
/// the run as [`PointFailure`]s.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Loading the boundary or parsing the coordinate failed.
    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    /// The run was started without any profile.
    #[error("No travel profile selected")]
    NoProfiles,

    /// The run was started without any threshold.
    #[error("No time or distance threshold selected")]
    NoThresholds,

    /// Writing the layer file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the layer file failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Loads the boundary at `path` and prepares a run over its sample points.
///
/// # Errors
///
/// Returns [`AnalysisError`] if the file cannot be loaded, contains no
/// polygon vertices, or no profile or threshold was selected.
pub fn region_run(
    path: &Path,
    interval: SamplingInterval,
    range: RangeSpec,
    profiles: Vec<Profile>,
) -> Result<AnalysisRun, AnalysisError> {
    let region = isochrone_map_boundary::load_region(path)?;
    AnalysisRun::for_region(region, interval, range, profiles)
}

/// Parses a `lon,lat` pair and prepares a single-point run.
///
/// # Errors
///
/// Returns [`AnalysisError`] if the coordinate is malformed, or no profile
/// or threshold was selected.
pub fn point_run(
    coordinate: &str,
    range: RangeSpec,
    profiles: Vec<Profile>,
) -> Result<AnalysisRun, AnalysisError> {
    let point = isochrone_map_boundary::parse_coordinate(coordinate)?;
    AnalysisRun::for_point(point, range, profiles)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use isochrone_map_analysis_models::{IsochroneFeature, IsochroneRequest};
    use isochrone_map_ors::{IsochroneService, ServiceError};

    use super::*;

    #[derive(Default)]
    struct CountingService {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl IsochroneService for CountingService {
        async fn isochrones(
            &self,
            _request: &IsochroneRequest<'_>,
        ) -> Result<Vec<IsochroneFeature>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}_{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn empty_kml_is_rejected_before_dispatch() {
        let path = write_temp(
            "empty.kml",
            r#"<?xml version="1.0"?><kml xmlns="http://www.opengis.net/kml/2.2"><Document/></kml>"#,
        );

        let result = region_run(
            &path,
            SamplingInterval::default(),
            RangeSpec::from_minutes(&[5]),
            vec![Profile::DrivingCar],
        );
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            result,
            Err(AnalysisError::Boundary(BoundaryError::EmptyRegion))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn kml_region_runs_end_to_end() {
        let path = write_temp(
            "square.kml",
            r#"<?xml version="1.0"?>
<kml xmlns="http://www.opengis.net/kml/2.2"><Placemark><Polygon><outerBoundaryIs><LinearRing>
<coordinates>0,0 1,0 1,1 0,1 0,0</coordinates>
</LinearRing></outerBoundaryIs></Polygon></Placemark></kml>"#,
        );
        let service = CountingService::default();

        let mut run = region_run(
            &path,
            SamplingInterval::new(5).unwrap(),
            RangeSpec::from_minutes(&[5, 10]),
            vec![Profile::DrivingCar, Profile::FootWalking],
        )
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        Dispatcher::new(&service).dispatch(&mut run).await;

        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
        let report = report(&run);
        assert_eq!(report.entries.len(), 2);
        assert!(report.entries.iter().all(|e| e.feature_count == 0));
    }

    #[test]
    fn malformed_coordinate_is_a_boundary_error() {
        assert!(matches!(
            point_run("north", RangeSpec::from_minutes(&[5]), vec![Profile::DrivingCar]),
            Err(AnalysisError::Boundary(BoundaryError::MalformedInput { .. }))
        ));
    }
}

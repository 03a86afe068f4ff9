//! The analysis run aggregate.
//!
//! An [`AnalysisRun`] is created when the user starts an analysis and
//! owns everything that run produces. Region and single-point runs share
//! the same type; they differ only in how sample points are derived and
//! how isochrones are styled.

use std::fmt;

use isochrone_map_analysis_models::{AreaSummary, Profile, RangeSpec, RenderRecord, SamplePoint};
use isochrone_map_boundary::{Region, SamplingInterval, sample_boundary};
use serde::Serialize;

use crate::AnalysisError;
use crate::dispatch::ProfileOutcome;
use crate::retry::RetryError;

/// Isochrone fill opacity when tracing a region boundary.
pub const REGION_FILL_OPACITY: f64 = 0.2;

/// Isochrone fill opacity around a single input point.
pub const POINT_FILL_OPACITY: f64 = 0.4;

/// What the run computes isochrones around.
#[derive(Debug, Clone)]
pub enum AnalysisInput {
    /// Points sampled along a region boundary.
    Region(Region),
    /// One user-entered coordinate.
    Point(SamplePoint),
}

impl AnalysisInput {
    /// Where the map is centered.
    #[must_use]
    pub const fn center(&self) -> SamplePoint {
        match self {
            Self::Region(region) => region.centroid(),
            Self::Point(point) => *point,
        }
    }

    /// Isochrone fill opacity for this kind of input.
    #[must_use]
    pub const fn fill_opacity(&self) -> f64 {
        match self {
            Self::Region(_) => REGION_FILL_OPACITY,
            Self::Point(_) => POINT_FILL_OPACITY,
        }
    }
}

/// How a single point request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Every attempt was rate limited.
    ExhaustedRetries,
    /// The service rejected the API key.
    Unauthorized,
    /// Any other failure; not retried.
    Unclassified,
}

/// A request that failed and was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointFailure {
    /// Profile being processed.
    pub profile: Profile,
    /// Index of the point within the run's sample points.
    pub point_index: usize,
    /// The point itself.
    pub point: SamplePoint,
    /// Failure classification.
    pub kind: FailureKind,
    /// Error message.
    pub message: String,
}

impl PointFailure {
    pub(crate) fn new(
        profile: Profile,
        point_index: usize,
        point: SamplePoint,
        error: &RetryError,
    ) -> Self {
        use isochrone_map_ors::ServiceError;

        let kind = match error {
            RetryError::ExhaustedRetries { .. } => FailureKind::ExhaustedRetries,
            RetryError::Request(ServiceError::Unauthorized { .. }) => FailureKind::Unauthorized,
            RetryError::Request(_) => FailureKind::Unclassified,
        };

        Self {
            profile,
            point_index,
            point,
            kind,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for PointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed for point {} ({}) with {}: {}",
            self.point_index, self.point, self.profile, self.message
        )
    }
}

/// One analysis session: inputs, sample points, and accumulated results.
#[derive(Debug)]
pub struct AnalysisRun {
    input: AnalysisInput,
    sample_points: Vec<SamplePoint>,
    range: RangeSpec,
    profiles: Vec<Profile>,
    summaries: Vec<AreaSummary>,
    records: Vec<RenderRecord>,
    failures: Vec<PointFailure>,
    requests_issued: u64,
}

impl AnalysisRun {
    /// Starts a run over points sampled from `region`'s boundary.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if the region has no vertices, or no
    /// profile or threshold was selected.
    pub fn for_region(
        region: Region,
        interval: SamplingInterval,
        range: RangeSpec,
        profiles: Vec<Profile>,
    ) -> Result<Self, AnalysisError> {
        validate(&range, &profiles)?;
        let sample_points = sample_boundary(&region, interval.get())?;
        Ok(Self::new(
            AnalysisInput::Region(region),
            sample_points,
            range,
            profiles,
        ))
    }

    /// Starts a run at a single point.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if no profile or threshold was selected.
    pub fn for_point(
        point: SamplePoint,
        range: RangeSpec,
        profiles: Vec<Profile>,
    ) -> Result<Self, AnalysisError> {
        validate(&range, &profiles)?;
        Ok(Self::new(AnalysisInput::Point(point), vec![point], range, profiles))
    }

    const fn new(
        input: AnalysisInput,
        sample_points: Vec<SamplePoint>,
        range: RangeSpec,
        profiles: Vec<Profile>,
    ) -> Self {
        Self {
            input,
            sample_points,
            range,
            profiles,
            summaries: Vec::new(),
            records: Vec::new(),
            failures: Vec::new(),
            requests_issued: 0,
        }
    }

    /// What the run is centered on.
    #[must_use]
    pub const fn input(&self) -> &AnalysisInput {
        &self.input
    }

    /// Points requested for every profile, in boundary order.
    #[must_use]
    pub fn sample_points(&self) -> &[SamplePoint] {
        &self.sample_points
    }

    /// Thresholds requested at every point.
    #[must_use]
    pub const fn range(&self) -> &RangeSpec {
        &self.range
    }

    /// Profiles in configured order.
    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Per-profile totals for every profile processed so far.
    #[must_use]
    pub fn summaries(&self) -> &[AreaSummary] {
        &self.summaries
    }

    /// Render records for every returned isochrone.
    #[must_use]
    pub fn records(&self) -> &[RenderRecord] {
        &self.records
    }

    /// Requests that failed and were skipped.
    #[must_use]
    pub fn failures(&self) -> &[PointFailure] {
        &self.failures
    }

    /// Point requests issued (successful or not).
    #[must_use]
    pub const fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    /// Total point requests the run will issue.
    #[must_use]
    pub fn planned_requests(&self) -> u64 {
        (self.profiles.len() * self.sample_points.len()) as u64
    }

    pub(crate) fn record_profile(&mut self, outcome: ProfileOutcome) {
        self.requests_issued += outcome.requests;
        self.summaries.push(outcome.summary);
        self.records.extend(outcome.records);
        self.failures.extend(outcome.failures);
    }
}

fn validate(range: &RangeSpec, profiles: &[Profile]) -> Result<(), AnalysisError> {
    if profiles.is_empty() {
        return Err(AnalysisError::NoProfiles);
    }
    if range.is_empty() {
        return Err(AnalysisError::NoThresholds);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use geo::{LineString, MultiPolygon, Polygon};

    use super::*;

    fn region() -> Region {
        Region::new(MultiPolygon(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        )]))
        .unwrap()
    }

    #[test]
    fn point_run_has_exactly_one_sample() {
        let point = SamplePoint::new(106.8, -6.2);
        let run = AnalysisRun::for_point(
            point,
            RangeSpec::from_minutes(&[5]),
            vec![Profile::DrivingCar, Profile::FootWalking],
        )
        .unwrap();
        assert_eq!(run.sample_points(), &[point]);
        assert_eq!(run.planned_requests(), 2);
        assert!((run.input().fill_opacity() - POINT_FILL_OPACITY).abs() < f64::EPSILON);
    }

    #[test]
    fn region_run_samples_boundary() {
        let run = AnalysisRun::for_region(
            region(),
            SamplingInterval::new(5).unwrap(),
            RangeSpec::from_minutes(&[5]),
            vec![Profile::DrivingCar],
        )
        .unwrap();
        assert_eq!(run.sample_points().len(), 1);
        assert!((run.input().center().lon - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rejects_missing_profiles_or_thresholds() {
        let point = SamplePoint::new(0.0, 0.0);
        assert!(matches!(
            AnalysisRun::for_point(point, RangeSpec::from_minutes(&[5]), vec![]),
            Err(AnalysisError::NoProfiles)
        ));
        assert!(matches!(
            AnalysisRun::for_point(point, RangeSpec::from_minutes(&[]), vec![Profile::DrivingCar]),
            Err(AnalysisError::NoThresholds)
        ));
    }

    #[test]
    fn failures_are_classified() {
        use isochrone_map_ors::ServiceError;

        let point = SamplePoint::new(0.0, 0.0);
        let exhausted = PointFailure::new(
            Profile::DrivingCar,
            3,
            point,
            &RetryError::ExhaustedRetries { attempts: 3 },
        );
        assert_eq!(exhausted.kind, FailureKind::ExhaustedRetries);
        assert!(exhausted.to_string().starts_with("Failed for point 3"));

        let unauthorized = PointFailure::new(
            Profile::DrivingCar,
            0,
            point,
            &RetryError::Request(ServiceError::Unauthorized {
                status: 403,
                message: "denied".to_string(),
            }),
        );
        assert_eq!(unauthorized.kind, FailureKind::Unauthorized);

        let other = PointFailure::new(
            Profile::DrivingCar,
            0,
            point,
            &RetryError::Request(ServiceError::Parse {
                message: "bad body".to_string(),
            }),
        );
        assert_eq!(other.kind, FailureKind::Unclassified);
    }
}

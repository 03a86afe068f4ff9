//! Request dispatch.
//!
//! Profiles are processed one at a time in configured order, and within
//! a profile every sample point is requested in boundary order. Each point
//! gets one batched request carrying every threshold. A failed point is
//! recorded and skipped; it never aborts its profile or the run. After
//! every point, successful or not, the dispatcher pauses for the pacing
//! delay so the upstream request-rate ceiling is not hit continuously.

use std::sync::Arc;
use std::time::Duration;

use isochrone_map_analysis_models::{
    AreaSummary, IsochroneRequest, Profile, RangeSpec, RenderRecord, SamplePoint,
};
use isochrone_map_ors::{IsochroneService, ServiceConfig};

use crate::aggregate::ProfileAggregator;
use crate::progress::{ProgressCallback, null_progress};
use crate::retry::{self, RetryPolicy};
use crate::run::{AnalysisRun, FailureKind, PointFailure};

/// Pause after every point request.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(2500);

/// Everything one profile produced.
pub(crate) struct ProfileOutcome {
    pub(crate) summary: AreaSummary,
    pub(crate) records: Vec<RenderRecord>,
    pub(crate) failures: Vec<PointFailure>,
    pub(crate) requests: u64,
}

/// Issues isochrone requests for every (profile, sample point) pair of a
/// run and folds the results into it.
pub struct Dispatcher<'a> {
    service: &'a dyn IsochroneService,
    retry: RetryPolicy,
    request_delay: Duration,
    progress: Arc<dyn ProgressCallback>,
}

impl<'a> Dispatcher<'a> {
    /// Creates a dispatcher with the default retry policy and pacing.
    #[must_use]
    pub fn new(service: &'a dyn IsochroneService) -> Self {
        Self {
            service,
            retry: RetryPolicy::default(),
            request_delay: DEFAULT_REQUEST_DELAY,
            progress: null_progress(),
        }
    }

    /// Creates a dispatcher using the retry and pacing settings of
    /// `config`.
    #[must_use]
    pub fn from_config(service: &'a dyn IsochroneService, config: &ServiceConfig) -> Self {
        Self::new(service)
            .with_retry(RetryPolicy::from(&config.retry))
            .with_request_delay(config.pacing.request_delay())
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the pause inserted after every point request.
    #[must_use]
    pub const fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Reports per-request progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Requests isochrones for every profile and sample point of `run`,
    /// recording totals, render records, and skipped points on it.
    pub async fn dispatch(&self, run: &mut AnalysisRun) {
        self.progress.start(run.planned_requests());

        let profiles = run.profiles().to_vec();
        let fill_opacity = run.input().fill_opacity();

        for profile in profiles {
            let outcome = self
                .dispatch_profile(profile, run.sample_points(), run.range(), fill_opacity)
                .await;
            log::info!(
                "{profile}: {} feature(s), {} km² total, {} failed point(s)",
                outcome.summary.feature_count,
                outcome.summary.total_area_km2(),
                outcome.failures.len()
            );
            run.record_profile(outcome);
        }

        self.progress
            .finish(run.requests_issued(), run.failures().len());
    }

    async fn dispatch_profile(
        &self,
        profile: Profile,
        points: &[SamplePoint],
        range: &RangeSpec,
        fill_opacity: f64,
    ) -> ProfileOutcome {
        log::info!(
            "Fetching isochrones for {profile} at {} point(s)",
            points.len()
        );
        self.progress.profile_started(profile, points.len());

        let mut aggregator = ProfileAggregator::new(profile, range, fill_opacity);
        let mut failures = Vec::new();
        let mut requests = 0;

        for (idx, &point) in points.iter().enumerate() {
            let request = IsochroneRequest::new(point, profile, range);
            let request = &request;
            let service = self.service;

            let result = retry::execute(&self.retry, move || service.isochrones(request)).await;
            let skipped = match result {
                Ok(features) => {
                    aggregator.fold(features);
                    false
                }
                Err(e) => {
                    let failure = PointFailure::new(profile, idx, point, &e);
                    log::error!("{failure}");
                    if failure.kind == FailureKind::Unauthorized {
                        log::error!("The isochrone service rejected the API key");
                    }
                    failures.push(failure);
                    true
                }
            };

            requests += 1;
            self.progress.request_finished(skipped);
            tokio::time::sleep(self.request_delay).await;
        }

        let (summary, records) = aggregator.finish();
        ProfileOutcome {
            summary,
            records,
            failures,
            requests,
        }
    }
}

//! Request progress for analysis runs.
//!
//! The dispatcher reports the run as a sequence of events: how many point
//! requests it will issue, each profile it starts, and the outcome of
//! every request. Renderers (`indicatif` bars in the CLI) decide how to
//! show them; tests record them.

use std::sync::Arc;

use isochrone_map_analysis_models::Profile;

/// Receives dispatch events from a [`crate::Dispatcher`].
pub trait ProgressCallback: Send + Sync {
    /// The run will issue `total_requests` point requests.
    fn start(&self, total_requests: u64);

    /// Requests for `profile` at `points` sample points are about to begin.
    fn profile_started(&self, profile: Profile, points: usize);

    /// One point request completed. `skipped` is set when it failed and
    /// contributed nothing to the totals.
    fn request_finished(&self, skipped: bool);

    /// Every profile has been processed.
    fn finish(&self, requests: u64, skipped: usize);
}

/// Ignores every event.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn start(&self, _total_requests: u64) {}
    fn profile_started(&self, _profile: Profile, _points: usize) {}
    fn request_finished(&self, _skipped: bool) {}
    fn finish(&self, _requests: u64, _skipped: usize) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

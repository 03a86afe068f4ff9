#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the isochrone map toolchain.
//!
//! [`RequestProgress`] renders dispatch events as an `indicatif` bar: the
//! profile being fetched, requests done out of the run total, and a
//! running count of skipped points. [`init_logger`] sets up
//! `indicatif-log-bridge` so that `log::info!` and friends are suspended
//! while the bar redraws.

use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use isochrone_map_analysis::progress::ProgressCallback;
use isochrone_map_analysis_models::Profile;

pub use indicatif::MultiProgress;

/// An `indicatif` bar tracking isochrone requests.
pub struct RequestProgress {
    bar: ProgressBar,
    /// Applied once the request total is known.
    bar_style: ProgressStyle,
    profile: Mutex<String>,
    skipped: AtomicUsize,
}

impl RequestProgress {
    /// Adds a request bar to `multi`. It spins until the dispatcher reports
    /// the request total, then shows position, percentage, and ETA.
    #[must_use]
    pub fn new(multi: &MultiProgress) -> Arc<Self> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("Preparing requests");

        let bar_style = ProgressStyle::with_template(
            "  {msg} {wide_bar:.cyan/dim} {pos}/{len} {percent}% [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Arc::new(Self {
            bar,
            bar_style,
            profile: Mutex::new(String::new()),
            skipped: AtomicUsize::new(0),
        })
    }

    /// Points skipped so far.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::Relaxed)
    }

    fn refresh_message(&self) {
        let profile = self.profile.lock().unwrap_or_else(PoisonError::into_inner);
        match self.skipped() {
            0 => self.bar.set_message(profile.clone()),
            n => self.bar.set_message(format!("{profile}, {n} skipped")),
        }
    }
}

impl ProgressCallback for RequestProgress {
    fn start(&self, total_requests: u64) {
        self.bar.set_length(total_requests);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
    }

    fn profile_started(&self, profile: Profile, points: usize) {
        *self.profile.lock().unwrap_or_else(PoisonError::into_inner) =
            format!("{profile} ({points} point(s))");
        self.refresh_message();
    }

    fn request_finished(&self, skipped: bool) {
        if skipped {
            self.skipped.fetch_add(1, Ordering::Relaxed);
            self.refresh_message();
        }
        self.bar.inc(1);
    }

    fn finish(&self, requests: u64, skipped: usize) {
        self.bar.finish_with_message(format!(
            "{requests} request(s) issued, {skipped} skipped"
        ));
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// log lines are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Already set when called twice

    log::set_max_level(level);

    multi
}

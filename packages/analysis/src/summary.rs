//! Per-profile area report.

use std::fmt;

use isochrone_map_analysis_models::Profile;
use serde::Serialize;

use crate::run::AnalysisRun;

/// Total reachable area for one profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileArea {
    /// Profile the total belongs to.
    pub profile: Profile,
    /// Sum in square kilometers, rounded to two decimals.
    pub total_area_km2: f64,
    /// Unrounded sum in square meters.
    pub total_area_m2: f64,
    /// Isochrones that contributed to the sum.
    pub feature_count: u64,
}

impl fmt::Display for ProfileArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- {}: {:.2} km²", self.profile, self.total_area_km2)
    }
}

/// Area totals for every profile of a run, in configured order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaReport {
    /// One entry per configured profile.
    pub entries: Vec<ProfileArea>,
}

impl AreaReport {
    /// The entry for `profile`, if it was part of the run.
    #[must_use]
    pub fn get(&self, profile: Profile) -> Option<&ProfileArea> {
        self.entries.iter().find(|entry| entry.profile == profile)
    }
}

impl fmt::Display for AreaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total reachable area by profile:")?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Builds the report for a dispatched run.
///
/// Summaries are recorded in configured profile order, so the `n`th
/// profile owns the `n`th summary even when a profile is listed twice. A
/// profile that has not been dispatched yet appears with a zero total.
#[must_use]
pub fn report(run: &AnalysisRun) -> AreaReport {
    let entries = run
        .profiles()
        .iter()
        .enumerate()
        .map(|(idx, &profile)| {
            run.summaries()
                .get(idx)
                .filter(|summary| summary.profile == profile)
                .map_or(
                    ProfileArea {
                        profile,
                        total_area_km2: 0.0,
                        total_area_m2: 0.0,
                        feature_count: 0,
                    },
                    |summary| ProfileArea {
                        profile,
                        total_area_km2: summary.total_area_km2(),
                        total_area_m2: summary.total_area_m2,
                        feature_count: summary.feature_count,
                    },
                )
        })
        .collect();

    AreaReport { entries }
}

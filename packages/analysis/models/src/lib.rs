#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Travel profile, threshold, and isochrone result types.
//!
//! These types are shared by the boundary sampler, the isochrone service
//! client, and the aggregation engine. They carry no behavior beyond
//! small conversions (minutes to seconds, square meters to square
//! kilometers) so every crate agrees on units.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Square meters per square kilometer.
pub const SQ_METERS_PER_SQ_KM: f64 = 1_000_000.0;

/// Converts an area in square meters to square kilometers rounded to two
/// decimal places. Halves round to the even neighbor (125,000 m² is
/// 0.12 km²).
#[must_use]
pub fn square_km(area_m2: f64) -> f64 {
    (area_m2 / SQ_METERS_PER_SQ_KM * 100.0).round_ties_even() / 100.0
}

/// A travel mode understood by the isochrone service.
///
/// The string form (`driving-car`, `foot-walking`, ...) is the identifier
/// sent on the wire and shown in summaries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Profile {
    /// Car routing with live traffic enabled.
    DrivingTraffic,
    /// Car routing.
    DrivingCar,
    /// Regular bicycle.
    CyclingRegular,
    /// Pedestrian.
    FootWalking,
    /// Heavy goods vehicle.
    DrivingHgv,
    /// Electric bicycle.
    CyclingElectric,
    /// Hiking trails.
    FootHiking,
    /// Wheelchair-accessible routing.
    Wheelchair,
}

impl Profile {
    /// Every profile, in menu order.
    pub const ALL: &[Self] = &[
        Self::DrivingTraffic,
        Self::DrivingCar,
        Self::CyclingRegular,
        Self::FootWalking,
        Self::DrivingHgv,
        Self::CyclingElectric,
        Self::FootHiking,
        Self::Wheelchair,
    ];

    /// Profiles pre-selected when the user does not choose any.
    pub const DEFAULT_SELECTION: &[Self] =
        &[Self::DrivingCar, Self::CyclingRegular, Self::FootWalking];

    /// Fill and stroke color used when rendering this profile's isochrones.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::DrivingTraffic => "#377eb8",
            Self::DrivingCar => "#1a9641",
            Self::CyclingRegular => "#fdae61",
            Self::FootWalking => "#2b83ba",
            Self::DrivingHgv => "#a6d96a",
            Self::CyclingElectric => "#d7191c",
            Self::FootHiking => "#984ea3",
            Self::Wheelchair => "#ff7f00",
        }
    }

    /// Whether requests for this profile must ask for live traffic.
    #[must_use]
    pub const fn is_traffic_aware(self) -> bool {
        matches!(self, Self::DrivingTraffic)
    }
}

/// Unit shared by every threshold of a single run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RangeKind {
    /// Travel time; values are seconds.
    Time,
    /// Travel distance; values are meters.
    Distance,
}

impl RangeKind {
    /// Threshold choices offered to the user, in the unit the user picks
    /// them in (minutes for time, meters for distance).
    #[must_use]
    pub const fn menu_options(self) -> &'static [u32] {
        match self {
            Self::Time => &[5, 10, 15, 20, 25, 30],
            Self::Distance => &[500, 1000, 1500, 2000, 2500, 3000],
        }
    }

    /// Thresholds pre-selected in the menu.
    #[must_use]
    pub const fn menu_defaults(self) -> &'static [u32] {
        match self {
            Self::Time => &[5, 10, 15],
            Self::Distance => &[1000, 2000],
        }
    }

    /// Unit the user enters thresholds in.
    #[must_use]
    pub const fn input_unit(self) -> &'static str {
        match self {
            Self::Time => "minutes",
            Self::Distance => "meters",
        }
    }
}

/// An ordered set of thresholds sharing one unit.
///
/// Time thresholds are stored in seconds and distance thresholds in
/// meters, matching what the isochrone service expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    /// Whether `values` are seconds or meters.
    pub kind: RangeKind,
    /// Threshold values in wire units.
    pub values: Vec<u32>,
}

impl RangeSpec {
    /// Builds a time range from thresholds given in minutes. Values too
    /// large to express in seconds saturate at `u32::MAX`.
    #[must_use]
    pub fn from_minutes(minutes: &[u32]) -> Self {
        Self {
            kind: RangeKind::Time,
            values: minutes.iter().map(|m| m.saturating_mul(60)).collect(),
        }
    }

    /// Builds a distance range from thresholds given in meters.
    #[must_use]
    pub fn from_meters(meters: &[u32]) -> Self {
        Self {
            kind: RangeKind::Distance,
            values: meters.to_vec(),
        }
    }

    /// Builds a range from values in the user-facing unit of `kind`.
    #[must_use]
    pub fn from_input(kind: RangeKind, values: &[u32]) -> Self {
        match kind {
            RangeKind::Time => Self::from_minutes(values),
            RangeKind::Distance => Self::from_meters(values),
        }
    }

    /// Returns `true` if no thresholds were selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Human-readable form of a threshold value reported by the service.
    ///
    /// Time values are truncated to whole minutes.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn threshold_label(&self, value: f64) -> String {
        match self.kind {
            RangeKind::Time => format!("{} minutes", (value as u64) / 60),
            RangeKind::Distance => format!("{} m", value as u64),
        }
    }
}

/// A (longitude, latitude) coordinate at which an isochrone is computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Longitude (WGS84).
    pub lon: f64,
    /// Latitude (WGS84).
    pub lat: f64,
}

impl SamplePoint {
    /// Creates a sample point.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl std::fmt::Display for SamplePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lon, self.lat)
    }
}

/// One batched isochrone request: every threshold for one point and one
/// profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsochroneRequest<'a> {
    /// Where the isochrones are centered.
    pub point: SamplePoint,
    /// Travel mode.
    pub profile: Profile,
    /// Every threshold requested in this call.
    pub range: &'a RangeSpec,
    /// Ask the service to account for live traffic.
    pub traffic: bool,
}

impl<'a> IsochroneRequest<'a> {
    /// Builds a request, enabling traffic only for traffic-aware profiles.
    #[must_use]
    pub const fn new(point: SamplePoint, profile: Profile, range: &'a RangeSpec) -> Self {
        Self {
            point,
            profile,
            range,
            traffic: profile.is_traffic_aware(),
        }
    }
}

/// One polygon returned by the service for a single threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct IsochroneFeature {
    /// Threshold in wire units (seconds or meters).
    pub value: f64,
    /// Reported area in square meters, if the service included one.
    pub area: Option<f64>,
    /// Polygon geometry.
    pub geometry: geojson::Geometry,
}

impl IsochroneFeature {
    /// Reported area in square meters, treating a missing area as zero.
    #[must_use]
    pub fn area_m2(&self) -> f64 {
        self.area.unwrap_or(0.0)
    }
}

/// Running total of isochrone area for one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSummary {
    /// Profile the total belongs to.
    pub profile: Profile,
    /// Sum of every returned feature's area, in square meters.
    pub total_area_m2: f64,
    /// Number of features folded into the total.
    pub feature_count: u64,
}

impl AreaSummary {
    /// Creates an empty accumulator.
    #[must_use]
    pub const fn new(profile: Profile) -> Self {
        Self {
            profile,
            total_area_m2: 0.0,
            feature_count: 0,
        }
    }

    /// Adds one feature's area to the total.
    pub fn add(&mut self, area_m2: f64) {
        self.total_area_m2 += area_m2;
        self.feature_count += 1;
    }

    /// Total area in square kilometers rounded to two decimals.
    #[must_use]
    pub fn total_area_km2(&self) -> f64 {
        square_km(self.total_area_m2)
    }
}

/// Fill and stroke styling for a rendered layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    /// Fill color (`#rrggbb`).
    pub fill_color: String,
    /// Stroke color (`#rrggbb`).
    pub stroke_color: String,
    /// Stroke width in pixels.
    pub weight: f64,
    /// Fill opacity between 0 and 1.
    pub fill_opacity: f64,
}

impl LayerStyle {
    /// Highlight style for the user-supplied boundary.
    #[must_use]
    pub fn boundary_highlight() -> Self {
        Self {
            fill_color: "#ffc0cb".to_string(),
            stroke_color: "#ff69b4".to_string(),
            weight: 2.0,
            fill_opacity: 1.0,
        }
    }

    /// Style for an isochrone of `profile`.
    #[must_use]
    pub fn isochrone(profile: Profile, fill_opacity: f64) -> Self {
        Self {
            fill_color: profile.color().to_string(),
            stroke_color: profile.color().to_string(),
            weight: 1.0,
            fill_opacity,
        }
    }
}

/// A geometry paired with everything a map renderer needs to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRecord {
    /// Profile the isochrone was computed for.
    pub profile: Profile,
    /// Layer name (e.g. `"10 minutes - driving-car"`).
    pub name: String,
    /// Hover text including the area in square kilometers.
    pub tooltip: String,
    /// Fill and stroke styling.
    pub style: LayerStyle,
    /// Geometry to draw.
    pub geometry: geojson::Geometry,
}

//! Per-profile area aggregation.
//!
//! Each returned feature adds its reported area to the profile's running
//! total and yields a [`RenderRecord`] styled with the profile color.
//! Overlapping isochrones from neighboring sample points are summed as-is;
//! no union or intersection is computed.

use isochrone_map_analysis_models::{
    AreaSummary, IsochroneFeature, LayerStyle, Profile, RangeSpec, RenderRecord, square_km,
};

/// Running total and render records for one profile.
#[derive(Debug)]
pub struct ProfileAggregator<'a> {
    range: &'a RangeSpec,
    fill_opacity: f64,
    summary: AreaSummary,
    records: Vec<RenderRecord>,
}

impl<'a> ProfileAggregator<'a> {
    /// Starts an empty accumulator for `profile`.
    #[must_use]
    pub const fn new(profile: Profile, range: &'a RangeSpec, fill_opacity: f64) -> Self {
        Self {
            range,
            fill_opacity,
            summary: AreaSummary::new(profile),
            records: Vec::new(),
        }
    }

    /// Folds one point's feature collection into the total.
    pub fn fold(&mut self, features: Vec<IsochroneFeature>) {
        let profile = self.summary.profile;

        for feature in features {
            let area_m2 = feature.area_m2();
            self.summary.add(area_m2);

            let label = format!("{} - {profile}", self.range.threshold_label(feature.value));
            self.records.push(RenderRecord {
                profile,
                tooltip: format!("{label} ({} km²)", square_km(area_m2)),
                name: label,
                style: LayerStyle::isochrone(profile, self.fill_opacity),
                geometry: feature.geometry,
            });
        }
    }

    /// The running total so far.
    #[must_use]
    pub const fn summary(&self) -> &AreaSummary {
        &self.summary
    }

    /// Consumes the aggregator, returning the final total and its records.
    #[must_use]
    pub fn finish(self) -> (AreaSummary, Vec<RenderRecord>) {
        (self.summary, self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(value: f64, area: Option<f64>) -> IsochroneFeature {
        IsochroneFeature {
            value,
            area,
            geometry: geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 0.0],
            ]])),
        }
    }

    #[test]
    fn sums_areas_across_folds_without_deduplication() {
        let range = RangeSpec::from_minutes(&[5, 10]);
        let mut agg = ProfileAggregator::new(Profile::DrivingCar, &range, 0.2);

        // Two identical points: the overlap is counted twice.
        agg.fold(vec![feature(300.0, Some(1_000_000.0)), feature(600.0, Some(2_000_000.0))]);
        agg.fold(vec![feature(300.0, Some(1_000_000.0)), feature(600.0, Some(2_000_000.0))]);

        let (summary, records) = agg.finish();
        assert!((summary.total_area_m2 - 6_000_000.0).abs() < f64::EPSILON);
        assert!((summary.total_area_km2() - 6.0).abs() < f64::EPSILON);
        assert_eq!(summary.feature_count, 4);
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn missing_area_adds_zero() {
        let range = RangeSpec::from_minutes(&[5]);
        let mut agg = ProfileAggregator::new(Profile::FootWalking, &range, 0.2);
        agg.fold(vec![feature(300.0, None), feature(300.0, Some(500_000.0))]);
        assert!((agg.summary().total_area_m2 - 500_000.0).abs() < f64::EPSILON);
        assert_eq!(agg.summary().feature_count, 2);
    }

    #[test]
    fn records_carry_profile_style_and_labels() {
        let range = RangeSpec::from_minutes(&[10]);
        let mut agg = ProfileAggregator::new(Profile::CyclingRegular, &range, 0.4);
        agg.fold(vec![feature(600.0, Some(2_500_000.0))]);

        let (_, records) = agg.finish();
        let record = &records[0];
        assert_eq!(record.profile, Profile::CyclingRegular);
        assert_eq!(record.name, "10 minutes - cycling-regular");
        assert_eq!(record.tooltip, "10 minutes - cycling-regular (2.5 km²)");
        assert_eq!(record.style.fill_color, "#fdae61");
        assert_eq!(record.style.stroke_color, "#fdae61");
        assert!((record.style.fill_opacity - 0.4).abs() < f64::EPSILON);
        assert!((record.style.weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_thresholds_are_labelled_in_meters() {
        let range = RangeSpec::from_meters(&[1500]);
        let mut agg = ProfileAggregator::new(Profile::Wheelchair, &range, 0.2);
        agg.fold(vec![feature(1500.0, Some(1_234_567.0))]);

        let (_, records) = agg.finish();
        assert_eq!(records[0].tooltip, "1500 m - wheelchair (1.23 km²)");
    }

    #[test]
    fn each_record_keeps_its_own_style() {
        let range = RangeSpec::from_minutes(&[5]);
        let mut car = ProfileAggregator::new(Profile::DrivingCar, &range, 0.2);
        let mut hgv = ProfileAggregator::new(Profile::DrivingHgv, &range, 0.2);
        car.fold(vec![feature(300.0, Some(1.0))]);
        hgv.fold(vec![feature(300.0, Some(1.0))]);
        car.fold(vec![feature(300.0, Some(1.0))]);

        let (_, car_records) = car.finish();
        assert!(car_records.iter().all(|r| r.style.fill_color == "#1a9641"));
    }
}

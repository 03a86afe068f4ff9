//! Render layers as a `GeoJSON` feature collection.
//!
//! Every feature carries simplestyle properties (`fill`, `stroke`,
//! `stroke-width`, `fill-opacity`) so the file renders styled in common
//! map viewers. Draw order is the boundary highlight, then isochrones in
//! dispatch order, then the center marker.

use std::path::Path;

use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use isochrone_map_analysis_models::{LayerStyle, RenderRecord, SamplePoint};

use crate::AnalysisError;
use crate::run::{AnalysisInput, AnalysisRun};

/// Initial zoom level hint stored on the collection.
pub const DEFAULT_ZOOM_START: u8 = 13;

/// Builds the layer collection for a dispatched run.
#[must_use]
pub fn render_layers(run: &AnalysisRun) -> FeatureCollection {
    let mut features = Vec::with_capacity(run.records().len() + 2);

    let (bbox, marker_name) = match run.input() {
        AnalysisInput::Region(region) => {
            features.push(styled_feature(
                region.to_geojson(),
                "Boundary",
                "Boundary",
                &LayerStyle::boundary_highlight(),
                "boundary",
            ));
            (Some(region.bbox().to_vec()), "Region centroid")
        }
        AnalysisInput::Point(_) => (None, "Input point"),
    };

    features.extend(run.records().iter().map(isochrone_feature));
    let center = run.input().center();
    features.push(marker(center, marker_name));

    let mut foreign_members = JsonObject::new();
    foreign_members.insert(
        "center".to_string(),
        serde_json::json!([center.lat, center.lon]),
    );
    foreign_members.insert(
        "zoom_start".to_string(),
        JsonValue::from(DEFAULT_ZOOM_START),
    );

    FeatureCollection {
        bbox,
        features,
        foreign_members: Some(foreign_members),
    }
}

/// Writes the layer collection for `run` to `path` as pretty-printed
/// `GeoJSON`.
///
/// # Errors
///
/// Returns [`AnalysisError`] if serialization or the file write fails.
pub fn write_layers(run: &AnalysisRun, path: &Path) -> Result<(), AnalysisError> {
    let collection = render_layers(run);
    let contents = serde_json::to_string_pretty(&collection)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("geojson.tmp");
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)?;

    log::info!(
        "Wrote {} layer(s) to {}",
        collection.features.len(),
        path.display()
    );
    Ok(())
}

fn isochrone_feature(record: &RenderRecord) -> Feature {
    let mut feature = styled_feature(
        record.geometry.clone(),
        &record.name,
        &record.tooltip,
        &record.style,
        "isochrone",
    );
    if let Some(properties) = feature.properties.as_mut() {
        properties.insert(
            "profile".to_string(),
            JsonValue::from(record.profile.as_ref()),
        );
    }
    feature
}

fn styled_feature(
    geometry: geojson::Geometry,
    name: &str,
    tooltip: &str,
    style: &LayerStyle,
    layer: &str,
) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), JsonValue::from(name));
    properties.insert("tooltip".to_string(), JsonValue::from(tooltip));
    properties.insert("fill".to_string(), JsonValue::from(style.fill_color.as_str()));
    properties.insert(
        "stroke".to_string(),
        JsonValue::from(style.stroke_color.as_str()),
    );
    properties.insert("stroke-width".to_string(), JsonValue::from(style.weight));
    properties.insert(
        "fill-opacity".to_string(),
        JsonValue::from(style.fill_opacity),
    );
    properties.insert("layer".to_string(), JsonValue::from(layer));

    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn marker(point: SamplePoint, name: &str) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), JsonValue::from(name));
    properties.insert("tooltip".to_string(), JsonValue::from(name));
    properties.insert("layer".to_string(), JsonValue::from("marker"));

    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
            point.lon, point.lat,
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

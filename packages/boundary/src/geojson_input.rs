//! `GeoJSON` boundary reader.
//!
//! Accepts a bare geometry, a feature, or a feature collection and keeps
//! every `Polygon` and `MultiPolygon` it finds, flattening multi-polygons
//! into their parts in document order.

use geo::{Geometry, MultiPolygon, Polygon};
use geojson::GeoJson;

use crate::BoundaryError;

/// Parses every polygon in a `GeoJSON` document.
///
/// # Errors
///
/// Returns [`BoundaryError::GeoJson`] if the document is not valid
/// `GeoJSON` or a geometry cannot be converted.
pub fn parse_geojson(content: &str) -> Result<MultiPolygon<f64>, BoundaryError> {
    let geojson: GeoJson = content.parse()?;
    let collection: geo::GeometryCollection<f64> = geojson::quick_collection(&geojson)?;

    let mut polygons = Vec::new();
    collect_polygons(collection.0, &mut polygons);

    log::debug!("Parsed {} polygon(s) from GeoJSON", polygons.len());

    Ok(MultiPolygon(polygons))
}

fn collect_polygons(geometries: Vec<Geometry<f64>>, out: &mut Vec<Polygon<f64>>) {
    for geometry in geometries {
        match geometry {
            Geometry::Polygon(polygon) => out.push(polygon),
            Geometry::MultiPolygon(mp) => out.extend(mp.0),
            Geometry::GeometryCollection(gc) => collect_polygons(gc.0, out),
            _ => {}
        }
    }
}

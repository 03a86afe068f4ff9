#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region boundary loading and boundary point sampling.
//!
//! A [`Region`] is the polygon (or multi-polygon) a user uploads, plus its
//! centroid and bounding box for map framing. Regions are read from KML
//! documents ([`kml`]) or `GeoJSON` files ([`geojson_input`]), and
//! [`sampling::sample_boundary`] turns the exterior rings into the
//! ordered sample points isochrones are requested at.
//!
//! [`parse_coordinate`] handles the single-point variant where the user
//! types a `lon,lat` pair instead of uploading a file.

pub mod geojson_input;
pub mod kml;
pub mod sampling;

use std::path::Path;

use geo::{BoundingRect as _, Centroid as _, MultiPolygon};
use isochrone_map_analysis_models::SamplePoint;
use thiserror::Error;

pub use sampling::{DEFAULT_SAMPLING_INTERVAL, SamplingInterval, sample_boundary};

/// Errors from loading a region or parsing a coordinate.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// The boundary file contained no polygon vertices.
    #[error("Boundary file is empty or contains no polygons")]
    EmptyRegion,

    /// Coordinate text did not parse as two numbers.
    #[error("Malformed coordinate '{input}': {message}")]
    MalformedInput {
        /// The text the user entered.
        input: String,
        /// What was wrong with it.
        message: String,
    },

    /// Sampling interval outside the accepted bounds.
    #[error("Sampling interval {value} is outside {min}..={max}")]
    InvalidInterval {
        /// The rejected interval.
        value: usize,
        /// Smallest accepted interval.
        min: usize,
        /// Largest accepted interval.
        max: usize,
    },

    /// The file extension and content match no supported format.
    #[error("Unsupported boundary file format: {path}")]
    UnsupportedFormat {
        /// Path of the rejected file.
        path: String,
    },

    /// KML coordinates could not be read.
    #[error("KML parse error: {message}")]
    Kml {
        /// Description of the parsing failure.
        message: String,
    },

    /// File read failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML tokenization failed.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

/// A user-supplied boundary with its derived centroid and bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    geometry: MultiPolygon<f64>,
    centroid: SamplePoint,
    bbox: [f64; 4],
}

impl Region {
    /// Wraps a parsed geometry, deriving its centroid and bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::EmptyRegion`] if no polygon part has any
    /// exterior vertex.
    pub fn new(geometry: MultiPolygon<f64>) -> Result<Self, BoundaryError> {
        let Some(first) = geometry
            .0
            .iter()
            .find_map(|polygon| polygon.exterior().0.first().copied())
        else {
            return Err(BoundaryError::EmptyRegion);
        };

        // Zero-area parts have no areal centroid; fall back to a vertex.
        let centroid = geometry.centroid().map_or(SamplePoint::new(first.x, first.y), |p| {
            SamplePoint::new(p.x(), p.y())
        });

        let bbox = geometry.bounding_rect().map_or(
            [first.x, first.y, first.x, first.y],
            |rect| [rect.min().x, rect.min().y, rect.max().x, rect.max().y],
        );

        Ok(Self {
            geometry,
            centroid,
            bbox,
        })
    }

    /// The boundary polygons, in document order.
    #[must_use]
    pub const fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// Centroid of the union of all parts. Used for map framing only.
    #[must_use]
    pub const fn centroid(&self) -> SamplePoint {
        self.centroid
    }

    /// Bounding box as `[min_lon, min_lat, max_lon, max_lat]`.
    #[must_use]
    pub const fn bbox(&self) -> [f64; 4] {
        self.bbox
    }

    /// Number of polygon parts.
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.geometry.0.len()
    }

    /// Total exterior-ring vertex count across all parts.
    #[must_use]
    pub fn exterior_vertex_count(&self) -> usize {
        self.geometry
            .0
            .iter()
            .map(|polygon| polygon.exterior().0.len())
            .sum()
    }

    /// The boundary as a `GeoJSON` geometry for rendering.
    #[must_use]
    pub fn to_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::from(&self.geometry))
    }
}

/// Loads a region from a KML or `GeoJSON` file.
///
/// `.geojson` and `.json` files are read as `GeoJSON` and `.kml` files as
/// KML. Any other file is read as KML when its content looks like XML. A
/// leading byte order mark is ignored.
///
/// # Errors
///
/// Returns [`BoundaryError`] if the file cannot be read or parsed, or if
/// it contains no polygons.
pub fn load_region(path: &Path) -> Result<Region, BoundaryError> {
    let raw = std::fs::read_to_string(path)?;
    let content = raw.strip_prefix('\u{feff}').unwrap_or(&raw);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let geometry = match extension.as_deref() {
        Some("geojson" | "json") => geojson_input::parse_geojson(content)?,
        Some("kml") => kml::parse_kml(content)?,
        _ if content.trim_start().starts_with('<') => kml::parse_kml(content)?,
        _ => {
            return Err(BoundaryError::UnsupportedFormat {
                path: path.display().to_string(),
            });
        }
    };

    let region = Region::new(geometry)?;
    log::info!(
        "Loaded boundary from {}: {} part(s), {} exterior vertices",
        path.display(),
        region.part_count(),
        region.exterior_vertex_count()
    );
    Ok(region)
}

/// Parses a `"longitude,latitude"` pair.
///
/// # Errors
///
/// Returns [`BoundaryError::MalformedInput`] unless the text is exactly
/// two comma-separated finite numbers.
pub fn parse_coordinate(input: &str) -> Result<SamplePoint, BoundaryError> {
    let malformed = |message: &str| BoundaryError::MalformedInput {
        input: input.to_string(),
        message: message.to_string(),
    };

    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    let [lon, lat] = parts.as_slice() else {
        return Err(malformed("expected exactly two values as lon,lat"));
    };

    let lon: f64 = lon
        .parse()
        .map_err(|_| malformed("longitude is not a number"))?;
    let lat: f64 = lat
        .parse()
        .map_err(|_| malformed("latitude is not a number"))?;

    if !lon.is_finite() || !lat.is_finite() {
        return Err(malformed("coordinates must be finite"));
    }

    Ok(SamplePoint::new(lon, lat))
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Polygon};

    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (x0, y0),
                (x0 + size, y0),
                (x0 + size, y0 + size),
                (x0, y0 + size),
                (x0, y0),
            ]),
            vec![],
        )
    }

    #[test]
    fn parses_single_point_input() {
        let point = parse_coordinate("106.8,-6.2").unwrap();
        assert!((point.lon - 106.8).abs() < 1e-9);
        assert!((point.lat - -6.2).abs() < 1e-9);
    }

    #[test]
    fn tolerates_whitespace_around_values() {
        let point = parse_coordinate(" 106.8 , -6.2 ").unwrap();
        assert!((point.lon - 106.8).abs() < 1e-9);
    }

    #[test]
    fn rejects_malformed_coordinates() {
        for input in ["", "106.8", "106.8,-6.2,3", "abc,-6.2", "106.8,xyz", "NaN,1"] {
            assert!(
                matches!(
                    parse_coordinate(input),
                    Err(BoundaryError::MalformedInput { .. })
                ),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn empty_geometry_is_rejected() {
        assert!(matches!(
            Region::new(MultiPolygon(vec![])),
            Err(BoundaryError::EmptyRegion)
        ));
    }

    #[test]
    fn region_derives_centroid_and_bbox() {
        let region = Region::new(MultiPolygon(vec![square(0.0, 0.0, 2.0)])).unwrap();
        let centroid = region.centroid();
        assert!((centroid.lon - 1.0).abs() < 1e-9);
        assert!((centroid.lat - 1.0).abs() < 1e-9);
        assert_eq!(region.bbox(), [0.0, 0.0, 2.0, 2.0]);
        assert_eq!(region.exterior_vertex_count(), 5);
    }

    #[test]
    fn centroid_spans_every_part() {
        let region = Region::new(MultiPolygon(vec![
            square(0.0, 0.0, 1.0),
            square(10.0, 0.0, 1.0),
        ]))
        .unwrap();
        assert!((region.centroid().lon - 5.5).abs() < 1e-9);
        assert_eq!(region.part_count(), 2);
    }

    #[test]
    fn load_region_rejects_unknown_format() {
        let dir = std::env::temp_dir().join("isochrone_map_boundary_unknown_format");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("region.txt");
        std::fs::write(&path, "not a boundary").unwrap();
        assert!(matches!(
            load_region(&path),
            Err(BoundaryError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn load_region_reads_kml_files() {
        let dir = std::env::temp_dir().join("isochrone_map_boundary_kml_file");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("region.kml");
        std::fs::write(
            &path,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2"><Document><Placemark><Polygon>
<outerBoundaryIs><LinearRing><coordinates>
0,0,0 1,0,0 1,1,0 0,1,0 0,0,0
</coordinates></LinearRing></outerBoundaryIs>
</Polygon></Placemark></Document></kml>"#,
        )
        .unwrap();
        let region = load_region(&path).unwrap();
        assert_eq!(region.exterior_vertex_count(), 5);
    }

    #[test]
    fn load_region_skips_byte_order_mark() {
        let dir = std::env::temp_dir().join("isochrone_map_boundary_bom");
        std::fs::create_dir_all(&dir).unwrap();

        let kml_path = dir.join("region.kml");
        std::fs::write(
            &kml_path,
            "\u{feff}<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <kml xmlns=\"http://www.opengis.net/kml/2.2\"><Placemark><Polygon>\
             <outerBoundaryIs><LinearRing><coordinates>0,0 1,0 1,1 0,1 0,0</coordinates>\
             </LinearRing></outerBoundaryIs></Polygon></Placemark></kml>",
        )
        .unwrap();
        assert_eq!(load_region(&kml_path).unwrap().exterior_vertex_count(), 5);

        let geojson_path = dir.join("region.geojson");
        std::fs::write(
            &geojson_path,
            "\u{feff}{\"type\":\"Polygon\",\"coordinates\":[[[0,0],[1,0],[1,1],[0,0]]]}",
        )
        .unwrap();
        assert_eq!(load_region(&geojson_path).unwrap().exterior_vertex_count(), 4);
    }
}

//! KML boundary reader.
//!
//! Walks the document with `quick_xml` and collects every `<Polygon>`
//! (including those nested in `<MultiGeometry>`) in document order.
//! Only polygon geometry is kept; placemark points and line strings are
//! skipped. Namespace prefixes (`kml:Polygon`) are ignored.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::BoundaryError;

/// Which ring of the current polygon a `<coordinates>` block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    None,
    Outer,
    Inner,
}

/// Parses every polygon in a KML document.
///
/// Returns an empty [`MultiPolygon`] when the document has no polygons;
/// [`crate::Region::new`] turns that into [`BoundaryError::EmptyRegion`].
///
/// # Errors
///
/// Returns [`BoundaryError`] if the XML is malformed or a coordinate
/// tuple is not numeric.
pub fn parse_kml(xml: &str) -> Result<MultiPolygon<f64>, BoundaryError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut polygons = Vec::new();
    let mut boundary = Boundary::None;
    let mut in_coordinates = false;
    let mut exterior: Option<LineString<f64>> = None;
    let mut interiors: Vec<LineString<f64>> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Polygon" => {
                    exterior = None;
                    interiors.clear();
                }
                b"outerBoundaryIs" => boundary = Boundary::Outer,
                b"innerBoundaryIs" => boundary = Boundary::Inner,
                b"coordinates" => in_coordinates = true,
                _ => {}
            },
            Event::Text(text) if in_coordinates => {
                let ring = parse_coordinates(&text.unescape()?)?;
                match boundary {
                    Boundary::Outer => exterior = Some(ring),
                    Boundary::Inner => interiors.push(ring),
                    Boundary::None => {}
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"coordinates" => in_coordinates = false,
                b"outerBoundaryIs" | b"innerBoundaryIs" => boundary = Boundary::None,
                b"Polygon" => {
                    if let Some(ring) = exterior.take() {
                        polygons.push(Polygon::new(ring, std::mem::take(&mut interiors)));
                    } else {
                        log::warn!("Skipping KML polygon without an outer boundary");
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    log::debug!("Parsed {} polygon(s) from KML", polygons.len());

    Ok(MultiPolygon(polygons))
}

/// Parses a KML `<coordinates>` body: whitespace-separated
/// `lon,lat[,alt]` tuples.
fn parse_coordinates(text: &str) -> Result<LineString<f64>, BoundaryError> {
    text.split_whitespace()
        .map(|tuple| {
            let mut parts = tuple.split(',');
            let lon = parts.next().and_then(|v| v.parse::<f64>().ok());
            let lat = parts.next().and_then(|v| v.parse::<f64>().ok());
            match (lon, lat) {
                (Some(x), Some(y)) => Ok(Coord { x, y }),
                _ => Err(BoundaryError::Kml {
                    message: format!("invalid coordinate tuple '{tuple}'"),
                }),
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

//! `OpenRouteService` v2 isochrone client.
//!
//! See <https://openrouteservice.org/dev/#/api-docs/v2/isochrones>

use isochrone_map_analysis_models::{IsochroneFeature, IsochroneRequest, RangeKind};
use serde::Serialize;

use crate::{IsochroneService, ServiceConfig, ServiceError};

/// HTTP client for the `OpenRouteService` isochrone endpoint.
pub struct OrsClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OrsClient {
    /// Creates a client authenticated with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: String, config: &ServiceConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, request: &IsochroneRequest<'_>) -> String {
        format!("{}/v2/isochrones/{}", self.base_url, request.profile)
    }
}

/// Isochrone request body.
#[derive(Debug, Serialize)]
struct IsochroneBody<'a> {
    locations: [[f64; 2]; 1],
    range: &'a [u32],
    range_type: RangeKind,
    attributes: [&'static str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<RequestOptions>,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    traffic: bool,
}

impl<'a> IsochroneBody<'a> {
    fn new(request: &IsochroneRequest<'a>) -> Self {
        Self {
            locations: [[request.point.lon, request.point.lat]],
            range: &request.range.values,
            range_type: request.range.kind,
            attributes: ["area"],
            options: request.traffic.then_some(RequestOptions { traffic: true }),
        }
    }
}

#[async_trait::async_trait]
impl IsochroneService for OrsClient {
    async fn isochrones(
        &self,
        request: &IsochroneRequest<'_>,
    ) -> Result<Vec<IsochroneFeature>, ServiceError> {
        let body = IsochroneBody::new(request);
        log::debug!(
            "POST {} at {} ({} threshold(s))",
            self.endpoint(request),
            request.point,
            body.range.len()
        );

        let resp = self
            .client
            .post(self.endpoint(request))
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .header(
                reqwest::header::ACCEPT,
                "application/geo+json, application/json",
            )
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ServiceError::RateLimited);
        }

        let text = resp.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ServiceError::Unauthorized {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        if !status.is_success() {
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        parse_features(&text)
    }
}

/// Parses a feature collection into isochrone features.
///
/// Each feature must carry a numeric `value` property and a geometry;
/// `area` is optional.
///
/// # Errors
///
/// Returns [`ServiceError::Parse`] if the body is not a feature
/// collection or a feature lacks its threshold or geometry.
pub fn parse_features(body: &str) -> Result<Vec<IsochroneFeature>, ServiceError> {
    let geojson: geojson::GeoJson = body.parse().map_err(|e| ServiceError::Parse {
        message: format!("invalid GeoJSON response: {e}"),
    })?;

    let geojson::GeoJson::FeatureCollection(collection) = geojson else {
        return Err(ServiceError::Parse {
            message: "response is not a FeatureCollection".to_string(),
        });
    };

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(idx, feature)| {
            let value = feature
                .property("value")
                .and_then(serde_json::Value::as_f64)
                .ok_or_else(|| ServiceError::Parse {
                    message: format!("feature {idx} has no numeric 'value' property"),
                })?;
            let area = feature.property("area").and_then(serde_json::Value::as_f64);
            let geometry = feature.geometry.ok_or_else(|| ServiceError::Parse {
                message: format!("feature {idx} has no geometry"),
            })?;

            Ok(IsochroneFeature {
                value,
                area,
                geometry,
            })
        })
        .collect()
}

/// Extracts a human-readable message from an error body.
///
/// Handles `{"error": {"message": ...}}`, `{"error": "..."}`, and
/// non-JSON bodies.
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    json["error"]["message"]
        .as_str()
        .or_else(|| json["error"].as_str())
        .or_else(|| json["message"].as_str())
        .map_or_else(|| body.trim().to_string(), String::from)
}

#[cfg(test)]
mod tests {
    use isochrone_map_analysis_models::{Profile, RangeSpec, SamplePoint};

    use super::*;

    #[test]
    fn body_batches_every_threshold() {
        let range = RangeSpec::from_minutes(&[5, 10, 15]);
        let request = IsochroneRequest::new(SamplePoint::new(106.8, -6.2), Profile::DrivingCar, &range);
        let json = serde_json::to_value(IsochroneBody::new(&request)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "locations": [[106.8, -6.2]],
                "range": [300, 600, 900],
                "range_type": "time",
                "attributes": ["area"],
            })
        );
    }

    #[test]
    fn body_enables_traffic_only_for_traffic_profile() {
        let range = RangeSpec::from_meters(&[1000]);
        let point = SamplePoint::new(0.0, 0.0);

        let traffic = IsochroneRequest::new(point, Profile::DrivingTraffic, &range);
        let json = serde_json::to_value(IsochroneBody::new(&traffic)).unwrap();
        assert_eq!(json["options"], serde_json::json!({ "traffic": true }));
        assert_eq!(json["range_type"], "distance");

        let car = IsochroneRequest::new(point, Profile::DrivingCar, &range);
        let json = serde_json::to_value(IsochroneBody::new(&car)).unwrap();
        assert!(json.get("options").is_none());
    }

    #[test]
    fn parses_isochrone_features() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"group_index": 0, "value": 300.0, "area": 2_500_000.0},
                    "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}
                },
                {
                    "type": "Feature",
                    "properties": {"group_index": 0, "value": 600.0},
                    "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,0]]]}
                }
            ]
        })
        .to_string();

        let features = parse_features(&body).unwrap();
        assert_eq!(features.len(), 2);
        assert!((features[0].value - 300.0).abs() < f64::EPSILON);
        assert_eq!(features[0].area, Some(2_500_000.0));
        assert_eq!(features[1].area, None);
    }

    #[test]
    fn rejects_feature_without_value() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"area": 1.0},
                "geometry": {"type": "Point", "coordinates": [0, 0]}
            }]
        })
        .to_string();
        assert!(matches!(
            parse_features(&body),
            Err(ServiceError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_non_collection_response() {
        let body = r#"{"type": "Point", "coordinates": [0, 0]}"#;
        assert!(matches!(
            parse_features(body),
            Err(ServiceError::Parse { .. })
        ));
    }

    #[test]
    fn extracts_error_messages() {
        assert_eq!(
            error_message(r#"{"error": {"code": 3002, "message": "Parameter 'range' is out of bounds"}}"#),
            "Parameter 'range' is out of bounds"
        );
        assert_eq!(
            error_message(r#"{"error": "Access to this API has been disallowed"}"#),
            "Access to this API has been disallowed"
        );
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn endpoint_uses_profile_id() {
        let mut config = ServiceConfig::embedded();
        config.base_url = "http://localhost:8080/ors/".to_string();
        let client = OrsClient::new("key".to_string(), &config).unwrap();
        let range = RangeSpec::from_minutes(&[5]);
        let request =
            IsochroneRequest::new(SamplePoint::new(0.0, 0.0), Profile::FootWalking, &range);
        assert_eq!(
            client.endpoint(&request),
            "http://localhost:8080/ors/v2/isochrones/foot-walking"
        );
    }
}

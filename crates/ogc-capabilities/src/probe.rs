//! Dynamic extent probing for layers whose capabilities omit a bbox.
//!
//! Samples a single feature with WFS GetFeature and derives an extent
//! from the response bbox or the sampled geometry. GeoJSON output is
//! WGS84 by convention.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use ogc_common::{BoundingBox, OgcError, OgcResult};
use ogc_discovery::{clean_base_url, HttpFetch};

/// An extent derived from live data rather than capability metadata.
#[derive(Debug, Clone)]
pub struct DynamicBbox {
    pub bbox: BoundingBox,
    pub crs: String,
    /// Where the extent came from: the response `bbox` member or a
    /// sampled feature geometry.
    pub source: &'static str,
}

/// Probe a WFS feature type for an extent by sampling one feature.
///
/// Returns `Ok(None)` when the service answers but the sample carries
/// neither a bbox nor a usable geometry.
pub async fn wfs_dynamic_bbox(
    http: &Arc<dyn HttpFetch>,
    service_url: &str,
    type_name: &str,
) -> OgcResult<Option<DynamicBbox>> {
    let url = format!(
        "{}?service=WFS&version=2.0.0&request=GetFeature&typeNames={}&maxFeatures=1&outputFormat=application/json",
        clean_base_url(service_url),
        type_name
    );
    debug!(url = %url, "probing dynamic bbox");

    let response = http.get_text(&url).await?;
    if !response.is_success() {
        return Err(OgcError::HttpStatus {
            url,
            status: response.status,
        });
    }

    let body: Value = serde_json::from_str(&response.body)?;

    if let Some(bbox) = body.get("bbox").and_then(bbox_from_array) {
        return Ok(Some(DynamicBbox {
            bbox,
            crs: "EPSG:4326".to_string(),
            source: "response_bbox",
        }));
    }

    let geometry = body
        .get("features")
        .and_then(Value::as_array)
        .and_then(|features| features.first())
        .and_then(|feature| feature.get("geometry"));

    Ok(geometry.and_then(bbox_from_geometry).map(|bbox| DynamicBbox {
        bbox,
        crs: "EPSG:4326".to_string(),
        source: "sampled_geometry",
    }))
}

/// Derive a bounding box from a GeoJSON geometry.
pub fn bbox_from_geometry(geometry: &Value) -> Option<BoundingBox> {
    let kind = geometry.get("type")?.as_str()?;
    let coordinates = geometry.get("coordinates")?;

    let mut points = Vec::new();
    match kind {
        "Point" => push_position(coordinates, &mut points),
        "LineString" | "MultiPoint" => push_positions(coordinates, &mut points),
        // Exterior ring only; holes cannot widen the extent.
        "Polygon" => push_positions(coordinates.get(0)?, &mut points),
        "MultiLineString" => {
            for line in coordinates.as_array()? {
                push_positions(line, &mut points);
            }
        }
        "MultiPolygon" => {
            for polygon in coordinates.as_array()? {
                if let Some(ring) = polygon.get(0) {
                    push_positions(ring, &mut points);
                }
            }
        }
        _ => return None,
    }

    BoundingBox::from_points(points.into_iter())
}

fn push_position(value: &Value, out: &mut Vec<(f64, f64)>) {
    if let Some(pair) = value.as_array() {
        if let (Some(x), Some(y)) = (
            pair.first().and_then(Value::as_f64),
            pair.get(1).and_then(Value::as_f64),
        ) {
            out.push((x, y));
        }
    }
}

fn push_positions(value: &Value, out: &mut Vec<(f64, f64)>) {
    if let Some(positions) = value.as_array() {
        for position in positions {
            push_position(position, out);
        }
    }
}

fn bbox_from_array(value: &Value) -> Option<BoundingBox> {
    let values: Vec<f64> = value.as_array()?.iter().filter_map(Value::as_f64).collect();
    if values.len() < 4 {
        return None;
    }
    Some(BoundingBox::new(values[0], values[1], values[2], values[3]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::{GETFEATURE_POLYGON, GETFEATURE_WITH_BBOX};
    use test_utils::StaticFetcher;

    fn probe_url(type_name: &str) -> String {
        format!(
            "http://atlas.example.com/ows?service=WFS&version=2.0.0&request=GetFeature&typeNames={}&maxFeatures=1&outputFormat=application/json",
            type_name
        )
    }

    #[tokio::test]
    async fn test_response_bbox_preferred() {
        let http: Arc<dyn HttpFetch> =
            Arc::new(StaticFetcher::new().ok(&probe_url("roads"), GETFEATURE_WITH_BBOX));
        let probed = wfs_dynamic_bbox(&http, "http://atlas.example.com/ows", "roads")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(probed.bbox.to_array(), [-10.0, -5.0, 10.0, 5.0]);
        assert_eq!(probed.source, "response_bbox");
    }

    #[tokio::test]
    async fn test_polygon_geometry_flattened() {
        let http: Arc<dyn HttpFetch> =
            Arc::new(StaticFetcher::new().ok(&probe_url("parcels"), GETFEATURE_POLYGON));
        let probed = wfs_dynamic_bbox(&http, "http://atlas.example.com/ows", "parcels")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(probed.bbox.to_array(), [0.0, 0.0, 3.0, 2.0]);
        assert_eq!(probed.source, "sampled_geometry");
        assert_eq!(probed.crs, "EPSG:4326");
    }

    #[tokio::test]
    async fn test_empty_collection_yields_none() {
        let http: Arc<dyn HttpFetch> = Arc::new(StaticFetcher::new().ok(
            &probe_url("empty"),
            r#"{"type":"FeatureCollection","features":[]}"#,
        ));
        let probed = wfs_dynamic_bbox(&http, "http://atlas.example.com/ows", "empty")
            .await
            .unwrap();
        assert!(probed.is_none());
    }

    #[test]
    fn test_multipolygon_uses_outer_rings() {
        let geometry = serde_json::json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0,0],[0,1],[1,1],[0,0]]],
                [[[5,5],[5,7],[6,7],[5,5]]]
            ]
        });
        let bbox = bbox_from_geometry(&geometry).unwrap();
        assert_eq!(bbox.to_array(), [0.0, 0.0, 6.0, 7.0]);
    }
}

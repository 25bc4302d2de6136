//! Capability extraction against scripted HTTP responses.

use std::sync::Arc;

use ogc_capabilities::CapabilityExtractor;
use ogc_common::{OgcError, Protocol};
use ogc_discovery::HttpFetch;
use test_utils::{fixtures, StaticFetcher};

const BASE: &str = "http://atlas.example.com";

fn dual_protocol_fetcher() -> StaticFetcher {
    StaticFetcher::new()
        .ok(
            "http://atlas.example.com/ows?service=WMS&request=GetCapabilities",
            fixtures::WMS_CAPABILITIES,
        )
        .ok(
            "http://atlas.example.com/ows?service=WFS&request=GetCapabilities",
            fixtures::WFS_CAPABILITIES,
        )
}

fn extractor(http: StaticFetcher) -> CapabilityExtractor {
    let http: Arc<dyn HttpFetch> = Arc::new(http);
    CapabilityExtractor::new(http)
}

#[tokio::test]
async fn test_parse_auto_aggregates_protocols() {
    let extractor = extractor(dual_protocol_fetcher());

    let layers = extractor.parse_auto(BASE, None, None).await.unwrap();

    // Two WMS layers plus two WFS feature types; WMTS never answered.
    assert_eq!(layers.len(), 4);
    assert!(layers
        .iter()
        .all(|l| l.service_url == "http://atlas.example.com/ows"));

    let wms_names: Vec<&str> = layers
        .iter()
        .filter(|l| l.protocol == Protocol::Wms)
        .map(|l| l.layer_name.as_str())
        .collect();
    assert_eq!(wms_names, vec!["roads", "rivers"]);

    let wfs_names: Vec<&str> = layers
        .iter()
        .filter(|l| l.protocol == Protocol::Wfs)
        .map(|l| l.layer_name.as_str())
        .collect();
    assert_eq!(wfs_names, vec!["roads", "parcels"]);
}

#[tokio::test]
async fn test_service_name_derived_from_url() {
    let extractor = extractor(dual_protocol_fetcher());

    // atlas.example.com: the registrable domain label names the service.
    let layers = extractor
        .parse_protocol(BASE, Protocol::Wms, None)
        .await
        .unwrap();
    assert_eq!(layers[0].service_name, "example");
}

#[tokio::test]
async fn test_supplied_service_name_wins() {
    let extractor = extractor(dual_protocol_fetcher());

    let layers = extractor
        .parse_protocol(BASE, Protocol::Wms, Some("city-atlas"))
        .await
        .unwrap();
    assert!(layers.iter().all(|l| l.service_name == "city-atlas"));
}

#[tokio::test]
async fn test_forced_protocol_only() {
    let extractor = extractor(dual_protocol_fetcher());

    let layers = extractor
        .parse_auto(BASE, Some(Protocol::Wfs), None)
        .await
        .unwrap();
    assert_eq!(layers.len(), 2);
    assert!(layers.iter().all(|l| l.protocol == Protocol::Wfs));
}

#[tokio::test]
async fn test_all_protocols_failing_is_no_service_found() {
    let extractor = extractor(StaticFetcher::new());

    let err = extractor
        .parse_auto("http://dead.example.com", None, None)
        .await
        .unwrap_err();
    match err {
        OgcError::NoServiceFound { url, attempts } => {
            assert_eq!(url, "http://dead.example.com");
            assert!(attempts.contains("WMS"));
            assert!(attempts.contains("WFS"));
            assert!(attempts.contains("WMTS"));
        }
        other => panic!("expected NoServiceFound, got {other}"),
    }
}

#[tokio::test]
async fn test_wms_attempt_rejects_wmts_document() {
    // A tile server that answers every request with its WMTS document
    // must not yield WMS layers.
    let http = StaticFetcher::new().ok(
        "http://tiles.example.com?service=WMS&request=GetCapabilities",
        fixtures::WMTS_CAPABILITIES,
    );
    let extractor = extractor(http);

    let result = extractor
        .parse_protocol("http://tiles.example.com", Protocol::Wms, None)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_wfs_layer_detail_with_schema() {
    let http = dual_protocol_fetcher().ok(
        "http://atlas.example.com/ows?service=WFS&version=2.0.0&request=DescribeFeatureType&typeNames=roads",
        fixtures::DESCRIBE_ROADS,
    );
    let extractor = extractor(http);

    let detail = extractor
        .layer_detail(BASE, Protocol::Wfs, "roads")
        .await
        .unwrap();

    assert_eq!(detail.layer_name, "roads");
    assert_eq!(detail.crs_list, vec!["EPSG:4326", "EPSG:3857"]);
    assert_eq!(detail.default_crs, "EPSG:4326");

    let bbox = detail.bbox.unwrap();
    assert_eq!(bbox.bbox, [-10.0, -5.0, 10.0, 5.0]);
    assert_eq!(bbox.source, "capabilities");

    let schema = detail.schema.unwrap();
    assert_eq!(schema.geometry_field.as_deref(), Some("geom"));
    assert_eq!(schema.fields.len(), 5);

    assert_eq!(detail.access.operation, "GetFeature");
    assert_eq!(detail.access.params["typeNames"], "roads");
}

#[tokio::test]
async fn test_wfs_detail_falls_back_to_dynamic_bbox() {
    // `parcels` declares no WGS84BoundingBox; the extent comes from a
    // sampled feature, and the missing schema endpoint is tolerated.
    let http = dual_protocol_fetcher().ok(
        "http://atlas.example.com/ows?service=WFS&version=2.0.0&request=GetFeature&typeNames=parcels&maxFeatures=1&outputFormat=application/json",
        fixtures::GETFEATURE_POLYGON,
    );
    let extractor = extractor(http);

    let detail = extractor
        .layer_detail(BASE, Protocol::Wfs, "parcels")
        .await
        .unwrap();

    let bbox = detail.bbox.unwrap();
    assert_eq!(bbox.bbox, [0.0, 0.0, 3.0, 2.0]);
    assert_eq!(bbox.source, "dynamic");
    assert_eq!(bbox.crs, "EPSG:4326");
    assert!(detail.schema.is_none());
}

#[tokio::test]
async fn test_wms_layer_detail() {
    let extractor = extractor(dual_protocol_fetcher());

    let detail = extractor
        .layer_detail(BASE, Protocol::Wms, "roads")
        .await
        .unwrap();

    assert_eq!(detail.title.as_deref(), Some("Road network"));
    assert_eq!(detail.bbox.as_ref().unwrap().source, "capabilities");
    assert_eq!(detail.styles.len(), 1);
    assert_eq!(detail.access.operation, "GetMap");
    assert_eq!(detail.access.params["layers"], "roads");
    assert_eq!(detail.access.params["styles"], "default");
}

#[tokio::test]
async fn test_unknown_layer_detail_is_error() {
    let extractor = extractor(dual_protocol_fetcher());

    let err = extractor
        .layer_detail(BASE, Protocol::Wms, "nonexistent")
        .await
        .unwrap_err();
    assert!(matches!(err, OgcError::LayerNotFound(_)));
}

#[tokio::test]
async fn test_wmts_layer_detail() {
    let http = StaticFetcher::new().ok(
        "http://atlas.example.com/gwc/service/wmts?service=WMTS&request=GetCapabilities",
        fixtures::WMTS_CAPABILITIES,
    );
    let extractor = extractor(http);

    let detail = extractor
        .layer_detail(BASE, Protocol::Wmts, "basemap")
        .await
        .unwrap();

    assert_eq!(detail.service_url, "http://atlas.example.com/gwc/service/wmts");
    assert_eq!(detail.crs_list, vec!["EPSG:4326"]);
    assert_eq!(detail.access.operation, "GetTile");
    assert_eq!(detail.access.params["tileMatrixSet"], "EPSG:4326");
    assert_eq!(detail.access.params["format"], "image/png");
}

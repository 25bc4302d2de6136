//! Reconciliation engine behavior against scripted services.

use std::sync::Arc;

use ogc_capabilities::CapabilityExtractor;
use ogc_common::{OgcError, Protocol, ServiceType};
use ogc_discovery::HttpFetch;
use ogc_registry::{
    LayerQuery, LayerRecordCreate, LayerRepository, MemoryRepository, RegistrationEngine,
    RegistrationRequest,
};
use test_utils::{fixtures, StaticFetcher};

const ATLAS: &str = "http://atlas.example.com";
const ATLAS_CANONICAL: &str = "http://atlas.example.com/ows";

fn atlas_fetcher() -> StaticFetcher {
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

fn engine_with(http: StaticFetcher) -> (RegistrationEngine, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::new());
    let http: Arc<dyn HttpFetch> = Arc::new(http);
    let engine = RegistrationEngine::new(
        repository.clone() as Arc<dyn LayerRepository>,
        CapabilityExtractor::new(http),
    );
    (engine, repository)
}

fn request(urls: &[&str]) -> RegistrationRequest {
    RegistrationRequest {
        service_urls: urls.iter().map(|u| u.to_string()).collect(),
        service_name: None,
        service_type: None,
    }
}

fn seed(layer_name: &str, service_url: &str, service_type: ServiceType) -> LayerRecordCreate {
    LayerRecordCreate {
        service_name: "seeded".to_string(),
        service_url: service_url.to_string(),
        service_type,
        layer_name: layer_name.to_string(),
        layer_title: None,
        layer_abstract: None,
    }
}

#[tokio::test]
async fn test_first_registration_creates_all_layers() {
    let (engine, repository) = engine_with(atlas_fetcher());

    let report = engine.register(&request(&[ATLAS])).await;

    // roads is offered by WMS and WFS, rivers by WMS, parcels by WFS.
    assert_eq!(report.summary.total_layers, 3);
    assert_eq!(report.summary.successful_layers, 3);
    assert_eq!(report.summary.failed_layers, 0);
    assert_eq!(report.summary.successful_services, 1);

    let roads = repository
        .get_by_service_layer_and_type(ATLAS_CANONICAL, "roads", ServiceType::Both)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(roads.service_type, ServiceType::Both);
    // WMS is the preferred variant for descriptive fields.
    assert_eq!(roads.layer_title.as_deref(), Some("Road network"));

    assert_eq!(
        repository.count(&LayerQuery::default()).await.unwrap(),
        3
    );
}

#[tokio::test]
async fn test_second_registration_is_idempotent() {
    let (engine, repository) = engine_with(atlas_fetcher());

    engine.register(&request(&[ATLAS])).await;
    let second = engine.register(&request(&[ATLAS])).await;

    assert_eq!(second.summary.successful_layers, 0);
    assert_eq!(second.summary.skipped_layers, 3);
    assert_eq!(second.summary.merged_layers, 0);
    assert_eq!(second.summary.deleted_layers, 0);
    assert_eq!(
        repository.count(&LayerQuery::default()).await.unwrap(),
        3
    );
}

#[tokio::test]
async fn test_merge_keeps_resource_id() {
    let (engine, repository) = engine_with(atlas_fetcher());

    // roads was registered before the service also offered it over WFS.
    let original = repository
        .create(seed("roads", ATLAS_CANONICAL, ServiceType::Wms))
        .await
        .unwrap();

    let report = engine.register(&request(&[ATLAS])).await;

    assert_eq!(report.summary.merged_layers, 1);
    assert_eq!(report.summary.successful_layers, 2); // rivers + parcels

    let merged = repository
        .get_by_id(original.resource_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(merged.service_type, ServiceType::Both);

    let outcome = report.services[0]
        .layers
        .iter()
        .find(|l| l.name == "roads")
        .unwrap();
    assert_eq!(outcome.status, "merged");
    assert_eq!(outcome.previous_type.as_deref(), Some("WMS"));
    assert_eq!(outcome.resource_id, Some(original.resource_id));
}

#[tokio::test]
async fn test_stale_deletion_scoped_to_service_url() {
    let (engine, repository) = engine_with(atlas_fetcher());

    // A layer the atlas service no longer advertises, and an unrelated
    // record under a different service URL.
    repository
        .create(seed("legacy", ATLAS_CANONICAL, ServiceType::Wms))
        .await
        .unwrap();
    let other = repository
        .create(seed("legacy", "http://other.example.com/ows", ServiceType::Wms))
        .await
        .unwrap();

    let report = engine.register(&request(&[ATLAS])).await;

    assert_eq!(report.summary.deleted_layers, 1);
    assert_eq!(report.services[0].deleted_layers[0].name, "legacy");
    assert_eq!(
        report.services[0].deleted_layers[0].reason,
        "not_found_in_service"
    );

    // The other service's record is untouched.
    assert!(repository
        .get_by_id(other.resource_id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_partial_batch_failure_is_isolated() {
    let (engine, _repository) = engine_with(atlas_fetcher());

    let report = engine
        .register(&request(&[ATLAS, "http://dead.example.com"]))
        .await;

    assert_eq!(report.summary.total_services, 2);
    assert_eq!(report.summary.successful_services, 1);
    assert_eq!(report.summary.failed_services, 1);
    assert_eq!(report.summary.successful_layers, 3);
    assert!(!report.errors.is_empty());

    let failed = report
        .services
        .iter()
        .find(|s| s.url == "http://dead.example.com")
        .unwrap();
    assert_eq!(failed.status, "failed");
    assert!(failed.error.is_some());
}

#[tokio::test]
async fn test_forced_protocol_limits_registration() {
    let (engine, repository) = engine_with(atlas_fetcher());

    let request = RegistrationRequest {
        service_urls: vec![ATLAS.to_string()],
        service_name: None,
        service_type: Some(Protocol::Wfs),
    };
    let report = engine.register(&request).await;

    assert_eq!(report.summary.successful_layers, 2); // roads + parcels
    let roads = repository
        .get_by_service_layer_and_type(ATLAS_CANONICAL, "roads", ServiceType::Wfs)
        .await
        .unwrap();
    assert!(roads.is_some());
}

#[tokio::test]
async fn test_list_layers_pagination() {
    let (engine, _repository) = engine_with(atlas_fetcher());
    engine.register(&request(&[ATLAS])).await;

    let page = engine
        .list_layers(LayerQuery {
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.layers.len(), 2);
    assert_eq!(page.pagination.total, 3);
    assert!(page.pagination.has_more);

    let rest = engine
        .list_layers(LayerQuery {
            limit: Some(2),
            offset: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(rest.layers.len(), 1);
    assert!(!rest.pagination.has_more);
}

#[tokio::test]
async fn test_statistics_by_type_and_service() {
    let (engine, _repository) = engine_with(atlas_fetcher());
    engine.register(&request(&[ATLAS])).await;

    let stats = engine.statistics().await.unwrap();
    assert_eq!(stats.total_layers, 3);
    assert_eq!(stats.by_service_type["BOTH"], 1);
    assert_eq!(stats.by_service_type["WMS"], 1);
    assert_eq!(stats.by_service_type["WFS"], 1);
}

#[tokio::test]
async fn test_layer_details_expands_both() {
    let http = atlas_fetcher().ok(
        "http://atlas.example.com/ows?service=WFS&version=2.0.0&request=DescribeFeatureType&typeNames=roads",
        fixtures::DESCRIBE_ROADS,
    );
    let (engine, _repository) = engine_with(http);
    engine.register(&request(&[ATLAS])).await;

    let details = engine.layer_details("roads").await.unwrap();

    // BOTH expands to a WMS view and a WFS view.
    assert_eq!(details.len(), 2);
    assert!(details.iter().any(|d| d.protocol == Protocol::Wms));
    assert!(details.iter().any(|d| d.protocol == Protocol::Wfs));

    let wfs = details.iter().find(|d| d.protocol == Protocol::Wfs).unwrap();
    assert!(wfs.schema.is_some());
}

#[tokio::test]
async fn test_layer_details_all_lookups_failing_is_an_error() {
    let (engine, repository) = engine_with(atlas_fetcher());
    engine.register(&request(&[ATLAS])).await;

    // Same repository, but the service has gone dark.
    let http: Arc<dyn HttpFetch> = Arc::new(StaticFetcher::new());
    let offline = RegistrationEngine::new(
        repository.clone() as Arc<dyn LayerRepository>,
        CapabilityExtractor::new(http),
    );

    let err = offline.layer_details("roads").await.unwrap_err();
    match err {
        OgcError::NoServiceFound { url, attempts } => {
            assert_eq!(url, ATLAS_CANONICAL);
            assert!(attempts.contains("WMS"));
            assert!(attempts.contains("WFS"));
        }
        other => panic!("expected NoServiceFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_layer_details_unknown_layer() {
    let (engine, _repository) = engine_with(atlas_fetcher());
    engine.register(&request(&[ATLAS])).await;

    let err = engine.layer_details("nonexistent").await.unwrap_err();
    assert!(matches!(err, OgcError::LayerNotFound(_)));
}

#[tokio::test]
async fn test_delete_and_update_by_id() {
    let (engine, repository) = engine_with(atlas_fetcher());
    engine.register(&request(&[ATLAS])).await;

    let rivers = repository
        .get_by_service_layer_and_type(ATLAS_CANONICAL, "rivers", ServiceType::Wms)
        .await
        .unwrap()
        .unwrap();

    engine.delete_layer(rivers.resource_id).await.unwrap();
    let err = engine.delete_layer(rivers.resource_id).await.unwrap_err();
    assert!(matches!(err, OgcError::ResourceNotFound(_)));
}

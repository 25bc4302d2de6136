//! Reconciliation engine: drives capability extraction and converges the
//! repository onto what each service currently advertises.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use ogc_capabilities::{CapabilityExtractor, LayerDetail, ParsedLayer};
use ogc_common::{OgcError, OgcResult, Protocol, ServiceType};
use ogc_discovery::standardize_service_url;

use crate::model::{LayerQuery, LayerRecord, LayerRecordCreate, LayerRecordUpdate};
use crate::report::{DeletedLayer, LayerOutcome, RegistrationReport, ServiceReport};
use crate::repository::LayerRepository;

/// One registration batch: the URLs to reconcile, an optional shared
/// service name, and an optional forced protocol.
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub service_urls: Vec<String>,
    pub service_name: Option<String>,
    pub service_type: Option<Protocol>,
}

/// Pagination envelope for listings.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub has_more: bool,
}

/// One page of layer records.
#[derive(Debug, Clone, Serialize)]
pub struct LayerPage {
    pub layers: Vec<LayerRecord>,
    pub pagination: Pagination,
}

/// Aggregate counts over the registry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistryStatistics {
    pub total_layers: u64,
    pub by_service_type: BTreeMap<String, u64>,
    pub by_service_name: BTreeMap<String, u64>,
}

const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Reconciles registered layer records against live capability documents.
///
/// Owns no global state; the HTTP client and repository are injected.
pub struct RegistrationEngine {
    repository: Arc<dyn LayerRepository>,
    extractor: CapabilityExtractor,
}

impl RegistrationEngine {
    pub fn new(repository: Arc<dyn LayerRepository>, extractor: CapabilityExtractor) -> Self {
        Self {
            repository,
            extractor,
        }
    }

    /// Reconcile every URL in the request. URLs are processed
    /// sequentially and failures are isolated per URL; the report always
    /// comes back.
    pub async fn register(&self, request: &RegistrationRequest) -> RegistrationReport {
        let mut report = RegistrationReport::default();
        report.summary.total_services = request.service_urls.len();

        for url in &request.service_urls {
            let service_report = self.register_one(url, request).await;
            match service_report.status.as_str() {
                "success" => report.summary.successful_services += 1,
                _ => {
                    report.summary.failed_services += 1;
                    if let Some(error) = &service_report.error {
                        report.errors.push(format!("{}: {}", url, error));
                    }
                }
            }
            for layer in &service_report.layers {
                report.summary.total_layers += 1;
                match layer.status.as_str() {
                    "created" => report.summary.successful_layers += 1,
                    "merged" => report.summary.merged_layers += 1,
                    "skipped" => report.summary.skipped_layers += 1,
                    _ => {
                        report.summary.failed_layers += 1;
                        if let Some(error) = &layer.error {
                            report.errors.push(format!("{} [{}]: {}", url, layer.name, error));
                        }
                    }
                }
            }
            report.summary.deleted_layers += service_report.deleted_layers.len();
            report.services.push(service_report);
        }

        info!(
            services = report.summary.total_services,
            created = report.summary.successful_layers,
            merged = report.summary.merged_layers,
            skipped = report.summary.skipped_layers,
            deleted = report.summary.deleted_layers,
            failed = report.summary.failed_layers,
            "registration batch complete"
        );
        report
    }

    async fn register_one(&self, url: &str, request: &RegistrationRequest) -> ServiceReport {
        let parsed = match self
            .extractor
            .parse_auto(url, request.service_type, request.service_name.as_deref())
            .await
        {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(url = %url, error = %e, "service registration failed");
                return ServiceReport {
                    url: url.to_string(),
                    status: "failed".to_string(),
                    layers: vec![],
                    deleted_layers: vec![],
                    error: Some(e.to_string()),
                };
            }
        };

        // All parsed layers of one extraction share the canonical URL; an
        // empty extraction falls back to normalizing the input.
        let service_url = parsed
            .first()
            .map(|l| l.service_url.clone())
            .unwrap_or_else(|| standardize_service_url(url));

        let existing = match self.repository.get_layers_by_service_url(&service_url).await {
            Ok(existing) => existing,
            Err(e) => {
                return ServiceReport {
                    url: url.to_string(),
                    status: "failed".to_string(),
                    layers: vec![],
                    deleted_layers: vec![],
                    error: Some(e.to_string()),
                };
            }
        };
        let existing_by_name: HashMap<&str, &LayerRecord> = existing
            .iter()
            .map(|r| (r.layer_name.as_str(), r))
            .collect();

        // Group variants by layer name, preserving first-seen order.
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<&ParsedLayer>> = HashMap::new();
        for layer in &parsed {
            let entry = groups.entry(layer.layer_name.as_str()).or_default();
            if entry.is_empty() {
                order.push(layer.layer_name.as_str());
            }
            entry.push(layer);
        }

        let mut outcomes = Vec::new();
        for name in &order {
            let variants = &groups[name];
            let outcome = self
                .reconcile_layer(name, variants, existing_by_name.get(name).copied())
                .await;
            outcomes.push(outcome);
        }

        // Records the service stopped advertising are removed, scoped to
        // this service URL only.
        let observed: BTreeSet<&str> = order.iter().copied().collect();
        let mut deleted = Vec::new();
        for record in &existing {
            if observed.contains(record.layer_name.as_str()) {
                continue;
            }
            match self.repository.delete(record.resource_id).await {
                Ok(true) => {
                    debug!(layer = %record.layer_name, "stale layer deleted");
                    deleted.push(DeletedLayer {
                        name: record.layer_name.clone(),
                        service_type: record.service_type.to_string(),
                        resource_id: record.resource_id,
                        reason: "not_found_in_service".to_string(),
                    });
                }
                Ok(false) => {}
                Err(e) => {
                    outcomes.push(LayerOutcome::failed(
                        &record.layer_name,
                        record.service_type,
                        &e.to_string(),
                    ));
                }
            }
        }

        ServiceReport {
            url: url.to_string(),
            status: "success".to_string(),
            layers: outcomes,
            deleted_layers: deleted,
            error: None,
        }
    }

    async fn reconcile_layer(
        &self,
        name: &str,
        variants: &[&ParsedLayer],
        existing: Option<&LayerRecord>,
    ) -> LayerOutcome {
        let protocols: BTreeSet<Protocol> = variants.iter().map(|v| v.protocol).collect();
        let Some(final_type) = ServiceType::from_protocols(&protocols) else {
            return LayerOutcome::failed(name, ServiceType::Wms, "no variants observed");
        };

        if let Some(record) = existing {
            if record.service_type == final_type {
                return LayerOutcome::skipped(name, final_type, record.resource_id);
            }
            // Only the service type may change after creation.
            return match self
                .repository
                .update(record.resource_id, LayerRecordUpdate::service_type(final_type))
                .await
            {
                Ok(Some(updated)) => LayerOutcome::merged(
                    name,
                    final_type,
                    record.service_type,
                    updated.resource_id,
                ),
                Ok(None) => LayerOutcome::failed(name, final_type, "record vanished during merge"),
                Err(e) => LayerOutcome::failed(name, final_type, &e.to_string()),
            };
        }

        // Descriptive fields come from the highest-precedence variant.
        let preferred = variants
            .iter()
            .min_by_key(|v| v.protocol.precedence())
            .copied();
        let Some(preferred) = preferred else {
            return LayerOutcome::failed(name, final_type, "no variants observed");
        };

        let create = LayerRecordCreate {
            service_name: preferred.service_name.clone(),
            service_url: preferred.service_url.clone(),
            service_type: final_type,
            layer_name: preferred.layer_name.clone(),
            layer_title: preferred.layer_title.clone(),
            layer_abstract: preferred.layer_abstract.clone(),
        };
        match self.repository.create(create).await {
            Ok(record) => LayerOutcome::created(name, final_type, record.resource_id),
            Err(e) => LayerOutcome::failed(name, final_type, &e.to_string()),
        }
    }

    /// Filtered, paginated listing of registered layers.
    pub async fn list_layers(&self, query: LayerQuery) -> OgcResult<LayerPage> {
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = query.offset.unwrap_or(0);
        let effective = LayerQuery {
            limit: Some(limit),
            offset: Some(offset),
            ..query.clone()
        };

        let total = self.repository.count(&effective).await?;
        let layers = self.repository.list_resources(&effective).await?;
        let has_more = (offset as u64 + layers.len() as u64) < total;

        Ok(LayerPage {
            layers,
            pagination: Pagination {
                total,
                limit,
                offset,
                has_more,
            },
        })
    }

    /// Remove one registered layer by id.
    pub async fn delete_layer(&self, resource_id: Uuid) -> OgcResult<()> {
        if self.repository.delete(resource_id).await? {
            Ok(())
        } else {
            Err(OgcError::ResourceNotFound(resource_id.to_string()))
        }
    }

    /// Apply a partial update to one registered layer.
    pub async fn update_layer(
        &self,
        resource_id: Uuid,
        update: LayerRecordUpdate,
    ) -> OgcResult<LayerRecord> {
        self.repository
            .update(resource_id, update)
            .await?
            .ok_or_else(|| OgcError::ResourceNotFound(resource_id.to_string()))
    }

    /// Aggregate counts by service type and service name.
    pub async fn statistics(&self) -> OgcResult<RegistryStatistics> {
        let records = self.repository.list_resources(&LayerQuery::default()).await?;
        let mut stats = RegistryStatistics {
            total_layers: records.len() as u64,
            ..Default::default()
        };
        for record in &records {
            *stats
                .by_service_type
                .entry(record.service_type.to_string())
                .or_default() += 1;
            *stats
                .by_service_name
                .entry(record.service_name.clone())
                .or_default() += 1;
        }
        Ok(stats)
    }

    /// Live per-protocol details for every registered record with this
    /// layer name. A `BOTH` record expands to its WMS and WFS views.
    pub async fn layer_details(&self, layer_name: &str) -> OgcResult<Vec<LayerDetail>> {
        let candidates = self
            .repository
            .list_resources(&LayerQuery {
                layer_name: Some(layer_name.to_string()),
                ..Default::default()
            })
            .await?;
        let records: Vec<&LayerRecord> = candidates
            .iter()
            .filter(|r| r.layer_name == layer_name)
            .collect();
        if records.is_empty() {
            return Err(OgcError::LayerNotFound(layer_name.to_string()));
        }

        let mut details = Vec::new();
        let mut failures = Vec::new();
        for record in &records {
            for protocol in record.service_type.protocols() {
                match self
                    .extractor
                    .layer_detail(&record.service_url, protocol, layer_name)
                    .await
                {
                    Ok(detail) => details.push(detail),
                    Err(e) => {
                        warn!(
                            layer = %layer_name,
                            protocol = %protocol,
                            error = %e,
                            "layer detail unavailable"
                        );
                        failures.push(format!("{} [{}]: {}", record.service_url, protocol, e));
                    }
                }
            }
        }
        // A registered layer whose every live lookup failed is an error,
        // not an empty result.
        if details.is_empty() {
            return Err(OgcError::NoServiceFound {
                url: records[0].service_url.clone(),
                attempts: failures.join("; "),
            });
        }
        Ok(details)
    }
}

//! Storage contract for layer records, plus the in-memory implementation.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use ogc_common::{OgcError, OgcResult, ServiceType};

use crate::model::{LayerQuery, LayerRecord, LayerRecordCreate, LayerRecordUpdate};

/// Persistence seam for layer records.
///
/// Implementations enforce uniqueness of
/// `(service_url, layer_name, service_type)` on create.
#[async_trait]
pub trait LayerRepository: Send + Sync {
    async fn create(&self, create: LayerRecordCreate) -> OgcResult<LayerRecord>;

    async fn get_by_id(&self, resource_id: Uuid) -> OgcResult<Option<LayerRecord>>;

    async fn get_by_service_layer_and_type(
        &self,
        service_url: &str,
        layer_name: &str,
        service_type: ServiceType,
    ) -> OgcResult<Option<LayerRecord>>;

    /// All records registered under one canonical service URL.
    async fn get_layers_by_service_url(&self, service_url: &str) -> OgcResult<Vec<LayerRecord>>;

    /// Apply a partial update; `Ok(None)` when the id is unknown.
    async fn update(
        &self,
        resource_id: Uuid,
        update: LayerRecordUpdate,
    ) -> OgcResult<Option<LayerRecord>>;

    /// Remove a record; `Ok(false)` when the id is unknown.
    async fn delete(&self, resource_id: Uuid) -> OgcResult<bool>;

    /// Filtered listing, newest first, with limit/offset applied.
    async fn list_resources(&self, query: &LayerQuery) -> OgcResult<Vec<LayerRecord>>;

    /// Number of records matching the query's filters.
    async fn count(&self, query: &LayerQuery) -> OgcResult<u64>;
}

/// In-memory repository for tests and embedders without persistence.
#[derive(Default)]
pub struct MemoryRepository {
    records: RwLock<Vec<LayerRecord>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LayerRepository for MemoryRepository {
    async fn create(&self, create: LayerRecordCreate) -> OgcResult<LayerRecord> {
        let mut records = self.records.write().await;
        let duplicate = records.iter().any(|r| {
            r.service_url == create.service_url
                && r.layer_name == create.layer_name
                && r.service_type == create.service_type
        });
        if duplicate {
            return Err(OgcError::DuplicateResource {
                service_url: create.service_url,
                layer_name: create.layer_name,
                service_type: create.service_type.to_string(),
            });
        }
        let record = create.into_record();
        records.push(record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, resource_id: Uuid) -> OgcResult<Option<LayerRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.resource_id == resource_id).cloned())
    }

    async fn get_by_service_layer_and_type(
        &self,
        service_url: &str,
        layer_name: &str,
        service_type: ServiceType,
    ) -> OgcResult<Option<LayerRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| {
                r.service_url == service_url
                    && r.layer_name == layer_name
                    && r.service_type == service_type
            })
            .cloned())
    }

    async fn get_layers_by_service_url(&self, service_url: &str) -> OgcResult<Vec<LayerRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.service_url == service_url)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        resource_id: Uuid,
        update: LayerRecordUpdate,
    ) -> OgcResult<Option<LayerRecord>> {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|r| r.resource_id == resource_id) else {
            return Ok(None);
        };
        update.apply(record);
        Ok(Some(record.clone()))
    }

    async fn delete(&self, resource_id: Uuid) -> OgcResult<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.resource_id != resource_id);
        Ok(records.len() < before)
    }

    async fn list_resources(&self, query: &LayerQuery) -> OgcResult<Vec<LayerRecord>> {
        let records = self.records.read().await;
        let mut matched: Vec<LayerRecord> =
            records.iter().filter(|r| query.matches(r)).cloned().collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = query.offset.unwrap_or(0) as usize;
        let matched = matched.into_iter().skip(offset);
        Ok(match query.limit {
            Some(limit) => matched.take(limit as usize).collect(),
            None => matched.collect(),
        })
    }

    async fn count(&self, query: &LayerQuery) -> OgcResult<u64> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| query.matches(r)).count() as u64)
    }
}

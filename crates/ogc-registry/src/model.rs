//! Persisted layer records and their create/update/query forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ogc_common::ServiceType;

/// A registered layer, unique per `(service_url, layer_name, service_type)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerRecord {
    pub resource_id: Uuid,
    pub service_name: String,
    /// Canonical service URL (no query string, no trailing slash).
    pub service_url: String,
    pub service_type: ServiceType,
    pub layer_name: String,
    pub layer_title: Option<String>,
    pub layer_abstract: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to register a new layer.
#[derive(Debug, Clone)]
pub struct LayerRecordCreate {
    pub service_name: String,
    pub service_url: String,
    pub service_type: ServiceType,
    pub layer_name: String,
    pub layer_title: Option<String>,
    pub layer_abstract: Option<String>,
}

impl LayerRecordCreate {
    /// Materialize into a record with fresh id and timestamps.
    pub fn into_record(self) -> LayerRecord {
        let now = Utc::now();
        LayerRecord {
            resource_id: Uuid::new_v4(),
            service_name: self.service_name,
            service_url: self.service_url,
            service_type: self.service_type,
            layer_name: self.layer_name,
            layer_title: self.layer_title,
            layer_abstract: self.layer_abstract,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayerRecordUpdate {
    pub service_name: Option<String>,
    pub service_type: Option<ServiceType>,
    pub layer_title: Option<String>,
    pub layer_abstract: Option<String>,
}

impl LayerRecordUpdate {
    pub fn service_type(service_type: ServiceType) -> Self {
        Self {
            service_type: Some(service_type),
            ..Self::default()
        }
    }

    pub fn apply(&self, record: &mut LayerRecord) {
        if let Some(name) = &self.service_name {
            record.service_name = name.clone();
        }
        if let Some(service_type) = self.service_type {
            record.service_type = service_type;
        }
        if let Some(title) = &self.layer_title {
            record.layer_title = Some(title.clone());
        }
        if let Some(abstract_text) = &self.layer_abstract {
            record.layer_abstract = Some(abstract_text.clone());
        }
        record.updated_at = Utc::now();
    }
}

/// Filters and pagination for listing records.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayerQuery {
    pub service_type: Option<ServiceType>,
    /// Case-insensitive substring match on the service name.
    pub service_name: Option<String>,
    /// Case-insensitive substring match on the layer name.
    pub layer_name: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl LayerQuery {
    /// Whether a record passes the query's filters (ignores pagination).
    pub fn matches(&self, record: &LayerRecord) -> bool {
        if let Some(service_type) = self.service_type {
            if record.service_type != service_type {
                return false;
            }
        }
        if let Some(name) = &self.service_name {
            if !record
                .service_name
                .to_lowercase()
                .contains(&name.to_lowercase())
            {
                return false;
            }
        }
        if let Some(name) = &self.layer_name {
            if !record
                .layer_name
                .to_lowercase()
                .contains(&name.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

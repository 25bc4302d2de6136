//! Registration report structures, serialized for callers.

use serde::Serialize;
use uuid::Uuid;

use ogc_common::ServiceType;

/// Batch-level counters, merged after each service URL completes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrationSummary {
    pub total_services: usize,
    pub successful_services: usize,
    pub failed_services: usize,
    /// Distinct layer names observed across all services.
    pub total_layers: usize,
    pub successful_layers: usize,
    pub failed_layers: usize,
    pub skipped_layers: usize,
    pub deleted_layers: usize,
    pub merged_layers: usize,
}

/// Outcome for one observed layer name.
#[derive(Debug, Clone, Serialize)]
pub struct LayerOutcome {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    /// `created`, `merged`, `skipped` or `failed`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LayerOutcome {
    pub fn created(name: &str, service_type: ServiceType, resource_id: Uuid) -> Self {
        Self {
            name: name.to_string(),
            service_type: service_type.to_string(),
            status: "created".to_string(),
            previous_type: None,
            resource_id: Some(resource_id),
            reason: None,
            error: None,
        }
    }

    pub fn merged(
        name: &str,
        service_type: ServiceType,
        previous: ServiceType,
        resource_id: Uuid,
    ) -> Self {
        Self {
            name: name.to_string(),
            service_type: service_type.to_string(),
            status: "merged".to_string(),
            previous_type: Some(previous.to_string()),
            resource_id: Some(resource_id),
            reason: None,
            error: None,
        }
    }

    pub fn skipped(name: &str, service_type: ServiceType, resource_id: Uuid) -> Self {
        Self {
            name: name.to_string(),
            service_type: service_type.to_string(),
            status: "skipped".to_string(),
            previous_type: None,
            resource_id: Some(resource_id),
            reason: Some("already_registered".to_string()),
            error: None,
        }
    }

    pub fn failed(name: &str, service_type: ServiceType, error: &str) -> Self {
        Self {
            name: name.to_string(),
            service_type: service_type.to_string(),
            status: "failed".to_string(),
            previous_type: None,
            resource_id: None,
            reason: None,
            error: Some(error.to_string()),
        }
    }
}

/// A stale record removed because the service no longer advertises it.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedLayer {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub resource_id: Uuid,
    pub reason: String,
}

/// Per-URL result within a batch.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceReport {
    pub url: String,
    /// `success` or `failed`.
    pub status: String,
    pub layers: Vec<LayerOutcome>,
    pub deleted_layers: Vec<DeletedLayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Complete result of one registration batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrationReport {
    pub summary: RegistrationSummary,
    pub services: Vec<ServiceReport>,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serialization_shape() {
        let resource_id = Uuid::new_v4();
        let report = RegistrationReport {
            summary: RegistrationSummary {
                total_services: 1,
                successful_services: 1,
                total_layers: 1,
                successful_layers: 1,
                ..Default::default()
            },
            services: vec![ServiceReport {
                url: "http://atlas.example.com".to_string(),
                status: "success".to_string(),
                layers: vec![LayerOutcome::created("roads", ServiceType::Both, resource_id)],
                deleted_layers: vec![],
                error: None,
            }],
            errors: vec![],
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["summary"]["successful_layers"], 1);
        assert_eq!(value["services"][0]["layers"][0]["type"], "BOTH");
        assert_eq!(value["services"][0]["layers"][0]["status"], "created");
        // Optional fields stay out of the output entirely.
        assert!(value["services"][0]["layers"][0].get("error").is_none());
    }
}

//! Registrar configuration loading.
//!
//! The services file lists the endpoints to reconcile on each run:
//!
//! ```yaml
//! services:
//!   - url: https://ows.terrestris.de
//!   - url: http://localhost:8080/geoserver
//!     name: local-geoserver
//!     service_type: WMS
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use ogc_common::Protocol;

/// Top-level registrar configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrarConfig {
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
}

/// One service endpoint to register.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEntry {
    pub url: String,
    /// Overrides the derived service name.
    pub name: Option<String>,
    /// Forces a single protocol instead of auto-detection.
    pub service_type: Option<String>,
}

impl ServiceEntry {
    pub fn protocol(&self) -> Result<Option<Protocol>> {
        self.service_type
            .as_deref()
            .map(|s| {
                s.parse::<Protocol>()
                    .with_context(|| format!("invalid service_type for {}", self.url))
            })
            .transpose()
    }
}

impl RegistrarConfig {
    /// Load from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: RegistrarConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_services_yaml() {
        let yaml = r#"
services:
  - url: https://ows.terrestris.de
  - url: http://localhost:8080/geoserver
    name: local-geoserver
    service_type: wms
"#;
        let config: RegistrarConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.services.len(), 2);
        assert_eq!(config.services[0].url, "https://ows.terrestris.de");
        assert!(config.services[0].name.is_none());
        assert_eq!(
            config.services[1].protocol().unwrap(),
            Some(Protocol::Wms)
        );
    }

    #[test]
    fn test_invalid_service_type_is_error() {
        let entry = ServiceEntry {
            url: "http://example.com".to_string(),
            name: None,
            service_type: Some("WCS".to_string()),
        };
        assert!(entry.protocol().is_err());
    }
}

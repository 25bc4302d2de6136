//! Service URL normalization and request building.
//!
//! Storage wants one canonical base URL per service (no query string);
//! request building re-derives GetCapabilities URLs from it.

use ogc_common::Protocol;
use url::Url;

/// Strip query string and fragment, trim the trailing slash.
///
/// Unparsable input is treated as already clean: returned with only the
/// trailing slash trimmed.
pub fn clean_base_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.as_str().trim_end_matches('/').to_string()
        }
        Err(_) => url.trim_end_matches('/').to_string(),
    }
}

/// Canonical base URL for storage. Same logic as [`clean_base_url`];
/// named separately because storage and request building have different
/// call sites.
pub fn standardize_service_url(url: &str) -> String {
    clean_base_url(url)
}

/// Build a GetCapabilities request URL. A base that already looks like a
/// capabilities request is returned unchanged.
pub fn build_capabilities_url(base_url: &str, protocol: Protocol) -> String {
    if base_url.contains('?') && base_url.to_lowercase().contains("getcapabilities") {
        return base_url.to_string();
    }
    format!(
        "{}?service={}&request=GetCapabilities",
        base_url,
        protocol.as_str()
    )
}

/// Derive a human service label from a URL.
///
/// Vendor path segments win, localhost falls back to the first meaningful
/// path segment, and for regular hosts the registrable domain label is
/// used (skipping `www.` and `gov/com/org/net` second-level registries).
pub fn extract_service_name_from_url(url: &str) -> String {
    const KNOWN_SERVICES: &[&str] = &["geoserver", "mapserver", "qgis", "arcgis"];
    const ENDPOINT_SEGMENTS: &[&str] = &["ows", "wms", "wfs", "wmts", "gwc", "service"];

    let parsed = match Url::parse(url) {
        Ok(p) => p,
        Err(_) => return "unknown_service".to_string(),
    };

    let path = parsed.path().trim_matches('/').to_lowercase();
    for service in KNOWN_SERVICES {
        if path.contains(service) {
            return (*service).to_string();
        }
    }

    let Some(host) = parsed.host_str() else {
        return "unknown_service".to_string();
    };
    let host = host.to_lowercase();

    if host == "localhost" || host == "127.0.0.1" {
        if let Some(first) = path.split('/').find(|p| !p.is_empty()) {
            if !ENDPOINT_SEGMENTS.contains(&first) {
                return first.to_string();
            }
        }
        return "localhost".to_string();
    }

    let host = host.strip_prefix("www.").unwrap_or(&host);
    let parts: Vec<&str> = host.split('.').collect();
    match parts.len() {
        0 => "unknown_service".to_string(),
        1 => parts[0].to_string(),
        n => {
            // gisserver.tianditu.gov.cn -> tianditu
            if n >= 3 && matches!(parts[n - 2], "gov" | "com" | "org" | "net") {
                parts[n - 3].to_string()
            } else {
                parts[n - 2].to_string()
            }
        }
    }
}

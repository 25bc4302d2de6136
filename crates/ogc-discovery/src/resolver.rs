//! Working-endpoint resolution by probing conventional paths.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use ogc_common::Protocol;

use crate::http::HttpFetch;
use crate::url::{build_capabilities_url, clean_base_url};

/// Probes candidate endpoint paths for a protocol until one serves a
/// valid capabilities document.
pub struct EndpointResolver {
    http: Arc<dyn HttpFetch>,
}

impl EndpointResolver {
    pub fn new(http: Arc<dyn HttpFetch>) -> Self {
        Self { http }
    }

    /// Ordered endpoint suffixes to test for a protocol. The empty suffix
    /// (the base URL as-is) is always last.
    fn candidate_suffixes(protocol: Protocol) -> &'static [&'static str] {
        match protocol {
            Protocol::Wms => &[
                "/ows",
                "/wms",
                "/geoserver/ows",
                "/geoserver/wms",
                "/mapserver",
                "/cgi-bin/mapserv",
                "",
            ],
            Protocol::Wfs => &[
                "/ows",
                "/wfs",
                "/geoserver/ows",
                "/geoserver/wfs",
                "/mapserver",
                "/cgi-bin/mapserv",
                "",
            ],
            Protocol::Wmts => &[
                "/gwc/service/wmts",
                "/geoserver/gwc/service/wmts",
                "/wmts",
                "/geoserver/wmts",
                "/ows",
                "",
            ],
        }
    }

    /// Find the first endpoint under `base_url` answering a
    /// GetCapabilities request for `protocol`.
    ///
    /// Returns the pre-capabilities endpoint URL so callers can derive
    /// other request types from it, or `None` when no candidate works.
    pub async fn find_working_endpoint(
        &self,
        base_url: &str,
        protocol: Protocol,
    ) -> Option<String> {
        let clean_base = clean_base_url(base_url);
        let mut tested: HashSet<String> = HashSet::new();

        for suffix in Self::candidate_suffixes(protocol) {
            let test_url = Self::join_suffix(&clean_base, suffix);

            if !tested.insert(test_url.clone()) {
                continue;
            }

            let capabilities_url = build_capabilities_url(&test_url, protocol);
            debug!(protocol = %protocol, url = %capabilities_url, "Testing endpoint candidate");

            match self.http.get_text(&capabilities_url).await {
                Ok(response) if response.is_success() => {
                    let content = response.body.to_lowercase();
                    if content.contains(&protocol.as_str().to_lowercase())
                        && content.contains("capabilities")
                    {
                        info!(protocol = %protocol, url = %test_url, "Found working endpoint");
                        return Some(test_url);
                    }
                    debug!(url = %test_url, "Response lacks capability markers");
                }
                Ok(response) => {
                    debug!(url = %test_url, status = response.status, "Candidate returned non-200");
                }
                Err(e) => {
                    debug!(url = %test_url, error = %e, "Candidate probe failed");
                }
            }
        }

        warn!(protocol = %protocol, url = %clean_base, "No working endpoint found");
        None
    }

    /// Append a suffix to the cleaned base, never duplicating a suffix the
    /// base already ends with, and never doubling a `/geoserver` prefix.
    fn join_suffix(clean_base: &str, suffix: &str) -> String {
        if suffix.is_empty() || clean_base.ends_with(suffix) {
            return clean_base.to_string();
        }
        if suffix.starts_with("/geoserver/") && clean_base.contains("/geoserver") {
            let rest = &suffix["/geoserver".len()..];
            if !rest.is_empty() && !clean_base.ends_with(rest) {
                return format!("{}{}", clean_base, rest);
            }
            return clean_base.to_string();
        }
        format!("{}{}", clean_base, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_suffix_skips_existing() {
        assert_eq!(
            EndpointResolver::join_suffix("http://h/geoserver/wms", "/geoserver/wms"),
            "http://h/geoserver/wms"
        );
        assert_eq!(
            EndpointResolver::join_suffix("http://h", "/ows"),
            "http://h/ows"
        );
    }

    #[test]
    fn test_join_suffix_geoserver_dedupe() {
        // Base already inside geoserver: only the tail is appended.
        assert_eq!(
            EndpointResolver::join_suffix("http://h/geoserver", "/geoserver/wfs"),
            "http://h/geoserver/wfs"
        );
        assert_eq!(
            EndpointResolver::join_suffix("http://h/geoserver/wfs", "/geoserver/wfs"),
            "http://h/geoserver/wfs"
        );
    }

    #[test]
    fn test_join_suffix_empty() {
        assert_eq!(EndpointResolver::join_suffix("http://h", ""), "http://h");
    }
}

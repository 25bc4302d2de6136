//! Capability extraction: remote documents to normalized layer records.

use std::sync::Arc;

use tracing::{debug, info, warn};

use ogc_common::{default_crs, normalize_crs, OgcError, OgcResult, Protocol};
use ogc_discovery::{
    build_capabilities_url, extract_service_name_from_url, standardize_service_url,
    EndpointResolver, HttpFetch,
};

use crate::details::{AccessTemplate, BboxInfo, LayerDetail, StyleInfo};
use crate::probe::{wfs_dynamic_bbox, DynamicBbox};
use crate::schema::fetch_feature_schema;
use crate::{wfs, wms, wmts};

/// A layer as observed in a capability document, normalized for
/// registration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLayer {
    pub service_name: String,
    /// Canonical service URL all layers of one extraction share.
    pub service_url: String,
    pub layer_name: String,
    pub layer_title: Option<String>,
    pub layer_abstract: Option<String>,
    pub protocol: Protocol,
}

/// Fetches and parses capability documents across the three protocols.
pub struct CapabilityExtractor {
    http: Arc<dyn HttpFetch>,
    resolver: EndpointResolver,
}

impl CapabilityExtractor {
    pub fn new(http: Arc<dyn HttpFetch>) -> Self {
        let resolver = EndpointResolver::new(Arc::clone(&http));
        Self { http, resolver }
    }

    /// Extract layers for every protocol the URL answers, or only the
    /// forced one. Fails only when every attempted protocol fails.
    pub async fn parse_auto(
        &self,
        url: &str,
        forced: Option<Protocol>,
        service_name: Option<&str>,
    ) -> OgcResult<Vec<ParsedLayer>> {
        let protocols: Vec<Protocol> = match forced {
            Some(p) => vec![p],
            None => Protocol::all().to_vec(),
        };

        let mut layers = Vec::new();
        let mut failures = Vec::new();
        let mut any_ok = false;

        for protocol in protocols {
            match self.parse_protocol(url, protocol, service_name).await {
                Ok(mut parsed) => {
                    any_ok = true;
                    info!(
                        url = %url,
                        protocol = %protocol,
                        layers = parsed.len(),
                        "capabilities parsed"
                    );
                    layers.append(&mut parsed);
                }
                Err(e) => {
                    debug!(url = %url, protocol = %protocol, error = %e, "protocol attempt failed");
                    failures.push(format!("{}: {}", protocol, e));
                }
            }
        }

        if !any_ok {
            return Err(OgcError::NoServiceFound {
                url: url.to_string(),
                attempts: failures.join("; "),
            });
        }
        Ok(layers)
    }

    /// Extract layers for one protocol.
    pub async fn parse_protocol(
        &self,
        url: &str,
        protocol: Protocol,
        service_name: Option<&str>,
    ) -> OgcResult<Vec<ParsedLayer>> {
        let (service_url, body) = self.fetch_capabilities(url, protocol).await?;

        match protocol {
            Protocol::Wms => {
                let doc = wms::parse_wms_capabilities(&body)?;
                let name = self.resolve_service_name(service_name, url, doc.service_title.as_deref());
                Ok(doc
                    .layers
                    .into_iter()
                    .map(|layer| ParsedLayer {
                        service_name: name.clone(),
                        service_url: service_url.clone(),
                        layer_name: layer.name,
                        layer_title: layer.title,
                        layer_abstract: layer.abstract_text,
                        protocol,
                    })
                    .collect())
            }
            Protocol::Wfs => {
                let doc = wfs::parse_wfs_capabilities(&body)?;
                let name = self.resolve_service_name(service_name, url, doc.service_title.as_deref());
                Ok(doc
                    .feature_types
                    .into_iter()
                    .map(|ft| ParsedLayer {
                        service_name: name.clone(),
                        service_url: service_url.clone(),
                        layer_name: ft.name,
                        layer_title: ft.title,
                        layer_abstract: ft.abstract_text,
                        protocol,
                    })
                    .collect())
            }
            Protocol::Wmts => {
                let doc = wmts::parse_wmts_capabilities(&body)?;
                let name = self.resolve_service_name(service_name, url, doc.service_title.as_deref());
                Ok(doc
                    .layers
                    .into_iter()
                    .map(|layer| ParsedLayer {
                        service_name: name.clone(),
                        service_url: service_url.clone(),
                        layer_name: layer.identifier,
                        layer_title: layer.title,
                        layer_abstract: layer.abstract_text,
                        protocol,
                    })
                    .collect())
            }
        }
    }

    /// Full detail for one layer as served by one protocol, including a
    /// WFS schema and a dynamically probed extent where available.
    pub async fn layer_detail(
        &self,
        url: &str,
        protocol: Protocol,
        layer_name: &str,
    ) -> OgcResult<LayerDetail> {
        let (service_url, body) = self.fetch_capabilities(url, protocol).await?;

        match protocol {
            Protocol::Wms => {
                let doc = wms::parse_wms_capabilities(&body)?;
                let layer = doc
                    .layers
                    .into_iter()
                    .find(|l| l.name == layer_name)
                    .ok_or_else(|| OgcError::LayerNotFound(layer_name.to_string()))?;

                let mut crs_list = layer.crs_list.clone();
                crs_list.dedup();
                let crs = default_crs(&crs_list);

                // Capabilities always win; WGS84 over projected boxes.
                let bbox = layer
                    .wgs84_bbox
                    .map(|b| BboxInfo::from_capabilities(b, "EPSG:4326"))
                    .or_else(|| {
                        layer
                            .bboxes
                            .first()
                            .map(|b| BboxInfo::from_capabilities(b.bbox, &b.crs))
                    });

                let styles: Vec<StyleInfo> = layer
                    .styles
                    .iter()
                    .map(|s| StyleInfo {
                        name: s.name.clone(),
                        title: s.title.clone(),
                    })
                    .collect();
                let style = styles.first().map(|s| s.name.as_str());
                let access =
                    AccessTemplate::wms_get_map(&service_url, layer_name, &crs, bbox.as_ref(), style);

                Ok(LayerDetail {
                    layer_name: layer_name.to_string(),
                    protocol,
                    service_url,
                    title: layer.title,
                    abstract_text: layer.abstract_text,
                    crs_list,
                    default_crs: crs,
                    bbox,
                    styles,
                    schema: None,
                    access,
                })
            }
            Protocol::Wfs => {
                let doc = wfs::parse_wfs_capabilities(&body)?;
                let ft = doc
                    .feature_types
                    .into_iter()
                    .find(|f| f.name == layer_name)
                    .ok_or_else(|| OgcError::LayerNotFound(layer_name.to_string()))?;

                let crs_list = ft.crs_list();
                let crs = default_crs(&crs_list);

                let bbox = match ft.wgs84_bbox {
                    Some(b) => Some(BboxInfo::from_capabilities(b, "EPSG:4326")),
                    None => self
                        .probe_bbox(&service_url, layer_name)
                        .await
                        .map(BboxInfo::from_dynamic),
                };

                let schema = match fetch_feature_schema(&self.http, &service_url, layer_name).await
                {
                    Ok(schema) => Some(schema),
                    Err(e) => {
                        debug!(layer = %layer_name, error = %e, "schema unavailable");
                        None
                    }
                };

                let access = AccessTemplate::wfs_get_feature(&service_url, layer_name);

                Ok(LayerDetail {
                    layer_name: layer_name.to_string(),
                    protocol,
                    service_url,
                    title: ft.title,
                    abstract_text: ft.abstract_text,
                    crs_list,
                    default_crs: crs,
                    bbox,
                    styles: Vec::new(),
                    schema,
                    access,
                })
            }
            Protocol::Wmts => {
                let doc = wmts::parse_wmts_capabilities(&body)?;
                let layer = doc
                    .layers
                    .into_iter()
                    .find(|l| l.identifier == layer_name)
                    .ok_or_else(|| OgcError::LayerNotFound(layer_name.to_string()))?;

                let crs_list: Vec<String> = layer
                    .tile_matrix_sets
                    .iter()
                    .filter_map(|set| normalize_crs(Some(set)))
                    .filter(|c| c.starts_with("EPSG:"))
                    .collect();
                let crs = default_crs(&crs_list);

                let bbox = layer
                    .wgs84_bbox
                    .map(|b| BboxInfo::from_capabilities(b, "EPSG:4326"));

                let styles: Vec<StyleInfo> = layer
                    .styles
                    .iter()
                    .map(|(name, _)| StyleInfo {
                        name: name.clone(),
                        title: None,
                    })
                    .collect();

                let access = AccessTemplate::wmts_get_tile(
                    &service_url,
                    &layer.identifier,
                    layer.default_style(),
                    layer.default_format(),
                    layer.tile_matrix_sets.first().map(String::as_str),
                );

                Ok(LayerDetail {
                    layer_name: layer_name.to_string(),
                    protocol,
                    service_url,
                    title: layer.title,
                    abstract_text: layer.abstract_text,
                    crs_list,
                    default_crs: crs,
                    bbox,
                    styles,
                    schema: None,
                    access,
                })
            }
        }
    }

    /// Resolve the endpoint (falling back to the given URL), fetch the
    /// capabilities document, and return it with the canonical service URL.
    async fn fetch_capabilities(
        &self,
        url: &str,
        protocol: Protocol,
    ) -> OgcResult<(String, String)> {
        let endpoint = match self.resolver.find_working_endpoint(url, protocol).await {
            Some(found) => found,
            None => {
                debug!(url = %url, protocol = %protocol, "no endpoint resolved, using URL as-is");
                url.to_string()
            }
        };
        let service_url = standardize_service_url(&endpoint);
        let capabilities_url = build_capabilities_url(&endpoint, protocol);

        let response = self.http.get_text(&capabilities_url).await?;
        if !response.is_success() {
            return Err(OgcError::HttpStatus {
                url: capabilities_url,
                status: response.status,
            });
        }

        let body_lc = response.body.to_lowercase();
        if !body_lc.contains("capabilities") {
            return Err(OgcError::XmlParse(format!(
                "response from {} is not a capabilities document",
                capabilities_url
            )));
        }
        // A GeoServer base URL often answers WMS requests with the WMTS
        // document; reject the mismatch rather than register tile layers
        // as WMS.
        if protocol == Protocol::Wms && body_lc.contains("wmts") && !body_lc.contains("wms") {
            return Err(OgcError::XmlParse(format!(
                "response from {} is a WMTS document, not WMS",
                capabilities_url
            )));
        }

        Ok((service_url, response.body))
    }

    async fn probe_bbox(&self, service_url: &str, layer_name: &str) -> Option<DynamicBbox> {
        match wfs_dynamic_bbox(&self.http, service_url, layer_name).await {
            Ok(found) => found,
            Err(e) => {
                debug!(layer = %layer_name, error = %e, "dynamic bbox probe failed");
                None
            }
        }
    }

    fn resolve_service_name(
        &self,
        supplied: Option<&str>,
        url: &str,
        document_title: Option<&str>,
    ) -> String {
        if let Some(name) = supplied {
            if !name.trim().is_empty() {
                return name.trim().to_string();
            }
        }
        let from_url = extract_service_name_from_url(url);
        if from_url != "unknown_service" {
            return from_url;
        }
        if let Some(title) = document_title {
            let stripped = strip_protocol_words(title);
            if !stripped.is_empty() {
                return stripped;
            }
        }
        warn!(url = %url, "could not derive a service name");
        "Unknown Service".to_string()
    }
}

/// Drop protocol phrases from a capabilities service title, so
/// "Atlas Web Map Service" names the service "Atlas".
fn strip_protocol_words(title: &str) -> String {
    const PHRASES: [&str; 7] = [
        "web map tile service",
        "web feature service",
        "web map service",
        "wmts",
        "wfs",
        "wms",
        "geoserver",
    ];
    let mut result = title.to_string();
    for phrase in PHRASES {
        if let Some(range) = find_ascii_ignore_case(&result, phrase) {
            result.replace_range(range, "");
        }
    }
    result.trim().trim_matches(['-', ':', ','].as_slice()).trim().to_string()
}

/// Byte range of the first case-insensitive occurrence of an ASCII
/// `needle` in `haystack`. Matches char by char, so the returned range is
/// always on char boundaries of `haystack` even when lowercasing would
/// change its byte length.
fn find_ascii_ignore_case(haystack: &str, needle: &str) -> Option<std::ops::Range<usize>> {
    for (start, _) in haystack.char_indices() {
        let mut rest = haystack[start..].chars();
        let mut end = start;
        let mut matched = true;
        for nc in needle.chars() {
            match rest.next() {
                Some(hc) if hc.eq_ignore_ascii_case(&nc) => end += hc.len_utf8(),
                _ => {
                    matched = false;
                    break;
                }
            }
        }
        if matched {
            return Some(start..end);
        }
    }
    None
}

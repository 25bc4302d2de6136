//! Endpoint discovery for OGC services.
//!
//! Given a base URL and a target protocol, probes the conventional
//! endpoint paths (GeoServer, MapServer, generic `/ows`) until one
//! answers a GetCapabilities request with a recognizable document.

pub mod http;
pub mod resolver;
pub mod url;

pub use http::{FetchResponse, HttpFetch, ReqwestFetcher};
pub use resolver::EndpointResolver;
pub use url::{
    build_capabilities_url, clean_base_url, extract_service_name_from_url,
    standardize_service_url,
};

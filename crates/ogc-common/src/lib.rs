//! Common types shared across the ogc-layer-registry crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod service;

pub use bbox::BoundingBox;
pub use crs::{default_crs, normalize_crs};
pub use error::{OgcError, OgcResult};
pub use service::{Protocol, ServiceType};

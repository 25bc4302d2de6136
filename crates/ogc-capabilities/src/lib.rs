//! Capability extraction for OGC services.
//!
//! Turns remote capability documents (WMS, WFS, WMTS) into normalized
//! layer records, and assembles on-demand layer details including WFS
//! schemas and dynamically probed bounding boxes.

pub mod details;
pub mod document;
pub mod extractor;
pub mod probe;
pub mod schema;
pub mod wfs;
pub mod wms;
pub mod wmts;

pub use details::{AccessTemplate, BboxInfo, LayerDetail, StyleInfo};
pub use document::{
    CrsBoundingBox, WfsCapabilities, WfsFeatureTypeEntry, WmsCapabilities, WmsLayerEntry,
    WmsStyleEntry, WmtsCapabilities, WmtsLayerEntry,
};
pub use extractor::{CapabilityExtractor, ParsedLayer};
pub use probe::DynamicBbox;
pub use schema::{AttributeField, FeatureSchema};

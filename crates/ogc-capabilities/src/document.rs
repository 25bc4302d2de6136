//! Parsed capability document models.
//!
//! These are the library-boundary types produced by the protocol parsers:
//! one entry per named layer / feature type, with whatever metadata the
//! document declared.

use serde::Serialize;

use ogc_common::BoundingBox;

/// A bounding box declared for a specific CRS.
#[derive(Debug, Clone, Serialize)]
pub struct CrsBoundingBox {
    pub crs: String,
    pub bbox: BoundingBox,
}

/// A style advertised for a WMS layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WmsStyleEntry {
    pub name: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
}

/// A named WMS layer from a capabilities document.
#[derive(Debug, Clone, Default)]
pub struct WmsLayerEntry {
    pub name: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    /// Normalized CRS identifiers declared on the layer.
    pub crs_list: Vec<String>,
    /// EX_GeographicBoundingBox (always WGS84).
    pub wgs84_bbox: Option<BoundingBox>,
    /// Per-CRS BoundingBox declarations.
    pub bboxes: Vec<CrsBoundingBox>,
    pub styles: Vec<WmsStyleEntry>,
    pub queryable: bool,
}

/// Parsed WMS capabilities: service title plus named layers.
#[derive(Debug, Clone, Default)]
pub struct WmsCapabilities {
    pub service_title: Option<String>,
    pub layers: Vec<WmsLayerEntry>,
}

/// A feature type from a WFS capabilities document.
#[derive(Debug, Clone, Default)]
pub struct WfsFeatureTypeEntry {
    pub name: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    /// Normalized default CRS.
    pub default_crs: Option<String>,
    /// Normalized additional CRS identifiers.
    pub other_crs: Vec<String>,
    pub wgs84_bbox: Option<BoundingBox>,
}

impl WfsFeatureTypeEntry {
    /// Default CRS first, then the declared alternatives.
    pub fn crs_list(&self) -> Vec<String> {
        let mut list = Vec::new();
        if let Some(default) = &self.default_crs {
            list.push(default.clone());
        }
        list.extend(self.other_crs.iter().cloned());
        list
    }
}

/// Parsed WFS capabilities.
#[derive(Debug, Clone, Default)]
pub struct WfsCapabilities {
    pub service_title: Option<String>,
    pub feature_types: Vec<WfsFeatureTypeEntry>,
}

/// A tiled layer from a WMTS capabilities document.
#[derive(Debug, Clone, Default)]
pub struct WmtsLayerEntry {
    pub identifier: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub wgs84_bbox: Option<BoundingBox>,
    /// Style identifiers; the default style is flagged.
    pub styles: Vec<(String, bool)>,
    pub formats: Vec<String>,
    pub tile_matrix_sets: Vec<String>,
}

impl WmtsLayerEntry {
    /// Default style identifier, falling back to the first declared one.
    pub fn default_style(&self) -> Option<&str> {
        self.styles
            .iter()
            .find(|(_, is_default)| *is_default)
            .or_else(|| self.styles.first())
            .map(|(id, _)| id.as_str())
    }

    /// Preferred tile format: image/png when offered, else the first.
    pub fn default_format(&self) -> &str {
        if self.formats.iter().any(|f| f == "image/png") {
            "image/png"
        } else {
            self.formats.first().map(String::as_str).unwrap_or("image/png")
        }
    }
}

/// Parsed WMTS capabilities.
#[derive(Debug, Clone, Default)]
pub struct WmtsCapabilities {
    pub service_title: Option<String>,
    pub layers: Vec<WmtsLayerEntry>,
}

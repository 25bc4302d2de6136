//! On-demand layer detail assembly.

use std::collections::BTreeMap;

use serde::Serialize;

use ogc_common::{BoundingBox, Protocol};

use crate::probe::DynamicBbox;
use crate::schema::FeatureSchema;

/// A layer extent with its CRS and provenance.
#[derive(Debug, Clone, Serialize)]
pub struct BboxInfo {
    /// `[minx, miny, maxx, maxy]`.
    pub bbox: [f64; 4],
    pub crs: String,
    /// `"capabilities"` when declared in the document, `"dynamic"` when
    /// probed from live data.
    pub source: String,
}

impl BboxInfo {
    pub fn from_capabilities(bbox: BoundingBox, crs: &str) -> Self {
        Self {
            bbox: bbox.to_array(),
            crs: crs.to_string(),
            source: "capabilities".to_string(),
        }
    }

    pub fn from_dynamic(probed: DynamicBbox) -> Self {
        Self {
            bbox: probed.bbox.to_array(),
            crs: probed.crs,
            source: "dynamic".to_string(),
        }
    }
}

/// A named style offered for a layer.
#[derive(Debug, Clone, Serialize)]
pub struct StyleInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Request parameters for the protocol's data operation, with `{...}`
/// placeholders where the client must fill in values.
#[derive(Debug, Clone, Serialize)]
pub struct AccessTemplate {
    pub protocol: Protocol,
    pub operation: String,
    pub url: String,
    pub params: BTreeMap<String, String>,
}

impl AccessTemplate {
    pub fn wms_get_map(
        service_url: &str,
        layer_name: &str,
        crs: &str,
        bbox: Option<&BboxInfo>,
        style: Option<&str>,
    ) -> Self {
        let bbox_value = bbox
            .map(|b| {
                format!("{},{},{},{}", b.bbox[0], b.bbox[1], b.bbox[2], b.bbox[3])
            })
            .unwrap_or_else(|| "{minx},{miny},{maxx},{maxy}".to_string());
        let params = BTreeMap::from([
            ("service".to_string(), "WMS".to_string()),
            ("version".to_string(), "1.3.0".to_string()),
            ("request".to_string(), "GetMap".to_string()),
            ("layers".to_string(), layer_name.to_string()),
            ("styles".to_string(), style.unwrap_or("").to_string()),
            ("crs".to_string(), crs.to_string()),
            ("bbox".to_string(), bbox_value),
            ("width".to_string(), "{width}".to_string()),
            ("height".to_string(), "{height}".to_string()),
            ("format".to_string(), "image/png".to_string()),
        ]);
        Self {
            protocol: Protocol::Wms,
            operation: "GetMap".to_string(),
            url: service_url.to_string(),
            params,
        }
    }

    pub fn wfs_get_feature(service_url: &str, type_name: &str) -> Self {
        let params = BTreeMap::from([
            ("service".to_string(), "WFS".to_string()),
            ("version".to_string(), "2.0.0".to_string()),
            ("request".to_string(), "GetFeature".to_string()),
            ("typeNames".to_string(), type_name.to_string()),
            ("outputFormat".to_string(), "application/json".to_string()),
            ("count".to_string(), "{count}".to_string()),
        ]);
        Self {
            protocol: Protocol::Wfs,
            operation: "GetFeature".to_string(),
            url: service_url.to_string(),
            params,
        }
    }

    pub fn wmts_get_tile(
        service_url: &str,
        layer_identifier: &str,
        style: Option<&str>,
        format: &str,
        tile_matrix_set: Option<&str>,
    ) -> Self {
        let params = BTreeMap::from([
            ("service".to_string(), "WMTS".to_string()),
            ("version".to_string(), "1.0.0".to_string()),
            ("request".to_string(), "GetTile".to_string()),
            ("layer".to_string(), layer_identifier.to_string()),
            ("style".to_string(), style.unwrap_or("default").to_string()),
            ("format".to_string(), format.to_string()),
            (
                "tileMatrixSet".to_string(),
                tile_matrix_set.unwrap_or("{tileMatrixSet}").to_string(),
            ),
            ("tileMatrix".to_string(), "{z}".to_string()),
            ("tileRow".to_string(), "{row}".to_string()),
            ("tileCol".to_string(), "{col}".to_string()),
        ]);
        Self {
            protocol: Protocol::Wmts,
            operation: "GetTile".to_string(),
            url: service_url.to_string(),
            params,
        }
    }
}

/// Full detail for one layer as served by one protocol.
#[derive(Debug, Clone, Serialize)]
pub struct LayerDetail {
    pub layer_name: String,
    pub protocol: Protocol,
    pub service_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    pub crs_list: Vec<String>,
    pub default_crs: String,
    pub bbox: Option<BboxInfo>,
    pub styles: Vec<StyleInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<FeatureSchema>,
    pub access: AccessTemplate,
}

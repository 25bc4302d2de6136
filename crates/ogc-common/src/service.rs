//! OGC protocol and persisted service-type enums.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::OgcError;

/// A single OGC protocol a layer can be offered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Protocol {
    /// Web Map Service
    #[serde(rename = "WMS")]
    Wms,
    /// Web Feature Service
    #[serde(rename = "WFS")]
    Wfs,
    /// Web Map Tile Service
    #[serde(rename = "WMTS")]
    Wmts,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Wms => "WMS",
            Protocol::Wfs => "WFS",
            Protocol::Wmts => "WMTS",
        }
    }

    /// All protocols, in auto-detection order.
    pub fn all() -> [Protocol; 3] {
        [Protocol::Wms, Protocol::Wfs, Protocol::Wmts]
    }

    /// Precedence used when several variants of one layer disagree on
    /// descriptive fields: lower wins.
    pub fn precedence(&self) -> u8 {
        match self {
            Protocol::Wms => 0,
            Protocol::Wfs => 1,
            Protocol::Wmts => 2,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = OgcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "WMS" => Ok(Protocol::Wms),
            "WFS" => Ok(Protocol::Wfs),
            "WMTS" => Ok(Protocol::Wmts),
            _ => Err(OgcError::UnknownServiceType(s.to_string())),
        }
    }
}

/// Service type stored on a persisted layer record.
///
/// `Both` marks a layer name offered under more than one protocol by the
/// same service URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "WMS")]
    Wms,
    #[serde(rename = "WFS")]
    Wfs,
    #[serde(rename = "WMTS")]
    Wmts,
    #[serde(rename = "BOTH")]
    Both,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Wms => "WMS",
            ServiceType::Wfs => "WFS",
            ServiceType::Wmts => "WMTS",
            ServiceType::Both => "BOTH",
        }
    }

    /// Compute the stored type from the set of protocols a layer name was
    /// observed under during one registration run.
    pub fn from_protocols(protocols: &BTreeSet<Protocol>) -> Option<ServiceType> {
        match protocols.len() {
            0 => None,
            1 => protocols.iter().next().copied().map(ServiceType::from),
            _ => Some(ServiceType::Both),
        }
    }

    /// Protocols to consult when building layer details for a record of
    /// this type. `Both` covers the WMS/WFS pair it was merged from.
    pub fn protocols(&self) -> Vec<Protocol> {
        match self {
            ServiceType::Wms => vec![Protocol::Wms],
            ServiceType::Wfs => vec![Protocol::Wfs],
            ServiceType::Wmts => vec![Protocol::Wmts],
            ServiceType::Both => vec![Protocol::Wms, Protocol::Wfs],
        }
    }
}

impl From<Protocol> for ServiceType {
    fn from(p: Protocol) -> Self {
        match p {
            Protocol::Wms => ServiceType::Wms,
            Protocol::Wfs => ServiceType::Wfs,
            Protocol::Wmts => ServiceType::Wmts,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = OgcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "WMS" => Ok(ServiceType::Wms),
            "WFS" => Ok(ServiceType::Wfs),
            "WMTS" => Ok(ServiceType::Wmts),
            "BOTH" => Ok(ServiceType::Both),
            _ => Err(OgcError::UnknownServiceType(s.to_string())),
        }
    }
}

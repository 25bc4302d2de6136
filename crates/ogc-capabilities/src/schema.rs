//! WFS feature schemas via DescribeFeatureType.

use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use tracing::debug;

use ogc_common::{OgcError, OgcResult};
use ogc_discovery::{clean_base_url, HttpFetch};

/// One attribute of a feature type, with its XSD type simplified.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeField {
    pub name: String,
    /// Simplified type: string, integer, number, boolean, date, datetime,
    /// time or geometry.
    pub field_type: String,
    /// The declared XSD type, unmodified.
    pub raw_type: String,
}

/// Attribute schema of a WFS feature type.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureSchema {
    pub type_name: String,
    pub fields: Vec<AttributeField>,
    /// Name of the geometry-valued field, when one is declared.
    pub geometry_field: Option<String>,
}

/// Fetch and parse the schema of a feature type.
pub async fn fetch_feature_schema(
    http: &Arc<dyn HttpFetch>,
    service_url: &str,
    type_name: &str,
) -> OgcResult<FeatureSchema> {
    let url = format!(
        "{}?service=WFS&version=2.0.0&request=DescribeFeatureType&typeNames={}",
        clean_base_url(service_url),
        type_name
    );
    debug!(url = %url, "fetching feature schema");

    let response = http.get_text(&url).await?;
    if !response.is_success() {
        return Err(OgcError::HttpStatus {
            url,
            status: response.status,
        });
    }
    parse_feature_schema(&response.body, type_name)
}

/// Parse a DescribeFeatureType response into a field list.
pub fn parse_feature_schema(xml: &str, type_name: &str) -> OgcResult<FeatureSchema> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut schema = FeatureSchema {
        type_name: type_name.to_string(),
        fields: Vec::new(),
        geometry_field: None,
    };

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().local_name().as_ref() == b"element" {
                    if let Some(field) = field_from_element(&e) {
                        if field.field_type == "geometry" && schema.geometry_field.is_none() {
                            schema.geometry_field = Some(field.name.clone());
                        }
                        schema.fields.push(field);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(OgcError::XmlParse(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(schema)
}

fn field_from_element(e: &BytesStart<'_>) -> Option<AttributeField> {
    let mut name = None;
    let mut raw_type = None;
    for attr in e.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"name" => name = attr.unescape_value().ok().map(|v| v.to_string()),
            b"type" => raw_type = attr.unescape_value().ok().map(|v| v.to_string()),
            _ => {}
        }
    }
    let name = name?;
    let raw_type = raw_type?;
    Some(AttributeField {
        field_type: simplify_xsd_type(&raw_type),
        name,
        raw_type,
    })
}

/// Collapse an XSD or GML type name to a coarse client-facing type.
/// Unrecognized types pass through as their lower-cased unqualified name.
pub fn simplify_xsd_type(raw: &str) -> String {
    // Strip any namespace prefix before matching.
    let unqualified = raw.rsplit(':').next().unwrap_or(raw).to_ascii_lowercase();

    const GEOMETRY_MARKERS: [&str; 7] = [
        "geometry",
        "multipoint",
        "multiline",
        "multipolygon",
        "point",
        "line",
        "polygon",
    ];
    if GEOMETRY_MARKERS.iter().any(|m| unqualified.contains(m)) {
        return "geometry".to_string();
    }

    let simplified = if unqualified.contains("string") {
        "string"
    } else if ["int", "long", "short", "byte"].iter().any(|m| unqualified.contains(m)) {
        "integer"
    } else if ["double", "float", "decimal"].iter().any(|m| unqualified.contains(m)) {
        "number"
    } else if unqualified.contains("boolean") {
        "boolean"
    } else if unqualified.contains("datetime") {
        "datetime"
    } else if unqualified.contains("date") {
        "date"
    } else if unqualified.contains("time") {
        "time"
    } else {
        return unqualified;
    };
    simplified.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use test_utils::fixtures::DESCRIBE_ROADS;
    use test_utils::StaticFetcher;

    #[test]
    fn test_parse_roads_schema() {
        let schema = parse_feature_schema(DESCRIBE_ROADS, "roads").unwrap();
        assert_eq!(schema.type_name, "roads");
        assert_eq!(schema.fields.len(), 5);

        let types: Vec<(&str, &str)> = schema
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.field_type.as_str()))
            .collect();
        assert_eq!(
            types,
            vec![
                ("name", "string"),
                ("lanes", "integer"),
                ("length_km", "number"),
                ("opened", "date"),
                ("geom", "geometry"),
            ]
        );
        assert_eq!(schema.geometry_field.as_deref(), Some("geom"));
    }

    #[test]
    fn test_simplify_xsd_type() {
        assert_eq!(simplify_xsd_type("xsd:string"), "string");
        assert_eq!(simplify_xsd_type("xsd:dateTime"), "datetime");
        assert_eq!(simplify_xsd_type("xsd:time"), "time");
        assert_eq!(simplify_xsd_type("xsd:boolean"), "boolean");
        assert_eq!(simplify_xsd_type("gml:PointPropertyType"), "geometry");
        assert_eq!(simplify_xsd_type("gml:MultiPolygonPropertyType"), "geometry");
        assert_eq!(simplify_xsd_type("gml:MeasureType"), "measuretype");
    }

    #[tokio::test]
    async fn test_fetch_schema_over_http() {
        let http: Arc<dyn ogc_discovery::HttpFetch> = Arc::new(StaticFetcher::new().ok(
            "http://atlas.example.com/ows?service=WFS&version=2.0.0&request=DescribeFeatureType&typeNames=roads",
            DESCRIBE_ROADS,
        ));
        let schema = fetch_feature_schema(&http, "http://atlas.example.com/ows", "roads")
            .await
            .unwrap();
        assert_eq!(schema.fields.len(), 5);
    }
}

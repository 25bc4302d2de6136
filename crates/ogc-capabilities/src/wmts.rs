//! WMTS capabilities parsing (1.0.0).
//!
//! A `TileMatrixSet` element appears both as a layer's link target (inside
//! `TileMatrixSetLink`) and as a top-level matrix set definition under
//! `Contents`; only the former belongs to the layer.

use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;

use ogc_common::{BoundingBox, OgcError, OgcResult};

use crate::document::{WmtsCapabilities, WmtsLayerEntry};

#[derive(Default)]
struct TileLayerBuilder {
    entry: WmtsLayerEntry,
    lower_corner: Option<(f64, f64)>,
    upper_corner: Option<(f64, f64)>,
}

impl TileLayerBuilder {
    fn finish(mut self) -> Option<WmtsLayerEntry> {
        if self.entry.identifier.is_empty() {
            return None;
        }
        if let (Some((minx, miny)), Some((maxx, maxy))) = (self.lower_corner, self.upper_corner) {
            self.entry.wgs84_bbox = Some(BoundingBox::new(minx, miny, maxx, maxy));
        }
        Some(self.entry)
    }
}

/// Parse a WMTS capabilities document into tiled layer entries.
pub fn parse_wmts_capabilities(xml: &str) -> OgcResult<WmtsCapabilities> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<TileLayerBuilder> = None;
    let mut style_is_default = false;
    let mut doc = WmtsCapabilities::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(e.name());
                match name.as_str() {
                    "Layer" if path.last().map(String::as_str) == Some("Contents") => {
                        current = Some(TileLayerBuilder::default());
                    }
                    "Style" if current.is_some() => {
                        style_is_default = e
                            .attributes()
                            .flatten()
                            .any(|a| {
                                a.key.local_name().as_ref() == b"isDefault"
                                    && a.value.as_ref() == b"true"
                            });
                    }
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| OgcError::XmlParse(e.to_string()))?
                    .trim()
                    .to_string();
                if text.is_empty() {
                    continue;
                }
                let element = path.last().map(String::as_str).unwrap_or("");
                let parent = path
                    .len()
                    .checked_sub(2)
                    .and_then(|i| path.get(i))
                    .map(String::as_str)
                    .unwrap_or("");

                let Some(builder) = current.as_mut() else {
                    if element == "Title" && path.iter().any(|p| p == "ServiceIdentification") {
                        doc.service_title = Some(text);
                    }
                    continue;
                };

                match (element, parent) {
                    ("Identifier", "Layer") => builder.entry.identifier = text,
                    ("Identifier", "Style") => {
                        builder.entry.styles.push((text, style_is_default));
                    }
                    ("Title", "Layer") => builder.entry.title = Some(text),
                    ("Abstract", "Layer") => builder.entry.abstract_text = Some(text),
                    ("Format", "Layer") => builder.entry.formats.push(text),
                    ("TileMatrixSet", "TileMatrixSetLink") => {
                        builder.entry.tile_matrix_sets.push(text);
                    }
                    ("LowerCorner", _) if parent == "WGS84BoundingBox" => {
                        builder.lower_corner = parse_corner(&text);
                    }
                    ("UpperCorner", _) if parent == "WGS84BoundingBox" => {
                        builder.upper_corner = parse_corner(&text);
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let name = local_name(e.name());
                path.pop();
                match name.as_str() {
                    "Layer" if path.last().map(String::as_str) == Some("Contents") => {
                        if let Some(entry) = current.take().and_then(TileLayerBuilder::finish) {
                            doc.layers.push(entry);
                        }
                    }
                    "Style" => style_is_default = false,
                    _ => {}
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

    Ok(doc)
}

fn local_name(name: QName<'_>) -> String {
    String::from_utf8_lossy(name.local_name().as_ref()).to_string()
}

fn parse_corner(text: &str) -> Option<(f64, f64)> {
    let mut parts = text.split_whitespace();
    let x = parts.next()?.parse::<f64>().ok()?;
    let y = parts.next()?.parse::<f64>().ok()?;
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::WMTS_CAPABILITIES;

    #[test]
    fn test_parse_tiled_layers() {
        let doc = parse_wmts_capabilities(WMTS_CAPABILITIES).unwrap();
        assert_eq!(doc.service_title.as_deref(), Some("Atlas Tile Service"));
        assert_eq!(doc.layers.len(), 1);

        let basemap = &doc.layers[0];
        assert_eq!(basemap.identifier, "basemap");
        assert_eq!(basemap.title.as_deref(), Some("Base map"));
        assert_eq!(basemap.abstract_text.as_deref(), Some("Cached base map"));
        assert_eq!(
            basemap.wgs84_bbox.unwrap().to_array(),
            [-180.0, -90.0, 180.0, 90.0]
        );
        assert_eq!(basemap.styles, vec![("default".to_string(), true)]);
        assert_eq!(basemap.default_style(), Some("default"));
        assert_eq!(basemap.formats, vec!["image/png", "image/jpeg"]);
        assert_eq!(basemap.default_format(), "image/png");
        assert_eq!(basemap.tile_matrix_sets, vec!["EPSG:4326"]);
    }

    #[test]
    fn test_contents_level_matrix_set_not_absorbed() {
        // The Contents-level <TileMatrixSet> definition after the layer must
        // not add to any layer's identifier or matrix set list.
        let doc = parse_wmts_capabilities(WMTS_CAPABILITIES).unwrap();
        assert_eq!(doc.layers[0].tile_matrix_sets.len(), 1);
        assert_eq!(doc.layers[0].identifier, "basemap");
    }
}

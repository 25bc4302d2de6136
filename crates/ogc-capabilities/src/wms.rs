//! WMS capabilities parsing (1.1.1 and 1.3.0).
//!
//! Layers nest; only named layers become entries. Group layers without a
//! Name are containers and are dropped after their children are emitted.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;

use ogc_common::{normalize_crs, BoundingBox, OgcError, OgcResult};

use crate::document::{CrsBoundingBox, WmsCapabilities, WmsLayerEntry, WmsStyleEntry};

#[derive(Default)]
struct LayerBuilder {
    entry: WmsLayerEntry,
    west: Option<f64>,
    east: Option<f64>,
    south: Option<f64>,
    north: Option<f64>,
}

impl LayerBuilder {
    fn finish(mut self) -> Option<WmsLayerEntry> {
        if self.entry.name.is_empty() {
            return None;
        }
        if let (Some(w), Some(e), Some(s), Some(n)) = (self.west, self.east, self.south, self.north)
        {
            self.entry.wgs84_bbox = Some(BoundingBox::new(w, s, e, n));
        }
        Some(self.entry)
    }
}

/// Parse a WMS capabilities document into named layer entries.
pub fn parse_wms_capabilities(xml: &str) -> OgcResult<WmsCapabilities> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut stack: Vec<LayerBuilder> = Vec::new();
    let mut current_style: Option<WmsStyleEntry> = None;
    let mut doc = WmsCapabilities::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(e.name());
                match name.as_str() {
                    "Layer" => {
                        let mut builder = LayerBuilder::default();
                        builder.entry.queryable = attr_value(&e, "queryable")
                            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                            .unwrap_or(false);
                        stack.push(builder);
                    }
                    "Style" if !stack.is_empty() => {
                        current_style = Some(WmsStyleEntry::default());
                    }
                    "BoundingBox" => {
                        if let Some(builder) = stack.last_mut() {
                            if let Some(bbox) = crs_bbox_from_attrs(&e) {
                                builder.entry.bboxes.push(bbox);
                            }
                        }
                    }
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                // Self-closing <BoundingBox .../> is the common form.
                if local_name(e.name()) == "BoundingBox" {
                    if let Some(builder) = stack.last_mut() {
                        if let Some(bbox) = crs_bbox_from_attrs(&e) {
                            builder.entry.bboxes.push(bbox);
                        }
                    }
                }
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
                let in_style = current_style.is_some();

                if stack.is_empty() {
                    if element == "Title" && path.iter().any(|p| p == "Service") {
                        doc.service_title = Some(text);
                    }
                    continue;
                }

                match (element, in_style) {
                    ("Name", true) => {
                        if let Some(style) = current_style.as_mut() {
                            style.name = text;
                        }
                    }
                    ("Title", true) => {
                        if let Some(style) = current_style.as_mut() {
                            style.title = Some(text);
                        }
                    }
                    ("Abstract", true) => {
                        if let Some(style) = current_style.as_mut() {
                            style.abstract_text = Some(text);
                        }
                    }
                    ("Name", false) => {
                        if let Some(builder) = stack.last_mut() {
                            builder.entry.name = text;
                        }
                    }
                    ("Title", false) => {
                        if let Some(builder) = stack.last_mut() {
                            builder.entry.title = Some(text);
                        }
                    }
                    ("Abstract", false) => {
                        if let Some(builder) = stack.last_mut() {
                            builder.entry.abstract_text = Some(text);
                        }
                    }
                    ("CRS", _) | ("SRS", _) => {
                        if let Some(builder) = stack.last_mut() {
                            if let Some(crs) = normalize_crs(Some(&text)) {
                                builder.entry.crs_list.push(crs);
                            }
                        }
                    }
                    ("westBoundLongitude", _) => set_coord(&mut stack, &text, |b, v| b.west = Some(v)),
                    ("eastBoundLongitude", _) => set_coord(&mut stack, &text, |b, v| b.east = Some(v)),
                    ("southBoundLatitude", _) => set_coord(&mut stack, &text, |b, v| b.south = Some(v)),
                    ("northBoundLatitude", _) => set_coord(&mut stack, &text, |b, v| b.north = Some(v)),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let name = local_name(e.name());
                path.pop();
                match name.as_str() {
                    "Layer" => {
                        if let Some(builder) = stack.pop() {
                            if let Some(entry) = builder.finish() {
                                doc.layers.push(entry);
                            }
                        }
                    }
                    "Style" => {
                        if let (Some(style), Some(builder)) = (current_style.take(), stack.last_mut())
                        {
                            if !style.name.is_empty() {
                                builder.entry.styles.push(style);
                            }
                        }
                    }
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

fn attr_value(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        if attr.key.local_name().as_ref() == key.as_bytes() {
            attr.unescape_value().ok().map(|v| v.to_string())
        } else {
            None
        }
    })
}

fn crs_bbox_from_attrs(e: &BytesStart<'_>) -> Option<CrsBoundingBox> {
    let crs = attr_value(e, "CRS").or_else(|| attr_value(e, "SRS"))?;
    let parse = |k: &str| attr_value(e, k).and_then(|v| v.parse::<f64>().ok());
    Some(CrsBoundingBox {
        crs: normalize_crs(Some(&crs)).unwrap_or(crs),
        bbox: BoundingBox::new(parse("minx")?, parse("miny")?, parse("maxx")?, parse("maxy")?),
    })
}

fn set_coord(stack: &mut [LayerBuilder], text: &str, apply: impl FnOnce(&mut LayerBuilder, f64)) {
    if let (Some(builder), Ok(value)) = (stack.last_mut(), text.parse::<f64>()) {
        apply(builder, value);
    }
}

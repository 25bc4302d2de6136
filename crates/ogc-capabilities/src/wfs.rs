//! WFS capabilities parsing (1.1.0 and 2.0.0).

use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;

use ogc_common::{normalize_crs, BoundingBox, OgcError, OgcResult};

use crate::document::{WfsCapabilities, WfsFeatureTypeEntry};

#[derive(Default)]
struct FeatureTypeBuilder {
    entry: WfsFeatureTypeEntry,
    lower_corner: Option<(f64, f64)>,
    upper_corner: Option<(f64, f64)>,
}

impl FeatureTypeBuilder {
    fn finish(mut self) -> Option<WfsFeatureTypeEntry> {
        if self.entry.name.is_empty() {
            return None;
        }
        if let (Some((minx, miny)), Some((maxx, maxy))) = (self.lower_corner, self.upper_corner) {
            self.entry.wgs84_bbox = Some(BoundingBox::new(minx, miny, maxx, maxy));
        }
        Some(self.entry)
    }
}

/// Parse a WFS capabilities document into feature type entries.
pub fn parse_wfs_capabilities(xml: &str) -> OgcResult<WfsCapabilities> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<FeatureTypeBuilder> = None;
    let mut doc = WfsCapabilities::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(e.name());
                if name == "FeatureType" {
                    current = Some(FeatureTypeBuilder::default());
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

                let Some(builder) = current.as_mut() else {
                    if element == "Title" && path.iter().any(|p| p == "ServiceIdentification") {
                        doc.service_title = Some(text);
                    }
                    continue;
                };

                match element {
                    "Name" => builder.entry.name = text,
                    "Title" => builder.entry.title = Some(text),
                    "Abstract" => builder.entry.abstract_text = Some(text),
                    "DefaultCRS" | "DefaultSRS" => {
                        builder.entry.default_crs = normalize_crs(Some(&text));
                    }
                    "OtherCRS" | "OtherSRS" => {
                        if let Some(crs) = normalize_crs(Some(&text)) {
                            builder.entry.other_crs.push(crs);
                        }
                    }
                    "LowerCorner" => builder.lower_corner = parse_corner(&text),
                    "UpperCorner" => builder.upper_corner = parse_corner(&text),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                path.pop();
                if local_name(e.name()) == "FeatureType" {
                    if let Some(entry) = current.take().and_then(FeatureTypeBuilder::finish) {
                        doc.feature_types.push(entry);
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

    Ok(doc)
}

fn local_name(name: QName<'_>) -> String {
    String::from_utf8_lossy(name.local_name().as_ref()).to_string()
}

// "lon lat" corner string from ows:LowerCorner / ows:UpperCorner.
fn parse_corner(text: &str) -> Option<(f64, f64)> {
    let mut parts = text.split_whitespace();
    let x = parts.next()?.parse::<f64>().ok()?;
    let y = parts.next()?.parse::<f64>().ok()?;
    Some((x, y))
}

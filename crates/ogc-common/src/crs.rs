//! Coordinate reference system identifier normalization.
//!
//! Capability documents carry CRS identifiers in several dressings:
//! plain "EPSG:4326", URN form "urn:ogc:def:crs:EPSG::4326", or bare
//! authority/code pairs. Consumers want one canonical "EPSG:<code>" form.

/// Normalize a CRS identifier to `EPSG:<code>` where an EPSG code can be
/// found in the input; otherwise the input is returned unchanged. Never
/// fails: `None` in, `None` out.
pub fn normalize_crs(crs: Option<&str>) -> Option<String> {
    let raw = crs?;
    if let Some(code) = extract_epsg_code(raw) {
        return Some(format!("EPSG:{}", code));
    }
    Some(raw.to_string())
}

/// Scan for `EPSG` followed by one or two colons and a digit run.
fn extract_epsg_code(s: &str) -> Option<&str> {
    let idx = s.find("EPSG")?;
    let rest = &s[idx + 4..];
    let rest = rest.strip_prefix("::").or_else(|| rest.strip_prefix(':'))?;
    let digits_end = rest
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit())
        .count();
    if digits_end == 0 {
        return None;
    }
    Some(&rest[..digits_end])
}

/// Pick the default CRS for a layer: EPSG:4326 when offered, else the
/// first entry of the (already normalized) list.
pub fn default_crs(crs_list: &[String]) -> String {
    if crs_list.iter().any(|c| c == "EPSG:4326") {
        "EPSG:4326".to_string()
    } else {
        crs_list
            .first()
            .cloned()
            .unwrap_or_else(|| "EPSG:4326".to_string())
    }
}

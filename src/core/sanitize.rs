// src/core/sanitize.rs
// Text clean-up for value fragments as the controller serves them:
// Latin-1 pages decoded as UTF-8 (and vice versa), German decimal commas, nbsp padding.

/// `Â°` / stray `Â` is what a degree sign looks like after a double decode.
pub fn repair_degree_sign(s: &str) -> String {
    s.replace("Â°", "°").replace('Â', "°")
}

pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ").replace('\u{a0}', " ").replace("&amp;", "&")
}

/// Trim, turn nbsp into spaces and drop a leading newline.
pub fn normalize_space(s: &str) -> String {
    let s = normalize_entities(s);
    let s = s.trim_start_matches(['\r', '\n']);
    s.trim().to_string()
}

/// German `61,9` → `61.9`; Unicode minus → ASCII hyphen.
pub fn normalize_decimal(s: &str) -> String {
    s.replace(',', ".").replace('\u{2212}', "-")
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Decode bytes of a controller export. Valid UTF-8 is taken as is;
/// anything else is treated as ISO-8859-1, which maps byte-for-byte onto chars.
pub fn decode_latin1_fallback(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => e.into_bytes().iter().map(|&b| char::from(b)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_sign_repair_variants() {
        assert_eq!(repair_degree_sign("61.9 Â°C"), "61.9 °C");
        assert_eq!(repair_degree_sign("9 W/mÂ²"), "9 W/m°²");
        assert_eq!(repair_degree_sign("61.9 °C"), "61.9 °C");
    }

    #[test]
    fn space_normalization() {
        assert_eq!(normalize_space("\n 61,9\u{a0}°C  "), "61,9 °C");
        assert_eq!(normalize_space("&nbsp;AUS"), "AUS");
    }

    #[test]
    fn decimal_normalization() {
        assert_eq!(normalize_decimal("\u{2212} 5,0"), "- 5.0");
        assert_eq!(normalize_decimal("-59,4 kWh"), "-59.4 kWh");
    }

    #[test]
    fn ws_collapses() {
        assert_eq!(normalize_ws("  AUTO \n\t 0,0 %  "), "AUTO 0,0 %");
    }

    #[test]
    fn latin1_fallback() {
        assert_eq!(decode_latin1_fallback(b"K\xfcche".to_vec()), "Küche");
        assert_eq!(decode_latin1_fallback("Küche".as_bytes().to_vec()), "Küche");
    }
}

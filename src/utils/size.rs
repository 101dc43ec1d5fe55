use regex::Regex;
use std::sync::OnceLock;

/// A size range in meters extracted from free text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRange {
    pub min: f64,
    pub max: f64,
}

fn size_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(\d+(?:\.\d+)?)(?:\s*(?:-|to)\s*(\d+(?:\.\d+)?))?\s*(millimeters?|millimetres?|mm|centimeters?|centimetres?|cm|kilometers?|kilometres?|km|meters?|metres?|m)\b",
        )
        .unwrap_or_else(|e| panic!("invalid size regex: {e}"))
    })
}

fn unit_in_meters(unit: &str) -> f64 {
    let unit = unit.to_lowercase();
    if unit.starts_with("mm") || unit.starts_with("milli") {
        0.001
    } else if unit.starts_with("cm") || unit.starts_with("centi") {
        0.01
    } else if unit.starts_with("km") || unit.starts_with("kilo") {
        1000.0
    } else {
        1.0
    }
}

/// Find the first size mention ("15 cm", "1.5-2 m", "3 to 4 meters")
pub fn parse_size(text: &str) -> Option<SizeRange> {
    let caps = size_regex().captures(text)?;
    let scale = unit_in_meters(caps.get(3)?.as_str());
    let first: f64 = caps.get(1)?.as_str().parse().ok()?;
    let second: f64 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => first,
    };
    Some(SizeRange {
        min: first.min(second) * scale,
        max: first.max(second) * scale,
    })
}

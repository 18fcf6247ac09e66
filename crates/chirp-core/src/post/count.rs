use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};

lazy_static! {
    static ref COMPACT_COUNT: Regex =
        Regex::new(r"^(\d+(?:\.\d+)?)\s*([KkMmBb])?$").expect("valid count regex");
}

/// Parse a compact count label such as `"842"`, `"1,024"`, `"1.2K"` or `"3M"`.
///
/// An empty label means zero. Anything else unparsable yields `None`.
pub fn parse_count(label: &str) -> Option<u64> {
    let cleaned: String = label.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Some(0);
    }

    let caps = COMPACT_COUNT.captures(&cleaned)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_uppercase()) {
        Some(ref s) if s == "K" => 1_000.0,
        Some(ref s) if s == "M" => 1_000_000.0,
        Some(ref s) if s == "B" => 1_000_000_000.0,
        _ => 1.0,
    };

    Some((value * multiplier).round() as u64)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Number(u64),
    Label(String),
}

/// Accept either a plain integer or a display label
pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawCount::deserialize(deserializer)? {
        RawCount::Number(n) => Ok(n),
        RawCount::Label(label) => parse_count(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid count label '{}'", label))),
    }
}

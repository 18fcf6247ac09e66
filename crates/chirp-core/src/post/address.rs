use url::Url;

const FALLBACK_BASE: &str = "https://x.com/";

/// Extract the post id from its address.
///
/// Prefers the segment following `/status/`; otherwise the last non-empty path
/// segment. Relative addresses (`/alice/status/42`) resolve against the
/// platform origin.
pub fn post_id_from_address(address: &str) -> Option<String> {
    let address = address.trim();
    if address.is_empty() {
        return None;
    }

    let url = match Url::parse(address) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(FALLBACK_BASE).ok()?.join(address).ok()?
        }
        Err(e) => {
            tracing::debug!("Unparsable post address '{}': {}", address, e);
            return None;
        }
    };

    let segments: Vec<&str> = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();

    let id = segments
        .iter()
        .position(|segment| *segment == "status")
        .and_then(|idx| segments.get(idx + 1))
        .or_else(|| segments.last())?;

    Some((*id).to_string())
}

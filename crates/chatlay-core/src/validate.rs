use url::Url;

use crate::Error;

/// Parses `raw` and requires both a scheme and a non-empty host.
pub fn validate_url(raw: &str) -> Result<Url, Error> {
    let invalid = |reason: String| Error::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.scheme().is_empty() {
        return Err(invalid("missing scheme".into()));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid("missing host".into())),
    }
}

// Canonical host keys

use crate::error::{DiscoveryError, Result};
use url::Url;

const SCHEMES: [&str; 2] = ["https://", "http://"];

/// Canonicalize a free-form address into a host key.
///
/// Strips surrounding whitespace, a leading `http://` or `https://` and a
/// trailing `/`, repeating until nothing changes, then lowercases what is
/// left. Normalizing an already-normalized key is a no-op. No DNS, no
/// validation.
pub fn normalize(address: &str) -> String {
    let mut key = address;
    loop {
        let next = strip_once(key);
        if next == key {
            return next.to_ascii_lowercase();
        }
        key = next;
    }
}

fn strip_once(key: &str) -> &str {
    let key = key.trim();
    let key = SCHEMES
        .iter()
        .find(|&&scheme| {
            key.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
        .map_or(key, |scheme| &key[scheme.len()..]);
    key.strip_suffix('/').unwrap_or(key)
}

/// Normalize `address` and check that what is left is a bare host (with an
/// optional port). This is the gate in front of every discovery request.
pub fn parse_host(address: &str) -> Result<String> {
    let key = normalize(address);
    let invalid = || DiscoveryError::InvalidHost(address.trim().to_string());

    if key.is_empty() || key.contains("://") || key.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let url = Url::parse(&format!("https://{}", key)).map_err(|_| invalid())?;

    if url.host_str().is_none_or(str::is_empty)
        || url.path() != "/"
        || url.query().is_some()
        || url.fragment().is_some()
        || !url.username().is_empty()
        || url.password().is_some()
        || key.contains('/')
    {
        return Err(invalid());
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_scheme_and_slash() {
        assert_eq!(normalize("https://mastodon.social/"), "mastodon.social");
        assert_eq!(normalize("http://mastodon.social"), "mastodon.social");
        assert_eq!(normalize("HTTPS://Mastodon.social"), "mastodon.social");
    }

    #[test]
    fn test_normalize_reaches_a_fixpoint() {
        assert_eq!(normalize("example.social//"), "example.social");
        assert_eq!(normalize("https://http://example.social"), "example.social");
    }

    #[test]
    fn test_parse_host_rejects_paths() {
        assert!(parse_host("https://example.social/about").is_err());
        assert!(parse_host("example.social/@alice").is_err());
    }
}

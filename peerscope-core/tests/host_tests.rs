// Tests for host key normalization and validation

use peerscope_core::DiscoveryError;
use peerscope_core::host::{normalize, parse_host};

// ============================================================================
// Normalization Tests
// ============================================================================

#[test]
fn test_normalize_bare_host_is_unchanged() {
    assert_eq!(normalize("example.social"), "example.social");
}

#[test]
fn test_normalize_strips_https() {
    assert_eq!(normalize("https://example.social"), "example.social");
}

#[test]
fn test_normalize_strips_http() {
    assert_eq!(normalize("http://example.social"), "example.social");
}

#[test]
fn test_normalize_strips_trailing_slash() {
    assert_eq!(normalize("https://example.social/"), "example.social");
}

#[test]
fn test_normalize_keeps_port() {
    assert_eq!(normalize("http://127.0.0.1:8080/"), "127.0.0.1:8080");
}

#[test]
fn test_normalize_trims_whitespace() {
    assert_eq!(normalize("  https://example.social/ \n"), "example.social");
}

#[test]
fn test_normalize_only_strips_leading_scheme() {
    assert_eq!(
        normalize("example.social/https://x"),
        "example.social/https://x"
    );
}

#[test]
fn test_normalize_folds_case() {
    assert_eq!(normalize("Mastodon.Social"), "mastodon.social");
    assert_eq!(normalize("https://MASTODON.social/"), normalize("mastodon.social"));
}

#[test]
fn test_normalize_is_idempotent() {
    let inputs = [
        "https://example.social/",
        "http://a.b.c:443",
        "example.social//",
        "HTTP://Loud.Social/",
        "  spaced.social / ",
        "",
    ];
    for input in inputs {
        let once = normalize(input);
        assert_eq!(normalize(&once), once, "input {:?}", input);
    }
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_parse_host_accepts_urls_and_bare_hosts() {
    assert_eq!(parse_host("https://mastodon.social").unwrap(), "mastodon.social");
    assert_eq!(parse_host("mastodon.social").unwrap(), "mastodon.social");
    assert_eq!(parse_host("http://localhost:3000/").unwrap(), "localhost:3000");
}

#[test]
fn test_parse_host_same_key_regardless_of_case() {
    assert_eq!(
        parse_host("HTTPS://Fosstodon.ORG").unwrap(),
        parse_host("fosstodon.org").unwrap()
    );
}

#[test]
fn test_parse_host_rejects_empty() {
    assert!(matches!(parse_host(""), Err(DiscoveryError::InvalidHost(_))));
    assert!(matches!(parse_host("https://"), Err(DiscoveryError::InvalidHost(_))));
}

#[test]
fn test_parse_host_rejects_other_schemes() {
    assert!(parse_host("ftp://example.social").is_err());
    assert!(parse_host("gopher://example.social/").is_err());
}

#[test]
fn test_parse_host_rejects_whitespace_inside() {
    assert!(parse_host("not a host").is_err());
}

#[test]
fn test_parse_host_rejects_query_and_fragment() {
    assert!(parse_host("example.social?x=1").is_err());
    assert!(parse_host("example.social#top").is_err());
}

#[test]
fn test_parse_host_rejects_userinfo() {
    assert!(parse_host("https://alice@example.social").is_err());
}

#[test]
fn test_parse_host_error_names_the_input() {
    let err = parse_host("ftp://nope").unwrap_err();
    assert!(err.to_string().contains("ftp://nope"));
}

#![allow(clippy::unwrap_used, clippy::panic, clippy::expect_used)]

//! The RFC 2396 bridge: conversions in both directions and the
//! equivalence relation, on both its shortcut and full paths.

use moor::Url;
use moor::rfc2396::{Rfc2396Url, encode_for_rfc2396, equivalent, from_rfc2396, to_rfc2396};

#[test]
fn test_to_2396_round_trips_byte_for_byte() {
    let inputs = [
        "http://example.com/",
        "https://user:pw@example.com:8080/a/b?q=1#frag",
        "http://127.0.0.1/x",
        "http://[2001:db8::1]:9000/p",
        "ftp://files.example.com/pub/",
        "file:///C:/dir/file.txt",
    ];
    for input in inputs {
        let url = Url::parse(input, None).unwrap();
        let bridged = to_rfc2396(&url).unwrap();
        let back = from_rfc2396(&bridged).unwrap();
        assert_eq!(back.href(), url.href(), "{input}");
        assert_eq!(back.structure(), url.structure(), "{input}");
    }
}

#[test]
fn test_projection_is_stable() {
    // Applying the projection twice changes nothing
    let url = Url::parse("http://example.com/a|b`c", None).unwrap();
    let once = encode_for_rfc2396(&url).unwrap();
    let reparsed = Url::parse(&once, None).unwrap();
    let twice = encode_for_rfc2396(&reparsed).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_projected_url_round_trips() {
    // A URL carrying 2396-disallowed bytes projects to an encoded form,
    // and that form round-trips exactly
    let url = Url::parse("sc://h/a|b", None).unwrap();
    let bridged = to_rfc2396(&url).unwrap();
    assert_eq!(bridged.absolute_string(), "sc://h/a%7Cb");

    let back = from_rfc2396(&bridged).unwrap();
    let projected = Url::parse("sc://h/a%7Cb", None).unwrap();
    assert_eq!(back, projected);
}

#[test]
fn test_2396_parser_is_strict() {
    // RFC 2396 has no percent-encoding fallback: raw disallowed bytes
    // are simply not a URL
    assert!(Rfc2396Url::parse("http://h/a b").is_none());
    assert!(Rfc2396Url::parse("http://h/a\\b").is_none());
    assert!(Rfc2396Url::parse("http://h:80x/").is_none());
}

#[test]
fn test_from_2396_verifies_components() {
    let bridged = Rfc2396Url::parse("http://example.com:8080/x?q#f").unwrap();
    let url = from_rfc2396(&bridged).unwrap();
    assert_eq!(url.href(), "http://example.com:8080/x?q#f");
}

#[test]
fn test_from_2396_normalization_still_equivalent() {
    // Obscure IPv4 forms normalize but stay equivalent
    let bridged = Rfc2396Url::parse("http://0x7F.1/x").unwrap();
    let url = from_rfc2396(&bridged).unwrap();
    assert_eq!(url.hostname(), "127.0.0.1");

    // Case-insensitive scheme and host
    let bridged = Rfc2396Url::parse("HTTP://EXAMPLE.COM/x").unwrap();
    let url = from_rfc2396(&bridged).unwrap();
    assert_eq!(url.href(), "http://example.com/x");
}

#[test]
fn test_from_2396_dot_segments() {
    let bridged = Rfc2396Url::parse("http://example.com/a/./b/../c").unwrap();
    let url = from_rfc2396(&bridged).unwrap();
    assert_eq!(url.pathname(), "/a/c");
}

#[test]
fn test_opaque_path_accepted_without_verification() {
    let bridged = Rfc2396Url::parse("mailto:user@example.com").unwrap();
    let url = from_rfc2396(&bridged).unwrap();
    assert!(url.has_opaque_path());

    let bridged = Rfc2396Url::parse("urn:isbn:0451450523").unwrap();
    let url = from_rfc2396(&bridged).unwrap();
    assert_eq!(url.pathname(), "isbn:0451450523");
}

#[test]
fn test_semicolon_paths_skip_the_path_check() {
    // The 2396 side cannot expose parameter components faithfully; the
    // inherited compromise is to skip, not to improve
    let bridged = Rfc2396Url::parse("http://example.com/a;p=1/b").unwrap();
    assert!(from_rfc2396(&bridged).is_some());
}

#[test]
fn test_special_query_apostrophes_allowed() {
    let bridged = Rfc2396Url::parse("http://example.com/x?a='v'").unwrap();
    let url = from_rfc2396(&bridged).unwrap();
    assert_eq!(url.search(), "?a=%27v%27");
}

#[test]
fn test_equivalence_is_symmetric_on_verified_components() {
    let pairs = [
        ("http://example.com/a", "http://example.com/a", true),
        ("http://example.com/a", "http://example.com/b", false),
        ("http://example.com/", "http://example.org/", false),
        ("http://example.com:81/", "http://example.com:82/", false),
    ];
    for (core_input, bridged_input, expected) in pairs {
        let url = Url::parse(core_input, None).unwrap();
        let bridged = Rfc2396Url::parse(bridged_input).unwrap();
        assert_eq!(
            equivalent(&url, &bridged, false),
            expected,
            "{core_input} vs {bridged_input}"
        );
    }
}

#[test]
fn test_shortcut_path_agrees_with_full_check() {
    // No '@', '?' or '#': the shortcut may skip those checks, and must
    // reach the same verdict as the full check
    let inputs = ["http://example.com/plain", "file:///C:/x", "ftp://h/"];
    for input in inputs {
        let url = Url::parse(input, None).unwrap();
        let bridged = Rfc2396Url::parse(input).unwrap();
        assert_eq!(
            equivalent(&url, &bridged, true),
            equivalent(&url, &bridged, false),
            "{input}"
        );
    }
}

#[test]
fn test_userinfo_compromise() {
    // An empty core username with a password corresponds to the 2396
    // empty-username form
    let url = Url::parse("http://:pw@example.com/", None).unwrap();
    let bridged = Rfc2396Url::parse("http://:pw@example.com/").unwrap();
    assert!(equivalent(&url, &bridged, false));
}

#[test]
fn test_port_elision_equivalence() {
    let url = Url::parse("https://example.com:443/", None).unwrap();
    let bridged = Rfc2396Url::parse("https://example.com:443/").unwrap();
    assert!(equivalent(&url, &bridged, false));
}

#[test]
fn test_failure_preferred_over_divergence() {
    // The projection refuses rather than producing a 2396 URL that
    // would mean something else
    let url = Url::parse("http://example.com/x", None).unwrap();
    let other = Rfc2396Url::parse("http://example.com/x?q").unwrap();
    assert!(!equivalent(&url, &other, false));
}

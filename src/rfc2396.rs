//! Bridging between WHATWG URLs and RFC 2396 URLs.
//!
//! Two lossless conversions plus the semantic equivalence check both
//! rely on. The check deliberately replicates the compromises of the
//! RFC 2396 side (the semicolon path skip, the `@?#` shortcut); it
//! prefers failure over returning a semantically diverged URL.

use crate::host::HostKind;
use crate::ipv4::parse_ipv4;
use crate::ipv6::parse_ipv6;
use crate::percent::percent_decode_bytes;
use crate::url::Url;

/// A URL parsed under RFC 2396 (with the RFC 2732 IPv6 literal
/// extension). Component accessors return the raw, still-escaped forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rfc2396Url {
    absolute: String,
    scheme: String,
    user: Option<String>,
    password: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl Rfc2396Url {
    /// Parse an absolute RFC 2396 URI reference.
    pub fn parse(input: &str) -> Option<Self> {
        // Scheme
        let colon = input.find(':')?;
        let scheme = &input[..colon];
        let mut scheme_bytes = scheme.bytes();
        if !scheme_bytes.next()?.is_ascii_alphabetic()
            || !scheme_bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
        {
            return None;
        }
        let rest = &input[colon + 1..];

        // Fragment, then query
        let (rest, fragment) = match rest.split_once('#') {
            Some((r, f)) => (r, Some(f.to_string())),
            None => (rest, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((r, q)) => (r, Some(q.to_string())),
            None => (rest, None),
        };

        let mut user = None;
        let mut password = None;
        let mut host = None;
        let mut port = None;
        let path;

        if let Some(after_slashes) = rest.strip_prefix("//") {
            let authority_end = after_slashes.find('/').unwrap_or(after_slashes.len());
            let authority = &after_slashes[..authority_end];
            path = after_slashes[authority_end..].to_string();

            let hostport = match authority.split_once('@') {
                Some((userinfo, hostport)) => {
                    match userinfo.split_once(':') {
                        Some((u, p)) => {
                            user = Some(u.to_string());
                            password = Some(p.to_string());
                        }
                        None => user = Some(userinfo.to_string()),
                    }
                    hostport
                }
                None => authority,
            };

            let (host_str, port_str) = if hostport.starts_with('[') {
                let bracket = hostport.find(']')?;
                let (h, rest) = hostport.split_at(bracket + 1);
                (h, rest.strip_prefix(':'))
            } else {
                match hostport.rsplit_once(':') {
                    Some((h, p)) => (h, Some(p)),
                    None => (hostport, None),
                }
            };

            if let Some(port_str) = port_str
                && !port_str.is_empty()
            {
                if !port_str.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                port = Some(port_str.parse().ok()?);
            }
            host = Some(host_str.to_string());
        } else {
            path = rest.to_string();
        }

        let url = Self {
            absolute: input.to_string(),
            scheme: scheme.to_string(),
            user,
            password,
            host,
            port,
            path,
            query,
            fragment,
        };
        url.validate_characters().then_some(url)
    }

    /// RFC 2396 (+2732) character validation over the whole string.
    fn validate_characters(&self) -> bool {
        let bytes = self.absolute.as_bytes();
        let host_range = self.host_byte_range();
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            match b {
                0x00..=0x20 | 0x7F.. => return false,
                b'"' | b'<' | b'>' | b'{' | b'}' | b'|' | b'\\' | b'^' | b'`' => return false,
                b'[' | b']' => {
                    // Only the IPv6 literal delimiters may appear raw
                    let in_host = host_range
                        .as_ref()
                        .is_some_and(|range| range.contains(&i));
                    if !in_host {
                        return false;
                    }
                }
                b'%' => {
                    if i + 2 >= bytes.len()
                        || !bytes[i + 1].is_ascii_hexdigit()
                        || !bytes[i + 2].is_ascii_hexdigit()
                    {
                        return false;
                    }
                    i += 2;
                }
                _ => {}
            }
            i += 1;
        }
        true
    }

    fn host_byte_range(&self) -> Option<core::ops::Range<usize>> {
        let host = self.host.as_ref()?;
        if !host.starts_with('[') {
            return None;
        }
        let start = self.absolute.find(host.as_str())?;
        Some(start..start + host.len())
    }

    pub fn absolute_string(&self) -> &str {
        &self.absolute
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }
}

/// Percent-encode the characters RFC 2396 disallows but the WHATWG form
/// may carry raw: `#` (except the fragment delimiter), `%` (except in a
/// valid escape), `[`/`]` (except an IPv6 literal host), and
/// `{ } \ ^ \` |`.
///
/// Returns `None` for URLs whose domain host carries any of these:
/// hostnames cannot safely hold percent-encoding.
pub fn encode_for_rfc2396(url: &Url) -> Option<String> {
    let s = url.href().as_bytes();
    let structure = url.structure();

    if structure.host_kind == HostKind::Domain
        && url
            .hostname()
            .bytes()
            .any(|b| matches!(b, b'#' | b'%' | b'[' | b']' | b'{' | b'}' | b'\\' | b'^' | b'`' | b'|'))
    {
        return None;
    }

    let fragment_delimiter = if structure.fragment_end > structure.query_end {
        Some(structure.query_end as usize)
    } else {
        None
    };
    let ipv6_host = structure.host_kind == HostKind::Ipv6;
    let host_start = structure.host_start as usize;
    let host_end = structure.host_end as usize;

    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        let b = s[i];
        let keep = match b {
            b'#' => fragment_delimiter == Some(i),
            b'%' => {
                i + 2 < s.len() && s[i + 1].is_ascii_hexdigit() && s[i + 2].is_ascii_hexdigit()
            }
            b'[' => ipv6_host && i == host_start,
            b']' => ipv6_host && i + 1 == host_end,
            b'{' | b'}' | b'\\' | b'^' | b'`' | b'|' => false,
            _ => true,
        };
        if keep {
            out.push(b as char);
        } else {
            crate::percent::percent_encode_byte_into(&mut out, b);
        }
        i += 1;
    }
    Some(out)
}

/// Project a WHATWG URL into its RFC 2396 form.
///
/// The projected string parses under both standards; equivalence is
/// verified before returning.
pub fn to_rfc2396(url: &Url) -> Option<Rfc2396Url> {
    let projected = encode_for_rfc2396(url)?;
    let bridged = Rfc2396Url::parse(&projected)?;
    let reparsed = Url::parse(&projected, None).ok()?;
    equivalent(&reparsed, &bridged, true).then_some(bridged)
}

/// Parse an RFC 2396 URL under the WHATWG rules, verifying the result
/// still means the same thing.
pub fn from_rfc2396(bridged: &Rfc2396Url) -> Option<Url> {
    let url = Url::parse(bridged.absolute_string(), None).ok()?;
    // Opaque paths cannot be decomposed through the 2396 accessors, so
    // they are accepted without per-component verification
    if url.has_opaque_path() {
        return Some(url);
    }
    equivalent(&url, bridged, false).then_some(url)
}

/// The semantic equivalence relation between the two models.
///
/// `shortcut` is only sound when the 2396 URL was produced from the
/// core URL's own serialization.
pub fn equivalent(url: &Url, bridged: &Rfc2396Url, shortcut: bool) -> bool {
    if !url.scheme().eq_ignore_ascii_case(bridged.scheme()) {
        return false;
    }

    let serialization = url.href();
    let skip_userinfo = shortcut && !serialization.contains('@') && !url.has_credentials();
    let skip_query = shortcut && !serialization.contains('?') && url.search().is_empty();
    let skip_fragment = shortcut && !serialization.contains('#') && url.hash().is_empty();

    if !skip_userinfo && !userinfo_equivalent(url, bridged) {
        return false;
    }

    if !host_equivalent(url, bridged) {
        return false;
    }

    // The core elides the scheme's default port
    let default = url.scheme_type().default_port();
    let port_matches = match (url.port_number(), bridged.port()) {
        (a, b) if a == b => true,
        (None, Some(p)) => Some(p) == default,
        _ => false,
    };
    if !port_matches {
        return false;
    }

    if !path_equivalent(url, bridged) {
        return false;
    }

    if !skip_query {
        let bridged_query = bridged.query().unwrap_or("");
        let core_query = url.search().strip_prefix('?').unwrap_or("");
        let adjusted;
        let bridged_query = if url.is_special() && bridged_query.contains('\'') {
            adjusted = bridged_query.replace('\'', "%27");
            &adjusted
        } else {
            bridged_query
        };
        if core_query != bridged_query {
            return false;
        }
    }

    if !skip_fragment {
        let bridged_fragment = bridged.fragment().unwrap_or("");
        let core_fragment = url.hash().strip_prefix('#').unwrap_or("");
        if core_fragment != bridged_fragment {
            return false;
        }
    }

    true
}

fn userinfo_equivalent(url: &Url, bridged: &Rfc2396Url) -> bool {
    let core_user = percent_decode_bytes(url.username());
    let core_password = percent_decode_bytes(url.password());
    let bridged_user = percent_decode_bytes(bridged.user().unwrap_or(""));
    let bridged_password = percent_decode_bytes(bridged.password().unwrap_or(""));

    if core_password != bridged_password {
        return false;
    }
    if core_user == bridged_user {
        return true;
    }
    // An absent core username may show up as an empty 2396 username
    // when a password is present
    core_user.is_empty() && bridged_user.is_empty() && !bridged_password.is_empty()
}

fn host_equivalent(url: &Url, bridged: &Rfc2396Url) -> bool {
    let bridged_host = bridged.host();
    match url.host_kind() {
        HostKind::None => bridged_host.is_none_or(str::is_empty),
        HostKind::Empty => bridged_host.unwrap_or("").is_empty(),
        HostKind::Domain => bridged_host
            .is_some_and(|h| h.eq_ignore_ascii_case(url.hostname())),
        HostKind::Ipv4 => match (parse_ipv4(url.hostname()), bridged_host.map(parse_ipv4)) {
            (Ok(a), Some(Ok(b))) => a == b,
            _ => false,
        },
        HostKind::Ipv6 => match (parse_ipv6(url.hostname()), bridged_host.map(parse_ipv6)) {
            (Ok(a), Some(Ok(b))) => a == b,
            _ => false,
        },
        HostKind::Opaque => bridged_host.is_some_and(|h| {
            percent_decode_bytes(h) == percent_decode_bytes(url.hostname())
        }),
    }
}

fn path_equivalent(url: &Url, bridged: &Rfc2396Url) -> bool {
    let bridged_path = bridged.path();

    // The 2396 side mutilates parameter components; the check is
    // skipped rather than improved
    if bridged_path.contains(';') {
        return true;
    }

    simplify_2396_path(bridged_path, url) == url.pathname()
}

/// Apply the WHATWG dot-segment resolution (and the `file:` drive
/// quirk) to a 2396 path, without touching its escaping.
fn simplify_2396_path(path: &str, url: &Url) -> String {
    if path.is_empty() {
        return if url.is_special() {
            "/".to_string()
        } else {
            String::new()
        };
    }
    if !path.starts_with('/') {
        return path.to_string();
    }

    let is_file = url.scheme_type().is_file();
    let mut segments: Vec<&str> = Vec::new();
    let raw: Vec<&str> = path[1..].split('/').collect();
    for (i, segment) in raw.iter().enumerate() {
        let last = i + 1 == raw.len();
        let is_dot = *segment == "." || segment.eq_ignore_ascii_case("%2e");
        let is_dotdot = *segment == ".."
            || segment.eq_ignore_ascii_case(".%2e")
            || segment.eq_ignore_ascii_case("%2e.")
            || segment.eq_ignore_ascii_case("%2e%2e");
        if is_dotdot {
            let keep_drive = is_file
                && segments.len() == 1
                && crate::helpers::is_normalized_windows_drive_letter(segments[0]);
            if !keep_drive {
                segments.pop();
            }
            if last {
                segments.push("");
            }
        } else if is_dot {
            if last {
                segments.push("");
            }
        } else {
            segments.push(segment);
        }
    }

    let mut out = String::with_capacity(path.len());
    for segment in &segments {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_2396_parse_components() {
        let url = Rfc2396Url::parse("http://user:pw@example.com:8080/a/b?q=1#frag").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.user(), Some("user"));
        assert_eq!(url.password(), Some("pw"));
        assert_eq!(url.host(), Some("example.com"));
        assert_eq!(url.port(), Some(8080));
        assert_eq!(url.path(), "/a/b");
        assert_eq!(url.query(), Some("q=1"));
        assert_eq!(url.fragment(), Some("frag"));
    }

    #[test]
    fn test_2396_rejects_raw_forbidden_characters() {
        assert!(Rfc2396Url::parse("http://example.com/a b").is_none());
        assert!(Rfc2396Url::parse("http://example.com/a{b}").is_none());
        assert!(Rfc2396Url::parse("http://example.com/a%2").is_none());
        assert!(Rfc2396Url::parse("http://example.com/a^b").is_none());
        assert!(Rfc2396Url::parse("no-scheme").is_none());
    }

    #[test]
    fn test_2396_ipv6_host() {
        let url = Rfc2396Url::parse("http://[2001:db8::1]:8080/x").unwrap();
        assert_eq!(url.host(), Some("[2001:db8::1]"));
        assert_eq!(url.port(), Some(8080));
    }

    #[test]
    fn test_projection_encodes_disallowed() {
        let url = Url::parse("http://example.com/a{b}|c", None).unwrap();
        let projected = encode_for_rfc2396(&url).unwrap();
        assert_eq!(projected, "http://example.com/a%7Bb%7D%7Cc");
    }

    #[test]
    fn test_projection_keeps_structure() {
        let url = Url::parse("http://[::1]/p?q#f", None).unwrap();
        let projected = encode_for_rfc2396(&url).unwrap();
        // IPv6 brackets and the fragment delimiter survive
        assert_eq!(projected, "http://[::1]/p?q#f");
    }

    #[test]
    fn test_projection_encodes_stray_percent() {
        let url = Url::parse("http://example.com/100%25ok", None).unwrap();
        let projected = encode_for_rfc2396(&url).unwrap();
        // A valid escape is untouched
        assert_eq!(projected, "http://example.com/100%25ok");
    }

    #[test]
    fn test_round_trip() {
        for input in [
            "http://example.com/",
            "https://user:pw@example.com:8080/a/b?q=1#frag",
            "http://127.0.0.1/x",
            "http://[2001:db8::1]/x",
            "ftp://files.example.com/pub/",
        ] {
            let url = Url::parse(input, None).unwrap();
            let bridged = to_rfc2396(&url).unwrap();
            let back = from_rfc2396(&bridged).unwrap();
            assert_eq!(back, url, "round trip for {input}");
        }
    }

    #[test]
    fn test_from_2396_normalizes_ipv4_forms() {
        // The 2396 side may carry an obscure IPv4 spelling; equivalence
        // compares the 32-bit values
        let bridged = Rfc2396Url::parse("http://0x7F.0.0.1/x").unwrap();
        let url = from_rfc2396(&bridged).unwrap();
        assert_eq!(url.hostname(), "127.0.0.1");
    }

    #[test]
    fn test_from_2396_opaque_path_skips_verification() {
        let bridged = Rfc2396Url::parse("mailto:user@example.com").unwrap();
        let url = from_rfc2396(&bridged).unwrap();
        assert_eq!(url.href(), "mailto:user@example.com");
    }

    #[test]
    fn test_semicolon_path_check_is_skipped() {
        // Parameter components on the 2396 side exempt the path check
        let bridged = Rfc2396Url::parse("http://example.com/a;v=1/b").unwrap();
        assert!(from_rfc2396(&bridged).is_some());
    }

    #[test]
    fn test_equivalence_rejects_divergence() {
        let url = Url::parse("http://example.com/a", None).unwrap();
        let other = Rfc2396Url::parse("http://example.com/b").unwrap();
        assert!(!equivalent(&url, &other, false));

        let other_host = Rfc2396Url::parse("http://example.org/a").unwrap();
        assert!(!equivalent(&url, &other_host, false));
    }

    #[test]
    fn test_equivalence_port_elision() {
        let url = Url::parse("http://example.com:80/", None).unwrap();
        assert_eq!(url.port(), "");
        let bridged = Rfc2396Url::parse("http://example.com:80/").unwrap();
        assert!(equivalent(&url, &bridged, false));
    }

    #[test]
    fn test_shortcut_and_non_shortcut_agree() {
        let url = Url::parse("http://example.com/plain", None).unwrap();
        let bridged = Rfc2396Url::parse("http://example.com/plain").unwrap();
        assert!(equivalent(&url, &bridged, true));
        assert!(equivalent(&url, &bridged, false));
    }
}

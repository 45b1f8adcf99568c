//! Host parsing: dispatch among IPv6 literals, IPv4 literals, IDNA
//! domains and opaque hosts.

use crate::error::{ParseError, Result};
use crate::idna;
use crate::ipv4::{looks_like_ipv4, parse_ipv4, serialize_ipv4};
use crate::ipv6::{parse_ipv6, serialize_ipv6};
use crate::percent::{C0_SPACE_SET, has_valid_percent_sequences, percent_decode_utf8};
use crate::scheme::SchemeType;

/// What the hostname slice of a URL holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostKind {
    /// No authority at all
    #[default]
    None,
    /// An authority with an empty host (`file:///`, `foo://@/`)
    Empty,
    /// An ASCII domain
    Domain,
    /// An IPv4 address, serialized as dotted decimal
    Ipv4,
    /// An IPv6 address, serialized in brackets
    Ipv6,
    /// An opaque (non-special-scheme) host
    Opaque,
}

/// Semantic projection of the hostname slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Host {
    Empty,
    Domain(String),
    Ipv4(u32),
    Ipv6([u16; 8]),
    Opaque(String),
}

impl Host {
    /// Rebuild the semantic host from a serialized hostname slice.
    pub(crate) fn from_serialization(kind: HostKind, hostname: &str) -> Option<Self> {
        match kind {
            HostKind::None => None,
            HostKind::Empty => Some(Self::Empty),
            HostKind::Domain => Some(Self::Domain(hostname.to_string())),
            HostKind::Ipv4 => parse_ipv4(hostname).ok().map(Self::Ipv4),
            HostKind::Ipv6 => parse_ipv6(hostname).ok().map(Self::Ipv6),
            HostKind::Opaque => Some(Self::Opaque(hostname.to_string())),
        }
    }
}

impl core::fmt::Display for Host {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Domain(domain) => f.write_str(domain),
            Self::Ipv4(address) => f.write_str(&serialize_ipv4(*address)),
            Self::Ipv6(pieces) => write!(f, "[{}]", serialize_ipv6(pieces)),
            Self::Opaque(host) => f.write_str(host),
        }
    }
}

/// A parsed host, normalized and ready for the serialization buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedHost {
    pub(crate) serialization: String,
    pub(crate) kind: HostKind,
}

/// Forbidden in opaque hosts.
fn is_forbidden_host_byte(b: u8) -> bool {
    matches!(
        b,
        0x00 | b'\t'
            | b'\n'
            | b'\r'
            | b' '
            | b'#'
            | b'/'
            | b':'
            | b'<'
            | b'>'
            | b'?'
            | b'@'
            | b'['
            | b'\\'
            | b']'
            | b'^'
            | b'|'
    )
}

/// Parse a hostname per the WHATWG host parser.
///
/// `input` is the raw hostname slice (no port, brackets still present for
/// IPv6 literals).
pub(crate) fn parse_host(input: &str, scheme: SchemeType) -> Result<ParsedHost> {
    if input.starts_with('[') {
        if !input.ends_with(']') {
            return Err(ParseError::InvalidIpv6);
        }
        let pieces = parse_ipv6(input)?;
        return Ok(ParsedHost {
            serialization: format!("[{}]", serialize_ipv6(&pieces)),
            kind: HostKind::Ipv6,
        });
    }

    if !scheme.is_special() {
        return parse_opaque_host(input);
    }

    if input.is_empty() {
        // The state machine rejects this for special non-file schemes
        return Ok(ParsedHost {
            serialization: String::new(),
            kind: HostKind::Empty,
        });
    }

    // Percent-decode before the IDNA transformation
    let decoded = if input.contains('%') {
        if !has_valid_percent_sequences(input) {
            return Err(ParseError::InvalidHost);
        }
        percent_decode_utf8(input).ok_or(ParseError::InvalidHost)?
    } else {
        input.to_string()
    };

    let ascii = idna::domain_to_ascii(&decoded)?;

    // A numeric last label makes the whole host an IPv4 literal, and a
    // malformed one is fatal
    if looks_like_ipv4(&ascii) {
        let address = parse_ipv4(&ascii)?;
        return Ok(ParsedHost {
            serialization: serialize_ipv4(address),
            kind: HostKind::Ipv4,
        });
    }

    Ok(ParsedHost {
        serialization: ascii,
        kind: HostKind::Domain,
    })
}

fn parse_opaque_host(input: &str) -> Result<ParsedHost> {
    if input.is_empty() {
        return Ok(ParsedHost {
            serialization: String::new(),
            kind: HostKind::Empty,
        });
    }

    if input
        .bytes()
        .any(|b| b.is_ascii() && is_forbidden_host_byte(b))
    {
        return Err(ParseError::InvalidHost);
    }

    let mut serialization = String::with_capacity(input.len());
    crate::percent::percent_encode_into(&mut serialization, input, C0_SPACE_SET);

    Ok(ParsedHost {
        serialization,
        kind: HostKind::Opaque,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn special(input: &str) -> Result<ParsedHost> {
        parse_host(input, SchemeType::Http)
    }

    fn opaque(input: &str) -> Result<ParsedHost> {
        parse_host(input, SchemeType::NotSpecial)
    }

    #[test]
    fn test_domain() {
        let host = special("Example.COM").unwrap();
        assert_eq!(host.serialization, "example.com");
        assert_eq!(host.kind, HostKind::Domain);
    }

    #[test]
    fn test_idn_domain() {
        let host = special("bücher.de").unwrap();
        assert_eq!(host.serialization, "xn--bcher-kva.de");
        assert_eq!(host.kind, HostKind::Domain);
    }

    #[test]
    fn test_ipv4_literal() {
        let host = special("127.0.0.1").unwrap();
        assert_eq!(host.serialization, "127.0.0.1");
        assert_eq!(host.kind, HostKind::Ipv4);

        // Alternate bases normalize
        assert_eq!(special("0x7F.1").unwrap().serialization, "127.0.0.1");
    }

    #[test]
    fn test_percent_decoded_ipv4() {
        // %31 -> '1', %2e -> '.'
        let host = special("%3127%2e0%2e0%2e1").unwrap();
        assert_eq!(host.serialization, "127.0.0.1");
        assert_eq!(host.kind, HostKind::Ipv4);
    }

    #[test]
    fn test_numeric_last_label_must_parse() {
        // Looks like IPv4 but overflows: fatal
        assert!(special("foo.0x100000000").is_err());
        assert!(special("1.2.3.4.5").is_err());
    }

    #[test]
    fn test_ipv6_literal() {
        let host = special("[2001:DB8::1]").unwrap();
        assert_eq!(host.serialization, "[2001:db8::1]");
        assert_eq!(host.kind, HostKind::Ipv6);

        assert_eq!(special("[::1").unwrap_err(), ParseError::InvalidIpv6);
    }

    #[test]
    fn test_localhost_is_preserved_for_file() {
        // Stripping localhost changes meaning on some platforms
        let host = parse_host("localhost", SchemeType::File).unwrap();
        assert_eq!(host.serialization, "localhost");
        assert_eq!(host.kind, HostKind::Domain);
    }

    #[test]
    fn test_opaque_host() {
        let host = opaque("ex%61mple").unwrap();
        assert_eq!(host.serialization, "ex%61mple");
        assert_eq!(host.kind, HostKind::Opaque);

        // Case is preserved for opaque hosts
        assert_eq!(opaque("Example").unwrap().serialization, "Example");

        // Non-ASCII is percent-encoded, not IDNA-mapped
        assert_eq!(opaque("é").unwrap().serialization, "%C3%A9");
    }

    #[test]
    fn test_opaque_forbidden_code_points() {
        for bad in ["a b", "a#b", "a/b", "a:b", "a<b", "a@b", "a[b", "a|b"] {
            assert_eq!(opaque(bad).unwrap_err(), ParseError::InvalidHost);
        }
    }

    #[test]
    fn test_invalid_percent_in_special_host() {
        assert!(special("ex%zzample").is_err());
    }

    #[test]
    fn test_host_projection() {
        assert_eq!(
            Host::from_serialization(HostKind::Ipv4, "127.0.0.1"),
            Some(Host::Ipv4(0x7F00_0001))
        );
        assert_eq!(
            Host::from_serialization(HostKind::Ipv6, "[::1]"),
            Some(Host::Ipv6([0, 0, 0, 0, 0, 0, 0, 1]))
        );
        assert_eq!(Host::from_serialization(HostKind::None, ""), None);
        assert_eq!(
            Host::from_serialization(HostKind::Domain, "example.com"),
            Some(Host::Domain("example.com".into()))
        );
    }
}

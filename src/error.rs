/// Errors that can occur during URL parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid scheme format
    InvalidScheme,
    /// Invalid host format
    InvalidHost,
    /// Invalid port number
    InvalidPort,
    /// Invalid IPv4 address literal
    InvalidIpv4,
    /// Invalid IPv6 address literal
    InvalidIpv6,
    /// IDNA processing failed while converting a domain to ASCII
    Idna(IdnaErrorKind),
    /// Invalid URL structure
    InvalidUrl,
    /// Relative URL without base
    RelativeUrlWithoutBase,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::InvalidScheme => "Invalid scheme",
            Self::InvalidHost => "Invalid host",
            Self::InvalidPort => "Invalid port",
            Self::InvalidIpv4 => "Invalid IPv4 address",
            Self::InvalidIpv6 => "Invalid IPv6 address",
            Self::Idna(kind) => return write!(f, "IDNA error: {kind}"),
            Self::InvalidUrl => "Invalid URL",
            Self::RelativeUrlWithoutBase => "Relative URL without base",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseError {}

impl From<IdnaErrorKind> for ParseError {
    fn from(kind: IdnaErrorKind) -> Self {
        Self::Idna(kind)
    }
}

/// Where inside the domain-to-ASCII pipeline an IDNA failure occurred.
///
/// The kind is carried for diagnostics; the parser surfaces all of them as
/// a single host-parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdnaErrorKind {
    /// A code point with status `disallowed` (or `disallowed_STD3_valid`
    /// under strict STD3 rules) appeared in the input
    Mapping,
    /// A decoded label was not in Normalization Form C
    Normalization,
    /// An `xn--` label failed to Punycode-decode, or encoding failed
    Punycode,
    /// A label failed the structural checks (empty, overlong, bad hyphens)
    Validation,
    /// The domain violated the RTL/LTR label rules
    Bidi,
    /// ZWNJ/ZWJ appeared outside a permitted joining context
    Joiner,
}

impl core::fmt::Display for IdnaErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::Mapping => "disallowed code point",
            Self::Normalization => "label is not NFC",
            Self::Punycode => "punycode conversion failed",
            Self::Validation => "invalid label",
            Self::Bidi => "bidi rule violation",
            Self::Joiner => "joiner in invalid context",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for IdnaErrorKind {}

/// Errors converting a file path into a `file:` URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePathError {
    /// The path was empty
    Empty,
    /// The path contained a NUL byte
    NullByte,
    /// The path was not absolute
    Relative,
    /// The path escaped its root via `..` components
    UpwardsTraversal,
    /// A UNC server name was not a valid hostname
    InvalidHostname,
    /// A `\\?\` path outside the supported subset
    UnsupportedNamespacedPath,
    /// The path bytes could not be carried through the URL form
    Transcoding,
}

impl core::fmt::Display for FilePathError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::Empty => "empty path",
            Self::NullByte => "path contains a NUL byte",
            Self::Relative => "path is not absolute",
            Self::UpwardsTraversal => "path traverses above its root",
            Self::InvalidHostname => "invalid hostname in UNC path",
            Self::UnsupportedNamespacedPath => "unsupported Win32 namespaced path",
            Self::Transcoding => "path cannot be represented",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for FilePathError {}

/// Errors converting a `file:` URL back into a file path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlToFilePathError {
    /// The URL's scheme was not `file`
    NotAFileUrl,
    /// The path contained a percent-encoded NUL (`%00`)
    EncodedNull,
    /// The path contained a percent-encoded separator (`%2F`, or `%5C` on
    /// Windows)
    EncodedSeparator,
    /// The URL has a host, which the requested format cannot express
    NonLocalFile,
    /// The URL's host is not usable as a UNC server name
    UnsupportedHostname,
    /// The URL's path does not form an absolute path in the requested format
    RelativePath,
}

impl core::fmt::Display for UrlToFilePathError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::NotAFileUrl => "not a file: URL",
            Self::EncodedNull => "path contains an encoded NUL",
            Self::EncodedSeparator => "path contains an encoded separator",
            Self::NonLocalFile => "URL refers to a remote host",
            Self::UnsupportedHostname => "hostname is not usable in a file path",
            Self::RelativePath => "URL path is not absolute",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for UrlToFilePathError {}

/// Result type for URL parsing operations
pub type Result<T> = core::result::Result<T, ParseError>;

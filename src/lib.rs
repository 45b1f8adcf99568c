//! A WHATWG URL core: the basic URL parser and serializer, an indexed
//! component structure with in-place setters, host parsing (domain /
//! IPv4 / IPv6 / opaque), an IDNA implementation driven by a split-storage
//! code-point database, file-path conversion, and an RFC 2396 bridge.

// Internal modules (not public API)
mod error;
mod helpers;
mod parser;
mod scheme;
mod url;

// Component modules with public surface
pub mod db;
pub mod file_path;
pub mod host;
pub mod idna;
pub mod ipv4;
pub mod ipv6;
pub mod percent;
pub mod rfc2396;
mod search_params;
mod structure;

// Public API
pub use error::{FilePathError, IdnaErrorKind, ParseError, UrlToFilePathError};
pub use file_path::FilePathFormat;
pub use host::{Host, HostKind};
pub use parser::ValidationError;
pub use scheme::SchemeType;
pub use search_params::UrlSearchParams;
pub use structure::UrlStructure;
pub use url::Url;

pub type Result<T> = core::result::Result<T, ParseError>;

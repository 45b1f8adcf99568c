//! File-path ↔ `file:` URL conversion for POSIX and Windows paths.
//!
//! Paths are byte-oriented in both directions; nothing is transcoded.
//! The URL form always uses `/` separators; Windows drive letters and
//! UNC hosts follow the WHATWG `file:` quirks.

use percent_encoding::AsciiSet;

use crate::error::{FilePathError, UrlToFilePathError};
use crate::host::{HostKind, ParsedHost, parse_host};
use crate::parser::{PathForm, UrlRecord};
use crate::percent::{PATH_SET, percent_decode_bytes, percent_encode_bytes_into};
use crate::scheme::SchemeType;
use crate::url::Url;

/// Which platform's path syntax to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePathFormat {
    /// `/`-separated absolute paths
    Posix,
    /// Drive-absolute (`C:\`), UNC (`\\server\share`), and the
    /// drive/UNC subset of `\\?\` paths
    Windows,
}

/// `%` must be encoded as well so that the conversion round-trips raw
/// bytes losslessly.
const FILE_PATH_SET: &AsciiSet = &PATH_SET.add(b'%');

/// Convert an absolute file path into a `file:` URL.
///
/// # Errors
///
/// Rejects empty, relative, NUL-carrying and upwards-traversing paths,
/// invalid UNC hostnames, and unsupported `\\?\` forms.
pub fn url_from_file_path(path: &[u8], format: FilePathFormat) -> Result<Url, FilePathError> {
    if path.is_empty() {
        return Err(FilePathError::Empty);
    }
    if path.contains(&0) {
        return Err(FilePathError::NullByte);
    }

    match format {
        FilePathFormat::Posix => posix_path_to_url(path),
        FilePathFormat::Windows => windows_path_to_url(path),
    }
}

fn posix_path_to_url(path: &[u8]) -> Result<Url, FilePathError> {
    if path[0] != b'/' {
        return Err(FilePathError::Relative);
    }

    let segments = encode_path_segments(&path[1..], |b| b == b'/')?;
    Ok(build_file_url(None, segments))
}

fn windows_path_to_url(path: &[u8]) -> Result<Url, FilePathError> {
    // Win32 namespaced paths: only the drive and UNC forms are supported
    if let Some(rest) = path.strip_prefix(br"\\?\") {
        if rest.len() >= 2 && rest[0].is_ascii_alphabetic() && rest[1] == b':' {
            return windows_drive_to_url(rest);
        }
        if let Some(unc) = rest
            .strip_prefix(br"UNC\")
            .or_else(|| rest.strip_prefix(br"UNC/"))
        {
            return windows_unc_to_url(unc);
        }
        return Err(FilePathError::UnsupportedNamespacedPath);
    }

    if path.len() >= 2 && (path[0] == b'\\' || path[0] == b'/') && path[1] == path[0] {
        return windows_unc_to_url(&path[2..]);
    }

    if path.len() >= 2 && path[0].is_ascii_alphabetic() && path[1] == b':' {
        return windows_drive_to_url(path);
    }

    // Rooted (`\foo`), drive-relative (`C:foo`) and plain relative paths
    // have no absolute meaning here
    Err(FilePathError::Relative)
}

fn is_windows_separator(b: u8) -> bool {
    b == b'\\' || b == b'/'
}

fn windows_drive_to_url(path: &[u8]) -> Result<Url, FilePathError> {
    // A bare "C:" or "C:" followed by anything but a separator is
    // drive-relative
    if path.len() == 2 || !is_windows_separator(path[2]) {
        return Err(FilePathError::Relative);
    }

    let mut segments = vec![format!("{}:", path[0] as char)];
    segments.extend(encode_path_segments(&path[3..], is_windows_separator)?);
    Ok(build_file_url(None, segments))
}

fn windows_unc_to_url(path: &[u8]) -> Result<Url, FilePathError> {
    let server_end = path
        .iter()
        .position(|&b| is_windows_separator(b))
        .unwrap_or(path.len());
    let server = &path[..server_end];

    let server_str =
        core::str::from_utf8(server).map_err(|_| FilePathError::InvalidHostname)?;
    if server_str.is_empty() || server_str.contains('%') {
        return Err(FilePathError::InvalidHostname);
    }
    let host = parse_host(server_str, SchemeType::File)
        .map_err(|_| FilePathError::InvalidHostname)?;
    if host.serialization.is_empty() {
        return Err(FilePathError::InvalidHostname);
    }

    let rest = path.get(server_end + 1..).unwrap_or(&[]);
    let segments = encode_path_segments(rest, is_windows_separator)?;
    Ok(build_file_url(Some(host), segments))
}

/// Split on separators, reject `..`, drop `.`, percent-encode each
/// component.
fn encode_path_segments(
    rest: &[u8],
    is_separator: impl Fn(u8) -> bool,
) -> Result<Vec<String>, FilePathError> {
    let mut segments: Vec<String> = Vec::new();
    for component in rest.split(|&b| is_separator(b)) {
        if component == b".." {
            return Err(FilePathError::UpwardsTraversal);
        }
        if component == b"." {
            continue;
        }
        let mut encoded = String::with_capacity(component.len());
        percent_encode_bytes_into(&mut encoded, component, FILE_PATH_SET);
        segments.push(encoded);
    }
    Ok(segments)
}

fn build_file_url(host: Option<ParsedHost>, segments: Vec<String>) -> Url {
    let mut record = UrlRecord::new();
    record.scheme = "file".to_string();
    record.scheme_type = SchemeType::File;
    record.host = Some(host.unwrap_or(ParsedHost {
        serialization: String::new(),
        kind: HostKind::Empty,
    }));
    record.path = PathForm::List(if segments.is_empty() {
        vec![String::new()]
    } else {
        segments
    });
    Url::from_record(&record)
}

/// Convert a `file:` URL back into a platform path.
///
/// # Errors
///
/// Rejects non-`file:` URLs, encoded NULs and separators, hosts the
/// format cannot express, and Windows paths without a drive or host.
pub fn file_path_from_url(
    url: &Url,
    format: FilePathFormat,
) -> Result<Vec<u8>, UrlToFilePathError> {
    if url.scheme() != "file" {
        return Err(UrlToFilePathError::NotAFileUrl);
    }

    let raw_path = url.pathname();
    check_encoded_bytes(raw_path, format)?;

    match format {
        FilePathFormat::Posix => posix_path_from_url(url, raw_path),
        FilePathFormat::Windows => windows_path_from_url(url, raw_path),
    }
}

/// Percent-encoded separators and NULs would silently change the
/// path's shape after decoding.
fn check_encoded_bytes(raw_path: &str, format: FilePathFormat) -> Result<(), UrlToFilePathError> {
    let lower = raw_path.to_ascii_lowercase();
    if lower.contains("%00") {
        return Err(UrlToFilePathError::EncodedNull);
    }
    if lower.contains("%2f") {
        return Err(UrlToFilePathError::EncodedSeparator);
    }
    if format == FilePathFormat::Windows && lower.contains("%5c") {
        return Err(UrlToFilePathError::EncodedSeparator);
    }
    Ok(())
}

fn posix_path_from_url(url: &Url, raw_path: &str) -> Result<Vec<u8>, UrlToFilePathError> {
    match url.host_kind() {
        HostKind::Empty => {}
        HostKind::Domain if url.hostname().eq_ignore_ascii_case("localhost") => {}
        _ => return Err(UrlToFilePathError::NonLocalFile),
    }

    let mut out: Vec<u8> = Vec::with_capacity(raw_path.len());
    for segment in raw_path.split('/').skip(1) {
        out.push(b'/');
        out.extend_from_slice(&percent_decode_bytes(segment));
    }
    if out.is_empty() {
        out.push(b'/');
    }
    Ok(out)
}

fn windows_path_from_url(url: &Url, raw_path: &str) -> Result<Vec<u8>, UrlToFilePathError> {
    let mut segments: Vec<Vec<u8>> = raw_path
        .split('/')
        .skip(1)
        .map(|segment| percent_decode_bytes(segment))
        .collect();

    match url.host_kind() {
        HostKind::Empty => {
            // Local path: requires a drive letter up front
            let Some(first) = segments.first() else {
                return Err(UrlToFilePathError::RelativePath);
            };
            if !(first.len() == 2 && first[0].is_ascii_alphabetic() && first[1] == b':') {
                return Err(UrlToFilePathError::RelativePath);
            }
            let mut out: Vec<u8> = Vec::with_capacity(raw_path.len());
            out.extend_from_slice(&segments.remove(0));
            if segments.is_empty() {
                out.push(b'\\');
            }
            for segment in &segments {
                out.push(b'\\');
                out.extend_from_slice(segment);
            }
            Ok(out)
        }
        HostKind::Domain | HostKind::Ipv4 => {
            let mut out: Vec<u8> = Vec::with_capacity(url.hostname().len() + raw_path.len() + 2);
            out.extend_from_slice(br"\\");
            out.extend_from_slice(url.hostname().as_bytes());
            for segment in &segments {
                out.push(b'\\');
                out.extend_from_slice(segment);
            }
            Ok(out)
        }
        HostKind::Ipv6 | HostKind::Opaque => Err(UrlToFilePathError::UnsupportedHostname),
        HostKind::None => Err(UrlToFilePathError::RelativePath),
    }
}

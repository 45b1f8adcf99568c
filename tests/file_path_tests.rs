#![allow(clippy::unwrap_used, clippy::panic, clippy::expect_used)]

//! File-path ↔ URL conversion scenarios for both path syntaxes.

use moor::file_path::{file_path_from_url, url_from_file_path};
use moor::{FilePathError, FilePathFormat, Url, UrlToFilePathError};

#[test]
fn test_posix_basic() {
    let url = url_from_file_path(b"/usr/bin/swift", FilePathFormat::Posix).unwrap();
    assert_eq!(url.href(), "file:///usr/bin/swift");
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Posix).unwrap(),
        b"/usr/bin/swift"
    );
}

#[test]
fn test_posix_root() {
    let url = url_from_file_path(b"/", FilePathFormat::Posix).unwrap();
    assert_eq!(url.href(), "file:///");
    assert_eq!(file_path_from_url(&url, FilePathFormat::Posix).unwrap(), b"/");
}

#[test]
fn test_posix_non_utf8_bytes_round_trip() {
    // Raw bytes survive through percent-encoding untouched
    let path = b"/tmp/\xFF\xFEfile";
    let url = url_from_file_path(path, FilePathFormat::Posix).unwrap();
    assert_eq!(url.href(), "file:///tmp/%FF%FEfile");
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Posix).unwrap(),
        path
    );
}

#[test]
fn test_posix_rejections() {
    assert_eq!(
        url_from_file_path(b"relative", FilePathFormat::Posix),
        Err(FilePathError::Relative)
    );
    assert_eq!(
        url_from_file_path(b"", FilePathFormat::Posix),
        Err(FilePathError::Empty)
    );
    assert_eq!(
        url_from_file_path(b"/a/\0", FilePathFormat::Posix),
        Err(FilePathError::NullByte)
    );
    assert_eq!(
        url_from_file_path(b"/a/../etc", FilePathFormat::Posix),
        Err(FilePathError::UpwardsTraversal)
    );
}

#[test]
fn test_windows_drive_paths() {
    let url = url_from_file_path(br"C:\Users\me\doc.txt", FilePathFormat::Windows).unwrap();
    assert_eq!(url.href(), "file:///C:/Users/me/doc.txt");
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Windows).unwrap(),
        br"C:\Users\me\doc.txt"
    );
}

#[test]
fn test_windows_forward_slashes_accepted() {
    let url = url_from_file_path(b"C:/Users/me", FilePathFormat::Windows).unwrap();
    assert_eq!(url.href(), "file:///C:/Users/me");
}

#[test]
fn test_windows_trailing_separator_preserved() {
    let url = url_from_file_path(br"C:\dir\", FilePathFormat::Windows).unwrap();
    assert_eq!(url.href(), "file:///C:/dir/");
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Windows).unwrap(),
        br"C:\dir\"
    );
}

#[test]
fn test_windows_unc() {
    let url = url_from_file_path(br"\\fileserver\share\doc", FilePathFormat::Windows).unwrap();
    assert_eq!(url.href(), "file://fileserver/share/doc");
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Windows).unwrap(),
        br"\\fileserver\share\doc"
    );
}

#[test]
fn test_windows_unc_host_is_validated() {
    assert_eq!(
        url_from_file_path(br"\\bad host\share", FilePathFormat::Windows),
        Err(FilePathError::InvalidHostname)
    );
    assert_eq!(
        url_from_file_path(br"\\\share", FilePathFormat::Windows),
        Err(FilePathError::InvalidHostname)
    );
}

#[test]
fn test_windows_namespaced_subset() {
    let url = url_from_file_path(br"\\?\C:\x", FilePathFormat::Windows).unwrap();
    assert_eq!(url.href(), "file:///C:/x");

    let url = url_from_file_path(br"\\?\UNC\srv\sh", FilePathFormat::Windows).unwrap();
    assert_eq!(url.href(), "file://srv/sh");

    assert_eq!(
        url_from_file_path(br"\\?\Volume{guid}\x", FilePathFormat::Windows),
        Err(FilePathError::UnsupportedNamespacedPath)
    );
}

#[test]
fn test_windows_relative_forms_rejected() {
    for path in [
        &br"docs\file"[..],
        &br"C:relative"[..],
        &br"\rooted"[..],
        &br"C:"[..],
    ] {
        assert_eq!(
            url_from_file_path(path, FilePathFormat::Windows),
            Err(FilePathError::Relative),
            "{}",
            String::from_utf8_lossy(path)
        );
    }
}

#[test]
fn test_url_to_path_guards() {
    let url = Url::parse("https://example.com/x", None).unwrap();
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Posix),
        Err(UrlToFilePathError::NotAFileUrl)
    );

    // Encoded separators cannot silently change the path shape
    let url = Url::parse("file:///dir/a%2Fb", None).unwrap();
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Posix),
        Err(UrlToFilePathError::EncodedSeparator)
    );
    let url = Url::parse("file:///C:/a%5Cb", None).unwrap();
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Windows),
        Err(UrlToFilePathError::EncodedSeparator)
    );
    // ... but %5C is fine on POSIX, where backslash is a normal byte
    let url = Url::parse("file:///dir/a%5Cb", None).unwrap();
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Posix).unwrap(),
        br"/dir/a\b"
    );

    let url = Url::parse("file:///a%00b", None).unwrap();
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Posix),
        Err(UrlToFilePathError::EncodedNull)
    );

    // Remote hosts have no POSIX rendering
    let url = Url::parse("file://server/share", None).unwrap();
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Posix),
        Err(UrlToFilePathError::NonLocalFile)
    );

    // A Windows local path needs a drive
    let url = Url::parse("file:///just/a/path", None).unwrap();
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Windows),
        Err(UrlToFilePathError::RelativePath)
    );
}

#[test]
fn test_windows_unc_from_url() {
    let url = Url::parse("file://server/share/doc.txt", None).unwrap();
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Windows).unwrap(),
        br"\\server\share\doc.txt"
    );

    // IPv6 hosts have no UNC rendering here
    let url = Url::parse("file://[::1]/share", None).unwrap();
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Windows),
        Err(UrlToFilePathError::UnsupportedHostname)
    );
}

#[test]
fn test_space_and_percent_round_trip() {
    let path = b"/dir/50% off plan.txt";
    let url = url_from_file_path(path, FilePathFormat::Posix).unwrap();
    assert_eq!(url.href(), "file:///dir/50%25%20off%20plan.txt");
    assert_eq!(
        file_path_from_url(&url, FilePathFormat::Posix).unwrap(),
        path
    );
}

use std::borrow::Cow;

/// Pre-processing the basic URL parser applies before its first state
/// runs: C0 controls and spaces are dropped from both ends, and ASCII
/// tab/LF/CR are dropped everywhere. Inputs that need no edit are
/// returned borrowed, so the common case costs one scan.
pub fn clean_input(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();

    let mut lo = 0;
    let mut hi = bytes.len();
    while lo < hi && bytes[lo] <= 0x20 {
        lo += 1;
    }
    while hi > lo && bytes[hi - 1] <= 0x20 {
        hi -= 1;
    }

    // Splice out interior tab/LF/CR by copying the chunks between them
    let mut rest = &input[lo..hi];
    let Some(mut strip_at) = memchr::memchr3(b'\t', b'\n', b'\r', rest.as_bytes()) else {
        return Cow::Borrowed(rest);
    };

    let mut cleaned = String::with_capacity(rest.len() - 1);
    loop {
        cleaned.push_str(&rest[..strip_at]);
        rest = &rest[strip_at + 1..];
        match memchr::memchr3(b'\t', b'\n', b'\r', rest.as_bytes()) {
            Some(next) => strip_at = next,
            None => break,
        }
    }
    cleaned.push_str(rest);
    Cow::Owned(cleaned)
}

/// Parse a port string to u16.
/// Returns None if empty, contains non-digit characters, or is out of range.
pub fn parse_port_digits(port: &str) -> Option<u16> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    port.parse::<u16>().ok()
}

/// Check if bytes starting at position form a valid Windows drive letter.
/// A valid drive letter is `[a-zA-Z][:|]` followed by `/`, `\`, `?`, `#`,
/// or the end of the input.
pub fn is_windows_drive_letter(bytes: &[u8], pos: usize) -> bool {
    if pos + 1 >= bytes.len() {
        return false;
    }

    let first = bytes[pos];
    let second = bytes[pos + 1];

    if !first.is_ascii_alphabetic() || !matches!(second, b':' | b'|') {
        return false;
    }

    pos + 2 >= bytes.len() || matches!(bytes[pos + 2], b'/' | b'\\' | b'?' | b'#')
}

/// A normalized Windows drive letter is `[a-zA-Z]:` exactly.
pub fn is_normalized_windows_drive_letter(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_input_borrows_untouched_input() {
        let cleaned = clean_input("https://left.alone/q?x=1");
        assert!(matches!(cleaned, Cow::Borrowed(_)));
        assert_eq!(cleaned, "https://left.alone/q?x=1");
    }

    #[test]
    fn test_interior_tabs_and_newlines_spliced_out() {
        assert_eq!(
            clean_input("ht\ntp://spl\ticed.example\r/pa\nth"),
            "http://spliced.example/path"
        );
        // Consecutive strippable bytes collapse to nothing
        assert_eq!(clean_input("a\r\n\tb"), "ab");
    }

    #[test]
    fn test_edges_lose_controls_and_spaces() {
        assert_eq!(clean_input(" \x1B\x00wss://padded/ \x7F"), "wss://padded/ \x7F");
        assert_eq!(clean_input("\x10data:,x\x01"), "data:,x");
        // Interior spaces are not edge padding
        assert_eq!(clean_input("  a b  "), "a b");
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(clean_input(""), "");
        assert_eq!(clean_input(" \t\r\n \x00"), "");
        assert_eq!(clean_input("\nx\n"), "x");
    }

    #[test]
    fn test_parse_port_digits() {
        assert_eq!(parse_port_digits("80"), Some(80));
        assert_eq!(parse_port_digits("65535"), Some(65535));
        assert_eq!(parse_port_digits("65536"), None);
        assert_eq!(parse_port_digits("abc"), None);
        assert_eq!(parse_port_digits(""), None);
    }

    #[test]
    fn test_windows_drive_letter() {
        assert!(is_windows_drive_letter(b"C:", 0));
        assert!(is_windows_drive_letter(b"C|/foo", 0));
        assert!(is_windows_drive_letter(b"/c:/x", 1));
        assert!(!is_windows_drive_letter(b"C:x", 0));
        assert!(!is_windows_drive_letter(b"1:", 0));
        assert!(is_normalized_windows_drive_letter("c:"));
        assert!(!is_normalized_windows_drive_letter("c|"));
    }
}

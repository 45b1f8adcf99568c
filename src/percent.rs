use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

// Encode sets per https://url.spec.whatwg.org/#percent-encoded-bytes
// Non-ASCII bytes are always encoded by the encoder, so the sets only
// enumerate ASCII.

/// C0 control percent-encode set
pub const C0_CONTROL_SET: &AsciiSet = CONTROLS;

/// C0 control + space percent-encode set (opaque hosts)
pub const C0_SPACE_SET: &AsciiSet = &C0_CONTROL_SET.add(b' ');

/// Fragment percent-encode set
pub const FRAGMENT_SET: &AsciiSet = &C0_SPACE_SET.add(b'"').add(b'<').add(b'>').add(b'`');

/// Query percent-encode set (non-special schemes)
pub const QUERY_SET: &AsciiSet = &C0_SPACE_SET.add(b'"').add(b'#').add(b'<').add(b'>');

/// Special query percent-encode set: the query set plus `'`
pub const SPECIAL_QUERY_SET: &AsciiSet = &QUERY_SET.add(b'\'');

/// Path percent-encode set
pub const PATH_SET: &AsciiSet = &FRAGMENT_SET.add(b'#').add(b'?').add(b'{').add(b'}');

/// Userinfo percent-encode set
pub const USERINFO_SET: &AsciiSet = &PATH_SET
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'=')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'|');

/// Component percent-encode set
pub const COMPONENT_SET: &AsciiSet = &USERINFO_SET
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b',');

/// `application/x-www-form-urlencoded` percent-encode set
pub const FORM_URLENCODED_SET: &AsciiSet = &COMPONENT_SET
    .add(b'!')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'~');

/// Percent-encode a string using the provided encode set
pub fn percent_encode_with_set(input: &str, encode_set: &'static AsciiSet) -> String {
    utf8_percent_encode(input, encode_set).to_string()
}

/// Write percent-encoded string directly to buffer
pub fn percent_encode_into(buffer: &mut String, input: &str, encode_set: &'static AsciiSet) {
    buffer.reserve(input.len());
    for chunk in utf8_percent_encode(input, encode_set) {
        buffer.push_str(chunk);
    }
}

/// Percent-encode a single byte into the buffer as `%HH` (uppercase hex)
pub fn percent_encode_byte_into(buffer: &mut String, byte: u8) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    buffer.push('%');
    buffer.push(HEX[(byte >> 4) as usize] as char);
    buffer.push(HEX[(byte & 0xF) as usize] as char);
}

/// Report whether an ASCII byte (`< 0x80`) would be percent-encoded by
/// the given set. `AsciiSet::contains` is private to `percent-encoding`,
/// so this goes through the crate's public encoding API instead.
pub fn set_contains_byte(encode_set: &'static AsciiSet, byte: u8) -> bool {
    percent_encoding::percent_encode(&[byte], encode_set)
        .to_string()
        .len()
        > 1
}

/// Percent-encode raw bytes against an encode set. Non-ASCII bytes are
/// always encoded.
pub fn percent_encode_bytes_into(buffer: &mut String, input: &[u8], encode_set: &'static AsciiSet) {
    for &b in input {
        if b >= 0x80 || set_contains_byte(encode_set, b) {
            percent_encode_byte_into(buffer, b);
        } else {
            buffer.push(b as char);
        }
    }
}

/// Decode percent-encoded bytes. Malformed `%` sequences are passed
/// through verbatim.
pub fn percent_decode_bytes(input: &str) -> Vec<u8> {
    percent_encoding::percent_decode_str(input).collect()
}

/// Decode a percent-encoded string, requiring the result to be UTF-8.
pub fn percent_decode_utf8(input: &str) -> Option<String> {
    percent_encoding::percent_decode_str(input)
        .decode_utf8()
        .map(Into::into)
        .ok()
}

/// Check that every `%` in the input is followed by two hex digits.
pub fn has_valid_percent_sequences(input: &str) -> bool {
    let bytes = input.as_bytes();
    let mut i = 0;
    while let Some(pos) = memchr::memchr(b'%', &bytes[i..]) {
        let at = i + pos;
        if at + 2 >= bytes.len()
            || !bytes[at + 1].is_ascii_hexdigit()
            || !bytes[at + 2].is_ascii_hexdigit()
        {
            return false;
        }
        i = at + 3;
        if i >= bytes.len() {
            break;
        }
    }
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode_utf8("hello%20world").unwrap(), "hello world");
        assert_eq!(percent_decode_utf8("test").unwrap(), "test");
        assert_eq!(percent_decode_utf8("%2F").unwrap(), "/");
        assert_eq!(percent_decode_utf8("%C3%A9").unwrap(), "é");
    }

    #[test]
    fn test_malformed_sequences_pass_through() {
        assert_eq!(percent_decode_bytes("%"), b"%");
        assert_eq!(percent_decode_bytes("%Z9"), b"%Z9");
        assert_eq!(percent_decode_bytes("a%2"), b"a%2");
    }

    #[test]
    fn test_encode_sets_nest() {
        // Each set is a superset of the one it extends
        for b in 0u8..0x80 {
            if set_contains_byte(FRAGMENT_SET, b) {
                assert!(
                    set_contains_byte(PATH_SET, b),
                    "path must cover fragment: {b:#x}"
                );
            }
            if set_contains_byte(PATH_SET, b) {
                assert!(
                    set_contains_byte(USERINFO_SET, b),
                    "userinfo must cover path: {b:#x}"
                );
            }
            if set_contains_byte(USERINFO_SET, b) {
                assert!(
                    set_contains_byte(COMPONENT_SET, b),
                    "component must cover userinfo: {b:#x}"
                );
            }
        }
    }

    #[test]
    fn test_uppercase_hex() {
        let mut buf = String::new();
        percent_encode_byte_into(&mut buf, 0xAB);
        assert_eq!(buf, "%AB");
        assert_eq!(percent_encode_with_set("a b", FRAGMENT_SET), "a%20b");
    }

    #[test]
    fn test_valid_percent_sequences() {
        assert!(has_valid_percent_sequences("a%41b%42"));
        assert!(has_valid_percent_sequences("plain"));
        assert!(!has_valid_percent_sequences("a%4"));
        assert!(!has_valid_percent_sequences("%GG"));
    }
}

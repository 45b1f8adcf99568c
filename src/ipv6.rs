//! IPv6 literal parsing and serialization per the WHATWG URL standard.
//!
//! Eight 16-bit hex groups separated by `:`, at most one `::` compression,
//! and an optional embedded IPv4 literal (strict dotted decimal) in the
//! last 32 bits.

use crate::error::{ParseError, Result};
use core::fmt::Write;

/// Parse an IPv6 address from bracket notation (`[::1]`) or the bare
/// grouped form. Returns the 8 16-bit pieces.
pub fn parse_ipv6(input: &str) -> Result<[u16; 8]> {
    let input = input
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(input);

    // Zone IDs are not allowed in URLs
    if input.contains('%') {
        return Err(ParseError::InvalidIpv6);
    }

    let has_embedded_ipv4 = input
        .rfind(':')
        .is_some_and(|pos| input[pos + 1..].contains('.'));

    if has_embedded_ipv4 {
        parse_with_embedded_ipv4(input)
    } else {
        parse_groups_only(input)
    }
}

fn parse_groups_only(input: &str) -> Result<[u16; 8]> {
    let mut pieces = [0u16; 8];

    let Some(compress_at) = input.find("::") else {
        // No compression: exactly 8 groups
        let parsed = parse_groups(input)?;
        if parsed.len() != 8 {
            return Err(ParseError::InvalidIpv6);
        }
        pieces.copy_from_slice(&parsed);
        return Ok(pieces);
    };

    // A second "::" is malformed
    if input[compress_at + 2..].contains("::") {
        return Err(ParseError::InvalidIpv6);
    }

    let before = parse_groups(&input[..compress_at])?;
    let after = parse_groups(&input[compress_at + 2..])?;

    let total = before.len() + after.len();
    if total > 7 {
        return Err(ParseError::InvalidIpv6);
    }

    pieces[..before.len()].copy_from_slice(&before);
    let after_start = 8 - after.len();
    pieces[after_start..].copy_from_slice(&after);

    Ok(pieces)
}

fn parse_with_embedded_ipv4(input: &str) -> Result<[u16; 8]> {
    let last_colon = input.rfind(':').ok_or(ParseError::InvalidIpv6)?;
    let group_part = &input[..last_colon];
    let ipv4_part = &input[last_colon + 1..];

    let ipv4 = parse_embedded_ipv4(ipv4_part)?;
    let ipv4_high = (ipv4 >> 16) as u16;
    let ipv4_low = (ipv4 & 0xFFFF) as u16;

    let mut pieces = [0u16; 8];

    if group_part.is_empty() || group_part == ":" {
        pieces[6] = ipv4_high;
        pieces[7] = ipv4_low;
        return Ok(pieces);
    }

    if let Some(compress_at) = group_part.find("::") {
        if group_part[compress_at + 2..].contains("::") {
            return Err(ParseError::InvalidIpv6);
        }
        let before = parse_groups(&group_part[..compress_at])?;
        let after = parse_groups(&group_part[compress_at + 2..])?;

        let total = before.len() + after.len();
        if total > 5 {
            return Err(ParseError::InvalidIpv6);
        }

        pieces[..before.len()].copy_from_slice(&before);
        let after_start = 6 - after.len();
        pieces[after_start..6].copy_from_slice(&after);
    } else {
        let parsed = parse_groups(group_part)?;
        if parsed.len() != 6 {
            return Err(ParseError::InvalidIpv6);
        }
        pieces[..6].copy_from_slice(&parsed);
    }

    pieces[6] = ipv4_high;
    pieces[7] = ipv4_low;

    Ok(pieces)
}

/// Parse a single hex group (1..=4 digits).
fn parse_group(s: &str) -> Result<u16> {
    if s.is_empty() || s.len() > 4 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::InvalidIpv6);
    }
    u16::from_str_radix(s, 16).map_err(|_| ParseError::InvalidIpv6)
}

/// Parse colon-separated hex groups from a string.
fn parse_groups(s: &str) -> Result<Vec<u16>> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(':').map(parse_group).collect()
}

/// The embedded IPv4 form is strict: four decimal octets, no leading
/// zeros, no alternate bases.
fn parse_embedded_ipv4(s: &str) -> Result<u32> {
    let mut address: u32 = 0;
    let mut count = 0;
    for part in s.split('.') {
        if count == 4 || part.is_empty() || part.len() > 3 {
            return Err(ParseError::InvalidIpv6);
        }
        if part.len() > 1 && part.starts_with('0') {
            return Err(ParseError::InvalidIpv6);
        }
        if !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidIpv6);
        }
        let octet: u32 = part.parse().map_err(|_| ParseError::InvalidIpv6)?;
        if octet > 255 {
            return Err(ParseError::InvalidIpv6);
        }
        address = (address << 8) | octet;
        count += 1;
    }
    if count != 4 {
        return Err(ParseError::InvalidIpv6);
    }
    Ok(address)
}

/// Serialize IPv6 pieces without brackets: lowercase hex, no leading
/// zeros, the longest all-zero run of length >= 2 compressed to `::`.
pub fn serialize_ipv6(pieces: &[u16; 8]) -> String {
    let (compress_start, compress_len) = longest_zero_run(pieces);

    let mut result = String::with_capacity(39);

    let compress_range = compress_start
        .filter(|_| compress_len > 1)
        .map(|start| start..start + compress_len);

    let mut i = 0;
    while i < 8 {
        if let Some(ref range) = compress_range
            && range.start == i
        {
            result.push_str("::");
            i = range.end;
            continue;
        }

        if i > 0 && !result.ends_with("::") {
            result.push(':');
        }

        let _ = write!(&mut result, "{:x}", pieces[i]);
        i += 1;
    }

    result
}

/// Find the longest run of consecutive zero pieces.
fn longest_zero_run(pieces: &[u16; 8]) -> (Option<usize>, usize) {
    let mut best_start: Option<usize> = None;
    let mut best_len = 0;
    let mut current_start: Option<usize> = None;
    let mut current_len = 0;

    for (i, &piece) in pieces.iter().enumerate() {
        if piece == 0 {
            if current_start.is_none() {
                current_start = Some(i);
                current_len = 0;
            }
            current_len += 1;
            if current_len > best_len {
                best_start = current_start;
                best_len = current_len;
            }
        } else {
            current_start = None;
            current_len = 0;
        }
    }

    (best_start, best_len)
}

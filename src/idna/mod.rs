//! IDNA domain-to-ASCII per UTS 46, driven by the code-point database.
//!
//! Pipeline: per-scalar mapping (status + replacement from the database),
//! NFC normalization, label split, Punycode decode/encode for `xn--`
//! labels, then the structural, Bidi and joiner validations.

pub mod punycode;

mod bidi;
mod mapping;
mod tables;

pub use bidi::{BidiClass, JoiningType, bidi_class, joining_type};
pub use mapping::{AsciiStatus, IdnaMappingData, MappingKind, UnicodeStatus};

use unicode_normalization::UnicodeNormalization;

use crate::error::IdnaErrorKind;
use mapping::UnicodeEntry;
use tables::{IDNA_TABLES, IdnaTables};

/// Configuration for the domain-to-ASCII transformation.
///
/// The defaults are strict: STD3 ASCII rules are enforced and deviation
/// characters are kept (non-transitional processing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsciiOptions {
    /// Reject code points whose status is `disallowed_STD3_valid` /
    /// `disallowed_STD3_mapped` instead of passing them through
    pub use_std3_ascii_rules: bool,
    /// Apply the deviation mappings (IDNA2003 compatibility)
    pub transitional: bool,
    /// Enforce the 63-byte label and 253-byte domain limits
    pub verify_dns_length: bool,
}

impl Default for AsciiOptions {
    fn default() -> Self {
        Self {
            use_std3_ascii_rules: true,
            transitional: false,
            verify_dns_length: true,
        }
    }
}

/// Convert a domain to its ASCII form with the default (strict) options.
pub fn domain_to_ascii(domain: &str) -> Result<String, IdnaErrorKind> {
    domain_to_ascii_with(domain, &AsciiOptions::default())
}

/// Convert a domain to its ASCII form.
pub fn domain_to_ascii_with(
    domain: &str,
    options: &AsciiOptions,
) -> Result<String, IdnaErrorKind> {
    let tables = &*IDNA_TABLES;

    let mapped = map_code_points(domain, options, tables)?;

    // NFC. Pure-ASCII sequences are already normalized.
    let mapped: Vec<char> = if mapped.iter().all(char::is_ascii) {
        mapped
    } else {
        mapped.into_iter().nfc().collect()
    };

    // Split into labels; a single trailing empty label is a trailing dot
    let mut labels: Vec<Vec<char>> = Vec::new();
    let mut current: Vec<char> = Vec::new();
    for c in mapped {
        if c == '.' {
            labels.push(core::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    labels.push(current);

    let trailing_dot = labels.len() > 1 && labels.last().is_some_and(Vec::is_empty);
    if trailing_dot {
        labels.pop();
    }

    // Decode ACE labels for validation; remember which ones were ACE
    let mut was_ace: Vec<bool> = Vec::with_capacity(labels.len());
    for label in &mut labels {
        let ace = is_ace_label(label);
        if ace {
            *label = decode_ace_label(label, options, tables)?;
        }
        was_ace.push(ace);
    }

    for (label, &ace) in labels.iter().zip(&was_ace) {
        validate_label(label, ace)?;
    }

    bidi::check_bidi(&labels)?;
    bidi::check_joiners(&labels)?;

    // Encode: non-ASCII labels get the ACE form
    let mut output = String::with_capacity(domain.len());
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            output.push('.');
        }
        if label.iter().all(char::is_ascii) {
            output.extend(label.iter());
        } else {
            let encoded = punycode::encode(label).map_err(|_| IdnaErrorKind::Punycode)?;
            output.push_str("xn--");
            output.push_str(&encoded);
        }
    }

    if options.verify_dns_length {
        verify_dns_length(&output)?;
    }

    if trailing_dot {
        output.push('.');
    }

    Ok(output)
}

/// The mapping step: apply each scalar's status and replacement.
fn map_code_points(
    domain: &str,
    options: &AsciiOptions,
    tables: &IdnaTables,
) -> Result<Vec<char>, IdnaErrorKind> {
    let mut out: Vec<char> = Vec::with_capacity(domain.len());
    for c in domain.chars() {
        if c.is_ascii() {
            let entry = tables.db.ascii(c as u8);
            match entry.status() {
                AsciiStatus::Valid => out.push(c),
                AsciiStatus::Mapped => out.push(entry.replacement() as char),
                AsciiStatus::DisallowedStd3Valid => {
                    if options.use_std3_ascii_rules {
                        return Err(IdnaErrorKind::Mapping);
                    }
                    out.push(c);
                }
            }
            continue;
        }

        let (entry_start, entry) = tables.db.unicode_entry(c);
        match entry.status() {
            UnicodeStatus::Valid => out.push(c),
            UnicodeStatus::Ignored => {}
            UnicodeStatus::Mapped => apply_mapping(c, entry_start, entry, &mut out, tables)?,
            UnicodeStatus::Deviation => {
                if options.transitional {
                    apply_mapping(c, entry_start, entry, &mut out, tables)?;
                } else {
                    out.push(c);
                }
            }
            UnicodeStatus::DisallowedStd3Valid => {
                if options.use_std3_ascii_rules {
                    return Err(IdnaErrorKind::Mapping);
                }
                out.push(c);
            }
            UnicodeStatus::DisallowedStd3Mapped => {
                if options.use_std3_ascii_rules {
                    return Err(IdnaErrorKind::Mapping);
                }
                apply_mapping(c, entry_start, entry, &mut out, tables)?;
            }
            UnicodeStatus::Disallowed => return Err(IdnaErrorKind::Mapping),
        }
    }
    Ok(out)
}

fn apply_mapping(
    c: char,
    entry_start: u32,
    entry: UnicodeEntry,
    out: &mut Vec<char>,
    tables: &IdnaTables,
) -> Result<(), IdnaErrorKind> {
    match entry.mapping() {
        MappingKind::None => {}
        MappingKind::Single(scalar) => {
            out.push(char::from_u32(scalar).ok_or(IdnaErrorKind::Mapping)?);
        }
        MappingKind::Rebased { new_origin } => {
            let target = new_origin + (c as u32 - entry_start);
            out.push(char::from_u32(target).ok_or(IdnaErrorKind::Mapping)?);
        }
        MappingKind::Table { offset, len } => {
            let start = usize::from(offset);
            out.extend_from_slice(&tables.replacements[start..start + usize::from(len)]);
        }
    }
    Ok(())
}

fn is_ace_label(label: &[char]) -> bool {
    label.len() >= 4 && label[0] == 'x' && label[1] == 'n' && label[2] == '-' && label[3] == '-'
}

fn decode_ace_label(
    label: &[char],
    options: &AsciiOptions,
    tables: &IdnaTables,
) -> Result<Vec<char>, IdnaErrorKind> {
    let rest: String = label[4..].iter().collect();
    if !rest.is_ascii() {
        return Err(IdnaErrorKind::Punycode);
    }

    let decoded = punycode::decode(&rest).map_err(|_| IdnaErrorKind::Punycode)?;
    if decoded.is_empty() || decoded.iter().all(char::is_ascii) {
        return Err(IdnaErrorKind::Punycode);
    }

    // The decoded label must already be NFC
    let renormalized: Vec<char> = decoded.iter().copied().nfc().collect();
    if renormalized != decoded {
        return Err(IdnaErrorKind::Normalization);
    }

    // Every decoded code point must be usable as-is
    for &c in &decoded {
        if c == '.' || !is_valid_in_label(c, options, tables) {
            return Err(IdnaErrorKind::Validation);
        }
    }

    Ok(decoded)
}

fn is_valid_in_label(c: char, options: &AsciiOptions, tables: &IdnaTables) -> bool {
    if c.is_ascii() {
        return match tables.db.ascii(c as u8).status() {
            AsciiStatus::Valid => true,
            AsciiStatus::DisallowedStd3Valid => !options.use_std3_ascii_rules,
            AsciiStatus::Mapped => false,
        };
    }
    match tables.db.unicode(c).status() {
        UnicodeStatus::Valid | UnicodeStatus::Deviation => true,
        UnicodeStatus::DisallowedStd3Valid => !options.use_std3_ascii_rules,
        _ => false,
    }
}

/// CheckHyphens plus the non-empty rule.
fn validate_label(label: &[char], was_ace: bool) -> Result<(), IdnaErrorKind> {
    if label.is_empty() {
        return Err(IdnaErrorKind::Validation);
    }
    if label.first() == Some(&'-') || label.last() == Some(&'-') {
        return Err(IdnaErrorKind::Validation);
    }
    // Hyphens in positions 3 and 4 are reserved for the ACE prefix
    if !was_ace && label.len() >= 4 && label[2] == '-' && label[3] == '-' {
        return Err(IdnaErrorKind::Validation);
    }
    Ok(())
}

/// Label and domain length limits, on the ASCII form without the
/// trailing dot.
fn verify_dns_length(output: &str) -> Result<(), IdnaErrorKind> {
    if output.is_empty() || output.len() > 253 {
        return Err(IdnaErrorKind::Validation);
    }
    for label in output.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(IdnaErrorKind::Validation);
        }
    }
    Ok(())
}

/// Check if 4 bytes match `xn--` (case insensitive)
fn is_punycode_prefix(slice: &[u8]) -> bool {
    slice.len() >= 4
        && matches!(slice[0], b'x' | b'X')
        && matches!(slice[1], b'n' | b'N')
        && slice[2] == b'-'
        && slice[3] == b'-'
}

/// Check if a domain contains an ACE (`xn--`) label.
pub fn has_punycode(domain: &str) -> bool {
    let bytes = domain.as_bytes();
    if bytes.len() < 4 {
        return false;
    }

    if is_punycode_prefix(bytes) {
        return true;
    }

    memchr::memchr_iter(b'.', bytes).any(|pos| is_punycode_prefix(&bytes[pos + 1..]))
}

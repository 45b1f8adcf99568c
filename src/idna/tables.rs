//! The IDNA table generator.
//!
//! Classifies every Unicode scalar into a status and mapping, compacts
//! runs through a [`SegmentedLine`], and feeds the database builder. The
//! result is a process-wide immutable static, fully materialized before
//! the first lookup and never modified.
//!
//! Status and mapping are derived from the Unicode data already compiled
//! into the dependency tree: `char`'s case mapping plus
//! `unicode-normalization`'s NFKC. Constant-offset mapped runs become
//! `rebased` entries (split at plane boundaries here, so the builder's
//! rebase hook never sees one); multi-scalar mappings are interned into
//! the shared replacements array.

use std::sync::LazyLock;

use unicode_normalization::{IsNormalized, UnicodeNormalization, is_nfkc_quick};

use super::mapping::{AsciiEntry, IdnaMappingData, MappingKind, UnicodeEntry, UnicodeStatus};
use crate::db::{CodePointDatabase, CodePointDatabaseBuilder, SegmentedLine};

pub(crate) struct IdnaTables {
    pub(crate) db: CodePointDatabase<IdnaMappingData>,
    pub(crate) replacements: Vec<char>,
}

pub(crate) static IDNA_TABLES: LazyLock<IdnaTables> = LazyLock::new(build);

const UNICODE_END: u32 = 0x11_0000;
const PLANE_SIZE: u32 = 0x1_0000;

/// Classification of one code point before entry packing. Equal values
/// merge into one range; a constant mapping offset is part of the value
/// so that shifted-alphabet runs merge too.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RunClass {
    Valid,
    Ignored,
    Disallowed,
    Deviation(Vec<char>),
    MappedDelta(i64),
    MappedSeq(Vec<char>),
    DisallowedStd3Mapped(Vec<char>),
}

fn build() -> IdnaTables {
    let mut line = SegmentedLine::new(0x80u32..UNICODE_END, RunClass::Disallowed);

    let mut run_start = 0x80u32;
    let mut run_class = classify(0x80);
    for cp in 0x81..UNICODE_END {
        let class = classify(cp);
        if class != run_class {
            line.set(run_start..cp, run_class);
            run_start = cp;
            run_class = class;
        }
    }
    line.set(run_start..UNICODE_END, run_class);
    line.combine_segments(|a, b| a == b);

    let mut replacements: Vec<char> = Vec::new();
    let mut builder = CodePointDatabaseBuilder::<IdnaMappingData>::new();

    for b in 0u8..128 {
        builder.append_ascii(ascii_entry(b));
    }

    for (range, class) in line.iter() {
        match class {
            RunClass::Valid => {
                builder.append_unicode(
                    range.start,
                    UnicodeEntry::new(UnicodeStatus::Valid, MappingKind::None),
                );
            }
            RunClass::Ignored => {
                builder.append_unicode(
                    range.start,
                    UnicodeEntry::new(UnicodeStatus::Ignored, MappingKind::None),
                );
            }
            RunClass::Disallowed => {
                builder.append_unicode(
                    range.start,
                    UnicodeEntry::new(UnicodeStatus::Disallowed, MappingKind::None),
                );
            }
            RunClass::Deviation(seq) => {
                let mapping = intern_mapping(&mut replacements, seq);
                builder.append_unicode(
                    range.start,
                    UnicodeEntry::new(UnicodeStatus::Deviation, mapping),
                );
            }
            RunClass::MappedDelta(delta) => {
                if range.end - range.start == 1 {
                    let target = (i64::from(range.start) + delta) as u32;
                    builder.append_unicode(
                        range.start,
                        UnicodeEntry::new(UnicodeStatus::Mapped, MappingKind::Single(target)),
                    );
                } else {
                    // Rebased entries may not straddle a plane boundary;
                    // emit one per plane touched
                    let mut start = range.start;
                    while start < range.end {
                        let plane_end = (start / PLANE_SIZE + 1) * PLANE_SIZE;
                        let new_origin = (i64::from(start) + delta) as u32;
                        builder.append_unicode(
                            start,
                            UnicodeEntry::new(
                                UnicodeStatus::Mapped,
                                MappingKind::Rebased { new_origin },
                            ),
                        );
                        start = plane_end.min(range.end);
                    }
                }
            }
            RunClass::MappedSeq(seq) => {
                let mapping = intern_mapping(&mut replacements, seq);
                builder.append_unicode(
                    range.start,
                    UnicodeEntry::new(UnicodeStatus::Mapped, mapping),
                );
            }
            RunClass::DisallowedStd3Mapped(seq) => {
                let mapping = intern_mapping(&mut replacements, seq);
                builder.append_unicode(
                    range.start,
                    UnicodeEntry::new(UnicodeStatus::DisallowedStd3Mapped, mapping),
                );
            }
        }
    }

    IdnaTables {
        db: builder.finish(),
        replacements,
    }
}

fn ascii_entry(b: u8) -> AsciiEntry {
    match b {
        b'A'..=b'Z' => AsciiEntry::mapped(b + 32),
        b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' => AsciiEntry::valid(),
        _ => AsciiEntry::disallowed_std3_valid(),
    }
}

/// Deduplicate a replacement sequence into the flat array.
fn intern_mapping(replacements: &mut Vec<char>, seq: &[char]) -> MappingKind {
    match seq {
        [] => MappingKind::None,
        [single] => MappingKind::Single(*single as u32),
        _ => {
            let offset = replacements
                .windows(seq.len())
                .position(|window| window == seq)
                .unwrap_or_else(|| {
                    replacements.extend_from_slice(seq);
                    replacements.len() - seq.len()
                });
            debug_assert!(offset <= usize::from(u16::MAX));
            debug_assert!(seq.len() <= usize::from(u8::MAX));
            MappingKind::Table {
                offset: offset as u16,
                len: seq.len() as u8,
            }
        }
    }
}

fn classify(cp: u32) -> RunClass {
    // The surrogate gap is never queried through `char`, but the line
    // must stay contiguous across it
    let Some(c) = char::from_u32(cp) else {
        return RunClass::Disallowed;
    };

    match c {
        'ß' => return RunClass::Deviation(vec!['s', 's']),
        'ς' => return RunClass::Deviation(vec!['σ']),
        // Joiners survive non-transitional processing, vanish under
        // transitional
        '\u{200C}' | '\u{200D}' => return RunClass::Deviation(Vec::new()),
        '\u{00AD}'
        | '\u{034F}'
        | '\u{180B}'..='\u{180D}'
        | '\u{FE00}'..='\u{FE0F}'
        | '\u{FEFF}'
        | '\u{E0100}'..='\u{E01EF}' => return RunClass::Ignored,
        // Ideographic label separators; U+3002 is NFKC-stable, so the
        // fast path below would miss it
        '\u{3002}' | '\u{FF0E}' | '\u{FF61}' => {
            return RunClass::MappedDelta(i64::from('.' as u32) - i64::from(cp));
        }
        _ => {}
    }

    if is_forbidden(c) {
        return RunClass::Disallowed;
    }

    // Fast path: already lowercase and NFKC
    if is_nfkc_quick(core::iter::once(c)) == IsNormalized::Yes {
        let mut lower = c.to_lowercase();
        if lower.next() == Some(c) && lower.next().is_none() {
            return RunClass::Valid;
        }
    }

    let mapped = uts46_map(c);
    if mapped.is_empty() {
        return RunClass::Ignored;
    }
    if mapped.len() == 1 && mapped[0] == c {
        return RunClass::Valid;
    }
    if mapped
        .iter()
        .any(|&m| m.is_ascii() && !matches!(m, 'a'..='z' | '0'..='9' | '-' | '.'))
    {
        return RunClass::DisallowedStd3Mapped(mapped);
    }
    if mapped.len() == 1 {
        RunClass::MappedDelta(i64::from(mapped[0] as u32) - i64::from(cp))
    } else {
        RunClass::MappedSeq(mapped)
    }
}

/// Code points that can never appear in a domain in any form.
fn is_forbidden(c: char) -> bool {
    let cp = c as u32;
    if c.is_control() || c.is_whitespace() {
        return true;
    }
    // Noncharacters
    if (0xFDD0..=0xFDEF).contains(&cp) || (cp & 0xFFFE) == 0xFFFE {
        return true;
    }
    // Private use
    if (0xE000..=0xF8FF).contains(&cp)
        || (0xF_0000..=0xF_FFFD).contains(&cp)
        || (0x10_0000..=0x10_FFFD).contains(&cp)
    {
        return true;
    }
    // Direction and format controls outside the ignored/deviation sets
    matches!(
        cp,
        0x061C
            | 0x200E..=0x200F
            | 0x202A..=0x202E
            | 0x2060..=0x2064
            | 0x2066..=0x206F
            | 0xFFF9..=0xFFFB
            | 0xFFFD
            | 0xE0000..=0xE00FF
    )
}

/// The mapping step: lowercase + NFKC to a fixed point, with the
/// ideographic label separators folded to `.`.
fn uts46_map(c: char) -> Vec<char> {
    let mut current = vec![c];
    for _ in 0..4 {
        let mut step: Vec<char> = Vec::with_capacity(current.len());
        for &x in &current {
            match x {
                '\u{3002}' | '\u{FF0E}' | '\u{FF61}' => step.push('.'),
                _ => step.extend(x.to_lowercase()),
            }
        }
        let normalized: Vec<char> = step.into_iter().nfkc().collect();
        if normalized == current {
            break;
        }
        current = normalized;
    }
    current
}

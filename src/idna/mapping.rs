//! The IDNA mapping schema over the code-point database.
//!
//! ASCII payload (2 bytes): a 2-bit status and an 8-bit replacement used
//! when the status is `mapped`.
//!
//! Unicode payload (4 bytes): bits 28..=30 carry the status, bits 24..=25
//! the mapping kind. `single` and `rebased` mappings carry a 21-bit scalar
//! in bits 0..=20; `table` mappings carry a 16-bit offset (bits 0..=15)
//! and an 8-bit length (bits 16..=23) into the flat replacements array.

use crate::db::CodePointSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsciiStatus {
    Valid,
    DisallowedStd3Valid,
    Mapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AsciiEntry(u16);

impl AsciiEntry {
    const STATUS_SHIFT: u16 = 8;

    pub fn valid() -> Self {
        Self(0)
    }

    pub fn disallowed_std3_valid() -> Self {
        Self(1 << Self::STATUS_SHIFT)
    }

    pub fn mapped(to: u8) -> Self {
        Self((2 << Self::STATUS_SHIFT) | u16::from(to))
    }

    pub fn status(self) -> AsciiStatus {
        match self.0 >> Self::STATUS_SHIFT {
            0 => AsciiStatus::Valid,
            1 => AsciiStatus::DisallowedStd3Valid,
            _ => AsciiStatus::Mapped,
        }
    }

    /// The replacement byte; meaningful only for `Mapped`.
    pub fn replacement(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnicodeStatus {
    Valid,
    Deviation,
    DisallowedStd3Valid,
    Mapped,
    DisallowedStd3Mapped,
    Ignored,
    Disallowed,
}

/// How a mapped entry rewrites its code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    /// No replacement payload (valid/ignored/disallowed, or a deviation
    /// that simply drops its code point under transitional processing)
    None,
    /// Replace with one scalar, the same for the whole range
    Single(u32),
    /// Replace `c` with `new_origin + (c - range_start)`
    Rebased { new_origin: u32 },
    /// Replace with `replacements[offset..offset + len]`
    Table { offset: u16, len: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnicodeEntry(u32);

impl UnicodeEntry {
    const STATUS_SHIFT: u32 = 28;
    const KIND_SHIFT: u32 = 24;
    const SCALAR_MASK: u32 = 0x001F_FFFF;

    pub fn new(status: UnicodeStatus, mapping: MappingKind) -> Self {
        let status_bits = match status {
            UnicodeStatus::Valid => 0,
            UnicodeStatus::Deviation => 1,
            UnicodeStatus::DisallowedStd3Valid => 2,
            UnicodeStatus::Mapped => 3,
            UnicodeStatus::DisallowedStd3Mapped => 4,
            UnicodeStatus::Ignored => 5,
            UnicodeStatus::Disallowed => 6,
        };
        let (kind_bits, payload) = match mapping {
            MappingKind::None => (0, 0),
            MappingKind::Single(scalar) => {
                debug_assert!(scalar <= Self::SCALAR_MASK);
                (1, scalar)
            }
            MappingKind::Rebased { new_origin } => {
                debug_assert!(new_origin <= Self::SCALAR_MASK);
                (2, new_origin)
            }
            MappingKind::Table { offset, len } => (3, u32::from(offset) | (u32::from(len) << 16)),
        };
        Self((status_bits << Self::STATUS_SHIFT) | (kind_bits << Self::KIND_SHIFT) | payload)
    }

    pub fn status(self) -> UnicodeStatus {
        match (self.0 >> Self::STATUS_SHIFT) & 0x7 {
            0 => UnicodeStatus::Valid,
            1 => UnicodeStatus::Deviation,
            2 => UnicodeStatus::DisallowedStd3Valid,
            3 => UnicodeStatus::Mapped,
            4 => UnicodeStatus::DisallowedStd3Mapped,
            5 => UnicodeStatus::Ignored,
            _ => UnicodeStatus::Disallowed,
        }
    }

    pub fn mapping(self) -> MappingKind {
        match (self.0 >> Self::KIND_SHIFT) & 0x3 {
            0 => MappingKind::None,
            1 => MappingKind::Single(self.0 & Self::SCALAR_MASK),
            2 => MappingKind::Rebased {
                new_origin: self.0 & Self::SCALAR_MASK,
            },
            _ => MappingKind::Table {
                offset: (self.0 & 0xFFFF) as u16,
                len: ((self.0 >> 16) & 0xFF) as u8,
            },
        }
    }
}

impl Default for UnicodeEntry {
    /// The sentinel payload for otherwise-uncovered rows.
    fn default() -> Self {
        Self::new(UnicodeStatus::Disallowed, MappingKind::None)
    }
}

/// Marker type wiring the IDNA payloads into the generic database.
pub struct IdnaMappingData;

impl CodePointSchema for IdnaMappingData {
    type AsciiData = AsciiEntry;
    type UnicodeData = UnicodeEntry;

    const BMP_INDEX_BITS: u32 = 6;

    fn rebase(entry: UnicodeEntry, original_start: u32, new_start: u32) -> UnicodeEntry {
        match entry.mapping() {
            // Position-independent payloads carry over unchanged
            MappingKind::None | MappingKind::Single(_) | MappingKind::Table { .. } => entry,
            MappingKind::Rebased { new_origin } => {
                // The generator splits rebased runs itself; a rebased
                // entry must never straddle a plane boundary.
                debug_assert!(false, "rebased mapping split across plane boundary");
                UnicodeEntry::new(
                    entry.status(),
                    MappingKind::Rebased {
                        new_origin: new_origin + (new_start - original_start),
                    },
                )
            }
        }
    }
}

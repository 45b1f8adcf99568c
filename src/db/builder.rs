//! Offline construction of a [`CodePointDatabase`].
//!
//! ASCII entries are appended in order for `U+0000..=U+007F`, then
//! Unicode range entries in strictly increasing code-point order starting
//! at `U+0080`. Each entry's range runs to the next entry's start (the
//! final range runs to `U+10FFFF`). Ranges crossing the BMP/supplementary
//! boundary or a plane boundary are split, with the schema's `rebase`
//! hook adjusting the payload for the new starting code point.

use super::{CodePointDatabase, CodePointSchema, PlaneTable};

const UNICODE_END: u32 = 0x11_0000;

pub struct CodePointDatabaseBuilder<S: CodePointSchema> {
    ascii: Vec<S::AsciiData>,
    entries: Vec<(u32, S::UnicodeData)>,
}

impl<S: CodePointSchema> Default for CodePointDatabaseBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CodePointSchema> CodePointDatabaseBuilder<S> {
    pub fn new() -> Self {
        Self {
            ascii: Vec::with_capacity(128),
            entries: Vec::new(),
        }
    }

    /// Append the payload for the next ASCII code point. Must be called
    /// exactly 128 times, in code-point order.
    pub fn append_ascii(&mut self, data: S::AsciiData) {
        debug_assert!(self.ascii.len() < 128);
        self.ascii.push(data);
    }

    /// Append a range entry starting at `start`. The first call must use
    /// `U+0080`; subsequent calls must be strictly increasing.
    pub fn append_unicode(&mut self, start: u32, data: S::UnicodeData) {
        debug_assert!(start >= 0x80 && start < UNICODE_END);
        match self.entries.last() {
            None => debug_assert_eq!(start, 0x80),
            Some(&(previous, _)) => debug_assert!(start > previous),
        }
        self.entries.push((start, data));
    }

    pub fn finish(self) -> CodePointDatabase<S> {
        debug_assert_eq!(self.ascii.len(), 128);
        debug_assert!(!self.entries.is_empty());

        // Split every range at the plane boundaries it crosses, rebasing
        // the payload for each new starting code point.
        let mut split: Vec<(u32, S::UnicodeData)> = Vec::with_capacity(self.entries.len() + 16);
        for (i, &(start, data)) in self.entries.iter().enumerate() {
            let end = self
                .entries
                .get(i + 1)
                .map_or(UNICODE_END, |&(next, _)| next);
            split.push((start, data));
            let mut boundary = (start >> 16) * 0x1_0000 + 0x1_0000;
            while boundary < end {
                split.push((boundary, S::rebase(data, start, boundary)));
                boundary += 0x1_0000;
            }
        }

        let mut bmp_codepoint: Vec<u16> = Vec::new();
        let mut bmp_data: Vec<S::UnicodeData> = Vec::new();
        let mut planes: [Option<PlaneTable<S>>; 16] = [const { None }; 16];

        for &(start, data) in &split {
            if start <= 0xFFFF {
                bmp_codepoint.push(start as u16);
                bmp_data.push(data);
            } else {
                let plane = ((start >> 16) - 1) as usize;
                let table = planes[plane].get_or_insert_with(|| PlaneTable {
                    codepoint: Vec::new(),
                    data: Vec::new(),
                });
                table.codepoint.push((start & 0xFFFF) as u16);
                table.data.push(data);
            }
        }

        // First-stage BMP index: for bucket k, the row applying to the
        // bucket's first code point; lookups then search rows
        // index[k]..=index[k + 1].
        let shift = 16 - S::BMP_INDEX_BITS;
        let buckets = 1usize << S::BMP_INDEX_BITS;
        let mut bmp_index: Vec<u16> = Vec::with_capacity(buckets + 1);
        for k in 0..=buckets {
            let first_cp = ((k as u32) << shift).min(0xFFFF) as u16;
            let row = bmp_codepoint
                .partition_point(|&cp| cp <= first_cp)
                .saturating_sub(1);
            bmp_index.push(row as u16);
        }

        // Deduplicate plane tables; empty planes share a sentinel table
        // holding the single row {0}.
        let mut plane_tables: Vec<PlaneTable<S>> = Vec::new();
        let mut plane_map = [0u8; 16];
        for (plane, slot) in planes.into_iter().enumerate() {
            let table = slot.unwrap_or_else(|| PlaneTable {
                codepoint: vec![0],
                data: vec![S::UnicodeData::default()],
            });
            let index = plane_tables
                .iter()
                .position(|existing| *existing == table)
                .unwrap_or_else(|| {
                    plane_tables.push(table);
                    plane_tables.len() - 1
                });
            plane_map[plane] = index as u8;
        }

        let db = CodePointDatabase {
            ascii: self.ascii,
            bmp_index,
            bmp_codepoint,
            bmp_data,
            plane_tables,
            plane_map,
        };
        db.validate();
        db
    }
}

//! Read-only, memory-mapped triple index.
//!
//! Header (LE, 48 bytes):
//!   magic[4]          = "TRIX"
//!   version[2]        = 1
//!   rsv[2]            = 0
//!   term_count[4]
//!   triples_crc[4]    = crc32(triples block)
//!   triple_count[8]
//!   offsets_off[8]    = term offset table
//!   hash_off[8]       = term hash table
//!   triples_off[8]    = triples block
//!
//! Terms block (at HDR_SIZE): UTF-8 term bytes back to back.
//! Offset table: (term_count + 1) * u64, term i spans [off[i], off[i+1]).
//! Hash table: u64 cap, then cap * { u64 xxh3(term), u32 id, u32 pad }, id 0 = empty.
//! Triples block: triple_count * { u32 s, u32 p, u32 o }, 1-based ids, sorted by (s, p, o).

use crate::consts::{
    HASH_ENTRY_SIZE, HDR_HASH_OFF, HDR_OFFSETS_OFF, HDR_SIZE, HDR_TERM_COUNT, HDR_TRIPLES_CRC,
    HDR_TRIPLES_OFF, HDR_TRIPLE_COUNT, MAGIC_IDX, OFFSET_SIZE, TRIPLE_SIZE, VERSION,
};
use crate::errors::{Result, StoreError};
use crate::triple::{TriplePattern, TripleRef};
use crate::utils::{crc32, h64, u32_at, u64_at};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct TripleIndex {
    path: PathBuf,
    _f: File,
    mmap: Mmap,
    term_count: u32,
    triple_count: usize,
    offsets_off: usize,
    hash_off: usize,
    hash_cap: usize,
    triples_off: usize,
}

fn to_usize(v: u64, what: &str) -> Result<usize> {
    usize::try_from(v).map_err(|_| StoreError::corrupt(format!("{what} does not fit in memory")))
}

fn span(off: usize, count: usize, size: usize, what: &str) -> Result<usize> {
    count
        .checked_mul(size)
        .and_then(|len| off.checked_add(len))
        .ok_or_else(|| StoreError::corrupt(format!("{what} overflows")))
}

impl TripleIndex {
    /// Map the file and validate its layout and checksum.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let f = File::open(&path)?;
        if f.metadata()?.len() < HDR_SIZE as u64 {
            return Err(StoreError::BadHeader);
        }
        // published indexes are replaced by rename, never rewritten in place
        let mmap = unsafe { Mmap::map(&f)? };
        if &mmap[0..4] != MAGIC_IDX { return Err(StoreError::BadHeader); }
        let ver = u16::from_le_bytes([mmap[4], mmap[5]]);
        if ver != VERSION { return Err(StoreError::BadHeader); }

        let len = mmap.len();
        let term_count = u32_at(&mmap, HDR_TERM_COUNT);
        let triples_crc = u32_at(&mmap, HDR_TRIPLES_CRC);
        let triple_count = to_usize(u64_at(&mmap, HDR_TRIPLE_COUNT), "triple count")?;
        let offsets_off = to_usize(u64_at(&mmap, HDR_OFFSETS_OFF), "offset table")?;
        let hash_off = to_usize(u64_at(&mmap, HDR_HASH_OFF), "hash table")?;
        let triples_off = to_usize(u64_at(&mmap, HDR_TRIPLES_OFF), "triples block")?;

        if offsets_off < HDR_SIZE {
            return Err(StoreError::corrupt("offset table overlaps header"));
        }
        let offsets_end = span(offsets_off, term_count as usize + 1, OFFSET_SIZE, "offset table")?;
        if offsets_end != hash_off || hash_off.saturating_add(8) > len {
            return Err(StoreError::corrupt("offset table does not end at hash table"));
        }
        let hash_cap = to_usize(u64_at(&mmap, hash_off), "hash capacity")?;
        if !hash_cap.is_power_of_two() || hash_cap <= term_count as usize {
            return Err(StoreError::corrupt(format!("bad hash capacity {hash_cap}")));
        }
        if span(hash_off + 8, hash_cap, HASH_ENTRY_SIZE, "hash table")? != triples_off {
            return Err(StoreError::corrupt("hash table does not end at triples block"));
        }
        if span(triples_off, triple_count, TRIPLE_SIZE, "triples block")? != len {
            return Err(StoreError::corrupt("triples block does not end at file end"));
        }

        let mut prev = HDR_SIZE as u64;
        for i in 0..=term_count as usize {
            let off = u64_at(&mmap, offsets_off + i * OFFSET_SIZE);
            if off < prev || off > offsets_off as u64 || (i == 0 && off != HDR_SIZE as u64) {
                return Err(StoreError::corrupt(format!("term offset {i} out of order")));
            }
            prev = off;
        }
        if prev != offsets_off as u64 {
            return Err(StoreError::corrupt("terms block size mismatch"));
        }

        if crc32(&mmap[triples_off..len]) != triples_crc {
            return Err(StoreError::corrupt("triples checksum mismatch"));
        }

        tracing::debug!(
            path = %path.display(),
            terms = term_count,
            triples = triple_count,
            "opened triple index"
        );
        Ok(Self {
            path,
            _f: f,
            mmap,
            term_count,
            triple_count,
            offsets_off,
            hash_off,
            hash_cap,
            triples_off,
        })
    }

    pub fn path(&self) -> &Path { &self.path }
    pub fn term_count(&self) -> u32 { self.term_count }
    pub fn triple_count(&self) -> usize { self.triple_count }

    /// Term text for a 1-based id.
    pub fn term(&self, id: u32) -> Result<&str> {
        if id == 0 || id > self.term_count {
            return Err(StoreError::corrupt(format!("term id {id} out of range")));
        }
        let i = (id - 1) as usize;
        let start = u64_at(&self.mmap, self.offsets_off + i * OFFSET_SIZE) as usize;
        let end = u64_at(&self.mmap, self.offsets_off + (i + 1) * OFFSET_SIZE) as usize;
        std::str::from_utf8(&self.mmap[start..end])
            .map_err(|_| StoreError::corrupt(format!("term {id} is not UTF-8")))
    }

    /// Id of a term, or None when the dictionary does not contain it.
    pub fn term_id(&self, term: &str) -> Option<u32> {
        let h = h64(term.as_bytes());
        let mask = self.hash_cap - 1;
        let mut idx = (h as usize) & mask;
        for _ in 0..self.hash_cap {
            let epos = self.hash_off + 8 + idx * HASH_ENTRY_SIZE;
            let id = u32_at(&self.mmap, epos + 8);
            if id == 0 { return None; }
            if u64_at(&self.mmap, epos) == h && self.term(id).ok() == Some(term) {
                return Some(id);
            }
            idx = (idx + 1) & mask;
        }
        None
    }

    #[inline]
    fn ids_at(&self, i: usize) -> [u32; 3] {
        let pos = self.triples_off + i * TRIPLE_SIZE;
        [u32_at(&self.mmap, pos), u32_at(&self.mmap, pos + 4), u32_at(&self.mmap, pos + 8)]
    }

    fn partition_point(&self, pred: impl Fn(&[u32; 3]) -> bool) -> usize {
        let (mut lo, mut hi) = (0usize, self.triple_count);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if pred(&self.ids_at(mid)) { lo = mid + 1 } else { hi = mid }
        }
        lo
    }

    /// Range of triples whose leading ids equal `prefix`.
    fn prefix_range(&self, prefix: &[u32]) -> (usize, usize) {
        let k = prefix.len();
        if k == 0 { return (0, self.triple_count); }
        let start = self.partition_point(|ids| ids[..k] < prefix[..]);
        let end = self.partition_point(|ids| ids[..k] <= prefix[..]);
        (start, end)
    }

    fn resolve(&self, [s, p, o]: [u32; 3]) -> Result<TripleRef<'_>> {
        Ok(TripleRef { subject: self.term(s)?, predicate: self.term(p)?, object: self.term(o)? })
    }

    /// Triples matching `pattern`, in (s, p, o) order.
    ///
    /// A concrete term missing from the dictionary matches nothing.
    pub fn scan(&self, pattern: &TriplePattern) -> Matches<'_> {
        let mut bound = [None; 3];
        for (slot, term) in bound.iter_mut().zip(pattern.terms()) {
            if let Some(term) = term {
                match self.term_id(term) {
                    Some(id) => *slot = Some(id),
                    None => return Matches::empty(self),
                }
            }
        }
        let prefix: Vec<u32> = bound.iter().map_while(|b| *b).collect();
        let (pos, end) = self.prefix_range(&prefix);
        Matches { index: self, bound, pos, end }
    }
}

/// Iterator over the triples of one search.
pub struct Matches<'a> {
    index: &'a TripleIndex,
    bound: [Option<u32>; 3],
    pos: usize,
    end: usize,
}

impl<'a> Matches<'a> {
    fn empty(index: &'a TripleIndex) -> Self {
        Self { index, bound: [None; 3], pos: 0, end: 0 }
    }
}

impl<'a> Iterator for Matches<'a> {
    type Item = Result<TripleRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.end {
            let ids = self.index.ids_at(self.pos);
            self.pos += 1;
            let rejected = self
                .bound
                .iter()
                .zip(ids)
                .any(|(want, id)| matches!(want, Some(w) if *w != id));
            if rejected { continue; }
            return Some(self.index.resolve(ids));
        }
        None
    }
}

//! Builds read-only triple index files (see `index` for the layout).
//!
//! Terms are sorted lexicographically before ids are assigned, so the SPO
//! ordering of the triples block is also the lexicographic ordering of the
//! string triples.

use crate::consts::{
    HASH_ENTRY_SIZE, HDR_SIZE, MAGIC_IDX, OFFSET_SIZE, TRIPLE_SIZE, VERSION,
};
use crate::errors::{Result, StoreError};
use crate::triple::Triple;
use crate::utils::{crc32, fsync_dir, h64, table_capacity, write_u32, write_u64};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Collects triples in memory, then publishes an index file atomically.
pub struct IndexWriter {
    path_final: PathBuf,
    triples: BTreeSet<Triple>,
}

impl IndexWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path_final = path.as_ref().to_path_buf();
        if path_final.file_name().is_none() {
            return Err(StoreError::InvalidInput(format!(
                "index path {} has no file name",
                path_final.display()
            )));
        }
        Ok(Self { path_final, triples: BTreeSet::new() })
    }

    pub fn add(&mut self, subject: &str, predicate: &str, object: &str) -> Result<()> {
        for (what, term) in [("subject", subject), ("predicate", predicate), ("object", object)] {
            if term.is_empty() {
                return Err(StoreError::InvalidInput(format!("{what} cannot be empty")));
            }
        }
        self.triples.insert(Triple::new(subject, predicate, object));
        Ok(())
    }

    pub fn add_triple(&mut self, triple: &Triple) -> Result<()> {
        self.add(&triple.subject, &triple.predicate, &triple.object)
    }

    /// Number of distinct triples collected so far.
    pub fn len(&self) -> usize { self.triples.len() }

    pub fn is_empty(&self) -> bool { self.triples.is_empty() }

    /// Write terms, offsets, hash table and triples, then publish over the target path.
    pub fn finalize(self) -> Result<PathBuf> {
        let terms: Vec<&str> = self
            .triples
            .iter()
            .flat_map(|t| [t.subject.as_str(), t.predicate.as_str(), t.object.as_str()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let term_count = u32::try_from(terms.len())
            .map_err(|_| StoreError::InvalidInput("too many distinct terms".into()))?;

        // BTreeSet<Triple> iterates in (s, p, o) string order and ids are
        // monotonic in string order, so the encoded ids come out sorted.
        let mut encoded: Vec<[u32; 3]> = Vec::with_capacity(self.triples.len());
        for t in &self.triples {
            encoded.push([
                id_of(&terms, &t.subject)?,
                id_of(&terms, &t.predicate)?,
                id_of(&terms, &t.object)?,
            ]);
        }

        let mut body = Vec::new();
        let mut offsets = Vec::with_capacity(terms.len() + 1);
        for term in &terms {
            offsets.push((HDR_SIZE + body.len()) as u64);
            body.extend_from_slice(term.as_bytes());
        }
        offsets.push((HDR_SIZE + body.len()) as u64);

        let offsets_off = (HDR_SIZE + body.len()) as u64;
        body.reserve(offsets.len() * OFFSET_SIZE);
        for off in &offsets {
            write_u64(&mut body, *off)?;
        }

        let hash_off = (HDR_SIZE + body.len()) as u64;
        body.extend_from_slice(&build_term_table(&terms));

        let triples_off = (HDR_SIZE + body.len()) as u64;
        let mut block = Vec::with_capacity(encoded.len() * TRIPLE_SIZE);
        for ids in &encoded {
            for id in ids {
                write_u32(&mut block, *id)?;
            }
        }
        let triples_crc = crc32(&block);
        body.extend_from_slice(&block);

        let mut hdr = Vec::with_capacity(HDR_SIZE);
        hdr.extend_from_slice(MAGIC_IDX);
        hdr.extend_from_slice(&VERSION.to_le_bytes());
        hdr.extend_from_slice(&0u16.to_le_bytes());
        hdr.extend_from_slice(&term_count.to_le_bytes());
        hdr.extend_from_slice(&triples_crc.to_le_bytes());
        hdr.extend_from_slice(&(encoded.len() as u64).to_le_bytes());
        hdr.extend_from_slice(&offsets_off.to_le_bytes());
        hdr.extend_from_slice(&hash_off.to_le_bytes());
        hdr.extend_from_slice(&triples_off.to_le_bytes());
        debug_assert_eq!(hdr.len(), HDR_SIZE);

        let dir = match self.path_final.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::Builder::new().prefix("trix_idx_").tempfile_in(dir)?;
        {
            let f = tmp.as_file_mut();
            f.write_all(&hdr)?;
            f.write_all(&body)?;
            f.sync_all()?;
        }
        tmp.persist(&self.path_final)?;
        let _ = fsync_dir(&self.path_final);

        tracing::debug!(
            path = %self.path_final.display(),
            terms = term_count,
            triples = encoded.len(),
            "published triple index"
        );
        Ok(self.path_final)
    }
}

fn id_of(terms: &[&str], term: &str) -> Result<u32> {
    terms
        .binary_search(&term)
        .map(|i| i as u32 + 1)
        .map_err(|_| StoreError::InvalidInput(format!("term {term:?} missing from dictionary")))
}

/// cap(u64) then cap × { h(8), id(4), pad(4) }; id 0 marks an empty slot.
fn build_term_table(terms: &[&str]) -> Vec<u8> {
    let cap = table_capacity(terms.len());
    let mut table: Vec<(u64, u32)> = vec![(0, 0); cap];
    for (i, term) in terms.iter().enumerate() {
        let h = h64(term.as_bytes());
        let mut idx = (h as usize) & (cap - 1);
        while table[idx].1 != 0 {
            idx = (idx + 1) & (cap - 1);
        }
        table[idx] = (h, i as u32 + 1);
    }
    let mut buf = Vec::with_capacity(8 + cap * HASH_ENTRY_SIZE);
    buf.extend_from_slice(&(cap as u64).to_le_bytes());
    for (h, id) in table {
        buf.extend_from_slice(&h.to_le_bytes());
        buf.extend_from_slice(&id.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
    }
    buf
}

// crates/trix_core/src/consts.rs

use core::mem::size_of;

pub const MAGIC_IDX: &[u8; 4] = b"TRIX";
pub const VERSION: u16 = 1;

pub const HDR_SIZE: usize = 48;

/// One u64 per term boundary.
pub const OFFSET_SIZE: usize = 8;
/// { u64 hash, u32 id, u32 pad }
pub const HASH_ENTRY_SIZE: usize = 16;
/// { u32 s, u32 p, u32 o }
pub const TRIPLE_SIZE: usize = 12;

// header field positions
pub const HDR_TERM_COUNT: usize = 8;
pub const HDR_TRIPLES_CRC: usize = 12;
pub const HDR_TRIPLE_COUNT: usize = 16;
pub const HDR_OFFSETS_OFF: usize = 24;
pub const HDR_HASH_OFF: usize = 32;
pub const HDR_TRIPLES_OFF: usize = 40;

const _: () = {
    assert!(TRIPLE_SIZE == 3 * size_of::<u32>());
    assert!(HDR_TRIPLES_OFF + size_of::<u64>() == HDR_SIZE);
};

use byteorder::{ByteOrder, LittleEndian as LE, WriteBytesExt};
use std::io::{self, Write};
use std::path::Path;

pub fn crc32(data: &[u8]) -> u32 { crc32fast::hash(data) }

#[inline]
pub fn h64(key: &[u8]) -> u64 { xxhash_rust::xxh3::xxh3_64(key) }

/// Open addressing table size for `n` entries (power of two, ≈0.8 load factor).
pub fn table_capacity(n: usize) -> usize {
    let mut cap = 1usize;
    while cap < (n * 5) / 4 + 1 { cap <<= 1 }
    cap
}

pub fn write_u64<W: Write>(w: &mut W, v: u64) -> io::Result<()> { w.write_u64::<LE>(v) }
pub fn write_u32<W: Write>(w: &mut W, v: u32) -> io::Result<()> { w.write_u32::<LE>(v) }

#[inline]
pub fn u32_at(buf: &[u8], pos: usize) -> u32 { LE::read_u32(&buf[pos..pos + 4]) }
#[inline]
pub fn u64_at(buf: &[u8], pos: usize) -> u64 { LE::read_u64(&buf[pos..pos + 8]) }

#[cfg(unix)]
pub fn fsync_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let f = std::fs::OpenOptions::new().read(true).custom_flags(libc::O_DIRECTORY).open(dir)?;
    f.sync_all()
}
#[cfg(not(unix))]
pub fn fsync_dir(_path: &Path) -> io::Result<()> { Ok(()) }

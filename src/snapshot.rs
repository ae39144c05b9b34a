//! On-disk `.ktx` snapshot of a [`TrieIndex`]: header + Pod sections.
//!
//! Layout (all integers little-endian, sections 8-byte aligned):
//! header, node records, bucket pool (flat entry-id array), entry
//! directory, entry blob. A snapshot is a whole-index save/load; it is not
//! an incremental or crash-safe log.

use byteorder::{LittleEndian as LE, ReadBytesExt, WriteBytesExt};
use bytemuck::{Pod, Zeroable};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::nucleotide::MAX_FANOUT;
use crate::sequence::{CompareMode, KMer};
use crate::trie::{Node, TrieIndex};

pub const KTX_MAGIC: u32 = 0x4B_54_58_31; // "KTX1"
pub const KTX_VERSION: u32 = 1;

const HEADER_LEN: u64 = 72;

/// Errors from snapshot serialization.
#[derive(Debug, Error)]
pub enum IndexError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid file contents.
    #[error("Invalid KTX file: {0}")]
    Format(String),
    /// Bytemuck cast failed.
    #[error("Cast error: {0}")]
    Cast(String),
}

#[derive(Clone, Copy, Default)]
struct SnapshotHeader {
    magic: u32,
    version: u32,
    mode_u8: u8,
    capacity: u32,
    node_count: u32,
    entry_count: u32,
    k_min: u32,
    k_max: u32,
    nodes_off: u64,
    buckets_off: u64,
    dir_off: u64,
    blob_off: u64,
    bucket_total: u32,
    blob_len: u32,
}

impl SnapshotHeader {
    fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u32::<LE>(self.magic)?;
        w.write_u32::<LE>(self.version)?;
        w.write_u8(self.mode_u8)?;
        w.write_u8(0)?;
        w.write_u16::<LE>(0)?;
        w.write_u32::<LE>(self.capacity)?;
        w.write_u32::<LE>(self.node_count)?;
        w.write_u32::<LE>(self.entry_count)?;
        w.write_u32::<LE>(self.k_min)?;
        w.write_u32::<LE>(self.k_max)?;
        w.write_u64::<LE>(self.nodes_off)?;
        w.write_u64::<LE>(self.buckets_off)?;
        w.write_u64::<LE>(self.dir_off)?;
        w.write_u64::<LE>(self.blob_off)?;
        w.write_u32::<LE>(self.bucket_total)?;
        w.write_u32::<LE>(self.blob_len)?;
        Ok(())
    }

    fn read_from<R: Read>(r: &mut R) -> std::io::Result<Self> {
        let magic = r.read_u32::<LE>()?;
        let version = r.read_u32::<LE>()?;
        let mode_u8 = r.read_u8()?;
        let _pad8 = r.read_u8()?;
        let _pad16 = r.read_u16::<LE>()?;
        let capacity = r.read_u32::<LE>()?;
        let node_count = r.read_u32::<LE>()?;
        let entry_count = r.read_u32::<LE>()?;
        let k_min = r.read_u32::<LE>()?;
        let k_max = r.read_u32::<LE>()?;
        let nodes_off = r.read_u64::<LE>()?;
        let buckets_off = r.read_u64::<LE>()?;
        let dir_off = r.read_u64::<LE>()?;
        let blob_off = r.read_u64::<LE>()?;
        let bucket_total = r.read_u32::<LE>()?;
        let blob_len = r.read_u32::<LE>()?;
        Ok(SnapshotHeader {
            magic,
            version,
            mode_u8,
            capacity,
            node_count,
            entry_count,
            k_min,
            k_max,
            nodes_off,
            buckets_off,
            dir_off,
            blob_off,
            bucket_total,
            blob_len,
        })
    }
}

/// One node, fixed width. `labels`/`children` use the first `n_children`
/// slots; `bucket_off`/`bucket_len` index the bucket pool.
#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
struct NodeRec {
    level: u32,
    n_children: u32,
    labels: [u8; 4],
    children: [u32; 4],
    bucket_off: u32,
    bucket_len: u32,
}

/// Entry directory record: byte range of one key in the blob.
#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
struct EntryRec {
    off: u32,
    len: u32,
}

#[inline]
fn align8(pos: u64) -> u64 {
    (pos + 7) & !7
}

fn write_padded<W: Write>(w: &mut W, pos: &mut u64, bytes: &[u8]) -> std::io::Result<()> {
    let aligned = align8(*pos);
    if aligned > *pos {
        w.write_all(&[0u8; 8][..(aligned - *pos) as usize])?;
    }
    w.write_all(bytes)?;
    *pos = aligned + bytes.len() as u64;
    Ok(())
}

/// Writer that serializes an in-memory [`TrieIndex`] to a `.ktx` file.
pub struct TrieSnapshotWriter<'a> {
    idx: &'a TrieIndex,
}

impl<'a> TrieSnapshotWriter<'a> {
    pub fn new(idx: &'a TrieIndex) -> Self {
        Self { idx }
    }

    /// Serialize to disk. The produced file is deterministic for a given
    /// insertion history.
    pub fn write_to(&self, path: &Path) -> Result<(), IndexError> {
        let nodes = self.idx.nodes();
        let entries = self.idx.entries();

        let mut recs = Vec::with_capacity(nodes.len());
        let mut pool: Vec<u32> = Vec::new();
        for node in nodes {
            let mut rec = NodeRec {
                level: node.level as u32,
                n_children: node.children.len() as u32,
                bucket_off: pool.len() as u32,
                bucket_len: node.bucket.len() as u32,
                ..NodeRec::default()
            };
            debug_assert!(node.children.len() <= MAX_FANOUT);
            rec.labels[..node.labels.len()].copy_from_slice(&node.labels);
            rec.children[..node.children.len()].copy_from_slice(&node.children);
            pool.extend_from_slice(&node.bucket);
            recs.push(rec);
        }

        let mut dir = Vec::with_capacity(entries.len());
        let mut blob: Vec<u8> = Vec::new();
        for key in entries {
            dir.push(EntryRec {
                off: blob.len() as u32,
                len: key.k() as u32,
            });
            blob.extend_from_slice(key.as_bytes());
        }

        let nodes_off = HEADER_LEN;
        let buckets_off = align8(nodes_off + (recs.len() * std::mem::size_of::<NodeRec>()) as u64);
        let dir_off = align8(buckets_off + (pool.len() * 4) as u64);
        let blob_off = align8(dir_off + (dir.len() * std::mem::size_of::<EntryRec>()) as u64);

        let (k_min, k_max) = self.idx.k_range().unwrap_or((0, 0));
        let header = SnapshotHeader {
            magic: KTX_MAGIC,
            version: KTX_VERSION,
            mode_u8: match self.idx.mode() {
                CompareMode::ContentFirst => 0,
                CompareMode::LengthFirst => 1,
            },
            capacity: self.idx.capacity() as u32,
            node_count: recs.len() as u32,
            entry_count: dir.len() as u32,
            k_min: k_min as u32,
            k_max: k_max as u32,
            nodes_off,
            buckets_off,
            dir_off,
            blob_off,
            bucket_total: pool.len() as u32,
            blob_len: blob.len() as u32,
        };

        let mut file = File::create(path)?;
        header.write_to(&mut file)?;
        let mut pos = HEADER_LEN;
        write_padded(&mut file, &mut pos, bytemuck::cast_slice(&recs))?;
        write_padded(&mut file, &mut pos, bytemuck::cast_slice(&pool))?;
        write_padded(&mut file, &mut pos, bytemuck::cast_slice(&dir))?;
        write_padded(&mut file, &mut pos, &blob)?;
        file.flush()?;
        Ok(())
    }
}

fn section<'a>(map: &'a memmap2::Mmap, off: u64, byte_len: usize) -> Result<&'a [u8], IndexError> {
    let start = off as usize;
    let end = start
        .checked_add(byte_len)
        .ok_or_else(|| IndexError::Format("section overflow".into()))?;
    if end > map.len() {
        return Err(IndexError::Format("section out of bounds".into()));
    }
    Ok(&map[start..end])
}

fn cast_section<T: Pod>(
    map: &memmap2::Mmap,
    off: u64,
    count: usize,
) -> Result<Vec<T>, IndexError> {
    let bytes = section(map, off, count * std::mem::size_of::<T>())?;
    let slice: &[T] =
        bytemuck::try_cast_slice(bytes).map_err(|e| IndexError::Cast(format!("{e:?}")))?;
    Ok(slice.to_vec())
}

/// Open a `.ktx` snapshot, rebuilding an owned [`TrieIndex`].
pub fn open_snapshot(path: &Path) -> Result<TrieIndex, IndexError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(&file);
    let header = SnapshotHeader::read_from(&mut reader)?;

    if header.magic != KTX_MAGIC {
        return Err(IndexError::Format("bad magic".into()));
    }
    if header.version != KTX_VERSION {
        return Err(IndexError::Format("unsupported version".into()));
    }
    let mode = match header.mode_u8 {
        0 => CompareMode::ContentFirst,
        1 => CompareMode::LengthFirst,
        m => return Err(IndexError::Format(format!("unknown compare mode {m}"))),
    };
    if header.capacity == 0 || header.node_count == 0 {
        return Err(IndexError::Format("empty node arena".into()));
    }

    let map = unsafe { memmap2::MmapOptions::new().map(&file)? };

    let recs: Vec<NodeRec> = cast_section(&map, header.nodes_off, header.node_count as usize)?;
    let pool: Vec<u32> = cast_section(&map, header.buckets_off, header.bucket_total as usize)?;
    let dir: Vec<EntryRec> = cast_section(&map, header.dir_off, header.entry_count as usize)?;
    let blob = section(&map, header.blob_off, header.blob_len as usize)?;

    let mut entries = Vec::with_capacity(dir.len());
    for rec in &dir {
        let start = rec.off as usize;
        let end = start + rec.len as usize;
        if end > blob.len() {
            return Err(IndexError::Format("entry out of blob bounds".into()));
        }
        let key = KMer::from_bytes(&blob[start..end])
            .map_err(|e| IndexError::Format(format!("corrupt entry: {e}")))?;
        entries.push(key);
    }

    let mut nodes = Vec::with_capacity(recs.len());
    for rec in &recs {
        let nc = rec.n_children as usize;
        if nc > MAX_FANOUT {
            return Err(IndexError::Format("node fan-out over 4".into()));
        }
        let b_start = rec.bucket_off as usize;
        let b_end = b_start + rec.bucket_len as usize;
        if b_end > pool.len() {
            return Err(IndexError::Format("bucket out of pool bounds".into()));
        }
        let bucket = pool[b_start..b_end].to_vec();
        if bucket.iter().any(|&e| e as usize >= entries.len()) {
            return Err(IndexError::Format("dangling entry id".into()));
        }
        let children = rec.children[..nc].to_vec();
        if children.iter().any(|&c| c as usize >= recs.len()) {
            return Err(IndexError::Format("dangling node id".into()));
        }
        nodes.push(Node {
            level: rec.level as usize,
            labels: rec.labels[..nc].to_vec(),
            children,
            bucket,
        });
    }

    let k_range = if entries.is_empty() {
        None
    } else {
        Some((header.k_min as usize, header.k_max as usize))
    };

    Ok(TrieIndex::from_parts(
        mode,
        header.capacity as usize,
        nodes,
        entries,
        k_range,
    ))
}

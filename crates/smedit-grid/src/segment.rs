//! The atomic storage chunk: a sparse 32-cube of block words with a fixed
//! 26-byte header and a zlib-deflated payload.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use smedit_blocks::{BlockPool, BlockWord, VERSION_LATEST};

use crate::GridError;
use crate::addr::{BLOCKS_PER_SEGMENT, Position};

/// version + timestamp + origin + has-data flag + compressed size.
pub const SEGMENT_HEADER_BYTES: usize = 1 + 8 + 12 + 1 + 4;
const PAYLOAD_BYTES: usize = BLOCKS_PER_SEGMENT * 3;

#[inline]
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Sparse mapping from local block slot (0..32768) to interned block word.
#[derive(Debug, Clone)]
pub struct Segment {
    pub version: u8,
    pub timestamp: u64,
    pub origin: Position,
    blocks: HashMap<u16, Arc<BlockWord>>,
}

impl Segment {
    pub fn new(origin: Position) -> Self {
        Self {
            version: VERSION_LATEST,
            timestamp: now_millis(),
            origin,
            blocks: HashMap::new(),
        }
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// A segment only counts as carrying data while it holds blocks.
    #[inline]
    pub fn has_data(&self) -> bool {
        !self.blocks.is_empty()
    }

    #[inline]
    pub fn get(&self, local: u16) -> Option<&Arc<BlockWord>> {
        self.blocks.get(&local)
    }

    pub fn set(&mut self, local: u16, word: Arc<BlockWord>) {
        self.timestamp = now_millis();
        self.blocks.insert(local, word);
    }

    pub fn remove(&mut self, local: u16) -> Option<Arc<BlockWord>> {
        let removed = self.blocks.remove(&local);
        if removed.is_some() {
            self.timestamp = now_millis();
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &Arc<BlockWord>)> {
        self.blocks.iter().map(|(local, word)| (*local, word))
    }

    /// Serializes header plus deflated payload. An empty segment writes an
    /// all-empty payload with the has-data flag cleared. Words carrying a
    /// format version other than the segment's are normalized to it first,
    /// so the payload always matches the header's version byte.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<usize, GridError> {
        let mut payload = vec![0u8; PAYLOAD_BYTES];
        for (local, word) in &self.blocks {
            let at = usize::from(*local) * 3;
            let normalized = word.to_version(self.version)?;
            payload[at..at + 3].copy_from_slice(&normalized.encode());
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&payload)?;
        let compressed = encoder.finish()?;

        out.write_u8(self.version)?;
        out.write_u64::<BigEndian>(self.timestamp)?;
        out.write_i32::<BigEndian>(i32::from(self.origin.x))?;
        out.write_i32::<BigEndian>(i32::from(self.origin.y))?;
        out.write_i32::<BigEndian>(i32::from(self.origin.z))?;
        out.write_u8(u8::from(self.has_data()))?;
        out.write_u32::<BigEndian>(compressed.len() as u32)?;
        out.write_all(&compressed)?;
        Ok(SEGMENT_HEADER_BYTES + compressed.len())
    }

    /// Reads one serialized segment, interning every decoded word through
    /// `pool`. A corrupt payload aborts the read; a payload that holds no
    /// blocks yields an empty segment regardless of the on-disk flag.
    pub fn read_from<R: Read>(input: &mut R, pool: &mut BlockPool) -> Result<Segment, GridError> {
        let version = input.read_u8()?;
        if version > VERSION_LATEST {
            return Err(GridError::Malformed(format!(
                "segment declares unknown block format version {version}"
            )));
        }
        let timestamp = input.read_u64::<BigEndian>()?;
        let x = input.read_i32::<BigEndian>()?;
        let y = input.read_i32::<BigEndian>()?;
        let z = input.read_i32::<BigEndian>()?;
        let origin = match (i16::try_from(x), i16::try_from(y), i16::try_from(z)) {
            (Ok(x), Ok(y), Ok(z)) => Position::new(x, y, z),
            _ => {
                return Err(GridError::Malformed(format!(
                    "segment origin ({x}, {y}, {z}) outside the representable grid"
                )));
            }
        };
        let _has_data = input.read_u8()? != 0;
        let compressed_len = input.read_u32::<BigEndian>()? as usize;

        let mut compressed = vec![0u8; compressed_len];
        input.read_exact(&mut compressed)?;
        let mut payload = Vec::with_capacity(PAYLOAD_BYTES);
        ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut payload)?;
        if payload.len() != PAYLOAD_BYTES {
            return Err(GridError::Malformed(format!(
                "segment payload decompressed to {} bytes, expected {}",
                payload.len(),
                PAYLOAD_BYTES
            )));
        }

        let mut blocks = HashMap::new();
        for local in 0..BLOCKS_PER_SEGMENT {
            let at = local * 3;
            let triplet = [payload[at], payload[at + 1], payload[at + 2]];
            if let Some(word) = BlockWord::decode(triplet, version)? {
                blocks.insert(local as u16, pool.canonicalize(word));
            }
        }
        Ok(Segment {
            version,
            timestamp,
            origin,
            blocks,
        })
    }
}

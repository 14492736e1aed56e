//! Resource chunks: header + property block + payload.
//!
//! A chunk moves through `HeaderParsed -> PayloadRead -> (Decrypted) ->
//! (Decompressed) -> Ready`. The CRC32 covers the stored bytes, so it is
//! checked as soon as the payload is read, before any codec touches it.

use std::collections::HashSet;

use log::{debug, trace, warn};

use crate::cipher::CipherKey;
use crate::codec::CodecRegistry;
use crate::crc::compute_crc32;
use crate::error::{Result, RresError};
use crate::header::ChunkHeader;
use crate::options::{DecodeOptions, IntegrityPolicy};
use crate::source::ByteSource;

/// Decoded chunk buffer with property and payload views into it.
///
/// The buffer is laid out as `prop_count: u32`, `props: [u32; prop_count]`,
/// then the payload. Accessors compute offsets into the single owned buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkData {
    buffer: Vec<u8>,
    prop_count: u32,
    payload_start: usize,
}

impl ChunkData {
    /// Splits a decoded buffer into properties and payload.
    ///
    /// An empty buffer has no properties. A property count that does not fit
    /// in the buffer is a [`RresError::MalformedChunk`].
    pub fn parse(buffer: Vec<u8>) -> Result<Self> {
        if buffer.is_empty() {
            return Ok(ChunkData::default());
        }
        if buffer.len() < 4 {
            return Err(RresError::MalformedChunk(format!(
                "chunk data too short for prop_count ({} bytes)",
                buffer.len()
            )));
        }
        let prop_count = u32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]);
        let payload_start = (prop_count as usize)
            .checked_mul(4)
            .and_then(|n| n.checked_add(4))
            .filter(|&end| end <= buffer.len())
            .ok_or_else(|| {
                RresError::MalformedChunk(format!(
                    "prop_count {prop_count} does not fit in {} bytes",
                    buffer.len()
                ))
            })?;
        Ok(ChunkData {
            buffer,
            prop_count,
            payload_start,
        })
    }

    /// Wraps still-encoded bytes; no properties are visible until unpacked.
    pub fn opaque(buffer: Vec<u8>) -> Self {
        ChunkData {
            buffer,
            prop_count: 0,
            payload_start: 0,
        }
    }

    pub fn prop_count(&self) -> u32 {
        self.prop_count
    }

    pub fn prop(&self, index: usize) -> Option<u32> {
        if index >= self.prop_count as usize {
            return None;
        }
        let at = 4 + index * 4;
        let bytes = self.buffer.get(at..at + 4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn props(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.prop_count as usize).filter_map(|i| self.prop(i))
    }

    /// Payload bytes following the property array.
    pub fn raw(&self) -> &[u8] {
        &self.buffer[self.payload_start..]
    }

    /// The whole buffer, properties included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

/// Whether a chunk's payload has been run through the codec seam yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Still compressed and/or encrypted; `data` holds the stored bytes.
    Packed,
    /// Decoded; properties and payload are addressable.
    Ready,
}

/// Resource chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceChunk {
    pub header: ChunkHeader,
    pub data: ChunkData,
    state: ChunkState,
}

impl ResourceChunk {
    /// Builds a chunk from its header and stored payload.
    ///
    /// Plain chunks are parsed right away; encoded ones stay packed.
    pub fn from_packed(header: ChunkHeader, packed: Vec<u8>) -> Result<Self> {
        if header.is_plain() {
            if header.packed_size != header.base_size {
                return Err(RresError::MalformedChunk(format!(
                    "uncompressed chunk {:#010x} has packed_size {} != base_size {}",
                    header.id, header.packed_size, header.base_size
                )));
            }
            let data = ChunkData::parse(packed)?;
            Ok(ResourceChunk {
                header,
                data,
                state: ChunkState::Ready,
            })
        } else {
            Ok(ResourceChunk {
                header,
                data: ChunkData::opaque(packed),
                state: ChunkState::Packed,
            })
        }
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn is_packed(&self) -> bool {
        self.state == ChunkState::Packed
    }

    /// Decrypts then decompresses the payload and parses its properties.
    ///
    /// Output larger than `base_size` is a [`RresError::Codec`]; shorter
    /// output is logged and kept. Returns `false` if the chunk was already
    /// decoded.
    pub fn unpack(&mut self, codecs: &CodecRegistry, key: Option<&CipherKey>) -> Result<bool> {
        if self.state == ChunkState::Ready {
            return Ok(false);
        }
        let header = &self.header;
        let decrypted = codecs.decrypt(header.cipher_type, self.data.as_bytes(), key)?;
        let decoded = codecs.decompress(header.comp_type, &decrypted, header.base_size as usize)?;
        if decoded.len() > header.base_size as usize {
            return Err(RresError::Codec(format!(
                "{}: decoded {} bytes, more than base size {}",
                header.chunk_type,
                decoded.len(),
                header.base_size
            )));
        }
        if decoded.len() < header.base_size as usize {
            warn!(
                "RRES: {}: decoded data could be corrupted, unexpected size (expected {}, got {})",
                header.chunk_type,
                header.base_size,
                decoded.len()
            );
        } else {
            debug!(
                "RRES: {}: data decoded successfully ({} -> {} bytes)",
                header.chunk_type, header.packed_size, header.base_size
            );
        }
        self.data = ChunkData::parse(decoded)?;
        self.state = ChunkState::Ready;
        Ok(true)
    }
}

/// Resource multi - an ordered chain of chunks linked by `next_offset`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceMulti {
    pub chunks: Vec<ResourceChunk>,
}

impl ResourceMulti {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResourceChunk> {
        self.chunks.iter()
    }

    /// Unpacks every chunk in the chain.
    pub fn unpack(&mut self, codecs: &CodecRegistry, key: Option<&CipherKey>) -> Result<()> {
        for chunk in &mut self.chunks {
            chunk.unpack(codecs, key)?;
        }
        Ok(())
    }
}

impl IntoIterator for ResourceMulti {
    type Item = ResourceChunk;
    type IntoIter = std::vec::IntoIter<ResourceChunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

/// Reads the chunk header at `offset`.
pub fn read_chunk_header<S: ByteSource + ?Sized>(source: &mut S, offset: u64) -> Result<ChunkHeader> {
    let bytes = source.read_at(offset, ChunkHeader::SIZE)?;
    let (header, _) = crate::header::parse_header(&bytes, 0).map_err(|e| match e {
        RresError::TruncatedInput { needed, .. } => RresError::TruncatedInput { offset, needed },
        other => other,
    })?;
    Ok(header)
}

/// Checks the stored CRC32 against the bytes read from storage.
pub fn verify_checksum(header: &ChunkHeader, packed: &[u8], policy: IntegrityPolicy) -> Result<()> {
    let actual = compute_crc32(packed);
    if actual == header.crc32 {
        return Ok(());
    }
    match policy {
        IntegrityPolicy::FailClosed => Err(RresError::IntegrityError {
            id: header.id,
            expected: header.crc32,
            actual,
        }),
        IntegrityPolicy::BestEffort => {
            warn!(
                "RRES: {}: CRC32 mismatch in chunk {:#010x} (expected {:#010x}, got {actual:#010x}), continuing",
                header.chunk_type, header.id, header.crc32
            );
            Ok(())
        }
    }
}

/// Reads header and stored payload at `offset` and verifies the checksum.
///
/// The returned chunk is still packed if the header declares a codec.
pub fn read_chunk<S: ByteSource + ?Sized>(
    source: &mut S,
    offset: u64,
    options: &DecodeOptions,
) -> Result<ResourceChunk> {
    let header = read_chunk_header(source, offset)?;
    let packed = source.read_at(offset + ChunkHeader::SIZE as u64, header.packed_size as usize)?;
    trace!(
        "read {} payload bytes for chunk {:#010x} at {offset}",
        packed.len(),
        header.id
    );
    verify_checksum(&header, &packed, options.integrity)?;
    ResourceChunk::from_packed(header, packed)
}

/// Follows `next_offset` links from `offset` until a terminal chunk.
///
/// Revisiting an offset, or exceeding `options.max_chain_len`, is a
/// [`RresError::MalformedChunk`].
pub fn read_chain<S: ByteSource + ?Sized>(
    source: &mut S,
    offset: u64,
    options: &DecodeOptions,
) -> Result<ResourceMulti> {
    let mut chunks = Vec::new();
    let mut visited = HashSet::new();
    let mut current = offset;
    loop {
        if !visited.insert(current) {
            return Err(RresError::MalformedChunk(format!(
                "cyclic next_offset chain revisits offset {current}"
            )));
        }
        if chunks.len() >= options.max_chain_len {
            return Err(RresError::MalformedChunk(format!(
                "chunk chain longer than {} links",
                options.max_chain_len
            )));
        }
        let chunk = read_chunk(source, current, options)?;
        let next = chunk.header.next_offset;
        chunks.push(chunk);
        if next == 0 {
            break;
        }
        current = next as u64;
    }
    debug!("loaded {} linked chunks starting at {offset}", chunks.len());
    Ok(ResourceMulti { chunks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourcc::FourCC;
    use std::io::Cursor;

    fn props_buffer(props: &[u32], payload: &[u8]) -> Vec<u8> {
        let mut out = (props.len() as u32).to_le_bytes().to_vec();
        for p in props {
            out.extend_from_slice(&p.to_le_bytes());
        }
        out.extend_from_slice(payload);
        out
    }

    fn plain_chunk(tag: FourCC, id: u32, data: &[u8], next_offset: u32) -> Vec<u8> {
        let header = ChunkHeader {
            chunk_type: tag,
            id,
            packed_size: data.len() as u32,
            base_size: data.len() as u32,
            next_offset,
            crc32: compute_crc32(data),
            ..Default::default()
        };
        let mut out = header.to_bytes().to_vec();
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn chunk_data_views() {
        let data = ChunkData::parse(props_buffer(&[5, 6], b"xyz")).unwrap();
        assert_eq!(data.prop_count(), 2);
        assert_eq!(data.prop(0), Some(5));
        assert_eq!(data.prop(1), Some(6));
        assert_eq!(data.prop(2), None);
        assert_eq!(data.props().collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(data.raw(), b"xyz");
    }

    #[test]
    fn prop_count_beyond_buffer_is_malformed() {
        let mut buf = props_buffer(&[1, 2], b"");
        buf[0] = 3;
        assert!(matches!(
            ChunkData::parse(buf),
            Err(RresError::MalformedChunk(_))
        ));
        assert!(matches!(
            ChunkData::parse(u32::MAX.to_le_bytes().to_vec()),
            Err(RresError::MalformedChunk(_))
        ));
        assert!(matches!(
            ChunkData::parse(vec![1, 0]),
            Err(RresError::MalformedChunk(_))
        ));
        assert_eq!(ChunkData::parse(Vec::new()).unwrap().prop_count(), 0);
    }

    #[test]
    fn read_chunk_verifies_crc() {
        let payload = props_buffer(&[3], b"abc");
        let mut bytes = plain_chunk(FourCC::RAWD, 7, &payload, 0);
        let chunk = read_chunk(&mut Cursor::new(bytes.clone()), 0, &DecodeOptions::default()).unwrap();
        assert_eq!(chunk.state(), ChunkState::Ready);
        assert_eq!(chunk.data.raw(), b"abc");

        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(
            read_chunk(&mut Cursor::new(bytes.clone()), 0, &DecodeOptions::default()),
            Err(RresError::IntegrityError { id: 7, .. })
        ));
        let relaxed = DecodeOptions::default().best_effort();
        let chunk = read_chunk(&mut Cursor::new(bytes), 0, &relaxed).unwrap();
        assert_eq!(chunk.data.raw(), b"ab\x9c");
    }

    #[test]
    fn plain_chunk_sizes_must_agree() {
        let payload = props_buffer(&[], b"");
        let mut header = ChunkHeader {
            chunk_type: FourCC::RAWD,
            packed_size: 4,
            base_size: 8,
            crc32: compute_crc32(&payload),
            ..Default::default()
        };
        assert!(matches!(
            ResourceChunk::from_packed(header.clone(), payload.clone()),
            Err(RresError::MalformedChunk(_))
        ));
        header.comp_type = 10;
        let chunk = ResourceChunk::from_packed(header, payload).unwrap();
        assert!(chunk.is_packed());
        assert_eq!(chunk.data.prop_count(), 0);
    }

    fn doubling_plugin(packed: &[u8], _base_size: usize) -> Result<Vec<u8>> {
        Ok(packed.iter().flat_map(|&b| [b, b]).collect())
    }

    #[test]
    fn unpack_rejects_output_past_base_size() {
        let header = ChunkHeader {
            chunk_type: FourCC::RAWD,
            comp_type: 1,
            packed_size: 4,
            base_size: 4,
            ..Default::default()
        };
        let mut codecs = CodecRegistry::empty();
        codecs.register_decompressor(1, doubling_plugin);

        let mut chunk = ResourceChunk::from_packed(header.clone(), vec![0, 0, 0, 0]).unwrap();
        assert!(matches!(
            chunk.unpack(&codecs, None),
            Err(RresError::Codec(_))
        ));
        assert!(chunk.is_packed());

        // short output is kept
        let roomy = ChunkHeader {
            base_size: 16,
            ..header
        };
        let mut chunk = ResourceChunk::from_packed(roomy, vec![0, 0, 0, 0]).unwrap();
        assert!(chunk.unpack(&codecs, None).unwrap());
        assert_eq!(chunk.data.prop_count(), 0);
        assert_eq!(chunk.data.raw().len(), 4);
    }

    #[test]
    fn truncated_payload() {
        let payload = props_buffer(&[3], b"abc");
        let bytes = plain_chunk(FourCC::RAWD, 1, &payload, 0);
        assert!(matches!(
            read_chunk(&mut Cursor::new(bytes[..bytes.len() - 2].to_vec()), 0, &DecodeOptions::default()),
            Err(RresError::TruncatedInput { .. })
        ));
        assert!(matches!(
            read_chunk_header(&mut Cursor::new(bytes[..20].to_vec()), 0),
            Err(RresError::TruncatedInput { offset: 0, needed: 32 })
        ));
    }

    #[test]
    fn chain_stops_at_terminal_chunk() {
        let a = props_buffer(&[1], b"A");
        let b = props_buffer(&[1], b"B");
        let first_len = (ChunkHeader::SIZE + a.len()) as u32;
        let mut bytes = plain_chunk(FourCC::RAWD, 9, &a, first_len);
        bytes.extend(plain_chunk(FourCC::RAWD, 9, &b, 0));
        // trailing chunk that is not part of the chain
        bytes.extend(plain_chunk(FourCC::RAWD, 9, &a, 0));

        let multi = read_chain(&mut Cursor::new(bytes), 0, &DecodeOptions::default()).unwrap();
        assert_eq!(multi.len(), 2);
        let raws: Vec<&[u8]> = multi.iter().map(|c| c.data.raw()).collect();
        assert_eq!(raws, vec![&b"A"[..], &b"B"[..]]);
    }

    #[test]
    fn cyclic_chain_is_rejected() {
        let a = props_buffer(&[1], b"A");
        let first_len = (ChunkHeader::SIZE + a.len()) as u32;
        let mut bytes = plain_chunk(FourCC::RAWD, 9, &a, first_len);
        bytes.extend(plain_chunk(FourCC::RAWD, 9, &a, 0));
        // next_offset is outside the CRC, so a chunk can point at itself
        let mut looping = plain_chunk(FourCC::RAWD, 4, &a, 0);
        looping[20..24].copy_from_slice(&1u32.to_le_bytes());
        let mut src = vec![0u8];
        src.extend(looping);

        assert!(matches!(
            read_chain(&mut Cursor::new(src), 1, &DecodeOptions::default()),
            Err(RresError::MalformedChunk(_))
        ));
        let limited = DecodeOptions::default().with_max_chain_len(1);
        assert!(matches!(
            read_chain(&mut Cursor::new(bytes), 0, &limited),
            Err(RresError::MalformedChunk(_))
        ));
    }
}

//! Fixed-layout file and chunk headers.
//!
//! All integers are little-endian.

use std::io::{ErrorKind, Read};

use log::trace;

use crate::error::{Result, RresError};
use crate::fourcc::FourCC;
use crate::types::{CompressionType, EncryptionType, ResourceDataType};

/// Reads a u16 in little endian.
fn read_u16_le<R: Read>(r: &mut R) -> std::io::Result<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// Reads a u32 in little endian.
fn read_u32_le<R: Read>(r: &mut R) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u8<R: Read>(r: &mut R) -> std::io::Result<u8> {
    let mut b = [0u8];
    r.read_exact(&mut b)?;
    Ok(b[0])
}

/// Maps an early EOF from a reader onto [`RresError::TruncatedInput`].
fn truncated(err: std::io::Error, offset: u64, needed: usize) -> RresError {
    if err.kind() == ErrorKind::UnexpectedEof {
        RresError::TruncatedInput {
            offset,
            needed: needed as u64,
        }
    } else {
        RresError::Io(err)
    }
}

/// Archive file header (16 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub id: [u8; 4],      // File identifier: b"rres"
    pub version: u16,     // File version: 100 for version 1.0
    pub chunk_count: u16, // Number of resource chunks in the file
    pub cd_offset: u32,   // Central directory offset past this header (0 if absent)
    pub reserved: u32,
}

impl FileHeader {
    pub const SIZE: usize = 16;
    pub const MAGIC: [u8; 4] = *b"rres";
    pub const VERSION: u16 = 100;

    /// Reads a file header from the provided reader.
    pub fn from_reader<R: Read>(r: &mut R) -> std::io::Result<Self> {
        let mut id = [0u8; 4];
        r.read_exact(&mut id)?;
        let version = read_u16_le(r)?;
        let chunk_count = read_u16_le(r)?;
        let cd_offset = read_u32_le(r)?;
        let reserved = read_u32_le(r)?;
        Ok(Self {
            id,
            version,
            chunk_count,
            cd_offset,
            reserved,
        })
    }

    /// Parses and validates the header at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut r = bytes;
        let header = Self::from_reader(&mut r).map_err(|e| truncated(e, 0, Self::SIZE))?;
        header.validate()?;
        Ok(header)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id != Self::MAGIC {
            return Err(RresError::InvalidFileHeader(format!(
                "bad signature {}",
                FourCC(self.id)
            )));
        }
        if self.version != Self::VERSION {
            return Err(RresError::InvalidFileHeader(format!(
                "unsupported version {}",
                self.version
            )));
        }
        Ok(())
    }

    /// Absolute offset of the central directory chunk, if the archive has one.
    pub fn central_directory_offset(&self) -> Option<u64> {
        match self.cd_offset {
            0 => None,
            rel => Some(Self::SIZE as u64 + rel as u64),
        }
    }
}

/// Resource chunk header (32 bytes)
///
/// `comp_type` and `cipher_type` are kept verbatim; the codec seam decides
/// whether it can handle them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkHeader {
    pub chunk_type: FourCC, // Resource chunk type (FourCC)
    pub id: u32,            // Resource identifier (CRC32 filename hash or custom)
    pub comp_type: u8,
    pub cipher_type: u8,
    pub flags: u16,
    pub packed_size: u32, // Stored size (compressed/encrypted)
    pub base_size: u32,   // Decoded size (uncompressed/unencrypted)
    pub next_offset: u32, // Next chunk of the same resource, 0 if last
    pub reserved: u32,
    pub crc32: u32, // CRC32 of the stored payload
}

impl ChunkHeader {
    pub const SIZE: usize = 32;

    /// Reads a resource chunk header from the provided reader.
    pub fn from_reader<R: Read>(r: &mut R) -> std::io::Result<Self> {
        let mut chunk_type = [0u8; 4];
        r.read_exact(&mut chunk_type)?;
        let id = read_u32_le(r)?;
        let comp_type = read_u8(r)?;
        let cipher_type = read_u8(r)?;
        let flags = read_u16_le(r)?;
        let packed_size = read_u32_le(r)?;
        let base_size = read_u32_le(r)?;
        let next_offset = read_u32_le(r)?;
        let reserved = read_u32_le(r)?;
        let crc32 = read_u32_le(r)?;
        Ok(Self {
            chunk_type: FourCC(chunk_type),
            id,
            comp_type,
            cipher_type,
            flags,
            packed_size,
            base_size,
            next_offset,
            reserved,
            crc32,
        })
    }

    /// Serializes the header back to its 32-byte on-disk form.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(self.chunk_type.as_bytes());
        out[4..8].copy_from_slice(&self.id.to_le_bytes());
        out[8] = self.comp_type;
        out[9] = self.cipher_type;
        out[10..12].copy_from_slice(&self.flags.to_le_bytes());
        out[12..16].copy_from_slice(&self.packed_size.to_le_bytes());
        out[16..20].copy_from_slice(&self.base_size.to_le_bytes());
        out[20..24].copy_from_slice(&self.next_offset.to_le_bytes());
        out[24..28].copy_from_slice(&self.reserved.to_le_bytes());
        out[28..32].copy_from_slice(&self.crc32.to_le_bytes());
        out
    }

    pub fn data_type(&self) -> ResourceDataType {
        self.chunk_type.data_type()
    }

    /// Declared compression algorithm, `None` if the id is unknown.
    pub fn compression(&self) -> Option<CompressionType> {
        CompressionType::try_from(self.comp_type).ok()
    }

    /// Declared encryption algorithm, `None` if the id is unknown.
    pub fn encryption(&self) -> Option<EncryptionType> {
        EncryptionType::try_from(self.cipher_type).ok()
    }

    /// True when the payload is stored as-is.
    pub fn is_plain(&self) -> bool {
        self.comp_type == CompressionType::None as u8
            && self.cipher_type == EncryptionType::None as u8
    }
}

/// Parses the chunk header at `offset` inside `bytes`.
///
/// Returns the header and the number of bytes consumed.
pub fn parse_header(bytes: &[u8], offset: usize) -> Result<(ChunkHeader, usize)> {
    let available = bytes.len().saturating_sub(offset);
    if available < ChunkHeader::SIZE {
        return Err(RresError::TruncatedInput {
            offset: offset as u64,
            needed: ChunkHeader::SIZE as u64,
        });
    }
    let mut r = &bytes[offset..offset + ChunkHeader::SIZE];
    let header = ChunkHeader::from_reader(&mut r)
        .map_err(|e| truncated(e, offset as u64, ChunkHeader::SIZE))?;
    trace!(
        "chunk header at {offset}: {} id={:#010x} packed={} base={}",
        header.chunk_type, header.id, header.packed_size, header.base_size
    );
    Ok((header, ChunkHeader::SIZE))
}

#![allow(dead_code)]

use rres::{ChunkHeader, FileHeader, FourCC, compute_crc32};

/// `prop_count`, props and payload laid out as a decoded chunk buffer.
pub fn data_buffer(props: &[u32], payload: &[u8]) -> Vec<u8> {
    let mut out = (props.len() as u32).to_le_bytes().to_vec();
    for p in props {
        out.extend_from_slice(&p.to_le_bytes());
    }
    out.extend_from_slice(payload);
    out
}

/// CDIR payload: packed entries with 4-byte padded names.
pub fn directory_buffer(entries: &[(u32, u32, &str)]) -> Vec<u8> {
    let mut payload = Vec::new();
    for &(id, offset, name) in entries {
        let size = (name.len() + 1).next_multiple_of(4);
        payload.extend_from_slice(&id.to_le_bytes());
        payload.extend_from_slice(&offset.to_le_bytes());
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&(size as u32).to_le_bytes());
        let mut bytes = name.as_bytes().to_vec();
        bytes.resize(size, 0);
        payload.extend_from_slice(&bytes);
    }
    data_buffer(&[entries.len() as u32], &payload)
}

/// Writes rres archives in memory for tests.
#[derive(Default)]
pub struct ArchiveBuilder {
    body: Vec<u8>,
    chunk_count: u16,
    cd_offset: u32,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute offset the next chunk will be written at.
    pub fn offset(&self) -> u32 {
        (FileHeader::SIZE + self.body.len()) as u32
    }

    /// Offset of the chunk after one holding `stored_len` bytes written now.
    pub fn offset_after(&self, stored_len: usize) -> u32 {
        self.offset() + (ChunkHeader::SIZE + stored_len) as u32
    }

    /// Appends a chunk; `packed_size` and `crc32` are filled in from `stored`.
    pub fn write_chunk(&mut self, mut header: ChunkHeader, stored: &[u8]) -> u32 {
        let offset = self.offset();
        header.packed_size = stored.len() as u32;
        header.crc32 = compute_crc32(stored);
        self.body.extend_from_slice(&header.to_bytes());
        self.body.extend_from_slice(stored);
        self.chunk_count += 1;
        offset
    }

    pub fn linked(&mut self, tag: FourCC, id: u32, props: &[u32], payload: &[u8], next: u32) -> u32 {
        let data = data_buffer(props, payload);
        let header = ChunkHeader {
            chunk_type: tag,
            id,
            base_size: data.len() as u32,
            next_offset: next,
            ..Default::default()
        };
        self.write_chunk(header, &data)
    }

    pub fn plain(&mut self, tag: FourCC, id: u32, props: &[u32], payload: &[u8]) -> u32 {
        self.linked(tag, id, props, payload, 0)
    }

    /// Appends a chunk whose decoded buffer is run through `encode` before storage.
    pub fn encoded(
        &mut self,
        tag: FourCC,
        id: u32,
        props: &[u32],
        payload: &[u8],
        comp_type: u8,
        cipher_type: u8,
        encode: impl Fn(&[u8]) -> Vec<u8>,
    ) -> u32 {
        let data = data_buffer(props, payload);
        let header = ChunkHeader {
            chunk_type: tag,
            id,
            comp_type,
            cipher_type,
            base_size: data.len() as u32,
            ..Default::default()
        };
        self.write_chunk(header, &encode(&data))
    }

    /// Appends a CDIR chunk and points the file header at it.
    pub fn directory(&mut self, entries: &[(u32, u32, &str)]) -> u32 {
        let data = directory_buffer(entries);
        let header = ChunkHeader {
            chunk_type: FourCC::CDIR,
            base_size: data.len() as u32,
            ..Default::default()
        };
        let offset = self.write_chunk(header, &data);
        self.cd_offset = offset - FileHeader::SIZE as u32;
        offset
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FileHeader::SIZE + self.body.len());
        out.extend_from_slice(&FileHeader::MAGIC);
        out.extend_from_slice(&FileHeader::VERSION.to_le_bytes());
        out.extend_from_slice(&self.chunk_count.to_le_bytes());
        out.extend_from_slice(&self.cd_offset.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}

pub fn xor_with_key(data: &[u8], key: &[u8]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(i, b)| b ^ key[i % key.len()])
        .collect()
}

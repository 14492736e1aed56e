//! Archive reader: the public read API over a byte source.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, info};

use crate::chunk::{ResourceChunk, ResourceMulti, read_chain, read_chunk, read_chunk_header};
use crate::cipher::CipherKey;
use crate::codec::CodecRegistry;
use crate::directory::CentralDirectory;
use crate::error::Result;
use crate::header::{ChunkHeader, FileHeader};
use crate::options::DecodeOptions;
use crate::source::ByteSource;

/// An opened rres archive.
///
/// Owns its byte source, the codec plugins used to unpack chunks and the
/// cipher key for encrypted chunks. Nothing here reads process-wide state.
#[derive(Debug)]
pub struct Archive<S> {
    source: S,
    header: FileHeader,
    codecs: CodecRegistry,
    options: DecodeOptions,
    key: Option<CipherKey>,
}

impl Archive<BufReader<File>> {
    /// Opens an archive file from disk.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening rres file: {}", path.display());
        Archive::open(BufReader::new(File::open(path)?))
    }
}

impl<S: ByteSource> Archive<S> {
    /// Reads and validates the file header.
    pub fn open(mut source: S) -> Result<Self> {
        let bytes = source.read_at(0, FileHeader::SIZE)?;
        let header = FileHeader::parse(&bytes)?;
        debug!(
            "rres archive: version {}, {} chunks, cd_offset {}",
            header.version, header.chunk_count, header.cd_offset
        );
        Ok(Archive {
            source,
            header,
            codecs: CodecRegistry::default(),
            options: DecodeOptions::default(),
            key: None,
        })
    }

    pub fn with_codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = codecs;
        self
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_key(mut self, key: Option<CipherKey>) -> Self {
        self.key = key;
        self
    }

    /// Sets the key used for encrypted chunks; an empty secret clears it.
    pub fn set_key(&mut self, secret: &str) {
        self.key = CipherKey::new(secret);
    }

    pub fn clear_key(&mut self) {
        self.key = None;
    }

    pub fn key(&self) -> Option<&CipherKey> {
        self.key.as_ref()
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn codecs_mut(&mut self) -> &mut CodecRegistry {
        &mut self.codecs
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Every chunk header in file order, with its absolute offset.
    pub fn chunk_headers(&mut self) -> Result<Vec<(u64, ChunkHeader)>> {
        let mut out = Vec::with_capacity(self.header.chunk_count as usize);
        let mut offset = FileHeader::SIZE as u64;
        for _ in 0..self.header.chunk_count {
            let header = read_chunk_header(&mut self.source, offset)?;
            let next = offset + ChunkHeader::SIZE as u64 + header.packed_size as u64;
            out.push((offset, header));
            offset = next;
        }
        Ok(out)
    }

    /// Offset and header of the first chunk carrying `id`.
    fn find_chunk(&mut self, id: u32) -> Result<Option<(u64, ChunkHeader)>> {
        let mut offset = FileHeader::SIZE as u64;
        for _ in 0..self.header.chunk_count {
            let header = read_chunk_header(&mut self.source, offset)?;
            if header.id == id {
                return Ok(Some((offset, header)));
            }
            offset += ChunkHeader::SIZE as u64 + header.packed_size as u64;
        }
        debug!("resource id {id:#010x} not found");
        Ok(None)
    }

    /// Header of the first chunk of resource `id`, without its payload.
    pub fn load_chunk_info(&mut self, id: u32) -> Result<Option<ChunkHeader>> {
        Ok(self.find_chunk(id)?.map(|(_, header)| header))
    }

    /// Chunk at `offset`, checksum verified but not run through the codecs.
    pub fn load_packed_chunk_at(&mut self, offset: u64) -> Result<ResourceChunk> {
        read_chunk(&mut self.source, offset, &self.options)
    }

    /// Fully decoded chunk at `offset`.
    pub fn load_chunk_at(&mut self, offset: u64) -> Result<ResourceChunk> {
        let mut chunk = read_chunk(&mut self.source, offset, &self.options)?;
        chunk.unpack(&self.codecs, self.key.as_ref())?;
        Ok(chunk)
    }

    /// First chunk of resource `id`, fully decoded.
    pub fn load_chunk(&mut self, id: u32) -> Result<Option<ResourceChunk>> {
        match self.find_chunk(id)? {
            Some((offset, _)) => self.load_chunk_at(offset).map(Some),
            None => Ok(None),
        }
    }

    /// Every chunk of resource `id`, following `next_offset` links.
    pub fn load_multi(&mut self, id: u32) -> Result<Option<ResourceMulti>> {
        let Some((offset, _)) = self.find_chunk(id)? else {
            return Ok(None);
        };
        let mut multi = read_chain(&mut self.source, offset, &self.options)?;
        multi.unpack(&self.codecs, self.key.as_ref())?;
        Ok(Some(multi))
    }

    /// The archive's central directory; empty when the archive has none.
    pub fn load_central_directory(&mut self) -> Result<CentralDirectory> {
        let Some(offset) = self.header.central_directory_offset() else {
            debug!("archive has no central directory");
            return Ok(CentralDirectory::default());
        };
        let chunk = self.load_chunk_at(offset)?;
        let dir = CentralDirectory::from_chunk(&chunk)?;
        debug!("central directory loaded: {} entries", dir.len());
        Ok(dir)
    }

    /// Loads the chunk that `dir` lists under `file_name`.
    pub fn load_chunk_by_name(
        &mut self,
        dir: &CentralDirectory,
        file_name: &str,
    ) -> Result<Option<ResourceChunk>> {
        let Some(entry) = dir.find_entry(file_name) else {
            return Ok(None);
        };
        self.load_chunk_at(entry.offset as u64).map(Some)
    }
}

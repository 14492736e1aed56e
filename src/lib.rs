//! # rres
//!
//! Reader for rres resource archives.
//!
//! An archive is a 16-byte file header followed by chunks. Each chunk has a
//! 32-byte header (FourCC type, id, codec ids, sizes, CRC32), then a payload
//! holding a `u32` property array and the resource bytes. A CDIR chunk maps
//! file names to ids and offsets.
//!
//! Compression and encryption are not implemented here beyond the built-in
//! DEFLATE and LZ4 plugins; other algorithms plug in through
//! [`CodecRegistry`].
//!
//! ```no_run
//! use rres::Archive;
//!
//! # fn main() -> rres::Result<()> {
//! let mut archive = Archive::open_path("resources.rres")?;
//! let dir = archive.load_central_directory()?;
//! if let Some(chunk) = archive.load_chunk_by_name(&dir, "readme.txt")? {
//!     println!("{:?}", chunk.text()?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod chunk;
pub mod cipher;
pub mod codec;
pub mod crc;
pub mod directory;
pub mod error;
pub mod fourcc;
pub mod header;
pub mod options;
pub mod props;
pub mod source;
pub mod types;

pub use archive::Archive;
pub use chunk::{ChunkData, ChunkState, ResourceChunk, ResourceMulti};
pub use cipher::CipherKey;
pub use codec::{CodecRegistry, Decompressor, Decryptor};
pub use crc::compute_crc32;
pub use directory::{CentralDirectory, DirEntry};
pub use error::{CodecKind, Result, RresError};
pub use fourcc::{FourCC, classify};
pub use header::{ChunkHeader, FileHeader, parse_header};
pub use options::{DecodeOptions, IntegrityPolicy};
pub use props::{FontGlyphInfo, FontGlyphsInfo, VertexInfo, WaveInfo};
pub use source::ByteSource;
pub use types::{
    CodeLang, CompressionType, EncryptionType, FontStyle, PixelFormat, ResourceDataType,
    TextEncoding, VertexAttribute, VertexFormat,
};

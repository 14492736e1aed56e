//! Codec seam: dispatch of compression and encryption ids to plugins.
//!
//! The reader never hardcodes an algorithm. Chunks declare `comp_type` and
//! `cipher_type` ids, and a [`CodecRegistry`] maps those ids to
//! [`Decompressor`] / [`Decryptor`] implementations. Id 0 (`None`) is always
//! a pass-through. `CodecRegistry::default()` installs the built-in DEFLATE
//! and LZ4 decoders when the matching cargo features are enabled.

use std::collections::BTreeMap;
use std::fmt;

use log::trace;

use crate::cipher::CipherKey;
use crate::error::{CodecKind, Result, RresError};
use crate::types::{CompressionType, EncryptionType};

/// Turns a stored payload back into `base_size` bytes.
pub trait Decompressor: Send + Sync {
    fn decompress(&self, packed: &[u8], base_size: usize) -> Result<Vec<u8>>;
}

impl<F> Decompressor for F
where
    F: Fn(&[u8], usize) -> Result<Vec<u8>> + Send + Sync,
{
    fn decompress(&self, packed: &[u8], base_size: usize) -> Result<Vec<u8>> {
        self(packed, base_size)
    }
}

/// Decrypts a stored payload with the caller's key.
pub trait Decryptor: Send + Sync {
    fn decrypt(&self, data: &[u8], key: &CipherKey) -> Result<Vec<u8>>;
}

impl<F> Decryptor for F
where
    F: Fn(&[u8], &CipherKey) -> Result<Vec<u8>> + Send + Sync,
{
    fn decrypt(&self, data: &[u8], key: &CipherKey) -> Result<Vec<u8>> {
        self(data, key)
    }
}

/// Plugins keyed by numeric algorithm id.
pub struct CodecRegistry {
    decompressors: BTreeMap<u8, Box<dyn Decompressor>>,
    decryptors: BTreeMap<u8, Box<dyn Decryptor>>,
}

impl CodecRegistry {
    /// A registry with no plugins; only uncompressed, unencrypted chunks decode.
    pub fn empty() -> Self {
        CodecRegistry {
            decompressors: BTreeMap::new(),
            decryptors: BTreeMap::new(),
        }
    }

    pub fn register_decompressor(
        &mut self,
        comp_type: u8,
        plugin: impl Decompressor + 'static,
    ) -> &mut Self {
        self.decompressors.insert(comp_type, Box::new(plugin));
        self
    }

    pub fn register_decryptor(
        &mut self,
        cipher_type: u8,
        plugin: impl Decryptor + 'static,
    ) -> &mut Self {
        self.decryptors.insert(cipher_type, Box::new(plugin));
        self
    }

    pub fn supports_compression(&self, comp_type: u8) -> bool {
        comp_type == CompressionType::None as u8 || self.decompressors.contains_key(&comp_type)
    }

    pub fn supports_encryption(&self, cipher_type: u8) -> bool {
        cipher_type == EncryptionType::None as u8 || self.decryptors.contains_key(&cipher_type)
    }

    /// Decompresses `bytes` declared with `comp_type`.
    pub fn decompress(&self, comp_type: u8, bytes: &[u8], base_size: usize) -> Result<Vec<u8>> {
        if comp_type == CompressionType::None as u8 {
            return Ok(bytes.to_vec());
        }
        let plugin = self
            .decompressors
            .get(&comp_type)
            .ok_or(RresError::UnsupportedCodec {
                kind: CodecKind::Compression,
                id: comp_type,
            })?;
        trace!("decompressing {} bytes with type {comp_type}", bytes.len());
        plugin.decompress(bytes, base_size)
    }

    /// Decrypts `bytes` declared with `cipher_type` using `key`.
    pub fn decrypt(&self, cipher_type: u8, bytes: &[u8], key: Option<&CipherKey>) -> Result<Vec<u8>> {
        if cipher_type == EncryptionType::None as u8 {
            return Ok(bytes.to_vec());
        }
        let plugin = self
            .decryptors
            .get(&cipher_type)
            .ok_or(RresError::UnsupportedCodec {
                kind: CodecKind::Encryption,
                id: cipher_type,
            })?;
        let key = key.ok_or(RresError::KeyRequired)?;
        trace!("decrypting {} bytes with type {cipher_type}", bytes.len());
        plugin.decrypt(bytes, key)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let mut registry = CodecRegistry::empty();
        #[cfg(feature = "deflate")]
        registry.register_decompressor(CompressionType::Deflate as u8, builtin::inflate);
        #[cfg(feature = "lz4")]
        registry.register_decompressor(CompressionType::Lz4 as u8, builtin::lz4_block);
        registry
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("decompressors", &self.decompressors.keys().collect::<Vec<_>>())
            .field("decryptors", &self.decryptors.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Decoders shipped with the crate.
#[cfg(any(feature = "deflate", feature = "lz4"))]
pub mod builtin {
    use crate::error::{Result, RresError};

    /// Largest expansion an LZ4 block can encode per stored byte.
    #[cfg(feature = "lz4")]
    const LZ4_MAX_RATIO: usize = 255;

    /// DEFLATE (zlib-wrapped) payloads. Output is capped at `base_size`.
    #[cfg(feature = "deflate")]
    pub fn inflate(packed: &[u8], base_size: usize) -> Result<Vec<u8>> {
        use flate2::read::ZlibDecoder;
        use std::io::Read;

        let mut decoder = ZlibDecoder::new(packed).take(base_size as u64 + 1);
        let mut out = Vec::with_capacity(base_size.min(16 * 1024 * 1024));
        decoder
            .read_to_end(&mut out)
            .map_err(|e| RresError::Codec(format!("Deflate decompression failed: {e}")))?;
        if out.len() > base_size {
            return Err(RresError::Codec(format!(
                "Deflate output exceeds base size {base_size}"
            )));
        }
        Ok(out)
    }

    /// LZ4 block payloads; the block format needs the decoded size up front.
    #[cfg(feature = "lz4")]
    pub fn lz4_block(packed: &[u8], base_size: usize) -> Result<Vec<u8>> {
        if base_size > packed.len().saturating_mul(LZ4_MAX_RATIO) {
            return Err(RresError::Codec(format!(
                "LZ4 base size {base_size} not reachable from {} packed bytes",
                packed.len()
            )));
        }
        let size = i32::try_from(base_size)
            .map_err(|_| RresError::Codec(format!("LZ4 base size too large: {base_size}")))?;
        lz4::block::decompress(packed, Some(size))
            .map_err(|e| RresError::Codec(format!("LZ4 decompression failed: {e}")))
    }
}

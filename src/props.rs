//! Typed views over a chunk's property array and payload.
//!
//! Every accessor first checks the chunk's FourCC type and its `prop_count`.
//! A wrong type, a still-packed chunk or too few properties give `None`.
//! Accessors that reinterpret the payload return `Result<Option<T>>`, where
//! `Err(MalformedChunk)` means the counts inside the chunk are inconsistent.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};

use crate::chunk::{ChunkData, ResourceChunk};
use crate::error::{Result, RresError};
use crate::types::{
    CodeLang, FontStyle, PixelFormat, ResourceDataType, TextEncoding, VertexAttribute,
    VertexFormat,
};

/// FNTG: Font glyphs info (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontGlyphInfo {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub value: i32, // codepoint
    pub offset_x: i32,
    pub offset_y: i32,
    pub advance_x: i32,
}

impl FontGlyphInfo {
    pub const SIZE: usize = 32;

    fn from_le_bytes(b: &[u8]) -> Self {
        let field = |i: usize| i32::from_le_bytes([b[i * 4], b[i * 4 + 1], b[i * 4 + 2], b[i * 4 + 3]]);
        FontGlyphInfo {
            x: field(0),
            y: field(1),
            width: field(2),
            height: field(3),
            value: field(4),
            offset_x: field(5),
            offset_y: field(6),
            advance_x: field(7),
        }
    }
}

/// WAVE: Audio format info (props 0..4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveInfo {
    pub frame_count: u32,
    pub sample_rate: u32,
    pub sample_size: u32,
    pub channels: u32,
}

/// VRTX: Vertex attribute layout (props 0..4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexInfo {
    pub vertex_count: u32,
    pub attribute: VertexAttribute,
    pub component_count: u32,
    pub format: VertexFormat,
}

/// FNTG: Font info (props 0..4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontGlyphsInfo {
    pub base_size: u32,
    pub glyph_count: u32,
    pub glyph_padding: u32,
    pub style: FontStyle,
}

/// Big-endian bytes of the extension props, cut at the first NUL.
fn extension_bytes(ext1: u32, ext2: u32) -> Vec<u8> {
    let mut bytes = ext1.to_be_bytes().to_vec();
    bytes.extend_from_slice(&ext2.to_be_bytes());
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    bytes.truncate(end);
    bytes
}

fn decode_text<'a>(bytes: &'a [u8], encoding: &'static Encoding, what: &str) -> Result<Cow<'a, str>> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| RresError::MalformedChunk(format!("{what} is not valid {}", encoding.name())))
}

impl ResourceChunk {
    pub fn data_type(&self) -> ResourceDataType {
        self.header.data_type()
    }

    /// Decoded data of this chunk if it is of type `ty`.
    fn view(&self, ty: ResourceDataType) -> Option<&ChunkData> {
        (self.data_type() == ty && !self.is_packed()).then_some(&self.data)
    }

    /// Properties `0..n` of this chunk if it is of type `ty` and has at least `n`.
    fn props_of<const N: usize>(&self, ty: ResourceDataType) -> Option<[u32; N]> {
        let data = self.view(ty)?;
        if (data.prop_count() as usize) < N {
            return None;
        }
        let mut out = [0u32; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = data.prop(i)?;
        }
        Some(out)
    }

    /// Leading `props[0]` bytes of the payload; a size past the end is malformed.
    fn sized_payload(&self, ty: ResourceDataType) -> Result<Option<&[u8]>> {
        let Some(data) = self.view(ty) else {
            return Ok(None);
        };
        let size = match data.prop(0) {
            Some(0) | None => return Ok(None),
            Some(size) => size as usize,
        };
        data.raw().get(..size).map(Some).ok_or_else(|| {
            RresError::MalformedChunk(format!(
                "{} size {size} exceeds payload of {} bytes",
                self.header.chunk_type,
                data.raw().len()
            ))
        })
    }

    // ---- RAWD ----

    pub fn raw_data_size(&self) -> Option<u32> {
        self.props_of::<1>(ResourceDataType::Raw).map(|[size]| size)
    }

    /// File extension packed big-endian into `props[1..=2]`.
    ///
    /// `Ok(None)` when fewer than two props are present or the extension is
    /// empty; a non-ASCII extension is malformed.
    pub fn raw_extension(&self) -> Result<Option<String>> {
        let Some(data) = self.view(ResourceDataType::Raw) else {
            return Ok(None);
        };
        let Some(ext1) = data.prop(1) else {
            return Ok(None);
        };
        let ext2 = data.prop(2).unwrap_or(0);
        let bytes = extension_bytes(ext1, ext2);
        if bytes.is_empty() {
            return Ok(None);
        }
        if !bytes.is_ascii() {
            return Err(RresError::MalformedChunk(format!(
                "raw extension {bytes:02x?} is not ASCII"
            )));
        }
        Ok(String::from_utf8(bytes).ok())
    }

    pub fn raw_data(&self) -> Option<&[u8]> {
        self.view(ResourceDataType::Raw).map(ChunkData::raw)
    }

    // ---- TEXT ----

    pub fn text_size(&self) -> Option<u32> {
        self.props_of::<1>(ResourceDataType::Text).map(|[size]| size)
    }

    pub fn text_encoding(&self) -> Option<TextEncoding> {
        let [_, encoding] = self.props_of::<2>(ResourceDataType::Text)?;
        TextEncoding::try_from(encoding).ok()
    }

    pub fn text_code_language(&self) -> Option<CodeLang> {
        let [_, _, lang] = self.props_of::<3>(ResourceDataType::Text)?;
        CodeLang::try_from(lang).ok()
    }

    /// Text payload decoded with the declared encoding (UTF-8 when undefined).
    pub fn text(&self) -> Result<Option<String>> {
        let Some(bytes) = self.sized_payload(ResourceDataType::Text)? else {
            return Ok(None);
        };
        let text = match self.text_encoding() {
            Some(TextEncoding::Utf16Le) => decode_text(bytes, UTF_16LE, "text")?,
            Some(TextEncoding::Utf16Be) => decode_text(bytes, UTF_16BE, "text")?,
            Some(TextEncoding::Utf8Bom) => {
                decode_text(bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes), UTF_8, "text")?
            }
            _ => decode_text(bytes, UTF_8, "text")?,
        };
        Ok(Some(text.trim_end_matches('\0').to_owned()))
    }

    // ---- IMGE ----

    pub fn image_dimensions(&self) -> Option<(u32, u32)> {
        let [width, height] = self.props_of::<2>(ResourceDataType::Image)?;
        Some((width, height))
    }

    pub fn image_pixel_format(&self) -> Option<PixelFormat> {
        let [_, _, format] = self.props_of::<3>(ResourceDataType::Image)?;
        PixelFormat::try_from(format).ok()
    }

    pub fn image_mipmaps(&self) -> Option<u32> {
        let [_, _, _, mipmaps] = self.props_of::<4>(ResourceDataType::Image)?;
        Some(mipmaps)
    }

    /// Pixel payload; its length is the decoded size, not width × height.
    pub fn image_data(&self) -> Option<&[u8]> {
        self.view(ResourceDataType::Image).map(ChunkData::raw)
    }

    // ---- WAVE ----

    pub fn wave_info(&self) -> Option<WaveInfo> {
        let [frame_count, sample_rate, sample_size, channels] =
            self.props_of::<4>(ResourceDataType::Wave)?;
        Some(WaveInfo {
            frame_count,
            sample_rate,
            sample_size,
            channels,
        })
    }

    pub fn wave_data(&self) -> Option<&[u8]> {
        self.view(ResourceDataType::Wave).map(ChunkData::raw)
    }

    // ---- VRTX ----

    /// Vertex layout; unknown attribute or format ids give `None`.
    pub fn vertex_info(&self) -> Option<VertexInfo> {
        let [vertex_count, attribute, component_count, format] =
            self.props_of::<4>(ResourceDataType::Vertex)?;
        Some(VertexInfo {
            vertex_count,
            attribute: VertexAttribute::try_from(attribute).ok()?,
            component_count,
            format: VertexFormat::try_from(format).ok()?,
        })
    }

    pub fn vertex_data(&self) -> Option<&[u8]> {
        self.view(ResourceDataType::Vertex).map(ChunkData::raw)
    }

    // ---- FNTG ----

    pub fn font_glyphs_info(&self) -> Option<FontGlyphsInfo> {
        let [base_size, glyph_count, glyph_padding, style] =
            self.props_of::<4>(ResourceDataType::FontGlyphs)?;
        Some(FontGlyphsInfo {
            base_size,
            glyph_count,
            glyph_padding,
            style: FontStyle::try_from(style).ok()?,
        })
    }

    /// Glyph records, one per `glyph_count`.
    pub fn font_glyphs(&self) -> Result<Option<Vec<FontGlyphInfo>>> {
        let Some(info) = self.font_glyphs_info() else {
            return Ok(None);
        };
        let raw = self.data.raw();
        let needed = (info.glyph_count as usize)
            .checked_mul(FontGlyphInfo::SIZE)
            .filter(|&n| n <= raw.len())
            .ok_or_else(|| {
                RresError::MalformedChunk(format!(
                    "{} glyphs do not fit in {} payload bytes",
                    info.glyph_count,
                    raw.len()
                ))
            })?;
        Ok(Some(
            raw[..needed]
                .chunks_exact(FontGlyphInfo::SIZE)
                .map(FontGlyphInfo::from_le_bytes)
                .collect(),
        ))
    }

    // ---- LINK ----

    /// Relative path of the external file this chunk points to.
    pub fn link_path(&self) -> Result<Option<String>> {
        let Some(bytes) = self.sized_payload(ResourceDataType::Link)? else {
            return Ok(None);
        };
        let path = decode_text(bytes, UTF_8, "link path")?;
        Ok(Some(path.trim_end_matches('\0').to_owned()))
    }
}

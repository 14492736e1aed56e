//! Numeric enums stored in chunk headers and property arrays.
//!
//! Every enum converts from its on-disk integer with `TryFrom`; unknown
//! values are rejected so callers can decide whether that is fatal.

use crate::error::RresError;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Data type determines the properties and data for every chunk
pub enum ResourceDataType {
    Null = 0,
    Raw = 1,
    Text = 2,
    Image = 3,
    Wave = 4,
    Vertex = 5,
    FontGlyphs = 6,
    Link = 99,
    Directory = 100,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Compression type for resource data
pub enum CompressionType {
    None = 0,
    Rle = 1,
    Deflate = 10,
    Lz4 = 20,
    Lzma2 = 30,
    Qoi = 40,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Encryption type for resource data
pub enum EncryptionType {
    None = 0,
    Xor = 1,
    Des = 10,
    Tdes = 11,
    Idea = 20,
    Aes = 30,
    AesGcm = 31,
    Xtea = 40,
    Blowfish = 50,
    Rsa = 60,
    Salsa20 = 70,
    Chacha20 = 71,
    Xchacha20 = 72,
    Xchacha20Poly1305 = 73,
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Text encoding for text resources
pub enum TextEncoding {
    Undefined = 0,
    Utf8 = 1,
    Utf8Bom = 2,
    Utf16Le = 10,
    Utf16Be = 11,
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Programming language for code resources
pub enum CodeLang {
    Undefined = 0,
    C,
    Cpp,
    Cs,
    Lua,
    Js,
    Python,
    Rust,
    Zig,
    Odin,
    Jai,
    Gdscript,
    Glsl,
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Pixel format for image data
pub enum PixelFormat {
    Undefined = 0,
    UncompGrayscale = 1,
    UncompGrayAlpha,
    UncompR5G6B5,
    UncompR8G8B8,
    UncompR5G5B5A1,
    UncompR4G4B4A4,
    UncompR8G8B8A8,
    UncompR32,
    UncompR32G32B32,
    UncompR32G32B32A32,
    CompDxt1Rgb,
    CompDxt1Rgba,
    CompDxt3Rgba,
    CompDxt5Rgba,
    CompEtc1Rgb,
    CompEtc2Rgb,
    CompEtc2EacRgba,
    CompPvrtRgb,
    CompPvrtRgba,
    CompAstc4x4Rgba,
    CompAstc8x8Rgba,
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Vertex attribute types for vertex data
pub enum VertexAttribute {
    Position = 0,
    TexCoord1 = 10,
    TexCoord2 = 11,
    TexCoord3 = 12,
    TexCoord4 = 13,
    Normal = 20,
    Tangent = 30,
    Color = 40,
    Index = 100,
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Vertex format for vertex attributes
pub enum VertexFormat {
    UByte = 0,
    Byte,
    UShort,
    Short,
    UInt,
    Int,
    HFloat,
    Float,
}

impl VertexFormat {
    /// Size in bytes of one component stored in this format.
    pub fn component_size(self) -> usize {
        match self {
            VertexFormat::UByte | VertexFormat::Byte => 1,
            VertexFormat::UShort | VertexFormat::Short | VertexFormat::HFloat => 2,
            VertexFormat::UInt | VertexFormat::Int | VertexFormat::Float => 4,
        }
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Font style for font glyphs
pub enum FontStyle {
    Undefined = 0,
    Regular,
    Bold,
    Italic,
}

fn unknown(what: &str, value: u32) -> RresError {
    RresError::MalformedChunk(format!("unknown {what}: {value}"))
}

// ResourceDataType
impl TryFrom<u32> for ResourceDataType {
    type Error = RresError;
    fn try_from(value: u32) -> Result<Self, RresError> {
        use ResourceDataType::*;
        match value {
            0 => Ok(Null),
            1 => Ok(Raw),
            2 => Ok(Text),
            3 => Ok(Image),
            4 => Ok(Wave),
            5 => Ok(Vertex),
            6 => Ok(FontGlyphs),
            99 => Ok(Link),
            100 => Ok(Directory),
            n => Err(unknown("ResourceDataType", n)),
        }
    }
}

// CompressionType
impl TryFrom<u8> for CompressionType {
    type Error = RresError;
    fn try_from(v: u8) -> Result<Self, RresError> {
        use CompressionType::*;
        match v {
            0 => Ok(None),
            1 => Ok(Rle),
            10 => Ok(Deflate),
            20 => Ok(Lz4),
            30 => Ok(Lzma2),
            40 => Ok(Qoi),
            n => Err(unknown("CompressionType", n.into())),
        }
    }
}

impl TryFrom<u8> for EncryptionType {
    type Error = RresError;

    fn try_from(value: u8) -> Result<Self, RresError> {
        match value {
            0 => Ok(EncryptionType::None),
            1 => Ok(EncryptionType::Xor),
            10 => Ok(EncryptionType::Des),
            11 => Ok(EncryptionType::Tdes),
            20 => Ok(EncryptionType::Idea),
            30 => Ok(EncryptionType::Aes),
            31 => Ok(EncryptionType::AesGcm),
            40 => Ok(EncryptionType::Xtea),
            50 => Ok(EncryptionType::Blowfish),
            60 => Ok(EncryptionType::Rsa),
            70 => Ok(EncryptionType::Salsa20),
            71 => Ok(EncryptionType::Chacha20),
            72 => Ok(EncryptionType::Xchacha20),
            73 => Ok(EncryptionType::Xchacha20Poly1305),
            n => Err(unknown("EncryptionType", n.into())),
        }
    }
}

// TextEncoding
impl TryFrom<u32> for TextEncoding {
    type Error = RresError;
    fn try_from(v: u32) -> Result<Self, RresError> {
        use TextEncoding::*;
        match v {
            0 => Ok(Undefined),
            1 => Ok(Utf8),
            2 => Ok(Utf8Bom),
            10 => Ok(Utf16Le),
            11 => Ok(Utf16Be),
            n => Err(unknown("TextEncoding", n)),
        }
    }
}

// CodeLang
impl TryFrom<u32> for CodeLang {
    type Error = RresError;
    fn try_from(v: u32) -> Result<Self, RresError> {
        use CodeLang::*;
        match v {
            0 => Ok(Undefined),
            1 => Ok(C),
            2 => Ok(Cpp),
            3 => Ok(Cs),
            4 => Ok(Lua),
            5 => Ok(Js),
            6 => Ok(Python),
            7 => Ok(Rust),
            8 => Ok(Zig),
            9 => Ok(Odin),
            10 => Ok(Jai),
            11 => Ok(Gdscript),
            12 => Ok(Glsl),
            n => Err(unknown("CodeLang", n)),
        }
    }
}

// PixelFormat
impl TryFrom<u32> for PixelFormat {
    type Error = RresError;
    fn try_from(v: u32) -> Result<Self, RresError> {
        use PixelFormat::*;
        match v {
            0 => Ok(Undefined),
            1 => Ok(UncompGrayscale),
            2 => Ok(UncompGrayAlpha),
            3 => Ok(UncompR5G6B5),
            4 => Ok(UncompR8G8B8),
            5 => Ok(UncompR5G5B5A1),
            6 => Ok(UncompR4G4B4A4),
            7 => Ok(UncompR8G8B8A8),
            8 => Ok(UncompR32),
            9 => Ok(UncompR32G32B32),
            10 => Ok(UncompR32G32B32A32),
            11 => Ok(CompDxt1Rgb),
            12 => Ok(CompDxt1Rgba),
            13 => Ok(CompDxt3Rgba),
            14 => Ok(CompDxt5Rgba),
            15 => Ok(CompEtc1Rgb),
            16 => Ok(CompEtc2Rgb),
            17 => Ok(CompEtc2EacRgba),
            18 => Ok(CompPvrtRgb),
            19 => Ok(CompPvrtRgba),
            20 => Ok(CompAstc4x4Rgba),
            21 => Ok(CompAstc8x8Rgba),
            n => Err(unknown("PixelFormat", n)),
        }
    }
}

// VertexAttribute
impl TryFrom<u32> for VertexAttribute {
    type Error = RresError;
    fn try_from(v: u32) -> Result<Self, RresError> {
        use VertexAttribute::*;
        match v {
            0 => Ok(Position),
            10 => Ok(TexCoord1),
            11 => Ok(TexCoord2),
            12 => Ok(TexCoord3),
            13 => Ok(TexCoord4),
            20 => Ok(Normal),
            30 => Ok(Tangent),
            40 => Ok(Color),
            100 => Ok(Index),
            n => Err(unknown("VertexAttribute", n)),
        }
    }
}

// VertexFormat
impl TryFrom<u32> for VertexFormat {
    type Error = RresError;
    fn try_from(v: u32) -> Result<Self, RresError> {
        use VertexFormat::*;
        match v {
            0 => Ok(UByte),
            1 => Ok(Byte),
            2 => Ok(UShort),
            3 => Ok(Short),
            4 => Ok(UInt),
            5 => Ok(Int),
            6 => Ok(HFloat),
            7 => Ok(Float),
            n => Err(unknown("VertexFormat", n)),
        }
    }
}

// FontStyle
impl TryFrom<u32> for FontStyle {
    type Error = RresError;
    fn try_from(v: u32) -> Result<Self, RresError> {
        use FontStyle::*;
        match v {
            0 => Ok(Undefined),
            1 => Ok(Regular),
            2 => Ok(Bold),
            3 => Ok(Italic),
            n => Err(unknown("FontStyle", n)),
        }
    }
}

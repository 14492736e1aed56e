//! FourCC chunk type tags.

use std::fmt;

use crate::types::ResourceDataType;

/// A 4-byte chunk type tag, compared as an opaque byte sequence.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const NULL: FourCC = FourCC(*b"NULL");
    pub const RAWD: FourCC = FourCC(*b"RAWD");
    pub const TEXT: FourCC = FourCC(*b"TEXT");
    pub const IMGE: FourCC = FourCC(*b"IMGE");
    pub const WAVE: FourCC = FourCC(*b"WAVE");
    pub const VRTX: FourCC = FourCC(*b"VRTX");
    pub const FNTG: FourCC = FourCC(*b"FNTG");
    pub const LINK: FourCC = FourCC(*b"LINK");
    pub const CDIR: FourCC = FourCC(*b"CDIR");

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Resource data type this tag stands for.
    pub fn data_type(&self) -> ResourceDataType {
        classify(&self.0)
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(tag: [u8; 4]) -> Self {
        FourCC(tag)
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC(\"{self}\")")
    }
}

/// Gets the resource data type from a FourCC code.
///
/// Classification is total: tags outside the registry map to
/// [`ResourceDataType::Null`].
pub fn classify(fourcc: &[u8; 4]) -> ResourceDataType {
    match fourcc {
        b"NULL" => ResourceDataType::Null,
        b"RAWD" => ResourceDataType::Raw,
        b"TEXT" => ResourceDataType::Text,
        b"IMGE" => ResourceDataType::Image,
        b"WAVE" => ResourceDataType::Wave,
        b"VRTX" => ResourceDataType::Vertex,
        b"FNTG" => ResourceDataType::FontGlyphs,
        b"LINK" => ResourceDataType::Link,
        b"CDIR" => ResourceDataType::Directory,
        _ => ResourceDataType::Null,
    }
}

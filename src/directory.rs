//! CDIR: the central directory mapping file names to resource ids and offsets.

use std::borrow::Cow;
use std::collections::HashSet;
use std::io::Cursor;

use crate::archive::Archive;
use crate::chunk::ResourceChunk;
use crate::error::{Result, RresError};
use crate::types::ResourceDataType;

/// Maximum stored file name size, terminator included.
pub const RRES_MAX_FILENAME_SIZE: usize = 256;

/// CDIR: Central directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub id: u32,             // Resource id
    pub offset: u32,         // Resource global offset in file
    pub reserved: u32,
    pub file_name_size: u32, // Stored name size (NUL terminated, padded to 4 bytes)
    file_name: Vec<u8>,      // Name bytes before the first NUL
}

impl DirEntry {
    /// Fixed part of an on-disk entry preceding the name.
    pub const HEADER_SIZE: usize = 16;

    pub fn new(id: u32, offset: u32, file_name: &str) -> Self {
        let padded = (file_name.len() + 1).next_multiple_of(4);
        DirEntry {
            id,
            offset,
            reserved: 0,
            file_name_size: padded as u32,
            file_name: file_name.as_bytes().to_vec(),
        }
    }

    pub fn file_name_bytes(&self) -> &[u8] {
        &self.file_name
    }

    pub fn file_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.file_name)
    }
}

fn read_u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parses `count` packed directory entries from a CDIR payload.
pub fn parse_entries(payload: &[u8], count: u32) -> Result<Vec<DirEntry>> {
    let minimum = (count as usize).checked_mul(DirEntry::HEADER_SIZE);
    if minimum.is_none_or(|n| n > payload.len()) {
        return Err(RresError::MalformedChunk(format!(
            "{count} directory entries do not fit in {} bytes",
            payload.len()
        )));
    }
    let mut entries = Vec::with_capacity(count as usize);
    let mut pos = 0usize;
    for index in 0..count {
        let Some(fixed) = payload.get(pos..pos + DirEntry::HEADER_SIZE) else {
            return Err(RresError::MalformedChunk(format!(
                "directory entry {index} starts past the payload end"
            )));
        };
        let id = read_u32_at(fixed, 0);
        let offset = read_u32_at(fixed, 4);
        let reserved = read_u32_at(fixed, 8);
        let file_name_size = read_u32_at(fixed, 12);
        if file_name_size as usize > RRES_MAX_FILENAME_SIZE {
            return Err(RresError::MalformedChunk(format!(
                "directory entry {index} name size {file_name_size} exceeds {RRES_MAX_FILENAME_SIZE}"
            )));
        }
        let name_start = pos + DirEntry::HEADER_SIZE;
        let name_end = name_start + file_name_size as usize;
        let Some(stored) = payload.get(name_start..name_end) else {
            return Err(RresError::MalformedChunk(format!(
                "directory entry {index} name runs past the payload end"
            )));
        };
        let len = stored.iter().position(|&b| b == 0).unwrap_or(stored.len());
        entries.push(DirEntry {
            id,
            offset,
            reserved,
            file_name_size,
            file_name: stored[..len].to_vec(),
        });
        pos = name_end;
    }
    Ok(entries)
}

impl ResourceChunk {
    /// Entries of a decoded CDIR chunk.
    pub fn directory_entries(&self) -> Result<Option<Vec<DirEntry>>> {
        if self.data_type() != ResourceDataType::Directory || self.is_packed() {
            return Ok(None);
        }
        let Some(count) = self.data.prop(0) else {
            return Ok(None);
        };
        parse_entries(self.data.raw(), count).map(Some)
    }
}

/// CDIR: Central directory
///
/// Immutable once built. Ids are expected to be unique; when they are not,
/// the first entry in directory order wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CentralDirectory {
    entries: Vec<DirEntry>,
}

impl CentralDirectory {
    pub fn new(entries: Vec<DirEntry>) -> Self {
        CentralDirectory { entries }
    }

    /// Builds the directory from a decoded CDIR chunk.
    pub fn from_chunk(chunk: &ResourceChunk) -> Result<Self> {
        if chunk.data_type() != ResourceDataType::Directory {
            return Err(RresError::MalformedChunk(format!(
                "expected CDIR chunk, found {}",
                chunk.header.chunk_type
            )));
        }
        let entries = chunk.directory_entries()?.ok_or_else(|| {
            RresError::MalformedChunk("CDIR chunk has no entry count".to_string())
        })?;
        Ok(CentralDirectory { entries })
    }

    /// Loads the central directory of an in-memory archive.
    ///
    /// An archive without a directory yields an empty one.
    pub fn load(archive_bytes: &[u8]) -> Result<Self> {
        Archive::open(Cursor::new(archive_bytes))?.load_central_directory()
    }

    pub fn count(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DirEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DirEntry> {
        self.entries.iter()
    }

    /// First entry stored under `file_name` (exact, case-sensitive).
    pub fn find_entry(&self, file_name: &str) -> Option<&DirEntry> {
        self.entries
            .iter()
            .find(|e| e.file_name == file_name.as_bytes())
    }

    /// Gets resource id for a provided filename (exact, case-sensitive).
    pub fn find_id(&self, file_name: &str) -> Option<u32> {
        self.find_entry(file_name).map(|e| e.id)
    }

    /// Global offset of the first chunk of resource `id`.
    pub fn offset_of(&self, id: u32) -> Option<u32> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.offset)
    }

    /// Ids that appear on more than one entry, in first-seen order.
    pub fn duplicates(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        self.entries
            .iter()
            .filter(|e| !seen.insert(e.id) && reported.insert(e.id))
            .map(|e| e.id)
            .collect()
    }
}

impl<'a> IntoIterator for &'a CentralDirectory {
    type Item = &'a DirEntry;
    type IntoIter = std::slice::Iter<'a, DirEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(entries: &[(u32, u32, &str)]) -> Vec<u8> {
        let mut out = Vec::new();
        for &(id, offset, name) in entries {
            let size = (name.len() + 1).next_multiple_of(4);
            out.extend_from_slice(&id.to_le_bytes());
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend_from_slice(&(size as u32).to_le_bytes());
            let mut name = name.as_bytes().to_vec();
            name.resize(size, 0);
            out.extend_from_slice(&name);
        }
        out
    }

    #[test]
    fn lookup_by_name_and_id() {
        let payload = encode(&[(12345, 16, "texture.png"), (67890, 96, "sound.wav")]);
        let dir = CentralDirectory::new(parse_entries(&payload, 2).unwrap());
        assert_eq!(dir.count(), 2);
        assert_eq!(dir.find_id("texture.png"), Some(12345));
        assert_eq!(dir.find_id("sound.wav"), Some(67890));
        assert_eq!(dir.find_id("missing.txt"), None);
        assert_eq!(dir.find_id("TEXTURE.PNG"), None);
        assert_eq!(dir.find_id("texture"), None);
        assert_eq!(dir.offset_of(67890), Some(96));
        assert_eq!(dir.offset_of(1), None);
        assert_eq!(dir.get(0).unwrap().file_name(), "texture.png");
        assert_eq!(dir.get(0).unwrap().file_name_size, 12);
    }

    #[test]
    fn first_match_wins_on_collision() {
        let payload = encode(&[(7, 16, "a.txt"), (7, 64, "b.txt"), (8, 90, "a.txt")]);
        let dir = CentralDirectory::new(parse_entries(&payload, 3).unwrap());
        assert_eq!(dir.offset_of(7), Some(16));
        assert_eq!(dir.find_id("a.txt"), Some(7));
        assert_eq!(dir.duplicates(), vec![7]);
        // names still resolve to their own entry
        assert_eq!(dir.find_entry("b.txt").map(|e| e.offset), Some(64));
        assert!(dir.find_entry("c.txt").is_none());
    }

    #[test]
    fn oversized_entry_count_is_malformed() {
        let payload = encode(&[(1, 16, "x")]);
        assert!(matches!(
            parse_entries(&payload, 2),
            Err(RresError::MalformedChunk(_))
        ));
        assert!(matches!(
            parse_entries(&payload, u32::MAX),
            Err(RresError::MalformedChunk(_))
        ));
    }

    #[test]
    fn name_past_payload_is_malformed() {
        let mut payload = encode(&[(1, 16, "abc"), (2, 32, "defgh")]);
        payload.truncate(payload.len() - 3);
        assert!(matches!(
            parse_entries(&payload, 2),
            Err(RresError::MalformedChunk(_))
        ));
        let mut huge_name = encode(&[(1, 16, "abc")]);
        huge_name[12..16].copy_from_slice(&300u32.to_le_bytes());
        huge_name.resize(400, 0);
        assert!(matches!(
            parse_entries(&huge_name, 1),
            Err(RresError::MalformedChunk(_))
        ));
    }

    #[test]
    fn new_entry_pads_name_size() {
        let e = DirEntry::new(5, 16, "abc");
        assert_eq!(e.file_name_size, 4);
        assert_eq!(DirEntry::new(5, 16, "abcd").file_name_size, 8);
        assert_eq!(e.file_name_bytes(), b"abc");
    }
}

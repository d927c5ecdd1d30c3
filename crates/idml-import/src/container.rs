//! Access to the entries of an IDML package
//!
//! The importer only needs to list entry names and read entries by name, so
//! any storage can be plugged in through [`Container`].

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::error::{ImportError, Result};

/// Largest entry the importer will read into memory (100 MB)
pub const MAX_ENTRY_SIZE: u64 = 100 * 1024 * 1024;

/// Read access to named entries of a package
pub trait Container {
    /// Names of all file entries
    fn entry_names(&self) -> Vec<String>;

    /// Read one entry by name
    ///
    /// # Errors
    ///
    /// Returns an error if the entry does not exist or cannot be read.
    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>>;
}

/// Kind of document an entry holds, judged by its path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// `Spreads/Spread_*.xml`
    Spread,
    /// `Stories/Story_*.xml`
    Story,
    /// Anything else (styles, resources, mimetype, ...)
    Other,
}

impl EntryKind {
    /// Classify an entry name
    #[must_use]
    pub fn of(name: &str) -> Self {
        let lower = name.replace('\\', "/").to_ascii_lowercase();
        if !lower.ends_with(".xml") {
            return Self::Other;
        }
        let file = lower.rsplit('/').next().unwrap_or_default();
        if lower.starts_with("spreads/") || lower.contains("/spreads/") || file.starts_with("spread_") {
            Self::Spread
        } else if lower.starts_with("stories/") || lower.contains("/stories/") || file.starts_with("story_") {
            Self::Story
        } else {
            Self::Other
        }
    }
}

/// A ZIP-backed IDML package
#[derive(Debug)]
pub struct ZipContainer<R> {
    archive: ZipArchive<R>,
}

impl ZipContainer<BufReader<File>> {
    /// Open a package from a file path
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Io` if the file cannot be opened and
    /// `ImportError::InvalidContainer` if it is not a ZIP archive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> ZipContainer<R> {
    /// Wrap any seekable reader holding a ZIP archive
    ///
    /// # Errors
    ///
    /// Returns `ImportError::InvalidContainer` if the data is not a ZIP archive.
    pub fn from_reader(reader: R) -> Result<Self> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
        })
    }
}

impl<R: Read + Seek> Container for ZipContainer<R> {
    fn entry_names(&self) -> Vec<String> {
        self.archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(ToString::to_string)
            .collect()
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = self.archive.by_name(name).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => ImportError::EntryNotFound(name.to_string()),
            other => ImportError::InvalidContainer(other),
        })?;

        let size = entry.size();
        if size > MAX_ENTRY_SIZE {
            return Err(ImportError::Parse(format!(
                "entry '{name}' is too large ({size} bytes, max {MAX_ENTRY_SIZE} bytes)"
            )));
        }

        let mut contents = Vec::with_capacity(usize::try_from(size).unwrap_or_default());
        entry.read_to_end(&mut contents)?;
        Ok(contents)
    }
}

/// An in-memory package, mainly for tests and already-extracted uploads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryContainer {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryContainer {
    /// Create an empty container
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry
    pub fn insert(&mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), contents.into());
    }

    /// Builder-style [`MemoryContainer::insert`]
    #[must_use]
    pub fn with_entry(mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(name, contents);
        self
    }
}

impl Container for MemoryContainer {
    fn entry_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| ImportError::EntryNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    #[test]
    fn test_entry_kind() {
        assert_eq!(EntryKind::of("Spreads/Spread_ud6.xml"), EntryKind::Spread);
        assert_eq!(EntryKind::of("Stories/Story_u1f0.xml"), EntryKind::Story);
        assert_eq!(EntryKind::of("issue/Stories/Story_u1.XML"), EntryKind::Story);
        assert_eq!(EntryKind::of("MasterSpreads/MasterSpread_u1.xml"), EntryKind::Other);
        assert_eq!(EntryKind::of("Resources/Styles.xml"), EntryKind::Other);
        assert_eq!(EntryKind::of("Spreads/"), EntryKind::Other);
    }

    #[test]
    fn test_zip_container_roundtrip() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.add_directory("Stories/", SimpleFileOptions::default()).unwrap();
        writer.start_file("Stories/Story_u1.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"<Story Self=\"u1\"/>").unwrap();
        let cursor = writer.finish().unwrap();

        let mut container = ZipContainer::from_reader(cursor).unwrap();
        assert_eq!(container.entry_names(), vec!["Stories/Story_u1.xml".to_string()]);
        assert_eq!(container.read_entry("Stories/Story_u1.xml").unwrap(), b"<Story Self=\"u1\"/>");
        assert!(matches!(
            container.read_entry("missing.xml"),
            Err(ImportError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_zip_container_rejects_garbage() {
        let result = ZipContainer::from_reader(Cursor::new(b"not a zip".to_vec()));
        assert!(matches!(result, Err(ImportError::InvalidContainer(_))));
    }

    #[test]
    fn test_memory_container() {
        let mut container = MemoryContainer::new().with_entry("a.xml", "<a/>");
        assert_eq!(container.entry_names(), vec!["a.xml".to_string()]);
        assert_eq!(container.read_entry("a.xml").unwrap(), b"<a/>");
        assert!(container.read_entry("b.xml").is_err());
    }
}

//! Memory-mapped event file readers.
//!
//! Event files are JSON Lines: one event per line, each holding an optional
//! event number and the event's raw hits.

use crate::{Error, Result};
use htcc_core::hit::{HitTable, RawHit};
use memmap2::Mmap;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A memory-mapped file reader.
///
/// Uses memmap2 to access file contents without loading the entire file
/// into memory. Empty files are not mapped.
pub struct MappedFileReader {
    mmap: Option<Mmap>,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        let mmap = if file.metadata()?.len() == 0 {
            None
        } else {
            // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
            // This is the standard safety contract for memory mapping.
            #[allow(unsafe_code)]
            let mmap = unsafe { Mmap::map(&file)? };
            Some(mmap)
        };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or_default()
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Returns the path the reader was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One event's hits, ready for clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Event number.
    pub event: u64,
    /// The event's hits in file order.
    pub hits: HitTable,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonEvent {
    event: Option<u64>,
    #[serde(default)]
    hits: Vec<RawHit>,
}

/// Reader for JSON Lines event files.
pub struct EventFileReader {
    reader: MappedFileReader,
}

impl EventFileReader {
    /// Opens an event file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            reader: MappedFileReader::open(path)?,
        })
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.reader.len()
    }

    /// Returns the path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.reader.path()
    }

    /// Iterates over the events in file order.
    ///
    /// A line that cannot be decoded yields an [`Error::InvalidFormat`];
    /// iteration continues with the next line.
    #[must_use]
    pub fn events(&self) -> EventIter<'_> {
        EventIter {
            data: self.reader.as_bytes(),
            pos: 0,
            line: 0,
            ordinal: 0,
        }
    }

    /// Reads every event, stopping at the first malformed line.
    ///
    /// # Errors
    /// Returns the first decoding error encountered.
    pub fn read_all(&self) -> Result<Vec<EventRecord>> {
        self.events().collect()
    }
}

/// Iterator over the events of an [`EventFileReader`].
pub struct EventIter<'a> {
    data: &'a [u8],
    pos: usize,
    line: usize,
    ordinal: u64,
}

impl EventIter<'_> {
    fn decode(&self, text: &[u8]) -> Result<EventRecord> {
        let parsed: JsonEvent = serde_json::from_slice(text).map_err(|e| Error::InvalidFormat {
            line: self.line,
            message: e.to_string(),
        })?;
        Ok(EventRecord {
            event: parsed.event.unwrap_or(self.ordinal),
            hits: HitTable::from(parsed.hits.as_slice()),
        })
    }
}

impl Iterator for EventIter<'_> {
    type Item = Result<EventRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let data = self.data;
        while self.pos < data.len() {
            let rest = &data[self.pos..];
            let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
            self.pos += end + 1;
            self.line += 1;

            let text = rest[..end].trim_ascii();
            if text.is_empty() {
                continue;
            }

            let record = self.decode(text);
            self.ordinal += 1;
            return Some(record);
        }
        None
    }
}

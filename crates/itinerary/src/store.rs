use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::Itinerary;

/// Error type for [`ItineraryStore`].
#[derive(Debug)]
pub enum StoreError {
    /// The store file could not be read or written.
    Io(io::Error),
    /// The list could not be serialized.
    Serialize(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "store I/O error: {err}"),
            StoreError::Serialize(err) => {
                write!(f, "store serialization error: {err}")
            }
        }
    }
}

impl StdError for StoreError {}

/// The persisted itinerary list.
///
/// A keyed, ordered collection in a single JSON file: read fully on load,
/// rewritten fully on each insert, deduplicated by itinerary id with the
/// most recent entry first. Concurrent writers are last-writer-wins, which
/// is acceptable for a single-user store.
#[derive(Clone, Debug)]
pub struct ItineraryStore {
    path: PathBuf,
}

impl ItineraryStore {
    /// Creates a store backed by the given file path.
    #[inline]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the current list, most recent first.
    ///
    /// A missing or unreadable file yields an empty list, so a fresh or
    /// damaged store never blocks a new session.
    pub fn load(&self) -> Vec<Itinerary> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Vec::new();
            }
            Err(err) => {
                warn!("failed to read itinerary store: {err}");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(err) => {
                warn!("itinerary store is corrupt, starting over: {err}");
                Vec::new()
            }
        }
    }

    /// Inserts an itinerary at the front of the list, replacing any
    /// existing entry with the same id.
    pub fn insert(&self, itinerary: Itinerary) -> Result<(), StoreError> {
        let mut list = self.load();
        list.retain(|existing| existing.id != itinerary.id);
        list.insert(0, itinerary);
        self.write_all(&list)
    }

    fn write_all(&self, list: &[Itinerary]) -> Result<(), StoreError> {
        let raw =
            serde_json::to_string_pretty(list).map_err(StoreError::Serialize)?;
        fs::write(&self.path, raw).map_err(StoreError::Io)
    }
}

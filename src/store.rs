use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{PersistenceError, Result};
use crate::models::SavedJobRecord;

/// The full saved-jobs collection, keyed by derived job id.
pub type SavedJobs = BTreeMap<String, SavedJobRecord>;

/// Durable backing for the tracker. Every call reads or rewrites the whole
/// collection.
pub trait JobStore {
    /// Returns an empty collection when nothing has been stored yet.
    fn load(&self) -> Result<SavedJobs>;

    fn persist(&mut self, jobs: &SavedJobs) -> Result<()>;

    /// Human-readable location, used in error messages and logs.
    fn location(&self) -> String;
}

/// Pretty-printed JSON file, replaced atomically on every write.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomically(&self, contents: &str) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl JobStore for JsonFileStore {
    fn load(&self) -> Result<SavedJobs> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved jobs file yet");
                return Ok(SavedJobs::new());
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.location(),
                    source,
                });
            }
        };

        let jobs: SavedJobs =
            serde_json::from_str(&raw).map_err(|source| PersistenceError::Parse {
                path: self.location(),
                source,
            })?;
        debug!(path = %self.path.display(), count = jobs.len(), "loaded saved jobs");
        Ok(jobs)
    }

    fn persist(&mut self, jobs: &SavedJobs) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(jobs).map_err(|source| PersistenceError::Serialize {
                path: self.location(),
                source,
            })?;
        self.write_atomically(&contents).map_err(|source| PersistenceError::Write {
            path: self.location(),
            source,
        })?;
        debug!(path = %self.path.display(), count = jobs.len(), "persisted saved jobs");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store holding the serialized JSON.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Option<String>,
    fail_writes: bool,
    writes: usize,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from previously stored JSON, as if read from disk.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            contents: Some(raw.into()),
            ..Self::default()
        }
    }

    /// Makes every subsequent `persist` fail with a write error.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

#[cfg(test)]
impl JobStore for MemoryStore {
    fn load(&self) -> Result<SavedJobs> {
        match &self.contents {
            None => Ok(SavedJobs::new()),
            Some(raw) => serde_json::from_str(raw).map_err(|source| PersistenceError::Parse {
                path: self.location(),
                source,
            }),
        }
    }

    fn persist(&mut self, jobs: &SavedJobs) -> Result<()> {
        if self.fail_writes {
            return Err(PersistenceError::Write {
                path: self.location(),
                source: io::Error::other("writes disabled"),
            });
        }
        let contents =
            serde_json::to_string_pretty(jobs).map_err(|source| PersistenceError::Serialize {
                path: self.location(),
                source,
            })?;
        self.contents = Some(contents);
        self.writes += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

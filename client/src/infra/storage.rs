//! Opaque key-value [`Storage`] of the client state.

use std::{collections::HashMap, fs, io, path::PathBuf};

use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;

/// Key-value store of string blobs, surviving between sessions.
pub trait Storage {
    /// Returns the blob stored under the provided `key`, if any.
    ///
    /// # Errors
    ///
    /// If the underlying store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Traced<Error>>;

    /// Stores the `value` blob under the provided `key`, replacing the
    /// previous one.
    ///
    /// # Errors
    ///
    /// If the underlying store cannot be written.
    fn set(&mut self, key: &str, value: String) -> Result<(), Traced<Error>>;
}

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// I/O operation failed.
    #[display("I/O failed: {_0}")]
    Io(io::Error),

    /// Stored contents are malformed.
    #[display("malformed contents: {_0}")]
    Json(serde_json::Error),
}

/// [`Storage`] living in memory only.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage(HashMap<String, String>);

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Traced<Error>> {
        Ok(self.0.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), Traced<Error>> {
        _ = self.0.insert(key.to_owned(), value);
        Ok(())
    }
}

/// [`Storage`] persisted as a single JSON object file.
#[derive(Clone, Debug)]
pub struct FileStorage {
    /// Path to the file.
    path: PathBuf,
}

impl FileStorage {
    /// Creates a new [`FileStorage`] backed by the file at the provided
    /// `path`.
    ///
    /// The file is created on the first [`Storage::set()`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads all the entries of the file.
    fn read(&self) -> Result<HashMap<String, String>, Traced<Error>> {
        match fs::read(&self.path) {
            Ok(raw) => serde_json::from_slice(&raw)
                .map_err(tracerr::from_and_wrap!(=> Error)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Ok(HashMap::new())
            }
            Err(e) => Err(tracerr::new!(Error::from(e))),
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Traced<Error>> {
        Ok(self.read().map_err(tracerr::wrap!())?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), Traced<Error>> {
        let mut entries = self.read().map_err(tracerr::wrap!())?;
        _ = entries.insert(key.to_owned(), value);

        let raw = serde_json::to_vec_pretty(&entries)
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        fs::write(&self.path, raw).map_err(tracerr::from_and_wrap!(=> Error))
    }
}

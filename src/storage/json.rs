//! JSON array storage.
//!
//! Each file holds one JSON array; each element is one entity. Writes
//! always replace the whole file, reads are lenient per element.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::StorageError;

/// JSON array file writer.
pub struct JsonArrayWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonArrayWriter<T> {
    /// Create a new writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf, StorageError> {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidPath(self.path.display().to_string()))?;
        Ok(self.path.with_file_name(format!(".{}.tmp", name)))
    }

    /// Write entities, replacing the entire file.
    ///
    /// The array goes to a sibling temp file first and is renamed into place,
    /// so a crash mid-write leaves the previous contents intact.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;
        let tmp = self.temp_path()?;

        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, entities)?;
            writeln!(writer)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        info!("Wrote {} entities to {:?}", entities.len(), self.path);
        Ok(entities.len())
    }
}

/// JSON array file reader.
pub struct JsonArrayReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonArrayReader<T> {
    /// Create a new reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all entities from the file.
    ///
    /// A missing or blank file is an empty collection. A file that is not a
    /// JSON array is an error. Elements that fail to parse are skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        let values = self.read_values()?;
        let mut entities = Vec::with_capacity(values.len());

        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value(value) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!(
                        "Failed to parse record {} in {:?}: {}",
                        index + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }

    fn read_values(&self) -> Result<Vec<Value>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&text)? {
            Value::Array(values) => Ok(values),
            _ => Err(StorageError::NotAnArray(self.path.clone())),
        }
    }
}

//! Whole-file JSON persistence.
//!
//! Each data file holds one JSON document (usually an array of records) that is
//! read completely and rewritten completely. Writes go through a sibling temp
//! file and a rename so a reader never observes a half-written file.

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use crate::errors::AppError;

/// One JSON data file. Read-modify-write cycles are serialized by an async mutex.
pub struct JsonFile<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Read the current document. A missing or empty file reads as `T::default()`.
    pub async fn load(&self) -> Result<T, AppError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Lock the file for a read-modify-write cycle and load its contents.
    ///
    /// Changes only reach disk through [`FileGuard::commit`]; dropping the guard discards them.
    pub async fn lock(&self) -> Result<FileGuard<'_, T>, AppError> {
        let guard = self.write_lock.lock().await;
        let data = self.load().await?;
        Ok(FileGuard {
            file: self,
            _guard: guard,
            data,
        })
    }

    async fn store(&self, data: &T) -> Result<(), AppError> {
        let json = serde_json::to_vec_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!("Wrote {}", self.path.display());
        Ok(())
    }
}

/// Exclusive, loaded view of a [`JsonFile`].
pub struct FileGuard<'a, T>
where
    T: Default + Serialize + DeserializeOwned,
{
    file: &'a JsonFile<T>,
    _guard: MutexGuard<'a, ()>,
    data: T,
}

impl<T> FileGuard<'_, T>
where
    T: Default + Serialize + DeserializeOwned,
{
    /// Persist the modified document and release the lock.
    pub async fn commit(self) -> Result<(), AppError> {
        self.file.store(&self.data).await
    }
}

impl<T> Deref for FileGuard<'_, T>
where
    T: Default + Serialize + DeserializeOwned,
{
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T> DerefMut for FileGuard<'_, T>
where
    T: Default + Serialize + DeserializeOwned,
{
    fn deref_mut(&mut self) -> &mut T {
        &mut self.data
    }
}

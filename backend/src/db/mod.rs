//! Flat-file persistence.
//!
//! Each resource lives in its own JSON file under the data directory, read and
//! rewritten wholesale on every mutation.

mod albums;
mod catalog;
mod file;
mod orders;
mod repository;
mod rides;

pub use file::*;
pub use repository::*;

use std::path::Path;

use crate::errors::AppError;

/// Ensure the data directory exists and open the repository over it.
pub async fn init_repository(data_dir: &Path, bcrypt_cost: u32) -> Result<Repository, AppError> {
    tokio::fs::create_dir_all(data_dir).await?;
    Ok(Repository::new(data_dir, bcrypt_cost))
}

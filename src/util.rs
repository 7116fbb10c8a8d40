//! Shared utility functions.

use std::path::{Path, PathBuf};

use tokio::task::spawn_blocking;

use crate::{Error, Result};

pub async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    spawn_blocking(f)
        .await
        .map_err(|e| Error::TaskJoin(e.to_string()))?
}

/// A file chosen by the user, read fully into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Read the file at `path` off the async runtime.
pub async fn pick_file(path: impl Into<PathBuf>) -> Result<PickedFile> {
    let path = expand_tilde(&path.into());
    blocking(move || {
        if !path.is_file() {
            return Err(Error::Validation(format!(
                "{} is not a file",
                path.display()
            )));
        }
        let bytes = std::fs::read(&path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "content.md".to_string());
        Ok(PickedFile { file_name, bytes })
    })
    .await
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

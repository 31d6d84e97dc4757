/// Atomic save/load of a store to a single JSON file.
///
/// Writers always serialize to `<target>.tmp` then atomically rename over
/// `<target>`, so readers never observe a half-written file: they see either
/// the prior committed file or the newly committed one. On any
/// serialization error the temp file is removed and the error re-raised.
use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;

/// Loads `T` from `path` if it exists, returning `None` if the file is
/// absent so callers can fall back to an empty store.
pub async fn load<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Serializes `value` to `path` via write-temp-then-rename.
///
/// On any error while serializing or writing, the temp file is deleted
/// before the error propagates, so a failed save never leaves a stray
/// `.tmp` file and never disturbs the previously committed `path`.
pub async fn save<T: Serialize + Sync>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp_path = tmp_path_for(path);
    let result = write_tmp(&tmp_path, value).await;
    match result {
        Ok(()) => {
            tokio::fs::rename(&tmp_path, path).await?;
            Ok(())
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            Err(e)
        }
    }
}

async fn write_tmp<T: Serialize + Sync>(tmp_path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    tokio::fs::write(tmp_path, bytes).await?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> std::path::PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    std::path::PathBuf::from(os)
}

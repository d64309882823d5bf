// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{BlogData, StoreError};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(test)]
use std::sync::{Arc, RwLock};

pub trait BlogStore: Send + Sync {
    fn load(&self) -> Result<BlogData, StoreError>;
    fn save(&self, data: &BlogData) -> Result<(), StoreError>;
}

/// JSON document file. A missing file loads as an empty data set.
pub struct FileBlogStore {
    store_file: PathBuf,
}

impl FileBlogStore {
    pub fn new(store_file: PathBuf) -> Result<Self, StoreError> {
        if store_file.as_os_str().is_empty() {
            return Err(StoreError::FileError("Store file path is empty".to_string()));
        }

        Ok(Self { store_file })
    }

    pub fn path(&self) -> &Path {
        &self.store_file
    }

    fn write_store_file(&self, content: &str) -> Result<(), StoreError> {
        let parent = self.store_file.parent().ok_or_else(|| {
            StoreError::FileError("Store file path has no parent directory".to_string())
        })?;
        let file_name = self
            .store_file
            .file_name()
            .ok_or_else(|| StoreError::FileError("Store file path has no file name".to_string()))?;
        let (mut file, temp_path) = create_temp_file(parent, file_name)?;

        if let Ok(metadata) = std::fs::metadata(&self.store_file) {
            #[cfg(unix)]
            {
                if let Err(err) = std::fs::set_permissions(&temp_path, metadata.permissions()) {
                    let _ = std::fs::remove_file(&temp_path);
                    return Err(StoreError::FileError(format!(
                        "Failed to set temp store file permissions: {}",
                        err
                    )));
                }
            }
            #[cfg(not(unix))]
            let _ = metadata;
        }

        if let Err(err) = file.write_all(content.as_bytes()) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StoreError::FileError(format!(
                "Failed to write store temp file: {}",
                err
            )));
        }
        if let Err(err) = file.sync_all() {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StoreError::FileError(format!(
                "Failed to sync store temp file: {}",
                err
            )));
        }

        if let Err(err) = std::fs::rename(&temp_path, &self.store_file) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StoreError::FileError(format!(
                "Failed to replace store file: {}",
                err
            )));
        }

        #[cfg(unix)]
        {
            if let Err(err) = sync_parent_dir(parent) {
                log::warn!("Store directory sync failed: {}", err);
            }
        }

        Ok(())
    }
}

fn create_temp_file(
    dir: &Path,
    file_name: &std::ffi::OsStr,
) -> Result<(std::fs::File, PathBuf), StoreError> {
    use std::fs::OpenOptions;
    const MAX_ATTEMPTS: u32 = 100;
    let base = file_name.to_string_lossy();
    for attempt in 0..MAX_ATTEMPTS {
        let candidate = dir.join(format!(".{}.tmp.{}.{}", base, std::process::id(), attempt));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((file, candidate)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(StoreError::FileError(format!(
                    "Failed to create temp store file: {}",
                    err
                )));
            }
        }
    }
    Err(StoreError::FileError(
        "Failed to create temp store file after repeated attempts".to_string(),
    ))
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) -> Result<(), StoreError> {
    let dir = std::fs::File::open(parent).map_err(|err| {
        StoreError::FileError(format!("Failed to open store directory for sync: {}", err))
    })?;
    dir.sync_all()
        .map_err(|err| StoreError::FileError(format!("Failed to sync store directory: {}", err)))
}

impl BlogStore for FileBlogStore {
    fn load(&self) -> Result<BlogData, StoreError> {
        let content = match std::fs::read_to_string(&self.store_file) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "Store file {} not found; starting with an empty data set",
                    self.store_file.display()
                );
                return Ok(BlogData::default());
            }
            Err(err) => {
                return Err(StoreError::FileError(format!(
                    "Failed to read store file: {}",
                    err
                )));
            }
        };

        serde_json::from_str(&content)
            .map_err(|e| StoreError::ParseError(format!("Failed to parse store file: {}", e)))
    }

    fn save(&self, data: &BlogData) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| StoreError::ParseError(format!("Failed to serialize store: {}", e)))?;
        self.write_store_file(&content)
    }
}

#[cfg(test)]
pub struct MemoryBlogStore {
    data: Arc<RwLock<BlogData>>,
}

#[cfg(test)]
impl MemoryBlogStore {
    pub fn new(initial: BlogData) -> Self {
        Self {
            data: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn snapshot(&self) -> BlogData {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
impl BlogStore for MemoryBlogStore {
    fn load(&self) -> Result<BlogData, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, data: &BlogData) -> Result<(), StoreError> {
        match self.data.write() {
            Ok(mut guard) => {
                *guard = data.clone();
                Ok(())
            }
            Err(poisoned) => {
                log::error!("MemoryBlogStore lock poisoned on write; recovering");
                let mut guard = poisoned.into_inner();
                *guard = data.clone();
                Ok(())
            }
        }
    }
}

// src/storage.rs
//! Company logo files under the public storage directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::FsOps;
use crate::utils::{get_file_extension, validate_file_extension};

pub const LOGO_PREFIX: &str = "company-logos";
pub const MAX_LOGO_SIZE: usize = 5 * 1024 * 1024;
pub const ALLOWED_LOGO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "svg"];

/// Public mount point of the storage directory.
pub const STORAGE_MOUNT: &str = "/storage";

#[derive(Debug, Clone)]
pub struct LogoStore {
    root: PathBuf,
}

impl LogoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `company-logos/<uuid>.<ext>` for an uploaded file name.
    pub fn allocate(&self, original_name: &str) -> Result<String> {
        validate_file_extension(original_name, ALLOWED_LOGO_EXTENSIONS)?;
        let ext = get_file_extension(original_name)
            .with_context(|| format!("File has no extension: {}", original_name))?;
        Ok(format!("{}/{}.{}", LOGO_PREFIX, uuid::Uuid::new_v4(), ext))
    }

    /// Validate and write a logo, returning its public URL.
    pub async fn store_bytes(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        if bytes.len() > MAX_LOGO_SIZE {
            anyhow::bail!(
                "Logo too large: {:.1}MB (max 5MB)",
                bytes.len() as f64 / 1024.0 / 1024.0
            );
        }

        let relative = self.allocate(original_name)?;
        let ext = FsOps::get_extension(Path::new(&relative)).unwrap_or_default();
        FsOps::validate_image_bytes(&ext, bytes)?;

        FsOps::write_bytes(&self.root.join(&relative), bytes).await?;
        info!("Stored logo {} ({} bytes)", relative, bytes.len());
        Ok(format!("{}/{}", STORAGE_MOUNT, relative))
    }

    /// Delete the file behind a URL produced by `store_bytes`. URLs that do
    /// not point into the logo directory are ignored.
    pub async fn remove(&self, url: &str) -> Result<bool> {
        let Some(relative) = self.relative_path(url) else {
            warn!("Ignoring logo outside storage: {}", url);
            return Ok(false);
        };
        FsOps::remove_file(&self.root.join(relative)).await
    }

    fn relative_path<'u>(&self, url: &'u str) -> Option<&'u str> {
        let relative = url
            .strip_prefix(STORAGE_MOUNT)
            .map(|rest| rest.trim_start_matches('/'))?;
        let file = relative.strip_prefix(LOGO_PREFIX)?.strip_prefix('/')?;
        if file.is_empty() || file.contains('/') || file.contains("..") {
            return None;
        }
        Some(relative)
    }
}

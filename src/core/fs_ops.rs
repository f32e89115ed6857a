// src/core/fs_ops.rs
//! File system helpers shared by the logo store and startup code

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Write bytes, creating the parent directory first.
    pub async fn write_bytes(path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        info!("Written file: {}", path.display());
        Ok(())
    }

    /// Remove a file; a missing file is not an error.
    pub async fn remove_file(path: &Path) -> Result<bool> {
        match fs::remove_file(path).await {
            Ok(()) => {
                info!("Removed file: {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove file: {}", path.display()))
            }
        }
    }

    pub fn normalize_path(base: &Path, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            base.join(relative)
        }
    }

    pub fn get_extension(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check that image bytes match the format their extension claims.
    pub fn validate_image_bytes(extension: &str, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            anyhow::bail!("Image file is empty");
        }

        match extension {
            "png" => {
                if !bytes.starts_with(PNG_SIGNATURE) {
                    if bytes.starts_with(JPEG_SIGNATURE) {
                        anyhow::bail!("File is JPEG but has .png extension");
                    }
                    anyhow::bail!("Invalid PNG file - corrupted or wrong format");
                }
            }
            "jpg" | "jpeg" => {
                if !bytes.starts_with(JPEG_SIGNATURE) {
                    anyhow::bail!("Invalid JPEG file - corrupted or wrong format");
                }
            }
            "webp" => {
                if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WEBP" {
                    anyhow::bail!("Invalid WebP file - corrupted or wrong format");
                }
            }
            "svg" => {
                let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]).to_lowercase();
                if !head.contains("<svg") {
                    anyhow::bail!("Invalid SVG file - no <svg> element found");
                }
            }
            other => anyhow::bail!("Unsupported image format: {}", other),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_image_bytes() {
        let png = [PNG_SIGNATURE, b"rest"].concat();
        assert!(FsOps::validate_image_bytes("png", &png).is_ok());
        assert!(FsOps::validate_image_bytes("jpg", &png).is_err());

        let jpeg = [JPEG_SIGNATURE, b"\xE0rest"].concat();
        let err = FsOps::validate_image_bytes("png", &jpeg).unwrap_err();
        assert!(err.to_string().contains("JPEG"));

        assert!(FsOps::validate_image_bytes("webp", b"RIFF\0\0\0\0WEBPVP8 ").is_ok());
        assert!(FsOps::validate_image_bytes("svg", b"<?xml version=\"1.0\"?><svg/>").is_ok());
        assert!(FsOps::validate_image_bytes("gif", b"GIF89a").is_err());
        assert!(FsOps::validate_image_bytes("png", b"").is_err());
    }

    #[tokio::test]
    async fn test_write_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b.bin");
        FsOps::write_bytes(&path, b"data").await.unwrap();
        assert!(path.exists());
        assert!(FsOps::remove_file(&path).await.unwrap());
        assert!(!FsOps::remove_file(&path).await.unwrap());
    }

    #[test]
    fn test_get_extension() {
        assert_eq!(FsOps::get_extension(Path::new("logo.PNG")), Some("png".to_string()));
        assert_eq!(FsOps::get_extension(Path::new("logo")), None);
    }
}

//! 附件存储
//!
//! 附件字节保存在 `UPLOAD_DIR` 下，文件名为 `{uuid}.{ext}`，
//! 数据库只记录文件名、原始名、类型、大小和 SHA256。

pub mod file_type;

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::utils::{AppError, AppResult, ErrorCode};

pub use file_type::{SUPPORTED_FORMATS, UploadKind, validate_upload};

/// SHA256 hex digest
pub fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// 附件文件存储
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// 写入文件，返回生成的文件名
    pub async fn save(&self, data: &[u8], extension: &str) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::with_message(
                ErrorCode::FileStorageFailed,
                format!("Failed to create upload dir: {}", e),
            )
        })?;

        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        tokio::fs::write(self.path_of(&filename), data)
            .await
            .map_err(|e| {
                AppError::with_message(
                    ErrorCode::FileStorageFailed,
                    format!("Failed to write attachment: {}", e),
                )
            })?;
        Ok(filename)
    }

    /// 删除文件 (尽力而为，失败只记录日志)
    pub async fn remove(&self, filename: &str) {
        if let Err(e) = tokio::fs::remove_file(self.path_of(filename)).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(filename = %filename, "Failed to remove attachment file: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_hash() {
        assert_eq!(
            calculate_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path().join("uploads"));

        let filename = store.save(b"%PDF-1.4", "pdf").await.unwrap();
        assert!(filename.ends_with(".pdf"));
        let path = store.path_of(&filename);
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");

        store.remove(&filename).await;
        assert!(!path.exists());
        // 再次删除不报错
        store.remove(&filename).await;
    }
}

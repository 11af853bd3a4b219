use std::io::{ErrorKind, SeekFrom};
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Mutex;

use super::RangeReader;
use crate::error::IoError;

/// Local-file implementation of RangeReader.
///
/// Owns the open file handle; the file is closed when the reader is dropped.
/// The file size is captured once at open time.
pub struct LocalFileReader {
    file: Mutex<File>,
    size: u64,
    identifier: String,
}

impl LocalFileReader {
    /// Open a file for range reads.
    ///
    /// A path that does not exist maps to `IoError::NotFound`. Directories,
    /// other non-regular files and permission failures map to
    /// `IoError::Unreadable`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let identifier = path.display().to_string();

        let file = File::open(path)
            .await
            .map_err(|e| map_open_error(&identifier, e))?;
        let metadata = file
            .metadata()
            .await
            .map_err(|e| map_open_error(&identifier, e))?;

        if !metadata.is_file() {
            return Err(IoError::Unreadable {
                path: identifier,
                reason: "not a regular file".to_string(),
            });
        }

        Ok(Self {
            file: Mutex::new(file),
            size: metadata.len(),
            identifier,
        })
    }
}

fn map_open_error(path: &str, err: std::io::Error) -> IoError {
    match err.kind() {
        ErrorKind::NotFound => IoError::NotFound(path.to_string()),
        ErrorKind::PermissionDenied => IoError::Unreadable {
            path: path.to_string(),
            reason: err.to_string(),
        },
        _ => IoError::Read {
            path: path.to_string(),
            message: err.to_string(),
        },
    }
}

#[async_trait]
impl RangeReader for LocalFileReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        if offset.saturating_add(len as u64) > self.size {
            return Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                size: self.size,
            });
        }

        if len == 0 {
            return Ok(Bytes::new());
        }

        let read_error = |e: std::io::Error| IoError::Read {
            path: self.identifier.clone(),
            message: e.to_string(),
        };

        let mut file = self.file.lock().await;
        file.seek(SeekFrom::Start(offset)).await.map_err(read_error)?;

        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf).await.map_err(read_error)?;

        Ok(Bytes::from(buf))
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

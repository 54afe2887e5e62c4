//! Default file resolver: tenant storage for uploaded and tool files,
//! HTTP download for remote URLs.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::FileFetchError;
use crate::traits::{FileResolver, FileStorage};
use crate::types::{File, FileTransferMethod};

/// Resolves file bytes according to the file's transfer method.
///
/// - `local_file` / `tool_file`: loaded from storage by `storage_key`.
/// - `remote_url`: downloaded with a plain GET.
pub struct StorageFileResolver {
    storage: Arc<dyn FileStorage>,
    http_client: reqwest::Client,
}

impl StorageFileResolver {
    pub fn new(storage: Arc<dyn FileStorage>, http_client: reqwest::Client) -> Self {
        Self {
            storage,
            http_client,
        }
    }

    async fn download(&self, url: &str) -> Result<Bytes, FileFetchError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FileFetchError::Download {
                message: format!("GET {url} failed: {e}"),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FileFetchError::Status {
                status: status.as_u16(),
            });
        }
        response.bytes().await.map_err(|e| FileFetchError::Download {
            message: format!("failed to read body from {url}: {e}"),
        })
    }
}

#[async_trait]
impl FileResolver for StorageFileResolver {
    async fn fetch(&self, file: &File) -> Result<Bytes, FileFetchError> {
        match file.transfer_method() {
            FileTransferMethod::LocalFile | FileTransferMethod::ToolFile => {
                if file.storage_key().is_empty() {
                    return Err(FileFetchError::MissingSource {
                        field: "storage_key",
                    });
                }
                Ok(self.storage.load(file.storage_key()).await?)
            }
            FileTransferMethod::RemoteUrl => {
                let url = file
                    .remote_url()
                    .filter(|u| !u.is_empty())
                    .ok_or(FileFetchError::MissingSource {
                        field: "remote_url",
                    })?;
                self.download(url).await
            }
        }
    }
}

//! File references: immutable descriptors of a file, never its bytes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// MIME type assumed when a file does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Broad category of a file, as classified at upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FileType {
    Image,
    Document,
    Audio,
    Video,
    Custom,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Custom => "custom",
        }
    }
}

/// How the file reached the workflow, which decides where its bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FileTransferMethod {
    /// Uploaded and kept in tenant storage under `storage_key`.
    LocalFile,
    /// Referenced by URL; fetched on demand.
    RemoteUrl,
    /// Produced by a tool and kept in tenant storage under `storage_key`.
    ToolFile,
}

impl FileTransferMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalFile => "local_file",
            Self::RemoteUrl => "remote_url",
            Self::ToolFile => "tool_file",
        }
    }
}

/// Metadata for a file flowing through a workflow.
///
/// Fields are private and there are no setters: once built, a `File` never
/// changes. Use [`File::builder`] to construct one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct File {
    tenant_id: String,
    #[serde(rename = "type")]
    file_type: FileType,
    transfer_method: FileTransferMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    related_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remote_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(default)]
    storage_key: String,
}

impl File {
    /// Start building a file reference.
    pub fn builder(
        tenant_id: impl Into<String>,
        file_type: FileType,
        transfer_method: FileTransferMethod,
    ) -> FileBuilder {
        FileBuilder {
            file: File {
                tenant_id: tenant_id.into(),
                file_type,
                transfer_method,
                related_id: None,
                remote_url: None,
                filename: None,
                extension: None,
                mime_type: None,
                size: None,
                storage_key: String::new(),
            },
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn transfer_method(&self) -> FileTransferMethod {
        self.transfer_method
    }

    pub fn related_id(&self) -> Option<&str> {
        self.related_id.as_deref()
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url.as_deref()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// The declared MIME type, or `application/octet-stream`.
    pub fn mime_type_or_default(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE)
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Look up a single attribute by name, as addressed by a selector like
    /// `["node", "file", "mime_type"]`. Returns `None` for unknown names.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        let value = match name {
            "name" | "filename" => json!(self.filename),
            "extension" => json!(self.extension),
            "mime_type" => json!(self.mime_type),
            "size" => json!(self.size),
            "type" => json!(self.file_type.as_str()),
            "transfer_method" => json!(self.transfer_method.as_str()),
            "url" | "remote_url" => json!(self.remote_url),
            "related_id" => json!(self.related_id),
            _ => return None,
        };
        Some(value)
    }

    /// Human-readable form used when a file is interpolated into text.
    pub fn display_text(&self) -> String {
        self.remote_url
            .clone()
            .or_else(|| self.filename.clone())
            .unwrap_or_default()
    }
}

/// Fluent builder for [`File`].
#[derive(Debug, Clone)]
pub struct FileBuilder {
    file: File,
}

impl FileBuilder {
    pub fn related_id(mut self, id: impl Into<String>) -> Self {
        self.file.related_id = Some(id.into());
        self
    }

    pub fn remote_url(mut self, url: impl Into<String>) -> Self {
        self.file.remote_url = Some(url.into());
        self
    }

    /// Sets the filename, and the extension when the name carries one.
    pub fn filename(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if self.file.extension.is_none() {
            self.file.extension = name
                .rsplit_once('.')
                .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
                .map(|(_, ext)| format!(".{ext}"));
        }
        self.file.filename = Some(name);
        self
    }

    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.file.extension = Some(ext.into());
        self
    }

    pub fn mime_type(mut self, mime: impl Into<String>) -> Self {
        self.file.mime_type = Some(mime.into());
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.file.size = Some(size);
        self
    }

    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.file.storage_key = key.into();
        self
    }

    pub fn build(self) -> File {
        self.file
    }
}

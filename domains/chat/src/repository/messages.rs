//! Message store: append-only chat log persisted as one JSON document
//!
//! The whole log is rewritten on every append. Writers are serialized by a
//! single async mutex and each rewrite goes to a sibling temp file that is
//! renamed over the log, so readers only ever see complete documents.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::entities::{Message, MessageRole};
use parley_common::{Error, Result};

/// On-disk layout: `{"messages": [...]}`
#[derive(Debug, Default, Serialize, Deserialize)]
struct LogDocument {
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct LogDocumentRef<'a> {
    messages: &'a [Message],
}

enum LoadError {
    Missing,
    Malformed(serde_json::Error),
    Io(std::io::Error),
}

impl From<LoadError> for Error {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Missing => Error::Persistence("message log file is missing".to_string()),
            LoadError::Malformed(e) => Error::Persistence(format!("message log is malformed: {}", e)),
            LoadError::Io(e) => Error::Persistence(format!("message log is unreadable: {}", e)),
        }
    }
}

async fn load(path: &Path) -> std::result::Result<LogDocument, LoadError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(LoadError::Missing),
        Err(e) => return Err(LoadError::Io(e)),
    };
    serde_json::from_slice(&bytes).map_err(LoadError::Malformed)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "messages.json".into());
    name.push(suffix);
    path.with_file_name(name)
}

async fn persist(path: &Path, messages: &[Message]) -> Result<()> {
    let body = serde_json::to_vec_pretty(&LogDocumentRef { messages })?;
    let tmp = sibling(path, ".tmp");

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&body).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Append-only message log backed by a JSON file
#[derive(Debug)]
pub struct MessageStore {
    path: PathBuf,
    messages: Mutex<Vec<Message>>,
}

impl MessageStore {
    /// Open the log at `path`, creating an empty one when the file is absent
    /// or malformed. A malformed file is kept aside with a `.corrupt-*` suffix.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let messages = match load(&path).await {
            Ok(doc) => {
                tracing::info!(path = %path.display(), count = doc.messages.len(), "Loaded message log");
                // Rewrite so legacy role names are normalized on disk
                persist(&path, &doc.messages).await?;
                doc.messages
            }
            Err(LoadError::Missing) => {
                tracing::info!(path = %path.display(), "Message log not found, creating empty log");
                persist(&path, &[]).await?;
                Vec::new()
            }
            Err(LoadError::Malformed(e)) => {
                let backup = sibling(&path, &format!(".corrupt-{}", Utc::now().timestamp()));
                tracing::warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "Message log is malformed, resetting to empty log"
                );
                tokio::fs::rename(&path, &backup).await?;
                persist(&path, &[]).await?;
                Vec::new()
            }
            Err(err @ LoadError::Io(_)) => return Err(err.into()),
        };

        Ok(Self {
            path,
            messages: Mutex::new(messages),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a new message and persist the log before returning it
    pub async fn append(&self, role: MessageRole, text: String) -> Result<Message> {
        let mut messages = self.messages.lock().await;

        let message = Message::new(role, text);
        messages.push(message.clone());

        if let Err(err) = persist(&self.path, &messages).await {
            tracing::error!(path = %self.path.display(), error = %err, "Failed to persist message log");

            // Durable copy is authoritative after a failed write
            match load(&self.path).await {
                Ok(doc) => {
                    let durable = doc.messages.iter().any(|m| m.id == message.id);
                    *messages = doc.messages;
                    if durable {
                        return Ok(message);
                    }
                }
                Err(_) => {
                    messages.pop();
                }
            }
            return Err(err);
        }

        tracing::debug!(id = %message.id, role = %message.role, "Appended message");
        Ok(message)
    }

    /// Read the full log from durable storage, in insertion order
    pub async fn read_all(&self) -> Result<Vec<Message>> {
        let mut messages = self.messages.lock().await;
        let doc = load(&self.path).await?;
        *messages = doc.messages;
        Ok(messages.clone())
    }

    /// Number of committed messages
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

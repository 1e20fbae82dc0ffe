//! Delivery: the one "hand a named byte payload to the user" capability.
//!
//! Serializers never touch the file system. The coordinator passes a finished payload to a
//! `Delivery`. The default, `ResponseDelivery`, keeps nothing: the payload only travels back in
//! the HTTP response. `FsDelivery` is opt-in (`EXPORT_DIR`) and writes each export to
//! `<dir>/<export_id>/<filename>` through a temp file, so a failed or abandoned export never
//! leaves a partial file behind, and drops export directories older than its retention period.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::ExportPayload;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not move export into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("delivery task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<DeliveryError> for AppError {
    fn from(e: DeliveryError) -> Self {
        AppError::ExportFailed(e.to_string())
    }
}

/// Where and when a payload was delivered. `location` is `None` when nothing was stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivered {
    pub export_id: Uuid,
    pub filename: String,
    pub location: Option<PathBuf>,
    pub bytes: usize,
    pub delivered_at: DateTime<Utc>,
}

#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, payload: &ExportPayload) -> Result<Delivered, DeliveryError>;
}

// ────────────────────────────────────────────────────────────────────────────
// ResponseDelivery (default)
// ────────────────────────────────────────────────────────────────────────────

/// Hands the payload back to the caller only. Nothing is written anywhere.
pub struct ResponseDelivery;

#[async_trait]
impl Delivery for ResponseDelivery {
    async fn deliver(&self, payload: &ExportPayload) -> Result<Delivered, DeliveryError> {
        let export_id = Uuid::new_v4();
        debug!(%export_id, filename = %payload.filename, "Export returned in response only");
        Ok(Delivered {
            export_id,
            filename: payload.filename.clone(),
            location: None,
            bytes: payload.bytes.len(),
            delivered_at: Utc::now(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FsDelivery (opt-in)
// ────────────────────────────────────────────────────────────────────────────

/// Saves each export under its own id-named directory and prunes expired ones.
pub struct FsDelivery {
    dir: PathBuf,
    retention: Duration,
}

impl FsDelivery {
    pub fn new(dir: impl Into<PathBuf>, retention: Duration) -> Self {
        Self {
            dir: dir.into(),
            retention,
        }
    }
}

#[async_trait]
impl Delivery for FsDelivery {
    async fn deliver(&self, payload: &ExportPayload) -> Result<Delivered, DeliveryError> {
        let root = self.dir.clone();
        let retention = self.retention;
        let filename = payload.filename.clone();
        let bytes = payload.bytes.clone();

        let export_id = Uuid::new_v4();
        let location = tokio::task::spawn_blocking(move || -> Result<PathBuf, DeliveryError> {
            std::fs::create_dir_all(&root)?;
            match prune_expired(&root, retention) {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Pruned expired exports"),
                Err(e) => warn!("Could not prune expired exports: {e}"),
            }

            let dir = root.join(export_id.to_string());
            std::fs::create_dir(&dir)?;
            let target = dir.join(&filename);
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target)?;
            Ok(target)
        })
        .await??;

        info!(
            %export_id,
            filename = %payload.filename,
            bytes = payload.bytes.len(),
            path = %location.display(),
            "Export delivered"
        );

        Ok(Delivered {
            export_id,
            filename: payload.filename.clone(),
            location: Some(location),
            bytes: payload.bytes.len(),
            delivered_at: Utc::now(),
        })
    }
}

/// Removes export directories (named by export id) last modified `retention` ago or earlier.
/// Anything else in `root` is left alone.
fn prune_expired(root: &Path, retention: Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let is_export = entry
            .file_name()
            .to_str()
            .is_some_and(|name| Uuid::parse_str(name).is_ok());
        let meta = entry.metadata()?;
        if !is_export || !meta.is_dir() {
            continue;
        }
        let age = now
            .duration_since(meta.modified()?)
            .unwrap_or(Duration::ZERO);
        if age >= retention {
            std::fs::remove_dir_all(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

//! JSON file adapter
//!
//! Stores the billing snapshot as a single pretty-printed JSON document.
//! Saves write a sibling `*.tmp` file and rename it over the target, so a
//! crash mid-write leaves the previous document intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, instrument, warn};

use billing_store::{BillingSnapshot, SnapshotPort};
use core_kernel::{DomainPort, PortError};

use crate::error::StoreError;

/// Snapshot port backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "billing".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Reads the snapshot; a missing or blank file holds nothing
    pub async fn read(&self) -> Result<Option<BillingSnapshot>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No snapshot file yet");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            warn!(path = %self.path.display(), "Snapshot file is empty");
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::malformed(&self.path, e))
    }

    /// Writes the snapshot through a temp file and an atomic rename
    pub async fn write(&self, snapshot: &BillingSnapshot) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(snapshot).map_err(StoreError::Encode)?;
        bytes.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let temp = self.temp_path();
        fs::write(&temp, &bytes)
            .await
            .map_err(|e| StoreError::io(&temp, e))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }
}

impl DomainPort for JsonFileStore {}

#[async_trait]
impl SnapshotPort for JsonFileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<BillingSnapshot>, PortError> {
        Ok(self.read().await?)
    }

    #[instrument(skip(self, snapshot), fields(path = %self.path.display(), invoices = snapshot.invoices.len()))]
    async fn save(&self, snapshot: &BillingSnapshot) -> Result<(), PortError> {
        self.write(snapshot).await?;
        debug!("Snapshot written");
        Ok(())
    }
}

//! Release archive installation
//!
//! Layout under the components directory:
//!
//! ```text
//! custom_components/{id}/        destination, fully replaced
//! custom_components/_tmp_{id}/   scratch extraction directory
//! ```
//!
//! The scratch directory is removed after every attempt. There is no
//! rollback: if copying fails after the old destination was removed, the
//! component is left uninstalled.

use crate::error::InstallError;
use bytes::Bytes;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, error, info};
use walkdir::WalkDir;

/// Prefix of scratch extraction directories
pub const TEMP_DIR_PREFIX: &str = "_tmp_";

/// Installs components into a `custom_components` directory
#[derive(Debug, Clone)]
pub struct ComponentInstaller {
    components_dir: Utf8PathBuf,
}

impl ComponentInstaller {
    pub fn new(components_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            components_dir: components_dir.into(),
        }
    }

    pub fn components_dir(&self) -> &Utf8Path {
        &self.components_dir
    }

    /// Final install location of a component
    pub fn destination(&self, component_id: &str) -> Utf8PathBuf {
        self.components_dir.join(component_id)
    }

    /// Scratch extraction directory of a component
    pub fn temp_dir(&self, component_id: &str) -> Utf8PathBuf {
        self.components_dir
            .join(format!("{}{}", TEMP_DIR_PREFIX, component_id))
    }

    /// Install an archive on the blocking thread pool
    ///
    /// Installs of the same component must not overlap; callers serialize them.
    pub async fn install(&self, archive: Bytes, component_id: &str) -> Result<(), InstallError> {
        let installer = self.clone();
        let id = component_id.to_string();

        tokio::task::spawn_blocking(move || installer.install_blocking(&archive, &id))
            .await
            .map_err(|e| InstallError::Worker {
                component: component_id.to_string(),
                reason: e.to_string(),
            })?
    }

    /// Install an archive, blocking the current thread
    pub fn install_blocking(&self, archive: &[u8], component_id: &str) -> Result<(), InstallError> {
        validate_component_id(component_id)?;

        let temp_dir = self.temp_dir(component_id);
        let destination = self.destination(component_id);

        let result = self.extract_and_replace(archive, component_id, &temp_dir, &destination);

        if temp_dir.exists() {
            if let Err(e) = fs::remove_dir_all(&temp_dir) {
                error!("Failed to remove temporary directory {}: {}", temp_dir, e);
            }
        }

        match &result {
            Ok(()) => info!("Installed {} into {}", component_id, destination),
            Err(e) => error!("{}", e),
        }

        result
    }

    fn extract_and_replace(
        &self,
        archive: &[u8],
        component_id: &str,
        temp_dir: &Utf8Path,
        destination: &Utf8Path,
    ) -> Result<(), InstallError> {
        let fail = |reason: String| InstallError::extraction(component_id, reason);

        let mut zip = zip::ZipArchive::new(Cursor::new(archive))
            .map_err(|e| fail(format!("invalid archive: {}", e)))?;

        if zip.is_empty() {
            return Err(fail("empty archive".to_string()));
        }

        let top_level = {
            let first = zip
                .by_index(0)
                .map_err(|e| fail(format!("invalid archive: {}", e)))?;
            first
                .name()
                .split('/')
                .find(|part| !part.is_empty())
                .map(str::to_string)
                .ok_or_else(|| fail("first archive entry has no name".to_string()))?
        };

        if temp_dir.exists() {
            debug!("Removing stale temporary directory {}", temp_dir);
            fs::remove_dir_all(temp_dir)
                .map_err(|e| fail(format!("cannot remove {}: {}", temp_dir, e)))?;
        }

        fs::create_dir_all(temp_dir)
            .map_err(|e| fail(format!("cannot create {}: {}", temp_dir, e)))?;

        zip.extract(temp_dir)
            .map_err(|e| fail(format!("extraction failed: {}", e)))?;

        let source = temp_dir.join(&top_level);
        if !source.is_dir() {
            return Err(fail(format!(
                "archive has no top-level directory '{}'",
                top_level
            )));
        }

        if destination.exists() {
            fs::remove_dir_all(destination)
                .map_err(|e| fail(format!("cannot remove {}: {}", destination, e)))?;
        }

        copy_tree(source.as_std_path(), destination.as_std_path())
            .map_err(|e| fail(format!("copy into {} failed: {}", destination, e)))
    }
}

/// Reject ids that would escape the components directory or collide with scratch space
pub(crate) fn validate_component_id(id: &str) -> Result<(), InstallError> {
    let reason = if id.is_empty() {
        Some("must not be empty")
    } else if id == "." || id == ".." {
        Some("must not be a relative path")
    } else if id.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if id.starts_with(TEMP_DIR_PREFIX) {
        Some("uses the reserved _tmp_ prefix")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(InstallError::invalid_component_id(id, reason)),
        None => Ok(()),
    }
}

fn copy_tree(source: &Path, destination: &Path) -> std::io::Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(std::io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(std::io::Error::other)?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        } else {
            debug!("Skipping {}: not a regular file", entry.path().display());
        }
    }

    Ok(())
}

//! Host-facing operations of one repository entry
//!
//! Each operation runs its pipeline sequentially (index, catalog, archive,
//! extraction, manifest check) and converts every internal failure into a
//! [`ServiceError`].

use crate::error::{InstallError, ResolutionError, ServiceError};
use crate::installer::ComponentInstaller;
use crate::manifest::ManifestReader;
use crate::outcome::{InstallOutcomeRecord, IssueReporter, OutcomeTracker};
use crate::recovery::InstallRetry;
use crate::registry::ManagerRegistry;
use async_trait::async_trait;
use camino::Utf8PathBuf;
use custodian_core::config::{reconcile, NetworkConfig, Reconciliation};
use custodian_core::{
    latest_version, parse_version, supported_versions, ComponentDescription, InstalledManifest,
    ManagerConfig, RepositoryDescription, RepositoryEntryConfig, SchemaValidator, VersionEntry,
};
use custodian_repository::RepositoryClient;
use semver::Version;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Whether an install registers an issue with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueMode {
    Raise,
    /// Used by recovery retries, which already have an issue
    Suppress,
}

/// Update state of an installed component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateStatus {
    pub component_id: String,
    pub component_name: String,
    /// `None` when the manifest has no readable version
    pub installed_version: Option<Version>,
    /// Newest version installable on this host
    pub latest_version: Option<Version>,
    pub update_available: bool,
}

/// Operations of one configured repository
pub struct ComponentManager {
    entry: RepositoryEntryConfig,
    /// Fixed at creation; survives base URL changes
    entry_id: String,
    host_version: Version,
    network: NetworkConfig,
    validator: Arc<SchemaValidator>,
    client: RepositoryClient,
    installer: ComponentInstaller,
    tracker: OutcomeTracker,
    registry: ManagerRegistry,
}

impl ComponentManager {
    pub fn new(
        entry: RepositoryEntryConfig,
        host_version: Version,
        network: NetworkConfig,
        components_dir: impl Into<Utf8PathBuf>,
        registry: ManagerRegistry,
        reporter: Arc<dyn IssueReporter>,
    ) -> Result<Self, ServiceError> {
        let validator =
            Arc::new(SchemaValidator::new().map_err(|e| ServiceError::internal("schema", &e))?);
        let client = build_client(&entry, &network, validator.clone())?;

        let components_dir = components_dir.into();
        let tracker = OutcomeTracker::new(ManifestReader::new(components_dir.clone()), reporter);

        Ok(Self {
            entry_id: entry.entry_id(),
            entry,
            host_version,
            network,
            validator,
            client,
            installer: ComponentInstaller::new(components_dir),
            tracker,
            registry,
        })
    }

    /// Manager for a configured entry; `entry_id` may be omitted when only one exists
    pub fn from_config(
        config: &ManagerConfig,
        entry_id: Option<&str>,
        registry: ManagerRegistry,
        reporter: Arc<dyn IssueReporter>,
    ) -> Result<Self, ServiceError> {
        let entry = config
            .entry(entry_id)
            .map_err(|e| ServiceError::internal("config", &e))?;
        let host_version = config
            .host_version()
            .map_err(|e| ServiceError::internal("config", &e))?;

        Self::new(
            entry.clone(),
            host_version,
            config.network.clone(),
            config.components_dir(),
            registry,
            reporter,
        )
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn entry(&self) -> &RepositoryEntryConfig {
        &self.entry
    }

    pub fn host_version(&self) -> &Version {
        &self.host_version
    }

    pub fn registry(&self) -> &ManagerRegistry {
        &self.registry
    }

    /// Fetch the index and attach this entry to the registry
    pub async fn attach(&self) -> Result<RepositoryDescription, ServiceError> {
        let repository = self.fetch_repository().await?;
        self.registry
            .attach_entry(&self.entry_id, repository.component_ids())
            .await
            .map_err(|e| ServiceError::internal("registry", &e))?;

        info!(
            "Attached repository {} ({} components)",
            repository.name,
            repository.customs.len()
        );
        Ok(repository)
    }

    /// Detach this entry; true when it was the last one
    pub async fn detach(&self) -> bool {
        self.registry.detach_entry(&self.entry_id).await
    }

    /// Apply new options to this entry
    ///
    /// Returns the components whose versions must be resolved again. A new
    /// base URL must serve a valid index; otherwise nothing changes.
    pub async fn reconfigure(
        &mut self,
        new_entry: RepositoryEntryConfig,
    ) -> Result<Reconciliation, ServiceError> {
        let known = self
            .registry
            .components(&self.entry_id)
            .await
            .unwrap_or_default();
        let reconciliation = reconcile(&self.entry, &new_entry, &known);

        if self.entry.normalized_base_url() != new_entry.normalized_base_url() {
            let client = build_client(&new_entry, &self.network, self.validator.clone())?;
            let repository = client.fetch_repository().await.map_err(|e| {
                warn!(
                    "Keeping {} on {}: new repository unavailable",
                    self.entry_id,
                    self.entry.normalized_base_url()
                );
                ServiceError::internal(error_kind(&e), &e)
            })?;

            self.registry
                .update_components(&self.entry_id, repository.component_ids())
                .await;
            self.client = client;
        }

        debug!(
            "Reconfigured {}: {} affected, reschedule={}",
            self.entry_id,
            reconciliation.affected.len(),
            reconciliation.reschedule
        );
        self.entry = new_entry;
        Ok(reconciliation)
    }

    /// Components of the repository with their descriptions
    pub async fn list_components(&self) -> Result<BTreeMap<String, String>, ServiceError> {
        Ok(self.fetch_repository().await?.customs)
    }

    /// Versions of a listed component installable on this host
    pub async fn supported_versions(
        &self,
        component_id: &str,
        allow_unstable: bool,
    ) -> Result<Vec<Version>, ServiceError> {
        let component = self.fetch_listed_component(component_id).await?;
        Ok(supported_versions(&component, &self.host_version, allow_unstable)
            .into_iter()
            .collect())
    }

    /// Download and install a component, then record the outcome
    ///
    /// Without `version` the newest supported version is installed.
    /// Archive and filesystem failures do not fail the call: they produce a
    /// `Failed` outcome, which the recovery flow can retry.
    pub async fn install_component(
        &self,
        component_id: &str,
        version: Option<&str>,
        mode: IssueMode,
    ) -> Result<InstallOutcomeRecord, ServiceError> {
        let component = self.fetch_listed_component(component_id).await?;

        let (target, version_entry) = select_install_target(
            component_id,
            &component,
            &self.host_version,
            version,
            self.entry.show_unstable,
        )
        .map_err(|e| ServiceError::internal("resolution", &e))?;

        info!("Installing {}@{}", component_id, target);

        let lock = self.registry.install_lock(component_id).await;
        let _guard = lock.lock().await;

        let archive = self
            .client
            .download_archive(&version_entry.release_file)
            .await
            .map_err(|e| ServiceError::internal("remote_request", &e))?;

        match self.installer.install(archive, component_id).await {
            Ok(()) => {}
            Err(e @ InstallError::InvalidComponentId { .. }) => {
                return Err(ServiceError::internal("install", &e));
            }
            Err(e) => warn!("Install of {}@{} incomplete: {}", component_id, target, e),
        }

        let record = self
            .tracker
            .track(
                component_id,
                &component.name,
                &target,
                &self.entry_id,
                &version_entry,
                mode == IssueMode::Raise,
            )
            .await;

        self.registry.record_outcome(record.clone()).await;
        Ok(record)
    }

    /// Update status of an installed component, `None` when not installed
    pub async fn check_update(
        &self,
        component_id: &str,
    ) -> Result<Option<UpdateStatus>, ServiceError> {
        let Some(manifest) = self.tracker.manifests().read(component_id).await else {
            return Ok(None);
        };

        let component = self.fetch_listed_component(component_id).await?;
        let installed_version = manifest.version.as_deref().and_then(|v| parse_version(v).ok());
        let latest = latest_version(&component, &self.host_version, self.entry.show_unstable);

        let update_available = match (&installed_version, &latest) {
            (Some(installed), Some(latest)) => latest > installed,
            (None, Some(_)) => true,
            _ => false,
        };

        Ok(Some(UpdateStatus {
            component_id: component_id.to_string(),
            component_name: manifest.name.unwrap_or(component.name),
            installed_version,
            latest_version: latest,
            update_available,
        }))
    }

    /// Release notes of a component, `None` when they cannot be fetched
    pub async fn release_notes(&self, component_id: &str) -> Option<String> {
        let component = self.client.fetch_component(component_id).await.ok();

        match self
            .client
            .fetch_changelog(component_id, component.as_ref())
            .await
        {
            Ok(notes) => Some(notes),
            Err(e) => {
                warn!("No release notes for {}: {}", component_id, e);
                None
            }
        }
    }

    /// Repository components that are installed locally
    pub async fn installed_components(
        &self,
    ) -> Result<Vec<(String, InstalledManifest)>, ServiceError> {
        let repository = self.fetch_repository().await?;
        let mut installed = Vec::new();

        for component_id in repository.component_ids() {
            if let Some(manifest) = self.tracker.manifests().read(&component_id).await {
                installed.push((component_id, manifest));
            }
        }

        Ok(installed)
    }

    async fn fetch_repository(&self) -> Result<RepositoryDescription, ServiceError> {
        self.client
            .fetch_repository()
            .await
            .map_err(|e| ServiceError::internal(error_kind(&e), &e))
    }

    /// Fetch a component's catalog after checking the index lists it
    async fn fetch_listed_component(
        &self,
        component_id: &str,
    ) -> Result<ComponentDescription, ServiceError> {
        let repository = self.fetch_repository().await?;
        if !repository.has_component(component_id) {
            let err = ResolutionError::UnknownComponent {
                component: component_id.to_string(),
            };
            return Err(ServiceError::internal("resolution", &err));
        }

        self.client
            .fetch_component(component_id)
            .await
            .map_err(|e| ServiceError::internal(error_kind(&e), &e))
    }
}

#[async_trait]
impl InstallRetry for ComponentManager {
    async fn reinstall(
        &self,
        record: &InstallOutcomeRecord,
    ) -> Result<InstallOutcomeRecord, ServiceError> {
        self.install_component(
            &record.component_id,
            Some(record.desired_tag()),
            IssueMode::Suppress,
        )
        .await
    }
}

/// Pick the version to install
///
/// An explicit version must be host compatible; pre-releases are accepted
/// when asked for by name. Otherwise the newest supported version wins,
/// with pre-releases only when `show_unstable` is set.
pub fn select_install_target(
    component_id: &str,
    component: &ComponentDescription,
    host_version: &Version,
    explicit: Option<&str>,
    show_unstable: bool,
) -> Result<(Version, VersionEntry), ResolutionError> {
    let target = match explicit {
        Some(raw) => {
            let not_supported = || ResolutionError::VersionNotSupported {
                component: component_id.to_string(),
                version: raw.to_string(),
                host_version: host_version.clone(),
            };
            let version = parse_version(raw).map_err(|_| not_supported())?;
            if !supported_versions(component, host_version, true).contains(&version) {
                return Err(not_supported());
            }
            version
        }
        None => latest_version(component, host_version, show_unstable).ok_or_else(|| {
            ResolutionError::NoInstallableVersion {
                component: component_id.to_string(),
                host_version: host_version.clone(),
            }
        })?,
    };

    // Every supported version comes from the catalog
    let entry = component
        .entry(&target)
        .cloned()
        .ok_or_else(|| ResolutionError::NoInstallableVersion {
            component: component_id.to_string(),
            host_version: host_version.clone(),
        })?;

    Ok((target, entry))
}

fn build_client(
    entry: &RepositoryEntryConfig,
    network: &NetworkConfig,
    validator: Arc<SchemaValidator>,
) -> Result<RepositoryClient, ServiceError> {
    let base_url = entry
        .base_url()
        .map_err(|e| ServiceError::internal("config", &e))?;
    RepositoryClient::new(&base_url, network, validator)
        .map_err(|e| ServiceError::internal("remote_request", &e))
}

fn error_kind(err: &custodian_repository::RepositoryError) -> &'static str {
    match err.kind() {
        custodian_repository::ErrorKind::RemoteRequest => "remote_request",
        custodian_repository::ErrorKind::InvalidData => "invalid_data",
    }
}

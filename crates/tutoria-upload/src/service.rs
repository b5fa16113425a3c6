//! Upload orchestration service.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tutoria_core::models::{
    FileInfo, FileOutcome, SignedOperation, UploadFailure, UploadOptions, UploadRequest,
    UploadResult,
};
use tutoria_core::{FileCategory, ProviderKind, UploadConfig};
use tutoria_storage::factory::create_provider;
use tutoria_storage::{keys, StorageError, StorageProvider};

use crate::error::UploadError;
use crate::pipeline::{self, ResolvedOptions};

/// Upload orchestrator
///
/// Holds the registry of named storage providers and the process-wide
/// configuration, both immutable after construction. A single instance is
/// shared across concurrent requests; every operation is request-scoped.
pub struct UploadService {
    providers: HashMap<ProviderKind, Arc<dyn StorageProvider>>,
    default_provider: ProviderKind,
    config: Arc<UploadConfig>,
}

impl UploadService {
    /// Build a service from explicit parts.
    ///
    /// The registry must contain `default_provider`; [`from_config`] is the
    /// usual constructor and enforces this.
    ///
    /// [`from_config`]: UploadService::from_config
    pub fn new(
        providers: HashMap<ProviderKind, Arc<dyn StorageProvider>>,
        default_provider: ProviderKind,
        config: Arc<UploadConfig>,
    ) -> Self {
        UploadService {
            providers,
            default_provider,
            config,
        }
    }

    /// Build all configured providers from `config`.
    ///
    /// The local provider is always registered; S3 and CDN join the registry
    /// only when their configuration passes validation. If the configured
    /// default is among the unregistered, local becomes the default here,
    /// once at initialization, with a warning. The substitution never
    /// happens per request.
    pub async fn from_config(config: Arc<UploadConfig>) -> Result<Self, UploadError> {
        let mut providers: HashMap<ProviderKind, Arc<dyn StorageProvider>> = HashMap::new();

        let local = create_provider(&config, ProviderKind::Local).await?;
        providers.insert(ProviderKind::Local, local);

        for kind in [ProviderKind::S3, ProviderKind::Cdn] {
            if !config.is_provider_configured(kind) {
                continue;
            }
            match create_provider(&config, kind).await {
                Ok(provider) => {
                    providers.insert(kind, provider);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = %kind,
                        error = %e,
                        "Provider construction failed; not registered"
                    );
                }
            }
        }

        let default_provider = if providers.contains_key(&config.default_provider) {
            config.default_provider
        } else {
            tracing::warn!(
                requested = %config.default_provider,
                "Configured default provider is not available, falling back to local storage"
            );
            ProviderKind::Local
        };

        Ok(UploadService {
            providers,
            default_provider,
            config,
        })
    }

    pub fn default_provider(&self) -> ProviderKind {
        self.default_provider
    }

    pub fn has_provider(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Select a provider: the requested one, or the process-wide default.
    fn provider(
        &self,
        requested: Option<ProviderKind>,
    ) -> Result<&Arc<dyn StorageProvider>, UploadError> {
        let kind = requested.unwrap_or(self.default_provider);
        let provider = self
            .providers
            .get(&kind)
            .ok_or_else(|| UploadError::ProviderNotConfigured(kind.to_string()))?;
        if !provider.validate_config() {
            return Err(UploadError::ProviderNotConfigured(kind.to_string()));
        }
        Ok(provider)
    }

    /// Detect the owning provider from a URL shape.
    ///
    /// Unrecognized shapes resolve to the local provider, an explicit
    /// documented fallback.
    fn detect_provider(&self, identifier: &str) -> Result<&Arc<dyn StorageProvider>, UploadError> {
        for provider in self.providers.values() {
            if provider.matches_url(identifier) {
                return Ok(provider);
            }
        }
        if let Some(local) = self.providers.get(&ProviderKind::Local) {
            return Ok(local);
        }
        self.provider(None)
    }

    fn resolve_options(&self, options: &UploadOptions) -> ResolvedOptions {
        ResolvedOptions {
            upload_type: options
                .upload_type
                .clone()
                .unwrap_or_else(|| self.config.default_upload_type.clone()),
            optimize: options.optimize.unwrap_or(self.config.image.enabled),
            thumbnail: options.thumbnail.unwrap_or(self.config.thumbnail.enabled),
        }
    }

    /// Upload a single file to the selected provider.
    pub async fn upload_single(
        &self,
        request: UploadRequest,
        options: &UploadOptions,
    ) -> Result<UploadResult, UploadError> {
        let provider = self.provider(options.provider)?;
        let resolved = self.resolve_options(options);

        if !options.metadata.is_empty() {
            tracing::debug!(
                filename = %request.original_filename,
                metadata = ?options.metadata,
                "Upload requested with caller metadata"
            );
        }

        pipeline::run_upload(provider.as_ref(), &self.config, request, &resolved).await
    }

    /// Upload a batch of files with per-file failure isolation.
    ///
    /// Fails fast with [`UploadError::TooManyFiles`] before any provider I/O
    /// when the batch exceeds the configured maximum. Results come back in
    /// submission order; one file's failure never aborts its siblings.
    pub async fn upload_multiple(
        &self,
        requests: Vec<UploadRequest>,
        options: &UploadOptions,
    ) -> Result<Vec<FileOutcome>, UploadError> {
        if requests.len() > self.config.max_files_per_batch {
            return Err(UploadError::TooManyFiles {
                count: requests.len(),
                max: self.config.max_files_per_batch,
            });
        }

        let provider = self.provider(options.provider)?;
        let resolved = self.resolve_options(options);

        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            let original_filename = request.original_filename.clone();
            match pipeline::run_upload(provider.as_ref(), &self.config, request, &resolved).await {
                Ok(result) => outcomes.push(FileOutcome::Success(result)),
                Err(e) => outcomes.push(FileOutcome::Failure(UploadFailure {
                    original_filename,
                    field: None,
                    error: e.to_string(),
                })),
            }
        }

        Ok(outcomes)
    }

    /// Upload files grouped by named field, each field checked against its
    /// contract.
    ///
    /// Contract violations (count overflow, disallowed category, unknown
    /// field) become failed sub-results tagged with the field; field groups
    /// are processed independently so one field never blocks another.
    pub async fn upload_named(
        &self,
        fields: BTreeMap<String, Vec<UploadRequest>>,
        options: &UploadOptions,
    ) -> Result<BTreeMap<String, Vec<FileOutcome>>, UploadError> {
        let provider = self.provider(options.provider)?;
        let resolved = self.resolve_options(options);

        let mut results = BTreeMap::new();
        for (field, requests) in fields {
            let outcomes = match self.config.field_contracts.get(&field) {
                None => requests
                    .into_iter()
                    .map(|request| {
                        FileOutcome::Failure(UploadFailure {
                            original_filename: request.original_filename,
                            field: Some(field.clone()),
                            error: format!("Unknown upload field '{}'", field),
                        })
                    })
                    .collect(),
                Some(contract) => {
                    let mut outcomes = Vec::with_capacity(requests.len());
                    for (index, request) in requests.into_iter().enumerate() {
                        let original_filename = request.original_filename.clone();

                        if index >= contract.max_count {
                            let error = UploadError::FieldCountExceeded {
                                field: field.clone(),
                                count: index + 1,
                                max: contract.max_count,
                            };
                            outcomes.push(FileOutcome::Failure(UploadFailure {
                                original_filename,
                                field: Some(field.clone()),
                                error: error.to_string(),
                            }));
                            continue;
                        }

                        let category = FileCategory::classify(&request.content_type);
                        if !contract.allows(category) {
                            outcomes.push(FileOutcome::Failure(UploadFailure {
                                original_filename,
                                field: Some(field.clone()),
                                error: format!(
                                    "{} files are not allowed for field '{}'",
                                    category, field
                                ),
                            }));
                            continue;
                        }

                        match pipeline::run_upload(
                            provider.as_ref(),
                            &self.config,
                            request,
                            &resolved,
                        )
                        .await
                        {
                            Ok(result) => outcomes.push(FileOutcome::Success(result)),
                            Err(e) => outcomes.push(FileOutcome::Failure(UploadFailure {
                                original_filename,
                                field: Some(field.clone()),
                                error: e.to_string(),
                            })),
                        }
                    }
                    outcomes
                }
            };
            results.insert(field, outcomes);
        }

        Ok(results)
    }

    /// Delete a file by native identifier or previously issued URL.
    ///
    /// When no provider is given, the owning provider is detected from the
    /// URL shape. Returns `Ok(true)` when the primary artifact was deleted
    /// and `Ok(false)` when the provider reported it missing, so re-deleting
    /// the same identifier is always safe. The thumbnail sibling predicted
    /// by the naming convention is removed best-effort.
    pub async fn delete_file(
        &self,
        identifier: &str,
        provider_kind: Option<ProviderKind>,
    ) -> Result<bool, UploadError> {
        let provider = match provider_kind {
            Some(kind) => self.provider(Some(kind))?,
            None => self.detect_provider(identifier)?,
        };
        let storage_key = provider.resolve_key(identifier);

        let deleted = match provider.delete_object(&storage_key).await {
            Ok(()) => true,
            Err(StorageError::NotFound(_)) => false,
            Err(e) => return Err(e.into()),
        };

        if !keys::is_thumbnail_key(&storage_key) {
            let thumb_key = keys::thumbnail_key(&storage_key);
            if let Err(e) = provider.delete_object(&thumb_key).await {
                tracing::debug!(error = %e, key = %thumb_key, "Thumbnail cleanup skipped");
            }
        }

        Ok(deleted)
    }

    /// Resolve stored metadata for an identifier or URL.
    pub async fn file_info(
        &self,
        identifier: &str,
        provider_kind: Option<ProviderKind>,
    ) -> Result<FileInfo, UploadError> {
        let provider = match provider_kind {
            Some(kind) => self.provider(Some(kind))?,
            None => self.detect_provider(identifier)?,
        };
        let storage_key = provider.resolve_key(identifier);
        Ok(provider.object_info(&storage_key).await?)
    }

    /// Generate a time-limited access URL for an identifier or URL.
    pub async fn generate_signed_url(
        &self,
        identifier: &str,
        operation: SignedOperation,
        expires_in: Duration,
        provider_kind: Option<ProviderKind>,
    ) -> Result<String, UploadError> {
        let provider = match provider_kind {
            Some(kind) => self.provider(Some(kind))?,
            None => self.detect_provider(identifier)?,
        };
        let storage_key = provider.resolve_key(identifier);
        Ok(provider
            .signed_url(&storage_key, operation, expires_in)
            .await?)
    }

    /// Whether the artifact behind an identifier or URL exists.
    pub async fn file_exists(
        &self,
        identifier: &str,
        provider_kind: Option<ProviderKind>,
    ) -> Result<bool, UploadError> {
        let provider = match provider_kind {
            Some(kind) => self.provider(Some(kind))?,
            None => self.detect_provider(identifier)?,
        };
        let storage_key = provider.resolve_key(identifier);
        Ok(provider.exists(&storage_key).await)
    }
}

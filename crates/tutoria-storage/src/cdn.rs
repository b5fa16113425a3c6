use crate::traits::{StorageError, StorageProvider, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;
use tutoria_core::models::{FileInfo, SignedOperation};
use tutoria_core::{CdnConfig, ProviderKind, ProviderLimits};

type HmacSha256 = Hmac<Sha256>;

/// CDN image service provider
///
/// Talks to the image CDN's HTTP API: multipart uploads, destroys, and asset
/// lookups. Every API request carries an HMAC-SHA256 signature over its
/// parameters, keyed by the account's API secret. Delivery URLs are
/// `{delivery_url}/{zone}/{key}`; signed URLs append an expiring HMAC token.
///
/// Destroy of a missing asset is success for this backend: the API reports
/// "not found" as a result body, not an error.
#[derive(Clone)]
pub struct CdnProvider {
    client: reqwest::Client,
    api_base: String,
    delivery_url: String,
    zone: String,
    api_key: String,
    api_secret: String,
    limits: ProviderLimits,
}

/// Asset record returned by the CDN info endpoint.
#[derive(Debug, serde::Deserialize)]
struct CdnAsset {
    bytes: u64,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

/// Result body of a destroy call.
#[derive(Debug, serde::Deserialize)]
struct CdnDestroyResponse {
    result: String,
}

impl CdnProvider {
    pub fn new(config: &CdnConfig) -> StorageResult<Self> {
        let require = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| StorageError::ConfigError(format!("{} not configured", name)))
        };

        Ok(CdnProvider {
            client: reqwest::Client::new(),
            api_base: require(&config.api_base, "CDN_API_BASE")?
                .trim_end_matches('/')
                .to_string(),
            delivery_url: require(&config.delivery_url, "CDN_DELIVERY_URL")?
                .trim_end_matches('/')
                .to_string(),
            zone: require(&config.zone, "CDN_ZONE")?,
            api_key: require(&config.api_key, "CDN_API_KEY")?,
            api_secret: require(&config.api_secret, "CDN_API_SECRET")?,
            limits: config.limits.clone(),
        })
    }

    /// HMAC-SHA256 signature over `k=v` pairs joined by `&`, keyed by the
    /// API secret.
    fn sign(&self, params: &[(&str, &str)]) -> StorageResult<String> {
        let payload = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| StorageError::ConfigError(format!("Invalid CDN API secret: {}", e)))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1/{}/{}", self.api_base, self.zone, path)
    }
}

#[async_trait]
impl StorageProvider for CdnProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Cdn
    }

    fn limits(&self) -> &ProviderLimits {
        &self.limits
    }

    fn validate_config(&self) -> bool {
        !self.api_base.is_empty()
            && !self.delivery_url.is_empty()
            && !self.zone.is_empty()
            && !self.api_key.is_empty()
            && !self.api_secret.is_empty()
    }

    async fn put_object(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let size = data.len();
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", storage_key), ("timestamp", &timestamp)])?;

        let file_name = storage_key
            .rsplit('/')
            .next()
            .unwrap_or(storage_key)
            .to_string();
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name)
            .mime_str(content_type)
            .map_err(|e| StorageError::UploadFailed(format!("Invalid content type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .text("public_id", storage_key.to_string())
            .text("timestamp", timestamp)
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .part("file", part);

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(self.api_url("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    zone = %self.zone,
                    key = %storage_key,
                    "CDN upload request failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                zone = %self.zone,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "CDN upload rejected"
            );
            return Err(StorageError::UploadFailed(format!(
                "CDN returned {}: {}",
                status, body
            )));
        }

        let url = self.public_url(storage_key);

        tracing::info!(
            zone = %self.zone,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "CDN upload successful"
        );

        Ok(url)
    }

    async fn delete_object(&self, storage_key: &str) -> StorageResult<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", storage_key), ("timestamp", &timestamp)])?;

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(self.api_url("destroy"))
            .json(&serde_json::json!({
                "public_id": storage_key,
                "timestamp": timestamp,
                "api_key": self.api_key,
                "signature": signature,
            }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    zone = %self.zone,
                    key = %storage_key,
                    "CDN destroy request failed"
                );
                StorageError::DeleteFailed(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(StorageError::DeleteFailed(format!(
                "CDN returned {}",
                status
            )));
        }

        let body: CdnDestroyResponse = response
            .json()
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

        // "not_found" is success here: the asset is gone either way.
        tracing::info!(
            zone = %self.zone,
            key = %storage_key,
            result = %body.result,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "CDN destroy completed"
        );

        Ok(())
    }

    async fn object_info(&self, storage_key: &str) -> StorageResult<FileInfo> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", storage_key), ("timestamp", &timestamp)])?;

        let response = self
            .client
            .get(self.api_url(&format!(
                "assets/{}",
                urlencoding::encode(storage_key)
            )))
            .query(&[
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }
        if !response.status().is_success() {
            return Err(StorageError::BackendError(format!(
                "CDN returned {}",
                response.status()
            )));
        }

        let asset: CdnAsset = response
            .json()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        Ok(FileInfo {
            storage_key: storage_key.to_string(),
            size_bytes: asset.bytes,
            content_type: asset
                .content_type
                .or_else(|| tutoria_core::mime::content_type_for_path(storage_key)),
            last_modified: asset.created_at,
            url: self.public_url(storage_key),
            provider: ProviderKind::Cdn,
        })
    }

    async fn signed_url(
        &self,
        storage_key: &str,
        operation: SignedOperation,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if operation == SignedOperation::Write {
            // Uploads go through the API, not through delivery URLs.
            return Err(StorageError::ConfigError(
                "CDN provider only issues read URLs".to_string(),
            ));
        }

        let expires = Utc::now().timestamp() + expires_in.as_secs() as i64;
        let expires_str = expires.to_string();
        let token = self.sign(&[("key", storage_key), ("expires", &expires_str)])?;

        Ok(format!(
            "{}?expires={}&token={}",
            self.public_url(storage_key),
            expires,
            token
        ))
    }

    async fn exists(&self, storage_key: &str) -> bool {
        self.object_info(storage_key).await.is_ok()
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}/{}", self.delivery_url, self.zone, storage_key)
    }

    fn resolve_key(&self, identifier: &str) -> String {
        let prefix = format!("{}/{}/", self.delivery_url, self.zone);
        let stripped = match identifier.strip_prefix(&prefix) {
            Some(key) => key,
            None => return identifier.to_string(),
        };
        // Signed delivery URLs carry a query string; the key is the path.
        match stripped.split_once('?') {
            Some((key, _)) => key.to_string(),
            None => stripped.to_string(),
        }
    }

    fn matches_url(&self, url: &str) -> bool {
        url.starts_with(&format!("{}/{}/", self.delivery_url, self.zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> CdnProvider {
        CdnProvider::new(&CdnConfig {
            api_base: Some("https://api.cdn.example.com".to_string()),
            delivery_url: Some("https://media.cdn.example.com".to_string()),
            zone: Some("tutoria".to_string()),
            api_key: Some("key123".to_string()),
            api_secret: Some("secret456".to_string()),
            limits: ProviderLimits {
                max_file_size: 25 * 1024 * 1024,
                allowed_content_types: vec!["image/png".to_string()],
            },
        })
        .unwrap()
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let result = CdnProvider::new(&CdnConfig {
            api_base: Some("https://api.cdn.example.com".to_string()),
            delivery_url: None,
            zone: Some("tutoria".to_string()),
            api_key: None,
            api_secret: None,
            limits: ProviderLimits {
                max_file_size: 1024,
                allowed_content_types: vec![],
            },
        });
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }

    #[test]
    fn test_url_shape_and_resolution() {
        let provider = test_provider();
        let url = provider.public_url("profile/a.png");
        assert_eq!(url, "https://media.cdn.example.com/tutoria/profile/a.png");
        assert!(provider.matches_url(&url));
        assert_eq!(provider.resolve_key(&url), "profile/a.png");
        // Signed URL resolves back to the same key
        assert_eq!(
            provider.resolve_key(
                "https://media.cdn.example.com/tutoria/profile/a.png?expires=1&token=ab"
            ),
            "profile/a.png"
        );
        // Foreign URLs pass through
        assert_eq!(provider.resolve_key("profile/a.png"), "profile/a.png");
        assert!(!provider.matches_url("https://other.example.com/tutoria/a.png"));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let provider = test_provider();
        let a = provider
            .sign(&[("public_id", "p/a.png"), ("timestamp", "100")])
            .unwrap();
        let b = provider
            .sign(&[("public_id", "p/a.png"), ("timestamp", "100")])
            .unwrap();
        let c = provider
            .sign(&[("public_id", "p/a.png"), ("timestamp", "101")])
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_write_signed_url_unsupported() {
        let provider = test_provider();
        let result = provider
            .signed_url(
                "profile/a.png",
                SignedOperation::Write,
                Duration::from_secs(60),
            )
            .await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}

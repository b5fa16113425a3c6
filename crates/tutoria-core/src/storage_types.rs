use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage provider kinds
///
/// This enum defines the available storage providers. It lives in core
/// because configuration, the provider registry, and upload results all key
/// off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Local,
    S3,
    Cdn,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(ProviderKind::Local),
            "s3" => Ok(ProviderKind::S3),
            "cdn" => Ok(ProviderKind::Cdn),
            _ => Err(anyhow::anyhow!("Invalid storage provider: {}", s)),
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProviderKind::Local => write!(f, "local"),
            ProviderKind::S3 => write!(f, "s3"),
            ProviderKind::Cdn => write!(f, "cdn"),
        }
    }
}

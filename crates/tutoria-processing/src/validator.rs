use tutoria_core::{ProviderLimits, MIN_FILE_SIZE_BYTES};

const MAX_FILENAME_LENGTH: usize = 255;
const FORBIDDEN_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Common validation errors for uploaded files
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("File too small: {size} bytes (min: {min} bytes)")]
    FileTooSmall { size: usize, min: usize },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Unsupported content type: {content_type} (allowed: {allowed:?})")]
    UnsupportedContentType {
        content_type: String,
        allowed: Vec<String>,
    },
}

/// Uploaded file validator
///
/// Built per provider from its [`ProviderLimits`]; all checks are pure and
/// run before any storage I/O.
pub struct FileValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl FileValidator {
    pub fn new(limits: &ProviderLimits) -> Self {
        FileValidator {
            max_file_size: limits.max_file_size,
            allowed_content_types: limits.allowed_content_types.clone(),
        }
    }

    /// Validate file size against the global floor and the provider ceiling.
    pub fn validate_size(&self, size: usize) -> Result<(), ValidationError> {
        if size < MIN_FILE_SIZE_BYTES {
            return Err(ValidationError::FileTooSmall {
                size,
                min: MIN_FILE_SIZE_BYTES,
            });
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate the original filename: non-empty, at most 255 characters,
    /// and free of `< > : " / \ | ? *`.
    pub fn validate_filename(filename: &str) -> Result<(), ValidationError> {
        if filename.trim().is_empty() {
            return Err(ValidationError::InvalidFilename(
                "filename is empty".to_string(),
            ));
        }

        if filename.chars().count() > MAX_FILENAME_LENGTH {
            return Err(ValidationError::InvalidFilename(format!(
                "filename exceeds {} characters",
                MAX_FILENAME_LENGTH
            )));
        }

        if let Some(c) = filename
            .chars()
            .find(|c| FORBIDDEN_FILENAME_CHARS.contains(c))
        {
            return Err(ValidationError::InvalidFilename(format!(
                "filename contains forbidden character '{}'",
                c
            )));
        }

        Ok(())
    }

    /// Validate the declared content type against the provider's allowed set.
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type.to_lowercase();

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::UnsupportedContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Validate all aspects of a file: size, filename, content type.
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<(), ValidationError> {
        self.validate_size(file_size)?;
        Self::validate_filename(filename)?;
        self.validate_content_type(content_type)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> FileValidator {
        FileValidator::new(&ProviderLimits {
            max_file_size: 1024 * 1024, // 1MB
            allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        })
    }

    #[test]
    fn test_validate_size_ok() {
        let validator = test_validator();
        assert!(validator.validate_size(512 * 1024).is_ok());
    }

    #[test]
    fn test_validate_size_too_large() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_size(2 * 1024 * 1024),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_size_below_floor() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_size(50),
            Err(ValidationError::FileTooSmall { min: 1024, .. })
        ));
        assert!(matches!(
            validator.validate_size(0),
            Err(ValidationError::FileTooSmall { .. })
        ));
        // The floor itself is accepted
        assert!(validator.validate_size(1024).is_ok());
    }

    #[test]
    fn test_validate_filename_ok() {
        assert!(FileValidator::validate_filename("report-v2.pdf").is_ok());
        assert!(FileValidator::validate_filename("photo (1).jpg").is_ok());
    }

    #[test]
    fn test_validate_filename_empty() {
        assert!(FileValidator::validate_filename("").is_err());
        assert!(FileValidator::validate_filename("   ").is_err());
    }

    #[test]
    fn test_validate_filename_too_long() {
        let long = "a".repeat(256);
        assert!(FileValidator::validate_filename(&long).is_err());
        let ok = "a".repeat(255);
        assert!(FileValidator::validate_filename(&ok).is_ok());
    }

    #[test]
    fn test_validate_filename_forbidden_chars() {
        for name in [
            "a<b.txt", "a>b.txt", "a:b.txt", "a\"b.txt", "a/b.txt", "a\\b.txt", "a|b.txt",
            "a?b.txt", "a*b.txt",
        ] {
            assert!(
                FileValidator::validate_filename(name).is_err(),
                "expected rejection for {:?}",
                name
            );
        }
    }

    #[test]
    fn test_validate_content_type_ok() {
        let validator = test_validator();
        assert!(validator.validate_content_type("image/jpeg").is_ok());
        assert!(validator.validate_content_type("IMAGE/PNG").is_ok()); // case insensitive
    }

    #[test]
    fn test_validate_content_type_invalid() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_content_type("application/pdf"),
            Err(ValidationError::UnsupportedContentType { .. })
        ));
    }

    #[test]
    fn test_validate_all_order() {
        let validator = test_validator();
        // Size is checked first
        assert!(matches!(
            validator.validate_all("a/b.png", "image/png", 10),
            Err(ValidationError::FileTooSmall { .. })
        ));
        // Then filename
        assert!(matches!(
            validator.validate_all("a/b.png", "image/png", 2048),
            Err(ValidationError::InvalidFilename(_))
        ));
        // Then content type
        assert!(matches!(
            validator.validate_all("b.pdf", "application/pdf", 2048),
            Err(ValidationError::UnsupportedContentType { .. })
        ));
        assert!(validator.validate_all("b.png", "image/png", 2048).is_ok());
    }
}

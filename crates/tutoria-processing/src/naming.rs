//! Unique name generation for stored artifacts.
//!
//! Stored filenames are `{unix-millis}_{token}_{sanitized stem}.{extension}`.
//! The timestamp/random-token composite makes collisions negligible under
//! concurrent uploads of the same original filename, so no file-level
//! locking is needed anywhere in the subsystem.

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;

const TOKEN_LENGTH: usize = 8;
const MAX_STEM_LENGTH: usize = 120;

/// Sanitize an original file stem: any character outside `[A-Za-z0-9.-]`
/// becomes `_`.
pub fn sanitize_stem(stem: &str) -> String {
    let sanitized: String = stem
        .chars()
        .take(MAX_STEM_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().all(|c| c == '_' || c == '.') {
        "file".to_string()
    } else {
        sanitized
    }
}

/// Generate a collision-resistant stored filename from an original name and
/// extension.
pub fn generate_unique_name(original_name: &str, extension: &str) -> String {
    let stem = std::path::Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");

    let timestamp = Utc::now().timestamp_millis();
    let token: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();

    let extension = extension.trim_start_matches('.').to_lowercase();
    if extension.is_empty() {
        format!("{}_{}_{}", timestamp, token, sanitize_stem(stem))
    } else {
        format!(
            "{}_{}_{}.{}",
            timestamp,
            token,
            sanitize_stem(stem),
            extension
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("my report"), "my_report");
        assert_eq!(sanitize_stem("résumé"), "r_sum_");
        assert_eq!(sanitize_stem("photo-1.final"), "photo-1.final");
        assert_eq!(sanitize_stem("???"), "file");
        assert_eq!(sanitize_stem(""), "file");
    }

    #[test]
    fn test_unique_name_shape() {
        let name = generate_unique_name("My Photo.PNG", "png");
        let parts: Vec<&str> = name.splitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].parse::<i64>().is_ok());
        assert_eq!(parts[1].len(), 8);
        assert!(parts[2].ends_with(".png"));
        assert!(name.ends_with("My_Photo.png"));
    }

    #[test]
    fn test_unique_name_without_extension() {
        let name = generate_unique_name("notes", "");
        assert!(!name.contains('.'));
        assert!(name.ends_with("_notes"));
    }

    #[test]
    fn test_no_collisions_under_repetition() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generate_unique_name("avatar.png", "png")));
        }
    }
}

//! Shared key layout for storage backends.
//!
//! Key format: `{upload_type}/{filename}`. The thumbnail sibling of a
//! primary artifact is `{upload_type}/thumb_{filename}`.

/// Filename prefix marking a thumbnail sibling.
pub const THUMBNAIL_PREFIX: &str = "thumb_";

/// Storage key for an upload-type and stored filename. All backends use
/// this format so URLs, deletes, and info lookups stay consistent.
pub fn object_key(upload_type: &str, filename: &str) -> String {
    format!("{}/{}", upload_type.trim_matches('/'), filename)
}

/// Thumbnail key predicted from a primary key.
pub fn thumbnail_key(storage_key: &str) -> String {
    match storage_key.rsplit_once('/') {
        Some((prefix, name)) => format!("{}/{}{}", prefix, THUMBNAIL_PREFIX, name),
        None => format!("{}{}", THUMBNAIL_PREFIX, storage_key),
    }
}

/// Whether a key names a thumbnail artifact.
pub fn is_thumbnail_key(storage_key: &str) -> bool {
    storage_key
        .rsplit_once('/')
        .map_or(storage_key, |(_, name)| name)
        .starts_with(THUMBNAIL_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key() {
        assert_eq!(object_key("profile", "a.png"), "profile/a.png");
        assert_eq!(object_key("/course/", "b.pdf"), "course/b.pdf");
    }

    #[test]
    fn test_thumbnail_key() {
        assert_eq!(
            thumbnail_key("profile/123_ab_avatar.png"),
            "profile/thumb_123_ab_avatar.png"
        );
        assert_eq!(thumbnail_key("bare.png"), "thumb_bare.png");
    }

    #[test]
    fn test_is_thumbnail_key() {
        assert!(is_thumbnail_key("profile/thumb_a.png"));
        assert!(!is_thumbnail_key("profile/a.png"));
        assert!(!is_thumbnail_key("thumbless/a.png"));
    }
}

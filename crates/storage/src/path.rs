//! Storage-path derivation and safety checks.
//!
//! Paths are namespaced by purpose and keyed by a random UUID; the extension
//! comes from the validated MIME type. The client-supplied file name never
//! reaches the object key, so it cannot smuggle traversal sequences.

use postbox_core::upload::extension_for_mime;
use uuid::Uuid;

/// Root namespace for all staged uploads.
pub const UPLOAD_NAMESPACE: &str = "uploads";

/// Derive a collision-resistant storage path for an upload.
///
/// Returns `None` when the MIME type is not in the allow-list (the caller
/// validates first, so this is a second line of defense).
pub fn derive_storage_path(purpose: &str, mime_type: &str) -> Option<String> {
    let ext = extension_for_mime(mime_type)?;
    Some(format!("{UPLOAD_NAMESPACE}/{purpose}/{}.{ext}", Uuid::new_v4()))
}

/// Check that a caller-supplied storage path stays inside the upload
/// namespace: no traversal sequences, no absolute paths, no empty segments.
pub fn is_safe_storage_path(path: &str) -> bool {
    if !path.starts_with(&format!("{UPLOAD_NAMESPACE}/")) {
        return false;
    }
    if path.contains('\\') || path.contains("//") {
        return false;
    }
    path.split('/').all(|segment| {
        !segment.is_empty() && segment != "." && segment != ".."
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_are_namespaced_and_extension_typed() {
        let path = derive_storage_path("sponsor-logos", "image/png").unwrap();
        assert!(path.starts_with("uploads/sponsor-logos/"));
        assert!(path.ends_with(".png"));
    }

    #[test]
    fn derived_paths_contain_no_traversal_sequences() {
        let path = derive_storage_path("sponsor-logos", "image/jpeg").unwrap();
        assert!(!path.contains(".."));
        assert!(is_safe_storage_path(&path));
    }

    #[test]
    fn derived_paths_are_unique_across_calls() {
        let a = derive_storage_path("sponsor-logos", "image/png").unwrap();
        let b = derive_storage_path("sponsor-logos", "image/png").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unknown_mime_types_yield_no_path() {
        assert!(derive_storage_path("sponsor-logos", "image/gif").is_none());
    }

    #[test]
    fn traversal_and_out_of_namespace_paths_are_rejected() {
        assert!(!is_safe_storage_path("uploads/../etc/passwd"));
        assert!(!is_safe_storage_path("/etc/passwd"));
        assert!(!is_safe_storage_path("other/sponsor-logos/x.png"));
        assert!(!is_safe_storage_path("uploads//x.png"));
        assert!(!is_safe_storage_path("uploads/./x.png"));
        assert!(!is_safe_storage_path("uploads\\x.png"));
        assert!(is_safe_storage_path("uploads/sponsor-logos/x.png"));
    }
}

//! Upload request constraints: MIME allow-list, size ceiling, file-name
//! checks, and the MIME-to-extension mapping used for storage paths.
//!
//! Storage paths never embed the client-supplied file name; the extension is
//! derived from the validated MIME type so a hostile name cannot influence
//! the object key.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

/// Maximum accepted upload size in bytes (5 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Maximum length for the client-supplied file name (characters).
pub const MAX_FILE_NAME_LENGTH: usize = 255;

/// Accepted MIME types for uploads.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/svg+xml"];

/// Map an allowed MIME type to the file extension used in storage paths.
pub fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a file upload request (name, MIME type, declared size).
///
/// All three fields are required; violations name the offending field and
/// the request is rejected as a whole, never partially accepted.
pub fn validate_upload_request(
    file_name: &str,
    mime_type: &str,
    file_size: u64,
) -> Result<(), CoreError> {
    if file_name.trim().is_empty() {
        return Err(CoreError::validation("file_name", "must not be empty"));
    }
    if file_name.chars().count() > MAX_FILE_NAME_LENGTH {
        return Err(CoreError::validation(
            "file_name",
            format!("exceeds maximum length of {MAX_FILE_NAME_LENGTH} characters"),
        ));
    }
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(CoreError::validation(
            "mime_type",
            format!("'{mime_type}' is not one of {ALLOWED_MIME_TYPES:?}"),
        ));
    }
    if file_size == 0 {
        return Err(CoreError::validation("file_size", "must be greater than 0"));
    }
    if file_size > MAX_FILE_SIZE_BYTES {
        return Err(CoreError::validation(
            "file_size",
            format!("exceeds maximum of {MAX_FILE_SIZE_BYTES} bytes (got {file_size})"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_4_mib_png() {
        assert!(validate_upload_request("logo.png", "image/png", 4 * 1024 * 1024).is_ok());
    }

    #[test]
    fn rejects_a_6_mib_file() {
        let err = validate_upload_request("logo.png", "image/png", 6 * 1024 * 1024);
        assert!(err.is_err());
        assert!(err.unwrap_err().to_string().contains("file_size"));
    }

    #[test]
    fn rejects_disallowed_mime_types() {
        assert!(validate_upload_request("movie.gif", "image/gif", 1024).is_err());
        assert!(validate_upload_request("doc.pdf", "application/pdf", 1024).is_err());
    }

    #[test]
    fn accepts_every_allowed_mime_type() {
        for mime in ALLOWED_MIME_TYPES {
            assert!(validate_upload_request("f", mime, 1024).is_ok(), "{mime}");
        }
    }

    #[test]
    fn rejects_empty_name_and_zero_size() {
        assert!(validate_upload_request("", "image/png", 1024).is_err());
        assert!(validate_upload_request("logo.png", "image/png", 0).is_err());
    }

    #[test]
    fn every_allowed_mime_has_an_extension() {
        for mime in ALLOWED_MIME_TYPES {
            assert!(extension_for_mime(mime).is_some(), "{mime}");
        }
        assert_eq!(extension_for_mime("image/gif"), None);
    }
}

//! API Client Modules
//!
//! One client per manager resource collection. Each client turns a call into
//! a single [`ApiRequest`](crate::transport::ApiRequest), hands it to the shared
//! transport and wraps the JSON response in a typed entity.

pub mod blueprints;
pub mod secrets;
pub mod service_templates;

pub use blueprints::{
    ArchiveResource, ArchiveResourceClient, ArchiveSource, Blueprint, BlueprintResource,
    BlueprintsClient, UploadOptions,
};
pub use secrets::{CreateSecretOptions, Secret, SecretsClient};
pub use service_templates::{ServiceTemplate, ServiceTemplateResource, ServiceTemplatesClient};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::{ClientError, ClientResult};

/// Characters escaped when an identifier is placed in a single path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Reject empty identifiers and escape the rest for use as one path segment.
///
/// `.` and `..` are rejected outright: URL parsing resolves them (and their
/// `%2e` forms) as dot-segments, which would retarget the request.
pub(crate) fn path_segment(kind: &str, id: &str) -> ClientResult<String> {
    if id.trim().is_empty() {
        return Err(ClientError::invalid_input(format!("{} must not be empty", kind)));
    }
    if id == "." || id == ".." {
        return Err(ClientError::invalid_input(format!(
            "{} must not be '{}'",
            kind, id
        )));
    }
    Ok(utf8_percent_encode(id, PATH_SEGMENT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segment_escapes_separators() {
        assert_eq!(path_segment("key", "db_password").unwrap(), "db_password");
        assert_eq!(path_segment("key", "a/b c").unwrap(), "a%2Fb%20c");
        assert!(matches!(
            path_segment("key", "  "),
            Err(ClientError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_path_segment_rejects_dot_segments() {
        for id in [".", ".."] {
            assert!(matches!(
                path_segment("secret key", id),
                Err(ClientError::InvalidInput(_))
            ));
        }
        assert_eq!(path_segment("key", "...").unwrap(), "...");
        assert_eq!(path_segment("key", ".hidden").unwrap(), ".hidden");
    }
}

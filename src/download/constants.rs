//! Constants for the download module (buffering, temp files, accepted types).

/// Buffered writer capacity for streamed bodies (8 KiB).
pub const WRITE_BUFFER_SIZE: usize = 8 * 1024;

/// Suffix appended to the destination while a body is streaming.
pub const PART_SUFFIX: &str = ".part";

/// Content types accepted under [`super::ContentTypePolicy::Strict`].
pub const ACCEPTED_STATIC_CONTENT_TYPES: [&str; 3] = [
    "application/pdf",
    "application/octet-stream",
    "binary/octet-stream",
];

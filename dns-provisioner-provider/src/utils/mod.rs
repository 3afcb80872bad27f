//! Utility modules.

/// Log sanitization so response bodies and API tokens never land in logs verbatim.
pub mod log_sanitizer;

//! Log sanitization utilities
//!
//! Response bodies can carry full TXT payloads (DKIM keys, SPF) and request
//! headers carry the bearer token; neither is logged in full.

/// Maximum number of bytes of a body included in a log line.
const TRUNCATE_LIMIT: usize = 256;

/// Number of leading characters of a secret left visible.
const SECRET_VISIBLE_PREFIX: usize = 4;

/// Largest char boundary `<= index`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
///
/// Strings within the limit are returned unchanged; longer ones keep the first
/// `TRUNCATE_LIMIT` bytes plus a suffix with the original length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Mask a credential, keeping only a short prefix for identification.
///
/// Secrets no longer than the prefix are masked entirely.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= SECRET_VISIBLE_PREFIX {
        return "****".to_string();
    }
    let prefix: String = secret.chars().take(SECRET_VISIBLE_PREFIX).collect();
    format!("{prefix}****")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_unchanged() {
        let body = r#"{"success":true,"result":[]}"#;
        assert_eq!(truncate_for_log(body), body);
    }

    #[test]
    fn long_body_truncated_with_length() {
        let body = "v=DKIM1; k=rsa; p=".to_string() + &"A".repeat(600);
        let result = truncate_for_log(&body);
        assert!(result.starts_with("v=DKIM1; k=rsa; p="));
        assert!(result.ends_with(&format!("[truncated, total {} bytes]", body.len())));
        assert!(result.len() < body.len());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let s = "é".repeat(200);
        assert!(truncate_for_log(&s).contains("[truncated"));
    }

    #[test]
    fn masks_token() {
        assert_eq!(mask_secret("Xk9fQ2lmT0tokenvalue"), "Xk9f****");
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret(""), "****");
    }
}

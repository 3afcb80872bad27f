//! Cloudflare error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::CloudflareProvider;

/// 6003 invalid request headers, 6103/6111 malformed auth header, 9103/9106
/// unknown or missing key, 9109 unauthorized, 10000 authentication error
const AUTH_CODES: &[&str] = &["6003", "6103", "6111", "9103", "9106", "9109", "10000"];

/// 81053-81058: a record with that host or those settings already exists
const RECORD_EXISTS_CODES: &[&str] = &["81053", "81054", "81055", "81056", "81057", "81058"];

/// 7000 no route, 7003 invalid object identifier, 1001 invalid zone identifier
const ZONE_NOT_FOUND_CODES: &[&str] = &["7000", "7003", "1001"];

/// Which request field a validation code refers to.
fn invalid_param_name(code: &str) -> Option<&'static str> {
    match code {
        "1004" => Some("general"),
        "9000" => Some("name"),
        "9005" | "9009" | "9007" => Some("content"),
        "9021" => Some("ttl"),
        "9041" => Some("proxied"),
        "9101" | "9102" => Some("data"),
        _ => None,
    }
}

/// Reference: <https://developers.cloudflare.com/api/>
impl ProviderErrorMapper for CloudflareProvider {
    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();
        let Some(code) = raw.code.as_deref() else {
            return self.unknown_error(raw);
        };

        if AUTH_CODES.contains(&code) {
            return ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            };
        }
        if RECORD_EXISTS_CODES.contains(&code) {
            return ProviderError::RecordExists {
                provider,
                record_name: context.record_name.unwrap_or_else(|| "<unknown>".into()),
                raw_message: Some(raw.message),
            };
        }
        if ZONE_NOT_FOUND_CODES.contains(&code) {
            return ProviderError::DomainNotFound {
                provider,
                domain: context.domain.unwrap_or_else(|| "<unknown>".into()),
                raw_message: Some(raw.message),
            };
        }
        if let Some(param) = invalid_param_name(code) {
            return ProviderError::InvalidParameter {
                provider,
                param: param.to_string(),
                detail: raw.message,
            };
        }

        match code {
            // 81044: Record does not exist
            "81044" => ProviderError::RecordNotFound {
                provider,
                record_id: context.record_id.unwrap_or_else(|| "<unknown>".into()),
                raw_message: Some(raw.message),
            },
            // 81045: The record quota has been exceeded
            "81045" => ProviderError::QuotaExceeded {
                provider,
                raw_message: Some(raw.message),
            },
            _ => self.unknown_error(raw),
        }
    }
}

impl CloudflareProvider {
    /// Classify a failure from the HTTP status alone.
    ///
    /// Used when the body is not a Cloudflare envelope, or when the envelope's
    /// code has no mapping but the status is unambiguous.
    pub(crate) fn status_error(
        &self,
        status: u16,
        message: &str,
        context: ErrorContext,
    ) -> ProviderError {
        let provider = self.provider_name().to_string();
        let raw_message = Some(truncate_for_log(message));
        match status {
            401 => ProviderError::InvalidCredentials {
                provider,
                raw_message,
            },
            403 => ProviderError::PermissionDenied {
                provider,
                raw_message,
            },
            404 if context.record_id.is_some() => ProviderError::RecordNotFound {
                provider,
                record_id: context.record_id.unwrap_or_default(),
                raw_message,
            },
            404 if context.domain.is_some() => ProviderError::DomainNotFound {
                provider,
                domain: context.domain.unwrap_or_default(),
                raw_message,
            },
            _ => ProviderError::Unknown {
                provider,
                raw_code: Some(format!("HTTP {status}")),
                raw_message: truncate_for_log(message),
            },
        }
    }

    /// Map an envelope error, falling back to the HTTP status for unmapped codes.
    pub(crate) fn envelope_error(
        &self,
        status: u16,
        raw: RawApiError,
        context: ErrorContext,
    ) -> ProviderError {
        match self.map_error(raw, context.clone()) {
            ProviderError::Unknown { raw_message, .. } if matches!(status, 401 | 403 | 404) => {
                self.status_error(status, &raw_message, context)
            }
            mapped => mapped,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn provider() -> CloudflareProvider {
        CloudflareProvider::new(String::new()).unwrap()
    }

    fn ctx() -> ErrorContext {
        ErrorContext {
            record_name: Some("_sip._tls.contoso.com".into()),
            record_id: Some("rec-123".into()),
            domain: Some("zone-1".into()),
        }
    }

    fn map(code: &str) -> ProviderError {
        provider().map_error(RawApiError::with_code(code, "msg"), ctx())
    }

    #[test]
    fn auth_codes() {
        for code in AUTH_CODES {
            assert!(
                matches!(map(code), ProviderError::InvalidCredentials { .. }),
                "code {code}"
            );
        }
    }

    #[test]
    fn record_exists_uses_context_name() {
        for code in RECORD_EXISTS_CODES {
            assert!(matches!(
                map(code),
                ProviderError::RecordExists { record_name, .. } if record_name == "_sip._tls.contoso.com"
            ));
        }
    }

    #[test]
    fn validation_codes_name_the_field() {
        let cases = [
            ("1004", "general"),
            ("9000", "name"),
            ("9005", "content"),
            ("9021", "ttl"),
            ("9041", "proxied"),
            ("9101", "data"),
        ];
        for (code, expected) in cases {
            assert!(
                matches!(map(code), ProviderError::InvalidParameter { ref param, .. } if param == expected),
                "code {code}"
            );
        }
    }

    #[test]
    fn record_not_found_and_quota() {
        assert!(matches!(
            map("81044"),
            ProviderError::RecordNotFound { record_id, .. } if record_id == "rec-123"
        ));
        assert!(matches!(map("81045"), ProviderError::QuotaExceeded { .. }));
    }

    #[test]
    fn zone_codes_use_context_domain() {
        assert!(matches!(
            map("7003"),
            ProviderError::DomainNotFound { domain, .. } if domain == "zone-1"
        ));
        let bare = provider().map_error(RawApiError::with_code("7000", "no route"), ErrorContext::default());
        assert!(matches!(
            bare,
            ProviderError::DomainNotFound { domain, .. } if domain == "<unknown>"
        ));
    }

    #[test]
    fn unmapped_and_codeless_fall_back_to_unknown() {
        assert!(matches!(
            map("99999"),
            ProviderError::Unknown { raw_code: Some(c), .. } if c == "99999"
        ));
        let none = provider().map_error(RawApiError::new("no code"), ctx());
        assert!(matches!(
            none,
            ProviderError::Unknown { raw_code: None, raw_message, .. } if raw_message == "no code"
        ));
    }

    #[test]
    fn unmapped_404_with_record_context_is_not_found() {
        let err = provider().envelope_error(
            404,
            RawApiError::with_code("1234", "Not found"),
            ErrorContext::record("abc"),
        );
        assert!(matches!(
            err,
            ProviderError::RecordNotFound { record_id, .. } if record_id == "abc"
        ));
    }

    #[test]
    fn status_only_classification() {
        let p = provider();
        assert!(matches!(
            p.status_error(401, "<html>", ErrorContext::default()),
            ProviderError::InvalidCredentials { .. }
        ));
        assert!(matches!(
            p.status_error(403, "", ErrorContext::default()),
            ProviderError::PermissionDenied { .. }
        ));
        assert!(matches!(
            p.status_error(404, "", ErrorContext::zone("z")),
            ProviderError::DomainNotFound { .. }
        ));
        assert!(matches!(
            p.status_error(500, "oops", ErrorContext::default()),
            ProviderError::Unknown { raw_code: Some(c), .. } if c == "HTTP 500"
        ));
    }
}

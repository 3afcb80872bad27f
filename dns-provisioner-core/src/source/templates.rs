//! Records whose shape is fixed by the service they point at.

use dns_provisioner_provider::{
    normalize_domain_name, DnsRecord, DnsRecordType, RecordValidationError,
};

/// Vercel's anycast address for apex domains.
pub const VERCEL_A_RECORD_IP: &str = "76.76.21.21";

const M365_MX_TTL: u32 = 3600;
const WEB_TTL: u32 = 60;

/// Microsoft 365 inbound mail: `@ MX 0 contoso-com.mail.protection.outlook.com`.
pub fn m365_mx(domain: &str) -> DnsRecord {
    let domain = normalize_domain_name(domain).to_ascii_lowercase();
    let host = format!("{}.mail.protection.outlook.com", domain.replace('.', "-"));
    DnsRecord::new(DnsRecordType::Mx, "@", host, M365_MX_TTL).with_priority(0)
}

/// Vercel apex: `contoso.com A 76.76.21.21`, not proxied.
///
/// `www.` names and single-label names are rejected; the record belongs on the
/// apex itself.
pub fn vercel_apex(domain: &str) -> Result<DnsRecord, RecordValidationError> {
    let domain = normalize_domain_name(domain).to_ascii_lowercase();
    let reason = if domain.starts_with("www.") {
        Some("use the domain without 'www.'")
    } else if !domain.contains('.') {
        Some("expected a name like contoso.com")
    } else {
        None
    };
    if let Some(reason) = reason {
        return Err(RecordValidationError::NotApexDomain { domain, reason });
    }
    Ok(DnsRecord::new(DnsRecordType::A, domain, VERCEL_A_RECORD_IP, WEB_TTL).with_proxied(false))
}

/// `label.zone CNAME target`, not proxied.
pub fn cname(zone: &str, label: &str, target: &str) -> DnsRecord {
    let zone = normalize_domain_name(zone).to_ascii_lowercase();
    let label = normalize_domain_name(label);
    DnsRecord::new(
        DnsRecordType::Cname,
        format!("{label}.{zone}"),
        normalize_domain_name(target),
        WEB_TTL,
    )
    .with_proxied(false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn m365_mx_host_is_derived_from_domain() {
        let mx = m365_mx("Contoso.co.uk.");
        assert_eq!(mx.name, "@");
        assert_eq!(mx.content, "contoso-co-uk.mail.protection.outlook.com");
        assert_eq!(mx.priority, Some(0));
        assert_eq!(mx.ttl, 3600);
        assert!(mx.validate().is_ok());
    }

    #[test]
    fn vercel_apex_record() {
        let a = vercel_apex("contoso.com").unwrap();
        assert_eq!(a.record_type, DnsRecordType::A);
        assert_eq!(a.name, "contoso.com");
        assert_eq!(a.content, VERCEL_A_RECORD_IP);
        assert_eq!(a.ttl, 60);
        assert!(!a.proxied);
    }

    #[test]
    fn vercel_apex_rejects_www_and_single_label_names() {
        assert!(matches!(
            vercel_apex("www.contoso.com"),
            Err(RecordValidationError::NotApexDomain { ref domain, .. }) if domain == "www.contoso.com"
        ));
        assert!(matches!(
            vercel_apex("contoso"),
            Err(RecordValidationError::NotApexDomain { .. })
        ));
    }

    #[test]
    fn cname_is_qualified_under_zone() {
        let c = cname("contoso.com", "www", "cname.vercel-dns.com.");
        assert_eq!(c.name, "www.contoso.com");
        assert_eq!(c.content, "cname.vercel-dns.com");
        assert!(c.validate().is_ok());
    }
}

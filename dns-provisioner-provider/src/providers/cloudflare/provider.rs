//! Cloudflare DnsProvider trait 实现

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::providers::common::{full_name_to_relative, normalize_domain_name, qualify_name};
use crate::traits::{DnsProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{DnsRecord, DnsRecordType, PaginatedResponse, RecordQuery, SrvContent, Zone};

use super::{
    CloudflareDnsRecord, CloudflareProvider, CloudflareSrvData, CloudflareZone, CreateRecordBody,
    MAX_PAGE_SIZE_RECORDS,
};

impl From<CloudflareZone> for Zone {
    fn from(zone: CloudflareZone) -> Self {
        Self {
            id: zone.id,
            name: normalize_domain_name(&zone.name),
            status: zone.status,
        }
    }
}

/// Split an SRV owner name into Cloudflare's `service` / `proto` fields.
///
/// Only the two Microsoft 365 SRV owners are recognised: `_sip.` selects
/// `_sip`, anything else `_sipfederationtls`; `_tls.` selects `_tls`, anything
/// else `_tcp`. The owner is inspected in fully qualified form.
pub(crate) fn srv_service_and_proto(full_name: &str) -> (&'static str, &'static str) {
    let lower = full_name.to_ascii_lowercase();
    let service = if lower.contains("_sip.") {
        "_sip"
    } else {
        "_sipfederationtls"
    };
    let proto = if lower.contains("_tls.") { "_tls" } else { "_tcp" };
    (service, proto)
}

impl CloudflareProvider {
    /// Convert a Cloudflare record into a `DnsRecord`.
    ///
    /// SRV records come back with compound content; it is unpacked so that
    /// `content` holds only the target.
    pub(crate) fn cf_record_to_dns_record(
        &self,
        cf_record: CloudflareDnsRecord,
        zone_name: &str,
    ) -> Result<DnsRecord> {
        let record_type: DnsRecordType =
            cf_record
                .record_type
                .parse()
                .map_err(|_| ProviderError::UnsupportedRecordType {
                    provider: self.provider_name().to_string(),
                    record_type: cf_record.record_type.clone(),
                })?;

        let mut record = DnsRecord {
            record_type,
            name: full_name_to_relative(&cf_record.name, zone_name),
            content: cf_record.content.unwrap_or_default(),
            ttl: cf_record.ttl,
            priority: cf_record.priority,
            weight: None,
            port: None,
            proxied: cf_record.proxied.unwrap_or(false),
            provider_id: Some(cf_record.id),
        };

        if record_type == DnsRecordType::Srv {
            let data = cf_record
                .data
                .and_then(|d| serde_json::from_value::<CloudflareSrvData>(d).ok());
            if let Some(data) = data {
                record.priority = Some(data.priority);
                record.weight = Some(data.weight);
                record.port = Some(data.port);
                record.content = data.target;
            } else if let Some(parsed) = SrvContent::parse(&record.content) {
                record.priority = record.priority.or(parsed.priority);
                record.weight = Some(parsed.weight);
                record.port = Some(parsed.port);
                record.content = parsed.target;
            }
        }

        Ok(record)
    }

    /// Build the create payload for `record` inside `zone_name`.
    pub(crate) fn build_create_body(record: &DnsRecord, zone_name: &str) -> CreateRecordBody {
        let full_name = qualify_name(&record.name, zone_name);

        if record.record_type == DnsRecordType::Srv {
            let (service, proto) = srv_service_and_proto(&full_name);
            return CreateRecordBody::Srv {
                record_type: DnsRecordType::Srv.as_str(),
                name: full_name,
                ttl: record.ttl,
                data: CloudflareSrvData {
                    service: Some(service.to_string()),
                    proto: Some(proto.to_string()),
                    name: Some(normalize_domain_name(zone_name)),
                    priority: record.priority.unwrap_or_default(),
                    weight: record.weight.unwrap_or(1),
                    port: record.port.unwrap_or(443),
                    target: record.content.clone(),
                },
            };
        }

        CreateRecordBody::Flat {
            record_type: record.record_type.as_str(),
            name: full_name,
            content: record.content.clone(),
            ttl: record.ttl,
            priority: if record.record_type == DnsRecordType::Mx {
                record.priority
            } else {
                None
            },
            proxied: record
                .record_type
                .is_proxiable()
                .then_some(record.proxied),
        }
    }

    async fn zone_name(&self, zone_id: &str) -> Result<String> {
        Ok(self.get_zone(zone_id).await?.name)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    async fn get_zone(&self, zone_id: &str) -> Result<Zone> {
        let zone: CloudflareZone = self
            .get(&format!("/zones/{zone_id}"), ErrorContext::zone(zone_id))
            .await?;
        Ok(zone.into())
    }

    async fn find_zone(&self, domain: &str) -> Result<Zone> {
        let domain = normalize_domain_name(domain).to_ascii_lowercase();
        let (zones, _): (Vec<CloudflareZone>, u32) = self
            .get_list(
                &format!("/zones?name={}", urlencoding::encode(&domain)),
                ErrorContext::zone(&domain),
            )
            .await?;

        zones
            .into_iter()
            .next()
            .map(Zone::from)
            .ok_or_else(|| ProviderError::DomainNotFound {
                provider: self.provider_name().to_string(),
                domain,
                raw_message: None,
            })
    }

    async fn list_records(
        &self,
        zone_id: &str,
        query: &RecordQuery,
    ) -> Result<PaginatedResponse<DnsRecord>> {
        let zone_name = self.zone_name(zone_id).await?;

        let page = query.page.max(1);
        let per_page = query.per_page.clamp(1, MAX_PAGE_SIZE_RECORDS);
        let mut url = format!("/zones/{zone_id}/dns_records?page={page}&per_page={per_page}");
        if let Some(record_type) = query.record_type {
            url.push_str(&format!("&type={}", record_type.as_str()));
        }
        if let Some(name) = &query.name {
            let full_name = qualify_name(name, &zone_name);
            url.push_str(&format!("&name={}", urlencoding::encode(&full_name)));
        }

        let (cf_records, total_count): (Vec<CloudflareDnsRecord>, u32) =
            self.get_list(&url, ErrorContext::zone(zone_id)).await?;

        let records = cf_records
            .into_iter()
            .filter_map(|r| {
                let (id, record_type) = (r.id.clone(), r.record_type.clone());
                match self.cf_record_to_dns_record(r, &zone_name) {
                    Ok(record) => Some(record),
                    Err(_) => {
                        log::debug!("[cloudflare] Skipping {record_type} record {id}");
                        None
                    }
                }
            })
            .collect();

        Ok(PaginatedResponse::new(records, page, per_page, total_count))
    }

    async fn get_record(&self, zone_id: &str, record_id: &str) -> Result<DnsRecord> {
        let zone_name = self.zone_name(zone_id).await?;
        let cf_record: CloudflareDnsRecord = self
            .get(
                &format!("/zones/{zone_id}/dns_records/{record_id}"),
                ErrorContext::record(record_id),
            )
            .await?;
        self.cf_record_to_dns_record(cf_record, &zone_name)
    }

    async fn create_record(&self, zone_id: &str, record: &DnsRecord) -> Result<DnsRecord> {
        let zone_name = self.zone_name(zone_id).await?;
        let body = Self::build_create_body(record, &zone_name);

        let context = ErrorContext {
            record_name: Some(qualify_name(&record.name, &zone_name)),
            domain: Some(zone_id.to_string()),
            ..ErrorContext::default()
        };
        let cf_record: CloudflareDnsRecord = self
            .post(&format!("/zones/{zone_id}/dns_records"), &body, context)
            .await?;

        self.cf_record_to_dns_record(cf_record, &zone_name)
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        self.delete(
            &format!("/zones/{zone_id}/dns_records/{record_id}"),
            ErrorContext::record(record_id),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn provider() -> CloudflareProvider {
        CloudflareProvider::new("token".into()).unwrap()
    }

    #[test]
    fn srv_owner_heuristic() {
        assert_eq!(
            srv_service_and_proto("_sip._tls.contoso.com"),
            ("_sip", "_tls")
        );
        assert_eq!(
            srv_service_and_proto("_sipfederationtls._tcp.contoso.com"),
            ("_sipfederationtls", "_tcp")
        );
        // anything else is tagged as federation over tcp
        assert_eq!(
            srv_service_and_proto("_xmpp._tcp.contoso.com"),
            ("_sipfederationtls", "_tcp")
        );
    }

    #[test]
    fn srv_payload_uses_data_object() {
        let record = DnsRecord::new(DnsRecordType::Srv, "_sip._tls", "sipdir.online.lync.com", 3600)
            .with_srv(100, 1, 443);
        let body = serde_json::to_value(CloudflareProvider::build_create_body(&record, "contoso.com"))
            .unwrap();

        assert_eq!(
            body,
            json!({
                "type": "SRV",
                "name": "_sip._tls.contoso.com",
                "ttl": 3600,
                "data": {
                    "service": "_sip",
                    "proto": "_tls",
                    "name": "contoso.com",
                    "priority": 100,
                    "weight": 1,
                    "port": 443,
                    "target": "sipdir.online.lync.com"
                }
            })
        );
    }

    #[test]
    fn mx_payload_carries_priority_but_not_proxied() {
        let record = DnsRecord::new(
            DnsRecordType::Mx,
            "@",
            "contoso-com.mail.protection.outlook.com",
            3600,
        )
        .with_priority(0);
        let body = serde_json::to_value(CloudflareProvider::build_create_body(&record, "contoso.com"))
            .unwrap();
        assert_eq!(
            body,
            json!({
                "type": "MX",
                "name": "contoso.com",
                "content": "contoso-com.mail.protection.outlook.com",
                "ttl": 3600,
                "priority": 0
            })
        );
    }

    #[test]
    fn a_payload_sends_proxied_false() {
        let record = DnsRecord::new(DnsRecordType::A, "contoso.com", "76.76.21.21", 60);
        let body = serde_json::to_value(CloudflareProvider::build_create_body(&record, "contoso.com"))
            .unwrap();
        assert_eq!(body["proxied"], json!(false));
        assert_eq!(body["name"], json!("contoso.com"));
        assert!(body.get("priority").is_none());
    }

    #[test]
    fn srv_record_from_compound_content() {
        let cf: CloudflareDnsRecord = serde_json::from_value(json!({
            "id": "srv-1",
            "type": "SRV",
            "name": "_sip._tls.contoso.com",
            "content": "1 443 sipdir.online.lync.com",
            "priority": 100,
            "ttl": 3600
        }))
        .unwrap();
        let record = provider().cf_record_to_dns_record(cf, "contoso.com").unwrap();
        assert_eq!(record.name, "_sip._tls");
        assert_eq!(record.content, "sipdir.online.lync.com");
        assert_eq!(
            (record.priority, record.weight, record.port),
            (Some(100), Some(1), Some(443))
        );
        assert_eq!(record.provider_id.as_deref(), Some("srv-1"));
    }

    #[test]
    fn srv_record_prefers_data_object() {
        let cf: CloudflareDnsRecord = serde_json::from_value(json!({
            "id": "srv-2",
            "type": "SRV",
            "name": "_sipfederationtls._tcp.contoso.com",
            "content": "1 5061 sipfed.online.lync.com",
            "ttl": 3600,
            "data": {"priority": 100, "weight": 1, "port": 5061, "target": "sipfed.online.lync.com"}
        }))
        .unwrap();
        let record = provider().cf_record_to_dns_record(cf, "contoso.com").unwrap();
        assert_eq!(record.port, Some(5061));
        assert_eq!(record.priority, Some(100));
        assert_eq!(record.content, "sipfed.online.lync.com");
    }

    #[test]
    fn unsupported_type_is_an_error() {
        let cf: CloudflareDnsRecord = serde_json::from_value(json!({
            "id": "ns-1", "type": "NS", "name": "contoso.com",
            "content": "ns1.cloudflare.com", "ttl": 86400
        }))
        .unwrap();
        assert!(matches!(
            provider().cf_record_to_dns_record(cf, "contoso.com"),
            Err(ProviderError::UnsupportedRecordType { .. })
        ));
    }
}

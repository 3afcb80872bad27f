//! # dns-provisioner-provider
//!
//! Thin client over a DNS provider's management API, exposing exactly the
//! operations record provisioning needs: zone lookup, record listing (with
//! transparent pagination), fetch by id, create and delete.
//!
//! ## Supported Providers
//!
//! | Provider | Auth Method |
//! |----------|-------------|
//! | [Cloudflare](https://www.cloudflare.com/) | Bearer Token |
//!
//! ## TLS Backend
//!
//! - **`native-tls`** *(default)* — Use the platform's native TLS implementation.
//! - **`rustls`** — Use rustls.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dns_provisioner_provider::{
//!     create_provider, DnsProvider, DnsRecord, DnsRecordType, ProviderCredentials, RecordQuery,
//! };
//!
//! # async fn demo() -> dns_provisioner_provider::Result<()> {
//! let provider = create_provider(ProviderCredentials::Cloudflare {
//!     api_token: "your-token".to_string(),
//! })?;
//!
//! let zone = provider.find_zone("contoso.com").await?;
//! let records = provider.list_all_records(&zone.id, &RecordQuery::default()).await?;
//! for record in &records {
//!     println!("{} {} {}", record.name, record.record_type, record.content);
//! }
//!
//! let mx = DnsRecord::new(DnsRecordType::Mx, "@", "contoso-com.mail.protection.outlook.com", 3600)
//!     .with_priority(0);
//! let created = provider.create_record(&zone.id, &mx).await?;
//! println!("created {:?}", created.provider_id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All provider operations return [`Result<T, ProviderError>`](ProviderError).
//! Nothing is retried: a failed call is reported once and the caller decides
//! what to do. [`ProviderError::is_transport`] separates connectivity failures
//! from API-level rejections.

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

pub use error::{ProviderError, Result};

pub use factory::create_provider;

pub use traits::DnsProvider;

pub use types::{
    DnsRecord, DnsRecordType, PaginatedResponse, ParseRecordTypeError, ProviderCredentials,
    RecordQuery, RecordValidationError, SrvContent, Zone,
};

pub use providers::CloudflareProvider;
pub use providers::common::{full_name_to_relative, normalize_domain_name, qualify_name};

//! Provider 公共工具函数

use std::time::Duration;

use reqwest::Client;

use crate::error::{ProviderError, Result};

// ============ HTTP Client ============

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 创建带超时配置的 HTTP Client
pub fn create_http_client(provider: &str) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ProviderError::NetworkError {
            provider: provider.to_string(),
            detail: format!("Failed to create HTTP client: {e}"),
        })
}

// ============ 域名名称处理 ============

/// 去掉域名末尾的点
pub fn normalize_domain_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_string()
}

/// 将完整域名转换为相对名称
/// 如: "www.example.com" + "example.com" -> "www"
/// 如: "example.com" + "example.com" -> "@"
///
/// 不属于该 zone 的名称只做规范化，原样返回。
pub fn full_name_to_relative(full_name: &str, zone_name: &str) -> String {
    let full = normalize_domain_name(full_name);
    let zone = normalize_domain_name(zone_name);

    if full.eq_ignore_ascii_case(&zone) {
        return "@".to_string();
    }
    let suffix_len = zone.len() + 1;
    if full.len() > suffix_len {
        let split = full.len() - suffix_len;
        if full.is_char_boundary(split) {
            let (label, suffix) = full.split_at(split);
            if suffix.starts_with('.') && suffix[1..].eq_ignore_ascii_case(&zone) {
                return label.to_string();
            }
        }
    }
    full
}

/// Qualify an owner name against its zone.
///
/// `@` and the empty name map to the apex; names already inside the zone are
/// only normalized; anything else is treated as a label under the zone.
/// 如: "www" + "example.com" -> "www.example.com"
/// 如: "www.example.com." + "example.com" -> "www.example.com"
pub fn qualify_name(name: &str, zone_name: &str) -> String {
    let name = normalize_domain_name(name);
    let zone = normalize_domain_name(zone_name);

    if name == "@" || name.is_empty() {
        return zone;
    }
    if full_name_to_relative(&name, &zone) != name {
        return name;
    }
    format!("{name}.{zone}")
}

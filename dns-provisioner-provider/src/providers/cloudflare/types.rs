//! Cloudflare API 类型定义

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cloudflare API 通用响应
#[derive(Debug, Deserialize)]
pub struct CloudflareResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub errors: Vec<CloudflareError>,
    pub result_info: Option<CloudflareResultInfo>,
}

#[derive(Debug, Deserialize)]
pub struct CloudflareError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CloudflareResultInfo {
    pub total_count: u32,
}

/// Cloudflare Zone 结构
#[derive(Debug, Deserialize)]
pub struct CloudflareZone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
}

/// Cloudflare DNS Record 结构（响应）
#[derive(Debug, Deserialize)]
pub struct CloudflareDnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    /// SRV content is the compound `"<weight> <port> <target>"`.
    #[serde(default)]
    pub content: Option<String>,
    pub ttl: u32,
    #[serde(default)]
    pub priority: Option<u16>,
    #[serde(default)]
    pub proxied: Option<bool>,
    /// SRV 记录的结构化数据
    #[serde(default)]
    pub data: Option<Value>,
}

/// SRV 记录的 data 字段
///
/// Cloudflare 要求将记录名拆分为 `service`、`proto` 和 `name`（即 zone）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudflareSrvData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// Request body for `POST /zones/{zone_id}/dns_records`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CreateRecordBody {
    /// A, MX, TXT, CNAME
    Flat {
        #[serde(rename = "type")]
        record_type: &'static str,
        name: String,
        content: String,
        ttl: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        priority: Option<u16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        proxied: Option<bool>,
    },
    /// SRV carries its fields in `data` instead of `content`.
    Srv {
        #[serde(rename = "type")]
        record_type: &'static str,
        name: String,
        ttl: u32,
        data: CloudflareSrvData,
    },
}

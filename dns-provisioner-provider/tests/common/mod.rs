//! 共享测试工具和辅助函数

#![allow(dead_code)]

use dns_provisioner_provider::CloudflareProvider;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";
pub const ZONE_ID: &str = "zone-1";
pub const ZONE_NAME: &str = "contoso.com";

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Cloudflare success envelope.
pub fn ok_envelope(result: Value) -> Value {
    json!({ "success": true, "errors": [], "messages": [], "result": result })
}

/// Cloudflare success envelope for a list, with paging info.
pub fn list_envelope(result: Value, page: u32, total_count: u32) -> Value {
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result,
        "result_info": { "page": page, "per_page": 100, "count": 0, "total_count": total_count }
    })
}

/// Cloudflare failure envelope with a single error entry.
pub fn error_envelope(code: i32, message: &str) -> Value {
    json!({
        "success": false,
        "errors": [{ "code": code, "message": message }],
        "messages": [],
        "result": null
    })
}

/// A mock server that already answers `GET /zones/{ZONE_ID}`.
pub async fn mock_server_with_zone() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/zones/{ZONE_ID}")))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!({
            "id": ZONE_ID,
            "name": ZONE_NAME,
            "status": "active"
        }))))
        .mount(&server)
        .await;
    server
}

#[allow(clippy::unwrap_used)]
pub fn provider_for(server: &MockServer) -> CloudflareProvider {
    CloudflareProvider::with_base_url(TOKEN.to_string(), server.uri()).unwrap()
}

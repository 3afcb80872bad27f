//! 统一错误类型定义

use serde::Serialize;
use thiserror::Error;

/// Errors that stop a query before any resolver is contacted.
///
/// Per-server failures are not errors; they are recorded as a
/// [`ServerOutcome`](crate::ServerOutcome) on the result.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ResolverError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// No resolver configured, or a resolver address that does not parse.
    #[error("Invalid resolver configuration: {0}")]
    InvalidServer(String),
}

/// Resolver Result 类型别名
pub type ResolverResult<T> = std::result::Result<T, ResolverError>;

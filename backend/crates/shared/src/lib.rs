//! # Propel 共有ユーティリティ
//!
//! このクレートは、Propel
//! プロジェクト全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, notify-service）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える（tracing 系は `observability` feature）

pub mod event_log;
pub mod health;
pub mod observability;
pub mod ok_response;

pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
pub use ok_response::OkResponse;

//! # HTTP リクエストハンドラ
//!
//! - 各ハンドラはサブモジュールに配置し、ここで re-export する
//! - ハンドラは薄く保ち、判定はユースケースとドメイン層に委譲する

pub mod health;
pub mod notification;

pub use health::{DatabasePing, ReadinessState, health_check, readiness_check};
pub use notification::{AUTHENTICATED_USER_HEADER, NotificationState, post_notification};

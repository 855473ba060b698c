//! # ドメイン層エラー定義
//!
//! 外部ストアから読んだ値が値オブジェクトの制約を満たさないときのエラー。
//!
//! 通知リクエストの拒否理由は
//! [`NotificationDenial`](crate::notification::NotificationDenial) が担い、
//! こちらはクライアントに返さない。
//!
//! ```rust
//! use propel_domain::{DomainError, user::Email};
//!
//! let result = Email::new("not-an-address");
//! assert!(matches!(result, Err(DomainError::InvalidEmail { .. })));
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// メールアドレスとして使えない値
    #[error("メールアドレスが不正です（{reason}）: {value:?}")]
    InvalidEmail { value: String, reason: &'static str },
}

impl DomainError {
    pub(crate) fn invalid_email(value: &str, reason: &'static str) -> Self {
        Self::InvalidEmail {
            value: value.to_string(),
            reason,
        }
    }
}

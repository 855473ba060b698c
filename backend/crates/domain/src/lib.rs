//! # Propel ドメイン層
//!
//! 通知の認可と配信に必要なドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: プロポジション、ページ、コメントなど（すべて外部ストアが所有し、ここでは読むだけ）
//! - **値オブジェクト**: ID、メールアドレス、ロケール
//! - **ドメインサービス**: 通知の認可エンジン（純粋関数）
//! - **ドメインエラー**: 形式不正と、クライアントに返す拒否理由
//!
//! ## 依存関係の方向
//!
//! ```text
//! notify-service → infra → domain
//!        ↘           ↘
//!          shared ←───┘
//! ```
//!
//! ドメイン層は DB や HTTP に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`notification`] - 通知イベント、ペイロードのパース、認可エンジン
//! - [`proposition`] - プロポジション、ボランティア、投票、ステータス表示名
//! - [`page`] - ページ、親ページ申請
//! - [`comment`] - コメント
//! - [`user`] - ユーザー ID、プロフィール、表示名
//! - [`locale`] - 通知メールのロケール
//!
//! ## 使用例
//!
//! ```rust
//! use propel_domain::{
//!     notification::{NotificationDenial, NotificationPayload, NotificationRequest},
//!     user::UserId,
//! };
//!
//! let payload = NotificationPayload {
//!     event_type: Some("status_done".to_string()),
//!     ..Default::default()
//! };
//!
//! let result = NotificationRequest::parse(&payload, &UserId::new());
//! assert_eq!(result, Err(NotificationDenial::MissingPropositionId));
//! ```

#[macro_use]
mod macros;

pub mod comment;
pub mod error;
pub mod locale;
pub mod notification;
pub mod page;
pub mod proposition;
pub mod user;

pub use error::DomainError;

//! # Propel インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理
//! - **リポジトリ実装**: 通知の認可・受信者解決に必要な行の読み取り
//! - **メール送信**: SMTP / SES / Resend / Noop の送信バックエンド
//!
//! このクレートは行を読むだけで、書き込みは行わない。
//! 通知レコード（アプリ内通知）は DB トリガー側の責務。
//!
//! ## 依存関係
//!
//! ```text
//! notify-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`notification`] - メール送信バックエンド
//! - [`repository`] - リポジトリ実装
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use propel_infra::{db, repository::PostgresPropositionRepository};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::create_pool("postgres://localhost/propel").await?;
//!     let propositions = PostgresPropositionRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};

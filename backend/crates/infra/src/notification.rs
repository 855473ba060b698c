//! # 通知送信
//!
//! メール通知の送信バックエンド。
//!
//! - **trait による抽象化**: [`NotificationSender`] でメール送信を抽象化
//! - **4 つの実装**: SMTP（Mailpit 開発用）、SES、Resend、Noop
//! - **環境変数切替**: `NOTIFICATION_BACKEND` で起動時に 1 つを選ぶ
//!
//! タイムアウトや再送はバックエンド側の責務で、呼び出し側は 1 回だけ送る。

mod noop;
mod resend;
mod ses;
mod smtp;

use async_trait::async_trait;
pub use noop::NoopNotificationSender;
use propel_domain::notification::{EmailMessage, NotificationError};
pub use resend::ResendNotificationSender;
pub use ses::SesNotificationSender;
pub use smtp::SmtpNotificationSender;

/// メール送信トレイト
///
/// 起動時に 1 度だけ構築し、`Arc<dyn NotificationSender>` として配信層へ渡す。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}

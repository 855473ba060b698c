//! 送信しないバックエンド
//!
//! `NOTIFICATION_BACKEND=noop`、または Resend の API キーが無いときに選ばれる。
//! 配信結果は常に成功として扱い、宛先と件名だけをログに残す。

use async_trait::async_trait;
use propel_domain::notification::{EmailMessage, NotificationError};

use super::NotificationSender;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        tracing::info!(
            notification.recipient = %email.to,
            notification.subject = %email.subject,
            html_bytes = email.html.len(),
            "送信バックエンド未設定のため配信を省略"
        );
        Ok(())
    }
}

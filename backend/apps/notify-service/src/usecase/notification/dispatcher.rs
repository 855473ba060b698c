//! # 配信ディスパッチャー
//!
//! レンダリング済みのメールを受信者全員へ送る。
//!
//! - 受信者ごとに `JoinSet` のタスクで並行に送り、全タスクの完了を待つ
//! - 1 件の失敗で残りを打ち切らない。失敗はログに出して数えるだけ
//! - 再送もキューイングもしない（1 回だけ送る）

use std::sync::Arc;

use propel_domain::notification::{EmailMessage, NotificationError, NotificationEventType};
use propel_infra::notification::NotificationSender;
use propel_shared::{
    event_log::{self, event},
    log_business_event,
};
use tokio::task::JoinSet;

use super::RenderedEmail;

/// 配信結果の集計（ログ用）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent:   usize,
    pub failed: usize,
}

/// 配信ディスパッチャー
#[derive(Clone)]
pub struct DeliveryDispatcher {
    sender: Arc<dyn NotificationSender>,
}

impl DeliveryDispatcher {
    pub fn new(sender: Arc<dyn NotificationSender>) -> Self {
        Self { sender }
    }

    /// 全受信者へ送信する
    ///
    /// 個々の送信結果は呼び出し側に返さない。
    pub async fn deliver_all(
        &self,
        event_type: NotificationEventType,
        recipients: Vec<String>,
        email: &RenderedEmail,
    ) -> DeliveryReport {
        let event_type_str: &'static str = event_type.into();
        let mut tasks = JoinSet::new();

        for to in recipients {
            let sender = Arc::clone(&self.sender);
            let message = EmailMessage {
                to,
                subject: email.subject.clone(),
                html: email.html.clone(),
            };
            tasks.spawn(async move {
                let result = sender.send_email(&message).await;
                (message.to, result)
            });
        }

        let mut report = DeliveryReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((recipient, Ok(()))) => {
                    report.sent += 1;
                    log_business_event!(
                        event.category = event::category::NOTIFICATION,
                        event.action = event::action::NOTIFICATION_SENT,
                        event.entity_type = event::entity_type::EMAIL,
                        event.result = event::result::SUCCESS,
                        notification.event_type = event_type_str,
                        notification.recipient = %recipient,
                        "通知メール送信成功"
                    );
                }
                Ok((recipient, Err(e))) => {
                    report.failed += 1;
                    log_failure(event_type_str, &recipient, &e);
                }
                Err(e) => {
                    // 送信タスクの panic も他の受信者には波及させない
                    report.failed += 1;
                    tracing::error!(
                        error.category = event_log::error::category::EXTERNAL_SERVICE,
                        error.kind = event_log::error::kind::INTERNAL,
                        notification.event_type = event_type_str,
                        "送信タスクが異常終了: {e}"
                    );
                }
            }
        }

        tracing::debug!(
            notification.event_type = event_type_str,
            sent = report.sent,
            failed = report.failed,
            "通知メール配信完了"
        );
        report
    }
}

fn log_failure(event_type: &'static str, recipient: &str, error: &NotificationError) {
    log_business_event!(
        event.category = event::category::NOTIFICATION,
        event.action = event::action::NOTIFICATION_FAILED,
        event.entity_type = event::entity_type::EMAIL,
        event.result = event::result::FAILURE,
        notification.event_type = event_type,
        notification.recipient = %recipient,
        error = %error,
        "通知メール送信失敗"
    );
}

//! Resend 通知送信実装
//!
//! Resend の HTTP API（`POST /emails`）を reqwest で呼び出す。

use async_trait::async_trait;
use propel_domain::notification::{EmailMessage, NotificationError};
use serde::Serialize;

use super::NotificationSender;

const DEFAULT_BASE_URL: &str = "https://api.resend.com";

/// Resend API のリクエストボディ
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from:    &'a str,
    to:      [&'a str; 1],
    subject: &'a str,
    html:    &'a str,
}

/// Resend 通知送信
#[derive(Clone)]
pub struct ResendNotificationSender {
    base_url:     String,
    api_key:      String,
    from_address: String,
    client:       reqwest::Client,
}

impl ResendNotificationSender {
    /// # 引数
    ///
    /// - `api_key`: Resend の API キー
    /// - `from_address`: 送信元アドレス（Resend で検証済みのドメインであること）
    pub fn new(api_key: String, from_address: String) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, from_address)
    }

    /// 接続先を差し替えて作成する（ローカルのスタブサーバー向け）
    pub fn with_base_url(base_url: &str, api_key: String, from_address: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            from_address,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationSender for ResendNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let url = format!("{}/emails", self.base_url);
        let request = SendEmailRequest {
            from:    &self.from_address,
            to:      [email.to.as_str()],
            subject: &email.subject,
            html:    &email.html,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(format!("Resend 接続失敗: {e}")))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(NotificationError::SendFailed(format!(
                    "Resend 送信失敗: status={status}, body={body}"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResendNotificationSender>();
    }

    #[test]
    fn test_リクエストボディのjson形状() {
        let request = SendEmailRequest {
            from:    "Propel <noreply@propel.example.com>",
            to:      ["author@example.com"],
            subject: "[Propel] New comment",
            html:    "<p>hi</p>",
        };

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "from": "Propel <noreply@propel.example.com>",
                "to": ["author@example.com"],
                "subject": "[Propel] New comment",
                "html": "<p>hi</p>",
            })
        );
    }

    #[test]
    fn test_base_urlの末尾スラッシュを取り除く() {
        let sender = ResendNotificationSender::with_base_url(
            "http://localhost:4010/",
            "key".to_string(),
            "noreply@propel.example.com".to_string(),
        );

        assert_eq!(sender.base_url, "http://localhost:4010");
    }
}

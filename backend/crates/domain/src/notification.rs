//! # 通知
//!
//! プロポジション・ページの状態変化に伴うメール通知のドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`NotificationEvent`] | 通知イベント | 9 種類。各バリアントが必須フィールドだけを持つ |
//! | [`NotificationRequest`] | 通知リクエスト | 操作者の検証とイベントのパースを終えたリクエスト |
//! | [`NotificationDenial`] | 拒否理由 | クライアントに返す契約上の文字列 |
//! | [`Verdict`] | 認可判定 | 許可（操作者付き）または拒否（理由付き） |
//!
//! ## 設計方針
//!
//! - **enum による通知イベント**: 文字列キーの分岐ではなく直和型 + 網羅的 match
//! - **認可と配信可否の分離**: 通知設定フラグは認可に影響しない
//! - **fire-and-forget**: 配信の失敗はクライアントに返さない（notify-service 側）
//! - **アプリ内通知は対象外**: DB トリガーが作るアプリ内通知には触れない。
//!   ここで扱うのはメール送信の副作用だけ

pub mod authorization;
mod denial;
mod event;

pub use authorization::{ResolvedResources, Verdict, authorize, verify_actor_claim};
pub use denial::{DenialKind, NotificationDenial};
pub use event::{NotificationEvent, NotificationEventType, NotificationPayload, NotificationRequest};
use thiserror::Error;

/// 通知送信エラー
///
/// 配信層の内部でのみ使い、レスポンスには現れない。
#[derive(Debug, Error)]
pub enum NotificationError {
    /// 送信バックエンドが設定されていない
    #[error("送信バックエンドが未設定: {0}")]
    NotConfigured(String),

    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

/// メールメッセージ
///
/// 送信コラボレーター `sendEmail({to, subject, html})` の引数に対応する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:      String,
    /// 件名
    pub subject: String,
    /// HTML 本文
    pub html:    String,
}

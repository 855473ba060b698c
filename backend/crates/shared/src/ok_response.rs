//! # 通知 API のレスポンス形式
//!
//! 通知エンドポイントは成功時 `{ "ok": true }`、失敗時
//! `{ "ok": false, "error": "<理由>" }` を返す。
//! 失敗理由の文字列は呼び出し側がそのまま判定に使うため、加工しない。
//!
//! axum の `IntoResponse` 変換は notify-service の責務（shared に axum 依存を入れない）。

use serde::{Deserialize, Serialize};

/// 通知 API のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok:    bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OkResponse {
    /// 成功（送信を行わなかった場合も含む）
    pub fn ok() -> Self {
        Self {
            ok:    true,
            error: None,
        }
    }

    /// 失敗
    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            ok:    false,
            error: Some(reason.into()),
        }
    }
}

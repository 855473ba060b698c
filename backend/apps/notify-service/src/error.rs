//! # Notify Service エラー定義
//!
//! 通知サービス固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! レスポンスボディは常に `{ "ok": false, "error": "<理由>" }`。
//! 拒否理由の文字列はクライアントとの契約のため加工しない。
//! インフラエラーの詳細はログにだけ出し、ボディには固定文言を返す。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use propel_domain::notification::{DenialKind, NotificationDenial};
use propel_infra::InfraError;
use propel_shared::{
    OkResponse,
    event_log::error::{category, kind},
};
use thiserror::Error;

/// 内部エラー時にクライアントへ返す文言
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

/// Notify Service で発生するエラー
#[derive(Debug, Error)]
pub enum NotifyError {
    /// 不正なリクエスト（JSON 形式不正など）
    #[error("{0}")]
    BadRequest(String),

    /// 認証されていない、または署名が不正
    #[error("{0}")]
    Unauthorized(String),

    /// Origin が許可されていない
    #[error("{0}")]
    ForbiddenOrigin(String),

    /// 通知リクエストの拒否
    #[error(transparent)]
    Denied(#[from] NotificationDenial),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Infra(#[from] InfraError),
}

impl NotifyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::ForbiddenOrigin(_) => StatusCode::FORBIDDEN,
            Self::Denied(denial) => match denial.kind() {
                DenialKind::InvalidPayload => StatusCode::BAD_REQUEST,
                DenialKind::Forbidden => StatusCode::FORBIDDEN,
            },
            Self::Infra(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for NotifyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let reason = match &self {
            Self::Infra(e) => {
                tracing::error!(
                    error.category = category::INFRASTRUCTURE,
                    error.kind = kind::DATABASE,
                    span_trace = %e.span_trace(),
                    "データベースエラー: {}",
                    e
                );
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(OkResponse::error(reason))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[case(NotificationDenial::ForbiddenActorUserId, StatusCode::FORBIDDEN)]
    #[case(NotificationDenial::CommentPropositionMismatch, StatusCode::FORBIDDEN)]
    #[case(NotificationDenial::MissingProposition, StatusCode::FORBIDDEN)]
    #[case(NotificationDenial::MissingCommentPayload, StatusCode::BAD_REQUEST)]
    #[case(NotificationDenial::MissingPropositionId, StatusCode::BAD_REQUEST)]
    #[case(NotificationDenial::UnsupportedType, StatusCode::BAD_REQUEST)]
    fn test_拒否理由の種類でステータスが決まる(
        #[case] denial: NotificationDenial,
        #[case] expected: StatusCode,
    ) {
        assert_eq!(NotifyError::Denied(denial).status(), expected);
    }

    #[tokio::test]
    async fn test_拒否理由はそのままボディに載る() {
        let response = NotifyError::Denied(NotificationDenial::ForbiddenSolutionActor).into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "ok": false, "error": "Forbidden solution actor." })
        );
    }

    #[tokio::test]
    async fn test_インフラエラーの詳細はボディに出さない() {
        let response = NotifyError::Infra(InfraError::unexpected("接続が切れた")).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "ok": false, "error": "Internal server error." })
        );
    }
}

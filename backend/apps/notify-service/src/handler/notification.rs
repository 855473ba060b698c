//! # 通知ハンドラ
//!
//! `POST /internal/notifications`
//!
//! 1. `X-Authenticated-User-Id`（上流のセッション層が付与）から認証済みユーザーを得る
//! 2. ボディを JSON としてパースする
//! 3. ユースケースで認可・配信し、認可を通れば `{ "ok": true }` を返す
//!
//! 配信の成否はレスポンスに現れない。

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use propel_domain::{notification::NotificationPayload, user::UserId};
use propel_shared::OkResponse;

use crate::{error::NotifyError, usecase::NotificationUseCase};

/// 認証済みユーザー ID を運ぶヘッダー
pub const AUTHENTICATED_USER_HEADER: &str = "x-authenticated-user-id";

const UNAUTHENTICATED: &str = "Unauthenticated.";
const INVALID_JSON: &str = "Invalid JSON payload.";

/// 通知ハンドラの State
pub struct NotificationState {
    pub usecase: NotificationUseCase,
}

/// 通知リクエストを受け付ける
#[tracing::instrument(skip_all)]
pub async fn post_notification(
    State(state): State<Arc<NotificationState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<OkResponse>, NotifyError> {
    let authenticated_user_id = extract_authenticated_user(&headers)?;

    let payload: NotificationPayload = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "通知ペイロードの JSON パースに失敗");
        NotifyError::BadRequest(INVALID_JSON.to_string())
    })?;

    let outcome = state
        .usecase
        .handle(&payload, &authenticated_user_id)
        .await?;
    tracing::debug!(?outcome, "通知リクエストを処理");

    Ok(Json(OkResponse::ok()))
}

/// ヘッダーから認証済みユーザー ID を取り出す
fn extract_authenticated_user(headers: &HeaderMap) -> Result<UserId, NotifyError> {
    headers
        .get(AUTHENTICATED_USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(UserId::parse)
        .ok_or_else(|| NotifyError::Unauthorized(UNAUTHENTICATED.to_string()))
}

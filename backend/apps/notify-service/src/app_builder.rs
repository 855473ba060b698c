//! # アプリケーション構築
//!
//! 送信バックエンドの選択と、State・ミドルウェア・ルーターの組み立てを担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use propel_infra::notification::{
    NoopNotificationSender,
    NotificationSender,
    ResendNotificationSender,
    SesNotificationSender,
    SmtpNotificationSender,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    config::{NotificationBackend, NotificationConfig, NotifyConfig},
    handler::{
        NotificationState,
        ReadinessState,
        health_check,
        post_notification,
        readiness_check,
    },
    middleware::{OriginState, SignatureState, verify_origin, verify_signature},
    usecase::{NotificationRepositories, NotificationUseCase, TemplateRenderer},
};

/// 通知エンドポイントのパス
pub const NOTIFICATIONS_PATH: &str = "/internal/notifications";

/// 設定に応じた送信バックエンドを構築する
///
/// `resend` で API キーが無い場合は警告を出して Noop に落とす。
pub async fn build_sender(config: &NotificationConfig) -> Arc<dyn NotificationSender> {
    let from = config.from_address.clone();
    match config.backend {
        NotificationBackend::Smtp => {
            tracing::info!(
                "通知バックエンド: SMTP ({}:{})",
                config.smtp_host,
                config.smtp_port
            );
            Arc::new(SmtpNotificationSender::new(
                &config.smtp_host,
                config.smtp_port,
                from,
            ))
        }
        NotificationBackend::Ses => {
            tracing::info!("通知バックエンド: SES");
            Arc::new(SesNotificationSender::from_env(from).await)
        }
        NotificationBackend::Resend => match &config.resend_api_key {
            Some(api_key) => {
                tracing::info!("通知バックエンド: Resend");
                Arc::new(ResendNotificationSender::new(api_key.clone(), from))
            }
            None => {
                tracing::warn!("RESEND_API_KEY が未設定のため、通知メールを送信しません");
                Arc::new(NoopNotificationSender)
            }
        },
        NotificationBackend::Noop => {
            tracing::info!("通知バックエンド: Noop（送信しない）");
            Arc::new(NoopNotificationSender)
        }
    }
}

/// ルーターを構築する
///
/// レイヤー順序（下に書いたものが外側）:
/// Request ID 付与 → `TraceLayer` → Request ID 伝播 → Origin 検証 → 署名検証（設定時のみ） → ハンドラ
pub fn build_app(
    config: &NotifyConfig,
    repos: NotificationRepositories,
    sender: Arc<dyn NotificationSender>,
    renderer: Arc<TemplateRenderer>,
    readiness_state: Arc<ReadinessState>,
) -> Router {
    let notification_state = Arc::new(NotificationState {
        usecase: NotificationUseCase::new(repos, sender, renderer, config.app_url.clone()),
    });

    // 署名検証が有効ならサーバー間呼び出しとみなし、Origin ヘッダー無しを許容する
    let origin_state = OriginState::new(
        config.allowed_origins.clone(),
        config.signing_secret.is_none(),
    );

    let mut notifications = Router::new()
        .route(NOTIFICATIONS_PATH, post(post_notification))
        .with_state(notification_state);
    if let Some(secret) = &config.signing_secret {
        notifications = notifications.layer(from_fn_with_state(
            SignatureState::new(secret.as_bytes()),
            verify_signature,
        ));
    }
    let notifications = notifications.layer(from_fn_with_state(origin_state, verify_origin));

    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(notifications)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

//! # Propel Notify Service サーバー
//!
//! Web アプリから届く通知リクエストを認可し、メールを配信する内部サービス。
//!
//! ## 役割
//!
//! - **認可**: 通知を主張する操作者が、本当にそのイベントを起こした当事者かを判定する
//! - **配信**: 受信者を解決し、ロケール別のメールを送る（失敗はログのみ）
//!
//! アプリ内通知のレコードは DB トリガーが作るため、このサービスは DB を読むだけ。
//!
//! ```text
//! ┌──────────────┐  Origin + 署名   ┌────────────────┐     ┌──────────────┐
//! │   Web App    │────────────────▶│ Notify Service │────▶│  PostgreSQL  │
//! └──────────────┘                  └────────────────┘     └──────────────┘
//!                                           │
//!                                           ▼
//!                                  SMTP / SES / Resend
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `NOTIFY_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `NOTIFY_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `APP_URL` | No | メール内リンクのベース URL |
//! | `ALLOWED_ORIGINS` | No | 許可する `Origin`（カンマ区切り） |
//! | `NOTIFY_SIGNING_SECRET` | No | リクエスト署名の共有シークレット |
//! | `NOTIFICATION_BACKEND` | No | `smtp` / `ses` / `resend` / `noop` |
//!
//! ## 起動方法
//!
//! ```bash
//! NOTIFY_PORT=3100 DATABASE_URL=postgres://... cargo run -p propel-notify-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use propel_infra::{
    db,
    repository::{
        PostgresCommentRepository,
        PostgresPageRepository,
        PostgresParticipationRepository,
        PostgresProfileRepository,
        PostgresPropositionRepository,
        PostgresSubscriptionRepository,
    },
};
use propel_notify_service::{
    app_builder::{build_app, build_sender},
    config::NotifyConfig,
    handler::ReadinessState,
    usecase::{NotificationRepositories, TemplateRenderer},
};
use propel_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Notify Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("notify-service");
    init_tracing(&tracing_config);

    let config = NotifyConfig::from_env()?;

    tracing::info!(
        "Notify Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("データベースに接続しました");

    let repos = NotificationRepositories {
        propositions:   Arc::new(PostgresPropositionRepository::new(pool.clone())),
        pages:          Arc::new(PostgresPageRepository::new(pool.clone())),
        comments:       Arc::new(PostgresCommentRepository::new(pool.clone())),
        participations: Arc::new(PostgresParticipationRepository::new(pool.clone())),
        subscriptions:  Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        profiles:       Arc::new(PostgresProfileRepository::new(pool.clone())),
    };
    let sender = build_sender(&config.notification).await;
    let renderer = Arc::new(TemplateRenderer::new()?);
    let readiness_state = Arc::new(ReadinessState {
        database: Arc::new(pool),
    });

    let app = build_app(&config, repos, sender, renderer, readiness_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Notify Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

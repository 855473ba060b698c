//! # SubscriptionRepository
//!
//! ページ・プロポジションの購読者一覧を取得するリポジトリ。
//! ステータス変更系の通知のブロードキャスト先になる。

use async_trait::async_trait;
use propel_domain::{page::PageId, proposition::PropositionId, user::UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// 購読リポジトリトレイト
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// プロポジションの購読者 ID 一覧
    async fn find_proposition_subscribers(
        &self,
        proposition_id: &PropositionId,
    ) -> Result<Vec<UserId>, InfraError>;

    /// ページの購読者 ID 一覧
    async fn find_page_subscribers(&self, page_id: &PageId) -> Result<Vec<UserId>, InfraError>;
}

/// PostgreSQL 実装の SubscriptionRepository
#[derive(Debug, Clone)]
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%proposition_id))]
    async fn find_proposition_subscribers(
        &self,
        proposition_id: &PropositionId,
    ) -> Result<Vec<UserId>, InfraError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT user_id
            FROM proposition_subscriptions
            WHERE proposition_id = $1
            "#,
        )
        .bind(proposition_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%page_id))]
    async fn find_page_subscribers(&self, page_id: &PageId) -> Result<Vec<UserId>, InfraError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT user_id
            FROM page_subscriptions
            WHERE page_id = $1
            "#,
        )
        .bind(page_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }
}

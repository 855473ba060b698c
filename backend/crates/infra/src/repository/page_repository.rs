//! # PageRepository
//!
//! ページと親ページ申請の読み取りを担当するリポジトリ。
//!
//! 外部ストアの API ではページの関連が単体またはリストで返ることがあったが、
//! このリポジトリは常に単一の `Option<Page>` に正規化して返す。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use propel_domain::{
    page::{Page, PageId, PageParentRequest, PageParentRequestId, PageRecord},
    user::UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// ページリポジトリトレイト
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// ID でページを検索
    async fn find_by_id(&self, id: &PageId) -> Result<Option<Page>, InfraError>;

    /// (親, 子) の組に対する最新の親ページ申請を取得
    ///
    /// 同じ組で複数回申請された場合は `created_at` が最も新しいものを返す。
    async fn find_latest_parent_request(
        &self,
        parent_page_id: &PageId,
        child_page_id: &PageId,
    ) -> Result<Option<PageParentRequest>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct PageRow {
    id:                   Uuid,
    name:                 String,
    slug:                 String,
    owner_id:             Option<Uuid>,
    owner_notify_daily:   bool,
    owner_vote_threshold: Option<i32>,
}

impl From<PageRow> for Page {
    fn from(row: PageRow) -> Self {
        Page::from_db(PageRecord {
            id:                   PageId::from_uuid(row.id),
            name:                 row.name,
            slug:                 row.slug,
            owner_id:             row.owner_id.map(UserId::from_uuid),
            owner_notify_daily:   row.owner_notify_daily,
            owner_vote_threshold: row.owner_vote_threshold,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PageParentRequestRow {
    id:             Uuid,
    parent_page_id: Uuid,
    child_page_id:  Uuid,
    requested_by:   Uuid,
    created_at:     DateTime<Utc>,
}

impl From<PageParentRequestRow> for PageParentRequest {
    fn from(row: PageParentRequestRow) -> Self {
        PageParentRequest {
            id:             PageParentRequestId::from_uuid(row.id),
            parent_page_id: PageId::from_uuid(row.parent_page_id),
            child_page_id:  PageId::from_uuid(row.child_page_id),
            requested_by:   UserId::from_uuid(row.requested_by),
            created_at:     row.created_at,
        }
    }
}

/// PostgreSQL 実装の PageRepository
#[derive(Debug, Clone)]
pub struct PostgresPageRepository {
    pool: PgPool,
}

impl PostgresPageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PageRepository for PostgresPageRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &PageId) -> Result<Option<Page>, InfraError> {
        let row = sqlx::query_as::<_, PageRow>(
            r#"
            SELECT
                id,
                name,
                slug,
                owner_id,
                COALESCE(owner_notify_daily, FALSE) AS owner_notify_daily,
                owner_vote_threshold
            FROM pages
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Page::from))
    }

    #[tracing::instrument(
        skip_all,
        level = "debug",
        fields(%parent_page_id, %child_page_id)
    )]
    async fn find_latest_parent_request(
        &self,
        parent_page_id: &PageId,
        child_page_id: &PageId,
    ) -> Result<Option<PageParentRequest>, InfraError> {
        let row = sqlx::query_as::<_, PageParentRequestRow>(
            r#"
            SELECT
                id,
                parent_page_id,
                child_page_id,
                requested_by,
                created_at
            FROM page_parent_requests
            WHERE parent_page_id = $1 AND child_page_id = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(parent_page_id.as_uuid())
        .bind(child_page_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PageParentRequest::from))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresPageRepository>();
    }

    #[test]
    fn test_オーナー不在のページを復元できる() {
        let row = PageRow {
            id: Uuid::now_v7(),
            name: "Propel".to_string(),
            slug: "propel".to_string(),
            owner_id: None,
            owner_notify_daily: false,
            owner_vote_threshold: Some(10),
        };

        let page = Page::from(row);

        assert_eq!(page.slug(), "propel");
        assert_eq!(page.owner_id(), None);
        assert_eq!(page.owner_vote_threshold(), Some(10));
    }
}

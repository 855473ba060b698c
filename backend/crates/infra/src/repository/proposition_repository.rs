//! # PropositionRepository
//!
//! プロポジションの読み取りを担当するリポジトリ。

use async_trait::async_trait;
use propel_domain::{
    page::PageId,
    proposition::{NotificationPreferences, Proposition, PropositionId, PropositionRecord},
    user::UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// プロポジションリポジトリトレイト
#[async_trait]
pub trait PropositionRepository: Send + Sync {
    /// ID でプロポジションを検索
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(proposition))`: 見つかった場合
    /// - `Ok(None)`: 見つからない場合
    /// - `Err(_)`: データベースエラー
    async fn find_by_id(&self, id: &PropositionId) -> Result<Option<Proposition>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct PropositionRow {
    id:                Uuid,
    title:             String,
    author_id:         Uuid,
    page_id:           Option<Uuid>,
    notify_comments:   bool,
    notify_volunteers: bool,
    notify_solutions:  bool,
}

impl From<PropositionRow> for Proposition {
    fn from(row: PropositionRow) -> Self {
        Proposition::from_db(PropositionRecord {
            id:          PropositionId::from_uuid(row.id),
            title:       row.title,
            author_id:   UserId::from_uuid(row.author_id),
            page_id:     row.page_id.map(PageId::from_uuid),
            preferences: NotificationPreferences {
                notify_comments:   row.notify_comments,
                notify_volunteers: row.notify_volunteers,
                notify_solutions:  row.notify_solutions,
            },
        })
    }
}

/// PostgreSQL 実装の PropositionRepository
#[derive(Debug, Clone)]
pub struct PostgresPropositionRepository {
    pool: PgPool,
}

impl PostgresPropositionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropositionRepository for PostgresPropositionRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &PropositionId) -> Result<Option<Proposition>, InfraError> {
        // 通知設定の列は NULL 許容のため、未設定は「通知する」として読む
        let row = sqlx::query_as::<_, PropositionRow>(
            r#"
            SELECT
                id,
                title,
                author_id,
                page_id,
                COALESCE(notify_comments, TRUE) AS notify_comments,
                COALESCE(notify_volunteers, TRUE) AS notify_volunteers,
                COALESCE(notify_solutions, TRUE) AS notify_solutions
            FROM propositions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Proposition::from))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresPropositionRepository>();
    }

    #[test]
    fn test_行からオーファンのプロポジションを復元できる() {
        let id = Uuid::now_v7();
        let author = Uuid::now_v7();
        let row = PropositionRow {
            id,
            title: "ダークモード".to_string(),
            author_id: author,
            page_id: None,
            notify_comments: true,
            notify_volunteers: false,
            notify_solutions: true,
        };

        let proposition = Proposition::from(row);

        assert_eq!(proposition.id(), &PropositionId::from_uuid(id));
        assert_eq!(proposition.author_id(), &UserId::from_uuid(author));
        assert!(proposition.is_orphan());
        assert!(!proposition.preferences().notify_volunteers);
    }
}

//! # CommentRepository
//!
//! コメントの読み取りを担当するリポジトリ。

use async_trait::async_trait;
use propel_domain::{
    comment::{Comment, CommentId},
    proposition::PropositionId,
    user::UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// コメントリポジトリトレイト
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// ID でコメントを検索
    ///
    /// プロポジションとの突き合わせは認可エンジンで行うため、
    /// ここでは ID のみで引く。
    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id:             Uuid,
    proposition_id: Uuid,
    user_id:        Uuid,
    is_solution:    bool,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment::new(
            CommentId::from_uuid(row.id),
            PropositionId::from_uuid(row.proposition_id),
            UserId::from_uuid(row.user_id),
            row.is_solution,
        )
    }
}

/// PostgreSQL 実装の CommentRepository
#[derive(Debug, Clone)]
pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, InfraError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT
                id,
                proposition_id,
                user_id,
                COALESCE(is_solution, FALSE) AS is_solution
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Comment::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresCommentRepository>();
    }
}

//! # ParticipationRepository
//!
//! ボランティアと投票の存在確認を担当するリポジトリ。
//! どちらも (プロポジション, ユーザー) の組で一意。

use async_trait::async_trait;
use propel_domain::{
    proposition::{PropositionId, Volunteer, Vote},
    user::UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// 参加（ボランティア・投票）リポジトリトレイト
#[async_trait]
pub trait ParticipationRepository: Send + Sync {
    /// (プロポジション, ユーザー) のボランティア行を検索
    async fn find_volunteer(
        &self,
        proposition_id: &PropositionId,
        user_id: &UserId,
    ) -> Result<Option<Volunteer>, InfraError>;

    /// (プロポジション, ユーザー) の投票行を検索
    async fn find_vote(
        &self,
        proposition_id: &PropositionId,
        user_id: &UserId,
    ) -> Result<Option<Vote>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct ParticipationRow {
    proposition_id: Uuid,
    user_id:        Uuid,
}

/// PostgreSQL 実装の ParticipationRepository
#[derive(Debug, Clone)]
pub struct PostgresParticipationRepository {
    pool: PgPool,
}

impl PostgresParticipationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipationRepository for PostgresParticipationRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%proposition_id, %user_id))]
    async fn find_volunteer(
        &self,
        proposition_id: &PropositionId,
        user_id: &UserId,
    ) -> Result<Option<Volunteer>, InfraError> {
        let row = sqlx::query_as::<_, ParticipationRow>(
            r#"
            SELECT proposition_id, user_id
            FROM volunteers
            WHERE proposition_id = $1 AND user_id = $2
            LIMIT 1
            "#,
        )
        .bind(proposition_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Volunteer {
            proposition_id: PropositionId::from_uuid(r.proposition_id),
            user_id:        UserId::from_uuid(r.user_id),
        }))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%proposition_id, %user_id))]
    async fn find_vote(
        &self,
        proposition_id: &PropositionId,
        user_id: &UserId,
    ) -> Result<Option<Vote>, InfraError> {
        let row = sqlx::query_as::<_, ParticipationRow>(
            r#"
            SELECT proposition_id, user_id
            FROM votes
            WHERE proposition_id = $1 AND user_id = $2
            LIMIT 1
            "#,
        )
        .bind(proposition_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Vote {
            proposition_id: PropositionId::from_uuid(r.proposition_id),
            user_id:        UserId::from_uuid(r.user_id),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresParticipationRepository>();
    }
}

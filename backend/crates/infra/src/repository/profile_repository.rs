//! # ProfileRepository
//!
//! `profiles` ディレクトリからユーザーの表示名とメールアドレスを引く。
//!
//! メールアドレスが形式不正な行はエラーにせず、アドレス無しとして扱う。
//! 受信者解決では「アドレスが無い購読者は黙って除外」が契約のため。

use async_trait::async_trait;
use propel_domain::user::{Email, UserId, UserProfile};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// プロフィールリポジトリトレイト
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// 複数の ID でプロフィールを一括検索
    ///
    /// 存在しない ID は無視し、見つかったプロフィールのみ返す。
    /// 空の配列を渡した場合はクエリを発行せず空の Vec を返す。
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id:        Uuid,
    username:  Option<String>,
    full_name: Option<String>,
    email:     Option<String>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        let email = row.email.and_then(|raw| match Email::new(raw) {
            Ok(email) => Some(email),
            Err(e) => {
                tracing::debug!(user_id = %row.id, error = %e, "メールアドレスが不正なため除外");
                None
            }
        });
        UserProfile::new(UserId::from_uuid(row.id), row.username, row.full_name, email)
    }
}

/// PostgreSQL 実装の ProfileRepository
#[derive(Debug, Clone)]
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(count = ids.len()))]
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, InfraError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, username, full_name, email
            FROM profiles
            WHERE id = ANY($1)
            "#,
        )
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserProfile::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresProfileRepository>();
    }

    #[test]
    fn test_形式不正なメールアドレスはアドレス無しとして読む() {
        let row = ProfileRow {
            id:        Uuid::now_v7(),
            username:  Some("alice".to_string()),
            full_name: None,
            email:     Some("not-an-email".to_string()),
        };

        let profile = UserProfile::from(row);

        assert_eq!(profile.email(), None);
        assert_eq!(profile.display_name(), "alice");
    }

    #[test]
    fn test_正しいメールアドレスはそのまま読む() {
        let row = ProfileRow {
            id:        Uuid::now_v7(),
            username:  None,
            full_name: None,
            email:     Some("bob@example.com".to_string()),
        };

        let profile = UserProfile::from(row);

        assert_eq!(profile.email().map(Email::as_str), Some("bob@example.com"));
        assert_eq!(profile.display_name(), "bob@example.com");
    }
}

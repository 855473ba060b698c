//! # リソースリゾルバ
//!
//! 通知種別ごとに、認可判定に必要な行だけを読み込む。
//!
//! - 見つからない行はエラーにせず `None` のまま返す（拒否理由への変換は認可エンジン）
//! - 互いに依存しない読み込みは `tokio::try_join!` で並行に発行する
//! - ページの関連は常に単一の `Option<Page>` に正規化する

use propel_domain::{
    notification::{NotificationEvent, NotificationRequest, ResolvedResources},
    page::Page,
    proposition::{Proposition, PropositionId},
};
use propel_infra::InfraError;

use super::NotificationRepositories;

/// リソースリゾルバ
#[derive(Clone)]
pub struct ResourceResolver {
    repos: NotificationRepositories,
}

impl ResourceResolver {
    pub fn new(repos: NotificationRepositories) -> Self {
        Self { repos }
    }

    /// リクエストの種別に応じて行を読み込む
    #[tracing::instrument(skip_all, level = "debug", fields(event_type = %request.event.event_type()))]
    pub async fn resolve(
        &self,
        request: &NotificationRequest,
    ) -> Result<ResolvedResources, InfraError> {
        let actor = &request.actor;
        let mut resources = ResolvedResources::default();

        match &request.event {
            NotificationEvent::PageParentRequest {
                parent_page_id,
                child_page_id,
            } => {
                resources.parent_request = self
                    .repos
                    .pages
                    .find_latest_parent_request(parent_page_id, child_page_id)
                    .await?;
            }
            NotificationEvent::CommentCreated { comment_id, .. } => {
                resources.comment = self.repos.comments.find_by_id(comment_id).await?;
            }
            NotificationEvent::SolutionMarked {
                proposition_id,
                comment_id,
            }
            | NotificationEvent::SolutionUnmarked {
                proposition_id,
                comment_id,
            } => {
                let (comment, (proposition, linked_page)) = tokio::try_join!(
                    self.repos.comments.find_by_id(comment_id),
                    self.proposition_with_page(proposition_id),
                )?;
                resources.comment = comment;
                resources.proposition = proposition;
                resources.linked_page = linked_page;
            }
            NotificationEvent::VolunteerCreated { proposition_id } => {
                resources.volunteer = self
                    .repos
                    .participations
                    .find_volunteer(proposition_id, actor)
                    .await?;
            }
            NotificationEvent::StatusDone { proposition_id }
            | NotificationEvent::StatusChange { proposition_id, .. } => {
                let (proposition, linked_page) = self.proposition_with_page(proposition_id).await?;
                resources.proposition = proposition;
                resources.linked_page = linked_page;
            }
            NotificationEvent::PropositionCreatedLinked { proposition_id } => {
                resources.proposition = self.repos.propositions.find_by_id(proposition_id).await?;
            }
            NotificationEvent::OwnerVoteThreshold { proposition_id } => {
                resources.vote = self
                    .repos
                    .participations
                    .find_vote(proposition_id, actor)
                    .await?;
            }
        }

        Ok(resources)
    }

    /// プロポジションと、紐づくページ（あれば）を読み込む
    ///
    /// 管理者の判定に使うため、ページは毎回読み直す（キャッシュしない）。
    async fn proposition_with_page(
        &self,
        proposition_id: &PropositionId,
    ) -> Result<(Option<Proposition>, Option<Page>), InfraError> {
        let Some(proposition) = self.repos.propositions.find_by_id(proposition_id).await? else {
            return Ok((None, None));
        };
        let linked_page = match proposition.page_id() {
            Some(page_id) => self.repos.pages.find_by_id(page_id).await?,
            None => None,
        };
        Ok((Some(proposition), linked_page))
    }
}

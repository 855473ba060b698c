//! # 受信者・本文パラメータの解決
//!
//! 認可を通過したイベントについて、誰に何を送るかを決める。
//!
//! ## 受信者の形
//!
//! - **個別**: コメント投稿 → 作者、ソリューション → コメント投稿者、
//!   ボランティア → 作者、ページ付き作成・投票しきい値 → ページオーナー、
//!   親ページ申請 → 操作者でない側のページオーナー
//! - **ブロードキャスト**: `status_change` → 作者 + プロポジション購読者、
//!   `status_done` → さらにページ購読者（ページ付きの場合）
//!
//! 受信者 ID は 1 バッチ内で重複を除き、メールアドレスの無いユーザーは黙って除外する。
//!
//! ## 送信の見送り
//!
//! 通知設定が無効、オーナー不在、宛先なしの場合は [`RecipientPlan::Suppressed`] を返す。
//! 呼び出し側には `{ok:true}` を返す。

use itertools::Itertools;
use propel_domain::{
    locale::Locale,
    notification::{NotificationEvent, NotificationEventType, NotificationRequest, ResolvedResources},
    page::{Page, PageId},
    proposition::{Proposition, PropositionId, STATUS_DONE, status_label},
    user::{UserId, display_name_or_anonymous},
};
use propel_infra::InfraError;

use super::NotificationRepositories;

/// 送信を見送った理由（ログ用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// プロポジションの通知設定で無効化されている
    PreferenceDisabled,
    /// ボランティア通知はオーファンのプロポジションのみ
    LinkedToPage,
    /// ページに紐づいていない
    NotLinkedToPage,
    /// ページオーナーがダイジェストを選んでいる、またはしきい値が未設定
    InstantAlertsOff,
    /// 対象の行が見つからない
    ResourceMissing,
    /// 通知すべき相手がいない
    NoRecipient,
    /// 受信者にメールアドレスが無い
    NoRecipientEmail,
}

impl SuppressReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreferenceDisabled => "preference_disabled",
            Self::LinkedToPage => "linked_to_page",
            Self::NotLinkedToPage => "not_linked_to_page",
            Self::InstantAlertsOff => "instant_alerts_off",
            Self::ResourceMissing => "resource_missing",
            Self::NoRecipient => "no_recipient",
            Self::NoRecipientEmail => "no_recipient_email",
        }
    }
}

/// テンプレートに渡すパラメータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageParams {
    pub event_type:        NotificationEventType,
    pub locale:            Locale,
    /// 操作者の表示名
    pub actor_name:        String,
    /// Web アプリへのリンク
    pub link:              String,
    pub proposition_title: Option<String>,
    pub page_name:         Option<String>,
    pub child_page_name:   Option<String>,
    /// ロケールに応じたステータス表示名
    pub status_label:      Option<String>,
}

/// 受信者解決の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientPlan {
    /// 送信を見送る
    Suppressed(SuppressReason),
    /// 宛先（メールアドレス）と本文パラメータ
    Deliver {
        recipients: Vec<String>,
        params:     MessageParams,
    },
}

/// 受信者と本文パラメータを決める
#[derive(Clone)]
pub struct RecipientResolver {
    repos:   NotificationRepositories,
    app_url: String,
}

/// 宛先と本文の元になる情報（メールアドレス解決前）
struct Draft {
    recipient_ids:     Vec<UserId>,
    link:              String,
    proposition_title: Option<String>,
    page_name:         Option<String>,
    child_page_name:   Option<String>,
    status_label:      Option<String>,
}

impl Draft {
    fn for_proposition(link: String, proposition: &Proposition, recipient_ids: Vec<UserId>) -> Self {
        Self {
            recipient_ids,
            link,
            proposition_title: Some(proposition.title().to_string()),
            page_name: None,
            child_page_name: None,
            status_label: None,
        }
    }
}

impl RecipientResolver {
    pub fn new(repos: NotificationRepositories, app_url: impl Into<String>) -> Self {
        Self {
            repos,
            app_url: app_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 認可済みリクエストの受信者と本文パラメータを決める
    ///
    /// `resources` はリソースリゾルバが読んだ行。足りない行はここで追加で読む。
    #[tracing::instrument(skip_all, level = "debug", fields(event_type = %request.event.event_type()))]
    pub async fn plan(
        &self,
        request: &NotificationRequest,
        resources: &ResolvedResources,
    ) -> Result<RecipientPlan, InfraError> {
        let draft = match self.draft(request, resources).await? {
            Ok(draft) => draft,
            Err(reason) => return Ok(RecipientPlan::Suppressed(reason)),
        };

        let recipient_ids: Vec<UserId> = draft.recipient_ids.into_iter().unique().collect();
        if recipient_ids.is_empty() {
            return Ok(RecipientPlan::Suppressed(SuppressReason::NoRecipient));
        }

        let mut lookup_ids = recipient_ids.clone();
        if !lookup_ids.contains(&request.actor) {
            lookup_ids.push(request.actor.clone());
        }
        let profiles = self.repos.profiles.find_by_ids(&lookup_ids).await?;

        // 受信者の順序を保ったまま、アドレスのあるユーザーだけを残す
        let recipients: Vec<String> = recipient_ids
            .iter()
            .filter_map(|id| profiles.iter().find(|p| p.id() == id))
            .filter_map(|p| p.email())
            .map(|email| email.as_str().to_string())
            .unique()
            .collect();
        if recipients.is_empty() {
            return Ok(RecipientPlan::Suppressed(SuppressReason::NoRecipientEmail));
        }

        let actor_profile = profiles.iter().find(|p| p.id() == &request.actor);

        Ok(RecipientPlan::Deliver {
            recipients,
            params: MessageParams {
                event_type:        request.event.event_type(),
                locale:            request.locale,
                actor_name:        display_name_or_anonymous(actor_profile).to_string(),
                link:              draft.link,
                proposition_title: draft.proposition_title,
                page_name:         draft.page_name,
                child_page_name:   draft.child_page_name,
                status_label:      draft.status_label,
            },
        })
    }

    /// 種別ごとの受信者 ID とリンクを決める
    ///
    /// 外側の `Result` は DB エラー、内側は送信見送り。
    async fn draft(
        &self,
        request: &NotificationRequest,
        resources: &ResolvedResources,
    ) -> Result<Result<Draft, SuppressReason>, InfraError> {
        let locale = request.locale;

        match &request.event {
            NotificationEvent::PageParentRequest {
                parent_page_id,
                child_page_id,
            } => self.parent_request_draft(parent_page_id, child_page_id, &request.actor, locale).await,
            NotificationEvent::CommentCreated { proposition_id, .. } => {
                let Some(proposition) = self.proposition(resources, proposition_id).await? else {
                    return Ok(Err(SuppressReason::ResourceMissing));
                };
                if !proposition.preferences().notify_comments {
                    return Ok(Err(SuppressReason::PreferenceDisabled));
                }
                let recipients = vec![proposition.author_id().clone()];
                Ok(Ok(Draft::for_proposition(
                    self.proposition_link(locale, proposition.id()),
                    &proposition,
                    recipients,
                )))
            }
            NotificationEvent::SolutionMarked { proposition_id, .. }
            | NotificationEvent::SolutionUnmarked { proposition_id, .. } => {
                let (Some(proposition), Some(comment)) = (
                    self.proposition(resources, proposition_id).await?,
                    resources.comment.as_ref(),
                ) else {
                    return Ok(Err(SuppressReason::ResourceMissing));
                };
                if !proposition.preferences().notify_solutions {
                    return Ok(Err(SuppressReason::PreferenceDisabled));
                }
                let recipients = vec![comment.user_id().clone()];
                Ok(Ok(Draft::for_proposition(
                    self.proposition_link(locale, proposition.id()),
                    &proposition,
                    recipients,
                )))
            }
            NotificationEvent::VolunteerCreated { proposition_id } => {
                let Some(proposition) = self.proposition(resources, proposition_id).await? else {
                    return Ok(Err(SuppressReason::ResourceMissing));
                };
                if !proposition.preferences().notify_volunteers {
                    return Ok(Err(SuppressReason::PreferenceDisabled));
                }
                if !proposition.is_orphan() {
                    return Ok(Err(SuppressReason::LinkedToPage));
                }
                let recipients = vec![proposition.author_id().clone()];
                Ok(Ok(Draft::for_proposition(
                    self.proposition_link(locale, proposition.id()),
                    &proposition,
                    recipients,
                )))
            }
            NotificationEvent::StatusDone { proposition_id } => {
                self.status_draft(resources, proposition_id, Some(STATUS_DONE), true, locale)
                    .await
            }
            NotificationEvent::StatusChange {
                proposition_id,
                new_status,
            } => {
                self.status_draft(resources, proposition_id, new_status.as_deref(), false, locale)
                    .await
            }
            NotificationEvent::PropositionCreatedLinked { proposition_id } => {
                let Some(proposition) = self.proposition(resources, proposition_id).await? else {
                    return Ok(Err(SuppressReason::ResourceMissing));
                };
                let Some(page) = self.linked_page(resources, &proposition).await? else {
                    return Ok(Err(SuppressReason::NotLinkedToPage));
                };
                let Some(owner) = page.owner_id() else {
                    return Ok(Err(SuppressReason::NoRecipient));
                };
                let mut draft = Draft::for_proposition(
                    self.proposition_link(locale, proposition.id()),
                    &proposition,
                    vec![owner.clone()],
                );
                draft.page_name = Some(page.name().to_string());
                Ok(Ok(draft))
            }
            NotificationEvent::OwnerVoteThreshold { proposition_id } => {
                let Some(proposition) = self.proposition(resources, proposition_id).await? else {
                    return Ok(Err(SuppressReason::ResourceMissing));
                };
                let Some(page) = self.linked_page(resources, &proposition).await? else {
                    return Ok(Err(SuppressReason::NotLinkedToPage));
                };
                if !page.wants_instant_vote_alerts() {
                    return Ok(Err(SuppressReason::InstantAlertsOff));
                }
                let Some(owner) = page.owner_id() else {
                    return Ok(Err(SuppressReason::NoRecipient));
                };
                let mut draft = Draft::for_proposition(
                    self.proposition_link(locale, proposition.id()),
                    &proposition,
                    vec![owner.clone()],
                );
                draft.page_name = Some(page.name().to_string());
                Ok(Ok(draft))
            }
        }
    }

    /// 親ページ申請: 親・子ページを並行に読み、操作者でない側のオーナーに送る
    async fn parent_request_draft(
        &self,
        parent_page_id: &PageId,
        child_page_id: &PageId,
        actor: &UserId,
        locale: Locale,
    ) -> Result<Result<Draft, SuppressReason>, InfraError> {
        let (parent, child) = tokio::try_join!(
            self.repos.pages.find_by_id(parent_page_id),
            self.repos.pages.find_by_id(child_page_id),
        )?;
        let (Some(parent), Some(child)) = (parent, child) else {
            return Ok(Err(SuppressReason::ResourceMissing));
        };

        let recipient = [parent.owner_id(), child.owner_id()]
            .into_iter()
            .flatten()
            .find(|owner| *owner != actor);
        let Some(recipient) = recipient else {
            return Ok(Err(SuppressReason::NoRecipient));
        };

        Ok(Ok(Draft {
            recipient_ids:     vec![recipient.clone()],
            link:              self.page_link(locale, &parent),
            proposition_title: None,
            page_name:         Some(parent.name().to_string()),
            child_page_name:   Some(child.name().to_string()),
            status_label:      None,
        }))
    }

    /// ステータス系: 作者 + プロポジション購読者（完了時はページ購読者も）
    async fn status_draft(
        &self,
        resources: &ResolvedResources,
        proposition_id: &PropositionId,
        status: Option<&str>,
        include_page_subscribers: bool,
        locale: Locale,
    ) -> Result<Result<Draft, SuppressReason>, InfraError> {
        let Some(proposition) = self.proposition(resources, proposition_id).await? else {
            return Ok(Err(SuppressReason::ResourceMissing));
        };

        let page_subscribers = async {
            match proposition.page_id() {
                Some(page_id) if include_page_subscribers => {
                    self.repos.subscriptions.find_page_subscribers(page_id).await
                }
                _ => Ok(Vec::new()),
            }
        };
        let (proposition_subscribers, page_subscribers) = tokio::try_join!(
            self.repos
                .subscriptions
                .find_proposition_subscribers(proposition.id()),
            page_subscribers,
        )?;

        let recipients = std::iter::once(proposition.author_id().clone())
            .chain(proposition_subscribers)
            .chain(page_subscribers)
            .collect();

        let mut draft = Draft::for_proposition(
            self.proposition_link(locale, proposition.id()),
            &proposition,
            recipients,
        );
        draft.status_label = status
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| status_label(s, locale).to_string());
        Ok(Ok(draft))
    }

    /// 読み込み済みならそれを使い、無ければ読む
    async fn proposition(
        &self,
        resources: &ResolvedResources,
        proposition_id: &PropositionId,
    ) -> Result<Option<Proposition>, InfraError> {
        match resources
            .proposition
            .as_ref()
            .filter(|p| p.id() == proposition_id)
        {
            Some(proposition) => Ok(Some(proposition.clone())),
            None => self.repos.propositions.find_by_id(proposition_id).await,
        }
    }

    async fn linked_page(
        &self,
        resources: &ResolvedResources,
        proposition: &Proposition,
    ) -> Result<Option<Page>, InfraError> {
        let Some(page_id) = proposition.page_id() else {
            return Ok(None);
        };
        match resources.linked_page.as_ref().filter(|p| p.id() == page_id) {
            Some(page) => Ok(Some(page.clone())),
            None => self.repos.pages.find_by_id(page_id).await,
        }
    }

    fn proposition_link(&self, locale: Locale, proposition_id: &PropositionId) -> String {
        format!(
            "{}/{}/propositions/{}",
            self.app_url,
            locale.as_str(),
            proposition_id
        )
    }

    fn page_link(&self, locale: Locale, page: &Page) -> String {
        format!("{}/{}/pages/{}", self.app_url, locale.as_str(), page.slug())
    }
}

//! # 通知の認可エンジン
//!
//! 「この操作者は本当にこのイベントを起こした当事者か」を判定する純粋関数。
//! 入力は検証済みイベント・操作者・リソースリゾルバが読み込んだ行だけで、
//! I/O は行わない。同じ入力には常に同じ判定を返す。
//!
//! ## 種別ごとの許可条件
//!
//! | 種別 | 許可条件 |
//! |------|---------|
//! | `page_parent_request` | (親, 子) の最新の申請が存在し、申請者 == 操作者 |
//! | `comment_created` | コメントがプロポジションに属し、投稿者 == 操作者 |
//! | `solution_marked` / `solution_unmarked` | コメントがプロポジションに属し、操作者が管理者 |
//! | `volunteer_created` | (プロポジション, 操作者) のボランティア行が存在 |
//! | `status_done` / `status_change` | 操作者が管理者 |
//! | `proposition_created_linked` | 操作者 == 作者（ページオーナーでは代替できない） |
//! | `owner_vote_threshold` | (プロポジション, 操作者) の投票行が存在 |
//!
//! 「管理者」は [`manager_of`] で決まる（オーファンなら作者、それ以外はページオーナー）。
//! コメントとプロポジションの不一致は、操作者が誰であっても拒否する。

use super::{NotificationDenial, NotificationEvent};
use crate::{
    comment::{Comment, CommentId},
    page::{Page, PageId, PageParentRequest},
    proposition::{Proposition, PropositionId, Volunteer, Vote},
    user::UserId,
};

/// 認可判定に必要な行の集合
///
/// リソースリゾルバが種別ごとに必要な分だけ埋める。
/// 見つからない行は `None` で表し、判定時に拒否理由へ変換される。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedResources {
    /// 対象プロポジション
    pub proposition:    Option<Proposition>,
    /// プロポジションが紐づくページ（管理者の解決用）
    pub linked_page:    Option<Page>,
    /// 対象コメント
    pub comment:        Option<Comment>,
    /// (プロポジション, 操作者) のボランティア行
    pub volunteer:      Option<Volunteer>,
    /// (プロポジション, 操作者) の投票行
    pub vote:           Option<Vote>,
    /// (親, 子) の最新の親ページ申請
    pub parent_request: Option<PageParentRequest>,
}

/// 認可判定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// 許可。通知の送信者として扱う操作者を持つ
    Allow { actor_user_id: UserId },
    /// 拒否
    Deny { reason: NotificationDenial },
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    /// `Result` に変換する（`?` で早期リターンするため）
    pub fn into_result(self) -> Result<UserId, NotificationDenial> {
        match self {
            Self::Allow { actor_user_id } => Ok(actor_user_id),
            Self::Deny { reason } => Err(reason),
        }
    }
}

/// ペイロードの `actorUserId` を検証する
///
/// 省略時は認証済みユーザーを操作者とする。指定されている場合は
/// 認証済みユーザーと一致しなければならない（UUID として解釈できない値も不一致）。
pub fn verify_actor_claim(
    claimed: Option<&str>,
    authenticated_user_id: &UserId,
) -> Result<UserId, NotificationDenial> {
    match claimed {
        None => Ok(authenticated_user_id.clone()),
        Some(raw) => match UserId::parse(raw) {
            Some(actor) if &actor == authenticated_user_id => Ok(actor),
            _ => Err(NotificationDenial::ForbiddenActorUserId),
        },
    }
}

/// プロポジションの管理者を解決する
///
/// - オーファン（`page_id == None`）: 作者
/// - ページ付き: 紐づくページのオーナー
///
/// `linked_page` がプロポジションの `page_id` と一致しない、またはオーナー未設定の
/// 場合は管理者不明として `None` を返す。
pub fn manager_of<'a>(proposition: &'a Proposition, linked_page: Option<&'a Page>) -> Option<&'a UserId> {
    match proposition.page_id() {
        None => Some(proposition.author_id()),
        Some(page_id) => linked_page
            .filter(|page| page.id() == page_id)
            .and_then(Page::owner_id),
    }
}

/// 通知イベントを認可する
///
/// `actor` は [`verify_actor_claim`] で検証済みであること。
pub fn authorize(event: &NotificationEvent, actor: &UserId, resources: &ResolvedResources) -> Verdict {
    match check(event, actor, resources) {
        Ok(()) => Verdict::Allow {
            actor_user_id: actor.clone(),
        },
        Err(reason) => Verdict::Deny { reason },
    }
}

fn check(
    event: &NotificationEvent,
    actor: &UserId,
    resources: &ResolvedResources,
) -> Result<(), NotificationDenial> {
    match event {
        NotificationEvent::PageParentRequest {
            parent_page_id,
            child_page_id,
        } => check_parent_request(parent_page_id, child_page_id, actor, resources),
        NotificationEvent::CommentCreated {
            proposition_id,
            comment_id,
        } => {
            let comment = matching_comment(
                resources,
                proposition_id,
                comment_id,
                NotificationDenial::ForbiddenCommentActor,
            )?;
            ensure(
                comment.user_id() == actor,
                NotificationDenial::ForbiddenCommentActor,
            )
        }
        NotificationEvent::SolutionMarked {
            proposition_id,
            comment_id,
        }
        | NotificationEvent::SolutionUnmarked {
            proposition_id,
            comment_id,
        } => {
            matching_comment(
                resources,
                proposition_id,
                comment_id,
                NotificationDenial::ForbiddenSolutionActor,
            )?;
            let proposition = resolved_proposition(resources, proposition_id)
                .ok_or(NotificationDenial::MissingPropositionForStatusChecks)?;
            ensure_manager(
                proposition,
                resources,
                actor,
                NotificationDenial::ForbiddenSolutionActor,
            )
        }
        NotificationEvent::VolunteerCreated { proposition_id } => ensure(
            resources
                .volunteer
                .as_ref()
                .is_some_and(|v| &v.proposition_id == proposition_id && &v.user_id == actor),
            NotificationDenial::ForbiddenVolunteerActor,
        ),
        NotificationEvent::StatusDone { proposition_id }
        | NotificationEvent::StatusChange { proposition_id, .. } => {
            let proposition = resolved_proposition(resources, proposition_id)
                .ok_or(NotificationDenial::MissingProposition)?;
            ensure_manager(
                proposition,
                resources,
                actor,
                NotificationDenial::ForbiddenStatusActor,
            )
        }
        NotificationEvent::PropositionCreatedLinked { proposition_id } => {
            let proposition = resolved_proposition(resources, proposition_id)
                .ok_or(NotificationDenial::MissingProposition)?;
            ensure(
                proposition.author_id() == actor,
                NotificationDenial::ForbiddenPropositionActor,
            )
        }
        NotificationEvent::OwnerVoteThreshold { proposition_id } => ensure(
            resources
                .vote
                .as_ref()
                .is_some_and(|v| &v.proposition_id == proposition_id && &v.user_id == actor),
            NotificationDenial::ForbiddenVoteActor,
        ),
    }
}

fn ensure(condition: bool, denial: NotificationDenial) -> Result<(), NotificationDenial> {
    if condition { Ok(()) } else { Err(denial) }
}

fn check_parent_request(
    parent_page_id: &PageId,
    child_page_id: &PageId,
    actor: &UserId,
    resources: &ResolvedResources,
) -> Result<(), NotificationDenial> {
    let allowed = resources.parent_request.as_ref().is_some_and(|request| {
        &request.parent_page_id == parent_page_id
            && &request.child_page_id == child_page_id
            && &request.requested_by == actor
    });
    ensure(allowed, NotificationDenial::ForbiddenParentRequestActor)
}

/// 参照されたコメントを取り出し、プロポジションとの整合性を確かめる
///
/// 不整合は操作者に関係なく `Comment/proposition mismatch.` で拒否する。
fn matching_comment<'a>(
    resources: &'a ResolvedResources,
    proposition_id: &PropositionId,
    comment_id: &CommentId,
    when_missing: NotificationDenial,
) -> Result<&'a Comment, NotificationDenial> {
    let comment = resources
        .comment
        .as_ref()
        .filter(|c| c.id() == comment_id)
        .ok_or(when_missing)?;
    if !comment.belongs_to(proposition_id) {
        return Err(NotificationDenial::CommentPropositionMismatch);
    }
    Ok(comment)
}

fn resolved_proposition<'a>(
    resources: &'a ResolvedResources,
    proposition_id: &PropositionId,
) -> Option<&'a Proposition> {
    resources
        .proposition
        .as_ref()
        .filter(|p| p.id() == proposition_id)
}

fn ensure_manager(
    proposition: &Proposition,
    resources: &ResolvedResources,
    actor: &UserId,
    denial: NotificationDenial,
) -> Result<(), NotificationDenial> {
    let manager = manager_of(proposition, resources.linked_page.as_ref());
    ensure(manager == Some(actor), denial)
}

//! 通知イベントとペイロードのパース
//!
//! Web アプリから届く JSON ペイロード（[`NotificationPayload`]）を、
//! 必須フィールドが揃った [`NotificationEvent`] に変換する。
//!
//! ## パース順序
//!
//! 1. `actorUserId` の検証（なりすまし防止。他のどのフィールドよりも先）
//! 2. `type` の解釈（未知の種別は `Unsupported notification type.`）
//! 3. 種別ごとの必須フィールド（欠落はフィールド固有のメッセージ）
//! 4. `locale`（不明な値は英語）

use std::str::FromStr;

use serde::Deserialize;
use strum::IntoStaticStr;

use super::{NotificationDenial, authorization::verify_actor_claim};
use crate::{
    comment::CommentId,
    locale::Locale,
    page::PageId,
    proposition::PropositionId,
    user::UserId,
};

/// 通知イベント種別
///
/// ペイロードの `type` フィールドに snake_case で格納される値。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationEventType {
    /// 親ページ申請 → 申請者でない側のページオーナー
    PageParentRequest,
    /// コメント投稿 → プロポジション作者
    CommentCreated,
    /// ソリューション設定 → コメント投稿者
    SolutionMarked,
    /// ソリューション解除 → コメント投稿者
    SolutionUnmarked,
    /// ボランティア登録 → プロポジション作者（オーファンのみ）
    VolunteerCreated,
    /// 完了 → 作者 + 購読者
    StatusDone,
    /// ステータス変更 → 作者 + 購読者
    StatusChange,
    /// ページ付きプロポジション作成 → ページオーナー
    PropositionCreatedLinked,
    /// 投票しきい値到達 → ページオーナー
    OwnerVoteThreshold,
}

/// 受信したままの通知ペイロード
///
/// すべて任意フィールドとして受け取り、検証は [`NotificationRequest::parse`] で行う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(rename = "type")]
    pub event_type:     Option<String>,
    pub proposition_id: Option<String>,
    pub page_id:        Option<String>,
    pub child_page_id:  Option<String>,
    pub comment_id:     Option<String>,
    pub actor_user_id:  Option<String>,
    pub new_status:     Option<String>,
    pub locale:         Option<String>,
}

/// 通知イベント
///
/// 各バリアントは種別ごとの必須フィールドだけを持つ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    PageParentRequest {
        parent_page_id: PageId,
        child_page_id:  PageId,
    },
    CommentCreated {
        proposition_id: PropositionId,
        comment_id:     CommentId,
    },
    SolutionMarked {
        proposition_id: PropositionId,
        comment_id:     CommentId,
    },
    SolutionUnmarked {
        proposition_id: PropositionId,
        comment_id:     CommentId,
    },
    VolunteerCreated {
        proposition_id: PropositionId,
    },
    StatusDone {
        proposition_id: PropositionId,
    },
    StatusChange {
        proposition_id: PropositionId,
        /// 変更後のステータス（未指定も許容する）
        new_status:     Option<String>,
    },
    PropositionCreatedLinked {
        proposition_id: PropositionId,
    },
    OwnerVoteThreshold {
        proposition_id: PropositionId,
    },
}

impl NotificationEvent {
    /// 通知イベント種別を返す
    pub fn event_type(&self) -> NotificationEventType {
        match self {
            Self::PageParentRequest { .. } => NotificationEventType::PageParentRequest,
            Self::CommentCreated { .. } => NotificationEventType::CommentCreated,
            Self::SolutionMarked { .. } => NotificationEventType::SolutionMarked,
            Self::SolutionUnmarked { .. } => NotificationEventType::SolutionUnmarked,
            Self::VolunteerCreated { .. } => NotificationEventType::VolunteerCreated,
            Self::StatusDone { .. } => NotificationEventType::StatusDone,
            Self::StatusChange { .. } => NotificationEventType::StatusChange,
            Self::PropositionCreatedLinked { .. } => {
                NotificationEventType::PropositionCreatedLinked
            }
            Self::OwnerVoteThreshold { .. } => NotificationEventType::OwnerVoteThreshold,
        }
    }

    /// 対象プロポジション ID を返す（親ページ申請は `None`）
    pub fn proposition_id(&self) -> Option<&PropositionId> {
        match self {
            Self::PageParentRequest { .. } => None,
            Self::CommentCreated { proposition_id, .. }
            | Self::SolutionMarked { proposition_id, .. }
            | Self::SolutionUnmarked { proposition_id, .. }
            | Self::VolunteerCreated { proposition_id }
            | Self::StatusDone { proposition_id }
            | Self::StatusChange { proposition_id, .. }
            | Self::PropositionCreatedLinked { proposition_id }
            | Self::OwnerVoteThreshold { proposition_id } => Some(proposition_id),
        }
    }

    fn from_payload(
        event_type: NotificationEventType,
        payload: &NotificationPayload,
    ) -> Result<Self, NotificationDenial> {
        use NotificationEventType as T;

        let proposition_id = || {
            parse_id(&payload.proposition_id, PropositionId::parse)
                .ok_or(NotificationDenial::MissingPropositionId)
        };
        let comment_pair = || {
            let proposition_id = parse_id(&payload.proposition_id, PropositionId::parse);
            let comment_id = parse_id(&payload.comment_id, CommentId::parse);
            proposition_id
                .zip(comment_id)
                .ok_or(NotificationDenial::MissingCommentPayload)
        };

        let event = match event_type {
            T::PageParentRequest => {
                let parent_page_id = parse_id(&payload.page_id, PageId::parse);
                let child_page_id = parse_id(&payload.child_page_id, PageId::parse);
                let (parent_page_id, child_page_id) = parent_page_id
                    .zip(child_page_id)
                    .ok_or(NotificationDenial::MissingMotherPagePayload)?;
                Self::PageParentRequest {
                    parent_page_id,
                    child_page_id,
                }
            }
            T::CommentCreated => {
                let (proposition_id, comment_id) = comment_pair()?;
                Self::CommentCreated {
                    proposition_id,
                    comment_id,
                }
            }
            T::SolutionMarked => {
                let (proposition_id, comment_id) = comment_pair()?;
                Self::SolutionMarked {
                    proposition_id,
                    comment_id,
                }
            }
            T::SolutionUnmarked => {
                let (proposition_id, comment_id) = comment_pair()?;
                Self::SolutionUnmarked {
                    proposition_id,
                    comment_id,
                }
            }
            T::VolunteerCreated => Self::VolunteerCreated {
                proposition_id: proposition_id()?,
            },
            T::StatusDone => Self::StatusDone {
                proposition_id: proposition_id()?,
            },
            T::StatusChange => Self::StatusChange {
                proposition_id: proposition_id()?,
                new_status:     payload
                    .new_status
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            },
            T::PropositionCreatedLinked => Self::PropositionCreatedLinked {
                proposition_id: proposition_id()?,
            },
            T::OwnerVoteThreshold => Self::OwnerVoteThreshold {
                proposition_id: proposition_id()?,
            },
        };

        Ok(event)
    }
}

/// 空文字列や UUID として解釈できない値は「欠落」として扱う
fn parse_id<T>(value: &Option<String>, parse: fn(&str) -> Option<T>) -> Option<T> {
    value.as_deref().and_then(parse)
}

/// 検証済みの通知リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// 操作者（認証済みユーザーと一致することを確認済み）
    pub actor:  UserId,
    /// メールのロケール
    pub locale: Locale,
    /// 通知イベント
    pub event:  NotificationEvent,
}

impl NotificationRequest {
    /// ペイロードをパースする
    ///
    /// DB を参照せずに判定できる拒否理由はここで返す。
    /// `actorUserId` の不一致はほかのどのフィールドよりも優先される。
    pub fn parse(
        payload: &NotificationPayload,
        authenticated_user_id: &UserId,
    ) -> Result<Self, NotificationDenial> {
        let actor = verify_actor_claim(payload.actor_user_id.as_deref(), authenticated_user_id)?;

        let event_type = payload
            .event_type
            .as_deref()
            .and_then(|s| NotificationEventType::from_str(s).ok())
            .ok_or(NotificationDenial::UnsupportedType)?;

        let event = NotificationEvent::from_payload(event_type, payload)?;

        Ok(Self {
            actor,
            locale: Locale::from_request(payload.locale.as_deref()),
            event,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    fn payload(event_type: &str) -> NotificationPayload {
        NotificationPayload {
            event_type: Some(event_type.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_camel_caseのjsonからデシリアライズできる() {
        let proposition_id = PropositionId::new();
        let comment_id = CommentId::new();
        let json = format!(
            r#"{{"type":"comment_created","propositionId":"{proposition_id}","commentId":"{comment_id}","locale":"fr"}}"#
        );

        let payload: NotificationPayload = serde_json::from_str(&json).unwrap();

        assert_eq!(payload.event_type.as_deref(), Some("comment_created"));
        assert_eq!(payload.proposition_id, Some(proposition_id.to_string()));
        assert_eq!(payload.comment_id, Some(comment_id.to_string()));
        assert_eq!(payload.locale.as_deref(), Some("fr"));
    }

    #[test]
    fn test_全イベント種別がsnake_caseで往復できる() {
        for event_type in NotificationEventType::iter() {
            let s = event_type.to_string();
            assert_eq!(NotificationEventType::from_str(&s).unwrap(), event_type);
        }
        assert_eq!(NotificationEventType::iter().count(), 9);
    }

    #[test]
    fn test_comment_createdをパースできる() {
        let user = UserId::new();
        let proposition_id = PropositionId::new();
        let comment_id = CommentId::new();
        let payload = NotificationPayload {
            proposition_id: Some(proposition_id.to_string()),
            comment_id: Some(comment_id.to_string()),
            ..payload("comment_created")
        };

        let request = NotificationRequest::parse(&payload, &user).unwrap();

        assert_eq!(request.actor, user);
        assert_eq!(request.locale, Locale::En);
        assert_eq!(
            request.event,
            NotificationEvent::CommentCreated {
                proposition_id,
                comment_id,
            }
        );
    }

    #[test]
    fn test_actor_user_idが認証ユーザーと異なれば他のフィールドより優先して拒否する() {
        let payload = NotificationPayload {
            actor_user_id: Some(UserId::new().to_string()),
            ..payload("no_such_type")
        };

        let result = NotificationRequest::parse(&payload, &UserId::new());

        assert_eq!(result, Err(NotificationDenial::ForbiddenActorUserId));
    }

    #[test]
    fn test_actor_user_idが認証ユーザーと同じなら受け入れる() {
        let user = UserId::new();
        let payload = NotificationPayload {
            actor_user_id: Some(user.to_string()),
            proposition_id: Some(PropositionId::new().to_string()),
            ..payload("status_done")
        };

        let request = NotificationRequest::parse(&payload, &user).unwrap();

        assert_eq!(request.actor, user);
    }

    #[rstest]
    #[case::未知の種別(Some("vote_cast"))]
    #[case::大文字(Some("COMMENT_CREATED"))]
    #[case::種別なし(None)]
    fn test_未対応の種別は拒否する(#[case] event_type: Option<&str>) {
        let payload = NotificationPayload {
            event_type: event_type.map(str::to_string),
            proposition_id: Some(PropositionId::new().to_string()),
            ..Default::default()
        };

        let result = NotificationRequest::parse(&payload, &UserId::new());

        assert_eq!(result, Err(NotificationDenial::UnsupportedType));
    }

    #[rstest]
    #[case::comment_created("comment_created")]
    #[case::solution_marked("solution_marked")]
    #[case::solution_unmarked("solution_unmarked")]
    fn test_コメント系はcomment_idが無ければmissing_comment_payload(#[case] event_type: &str) {
        let payload = NotificationPayload {
            proposition_id: Some(PropositionId::new().to_string()),
            ..payload(event_type)
        };

        let result = NotificationRequest::parse(&payload, &UserId::new());

        assert_eq!(result, Err(NotificationDenial::MissingCommentPayload));
    }

    #[test]
    fn test_コメント系はproposition_idが無くてもmissing_comment_payload() {
        let payload = NotificationPayload {
            comment_id: Some(CommentId::new().to_string()),
            ..payload("comment_created")
        };

        let result = NotificationRequest::parse(&payload, &UserId::new());

        assert_eq!(result, Err(NotificationDenial::MissingCommentPayload));
    }

    #[rstest]
    #[case("volunteer_created")]
    #[case("status_done")]
    #[case("status_change")]
    #[case("proposition_created_linked")]
    #[case("owner_vote_threshold")]
    fn test_proposition_idが無ければmissing_proposition_id(#[case] event_type: &str) {
        let result = NotificationRequest::parse(&payload(event_type), &UserId::new());

        assert_eq!(result, Err(NotificationDenial::MissingPropositionId));
    }

    #[test]
    fn test_uuidでないproposition_idは欠落として扱う() {
        let payload = NotificationPayload {
            proposition_id: Some("p1".to_string()),
            ..payload("status_done")
        };

        let result = NotificationRequest::parse(&payload, &UserId::new());

        assert_eq!(result, Err(NotificationDenial::MissingPropositionId));
    }

    #[test]
    fn test_親ページ申請は子ページが無ければmissing_mother_page_payload() {
        let payload = NotificationPayload {
            page_id: Some(PageId::new().to_string()),
            ..payload("page_parent_request")
        };

        let result = NotificationRequest::parse(&payload, &UserId::new());

        assert_eq!(result, Err(NotificationDenial::MissingMotherPagePayload));
    }

    #[test]
    fn test_status_changeの空のnew_statusはnoneになる() {
        let proposition_id = PropositionId::new();
        let payload = NotificationPayload {
            proposition_id: Some(proposition_id.to_string()),
            new_status: Some("  ".to_string()),
            locale: Some("fr".to_string()),
            ..payload("status_change")
        };

        let request = NotificationRequest::parse(&payload, &UserId::new()).unwrap();

        assert_eq!(request.locale, Locale::Fr);
        assert_eq!(
            request.event,
            NotificationEvent::StatusChange {
                proposition_id,
                new_status: None,
            }
        );
    }
}

//! 通知リクエストの拒否理由
//!
//! メッセージ文字列はクライアントとの契約の一部で、テストで完全一致を検証する。
//! 文言を変更する場合は呼び出し側（Web アプリ）との調整が必要。

use thiserror::Error;

/// 拒否の分類
///
/// HTTP ステータスへの変換は notify-service の責務。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialKind {
    /// ペイロードの形式不正（400）。DB 参照より前に検出される
    InvalidPayload,
    /// 認可の拒否（403）
    Forbidden,
}

/// 通知リクエストの拒否理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationDenial {
    #[error("Forbidden actorUserId.")]
    ForbiddenActorUserId,

    #[error("Comment/proposition mismatch.")]
    CommentPropositionMismatch,

    #[error("Forbidden comment actor.")]
    ForbiddenCommentActor,

    #[error("Forbidden volunteer actor.")]
    ForbiddenVolunteerActor,

    #[error("Forbidden solution actor.")]
    ForbiddenSolutionActor,

    #[error("Forbidden status actor.")]
    ForbiddenStatusActor,

    #[error("Forbidden proposition actor.")]
    ForbiddenPropositionActor,

    #[error("Forbidden vote actor.")]
    ForbiddenVoteActor,

    #[error("Forbidden parent request actor.")]
    ForbiddenParentRequestActor,

    #[error("Missing comment payload.")]
    MissingCommentPayload,

    #[error("Missing propositionId.")]
    MissingPropositionId,

    #[error("Missing mother page payload.")]
    MissingMotherPagePayload,

    #[error("Missing proposition.")]
    MissingProposition,

    #[error("Missing proposition for status checks.")]
    MissingPropositionForStatusChecks,

    #[error("Unsupported notification type.")]
    UnsupportedType,
}

impl NotificationDenial {
    pub fn kind(&self) -> DenialKind {
        match self {
            Self::MissingCommentPayload
            | Self::MissingPropositionId
            | Self::MissingMotherPagePayload
            | Self::UnsupportedType => DenialKind::InvalidPayload,
            Self::ForbiddenActorUserId
            | Self::CommentPropositionMismatch
            | Self::ForbiddenCommentActor
            | Self::ForbiddenVolunteerActor
            | Self::ForbiddenSolutionActor
            | Self::ForbiddenStatusActor
            | Self::ForbiddenPropositionActor
            | Self::ForbiddenVoteActor
            | Self::ForbiddenParentRequestActor
            | Self::MissingProposition
            | Self::MissingPropositionForStatusChecks => DenialKind::Forbidden,
        }
    }
}

//! # コメント
//!
//! プロポジションに対するコメント。コメントは必ずちょうど 1 つの
//! プロポジションに属し、ソリューションとしてマークされることがある。

use crate::{proposition::PropositionId, user::UserId};

define_uuid_id! {
    /// コメント ID
    pub struct CommentId;
}

/// コメントエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    id:             CommentId,
    proposition_id: PropositionId,
    user_id:        UserId,
    is_solution:    bool,
}

impl Comment {
    pub fn new(
        id: CommentId,
        proposition_id: PropositionId,
        user_id: UserId,
        is_solution: bool,
    ) -> Self {
        Self {
            id,
            proposition_id,
            user_id,
            is_solution,
        }
    }

    pub fn id(&self) -> &CommentId {
        &self.id
    }

    pub fn proposition_id(&self) -> &PropositionId {
        &self.proposition_id
    }

    /// コメント投稿者
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn is_solution(&self) -> bool {
        self.is_solution
    }

    /// 指定したプロポジションに属するコメントか
    pub fn belongs_to(&self, proposition_id: &PropositionId) -> bool {
        &self.proposition_id == proposition_id
    }
}

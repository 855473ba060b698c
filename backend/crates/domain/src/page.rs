//! # ページ
//!
//! 組織・製品を表すページと、ページ間の親子リンク申請を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Page`] | ページ | プロポジションを所有し、購読者を持つ |
//! | [`PageParentRequest`] | 親ページ申請 | 子ページを親ページの配下に置く申請。同じ組の最新のみ有効 |

use chrono::{DateTime, Utc};

use crate::user::UserId;

define_uuid_id! {
    /// ページ ID
    pub struct PageId;
}

define_uuid_id! {
    /// 親ページ申請 ID
    pub struct PageParentRequestId;
}

/// ページエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    id:                   PageId,
    name:                 String,
    slug:                 String,
    owner_id:             Option<UserId>,
    owner_notify_daily:   bool,
    owner_vote_threshold: Option<i32>,
}

/// ページの DB 復元パラメータ
pub struct PageRecord {
    pub id:                   PageId,
    pub name:                 String,
    pub slug:                 String,
    pub owner_id:             Option<UserId>,
    pub owner_notify_daily:   bool,
    pub owner_vote_threshold: Option<i32>,
}

impl Page {
    /// 既存のデータから復元する
    pub fn from_db(record: PageRecord) -> Self {
        Self {
            id:                   record.id,
            name:                 record.name,
            slug:                 record.slug,
            owner_id:             record.owner_id,
            owner_notify_daily:   record.owner_notify_daily,
            owner_vote_threshold: record.owner_vote_threshold,
        }
    }

    pub fn id(&self) -> &PageId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// ページオーナー
    ///
    /// 未割り当てのページ（オーナー退会など）は `None`。
    pub fn owner_id(&self) -> Option<&UserId> {
        self.owner_id.as_ref()
    }

    pub fn owner_vote_threshold(&self) -> Option<i32> {
        self.owner_vote_threshold
    }

    /// 投票しきい値の即時通知を送るか
    ///
    /// ダイジェスト設定が優先され、しきい値未設定の場合も送らない。
    pub fn wants_instant_vote_alerts(&self) -> bool {
        !self.owner_notify_daily && self.owner_vote_threshold.is_some()
    }
}

/// 親ページ申請
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParentRequest {
    pub id:             PageParentRequestId,
    pub parent_page_id: PageId,
    pub child_page_id:  PageId,
    pub requested_by:   UserId,
    pub created_at:     DateTime<Utc>,
}

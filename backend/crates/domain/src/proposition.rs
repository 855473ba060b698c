//! # プロポジション
//!
//! ユーザーが投稿するアイデア・フィードバック（プロポジション）と、
//! それに紐づく参加記録（ボランティア、投票）を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Proposition`] | プロポジション | ページに紐づくか、紐づかない（オーファン）投稿 |
//! | [`NotificationPreferences`] | 通知設定 | コメント・ボランティア・ソリューションの 3 フラグ |
//! | [`Volunteer`] | ボランティア | (proposition_id, user_id) の行の存在そのものが認可の根拠 |
//! | [`Vote`] | 投票 | (proposition_id, user_id) の行の存在そのものが認可の根拠 |
//!
//! ## 管理者の決定
//!
//! `page_id` が `None`（オーファン）なら作者が、`Some` ならページのオーナーが
//! プロポジションを管理する。オーナーは呼び出しごとに引き直す
//! （[`crate::notification::authorization`] 参照）。

use serde::{Deserialize, Serialize};

use crate::{locale::Locale, page::PageId, user::UserId};

define_uuid_id! {
    /// プロポジション ID
    pub struct PropositionId;
}

/// プロポジションごとの通知設定
///
/// 認可には影響しない。認可が通った後の配信可否だけを決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    /// コメント投稿時に作者へ通知する
    pub notify_comments:   bool,
    /// ボランティア登録時に作者へ通知する（オーファンのみ）
    pub notify_volunteers: bool,
    /// ソリューション設定・解除時にコメント投稿者へ通知する
    pub notify_solutions:  bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            notify_comments:   true,
            notify_volunteers: true,
            notify_solutions:  true,
        }
    }
}

/// プロポジションエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposition {
    id:          PropositionId,
    title:       String,
    author_id:   UserId,
    page_id:     Option<PageId>,
    preferences: NotificationPreferences,
}

/// プロポジションの DB 復元パラメータ
pub struct PropositionRecord {
    pub id:          PropositionId,
    pub title:       String,
    pub author_id:   UserId,
    pub page_id:     Option<PageId>,
    pub preferences: NotificationPreferences,
}

impl Proposition {
    /// 既存のデータから復元する
    pub fn from_db(record: PropositionRecord) -> Self {
        Self {
            id:          record.id,
            title:       record.title,
            author_id:   record.author_id,
            page_id:     record.page_id,
            preferences: record.preferences,
        }
    }

    pub fn id(&self) -> &PropositionId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    pub fn page_id(&self) -> Option<&PageId> {
        self.page_id.as_ref()
    }

    pub fn preferences(&self) -> NotificationPreferences {
        self.preferences
    }

    /// ページに紐づいていないか
    pub fn is_orphan(&self) -> bool {
        self.page_id.is_none()
    }
}

/// ボランティア登録（複合キー: proposition_id + user_id）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volunteer {
    pub proposition_id: PropositionId,
    pub user_id:        UserId,
}

/// 投票（複合キー: proposition_id + user_id）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub proposition_id: PropositionId,
    pub user_id:        UserId,
}

/// ステータス表示名の対応表（英語, フランス語）
///
/// DB 上のステータス値は英語表記で保存されている。
const STATUS_LABELS: &[(&str, &str)] = &[
    ("Open", "Ouverte"),
    ("In Progress", "En cours"),
    ("Done", "Terminée"),
    ("Won't Do", "Ne sera pas faite"),
];

/// `status_done` で使う完了ステータス
pub const STATUS_DONE: &str = "Done";

/// ステータスをロケールに応じた表示名に変換する
///
/// 対応表に無い値はそのまま返す。
pub fn status_label(status: &str, locale: Locale) -> &str {
    let Some(&(en, fr)) = STATUS_LABELS.iter().find(|(en, _)| *en == status) else {
        return status;
    };
    match locale {
        Locale::En => en,
        Locale::Fr => fr,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Open", Locale::En, "Open")]
    #[case("Open", Locale::Fr, "Ouverte")]
    #[case("In Progress", Locale::Fr, "En cours")]
    #[case("Done", Locale::Fr, "Terminée")]
    #[case("Won't Do", Locale::Fr, "Ne sera pas faite")]
    #[case("Won't Do", Locale::En, "Won't Do")]
    #[case("Archived", Locale::Fr, "Archived")]
    #[case("in progress", Locale::Fr, "in progress")]
    fn test_status_labelの変換(
        #[case] status: &str,
        #[case] locale: Locale,
        #[case] expected: &str,
    ) {
        assert_eq!(status_label(status, locale), expected);
    }

    #[test]
    fn test_page_idが無いプロポジションはオーファン() {
        let proposition = Proposition::from_db(PropositionRecord {
            id:          PropositionId::new(),
            title:       "Dark mode".to_string(),
            author_id:   UserId::new(),
            page_id:     None,
            preferences: NotificationPreferences::default(),
        });

        assert!(proposition.is_orphan());
        assert_eq!(proposition.page_id(), None);
    }
}

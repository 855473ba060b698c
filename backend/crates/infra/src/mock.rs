//! # テスト用モック
//!
//! ユースケース・ハンドラのテストで使用するインメモリのリポジトリと送信バックエンド。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! propel-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use propel_domain::{
    comment::{Comment, CommentId},
    notification::{EmailMessage, NotificationError},
    page::{Page, PageId, PageParentRequest},
    proposition::{Proposition, PropositionId, Volunteer, Vote},
    user::{UserId, UserProfile},
};

use crate::{
    error::InfraError,
    notification::NotificationSender,
    repository::{
        CommentRepository,
        PageRepository,
        ParticipationRepository,
        ProfileRepository,
        PropositionRepository,
        SubscriptionRepository,
    },
};

// ===== MockPropositionRepository =====

#[derive(Clone, Default)]
pub struct MockPropositionRepository {
    propositions: Arc<Mutex<Vec<Proposition>>>,
    unavailable:  Arc<Mutex<bool>>,
}

impl MockPropositionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, proposition: Proposition) {
        self.propositions.lock().unwrap().push(proposition);
    }

    /// 以降の検索をデータベースエラーにする
    pub fn make_unavailable(&self) {
        *self.unavailable.lock().unwrap() = true;
    }
}

#[async_trait]
impl PropositionRepository for MockPropositionRepository {
    async fn find_by_id(&self, id: &PropositionId) -> Result<Option<Proposition>, InfraError> {
        if *self.unavailable.lock().unwrap() {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        Ok(self
            .propositions
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id() == id)
            .cloned())
    }
}

// ===== MockPageRepository =====

#[derive(Clone, Default)]
pub struct MockPageRepository {
    pages:           Arc<Mutex<Vec<Page>>>,
    parent_requests: Arc<Mutex<Vec<PageParentRequest>>>,
}

impl MockPageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, page: Page) {
        self.pages.lock().unwrap().push(page);
    }

    pub fn add_parent_request(&self, request: PageParentRequest) {
        self.parent_requests.lock().unwrap().push(request);
    }
}

#[async_trait]
impl PageRepository for MockPageRepository {
    async fn find_by_id(&self, id: &PageId) -> Result<Option<Page>, InfraError> {
        Ok(self
            .pages
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id() == id)
            .cloned())
    }

    async fn find_latest_parent_request(
        &self,
        parent_page_id: &PageId,
        child_page_id: &PageId,
    ) -> Result<Option<PageParentRequest>, InfraError> {
        Ok(self
            .parent_requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.parent_page_id == *parent_page_id && r.child_page_id == *child_page_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }
}

// ===== MockCommentRepository =====

#[derive(Clone, Default)]
pub struct MockCommentRepository {
    comments: Arc<Mutex<Vec<Comment>>>,
}

impl MockCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, comment: Comment) {
        self.comments.lock().unwrap().push(comment);
    }
}

#[async_trait]
impl CommentRepository for MockCommentRepository {
    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, InfraError> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned())
    }
}

// ===== MockParticipationRepository =====

#[derive(Clone, Default)]
pub struct MockParticipationRepository {
    volunteers: Arc<Mutex<Vec<Volunteer>>>,
    votes:      Arc<Mutex<Vec<Vote>>>,
}

impl MockParticipationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_volunteer(&self, volunteer: Volunteer) {
        self.volunteers.lock().unwrap().push(volunteer);
    }

    pub fn add_vote(&self, vote: Vote) {
        self.votes.lock().unwrap().push(vote);
    }
}

#[async_trait]
impl ParticipationRepository for MockParticipationRepository {
    async fn find_volunteer(
        &self,
        proposition_id: &PropositionId,
        user_id: &UserId,
    ) -> Result<Option<Volunteer>, InfraError> {
        Ok(self
            .volunteers
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.proposition_id == *proposition_id && v.user_id == *user_id)
            .cloned())
    }

    async fn find_vote(
        &self,
        proposition_id: &PropositionId,
        user_id: &UserId,
    ) -> Result<Option<Vote>, InfraError> {
        Ok(self
            .votes
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.proposition_id == *proposition_id && v.user_id == *user_id)
            .cloned())
    }
}

// ===== MockSubscriptionRepository =====

#[derive(Clone, Default)]
pub struct MockSubscriptionRepository {
    proposition_subscriptions: Arc<Mutex<Vec<(PropositionId, UserId)>>>,
    page_subscriptions:        Arc<Mutex<Vec<(PageId, UserId)>>>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_proposition(&self, proposition_id: PropositionId, user_id: UserId) {
        self.proposition_subscriptions
            .lock()
            .unwrap()
            .push((proposition_id, user_id));
    }

    pub fn subscribe_page(&self, page_id: PageId, user_id: UserId) {
        self.page_subscriptions
            .lock()
            .unwrap()
            .push((page_id, user_id));
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_proposition_subscribers(
        &self,
        proposition_id: &PropositionId,
    ) -> Result<Vec<UserId>, InfraError> {
        Ok(self
            .proposition_subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == proposition_id)
            .map(|(_, u)| u.clone())
            .collect())
    }

    async fn find_page_subscribers(&self, page_id: &PageId) -> Result<Vec<UserId>, InfraError> {
        Ok(self
            .page_subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == page_id)
            .map(|(_, u)| u.clone())
            .collect())
    }
}

// ===== MockProfileRepository =====

#[derive(Clone, Default)]
pub struct MockProfileRepository {
    profiles: Arc<Mutex<Vec<UserProfile>>>,
}

impl MockProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, profile: UserProfile) {
        self.profiles.lock().unwrap().push(profile);
    }
}

#[async_trait]
impl ProfileRepository for MockProfileRepository {
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, InfraError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|p| ids.contains(p.id()))
            .cloned()
            .collect())
    }
}

// ===== MockNotificationSender =====

/// 送信したメールを記録するモック
///
/// `fail_for` で登録したアドレスへの送信は `SendFailed` を返す。
/// 失敗した送信は `sent_emails` に含まれない。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent_emails:       Arc<Mutex<Vec<EmailMessage>>>,
    failing_addresses: Arc<Mutex<HashSet<String>>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定アドレスへの送信を失敗させる
    pub fn fail_for(&self, address: impl Into<String>) {
        self.failing_addresses.lock().unwrap().insert(address.into());
    }

    /// 送信に成功したメールの一覧
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent_emails.lock().unwrap().clone()
    }

    /// 送信に成功した宛先の一覧（ソート済み）
    pub fn recipients(&self) -> Vec<String> {
        let mut recipients: Vec<String> = self
            .sent_emails
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.to.clone())
            .collect();
        recipients.sort();
        recipients
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        if self.failing_addresses.lock().unwrap().contains(&email.to) {
            return Err(NotificationError::SendFailed(format!(
                "モック送信失敗: {}",
                email.to
            )));
        }
        self.sent_emails.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use propel_domain::page::PageParentRequestId;
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_最新の親ページ申請を返す() {
        let repo = MockPageRepository::new();
        let parent = PageId::new();
        let child = PageId::new();
        let old_requester = UserId::new();
        let new_requester = UserId::new();
        let now = Utc::now();
        repo.add_parent_request(PageParentRequest {
            id:             PageParentRequestId::new(),
            parent_page_id: parent.clone(),
            child_page_id:  child.clone(),
            requested_by:   new_requester.clone(),
            created_at:     now,
        });
        repo.add_parent_request(PageParentRequest {
            id:             PageParentRequestId::new(),
            parent_page_id: parent.clone(),
            child_page_id:  child.clone(),
            requested_by:   old_requester,
            created_at:     now - Duration::days(1),
        });

        let latest = repo
            .find_latest_parent_request(&parent, &child)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(latest.requested_by, new_requester);
    }

    #[tokio::test]
    async fn test_失敗指定したアドレスだけ送信に失敗する() {
        let sender = MockNotificationSender::new();
        sender.fail_for("broken@example.com");
        let email = |to: &str| EmailMessage {
            to:      to.to_string(),
            subject: "s".to_string(),
            html:    "h".to_string(),
        };

        let failed = sender.send_email(&email("broken@example.com")).await;
        let ok = sender.send_email(&email("ok@example.com")).await;

        assert!(failed.is_err());
        assert!(ok.is_ok());
        assert_eq!(sender.recipients(), vec!["ok@example.com".to_string()]);
    }
}

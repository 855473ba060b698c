//! # 通知ユースケース
//!
//! ```text
//! payload ─▶ NotificationRequest::parse ─▶ ResourceResolver ─▶ authorize
//!                                                                 │
//!        DeliveryDispatcher ◀── TemplateRenderer ◀── RecipientResolver
//! ```
//!
//! - [`ResourceResolver`]: 種別ごとに認可に必要な行だけを読む
//! - [`RecipientResolver`]: 通知設定を確認し、受信者と本文パラメータを決める
//! - [`TemplateRenderer`]: ロケール別の件名・HTML 本文を生成する
//! - [`DeliveryDispatcher`]: 受信者ごとに独立して送信し、失敗しても止めない

mod dispatcher;
mod recipients;
mod resolver;
mod service;
mod template_renderer;

use std::sync::Arc;

pub use dispatcher::{DeliveryDispatcher, DeliveryReport};
use propel_infra::repository::{
    CommentRepository,
    PageRepository,
    ParticipationRepository,
    ProfileRepository,
    PropositionRepository,
    SubscriptionRepository,
};
pub use recipients::{MessageParams, RecipientPlan, RecipientResolver, SuppressReason};
pub use resolver::ResourceResolver;
pub use service::{NotificationOutcome, NotificationUseCase};
pub use template_renderer::{RenderedEmail, TemplateRenderer};

/// 通知で参照するリポジトリ一式
#[derive(Clone)]
pub struct NotificationRepositories {
    pub propositions:   Arc<dyn PropositionRepository>,
    pub pages:          Arc<dyn PageRepository>,
    pub comments:       Arc<dyn CommentRepository>,
    pub participations: Arc<dyn ParticipationRepository>,
    pub subscriptions:  Arc<dyn SubscriptionRepository>,
    pub profiles:       Arc<dyn ProfileRepository>,
}

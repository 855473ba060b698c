//! # 通知ユースケース
//!
//! パース → リソース読み込み → 認可 → 受信者解決 → レンダリング → 配信 を統合する。
//!
//! ## 設計方針
//!
//! - **認可結果だけを返す**: 認可とデータ読み込みが成功したら、配信の成否に関わらず
//!   [`NotificationOutcome`] を返す（ハンドラーは `{ok:true}` を返す）
//! - **拒否は `NotifyError::Denied`**: 拒否理由の文字列はそのままクライアントへ返る
//! - **DB エラーは伝播**: 認可の前後どちらで起きても 500 にする

use std::sync::Arc;

use propel_domain::{
    notification::{
        NotificationDenial,
        NotificationEvent,
        NotificationPayload,
        NotificationRequest,
        authorize,
    },
    user::UserId,
};
use propel_infra::notification::NotificationSender;
use propel_shared::{
    event_log::{self, event},
    log_business_event,
};

use super::{
    DeliveryDispatcher,
    DeliveryReport,
    NotificationRepositories,
    RecipientPlan,
    RecipientResolver,
    ResourceResolver,
    SuppressReason,
    TemplateRenderer,
};
use crate::error::NotifyError;

/// 認可を通過したリクエストの処理結果（ログ・テスト用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// 通知設定や受信者不在で送信を見送った
    Suppressed(SuppressReason),
    /// 配信した（失敗を含む）
    Delivered(DeliveryReport),
    /// テンプレートのレンダリングに失敗し、送信しなかった
    NotRendered,
}

/// 通知ユースケース
#[derive(Clone)]
pub struct NotificationUseCase {
    resources:  ResourceResolver,
    recipients: RecipientResolver,
    renderer:   Arc<TemplateRenderer>,
    dispatcher: DeliveryDispatcher,
}

impl NotificationUseCase {
    pub fn new(
        repos: NotificationRepositories,
        sender: Arc<dyn NotificationSender>,
        renderer: Arc<TemplateRenderer>,
        app_url: impl Into<String>,
    ) -> Self {
        Self {
            resources: ResourceResolver::new(repos.clone()),
            recipients: RecipientResolver::new(repos, app_url),
            renderer,
            dispatcher: DeliveryDispatcher::new(sender),
        }
    }

    /// 通知リクエストを処理する
    ///
    /// # Errors
    ///
    /// - `NotifyError::Denied`: ペイロード不正、または認可で拒否
    /// - `NotifyError::Infra`: 行の読み込みに失敗
    pub async fn handle(
        &self,
        payload: &NotificationPayload,
        authenticated_user_id: &UserId,
    ) -> Result<NotificationOutcome, NotifyError> {
        let request = match NotificationRequest::parse(payload, authenticated_user_id) {
            Ok(request) => request,
            Err(denial) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_DENIED,
                    event.actor_id = %authenticated_user_id,
                    event.result = event::result::FAILURE,
                    notification.event_type = payload.event_type.as_deref().unwrap_or_default(),
                    notification.reason = %denial,
                    "通知リクエストを拒否"
                );
                return Err(denial.into());
            }
        };

        let resources = self.resources.resolve(&request).await?;

        if let Err(denial) = authorize(&request.event, &request.actor, &resources).into_result() {
            log_denied(&request, &denial);
            return Err(denial.into());
        }
        log_authorized(&request);

        let (recipients, params) = match self.recipients.plan(&request, &resources).await? {
            RecipientPlan::Deliver { recipients, params } => (recipients, params),
            RecipientPlan::Suppressed(reason) => {
                let (entity_type, entity_id) = entity_of(&request.event);
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SUPPRESSED,
                    event.entity_type = entity_type,
                    event.entity_id = %entity_id,
                    event.actor_id = %request.actor,
                    event.result = event::result::SKIPPED,
                    notification.event_type = %request.event.event_type(),
                    notification.reason = reason.as_str(),
                    "通知の送信を見送り"
                );
                return Ok(NotificationOutcome::Suppressed(reason));
            }
        };

        let email = match self.renderer.render(&params) {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(
                    error.category = event_log::error::category::INFRASTRUCTURE,
                    error.kind = event_log::error::kind::TEMPLATE,
                    notification.event_type = %params.event_type,
                    notification.locale = %params.locale,
                    "通知テンプレートのレンダリングに失敗: {e}"
                );
                return Ok(NotificationOutcome::NotRendered);
            }
        };

        let report = self
            .dispatcher
            .deliver_all(params.event_type, recipients, &email)
            .await;
        Ok(NotificationOutcome::Delivered(report))
    }
}

/// ログに出すエンティティ（プロポジション、親ページ申請なら親ページ）
fn entity_of(event: &NotificationEvent) -> (&'static str, String) {
    match event {
        NotificationEvent::PageParentRequest { parent_page_id, .. } => {
            (event::entity_type::PAGE, parent_page_id.to_string())
        }
        other => (
            event::entity_type::PROPOSITION,
            other
                .proposition_id()
                .map(ToString::to_string)
                .unwrap_or_default(),
        ),
    }
}

fn log_authorized(request: &NotificationRequest) {
    let (entity_type, entity_id) = entity_of(&request.event);
    log_business_event!(
        event.category = event::category::NOTIFICATION,
        event.action = event::action::NOTIFICATION_AUTHORIZED,
        event.entity_type = entity_type,
        event.entity_id = %entity_id,
        event.actor_id = %request.actor,
        event.result = event::result::SUCCESS,
        notification.event_type = %request.event.event_type(),
        "通知リクエストを認可"
    );
}

fn log_denied(request: &NotificationRequest, denial: &NotificationDenial) {
    let (entity_type, entity_id) = entity_of(&request.event);
    log_business_event!(
        event.category = event::category::NOTIFICATION,
        event.action = event::action::NOTIFICATION_DENIED,
        event.entity_type = entity_type,
        event.entity_id = %entity_id,
        event.actor_id = %request.actor,
        event.result = event::result::FAILURE,
        notification.event_type = %request.event.event_type(),
        notification.reason = %denial,
        "通知リクエストを拒否"
    );
}

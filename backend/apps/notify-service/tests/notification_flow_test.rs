//! 通知エンドポイントの結合テスト
//!
//! ルーター全体（Origin 検証 → 署名検証 → ハンドラ → ユースケース）を
//! インメモリのモックで組み立て、`oneshot` でリクエストを流す。

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Utc;
use pretty_assertions::assert_eq;
use propel_domain::{
    comment::{Comment, CommentId},
    page::{Page, PageId, PageParentRequest, PageParentRequestId, PageRecord},
    proposition::{NotificationPreferences, Proposition, PropositionId, PropositionRecord, Vote},
    user::{Email, UserId, UserProfile},
};
use propel_infra::mock::{
    MockCommentRepository,
    MockNotificationSender,
    MockPageRepository,
    MockParticipationRepository,
    MockProfileRepository,
    MockPropositionRepository,
    MockSubscriptionRepository,
};
use propel_notify_service::{
    app_builder::{NOTIFICATIONS_PATH, build_app},
    config::{NotificationBackend, NotificationConfig, NotifyConfig},
    handler::{AUTHENTICATED_USER_HEADER, DatabasePing, ReadinessState},
    middleware::{SIGNATURE_HEADER, sign_body},
    usecase::{NotificationRepositories, TemplateRenderer},
};
use serde_json::{Value, json};
use tower::ServiceExt;

const APP_ORIGIN: &str = "http://localhost:3000";
const SECRET: &str = "test-signing-secret";

struct AlwaysUp;

#[async_trait]
impl DatabasePing for AlwaysUp {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }
}

struct TestApp {
    propositions:   MockPropositionRepository,
    pages:          MockPageRepository,
    comments:       MockCommentRepository,
    participations: MockParticipationRepository,
    profiles:       MockProfileRepository,
    sender:         MockNotificationSender,
    router:         Router,
}

fn config(signing_secret: Option<&str>) -> NotifyConfig {
    NotifyConfig {
        host:            "127.0.0.1".to_string(),
        port:            3100,
        database_url:    "postgres://localhost/propel_test".to_string(),
        app_url:         APP_ORIGIN.to_string(),
        allowed_origins: vec![APP_ORIGIN.to_string()],
        signing_secret:  signing_secret.map(str::to_string),
        notification:    NotificationConfig {
            backend:        NotificationBackend::Noop,
            smtp_host:      "localhost".to_string(),
            smtp_port:      1025,
            from_address:   "Propel <noreply@propel.example.com>".to_string(),
            resend_api_key: None,
        },
    }
}

fn test_app(signing_secret: Option<&str>) -> TestApp {
    let propositions = MockPropositionRepository::new();
    let pages = MockPageRepository::new();
    let comments = MockCommentRepository::new();
    let participations = MockParticipationRepository::new();
    let profiles = MockProfileRepository::new();
    let sender = MockNotificationSender::new();

    let repos = NotificationRepositories {
        propositions:   Arc::new(propositions.clone()),
        pages:          Arc::new(pages.clone()),
        comments:       Arc::new(comments.clone()),
        participations: Arc::new(participations.clone()),
        subscriptions:  Arc::new(MockSubscriptionRepository::new()),
        profiles:       Arc::new(profiles.clone()),
    };
    let router = build_app(
        &config(signing_secret),
        repos,
        Arc::new(sender.clone()),
        Arc::new(TemplateRenderer::new().unwrap()),
        Arc::new(ReadinessState {
            database: Arc::new(AlwaysUp),
        }),
    );

    TestApp {
        propositions,
        pages,
        comments,
        participations,
        profiles,
        sender,
        router,
    }
}

impl TestApp {
    fn user(&self, name: &str) -> UserId {
        let id = UserId::new();
        self.profiles.add(UserProfile::new(
            id.clone(),
            Some(name.to_string()),
            None,
            Some(Email::new(format!("{name}@example.com")).unwrap()),
        ));
        id
    }

    fn proposition(&self, author: &UserId, page: Option<&Page>) -> Proposition {
        let proposition = Proposition::from_db(PropositionRecord {
            id:          PropositionId::new(),
            title:       "Dark mode".to_string(),
            author_id:   author.clone(),
            page_id:     page.map(|p| p.id().clone()),
            preferences: NotificationPreferences::default(),
        });
        self.propositions.add(proposition.clone());
        proposition
    }

    fn page(&self, owner: &UserId, slug: &str, vote_threshold: Option<i32>) -> Page {
        let page = Page::from_db(PageRecord {
            id:                   PageId::new(),
            name:                 slug.to_uppercase(),
            slug:                 slug.to_string(),
            owner_id:             Some(owner.clone()),
            owner_notify_daily:   false,
            owner_vote_threshold: vote_threshold,
        });
        self.pages.add(page.clone());
        page
    }

    async fn post(&self, user: Option<&UserId>, body: &str) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri(NOTIFICATIONS_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ORIGIN, APP_ORIGIN);
        if let Some(user) = user {
            request = request.header(AUTHENTICATED_USER_HEADER, user.to_string());
        }
        send(&self.router, request.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn post_json(&self, user: &UserId, body: Value) -> (StatusCode, Value) {
        self.post(Some(user), &body.to_string()).await
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn denied(reason: &str) -> Value {
    json!({ "ok": false, "error": reason })
}

// ===== 正常系 =====

#[tokio::test]
async fn test_オーファンの作者による完了通知は送信される() {
    let app = test_app(None);
    let author = app.user("author");
    let proposition = app.proposition(&author, None);

    let (status, body) = app
        .post_json(
            &author,
            json!({
                "type": "status_done",
                "propositionId": proposition.id().to_string(),
                "actorUserId": author.to_string(),
                "locale": "fr",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
    let sent = app.sender.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "author@example.com");
    assert_eq!(sent[0].subject, "[Propel] « Dark mode » est terminée");
}

#[tokio::test]
async fn test_送信失敗してもokを返す() {
    let app = test_app(None);
    let author = app.user("author");
    let commenter = app.user("commenter");
    let proposition = app.proposition(&author, None);
    let comment = Comment::new(
        CommentId::new(),
        proposition.id().clone(),
        commenter.clone(),
        false,
    );
    app.comments.add(comment.clone());
    app.sender.fail_for("author@example.com");

    let (status, body) = app
        .post_json(
            &commenter,
            json!({
                "type": "comment_created",
                "propositionId": proposition.id().to_string(),
                "commentId": comment.id().to_string(),
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
    assert!(app.sender.sent_emails().is_empty());
}

#[tokio::test]
async fn test_投票しきい値はオーナーにプロポジションへのリンクで送る() {
    let app = test_app(None);
    let owner = app.user("owner");
    let voter = app.user("voter");
    let page = app.page(&owner, "acme", Some(3));
    let proposition = app.proposition(&app.user("author"), Some(&page));
    app.participations.add_vote(Vote {
        proposition_id: proposition.id().clone(),
        user_id:        voter.clone(),
    });

    let (status, _) = app
        .post_json(
            &voter,
            json!({
                "type": "owner_vote_threshold",
                "propositionId": proposition.id().to_string(),
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let sent = app.sender.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "owner@example.com");
    assert!(
        sent[0]
            .html
            .replace("&#x2F;", "/")
            .contains(&format!("{APP_ORIGIN}/en/propositions/{}", proposition.id()))
    );
}

#[tokio::test]
async fn test_親ページ申請は申請者本人なら送信される() {
    let app = test_app(None);
    let parent_owner = app.user("parent_owner");
    let child_owner = app.user("child_owner");
    let parent = app.page(&parent_owner, "parent", None);
    let child = app.page(&child_owner, "child", None);
    app.pages.add_parent_request(PageParentRequest {
        id:             PageParentRequestId::new(),
        parent_page_id: parent.id().clone(),
        child_page_id:  child.id().clone(),
        requested_by:   child_owner.clone(),
        created_at:     Utc::now(),
    });

    let body = json!({
        "type": "page_parent_request",
        "pageId": parent.id().to_string(),
        "childPageId": child.id().to_string(),
    });

    let (status, _) = app.post_json(&child_owner, body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.sender.recipients(), vec!["parent_owner@example.com"]);

    let (status, response) = app.post_json(&app.user("stranger"), body).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response, denied("Forbidden parent request actor."));
}

// ===== 拒否 =====

#[tokio::test]
async fn test_actor_user_idの不一致は種別より先に403() {
    let app = test_app(None);
    let user = app.user("user");

    let (status, body) = app
        .post_json(
            &user,
            json!({ "type": "no_such_type", "actorUserId": UserId::new().to_string() }),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, denied("Forbidden actorUserId."));
}

#[tokio::test]
async fn test_未知の種別は400() {
    let app = test_app(None);

    let (status, body) = app
        .post_json(&app.user("user"), json!({ "type": "no_such_type" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, denied("Unsupported notification type."));
}

#[tokio::test]
async fn test_proposition_id欠落は400() {
    let app = test_app(None);

    let (status, body) = app
        .post_json(&app.user("user"), json!({ "type": "status_change" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, denied("Missing propositionId."));
}

#[tokio::test]
async fn test_別プロポジションのコメントは403() {
    let app = test_app(None);
    let author = app.user("author");
    let commenter = app.user("commenter");
    let proposition = app.proposition(&author, None);
    let other = app.proposition(&author, None);
    let comment = Comment::new(CommentId::new(), other.id().clone(), commenter.clone(), false);
    app.comments.add(comment.clone());

    let (status, body) = app
        .post_json(
            &commenter,
            json!({
                "type": "comment_created",
                "propositionId": proposition.id().to_string(),
                "commentId": comment.id().to_string(),
            }),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, denied("Comment/proposition mismatch."));
    assert!(app.sender.sent_emails().is_empty());
}

#[tokio::test]
async fn test_ページオーナーは作者の代わりに作成通知を出せない() {
    let app = test_app(None);
    let owner = app.user("owner");
    let page = app.page(&owner, "acme", None);
    let proposition = app.proposition(&app.user("author"), Some(&page));

    let (status, body) = app
        .post_json(
            &owner,
            json!({
                "type": "proposition_created_linked",
                "propositionId": proposition.id().to_string(),
            }),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, denied("Forbidden proposition actor."));
}

// ===== 境界 =====

#[tokio::test]
async fn test_認証ヘッダーが無ければ401() {
    let app = test_app(None);

    let (status, body) = app.post(None, r#"{"type":"status_done"}"#).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, denied("Unauthenticated."));
}

#[tokio::test]
async fn test_jsonでないボディは400() {
    let app = test_app(None);

    let (status, body) = app.post(Some(&app.user("user")), "not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, denied("Invalid JSON payload."));
}

#[tokio::test]
async fn test_許可されていないoriginは403() {
    let app = test_app(None);
    let request = Request::builder()
        .method(Method::POST)
        .uri(NOTIFICATIONS_PATH)
        .header(header::ORIGIN, "https://evil.example.com")
        .header(AUTHENTICATED_USER_HEADER, UserId::new().to_string())
        .body(Body::from(r#"{"type":"status_done"}"#))
        .unwrap();

    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, denied("Forbidden origin."));
}

#[tokio::test]
async fn test_db障害は500で詳細を返さない() {
    let app = test_app(None);
    let author = app.user("author");
    let proposition = app.proposition(&author, None);
    app.propositions.make_unavailable();

    let (status, body) = app
        .post_json(
            &author,
            json!({ "type": "status_done", "propositionId": proposition.id().to_string() }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, denied("Internal server error."));
}

// ===== 署名 =====

#[tokio::test]
async fn test_署名が有効ならoriginなしでも受け付ける() {
    let app = test_app(Some(SECRET));
    let author = app.user("author");
    let proposition = app.proposition(&author, None);
    let body = json!({ "type": "status_done", "propositionId": proposition.id().to_string() })
        .to_string();
    let request = Request::builder()
        .method(Method::POST)
        .uri(NOTIFICATIONS_PATH)
        .header(AUTHENTICATED_USER_HEADER, author.to_string())
        .header(SIGNATURE_HEADER, sign_body(SECRET.as_bytes(), body.as_bytes()))
        .body(Body::from(body))
        .unwrap();

    let (status, response) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({ "ok": true }));
}

#[tokio::test]
async fn test_署名が無ければ401() {
    let app = test_app(Some(SECRET));

    let (status, body) = app
        .post(Some(&app.user("user")), r#"{"type":"status_done"}"#)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, denied("Invalid signature."));
}

#[tokio::test]
async fn test_ヘルスチェック() {
    let app = test_app(None);
    let request = Request::builder()
        .uri("/health/ready")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

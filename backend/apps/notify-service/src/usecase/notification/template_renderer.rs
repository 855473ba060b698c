//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで通知メールの件名と HTML 本文を生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **ロケール別テンプレート**: `{locale}/{event_type}.html`。共通の `layout.html` を継承する
//! - **件名パターン**: `[Propel] ...`（ロケールごとに固定の文言）
//! - **自動エスケープ**: `.html` テンプレートは tera が HTML エスケープする。
//!   プロポジションのタイトルや表示名はユーザー入力なので必須

use propel_domain::{
    locale::Locale,
    notification::{NotificationError, NotificationEventType},
};
use tera::{Context, Tera};

use super::MessageParams;

/// 件名の接頭辞
const SUBJECT_PREFIX: &str = "[Propel]";

/// `{locale}/{name}.html` のテンプレートを `(名前, 本文)` の組にして並べる
macro_rules! notification_templates {
    ($($locale:literal => [$($name:literal),* $(,)?]),* $(,)?) => {
        vec![
            (
                "layout.html",
                include_str!("../../../templates/notifications/layout.html"),
            ),
            $($((
                concat!($locale, "/", $name, ".html"),
                include_str!(concat!(
                    "../../../templates/notifications/",
                    $locale,
                    "/",
                    $name,
                    ".html"
                )),
            ),)*)*
        ]
    };
}

/// レンダリング済みのメール（宛先は受信者ごとに付ける）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html:    String,
}

/// テンプレートレンダラー
pub struct TemplateRenderer {
    engine: Tera,
}

impl TemplateRenderer {
    /// 埋め込みテンプレートを tera に登録する
    pub fn new() -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(notification_templates! {
                "en" => [
                    "page_parent_request",
                    "comment_created",
                    "solution_marked",
                    "solution_unmarked",
                    "volunteer_created",
                    "status_done",
                    "status_change",
                    "proposition_created_linked",
                    "owner_vote_threshold",
                ],
                "fr" => [
                    "page_parent_request",
                    "comment_created",
                    "solution_marked",
                    "solution_unmarked",
                    "volunteer_created",
                    "status_done",
                    "status_change",
                    "proposition_created_linked",
                    "owner_vote_threshold",
                ],
            })
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// 本文パラメータから件名と HTML 本文を生成する
    pub fn render(&self, params: &MessageParams) -> Result<RenderedEmail, NotificationError> {
        let template_name = format!("{}/{}.html", params.locale, params.event_type);

        let html = self
            .engine
            .render(&template_name, &Self::build_context(params))
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(RenderedEmail {
            subject: build_subject(params),
            html,
        })
    }

    fn build_context(params: &MessageParams) -> Context {
        let mut context = Context::new();
        context.insert("lang", params.locale.as_str());
        context.insert("actor_name", &params.actor_name);
        context.insert("link", &params.link);
        context.insert(
            "proposition_title",
            params.proposition_title.as_deref().unwrap_or_default(),
        );
        context.insert("page_name", params.page_name.as_deref().unwrap_or_default());
        context.insert(
            "child_page_name",
            params.child_page_name.as_deref().unwrap_or_default(),
        );
        context.insert(
            "status_label",
            params.status_label.as_deref().unwrap_or_default(),
        );
        context
    }
}

/// 件名を組み立てる
fn build_subject(params: &MessageParams) -> String {
    let title = params.proposition_title.as_deref().unwrap_or_default();
    let page = params.page_name.as_deref().unwrap_or_default();
    let child = params.child_page_name.as_deref().unwrap_or_default();
    let actor = params.actor_name.as_str();

    let body = match (params.event_type, params.locale) {
        (NotificationEventType::PageParentRequest, Locale::En) => {
            format!("{actor} wants to link {child} under {page}")
        }
        (NotificationEventType::PageParentRequest, Locale::Fr) => {
            format!("{actor} souhaite rattacher {child} à {page}")
        }
        (NotificationEventType::CommentCreated, Locale::En) => {
            format!("New comment on \"{title}\"")
        }
        (NotificationEventType::CommentCreated, Locale::Fr) => {
            format!("Nouveau commentaire sur « {title} »")
        }
        (NotificationEventType::SolutionMarked, Locale::En) => {
            "Your comment was marked as a solution".to_string()
        }
        (NotificationEventType::SolutionMarked, Locale::Fr) => {
            "Votre commentaire a été marqué comme solution".to_string()
        }
        (NotificationEventType::SolutionUnmarked, Locale::En) => {
            "Your comment is no longer marked as a solution".to_string()
        }
        (NotificationEventType::SolutionUnmarked, Locale::Fr) => {
            "Votre commentaire n'est plus marqué comme solution".to_string()
        }
        (NotificationEventType::VolunteerCreated, Locale::En) => {
            format!("New volunteer on \"{title}\"")
        }
        (NotificationEventType::VolunteerCreated, Locale::Fr) => {
            format!("Nouveau volontaire sur « {title} »")
        }
        (NotificationEventType::StatusDone, Locale::En) => format!("\"{title}\" is done"),
        (NotificationEventType::StatusDone, Locale::Fr) => format!("« {title} » est terminée"),
        (NotificationEventType::StatusChange, Locale::En) => {
            format!("Status update for \"{title}\"")
        }
        (NotificationEventType::StatusChange, Locale::Fr) => {
            format!("Changement de statut pour « {title} »")
        }
        (NotificationEventType::PropositionCreatedLinked, Locale::En) => {
            format!("New proposition on {page}: \"{title}\"")
        }
        (NotificationEventType::PropositionCreatedLinked, Locale::Fr) => {
            format!("Nouvelle proposition sur {page} : « {title} »")
        }
        (NotificationEventType::OwnerVoteThreshold, Locale::En) => {
            format!("\"{title}\" is gaining votes on {page}")
        }
        (NotificationEventType::OwnerVoteThreshold, Locale::Fr) => {
            format!("« {title} » gagne des votes sur {page}")
        }
    };

    format!("{SUBJECT_PREFIX} {body}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    fn make_params(event_type: NotificationEventType, locale: Locale) -> MessageParams {
        MessageParams {
            event_type,
            locale,
            actor_name: "Alice".to_string(),
            link: "http://localhost:3000/en/propositions/p1".to_string(),
            proposition_title: Some("Dark mode".to_string()),
            page_name: Some("Acme".to_string()),
            child_page_name: Some("Acme Labs".to_string()),
            status_label: Some("Done".to_string()),
        }
    }

    #[test]
    fn newが正常に初期化される() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn 全種別と全ロケールでレンダリングできる() {
        let renderer = TemplateRenderer::new().unwrap();

        for event_type in NotificationEventType::iter() {
            for locale in [Locale::En, Locale::Fr] {
                let email = renderer.render(&make_params(event_type, locale)).unwrap();
                // tera は `/` を `&#x2F;` にエスケープする
                let html = email.html.replace("&#x2F;", "/");

                assert!(email.subject.starts_with("[Propel] "), "{event_type}/{locale}");
                assert!(
                    html.contains("http://localhost:3000/en/propositions/p1"),
                    "{event_type}/{locale}"
                );
                assert!(
                    html.contains(&format!("lang=\"{locale}\"")),
                    "{event_type}/{locale}"
                );
            }
        }
    }

    #[rstest]
    #[case(Locale::En, "[Propel] New comment on \"Dark mode\"")]
    #[case(Locale::Fr, "[Propel] Nouveau commentaire sur « Dark mode »")]
    fn comment_createdの件名がロケールで切り替わる(
        #[case] locale: Locale,
        #[case] expected: &str,
    ) {
        let renderer = TemplateRenderer::new().unwrap();

        let email = renderer
            .render(&make_params(NotificationEventType::CommentCreated, locale))
            .unwrap();

        assert_eq!(email.subject, expected);
        assert!(email.html.contains("Alice"));
        assert!(email.html.contains("Dark mode"));
    }

    #[test]
    fn page_parent_requestは両方のページ名を含む() {
        let renderer = TemplateRenderer::new().unwrap();

        let email = renderer
            .render(&make_params(
                NotificationEventType::PageParentRequest,
                Locale::En,
            ))
            .unwrap();

        assert_eq!(
            email.subject,
            "[Propel] Alice wants to link Acme Labs under Acme"
        );
        assert!(email.html.contains("Acme Labs"));
    }

    #[test]
    fn status_doneはステータス表示名を含む() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut params = make_params(NotificationEventType::StatusDone, Locale::Fr);
        params.status_label = Some("Terminée".to_string());

        let email = renderer.render(&params).unwrap();

        assert_eq!(email.subject, "[Propel] « Dark mode » est terminée");
        assert!(email.html.contains("Terminée"));
    }

    #[test]
    fn status_changeでステータス未指定なら行を出さない() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut params = make_params(NotificationEventType::StatusChange, Locale::En);
        params.status_label = None;

        let email = renderer.render(&params).unwrap();

        assert!(!email.html.contains("New status:"));
    }

    #[test]
    fn ユーザー入力はhtmlエスケープされる() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut params = make_params(NotificationEventType::CommentCreated, Locale::En);
        params.actor_name = "<script>alert(1)</script>".to_string();

        let email = renderer.render(&params).unwrap();

        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("&lt;script&gt;"));
    }
}

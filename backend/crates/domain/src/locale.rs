//! # ロケール
//!
//! 通知メールは英語とフランス語の 2 ロケールのみをサポートする。
//! 翻訳カタログそのものは持たず、テンプレートの選択と
//! 固定の語彙（ステータス表示名など）の切り替えにだけ使う。

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

/// 通知メールのロケール
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Locale {
    /// 英語（デフォルト）
    #[default]
    En,
    /// フランス語
    Fr,
}

impl Locale {
    /// リクエストの `locale` 値からロケールを決める
    ///
    /// `fr`、`fr-FR`、`fr_CA` のようなフランス語指定のみ [`Locale::Fr`] とし、
    /// 未指定・未知の値はすべて [`Locale::En`] にフォールバックする。
    pub fn from_request(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };
        let language = value
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "fr" => Self::Fr,
            _ => Self::En,
        }
    }

    /// URL パスやテンプレートディレクトリに使う識別子
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

//! # ユーザー
//!
//! 通知の受信者・操作者として参照されるユーザーを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`UserId`] | ユーザー ID | 認証セッションが解決する `authenticatedUserId` と同じ空間 |
//! | [`UserProfile`] | プロフィール | メール送信先と表示名の解決に使う読み取り専用ビュー |
//!
//! ユーザーの作成・更新は認証基盤（外部）の責務。この crate では読むだけ。

use serde::{Deserialize, Serialize};

use crate::DomainError;

define_uuid_id! {
    /// ユーザー ID（一意識別子）
    pub struct UserId;
}

/// メールアドレス（値オブジェクト）
///
/// 生成時にバリデーションを実行し、不正な値の作成を防ぐ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 前後の空白を除いて空文字列ではない
    /// - `local@domain` の形式
    /// - 最大 255 文字
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::invalid_email(&value, "空"));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::invalid_email(&value, "@ が無い"));
        };

        if local.is_empty() || domain.is_empty() {
            return Err(DomainError::invalid_email(&value, "ローカル部またはドメインが空"));
        }

        if value.len() > 255 {
            return Err(DomainError::invalid_email(&value, "255 文字超"));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 匿名表示名
///
/// 氏名・ユーザー名・メールアドレスのいずれも無い場合に使う。
pub const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

/// ユーザープロフィール
///
/// `email` は未登録または形式不正の場合 `None`。
/// 受信者解決ではメールアドレスの無いユーザーは黙って除外される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    id:        UserId,
    username:  Option<String>,
    full_name: Option<String>,
    email:     Option<Email>,
}

impl UserProfile {
    pub fn new(
        id: UserId,
        username: Option<String>,
        full_name: Option<String>,
        email: Option<Email>,
    ) -> Self {
        Self {
            id,
            username,
            full_name,
            email,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    /// メール本文に載せる表示名
    ///
    /// 氏名 → ユーザー名 → メールアドレス → `"Anonymous"` の順に、
    /// 空白のみの値を飛ばして最初に見つかったものを返す。
    pub fn display_name(&self) -> &str {
        [self.full_name.as_deref(), self.username.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .or_else(|| self.email.as_ref().map(Email::as_str))
            .unwrap_or(ANONYMOUS_DISPLAY_NAME)
    }
}

/// プロフィールが無い場合も含めた表示名の解決
pub fn display_name_or_anonymous(profile: Option<&UserProfile>) -> &str {
    profile.map_or(ANONYMOUS_DISPLAY_NAME, UserProfile::display_name)
}

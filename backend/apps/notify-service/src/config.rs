//! # Notify Service 設定
//!
//! 環境変数から通知サービスの設定を読み込む。

use std::env;

use thiserror::Error;
use url::Url;

const DEFAULT_APP_URL: &str = "http://localhost:3000";
const DEFAULT_FROM_ADDRESS: &str = "Propel <noreply@propel.example.com>";

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値の形式が不正
    #[error("{name} の値が不正です: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Notify Service サーバーの設定
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// バインドアドレス
    pub host:            String,
    /// ポート番号
    pub port:            u16,
    /// データベース接続 URL
    pub database_url:    String,
    /// Web アプリのベース URL（メール内リンク用、末尾スラッシュなし）
    pub app_url:         String,
    /// 許可する `Origin` の一覧
    pub allowed_origins: Vec<String>,
    /// リクエスト署名の共有シークレット（未設定なら署名検証しない）
    pub signing_secret:  Option<String>,
    /// 通知設定
    pub notification:    NotificationConfig,
}

/// 送信バックエンドの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationBackend {
    Smtp,
    Ses,
    Resend,
    Noop,
}

impl NotificationBackend {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp),
            "ses" => Ok(Self::Ses),
            "resend" => Ok(Self::Resend),
            "noop" | "" => Ok(Self::Noop),
            _ => Err(ConfigError::Invalid {
                name:  "NOTIFICATION_BACKEND",
                value: value.to_string(),
            }),
        }
    }
}

/// 通知機能の設定
///
/// `NOTIFICATION_BACKEND` 環境変数で送信バックエンドを切り替える:
/// - `smtp`: Mailpit（開発）/ SMTP サーバー経由で送信
/// - `ses`: Amazon SES v2 経由で送信
/// - `resend`: Resend HTTP API 経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub backend:        NotificationBackend,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host:      String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port:      u16,
    /// 送信元アドレス
    pub from_address:   String,
    /// Resend の API キー（backend=resend の場合に使用）
    pub resend_api_key: Option<String>,
}

impl NotifyConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port_raw = get("NOTIFY_PORT").ok_or(ConfigError::Missing("NOTIFY_PORT"))?;
        let port = parse_port("NOTIFY_PORT", &port_raw)?;
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let app_url = get("APP_URL")
            .unwrap_or_else(|| DEFAULT_APP_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        let allowed_origins = match get("ALLOWED_ORIGINS") {
            Some(raw) => parse_origin_list(&raw),
            None => vec![origin_of(&app_url)?],
        };

        Ok(Self {
            host: get("NOTIFY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url,
            app_url,
            allowed_origins,
            signing_secret: get("NOTIFY_SIGNING_SECRET"),
            notification: NotificationConfig::from_lookup(&get)?,
        })
    }
}

impl NotificationConfig {
    fn from_lookup(get: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match get("NOTIFICATION_BACKEND") {
            Some(raw) => NotificationBackend::parse(&raw)?,
            None => NotificationBackend::Noop,
        };
        let smtp_port = match get("SMTP_PORT") {
            Some(raw) => parse_port("SMTP_PORT", &raw)?,
            None => 1025,
        };

        Ok(Self {
            backend,
            smtp_host: get("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
            smtp_port,
            from_address: get("NOTIFICATION_FROM_ADDRESS")
                .unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            resend_api_key: get("RESEND_API_KEY"),
        })
    }
}

fn parse_port(name: &'static str, raw: &str) -> Result<u16, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}

/// カンマ区切りの Origin 一覧を正規化する（末尾スラッシュは取り除く）
fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// URL から `scheme://host[:port]` 形式の Origin を取り出す
fn origin_of(app_url: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::Invalid {
        name:  "APP_URL",
        value: app_url.to_string(),
    };
    let url = Url::parse(app_url).map_err(|_| invalid())?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(invalid());
    }
    Ok(origin.ascii_serialization())
}

//! # ログ出力の初期化
//!
//! `LOG_FORMAT`（`json` / `pretty`）と `RUST_LOG` から subscriber を組み立てる。
//! 通知の監査は JSON ログの `event.*` フィールドで行うため、本番は `json` を前提とする。

/// 既定のフィルタ（`RUST_LOG` 未設定時）
pub const DEFAULT_FILTER: &str = "info,propel=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 行 1 イベントの JSON（フィールドはフラット化）
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// 大文字小文字と前後の空白は無視する
    ///
    /// 不明な値は `Pretty` に倒す。subscriber の初期化前なので警告は stderr に直接出す。
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => {
                eprintln!("WARNING: unknown LOG_FORMAT={s:?}, falling back to pretty");
                Self::Pretty
            }
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// 起動ログに出すサービス名
    pub service_name: String,
    pub log_format:   LogFormat,
    /// `RUST_LOG` の値（未設定なら [`DEFAULT_FILTER`]）
    pub filter:       String,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
            filter: DEFAULT_FILTER.to_string(),
        }
    }

    /// `LOG_FORMAT` と `RUST_LOG` を読む
    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self::from_lookup(service_name, |name| std::env::var(name).ok())
    }

    fn from_lookup(
        service_name: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let log_format = lookup("LOG_FORMAT").map_or_else(LogFormat::default, |v| LogFormat::parse(&v));
        let mut config = Self::new(service_name, log_format);
        if let Some(filter) = lookup("RUST_LOG").filter(|v| !v.trim().is_empty()) {
            config.filter = filter;
        }
        config
    }
}

/// グローバル subscriber を登録する
///
/// `tracing_error::ErrorLayer` も登録するので、`InfraError` は生成時の
/// `SpanTrace` を持てる。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) {
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|e| {
        eprintln!("WARNING: invalid RUST_LOG={:?} ({e}), using default", config.filter);
        EnvFilter::new(DEFAULT_FILTER)
    });

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .init();

    tracing::debug!(
        service = %config.service_name,
        log_format = ?config.log_format,
        "トレーシングを初期化しました"
    );
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_parseは大文字小文字と空白を無視する() {
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("Pretty"), LogFormat::Pretty);
    }

    #[test]
    fn test_parse_不正な値でprettyにフォールバックする() {
        assert_eq!(LogFormat::parse("yaml"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(""), LogFormat::Pretty);
    }

    #[test]
    fn test_環境変数が無ければ既定値() {
        let config = TracingConfig::from_lookup("notify-service", lookup(&[]));

        assert_eq!(config.service_name, "notify-service");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.filter, DEFAULT_FILTER);
    }

    #[test]
    fn test_log_formatとrust_logを読む() {
        let config = TracingConfig::from_lookup(
            "notify-service",
            lookup(&[("LOG_FORMAT", "json"), ("RUST_LOG", "warn")]),
        );

        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.filter, "warn");
    }
}

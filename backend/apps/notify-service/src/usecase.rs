//! # ユースケース層
//!
//! 通知リクエストの解決 → 認可 → 受信者解決 → 配信をまとめる。

pub mod notification;

pub use notification::{
    DeliveryDispatcher,
    DeliveryReport,
    NotificationOutcome,
    NotificationRepositories,
    NotificationUseCase,
    RecipientResolver,
    ResourceResolver,
    TemplateRenderer,
};

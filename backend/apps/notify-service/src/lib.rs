//! # Propel Notify Service ライブラリ
//!
//! 通知サービスのハンドラ・ユースケース・ルーター構築を公開する。
//! 結合テストからルーターを直接組み立てるために lib として切り出している。

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod usecase;

//! # ミドルウェア
//!
//! 通知エンドポイントの前段で行う呼び出し元の検証。
//!
//! 適用順: Origin 検証 → 署名検証 → ハンドラ

mod origin;
mod signature;

pub use origin::{OriginState, verify_origin};
pub use signature::{SIGNATURE_HEADER, SignatureState, sign_body, verify_signature};

//! # リクエスト署名検証ミドルウェア
//!
//! 生のリクエストボディに対する HMAC-SHA256 署名を検証する。
//! 署名は `X-Propel-Signature: sha256=<hex>` で渡される。
//!
//! 比較は `subtle` による定数時間比較で行う。
//! ボディが 64 KiB を超える場合は検証せず 400 を返す。

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::NotifyError;

/// 署名ヘッダー名
pub const SIGNATURE_HEADER: &str = "x-propel-signature";

pub const INVALID_SIGNATURE: &str = "Invalid signature.";

pub const PAYLOAD_TOO_LARGE: &str = "Payload too large.";

/// 検証のために読み込むボディの上限
const MAX_BODY_BYTES: usize = 64 * 1024;

type HmacSha256 = Hmac<Sha256>;

/// 署名検証の状態
#[derive(Clone)]
pub struct SignatureState {
    secret: Arc<Vec<u8>>,
}

impl SignatureState {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Arc::new(secret.into()),
        }
    }

    /// ヘッダー値がボディの署名として正しいか
    fn verify(&self, body: &[u8], header: &str) -> bool {
        let Some(signature_hex) = header.trim().strip_prefix("sha256=") else {
            return false;
        };
        let Ok(provided) = hex::decode(signature_hex) else {
            return false;
        };
        let Some(computed) = compute(&self.secret, body) else {
            return false;
        };
        computed.ct_eq(&provided).into()
    }
}

fn compute(secret: &[u8], body: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(body);
    Some(mac.finalize().into_bytes().to_vec())
}

/// ボディに署名してヘッダー値（`sha256=<hex>`）を返す
///
/// 呼び出し側の実装やテストで使う。
pub fn sign_body(secret: &[u8], body: &[u8]) -> String {
    let digest = compute(secret, body).unwrap_or_default();
    format!("sha256={}", hex::encode(digest))
}

fn invalid_signature() -> Response {
    NotifyError::Unauthorized(INVALID_SIGNATURE.to_string()).into_response()
}

/// 署名検証ミドルウェア
///
/// ボディを一度読み込んで検証し、同じバイト列でリクエストを組み立て直して次へ渡す。
pub async fn verify_signature(
    State(state): State<SignatureState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let Some(header) = parts
        .headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    else {
        tracing::warn!("署名ヘッダーがありません");
        return invalid_signature();
    };

    // 上限超過は署名の不一致と区別して 400 を返す
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(
                limit = MAX_BODY_BYTES,
                error = %e,
                "ボディが上限を超えているため署名を検証しない"
            );
            return NotifyError::BadRequest(PAYLOAD_TOO_LARGE.to_string()).into_response();
        }
    };

    if !state.verify(&bytes, &header) {
        tracing::warn!("署名が一致しません");
        return invalid_signature();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

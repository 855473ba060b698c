//! # Origin 検証ミドルウェア
//!
//! `Origin` ヘッダーが許可リストに含まれるかを検証する。
//!
//! - `Origin` があり、許可リストに無い → 403
//! - `Origin` が無い → `require_origin` のときだけ 403
//!
//! 署名検証が有効な構成では、サーバー間呼び出しで `Origin` が付かないため
//! `require_origin` を切る。

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::ORIGIN},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::NotifyError;

pub const FORBIDDEN_ORIGIN: &str = "Forbidden origin.";

/// Origin 検証の状態
#[derive(Debug, Clone)]
pub struct OriginState {
    pub allowed_origins: Arc<Vec<String>>,
    pub require_origin:  bool,
}

impl OriginState {
    pub fn new(allowed_origins: Vec<String>, require_origin: bool) -> Self {
        Self {
            allowed_origins: Arc::new(allowed_origins),
            require_origin,
        }
    }

    fn is_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            Some(origin) => {
                let origin = origin.trim().trim_end_matches('/');
                self.allowed_origins
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(origin))
            }
            None => !self.require_origin,
        }
    }
}

/// Origin 検証ミドルウェア
pub async fn verify_origin(
    State(state): State<OriginState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .map(|v| v.to_str().unwrap_or_default());

    if !state.is_allowed(origin) {
        tracing::warn!(origin = ?origin, "許可されていない Origin からのリクエスト");
        return NotifyError::ForbiddenOrigin(FORBIDDEN_ORIGIN.to_string()).into_response();
    }

    next.run(request).await
}

//! # 認証ミドルウェア
//!
//! 保護対象ルートの前段で authorization ヘッダーを検証し、
//! 復元したペイロードをリクエスト拡張に格納する。
//!
//! ## 検証順序
//!
//! 1. ヘッダーの存在（なければ `NoAuthorizationHeader`）
//! 2. フィールド数（2 未満なら `InvalidAuthorizationHeader`）
//! 3. 認証方式（bearer 以外なら `InvalidAuthorizationType`）
//! 4. トークン検証（期限切れ・無効はそのままエラー種別を伝播）
//!
//! 失敗時は後続のハンドラを呼ばずに 401 を返す。

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use gekijo_domain::token::Payload;
use gekijo_infra::TokenMaker;

use crate::error::ApiError;

/// 受理する認証方式（大文字小文字を区別しない）
const AUTHORIZATION_TYPE_BEARER: &str = "bearer";

/// 認証ミドルウェアの状態
#[derive(Clone)]
pub struct AuthState {
    pub token_maker: Arc<dyn TokenMaker>,
}

/// 認証を要求するミドルウェア
///
/// 検証に成功したペイロードをリクエスト拡張に挿入する。
/// ハンドラは [`AuthPayload`] エクストラクタで取り出す。
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let payload = match authorize(&state, request.headers()) {
        Ok(payload) => payload,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(payload);
    next.run(request).await
}

/// authorization ヘッダーを検証し、ペイロードを復元する
fn authorize(state: &AuthState, headers: &HeaderMap) -> Result<Payload, ApiError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if header_value.is_empty() {
        return Err(ApiError::NoAuthorizationHeader);
    }

    let mut fields = header_value.split_whitespace();
    let (Some(auth_type), Some(token)) = (fields.next(), fields.next()) else {
        return Err(ApiError::InvalidAuthorizationHeader);
    };

    if !auth_type.eq_ignore_ascii_case(AUTHORIZATION_TYPE_BEARER) {
        return Err(ApiError::InvalidAuthorizationType);
    }

    Ok(state.token_maker.verify_token(token)?)
}

/// 認証済みペイロードを取り出すエクストラクタ
///
/// [`require_auth`] が通過済みのルートでのみ成功する。
/// ミドルウェアを通していないルートで使うとペイロードが存在せず
/// 401 になる。
pub struct AuthPayload(pub Payload);

impl<S> FromRequestParts<S> for AuthPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Payload>()
            .cloned()
            .map(AuthPayload)
            .ok_or(ApiError::NoAuthorizationHeader)
    }
}

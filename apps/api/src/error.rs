//! # API エラー定義
//!
//! ハンドラ・ミドルウェアで発生するエラーと HTTP レスポンスへの
//! 変換を定義する。
//!
//! ## ステータスコードの方針
//!
//! - 認証失敗（ヘッダー不備・トークン不正・所有者不一致）はすべて
//!   401。403 は使わない（認証主体の確認に失敗した扱いに統一）
//! - 一意制約違反（ユーザー名重複）のみ 403
//! - エラー本文は RFC 9457 Problem Details（[`ErrorResponse`]）

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gekijo_domain::DomainError;
use gekijo_infra::{InfraError, TokenError};
use gekijo_shared::ErrorResponse;
use thiserror::Error;

/// API 層で発生するエラー
#[derive(Debug, Error)]
pub enum ApiError {
    /// authorization ヘッダーが存在しない
    #[error("authorization ヘッダーがありません")]
    NoAuthorizationHeader,

    /// authorization ヘッダーの形式が不正（フィールド数が足りない）
    #[error("authorization ヘッダーの形式が不正です")]
    InvalidAuthorizationHeader,

    /// bearer 以外の認証方式が指定された
    #[error("サポートされていない認証方式です")]
    InvalidAuthorizationType,

    /// トークン検証エラー（期限切れ・無効）
    #[error(transparent)]
    Token(#[from] TokenError),

    /// 認証済みユーザーがリソースの所有者でない
    #[error("このリソースを操作する権限がありません")]
    UnauthorizedAction,

    /// ログイン時のパスワード不一致
    #[error("パスワードが一致しません")]
    InvalidPassword,

    /// リソースが存在しない
    #[error("{entity} が見つかりません")]
    NotFound { entity: &'static str },

    /// リクエスト内容のバリデーションエラー
    #[error("{0}")]
    Validation(String),

    /// 一意制約違反（重複登録）
    #[error("{entity} は既に存在します（{field} が重複）")]
    Duplicate { entity: String, field: String },

    /// インフラ層のエラー（詳細はクライアントに返さない）
    #[error(transparent)]
    Infra(InfraError),
}

impl ApiError {
    /// エンティティ名を指定した NotFound エラーを生成する
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
        }
    }
}

impl From<InfraError> for ApiError {
    fn from(err: InfraError) -> Self {
        // 一意制約違反のみクライアント起因のエラーとして区別する
        match err.as_unique_violation() {
            Some((entity, field)) => Self::Duplicate {
                entity: entity.to_string(),
                field:  field.to_string(),
            },
            None => Self::Infra(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::NoAuthorizationHeader => {
                ErrorResponse::new("no-authorization-header", "Unauthorized", 401, self.to_string())
            }
            Self::InvalidAuthorizationHeader => ErrorResponse::new(
                "invalid-authorization-header",
                "Unauthorized",
                401,
                self.to_string(),
            ),
            Self::InvalidAuthorizationType => ErrorResponse::new(
                "invalid-authorization-type",
                "Unauthorized",
                401,
                self.to_string(),
            ),
            Self::Token(TokenError::ExpiredToken) => {
                ErrorResponse::new("expired-token", "Unauthorized", 401, self.to_string())
            }
            Self::Token(TokenError::InvalidToken) => {
                ErrorResponse::new("invalid-token", "Unauthorized", 401, self.to_string())
            }
            Self::Token(TokenError::InvalidSecretKeySize) => {
                // 鍵長エラーは起動時にしか起こり得ない
                tracing::error!("リクエスト処理中に鍵長エラーが発生しました");
                ErrorResponse::internal_error()
            }
            Self::UnauthorizedAction => {
                ErrorResponse::new("unauthorized-action", "Unauthorized", 401, self.to_string())
            }
            Self::InvalidPassword => {
                ErrorResponse::new("invalid-password", "Not Found", 404, self.to_string())
            }
            Self::NotFound { .. } => ErrorResponse::not_found(self.to_string()),
            Self::Validation(_) => ErrorResponse::bad_request(self.to_string()),
            Self::Duplicate { .. } => ErrorResponse::forbidden(self.to_string()),
            Self::Infra(err) => {
                tracing::error!(
                    error = %err,
                    span_trace = %err.span_trace(),
                    "インフラ層エラーが発生しました"
                );
                ErrorResponse::internal_error()
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

//! # ユーザーハンドラ
//!
//! ユーザー登録とログイン（アクセストークン発行）を提供する。
//!
//! ## レスポンスの方針
//!
//! パスワードハッシュはいかなるレスポンスにも含めない。
//! ログイン失敗は「ユーザー不存在」「パスワード不一致」とも 404
//! で返し、攻撃者への情報を最小化する。

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::{DateTime, Duration, Utc};
use gekijo_domain::user::{Email, PlainPassword, User, Username};
use gekijo_infra::{PasswordHasher, TokenMaker, repository::UserRepository};
use gekijo_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// ユーザーハンドラの状態
#[derive(Clone)]
pub struct UserState {
    pub user_repository:       Arc<dyn UserRepository>,
    pub password_hasher:       Arc<dyn PasswordHasher>,
    pub token_maker:           Arc<dyn TokenMaker>,
    pub access_token_duration: Duration,
}

/// ユーザー登録リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email:    String,
}

/// ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct LoginUserRequest {
    pub username: String,
    pub password: String,
}

/// 機微情報を除いたユーザーレスポンス
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username:   String,
    pub email:      String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username:   user.username.into_string(),
            email:      user.email.into_string(),
            created_at: user.created_at,
        }
    }
}

/// ログインレスポンス
#[derive(Debug, Serialize)]
pub struct LoginUserResponse {
    pub access_token: String,
    pub user:         UserResponse,
}

/// ユーザーを登録する
///
/// ユーザー名が既に存在する場合は 403 を返す。
pub async fn create_user(
    State(state): State<UserState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let username = Username::new(request.username)?;
    let password = PlainPassword::new(request.password)?;
    let email = Email::new(request.email)?;

    let hashed_password = state.password_hasher.hash(&password)?;

    let user = state
        .user_repository
        .create(username, email, hashed_password)
        .await?;

    Ok(Json(ApiResponse::new(user.into())))
}

/// ログインしてアクセストークンを発行する
pub async fn login_user(
    State(state): State<UserState>,
    Json(request): Json<LoginUserRequest>,
) -> Result<Json<ApiResponse<LoginUserResponse>>, ApiError> {
    let username = Username::new(request.username)?;
    let password = PlainPassword::new(request.password)?;

    let user = state
        .user_repository
        .find_by_username(&username)
        .await?
        .ok_or(ApiError::not_found("User"))?;

    if !state
        .password_hasher
        .verify(&password, &user.hashed_password)?
    {
        return Err(ApiError::InvalidPassword);
    }

    let access_token = state
        .token_maker
        .create_token(user.username.clone(), state.access_token_duration)?;

    Ok(Json(ApiResponse::new(LoginUserResponse {
        access_token,
        user: user.into(),
    })))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use gekijo_domain::user::PasswordHash;
    use gekijo_infra::{InfraError, JwtTokenMaker};
    use pretty_assertions::assert_eq;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    /// 固定ユーザーを保持するスタブリポジトリ
    struct StubUserRepository {
        users: Vec<User>,
    }

    #[async_trait]
    impl UserRepository for StubUserRepository {
        async fn create(
            &self,
            username: Username,
            email: Email,
            hashed_password: PasswordHash,
        ) -> Result<User, InfraError> {
            if self.users.iter().any(|u| u.username == username) {
                return Err(InfraError::unique_violation("User", "username"));
            }

            Ok(User {
                username,
                email,
                hashed_password,
                created_at: Utc::now(),
            })
        }

        async fn find_by_username(&self, username: &Username) -> Result<Option<User>, InfraError> {
            Ok(self.users.iter().find(|u| &u.username == username).cloned())
        }
    }

    /// Argon2 を避ける決定的なスタブハッシャー
    struct StubPasswordHasher;

    impl PasswordHasher for StubPasswordHasher {
        fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, InfraError> {
            Ok(PasswordHash::new(format!("stub:{}", password.as_str())))
        }

        fn verify(
            &self,
            password: &PlainPassword,
            hash: &PasswordHash,
        ) -> Result<bool, InfraError> {
            Ok(hash.as_str() == format!("stub:{}", password.as_str()))
        }
    }

    fn existing_user(username: &str, password: &str) -> User {
        User {
            username:        Username::new(username).unwrap(),
            email:           Email::new(format!("{username}@example.com")).unwrap(),
            hashed_password: PasswordHash::new(format!("stub:{password}")),
            created_at:      Utc::now(),
        }
    }

    fn state(users: Vec<User>) -> UserState {
        UserState {
            user_repository:       Arc::new(StubUserRepository { users }),
            password_hasher:       Arc::new(StubPasswordHasher),
            token_maker:           Arc::new(JwtTokenMaker::new(SECRET).unwrap()),
            access_token_duration: Duration::minutes(15),
        }
    }

    #[tokio::test]
    async fn test_create_userはパスワードを含まないレスポンスを返す() {
        let request = CreateUserRequest {
            username: "theatregoer".to_string(),
            password: "super-secret-password".to_string(),
            email:    "goer@example.com".to_string(),
        };

        let Json(response) = create_user(State(state(vec![])), Json(request))
            .await
            .unwrap();

        assert_eq!(response.data.username, "theatregoer");
        let json = serde_json::to_string(&response.data).unwrap();
        assert!(!json.contains("super-secret-password"));
        assert!(!json.contains("password"));
    }

    #[tokio::test]
    async fn test_create_userは重複ユーザー名を403相当のエラーにする() {
        let users = vec![existing_user("theatregoer", "irrelevant-pass")];
        let request = CreateUserRequest {
            username: "theatregoer".to_string(),
            password: "super-secret-password".to_string(),
            email:    "other@example.com".to_string(),
        };

        let result = create_user(State(state(users)), Json(request)).await;

        assert!(matches!(result, Err(ApiError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn test_create_userは短すぎるユーザー名を400で拒否する() {
        let request = CreateUserRequest {
            username: "ozu".to_string(),
            password: "super-secret-password".to_string(),
            email:    "ozu@example.com".to_string(),
        };

        let result = create_user(State(state(vec![])), Json(request)).await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_userは検証可能なトークンを発行する() {
        let users = vec![existing_user("theatregoer", "correct-password")];
        let request = LoginUserRequest {
            username: "theatregoer".to_string(),
            password: "correct-password".to_string(),
        };

        let Json(response) = login_user(State(state(users)), Json(request))
            .await
            .unwrap();

        // 発行されたトークンは同じ鍵で検証でき、サブジェクトが一致する
        let maker = JwtTokenMaker::new(SECRET).unwrap();
        let payload = maker.verify_token(&response.data.access_token).unwrap();
        assert_eq!(payload.username.as_str(), "theatregoer");
        assert_eq!(response.data.user.username, "theatregoer");
    }

    #[tokio::test]
    async fn test_login_userは存在しないユーザーに404を返す() {
        let request = LoginUserRequest {
            username: "nosuchuser".to_string(),
            password: "whatever-password".to_string(),
        };

        let result = login_user(State(state(vec![])), Json(request)).await;

        assert!(matches!(result, Err(ApiError::NotFound { entity: "User" })));
    }

    #[tokio::test]
    async fn test_login_userはパスワード不一致を404にする() {
        let users = vec![existing_user("theatregoer", "correct-password")];
        let request = LoginUserRequest {
            username: "theatregoer".to_string(),
            password: "wrong-password-entirely".to_string(),
        };

        let result = login_user(State(state(users)), Json(request)).await;

        assert!(matches!(result, Err(ApiError::InvalidPassword)));
    }
}

//! # UserRepository
//!
//! ユーザー情報の永続化を担当するリポジトリ。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gekijo_domain::user::{Email, PasswordHash, User, Username};
use sqlx::PgPool;

use crate::{error::InfraError, repository::is_unique_violation};

/// ユーザーリポジトリトレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを作成する
    ///
    /// # エラー
    ///
    /// ユーザー名が既に存在する場合は
    /// [`InfraErrorKind::UniqueViolation`](crate::error::InfraErrorKind::UniqueViolation)
    /// を返す。
    async fn create(
        &self,
        username: Username,
        email: Email,
        hashed_password: PasswordHash,
    ) -> Result<User, InfraError>;

    /// ユーザー名でユーザーを検索する
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, InfraError>;
}

/// DB 行の中間表現
#[derive(sqlx::FromRow)]
struct UserRow {
    username:        String,
    hashed_password: String,
    email:           String,
    created_at:      DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = InfraError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let invalid = |e| InfraError::unexpected(format!("DB 上のユーザーデータが不正: {e}"));

        Ok(Self {
            username:        Username::new(row.username).map_err(invalid)?,
            email:           Email::new(row.email).map_err(invalid)?,
            hashed_password: PasswordHash::new(row.hashed_password),
            created_at:      row.created_at,
        })
    }
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%username))]
    async fn create(
        &self,
        username: Username,
        email: Email,
        hashed_password: PasswordHash,
    ) -> Result<User, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, hashed_password, email)
            VALUES ($1, $2, $3)
            RETURNING username, hashed_password, email, created_at
            "#,
        )
        .bind(username.as_str())
        .bind(hashed_password.as_str())
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                InfraError::unique_violation("User", "username")
            } else {
                e.into()
            }
        })?;

        row.try_into()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%username))]
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT username, hashed_password, email, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}

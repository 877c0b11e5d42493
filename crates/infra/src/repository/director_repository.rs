//! # DirectorRepository
//!
//! 監督情報の永続化を担当するリポジトリ。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gekijo_domain::director::{Director, FirstName, LastName, NewDirector};
use sqlx::PgPool;

use crate::error::InfraError;

/// 監督リポジトリトレイト
#[async_trait]
pub trait DirectorRepository: Send + Sync {
    /// 監督を作成する
    async fn create(&self, director: NewDirector) -> Result<Director, InfraError>;

    /// ID で監督を検索する
    async fn find_by_id(&self, id: i64) -> Result<Option<Director>, InfraError>;

    /// 監督一覧をページ単位で取得する
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Director>, InfraError>;
}

/// DB 行の中間表現
#[derive(sqlx::FromRow)]
struct DirectorRow {
    id:         i64,
    first_name: String,
    last_name:  String,
    oscars:     i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<DirectorRow> for Director {
    type Error = InfraError;

    fn try_from(row: DirectorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id:         row.id,
            first_name: FirstName::new(row.first_name)
                .map_err(|e| InfraError::unexpected(format!("DB 上の監督名が不正: {e}")))?,
            last_name:  LastName::new(row.last_name)
                .map_err(|e| InfraError::unexpected(format!("DB 上の監督名が不正: {e}")))?,
            oscars:     row.oscars,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL 実装の DirectorRepository
#[derive(Debug, Clone)]
pub struct PostgresDirectorRepository {
    pool: PgPool,
}

impl PostgresDirectorRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectorRepository for PostgresDirectorRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn create(&self, director: NewDirector) -> Result<Director, InfraError> {
        let row = sqlx::query_as::<_, DirectorRow>(
            r#"
            INSERT INTO directors (first_name, last_name, oscars)
            VALUES ($1, $2, $3)
            RETURNING id, first_name, last_name, oscars, created_at
            "#,
        )
        .bind(director.first_name.as_str())
        .bind(director.last_name.as_str())
        .bind(director.oscars)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Director>, InfraError> {
        let row = sqlx::query_as::<_, DirectorRow>(
            r#"
            SELECT id, first_name, last_name, oscars, created_at
            FROM directors
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Director::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%limit, %offset))]
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Director>, InfraError> {
        let rows = sqlx::query_as::<_, DirectorRow>(
            r#"
            SELECT id, first_name, last_name, oscars, created_at
            FROM directors
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Director::try_from).collect()
    }
}

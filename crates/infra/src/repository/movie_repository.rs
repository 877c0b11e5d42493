//! # MovieRepository
//!
//! 映画情報の永続化を担当するリポジトリ。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gekijo_domain::movie::{Movie, NewMovie, Poster, Summary, Title};
use sqlx::PgPool;

use crate::error::InfraError;

/// 映画リポジトリトレイト
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// 映画を作成する
    async fn create(&self, movie: NewMovie) -> Result<Movie, InfraError>;

    /// ID で映画を検索する
    async fn find_by_id(&self, id: i64) -> Result<Option<Movie>, InfraError>;

    /// 映画一覧を取得する（上映作品は少数のためページングなし）
    async fn list(&self, count: i64) -> Result<Vec<Movie>, InfraError>;
}

/// DB 行の中間表現
#[derive(sqlx::FromRow)]
struct MovieRow {
    id:          i64,
    title:       String,
    director_id: i64,
    rating:      i16,
    poster:      String,
    summary:     String,
    created_at:  DateTime<Utc>,
}

impl TryFrom<MovieRow> for Movie {
    type Error = InfraError;

    fn try_from(row: MovieRow) -> Result<Self, Self::Error> {
        let invalid = |e| InfraError::unexpected(format!("DB 上の映画データが不正: {e}"));

        Ok(Self {
            id:          row.id,
            title:       Title::new(row.title).map_err(invalid)?,
            director_id: row.director_id,
            rating:      row.rating,
            poster:      Poster::new(row.poster).map_err(invalid)?,
            summary:     Summary::new(row.summary).map_err(invalid)?,
            created_at:  row.created_at,
        })
    }
}

/// PostgreSQL 実装の MovieRepository
#[derive(Debug, Clone)]
pub struct PostgresMovieRepository {
    pool: PgPool,
}

impl PostgresMovieRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieRepository for PostgresMovieRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(director_id = movie.director_id))]
    async fn create(&self, movie: NewMovie) -> Result<Movie, InfraError> {
        let row = sqlx::query_as::<_, MovieRow>(
            r#"
            INSERT INTO movies (title, director_id, rating, poster, summary)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, director_id, rating, poster, summary, created_at
            "#,
        )
        .bind(movie.title.as_str())
        .bind(movie.director_id)
        .bind(movie.rating)
        .bind(movie.poster.as_str())
        .bind(movie.summary.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Movie>, InfraError> {
        let row = sqlx::query_as::<_, MovieRow>(
            r#"
            SELECT id, title, director_id, rating, poster, summary, created_at
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Movie::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%count))]
    async fn list(&self, count: i64) -> Result<Vec<Movie>, InfraError> {
        let rows = sqlx::query_as::<_, MovieRow>(
            r#"
            SELECT id, title, director_id, rating, poster, summary, created_at
            FROM movies
            ORDER BY id
            LIMIT $1
            "#,
        )
        .bind(count)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Movie::try_from).collect()
    }
}

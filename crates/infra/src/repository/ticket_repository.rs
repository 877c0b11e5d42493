//! # TicketRepository
//!
//! チケット情報の永続化を担当するリポジトリ。
//!
//! 所有者確認はハンドラ側の責務であり、このリポジトリは ID
//! 検索に所有者条件を付けない（存在確認 → 所有者確認の順序を
//! 呼び出し側で制御するため）。一覧取得のみ所有者で絞り込む。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gekijo_domain::{
    ticket::{NewTicket, Ticket},
    user::Username,
};
use sqlx::PgPool;

use crate::error::InfraError;

/// チケットリポジトリトレイト
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// チケットを作成する
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, InfraError>;

    /// ID でチケットを検索する（所有者を問わない）
    async fn find_by_id(&self, id: i64) -> Result<Option<Ticket>, InfraError>;

    /// 所有者のチケット一覧をページ単位で取得する
    async fn list_by_owner(
        &self,
        owner: &Username,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>, InfraError>;

    /// チケットを削除する
    async fn delete(&self, id: i64) -> Result<(), InfraError>;
}

/// DB 行の中間表現
#[derive(sqlx::FromRow)]
struct TicketRow {
    id:           i64,
    movie_id:     i64,
    ticket_owner: String,
    total:        i64,
    child:        i16,
    adult:        i16,
    created_at:   DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = InfraError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id:           row.id,
            movie_id:     row.movie_id,
            ticket_owner: Username::new(row.ticket_owner)
                .map_err(|e| InfraError::unexpected(format!("DB 上の所有者名が不正: {e}")))?,
            total:        row.total,
            child:        row.child,
            adult:        row.adult,
            created_at:   row.created_at,
        })
    }
}

/// PostgreSQL 実装の TicketRepository
#[derive(Debug, Clone)]
pub struct PostgresTicketRepository {
    pool: PgPool,
}

impl PostgresTicketRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PostgresTicketRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(movie_id = ticket.movie_id))]
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, InfraError> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            INSERT INTO tickets (movie_id, ticket_owner, total, child, adult)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, movie_id, ticket_owner, total, child, adult, created_at
            "#,
        )
        .bind(ticket.movie_id)
        .bind(ticket.ticket_owner.as_str())
        .bind(ticket.total)
        .bind(ticket.child)
        .bind(ticket.adult)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Ticket>, InfraError> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, movie_id, ticket_owner, total, child, adult, created_at
            FROM tickets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Ticket::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%owner, %limit, %offset))]
    async fn list_by_owner(
        &self,
        owner: &Username,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>, InfraError> {
        let rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, movie_id, ticket_owner, total, child, adult, created_at
            FROM tickets
            WHERE ticket_owner = $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Ticket::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, id: i64) -> Result<(), InfraError> {
        sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

//! # チケットハンドラ
//!
//! チケットの作成・取得・一覧・削除を提供する。全ルートが認証必須。
//!
//! ## 所有者確認の順序
//!
//! ID 指定の取得・削除は、まず存在確認（なければ 404）を行い、
//! 次に所有者確認（不一致なら 401）を行う。この順序は固定であり、
//! 他人のチケット ID を指定した場合は存在していれば 401 になる。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use gekijo_domain::{
    movie::Movie,
    ticket::{NewTicket, Ticket},
};
use gekijo_infra::{
    InfraError,
    repository::{MovieRepository, TicketRepository},
};
use gekijo_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, handler::PageQuery, middleware::AuthPayload};

/// チケットハンドラの状態
#[derive(Clone)]
pub struct TicketState {
    pub ticket_repository: Arc<dyn TicketRepository>,
    pub movie_repository:  Arc<dyn MovieRepository>,
}

/// チケットの作成リクエスト
///
/// 所有者は認証済みペイロードから決まるため本文には含まれない。
#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub movie_id: i64,
    pub total:    i64,
    pub child:    i16,
    pub adult:    i16,
}

/// 映画情報付きのチケットレスポンス
#[derive(Debug, Serialize)]
pub struct TicketWithMovie {
    pub ticket: Ticket,
    pub movie:  Movie,
}

/// チケットを作成する
///
/// 対象の映画が存在しない場合は 404 を返す。
pub async fn create_ticket(
    State(state): State<TicketState>,
    AuthPayload(payload): AuthPayload,
    Json(request): Json<CreateTicketRequest>,
) -> Result<Json<ApiResponse<TicketWithMovie>>, ApiError> {
    let new_ticket = NewTicket::new(
        request.movie_id,
        payload.username,
        request.total,
        request.child,
        request.adult,
    )?;

    let movie = state
        .movie_repository
        .find_by_id(request.movie_id)
        .await?
        .ok_or(ApiError::not_found("Movie"))?;

    let ticket = state.ticket_repository.create(new_ticket).await?;

    Ok(Json(ApiResponse::new(TicketWithMovie { ticket, movie })))
}

/// チケットを映画情報付きで 1 件取得する
///
/// 存在しなければ 404、所有者でなければ 401 を返す（この順）。
pub async fn get_ticket(
    State(state): State<TicketState>,
    AuthPayload(payload): AuthPayload,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<TicketWithMovie>>, ApiError> {
    let ticket = state
        .ticket_repository
        .find_by_id(id)
        .await?
        .ok_or(ApiError::not_found("Ticket"))?;

    if !ticket.is_owned_by(&payload.username) {
        return Err(ApiError::UnauthorizedAction);
    }

    let movie = find_movie(&state, ticket.movie_id).await?;

    Ok(Json(ApiResponse::new(TicketWithMovie { ticket, movie })))
}

/// 認証済みユーザーのチケット一覧をページ単位で取得する
///
/// 他人のチケットは含まれない（所有者で絞り込む）。
pub async fn list_tickets(
    State(state): State<TicketState>,
    AuthPayload(payload): AuthPayload,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<TicketWithMovie>>>, ApiError> {
    let (limit, offset) = query.to_limit_offset()?;

    let tickets = state
        .ticket_repository
        .list_by_owner(&payload.username, limit, offset)
        .await?;

    let mut items = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        let movie = find_movie(&state, ticket.movie_id).await?;
        items.push(TicketWithMovie { ticket, movie });
    }

    Ok(Json(ApiResponse::new(items)))
}

/// チケットを削除する
///
/// 取得と同じく、存在確認（404）→ 所有者確認（401）の順で検査する。
pub async fn delete_ticket(
    State(state): State<TicketState>,
    AuthPayload(payload): AuthPayload,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let ticket = state
        .ticket_repository
        .find_by_id(id)
        .await?
        .ok_or(ApiError::not_found("Ticket"))?;

    if !ticket.is_owned_by(&payload.username) {
        return Err(ApiError::UnauthorizedAction);
    }

    state.ticket_repository.delete(ticket.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// チケットが参照する映画を取得する
///
/// 外部キー制約により必ず存在するはずなので、欠落はデータ不整合
/// として 500 にする。
async fn find_movie(state: &TicketState, movie_id: i64) -> Result<Movie, ApiError> {
    state
        .movie_repository
        .find_by_id(movie_id)
        .await?
        .ok_or_else(|| {
            ApiError::from(InfraError::unexpected(format!(
                "チケットが参照する映画 (id={movie_id}) が存在しません"
            )))
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use gekijo_domain::{
        movie::{NewMovie, Poster, Summary, Title},
        token::Payload,
        user::Username,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    /// メモリ上の Vec を操作するスタブリポジトリ
    struct StubTicketRepository {
        tickets: Mutex<Vec<Ticket>>,
    }

    #[async_trait]
    impl TicketRepository for StubTicketRepository {
        async fn create(&self, ticket: NewTicket) -> Result<Ticket, InfraError> {
            let mut tickets = self.tickets.lock().unwrap();
            let created = Ticket {
                id:           i64::try_from(tickets.len()).unwrap() + 1,
                movie_id:     ticket.movie_id,
                ticket_owner: ticket.ticket_owner,
                total:        ticket.total,
                child:        ticket.child,
                adult:        ticket.adult,
                created_at:   Utc::now(),
            };
            tickets.push(created.clone());
            Ok(created)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Ticket>, InfraError> {
            let tickets = self.tickets.lock().unwrap();
            Ok(tickets.iter().find(|t| t.id == id).cloned())
        }

        async fn list_by_owner(
            &self,
            owner: &Username,
            limit: i64,
            offset: i64,
        ) -> Result<Vec<Ticket>, InfraError> {
            let tickets = self.tickets.lock().unwrap();
            Ok(tickets
                .iter()
                .filter(|t| t.is_owned_by(owner))
                .skip(usize::try_from(offset).unwrap())
                .take(usize::try_from(limit).unwrap())
                .cloned()
                .collect())
        }

        async fn delete(&self, id: i64) -> Result<(), InfraError> {
            let mut tickets = self.tickets.lock().unwrap();
            tickets.retain(|t| t.id != id);
            Ok(())
        }
    }

    struct StubMovieRepository {
        movies: Vec<Movie>,
    }

    #[async_trait]
    impl MovieRepository for StubMovieRepository {
        async fn create(&self, _movie: NewMovie) -> Result<Movie, InfraError> {
            unimplemented!("このテストでは使用しない")
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Movie>, InfraError> {
            Ok(self.movies.iter().find(|m| m.id == id).cloned())
        }

        async fn list(&self, _count: i64) -> Result<Vec<Movie>, InfraError> {
            unimplemented!("このテストでは使用しない")
        }
    }

    fn movie(id: i64) -> Movie {
        Movie {
            id,
            title: Title::new("東京物語").unwrap(),
            director_id: 1,
            rating: 5,
            poster: Poster::new("https://example.com/tokyo.jpg").unwrap(),
            summary: Summary::new("老夫婦が子供たちを訪ねる旅の物語。").unwrap(),
            created_at: Utc::now(),
        }
    }

    fn ticket(id: i64, owner: &str) -> Ticket {
        Ticket {
            id,
            movie_id: 1,
            ticket_owner: Username::new(owner).unwrap(),
            total: 120,
            child: 0,
            adult: 2,
            created_at: Utc::now(),
        }
    }

    fn state(tickets: Vec<Ticket>) -> TicketState {
        TicketState {
            ticket_repository: Arc::new(StubTicketRepository {
                tickets: Mutex::new(tickets),
            }),
            movie_repository:  Arc::new(StubMovieRepository {
                movies: vec![movie(1)],
            }),
        }
    }

    fn auth(username: &str) -> AuthPayload {
        AuthPayload(Payload::new(
            Username::new(username).unwrap(),
            Duration::minutes(5),
        ))
    }

    fn page() -> Query<PageQuery> {
        Query(PageQuery {
            page_id:   1,
            page_size: 5,
        })
    }

    // ===== 作成 =====

    #[tokio::test]
    async fn test_create_ticketは認証ユーザーを所有者にする() {
        let request = CreateTicketRequest {
            movie_id: 1,
            total:    120,
            child:    1,
            adult:    1,
        };

        let Json(response) =
            create_ticket(State(state(vec![])), auth("theatregoer"), Json(request))
                .await
                .unwrap();

        assert_eq!(response.data.ticket.ticket_owner.as_str(), "theatregoer");
        assert_eq!(response.data.movie.id, 1);
    }

    #[tokio::test]
    async fn test_create_ticketは存在しない映画に404を返す() {
        let request = CreateTicketRequest {
            movie_id: 999_999,
            total:    120,
            child:    1,
            adult:    1,
        };

        let result = create_ticket(State(state(vec![])), auth("theatregoer"), Json(request)).await;

        assert!(matches!(result, Err(ApiError::NotFound { entity: "Movie" })));
    }

    #[tokio::test]
    async fn test_create_ticketは大人0名子供0名を400で拒否する() {
        let request = CreateTicketRequest {
            movie_id: 1,
            total:    120,
            child:    0,
            adult:    0,
        };

        let result = create_ticket(State(state(vec![])), auth("theatregoer"), Json(request)).await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    // ===== 取得と所有者確認 =====

    #[tokio::test]
    async fn test_get_ticketは所有者に映画情報付きで返す() {
        let state = state(vec![ticket(1, "theatregoer")]);

        let Json(response) = get_ticket(State(state), auth("theatregoer"), Path(1))
            .await
            .unwrap();

        assert_eq!(response.data.ticket.id, 1);
        assert_eq!(response.data.movie.id, 1);
    }

    #[tokio::test]
    async fn test_get_ticketは他人のチケットに401を返す() {
        let state = state(vec![ticket(1, "theatregoer")]);

        let result = get_ticket(State(state), auth("somebodyelse"), Path(1)).await;

        assert!(matches!(result, Err(ApiError::UnauthorizedAction)));
    }

    #[tokio::test]
    async fn test_get_ticketは存在しないidに404を返す() {
        // 所有者不一致より存在確認が先: 存在しなければ誰が聞いても 404
        let state = state(vec![ticket(1, "theatregoer")]);

        let result = get_ticket(State(state), auth("somebodyelse"), Path(999_999)).await;

        assert!(matches!(result, Err(ApiError::NotFound { entity: "Ticket" })));
    }

    // ===== 一覧 =====

    #[tokio::test]
    async fn test_list_ticketsは自分のチケットのみ返す() {
        let state = state(vec![
            ticket(1, "theatregoer"),
            ticket(2, "somebodyelse"),
            ticket(3, "theatregoer"),
        ]);

        let Json(response) = list_tickets(State(state), auth("theatregoer"), page())
            .await
            .unwrap();

        let ids: Vec<i64> = response.data.iter().map(|t| t.ticket.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_list_ticketsはチケットがなければ空リストを返す() {
        let state = state(vec![ticket(1, "somebodyelse")]);

        let Json(response) = list_tickets(State(state), auth("theatregoer"), page())
            .await
            .unwrap();

        assert!(response.data.is_empty());
    }

    // ===== 削除 =====

    #[tokio::test]
    async fn test_delete_ticketは所有者の削除を許可する() {
        let ticket_state = state(vec![ticket(1, "theatregoer")]);

        let status = delete_ticket(
            State(ticket_state.clone()),
            auth("theatregoer"),
            Path(1),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        let remaining = ticket_state.ticket_repository.find_by_id(1).await.unwrap();
        assert!(remaining.is_none());
    }

    #[tokio::test]
    async fn test_delete_ticketは他人のチケットに401を返し削除しない() {
        let ticket_state = state(vec![ticket(1, "theatregoer")]);

        let result = delete_ticket(State(ticket_state.clone()), auth("somebodyelse"), Path(1)).await;

        assert!(matches!(result, Err(ApiError::UnauthorizedAction)));
        let remaining = ticket_state.ticket_repository.find_by_id(1).await.unwrap();
        assert!(remaining.is_some());
    }

    #[tokio::test]
    async fn test_delete_ticketは存在しないidに404を返す() {
        let result = delete_ticket(State(state(vec![])), auth("theatregoer"), Path(999_999)).await;

        assert!(matches!(result, Err(ApiError::NotFound { entity: "Ticket" })));
    }
}

//! # アプリケーション構築
//!
//! ルーターの組み立てを担当する。各ハンドラ群は自分の状態のみを
//! 受け取り、チケットルートだけ認証ミドルウェアを通す。

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handler::{
        director::{DirectorState, create_director, get_director, list_directors},
        health::health_check,
        movie::{MovieState, create_movie, get_movie, list_movies},
        ticket::{TicketState, create_ticket, delete_ticket, get_ticket, list_tickets},
        user::{UserState, create_user, login_user},
    },
    middleware::{AuthState, require_auth},
};

/// ルーターを構築する
pub fn build_app(
    director_state: DirectorState,
    movie_state: MovieState,
    user_state: UserState,
    ticket_state: TicketState,
    auth_state: AuthState,
) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/directors", post(create_director).get(list_directors))
                .route("/directors/{id}", get(get_director))
                .with_state(director_state),
        )
        .merge(
            Router::new()
                .route("/movies", post(create_movie).get(list_movies))
                .route("/movies/{id}", get(get_movie))
                .with_state(movie_state),
        )
        .merge(
            Router::new()
                .route("/users", post(create_user))
                .route("/users/login", post(login_user))
                .with_state(user_state),
        );

    // チケットは全ルート認証必須
    let protected_routes = Router::new()
        .route("/tickets", post(create_ticket).get(list_tickets))
        .route("/tickets/{id}", get(get_ticket).delete(delete_ticket))
        .with_state(ticket_state)
        .layer(from_fn_with_state(auth_state, require_auth));

    public_routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

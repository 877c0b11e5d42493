//! # Gekijo API サーバー
//!
//! 起動シーケンス:
//! 1. `.env` 読み込みとトレーシング初期化
//! 2. 設定の読み込み（不備があればパニックで起動中断）
//! 3. DB 接続プール作成とマイグレーション適用
//! 4. 依存の組み立てとルーター構築
//! 5. リッスン開始

use std::sync::Arc;

use gekijo_api::{
    app_builder::build_app,
    config::ApiConfig,
    handler::{director::DirectorState, movie::MovieState, ticket::TicketState, user::UserState},
    middleware::AuthState,
};
use gekijo_infra::{
    Argon2PasswordHasher,
    JwtTokenMaker,
    PasswordHasher,
    TokenMaker,
    db::{create_pool, run_migrations},
    repository::{
        DirectorRepository,
        MovieRepository,
        PostgresDirectorRepository,
        PostgresMovieRepository,
        PostgresTicketRepository,
        PostgresUserRepository,
        TicketRepository,
        UserRepository,
    },
};
use gekijo_shared::observability::{LogFormat, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(LogFormat::from_env());

    let config = ApiConfig::from_env();

    let pool = create_pool(&config.database_url)
        .await
        .expect("データベースへの接続に失敗しました");
    run_migrations(&pool)
        .await
        .expect("マイグレーションの適用に失敗しました");
    tracing::info!("データベース接続とマイグレーションが完了しました");

    // 依存の組み立て（Arc<dyn Trait> への型強制）
    let token_maker: Arc<dyn TokenMaker> = Arc::new(
        JwtTokenMaker::new(&config.token_secret_key).expect("トークン署名鍵が不正です"),
    );
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let director_repository: Arc<dyn DirectorRepository> =
        Arc::new(PostgresDirectorRepository::new(pool.clone()));
    let movie_repository: Arc<dyn MovieRepository> =
        Arc::new(PostgresMovieRepository::new(pool.clone()));
    let user_repository: Arc<dyn UserRepository> =
        Arc::new(PostgresUserRepository::new(pool.clone()));
    let ticket_repository: Arc<dyn TicketRepository> =
        Arc::new(PostgresTicketRepository::new(pool));

    let app = build_app(
        DirectorState {
            director_repository: director_repository.clone(),
        },
        MovieState {
            movie_repository: movie_repository.clone(),
            director_repository,
        },
        UserState {
            user_repository,
            password_hasher,
            token_maker: token_maker.clone(),
            access_token_duration: config.access_token_duration,
        },
        TicketState {
            ticket_repository,
            movie_repository,
        },
        AuthState { token_maker },
    );

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "gekijo-api を起動しました");

    axum::serve(listener, app).await?;

    Ok(())
}

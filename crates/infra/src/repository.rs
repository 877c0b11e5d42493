//! # リポジトリ実装
//!
//! エンティティごとの永続化操作を提供する。
//!
//! ## 設計方針
//!
//! - **トレイトによる抽象化**: ハンドラはトレイト経由でデータアクセス
//!   するため、テストではスタブ実装に差し替えられる
//! - **Not Found は Option**: 行が存在しないことはエラーではなく
//!   `Ok(None)` で表現する（存在確認と所有者確認を呼び出し側で
//!   順序付けるため）

pub mod director_repository;
pub mod movie_repository;
pub mod ticket_repository;
pub mod user_repository;

pub use director_repository::{DirectorRepository, PostgresDirectorRepository};
pub use movie_repository::{MovieRepository, PostgresMovieRepository};
pub use ticket_repository::{PostgresTicketRepository, TicketRepository};
pub use user_repository::{PostgresUserRepository, UserRepository};

/// PostgreSQL の一意制約違反（エラーコード 23505）か判定する
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

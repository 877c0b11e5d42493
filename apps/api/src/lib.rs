//! # Gekijo API
//!
//! 劇場チケット予約サービスの REST API。
//!
//! ## エンドポイント
//!
//! | メソッド | パス | 認証 |
//! |---|---|---|
//! | GET | `/health` | 不要 |
//! | POST / GET | `/directors` | 不要 |
//! | GET | `/directors/{id}` | 不要 |
//! | POST / GET | `/movies` | 不要 |
//! | GET | `/movies/{id}` | 不要 |
//! | POST | `/users` | 不要 |
//! | POST | `/users/login` | 不要 |
//! | POST / GET | `/tickets` | 必要 |
//! | GET / DELETE | `/tickets/{id}` | 必要 |
//!
//! チケットルートは bearer トークンによる認証が必須で、
//! 取得・削除は所有者のみに許可される。

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;

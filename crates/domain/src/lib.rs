//! # Gekijo ドメイン層
//!
//! 劇場チケット予約 API のドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（例: Movie, Ticket）
//! - **値オブジェクト**: 生成時にバリデーションを実行する不変オブジェクト
//!   （例: Username, Email）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、トークン署名）には一切依存しない。
//! 認可の中核である [`token::Payload`]
//! もここに置き、署名方式の詳細はインフラ層に隔離する。
//!
//! ## モジュール構成
//!
//! - [`director`] - 映画監督エンティティ
//! - [`movie`] - 映画エンティティ
//! - [`ticket`] - チケットエンティティと所有者情報
//! - [`token`] - アクセストークンのペイロード
//! - [`user`] - ユーザーエンティティとパスワード値オブジェクト

#[macro_use]
mod macros;

pub mod director;
pub mod error;
pub mod movie;
pub mod ticket;
pub mod token;
pub mod user;

pub use error::DomainError;

//! # Gekijo インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理
//! - **リポジトリ実装**: エンティティごとの永続化操作
//! - **トークン署名**: アクセストークンの発行・検証（HS256）
//! - **パスワードハッシュ**: Argon2id によるハッシュ化・検証
//!
//! ## 依存関係
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ドメイン層はインフラ層に依存しない（依存性逆転の原則）。
//! トークンの署名方式やハッシュアルゴリズムの詳細はこの層に閉じる。
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`password`] - Argon2id パスワードハッシュ
//! - [`repository`] - リポジトリ実装
//! - [`token`] - トークンメーカー（発行・検証）

pub mod db;
pub mod error;
pub mod password;
pub mod repository;
pub mod token;

pub use error::InfraError;
pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use token::{JwtTokenMaker, TokenError, TokenMaker};

//! # ユーザー
//!
//! ユーザーエンティティとパスワード関連の値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: ユーザー名・パスワードを型で区別し、
//!   取り違えをコンパイル時に防ぐ
//! - **PII 保護**: 平文パスワードとハッシュは Debug 出力をマスクする
//! - **バリデーション**: 値オブジェクトの生成時に検証ロジックを実行

use chrono::{DateTime, Utc};

define_validated_string! {
    /// ユーザー名（値オブジェクト）
    ///
    /// 認証サブジェクトとしてトークンに埋め込まれ、チケットの
    /// 所有者識別にも使われる。
    pub struct Username {
        label: "ユーザー名",
        min_length: 6,
        max_length: 64,
    }
}

define_validated_string! {
    /// メールアドレス（値オブジェクト）
    pub struct Email {
        label: "メールアドレス",
        min_length: 6,
        max_length: 255,
    }
}

define_validated_string! {
    /// 平文パスワード（値オブジェクト）
    ///
    /// ハッシュ化前の入力値。ログへの平文出力を防ぐため PII
    /// 保護モードで定義する。
    pub struct PlainPassword {
        label: "パスワード",
        min_length: 8,
        max_length: 128,
        pii: true,
    }
}

/// パスワードハッシュ（PHC 文字列）
///
/// バリデーションは行わない（ハッシュ形式の検証はインフラ層の責務）。
/// Debug 出力はマスクする。
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PasswordHash").field(&"[REDACTED]").finish()
    }
}

/// ユーザーエンティティ
///
/// ユーザー名が一意識別子を兼ねる（ログイン ID）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username:        Username,
    pub email:           Email,
    pub hashed_password: PasswordHash,
    pub created_at:      DateTime<Utc>,
}

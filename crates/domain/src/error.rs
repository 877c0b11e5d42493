//! # ドメイン層エラー定義

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// ビジネスルール違反を表現する。API
/// 層でこのエラーに応じて適切な HTTP レスポンスに変換する。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 値オブジェクトの生成時に検証に失敗した場合。
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}

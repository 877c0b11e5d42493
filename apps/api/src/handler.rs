//! # リクエストハンドラ
//!
//! エンドポイントごとのハンドラを定義する。
//!
//! ## 方針
//!
//! - リクエスト本文はプレーンな DTO で受け取り、ハンドラ内で
//!   値オブジェクトに変換する（変換失敗は 400）
//! - レスポンスは [`ApiResponse`](gekijo_shared::ApiResponse) で
//!   `{ "data": T }` に包む
//! - 存在確認（404）は所有者確認（401）より先に行う

pub mod director;
pub mod health;
pub mod movie;
pub mod ticket;
pub mod user;

use serde::Deserialize;

use crate::error::ApiError;

/// 一覧取得のページングクエリ
///
/// `page_id` は 1 始まり。`page_size` は 5〜10 件に制限する。
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page_id:   i64,
    pub page_size: i64,
}

impl PageQuery {
    const MIN_PAGE_SIZE: i64 = 5;
    const MAX_PAGE_SIZE: i64 = 10;

    /// SQL の LIMIT / OFFSET に変換する
    pub fn to_limit_offset(self) -> Result<(i64, i64), ApiError> {
        if self.page_id < 1 {
            return Err(ApiError::Validation(
                "page_id は 1 以上である必要があります".to_string(),
            ));
        }

        if !(Self::MIN_PAGE_SIZE..=Self::MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ApiError::Validation(format!(
                "page_size は {}〜{} の範囲である必要があります",
                Self::MIN_PAGE_SIZE,
                Self::MAX_PAGE_SIZE,
            )));
        }

        // page_id は上限未検証のため、オフセット計算はオーバーフローし得る
        let offset = self
            .page_id
            .checked_sub(1)
            .and_then(|page| page.checked_mul(self.page_size))
            .ok_or_else(|| {
                ApiError::Validation("page_id が大きすぎます".to_string())
            })?;

        Ok((self.page_size, offset))
    }
}

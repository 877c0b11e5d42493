//! # 映画
//!
//! 映画エンティティと作成パラメータを定義する。

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::DomainError;

define_validated_string! {
    /// 映画タイトル（値オブジェクト）
    pub struct Title {
        label: "タイトル",
        min_length: 3,
        max_length: 255,
    }
}

define_validated_string! {
    /// ポスター画像 URL（値オブジェクト）
    pub struct Poster {
        label: "ポスター",
        min_length: 10,
        max_length: 2048,
    }
}

define_validated_string! {
    /// あらすじ（値オブジェクト）
    pub struct Summary {
        label: "あらすじ",
        min_length: 10,
        max_length: 4096,
    }
}

/// 映画エンティティ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
    pub id:          i64,
    pub title:       Title,
    pub director_id: i64,
    pub rating:      i16,
    pub poster:      Poster,
    pub summary:     Summary,
    pub created_at:  DateTime<Utc>,
}

/// 映画の作成パラメータ
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title:       Title,
    pub director_id: i64,
    pub rating:      i16,
    pub poster:      Poster,
    pub summary:     Summary,
}

impl NewMovie {
    /// 新しい映画の作成パラメータを構築する
    ///
    /// # エラー
    ///
    /// レーティングが 1 未満の場合は `DomainError::Validation` を返す。
    pub fn new(
        title: Title,
        director_id: i64,
        rating: i16,
        poster: Poster,
        summary: Summary,
    ) -> Result<Self, DomainError> {
        if rating < 1 {
            return Err(DomainError::Validation(
                "レーティングは 1 以上である必要があります".to_string(),
            ));
        }

        Ok(Self {
            title,
            director_id,
            rating,
            poster,
            summary,
        })
    }
}

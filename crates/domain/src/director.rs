//! # 映画監督
//!
//! 監督エンティティと作成パラメータを定義する。

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::DomainError;

define_validated_string! {
    /// 監督の名（値オブジェクト）
    pub struct FirstName {
        label: "名",
        min_length: 3,
        max_length: 64,
    }
}

define_validated_string! {
    /// 監督の姓（値オブジェクト）
    pub struct LastName {
        label: "姓",
        min_length: 3,
        max_length: 64,
    }
}

/// 監督エンティティ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Director {
    pub id:         i64,
    pub first_name: FirstName,
    pub last_name:  LastName,
    pub oscars:     i64,
    pub created_at: DateTime<Utc>,
}

/// 監督の作成パラメータ
#[derive(Debug, Clone)]
pub struct NewDirector {
    pub first_name: FirstName,
    pub last_name:  LastName,
    pub oscars:     i64,
}

impl NewDirector {
    /// 新しい監督の作成パラメータを構築する
    ///
    /// # エラー
    ///
    /// 受賞数が負の場合は `DomainError::Validation` を返す。
    pub fn new(first_name: FirstName, last_name: LastName, oscars: i64) -> Result<Self, DomainError> {
        if oscars < 0 {
            return Err(DomainError::Validation(
                "受賞数は 0 以上である必要があります".to_string(),
            ));
        }

        Ok(Self {
            first_name,
            last_name,
            oscars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_directorは負の受賞数を拒否する() {
        let first = FirstName::new("akira").unwrap();
        let last = LastName::new("kurosawa").unwrap();

        let result = NewDirector::new(first, last, -1);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_new_directorは受賞数0を許可する() {
        let first = FirstName::new("hirokazu").unwrap();
        let last = LastName::new("koreeda").unwrap();

        let director = NewDirector::new(first, last, 0).unwrap();

        assert_eq!(director.oscars, 0);
    }
}

//! # チケット
//!
//! チケットエンティティと作成パラメータを定義する。
//!
//! ## 所有関係
//!
//! チケットは作成時に認証サブジェクト（ユーザー名）を所有者として
//! 記録し、以後変更されない。読み取り・削除はこの所有者と認証済み
//! ユーザーの一致を確認してから許可される。

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{DomainError, user::Username};

/// チケットエンティティ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub id:           i64,
    pub movie_id:     i64,
    /// 所有者（作成時の認証サブジェクト、再割り当てされない）
    pub ticket_owner: Username,
    pub total:        i64,
    pub child:        i16,
    pub adult:        i16,
    pub created_at:   DateTime<Utc>,
}

impl Ticket {
    /// 指定されたユーザーが所有者か判定する
    pub fn is_owned_by(&self, username: &Username) -> bool {
        &self.ticket_owner == username
    }
}

/// チケットの作成パラメータ
///
/// 所有者は認証済みペイロードから設定される（リクエスト本文からは
/// 受け取らない）。
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub movie_id:     i64,
    pub ticket_owner: Username,
    pub total:        i64,
    pub child:        i16,
    pub adult:        i16,
}

impl NewTicket {
    /// 新しいチケットの作成パラメータを構築する
    ///
    /// # エラー
    ///
    /// - 大人 0 名かつ子供 0 名のチケットは作成できない
    /// - 合計金額が 0 以下、人数が負の場合も拒否する
    pub fn new(
        movie_id: i64,
        ticket_owner: Username,
        total: i64,
        child: i16,
        adult: i16,
    ) -> Result<Self, DomainError> {
        if child < 0 || adult < 0 {
            return Err(DomainError::Validation(
                "人数は 0 以上である必要があります".to_string(),
            ));
        }

        if child == 0 && adult == 0 {
            return Err(DomainError::Validation(
                "大人 0 名・子供 0 名のチケットは作成できません".to_string(),
            ));
        }

        if total <= 0 {
            return Err(DomainError::Validation(
                "合計金額は 1 以上である必要があります".to_string(),
            ));
        }

        Ok(Self {
            movie_id,
            ticket_owner,
            total,
            child,
            adult,
        })
    }
}

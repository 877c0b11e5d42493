//! # アクセストークンのペイロード
//!
//! 署名付きトークンに埋め込まれるクレーム（識別子・サブジェクト・
//! 発行時刻・有効期限）を定義する。
//!
//! ## 設計方針
//!
//! - **署名方式から独立**: ペイロードは純粋なデータ構造であり、JWT
//!   などのエンコード・署名の詳細はインフラ層が担当する
//! - **不変性**: 発行時に生成され、以後変更されない。サーバー側には
//!   永続化せず、リクエスト処理の完了とともに破棄される

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::Username;

/// アクセストークンのペイロード
///
/// トークン発行時に作成され、検証時に復元される。
/// `expires_at` は常に `issued_at + 要求された有効期間` であり、
/// `id` はトークンごとに新規生成され再利用されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// トークン識別子（発行ごとに生成される 128 ビット乱数）
    pub id:         Uuid,
    /// 認証されたユーザー名
    pub username:   Username,
    /// 発行時刻
    pub issued_at:  DateTime<Utc>,
    /// 有効期限
    pub expires_at: DateTime<Utc>,
}

impl Payload {
    /// 新しいペイロードを作成する
    ///
    /// トークン識別子は UUID v4（128 ビット乱数）で採番する。
    /// 衝突確率は無視できる水準であり、再利用は発生しない。
    pub fn new(username: Username, duration: Duration) -> Self {
        let issued_at = Utc::now();

        Self {
            id: Uuid::new_v4(),
            username,
            issued_at,
            expires_at: issued_at + duration,
        }
    }

    /// ペイロードが有効期限内か判定する
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// 指定時刻を基準に有効期限内か判定する
    ///
    /// `expires_at` が基準時刻より前であれば無効。
    /// `issued_at` が未来かどうかは検証しない（検証対象は
    /// `expires_at` のみ）。トークンの失効リストも持たないため、
    /// 有効期限内の再利用は防げない。
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at >= now
    }
}

//! # トークンメーカー
//!
//! アクセストークンの発行・検証を提供する。
//!
//! ## 設計方針
//!
//! - **トレイトによる多態**: [`TokenMaker`] トレイトの背後に署名方式を
//!   隠蔽する。現在の実装は HMAC-SHA256（JWT / HS256）のみだが、
//!   非対称署名への差し替えは呼び出し側の変更なしに可能
//! - **アルゴリズム固定**: 検証時は HS256 のみを受け付ける。トークンが
//!   別のアルゴリズム（`none` を含む）を宣言していれば署名検証前に
//!   拒否する（algorithm confusion 攻撃への防御）
//! - **失敗は 2 種別に集約**: 期限切れ（署名は正しいが有効期限超過）と
//!   無効（署名不正・構造不正・クレーム変換失敗）のみを区別する

use chrono::{DateTime, Duration, Utc};
use gekijo_domain::{token::Payload, user::Username};
use jsonwebtoken::{
    Algorithm,
    DecodingKey,
    EncodingKey,
    Header,
    Validation,
    decode,
    encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// 署名鍵の最小バイト数
///
/// HMAC-SHA256 の鍵は最低でもハッシュ出力長（32 バイト）を要求し、
/// エントロピー不足の鍵での運用を防ぐ。
pub const MIN_SECRET_KEY_SIZE: usize = 32;

/// トークン発行・検証で発生するエラー
///
/// すべて終端エラーであり、リトライは行わない。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// 署名鍵が短すぎる（起動時エラー、リクエスト処理では発生しない）
    #[error("署名鍵は {MIN_SECRET_KEY_SIZE} バイト以上である必要があります")]
    InvalidSecretKeySize,

    /// 有効期限切れ（署名は正しい）
    #[error("トークンの有効期限が切れています")]
    ExpiredToken,

    /// 無効なトークン
    ///
    /// 署名不正・構造不正・アルゴリズム不一致・クレーム変換失敗は
    /// すべてこの種別に集約する。
    #[error("無効なトークンです")]
    InvalidToken,
}

/// トークン発行・検証の能力
///
/// 署名方式ごとに実装を用意する。発行と検証は純粋な計算であり、
/// 共有可変状態を持たない。
pub trait TokenMaker: Send + Sync {
    /// ユーザー名と有効期間から署名付きトークンを発行する
    fn create_token(&self, username: Username, duration: Duration) -> Result<String, TokenError>;

    /// トークン文字列を検証し、ペイロードを復元する
    ///
    /// # エラー
    ///
    /// - [`TokenError::ExpiredToken`]: 署名は正しいが有効期限超過
    /// - [`TokenError::InvalidToken`]: それ以外のすべての検証失敗
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError>;
}

/// JWT のクレーム表現
///
/// [`Payload`] とトークンワイヤ形式の変換のみに使う内部型。
/// 時刻は UNIX タイムスタンプ（秒）で保持する。
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    jti: Uuid,
    sub: String,
    iat: i64,
    exp: i64,
}

impl From<&Payload> for Claims {
    fn from(payload: &Payload) -> Self {
        Self {
            jti: payload.id,
            sub: payload.username.as_str().to_owned(),
            iat: payload.issued_at.timestamp(),
            exp: payload.expires_at.timestamp(),
        }
    }
}

impl TryFrom<Claims> for Payload {
    type Error = TokenError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let username = Username::new(claims.sub).map_err(|_| TokenError::InvalidToken)?;
        let issued_at = timestamp_to_datetime(claims.iat)?;
        let expires_at = timestamp_to_datetime(claims.exp)?;

        Ok(Self {
            id: claims.jti,
            username,
            issued_at,
            expires_at,
        })
    }
}

fn timestamp_to_datetime(ts: i64) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(ts, 0).ok_or(TokenError::InvalidToken)
}

/// HMAC-SHA256（HS256）によるトークンメーカー
///
/// プロセス全体で 1 つの対称鍵を発行・検証の両方に使う。
/// 鍵はプロセス起動時に注入され、実行中のローテーションは行わない。
pub struct JwtTokenMaker {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtTokenMaker {
    /// 新しいトークンメーカーを作成する
    ///
    /// # エラー
    ///
    /// 鍵が [`MIN_SECRET_KEY_SIZE`] バイト未満の場合は
    /// [`TokenError::InvalidSecretKeySize`] を返す。
    /// これはプロセス初期化を中断すべき致命的エラーである。
    pub fn new(secret_key: &str) -> Result<Self, TokenError> {
        if secret_key.len() < MIN_SECRET_KEY_SIZE {
            return Err(TokenError::InvalidSecretKeySize);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret_key.as_bytes()),
        })
    }

    /// HS256 固定・leeway なしの検証設定を返す
    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation
    }
}

impl TokenMaker for JwtTokenMaker {
    fn create_token(&self, username: Username, duration: Duration) -> Result<String, TokenError> {
        let payload = Payload::new(username, duration);
        let claims = Claims::from(&payload);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::InvalidToken)
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        // 署名検証はクレーム検証より先に行われるため、改ざんされた
        // 期限切れトークンは ExpiredToken ではなく InvalidToken になる
        let data = decode::<Claims>(token, &self.decoding_key, &Self::validation()).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
                _ => TokenError::InvalidToken,
            },
        )?;

        let payload = Payload::try_from(data.claims)?;

        // jsonwebtoken の exp 判定は秒粒度の exp < now であり、
        // 発行と同一秒内の期限切れ（有効期間 0 など）を受理してしまう。
        // 復元したペイロードで有効期限を再検証する。
        if !payload.is_valid() {
            return Err(TokenError::ExpiredToken);
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
    use pretty_assertions::assert_eq;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn maker() -> JwtTokenMaker {
        JwtTokenMaker::new(SECRET).unwrap()
    }

    fn username() -> Username {
        Username::new("kurosawa").unwrap()
    }

    // ===== 鍵長チェック =====

    #[test]
    fn test_32バイト未満の鍵は拒否される() {
        let result = JwtTokenMaker::new("too-short-secret");

        assert_eq!(result.err(), Some(TokenError::InvalidSecretKeySize));
    }

    #[test]
    fn test_32バイトちょうどの鍵は受理される() {
        assert!(JwtTokenMaker::new(SECRET).is_ok());
        assert!(JwtTokenMaker::new(&format!("{SECRET}-and-longer")).is_ok());
    }

    // ===== 発行・検証ラウンドトリップ =====

    #[test]
    fn test_発行したトークンを検証できる() {
        let maker = maker();
        let duration = Duration::minutes(15);

        let token = maker.create_token(username(), duration).unwrap();
        let payload = maker.verify_token(&token).unwrap();

        assert_eq!(payload.username, username());
        // ワイヤ形式は秒精度のため、差分は ±1 秒以内に収まる
        let actual = payload.expires_at - payload.issued_at;
        assert!((actual - duration).num_seconds().abs() <= 1);
    }

    #[test]
    fn test_ペイロードのフィールドがワイヤ形式を往復しても保存される() {
        let maker = maker();

        let token = maker.create_token(username(), Duration::hours(1)).unwrap();
        let first = maker.verify_token(&token).unwrap();
        let second = maker.verify_token(&token).unwrap();

        // 同一トークンの復元結果は完全に一致する
        assert_eq!(first, second);
        assert_eq!(first.username, username());
    }

    #[test]
    fn test_トークン識別子は発行ごとに異なる() {
        let maker = maker();

        let t1 = maker.create_token(username(), Duration::minutes(5)).unwrap();
        let t2 = maker.create_token(username(), Duration::minutes(5)).unwrap();

        let p1 = maker.verify_token(&t1).unwrap();
        let p2 = maker.verify_token(&t2).unwrap();
        assert_ne!(p1.id, p2.id);
    }

    // ===== 期限切れ =====

    #[test]
    fn test_有効期間が負のトークンは期限切れエラー() {
        let maker = maker();

        let token = maker
            .create_token(username(), Duration::minutes(-1))
            .unwrap();
        let result = maker.verify_token(&token);

        assert_eq!(result.err(), Some(TokenError::ExpiredToken));
    }

    #[test]
    fn test_有効期間0のトークンは即座に期限切れエラー() {
        let maker = maker();

        // exp == iat のトークンは発行直後の検証でも期限切れとして扱う
        let token = maker.create_token(username(), Duration::zero()).unwrap();
        let result = maker.verify_token(&token);

        assert_eq!(result.err(), Some(TokenError::ExpiredToken));
    }

    // ===== 無効トークン =====

    #[test]
    fn test_別の鍵で署名されたトークンは無効() {
        let maker = maker();
        let other = JwtTokenMaker::new("ffffffffffffffffffffffffffffffff").unwrap();

        let token = other.create_token(username(), Duration::minutes(5)).unwrap();
        let result = maker.verify_token(&token);

        assert_eq!(result.err(), Some(TokenError::InvalidToken));
    }

    #[test]
    fn test_改ざんされた期限切れトークンはexpiredではなくinvalid() {
        let maker = maker();
        let other = JwtTokenMaker::new("ffffffffffffffffffffffffffffffff").unwrap();

        // 期限切れ、かつ署名鍵が異なる → 署名検証が先に失敗する
        let token = other
            .create_token(username(), Duration::minutes(-5))
            .unwrap();
        let result = maker.verify_token(&token);

        assert_eq!(result.err(), Some(TokenError::InvalidToken));
    }

    #[test]
    fn test_none_アルゴリズムのトークンは無効() {
        let maker = maker();

        // alg=none・署名なしのトークンを手組みする
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let claims = serde_json::json!({
            "jti": Uuid::new_v4(),
            "sub": "kurosawa",
            "iat": Utc::now().timestamp(),
            "exp": (Utc::now() + Duration::minutes(5)).timestamp(),
        });
        let body = URL_SAFE_NO_PAD.encode(claims.to_string());
        let token = format!("{header}.{body}.");

        assert_eq!(maker.verify_token(&token).err(), Some(TokenError::InvalidToken));
    }

    #[test]
    fn test_期限切れのnone_アルゴリズムトークンもinvalidになる() {
        let maker = maker();

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let claims = serde_json::json!({
            "jti": Uuid::new_v4(),
            "sub": "kurosawa",
            "iat": (Utc::now() - Duration::hours(2)).timestamp(),
            "exp": (Utc::now() - Duration::hours(1)).timestamp(),
        });
        let body = URL_SAFE_NO_PAD.encode(claims.to_string());
        let token = format!("{header}.{body}.");

        // アルゴリズム不一致は期限判定より優先される
        assert_eq!(maker.verify_token(&token).err(), Some(TokenError::InvalidToken));
    }

    #[test]
    fn test_構造が壊れたトークンは無効() {
        let maker = maker();

        for broken in ["", "not-a-jwt", "a.b", "a.b.c.d"] {
            assert_eq!(
                maker.verify_token(broken).err(),
                Some(TokenError::InvalidToken),
                "入力: {broken:?}",
            );
        }
    }

    #[test]
    fn test_ペイロード部分を改ざんしたトークンは無効() {
        let maker = maker();
        let token = maker.create_token(username(), Duration::minutes(5)).unwrap();

        // クレーム部分を別の内容に差し替える（署名は元のまま）
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = serde_json::json!({
            "jti": Uuid::new_v4(),
            "sub": "attacker-user",
            "iat": Utc::now().timestamp(),
            "exp": (Utc::now() + Duration::hours(24)).timestamp(),
        });
        let forged_body = URL_SAFE_NO_PAD.encode(forged_claims.to_string());
        let forged = format!("{}.{}.{}", parts[0], forged_body, parts[2]);

        assert_eq!(maker.verify_token(&forged).err(), Some(TokenError::InvalidToken));
    }

    #[test]
    fn test_サブジェクトがユーザー名として不正なトークンは無効() {
        let maker = maker();

        // バリデーションを通らない短いサブジェクトで直接エンコードする
        let claims = Claims {
            jti: Uuid::new_v4(),
            sub: "abc".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(maker.verify_token(&token).err(), Some(TokenError::InvalidToken));
    }
}

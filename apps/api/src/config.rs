//! # アプリケーション設定
//!
//! 環境変数からの設定読み込みを担当する。

use chrono::Duration;

/// アクセストークン有効期間のデフォルト（分）
const DEFAULT_ACCESS_TOKEN_DURATION_MINUTES: i64 = 15;

/// API サーバーの設定
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// バインドするホスト
    pub host: String,
    /// バインドするポート
    pub port: u16,
    /// PostgreSQL 接続文字列
    pub database_url: String,
    /// トークン署名鍵（32 バイト以上）
    pub token_secret_key: String,
    /// アクセストークンの有効期間
    pub access_token_duration: Duration,
}

impl ApiConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # Panics
    ///
    /// 必須の環境変数が未設定、または形式が不正な場合はパニックする。
    /// 設定不備での起動継続は許可しない。
    pub fn from_env() -> Self {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("API_PORT はポート番号である必要があります");

        let database_url =
            std::env::var("DATABASE_URL").expect("環境変数 DATABASE_URL が設定されていません");

        let token_secret_key = std::env::var("TOKEN_SECRET_KEY")
            .expect("環境変数 TOKEN_SECRET_KEY が設定されていません");

        let access_token_duration_minutes = std::env::var("ACCESS_TOKEN_DURATION_MINUTES")
            .map(|v| {
                v.parse::<i64>()
                    .expect("ACCESS_TOKEN_DURATION_MINUTES は整数（分）である必要があります")
            })
            .unwrap_or(DEFAULT_ACCESS_TOKEN_DURATION_MINUTES);

        Self {
            host,
            port,
            database_url,
            token_secret_key,
            access_token_duration: Duration::minutes(access_token_duration_minutes),
        }
    }
}

//! # ヘルスチェックハンドラ

use axum::Json;
use gekijo_shared::HealthResponse;

/// 稼働状態を返す
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}

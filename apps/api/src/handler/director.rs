//! # 監督ハンドラ

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use gekijo_domain::director::{Director, FirstName, LastName, NewDirector};
use gekijo_infra::repository::DirectorRepository;
use gekijo_shared::ApiResponse;
use serde::Deserialize;

use crate::{error::ApiError, handler::PageQuery};

/// 監督ハンドラの状態
#[derive(Clone)]
pub struct DirectorState {
    pub director_repository: Arc<dyn DirectorRepository>,
}

/// 監督の作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateDirectorRequest {
    pub first_name: String,
    pub last_name:  String,
    pub oscars:     i64,
}

/// 監督を作成する
pub async fn create_director(
    State(state): State<DirectorState>,
    Json(request): Json<CreateDirectorRequest>,
) -> Result<Json<ApiResponse<Director>>, ApiError> {
    let first_name = FirstName::new(request.first_name)?;
    let last_name = LastName::new(request.last_name)?;
    let new_director = NewDirector::new(first_name, last_name, request.oscars)?;

    let director = state.director_repository.create(new_director).await?;

    Ok(Json(ApiResponse::new(director)))
}

/// 監督を 1 件取得する
pub async fn get_director(
    State(state): State<DirectorState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Director>>, ApiError> {
    let director = state
        .director_repository
        .find_by_id(id)
        .await?
        .ok_or(ApiError::not_found("Director"))?;

    Ok(Json(ApiResponse::new(director)))
}

/// 監督一覧をページ単位で取得する
pub async fn list_directors(
    State(state): State<DirectorState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Director>>>, ApiError> {
    let (limit, offset) = query.to_limit_offset()?;

    let directors = state.director_repository.list(limit, offset).await?;

    Ok(Json(ApiResponse::new(directors)))
}

//! # 映画ハンドラ
//!
//! 映画のレスポンスは監督情報を同梱する。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use gekijo_domain::{
    director::Director,
    movie::{Movie, NewMovie, Poster, Summary, Title},
};
use gekijo_infra::{
    InfraError,
    repository::{DirectorRepository, MovieRepository},
};
use gekijo_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// 映画ハンドラの状態
#[derive(Clone)]
pub struct MovieState {
    pub movie_repository:    Arc<dyn MovieRepository>,
    pub director_repository: Arc<dyn DirectorRepository>,
}

/// 映画の作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub title:       String,
    pub director_id: i64,
    pub rating:      i16,
    pub poster:      String,
    pub summary:     String,
}

/// 一覧取得の件数クエリ
///
/// 上映作品は少数のためページングせず、先頭から `count` 件を返す。
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListMoviesQuery {
    pub count: i64,
}

impl ListMoviesQuery {
    const MAX_COUNT: i64 = 8;

    fn validated_count(self) -> Result<i64, ApiError> {
        if !(1..=Self::MAX_COUNT).contains(&self.count) {
            return Err(ApiError::Validation(format!(
                "count は 1〜{} の範囲である必要があります",
                Self::MAX_COUNT,
            )));
        }

        Ok(self.count)
    }
}

/// 監督情報付きの映画レスポンス
#[derive(Debug, Serialize)]
pub struct MovieWithDirector {
    pub movie:    Movie,
    pub director: Director,
}

/// 映画を作成する
///
/// 監督の存在は確認しない（存在しない場合は外部キー制約で失敗する）。
pub async fn create_movie(
    State(state): State<MovieState>,
    Json(request): Json<CreateMovieRequest>,
) -> Result<Json<ApiResponse<Movie>>, ApiError> {
    let title = Title::new(request.title)?;
    let poster = Poster::new(request.poster)?;
    let summary = Summary::new(request.summary)?;
    let new_movie = NewMovie::new(title, request.director_id, request.rating, poster, summary)?;

    let movie = state.movie_repository.create(new_movie).await?;

    Ok(Json(ApiResponse::new(movie)))
}

/// 映画を監督情報付きで 1 件取得する
pub async fn get_movie(
    State(state): State<MovieState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MovieWithDirector>>, ApiError> {
    let movie = state
        .movie_repository
        .find_by_id(id)
        .await?
        .ok_or(ApiError::not_found("Movie"))?;

    let director = find_director(&state, movie.director_id).await?;

    Ok(Json(ApiResponse::new(MovieWithDirector { movie, director })))
}

/// 映画一覧を監督情報付きで取得する
pub async fn list_movies(
    State(state): State<MovieState>,
    Query(query): Query<ListMoviesQuery>,
) -> Result<Json<ApiResponse<Vec<MovieWithDirector>>>, ApiError> {
    let count = query.validated_count()?;

    let movies = state.movie_repository.list(count).await?;

    let mut items = Vec::with_capacity(movies.len());
    for movie in movies {
        let director = find_director(&state, movie.director_id).await?;
        items.push(MovieWithDirector { movie, director });
    }

    Ok(Json(ApiResponse::new(items)))
}

/// 映画が参照する監督を取得する
///
/// 外部キー制約により必ず存在するはずなので、欠落はデータ不整合
/// として 500 にする。
async fn find_director(state: &MovieState, director_id: i64) -> Result<Director, ApiError> {
    state
        .director_repository
        .find_by_id(director_id)
        .await?
        .ok_or_else(|| {
            ApiError::from(InfraError::unexpected(format!(
                "映画が参照する監督 (id={director_id}) が存在しません"
            )))
        })
}

//! Album endpoints.

use axum::extract::{Path, State};

use super::{success, ApiJson, ApiResult};
use crate::errors::AppError;
use crate::models::{
    Album, CreateAlbumRequest, NewMediaItem, ReorderMediaRequest, SetCoverRequest,
    UpdateAlbumRequest,
};
use crate::AppState;

/// GET /api/albums - Published albums.
pub async fn list_public_albums(State(state): State<AppState>) -> ApiResult<Vec<Album>> {
    let albums = state.repo.list_albums().await?;
    success(albums.into_iter().filter(|a| a.published).collect())
}

/// GET /api/albums/:id - A published album. Unpublished albums read as not found.
pub async fn get_public_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Album> {
    match state.repo.get_album(&id).await? {
        Some(album) if album.published => success(album),
        _ => Err(AppError::NotFound(format!("Album {} not found", id))),
    }
}

/// GET /api/admin/albums - All albums, published or not.
pub async fn list_albums(State(state): State<AppState>) -> ApiResult<Vec<Album>> {
    success(state.repo.list_albums().await?)
}

/// GET /api/admin/albums/:id
pub async fn get_album(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Album> {
    match state.repo.get_album(&id).await? {
        Some(album) => success(album),
        None => Err(AppError::NotFound(format!("Album {} not found", id))),
    }
}

/// POST /api/admin/albums
pub async fn create_album(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAlbumRequest>,
) -> ApiResult<Album> {
    success(state.repo.create_album(&request).await?)
}

/// PUT /api/admin/albums/:id
pub async fn update_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateAlbumRequest>,
) -> ApiResult<Album> {
    success(state.repo.update_album(&id, &request).await?)
}

/// DELETE /api/admin/albums/:id
pub async fn delete_album(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_album(&id).await?;
    success(())
}

/// POST /api/admin/albums/:id/media - Append media items.
pub async fn add_album_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(items): ApiJson<Vec<NewMediaItem>>,
) -> ApiResult<Album> {
    success(state.repo.add_media(&id, &items).await?)
}

/// DELETE /api/admin/albums/:id/media/:media_id
pub async fn remove_album_media(
    State(state): State<AppState>,
    Path((id, media_id)): Path<(String, String)>,
) -> ApiResult<Album> {
    success(state.repo.remove_media(&id, &media_id).await?)
}

/// PUT /api/admin/albums/:id/media/order
pub async fn reorder_album_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ReorderMediaRequest>,
) -> ApiResult<Album> {
    success(state.repo.reorder_media(&id, &request.media_ids).await?)
}

/// PUT /api/admin/albums/:id/cover
pub async fn set_album_cover(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<SetCoverRequest>,
) -> ApiResult<Album> {
    success(state.repo.set_cover(&id, &request.media_id).await?)
}

//! Ride and participant endpoints.

use axum::extract::{Path, State};

use super::{success, ApiJson, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CreateRideRequest, Participant, PublicRide, RegisterParticipantRequest, Ride,
    UpdateRideRequest,
};
use crate::AppState;

/// GET /api/rides - List rides without access codes.
pub async fn list_public_rides(State(state): State<AppState>) -> ApiResult<Vec<PublicRide>> {
    let rides = state.repo.list_rides().await?;
    success(rides.into_iter().map(PublicRide::from).collect())
}

/// GET /api/rides/:id - A single ride without its access code.
pub async fn get_public_ride(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PublicRide> {
    match state.repo.get_ride(&id).await? {
        Some(ride) => success(PublicRide::from(ride)),
        None => Err(AppError::NotFound(format!("Ride {} not found", id))),
    }
}

/// POST /api/rides/:id/register - Register a participant.
pub async fn register_for_ride(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<RegisterParticipantRequest>,
) -> ApiResult<Participant> {
    success(state.repo.register_participant(&id, &request).await?)
}

/// GET /api/admin/rides - List rides including access codes.
pub async fn list_rides(State(state): State<AppState>) -> ApiResult<Vec<Ride>> {
    success(state.repo.list_rides().await?)
}

/// GET /api/admin/rides/:id
pub async fn get_ride(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Ride> {
    match state.repo.get_ride(&id).await? {
        Some(ride) => success(ride),
        None => Err(AppError::NotFound(format!("Ride {} not found", id))),
    }
}

/// POST /api/admin/rides
pub async fn create_ride(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateRideRequest>,
) -> ApiResult<Ride> {
    success(state.repo.create_ride(&request).await?)
}

/// PUT /api/admin/rides/:id
pub async fn update_ride(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateRideRequest>,
) -> ApiResult<Ride> {
    success(state.repo.update_ride(&id, &request).await?)
}

/// DELETE /api/admin/rides/:id - Delete a ride and its participants.
pub async fn delete_ride(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_ride(&id).await?;
    success(())
}

/// GET /api/admin/rides/:id/participants
pub async fn list_participants(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Participant>> {
    success(state.repo.list_participants(&id).await?)
}

/// DELETE /api/admin/rides/:id/participants/:participant_id
pub async fn delete_participant(
    State(state): State<AppState>,
    Path((id, participant_id)): Path<(String, String)>,
) -> ApiResult<()> {
    state.repo.delete_participant(&id, &participant_id).await?;
    success(())
}

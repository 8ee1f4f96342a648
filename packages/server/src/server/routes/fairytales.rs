//! `/api/fairytales` handlers.
//!
//! User routes identify the caller through `AuthUser`. The two worker
//! callbacks (`PATCH /:id/status`, `POST /notify`) sit behind the service
//! token middleware instead.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Path, Query},
    http::StatusCode,
    Json,
};

use crate::common::{FairytaleId, PageRequest, StoryId};
use crate::domains::fairytales::activities;
use crate::domains::fairytales::data::{
    DeleteFairytaleResponse, FairytaleDetailResponse, FairytaleListResponse,
    FairytaleStatusResponse, GenerateFairytaleRequest, GenerateFairytaleResponse,
    ListFairytalesQuery, NotifyFairytaleCompletionRequest, RenameFairytaleRequest,
    RenameFairytaleResponse, UpdateFairytaleStatusRequest, UpdateFairytaleStatusResponse,
};
use crate::domains::fairytales::FairytaleError;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::server::middleware::AuthUser;

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Unparseable ids can't name an existing fairytale.
fn fairytale_id(raw: &str) -> ApiResult<FairytaleId> {
    FairytaleId::parse(raw).map_err(|_| FairytaleError::FairytaleNotFound.into())
}

pub async fn generate_fairytale_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    payload: Result<Json<GenerateFairytaleRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GenerateFairytaleResponse>)> {
    let request = json_body(payload)?;
    request.validate()?;
    let story_id =
        StoryId::parse(request.story_id.trim()).map_err(|_| FairytaleError::StoryNotFound)?;

    let fairytale =
        activities::start_generation(user.user_id, story_id, &request.name, &state.deps).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateFairytaleResponse::from(&fairytale)),
    ))
}

pub async fn generate_sample_fairytale_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> ApiResult<(StatusCode, Json<GenerateFairytaleResponse>)> {
    let fairytale = activities::generate_sample_fairytale(user.user_id, &state.deps).await?;

    Ok((
        StatusCode::CREATED,
        Json(GenerateFairytaleResponse::from(&fairytale)),
    ))
}

pub async fn list_my_fairytales_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    query: Result<Query<ListFairytalesQuery>, QueryRejection>,
) -> ApiResult<Json<FairytaleListResponse>> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let page = PageRequest::new(query.after.as_deref(), query.limit)
        .map_err(|e| FairytaleError::Validation(e.to_string()))?;

    let list = activities::list_fairytales(user.user_id, page, &state.deps).await?;
    Ok(Json(list))
}

pub async fn get_fairytale_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<FairytaleDetailResponse>> {
    let id = fairytale_id(&id)?;
    let detail = activities::get_fairytale_detail(id, user.user_id, &state.deps).await?;
    Ok(Json(detail))
}

pub async fn get_fairytale_status_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<FairytaleStatusResponse>> {
    let id = fairytale_id(&id)?;
    let status = activities::get_fairytale_status(id, user.user_id, &state.deps).await?;
    Ok(Json(status))
}

pub async fn rename_fairytale_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<RenameFairytaleRequest>, JsonRejection>,
) -> ApiResult<Json<RenameFairytaleResponse>> {
    let id = fairytale_id(&id)?;
    let request = json_body(payload)?;
    request.validate()?;

    let renamed =
        activities::rename_fairytale(id, user.user_id, &request.name, &state.deps).await?;
    Ok(Json(renamed))
}

pub async fn delete_fairytale_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteFairytaleResponse>> {
    let id = fairytale_id(&id)?;
    activities::delete_fairytale(id, user.user_id, &state.deps).await?;
    Ok(Json(DeleteFairytaleResponse { success: true }))
}

// =============================================================================
// Worker callbacks
// =============================================================================

pub async fn update_fairytale_status_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateFairytaleStatusRequest>, JsonRejection>,
) -> ApiResult<Json<UpdateFairytaleStatusResponse>> {
    let id = fairytale_id(&id)?;
    let request = json_body(payload)?;
    request.validate()?;

    let fairytale =
        activities::update_status(id, request.status, &request.message, &state.deps).await?;
    Ok(Json(UpdateFairytaleStatusResponse::from(&fairytale)))
}

pub async fn notify_fairytale_completion_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<NotifyFairytaleCompletionRequest>, JsonRejection>,
) -> ApiResult<Json<UpdateFairytaleStatusResponse>> {
    let request = json_body(payload)?;
    let id = fairytale_id(request.id.trim())?;

    let fairytale = activities::complete_generation(id, request.report, &state.deps).await?;
    Ok(Json(UpdateFairytaleStatusResponse::from(&fairytale)))
}

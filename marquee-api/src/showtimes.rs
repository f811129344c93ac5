use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use marquee_core::{Showtime, ShowtimeId, ShowtimeRequest};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct CreatedShowtime {
    id: ShowtimeId,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/showtimes", post(create_showtime))
        .route("/showtimes/{id}", get(get_showtime).delete(delete_showtime))
        .route("/showtimes/update/{id}", post(update_showtime))
}

async fn create_showtime(
    State(state): State<AppState>,
    payload: Result<Json<ShowtimeRequest>, JsonRejection>,
) -> Result<Json<CreatedShowtime>, AppError> {
    let Json(req) = payload?;
    let id = state.scheduling.create_showtime(req).await?;
    Ok(Json(CreatedShowtime { id }))
}

async fn get_showtime(
    State(state): State<AppState>,
    Path(id): Path<ShowtimeId>,
) -> Result<Json<Showtime>, AppError> {
    Ok(Json(state.scheduling.get_showtime(id).await?))
}

async fn update_showtime(
    State(state): State<AppState>,
    Path(id): Path<ShowtimeId>,
    payload: Result<Json<ShowtimeRequest>, JsonRejection>,
) -> Result<Json<Showtime>, AppError> {
    let Json(req) = payload?;
    Ok(Json(state.scheduling.update_showtime(id, req).await?))
}

async fn delete_showtime(
    State(state): State<AppState>,
    Path(id): Path<ShowtimeId>,
) -> Result<(), AppError> {
    state.scheduling.delete_showtime(id).await?;
    Ok(())
}

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use marquee_core::{Booking, BookingId, BookingRequest};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookingResponse {
    booking_id: BookingId,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(book_seat).get(list_bookings))
        .route("/bookings/{id}", get(get_booking))
}

async fn book_seat(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<Json<BookingResponse>, AppError> {
    let Json(req) = payload?;
    let booking_id = state.bookings.book_seat(req).await?;
    Ok(Json(BookingResponse { booking_id }))
}

async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.list_bookings().await?))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.get_booking(id).await?))
}

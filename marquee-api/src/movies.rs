use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use marquee_core::{Movie, MovieRequest};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movies/all", get(list_movies))
        .route("/movies", post(add_movie))
        .route("/movies/update/{title}", post(update_movie))
        .route("/movies/{title}", delete(delete_movie))
}

async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, AppError> {
    Ok(Json(state.movies.list_movies().await?))
}

async fn add_movie(
    State(state): State<AppState>,
    payload: Result<Json<MovieRequest>, JsonRejection>,
) -> Result<Json<Movie>, AppError> {
    let Json(req) = payload?;
    Ok(Json(state.movies.add_movie(req).await?))
}

async fn update_movie(
    State(state): State<AppState>,
    Path(title): Path<String>,
    payload: Result<Json<MovieRequest>, JsonRejection>,
) -> Result<Json<Movie>, AppError> {
    let Json(req) = payload?;
    Ok(Json(state.movies.update_movie(&title, req).await?))
}

async fn delete_movie(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<(), AppError> {
    state.movies.delete_movie(&title).await?;
    Ok(())
}

use marquee_core::{
    CoreError, CoreResult, IntervalStore, MovieCatalog, MovieId, Showtime, ShowtimeFields,
    ShowtimeId, ShowtimeRequest, StoreError,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Creates, moves and cancels showtimes so that no two showtimes of one
/// theater ever share a moment.
pub struct SchedulingService {
    showtimes: Arc<dyn IntervalStore>,
    movies: Arc<dyn MovieCatalog>,
}

impl SchedulingService {
    pub fn new(showtimes: Arc<dyn IntervalStore>, movies: Arc<dyn MovieCatalog>) -> Self {
        Self { showtimes, movies }
    }

    pub async fn create_showtime(&self, request: ShowtimeRequest) -> CoreResult<ShowtimeId> {
        let fields = request.validate()?;
        self.ensure_movie(fields.movie_id).await?;

        let mut unit = self.showtimes.begin_theater(&fields.theater).await?;
        let conflicts = unit
            .find_overlapping(&fields.theater, fields.start_time, fields.end_time, None)
            .await?;
        if !conflicts.is_empty() {
            return Err(overlap(&fields, &conflicts));
        }

        let id = unit
            .create(&fields)
            .await
            .map_err(|e| reference_error(e, fields.movie_id))?;
        unit.commit()
            .await
            .map_err(|e| reference_error(e, fields.movie_id))?;

        info!(
            "Scheduled showtime {} in '{}' from {} to {}",
            id, fields.theater, fields.start_time, fields.end_time
        );
        Ok(id)
    }

    /// Full replace. The record itself is ignored by the overlap check.
    pub async fn update_showtime(
        &self,
        id: ShowtimeId,
        request: ShowtimeRequest,
    ) -> CoreResult<Showtime> {
        if self.showtimes.get(id).await?.is_none() {
            return Err(CoreError::ShowtimeNotFound(id));
        }

        let fields = request.validate()?;
        self.ensure_movie(fields.movie_id).await?;

        let mut unit = self.showtimes.begin_theater(&fields.theater).await?;
        let conflicts = unit
            .find_overlapping(&fields.theater, fields.start_time, fields.end_time, Some(id))
            .await?;
        if !conflicts.is_empty() {
            return Err(overlap(&fields, &conflicts));
        }

        unit.update(id, &fields).await.map_err(|e| match e {
            StoreError::NotFound => CoreError::ShowtimeNotFound(id),
            other => reference_error(other, fields.movie_id),
        })?;
        unit.commit().await.map_err(|e| match e {
            StoreError::NotFound => CoreError::ShowtimeNotFound(id),
            other => reference_error(other, fields.movie_id),
        })?;

        info!("Updated showtime {} in '{}'", id, fields.theater);
        Ok(fields.into_showtime(id))
    }

    pub async fn delete_showtime(&self, id: ShowtimeId) -> CoreResult<()> {
        self.showtimes.delete(id).await.map_err(|e| match e {
            StoreError::NotFound => CoreError::ShowtimeNotFound(id),
            other => other.into(),
        })?;

        info!("Deleted showtime {}", id);
        Ok(())
    }

    pub async fn get_showtime(&self, id: ShowtimeId) -> CoreResult<Showtime> {
        self.showtimes
            .get(id)
            .await?
            .ok_or(CoreError::ShowtimeNotFound(id))
    }

    async fn ensure_movie(&self, movie_id: MovieId) -> CoreResult<()> {
        if !self.movies.exists_by_id(movie_id).await? {
            return Err(CoreError::UnknownMovie(movie_id));
        }
        Ok(())
    }
}

fn overlap(fields: &ShowtimeFields, conflicts: &[Showtime]) -> CoreError {
    let conflicting: Vec<ShowtimeId> = conflicts.iter().map(|s| s.id).collect();
    warn!(
        "Rejected showtime in '{}' [{}, {}): overlaps {:?}",
        fields.theater, fields.start_time, fields.end_time, conflicting
    );
    CoreError::Overlap {
        theater: fields.theater.clone(),
        conflicting,
    }
}

// The movie can disappear between the existence check and the commit.
fn reference_error(err: StoreError, movie_id: MovieId) -> CoreError {
    match err {
        StoreError::MissingReference(_) => CoreError::UnknownMovie(movie_id),
        other => other.into(),
    }
}

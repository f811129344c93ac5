use marquee_core::{CoreError, CoreResult, Movie, MovieCatalog, MovieRequest, StoreError};
use std::sync::Arc;
use tracing::info;

pub struct MovieService {
    movies: Arc<dyn MovieCatalog>,
}

impl MovieService {
    pub fn new(movies: Arc<dyn MovieCatalog>) -> Self {
        Self { movies }
    }

    pub async fn list_movies(&self) -> CoreResult<Vec<Movie>> {
        Ok(self.movies.find_all().await?)
    }

    pub async fn add_movie(&self, request: MovieRequest) -> CoreResult<Movie> {
        let fields = request.validate()?;

        // Fast path; the unique constraint still decides under a race.
        if self.movies.find_by_title(&fields.title).await?.is_some() {
            return Err(CoreError::MovieTitleTaken(fields.title));
        }

        let movie = self.movies.create(&fields).await?;
        info!("Added movie '{}' with id {}", movie.title, movie.id);
        Ok(movie)
    }

    pub async fn update_movie(&self, title: &str, request: MovieRequest) -> CoreResult<Movie> {
        let fields = request.validate()?;

        let movie = self
            .movies
            .update_by_title(title, &fields)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => CoreError::MovieNotFound(title.to_string()),
                other => other.into(),
            })?;

        info!("Updated movie '{}' (id {})", title, movie.id);
        Ok(movie)
    }

    pub async fn delete_movie(&self, title: &str) -> CoreResult<()> {
        self.movies.delete_by_title(title).await.map_err(|e| match e {
            StoreError::NotFound => CoreError::MovieNotFound(title.to_string()),
            StoreError::Referenced(_) => CoreError::MovieInUse(title.to_string()),
            other => other.into(),
        })?;

        info!("Deleted movie '{}'", title);
        Ok(())
    }
}

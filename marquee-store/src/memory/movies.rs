use async_trait::async_trait;
use marquee_core::{Movie, MovieCatalog, MovieFields, MovieId, StoreError, StoreResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::showtimes::MemoryShowtimeStore;

pub(crate) type MovieTable = Arc<RwLock<BTreeMap<MovieId, Movie>>>;

/// In-memory movie catalog. Titles are unique; when linked to a showtime
/// store, deleting a movie that still has showtimes is refused.
pub struct MemoryMovieStore {
    movies: MovieTable,
    next_id: AtomicI64,
    showtimes: Option<Arc<MemoryShowtimeStore>>,
}

impl MemoryMovieStore {
    pub fn new() -> Self {
        Self {
            movies: MovieTable::default(),
            next_id: AtomicI64::new(1),
            showtimes: None,
        }
    }

    /// A catalog and a showtime store that share one movie table, so that
    /// showtime commits and movie deletes see each other.
    pub fn linked(lock_wait: Duration) -> (Arc<Self>, Arc<MemoryShowtimeStore>) {
        let movies = MovieTable::default();
        let showtimes = Arc::new(MemoryShowtimeStore::with_movies(lock_wait, movies.clone()));
        let catalog = Arc::new(Self {
            movies,
            next_id: AtomicI64::new(1),
            showtimes: Some(showtimes.clone()),
        });
        (catalog, showtimes)
    }
}

impl Default for MemoryMovieStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MovieCatalog for MemoryMovieStore {
    async fn exists_by_id(&self, id: MovieId) -> StoreResult<bool> {
        Ok(self.movies.read().contains_key(&id))
    }

    async fn find_all(&self) -> StoreResult<Vec<Movie>> {
        Ok(self.movies.read().values().cloned().collect())
    }

    async fn find_by_title(&self, title: &str) -> StoreResult<Option<Movie>> {
        Ok(self.movies.read().values().find(|m| m.title == title).cloned())
    }

    async fn create(&self, fields: &MovieFields) -> StoreResult<Movie> {
        let mut movies = self.movies.write();
        if movies.values().any(|m| m.title == fields.title) {
            return Err(StoreError::DuplicateTitle(fields.title.clone()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let movie = fields.clone().into_movie(id);
        movies.insert(id, movie.clone());
        Ok(movie)
    }

    async fn update_by_title(&self, title: &str, fields: &MovieFields) -> StoreResult<Movie> {
        let mut movies = self.movies.write();
        let id = movies
            .values()
            .find(|m| m.title == title)
            .map(|m| m.id)
            .ok_or(StoreError::NotFound)?;

        if movies.values().any(|m| m.id != id && m.title == fields.title) {
            return Err(StoreError::DuplicateTitle(fields.title.clone()));
        }

        let movie = fields.clone().into_movie(id);
        movies.insert(id, movie.clone());
        Ok(movie)
    }

    async fn delete_by_title(&self, title: &str) -> StoreResult<()> {
        let mut movies = self.movies.write();
        let id = movies
            .values()
            .find(|m| m.title == title)
            .map(|m| m.id)
            .ok_or(StoreError::NotFound)?;

        // Still holding the movie write lock: no showtime commit can pass
        // its reference check until this delete is done.
        if let Some(showtimes) = &self.showtimes {
            if showtimes.references_movie(id) {
                return Err(StoreError::Referenced(format!("movie '{}' has showtimes", title)));
            }
        }

        movies.remove(&id);
        Ok(())
    }
}

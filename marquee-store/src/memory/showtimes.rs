use async_trait::async_trait;
use chrono::NaiveDateTime;
use marquee_core::{
    IntervalStore, MovieId, Showtime, ShowtimeFields, ShowtimeId, StoreError, StoreResult,
    TheaterUnit,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;

use super::locks::LockTable;
use super::movies::MovieTable;

type ShowtimeTable = Arc<RwLock<BTreeMap<ShowtimeId, Showtime>>>;

/// In-memory interval store. Writers serialize per theater through the lock
/// table; readers only take the table's read lock.
///
/// When linked to a movie table, commits check `movie_id` against it the way
/// a foreign key would. Lock order is always movies before showtimes.
pub struct MemoryShowtimeStore {
    table: ShowtimeTable,
    next_id: Arc<AtomicI64>,
    locks: LockTable<String>,
    movies: Option<MovieTable>,
}

impl MemoryShowtimeStore {
    pub fn new(lock_wait: Duration) -> Self {
        Self {
            table: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            locks: LockTable::new(lock_wait),
            movies: None,
        }
    }

    pub(crate) fn with_movies(lock_wait: Duration, movies: MovieTable) -> Self {
        Self {
            movies: Some(movies),
            ..Self::new(lock_wait)
        }
    }

    pub fn find_all(&self) -> Vec<Showtime> {
        self.table.read().values().cloned().collect()
    }

    pub(crate) fn references_movie(&self, movie_id: MovieId) -> bool {
        self.table.read().values().any(|s| s.movie_id == movie_id)
    }
}

impl Default for MemoryShowtimeStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

enum Staged {
    Insert(Showtime),
    Replace(Showtime),
}

/// Holds the theater lock until dropped. Writes are staged and applied in
/// one step by `commit`; dropping without committing discards them.
pub struct MemoryTheaterUnit {
    _guard: OwnedMutexGuard<()>,
    table: ShowtimeTable,
    next_id: Arc<AtomicI64>,
    movies: Option<MovieTable>,
    staged: Vec<Staged>,
}

impl MemoryTheaterUnit {
    /// Committed rows of `theater` with this unit's own pending writes laid
    /// over them. A staged replace that moved a row elsewhere hides it.
    fn visible(&self, theater: &str) -> BTreeMap<ShowtimeId, Showtime> {
        let mut rows: BTreeMap<ShowtimeId, Showtime> = self
            .table
            .read()
            .values()
            .filter(|s| s.theater == theater)
            .map(|s| (s.id, s.clone()))
            .collect();
        for write in &self.staged {
            let (Staged::Insert(s) | Staged::Replace(s)) = write;
            if s.theater == theater {
                rows.insert(s.id, s.clone());
            } else {
                rows.remove(&s.id);
            }
        }
        rows
    }

    fn exists(&self, id: ShowtimeId) -> bool {
        self.staged.iter().any(|w| matches!(w, Staged::Insert(s) if s.id == id))
            || self.table.read().contains_key(&id)
    }
}

#[async_trait]
impl TheaterUnit for MemoryTheaterUnit {
    async fn find_overlapping(
        &mut self,
        theater: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude_id: Option<ShowtimeId>,
    ) -> StoreResult<Vec<Showtime>> {
        let mut found: Vec<Showtime> = self
            .visible(theater)
            .into_values()
            .filter(|s| Some(s.id) != exclude_id)
            .filter(|s| s.overlaps(start, end))
            .collect();
        found.sort_by_key(|s| s.start_time);
        Ok(found)
    }

    async fn create(&mut self, fields: &ShowtimeFields) -> StoreResult<ShowtimeId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.staged.push(Staged::Insert(fields.clone().into_showtime(id)));
        Ok(id)
    }

    async fn update(&mut self, id: ShowtimeId, fields: &ShowtimeFields) -> StoreResult<()> {
        if !self.exists(id) {
            return Err(StoreError::NotFound);
        }
        self.staged.push(Staged::Replace(fields.clone().into_showtime(id)));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTheaterUnit {
            _guard,
            table,
            movies,
            staged,
            ..
        } = *self;
        // Held through the write so a movie delete cannot slip in between.
        let movies = movies.as_ref().map(|m| m.read());
        let mut table = table.write();

        if let Some(movies) = &movies {
            for write in &staged {
                let (Staged::Insert(s) | Staged::Replace(s)) = write;
                if !movies.contains_key(&s.movie_id) {
                    return Err(StoreError::MissingReference(format!("movie {}", s.movie_id)));
                }
            }
        }

        // A concurrent delete may have removed a row this unit replaces.
        let inserted: Vec<ShowtimeId> = staged
            .iter()
            .filter_map(|w| match w {
                Staged::Insert(s) => Some(s.id),
                Staged::Replace(_) => None,
            })
            .collect();
        for write in &staged {
            if let Staged::Replace(s) = write {
                if !table.contains_key(&s.id) && !inserted.contains(&s.id) {
                    return Err(StoreError::NotFound);
                }
            }
        }

        for write in staged {
            let (Staged::Insert(s) | Staged::Replace(s)) = write;
            table.insert(s.id, s);
        }
        Ok(())
    }
}

#[async_trait]
impl IntervalStore for MemoryShowtimeStore {
    async fn begin_theater(&self, theater: &str) -> StoreResult<Box<dyn TheaterUnit>> {
        let guard = self.locks.acquire(&theater.to_string()).await?;
        Ok(Box::new(MemoryTheaterUnit {
            _guard: guard,
            table: self.table.clone(),
            next_id: self.next_id.clone(),
            movies: self.movies.clone(),
            staged: Vec::new(),
        }))
    }

    async fn get(&self, id: ShowtimeId) -> StoreResult<Option<Showtime>> {
        Ok(self.table.read().get(&id).cloned())
    }

    async fn delete(&self, id: ShowtimeId) -> StoreResult<()> {
        self.table
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

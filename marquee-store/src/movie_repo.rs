use async_trait::async_trait;
use marquee_core::{Movie, MovieCatalog, MovieFields, MovieId, StoreError, StoreResult};
use sqlx::PgPool;

use crate::database::{store_error, FOREIGN_KEY_VIOLATION};

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: i64,
    title: String,
    genre: String,
    duration: i32,
    rating: f64,
    release_year: i32,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            genre: row.genre,
            duration: row.duration,
            rating: row.rating,
            release_year: row.release_year,
        }
    }
}

pub struct PostgresMovieRepository {
    pool: PgPool,
}

impl PostgresMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn write_error(err: sqlx::Error, title: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateTitle(title.to_string());
        }
        if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
            return StoreError::Referenced(format!("movie '{}' has showtimes", title));
        }
    }
    store_error(err)
}

#[async_trait]
impl MovieCatalog for PostgresMovieRepository {
    async fn exists_by_id(&self, id: MovieId) -> StoreResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM movies WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn find_all(&self) -> StoreResult<Vec<Movie>> {
        let rows = sqlx::query_as::<_, MovieRow>(
            "SELECT id, title, genre, duration, rating, release_year FROM movies ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn find_by_title(&self, title: &str) -> StoreResult<Option<Movie>> {
        let row = sqlx::query_as::<_, MovieRow>(
            "SELECT id, title, genre, duration, rating, release_year FROM movies WHERE title = $1",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Movie::from))
    }

    async fn create(&self, fields: &MovieFields) -> StoreResult<Movie> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO movies (title, genre, duration, rating, release_year)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.genre)
        .bind(fields.duration)
        .bind(fields.rating)
        .bind(fields.release_year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, &fields.title))?;

        Ok(fields.clone().into_movie(id))
    }

    async fn update_by_title(&self, title: &str, fields: &MovieFields) -> StoreResult<Movie> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE movies
            SET title = $2, genre = $3, duration = $4, rating = $5, release_year = $6
            WHERE title = $1
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(&fields.title)
        .bind(&fields.genre)
        .bind(fields.duration)
        .bind(fields.rating)
        .bind(fields.release_year)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, &fields.title))?;

        let id = id.ok_or(StoreError::NotFound)?;
        Ok(fields.clone().into_movie(id))
    }

    async fn delete_by_title(&self, title: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM movies WHERE title = $1")
            .bind(title)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, title))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

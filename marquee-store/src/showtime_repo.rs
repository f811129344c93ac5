use async_trait::async_trait;
use chrono::NaiveDateTime;
use marquee_core::{
    IntervalStore, MovieId, Showtime, ShowtimeFields, ShowtimeId, StoreError, StoreResult,
    TheaterUnit,
};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;

use crate::database::{begin_scoped, store_error, FOREIGN_KEY_VIOLATION};

#[derive(sqlx::FromRow)]
struct ShowtimeRow {
    id: i64,
    movie_id: i64,
    theater: String,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    price: Decimal,
}

impl From<ShowtimeRow> for Showtime {
    fn from(row: ShowtimeRow) -> Self {
        Showtime {
            id: row.id,
            movie_id: row.movie_id,
            theater: row.theater,
            start_time: row.start_time,
            end_time: row.end_time,
            price: row.price,
        }
    }
}

pub struct PostgresShowtimeRepository {
    pool: PgPool,
    lock_wait: Duration,
}

impl PostgresShowtimeRepository {
    pub fn new(pool: PgPool, lock_wait: Duration) -> Self {
        Self { pool, lock_wait }
    }
}

/// One transaction holding the advisory lock for `theater:{name}`.
pub struct PgTheaterUnit {
    tx: Transaction<'static, Postgres>,
}

fn write_error(err: sqlx::Error, movie_id: MovieId) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
            return StoreError::MissingReference(format!("movie {}", movie_id));
        }
    }
    store_error(err)
}

#[async_trait]
impl TheaterUnit for PgTheaterUnit {
    async fn find_overlapping(
        &mut self,
        theater: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude_id: Option<ShowtimeId>,
    ) -> StoreResult<Vec<Showtime>> {
        // Serial ids start at 1, so 0 excludes nothing.
        let rows = sqlx::query_as::<_, ShowtimeRow>(
            r#"
            SELECT id, movie_id, theater, start_time, end_time, price
            FROM showtimes
            WHERE theater = $1
              AND id <> $4
              AND $2 < end_time
              AND start_time < $3
            ORDER BY start_time
            "#,
        )
        .bind(theater)
        .bind(start)
        .bind(end)
        .bind(exclude_id.unwrap_or(0))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Showtime::from).collect())
    }

    async fn create(&mut self, fields: &ShowtimeFields) -> StoreResult<ShowtimeId> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO showtimes (movie_id, theater, start_time, end_time, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(fields.movie_id)
        .bind(&fields.theater)
        .bind(fields.start_time)
        .bind(fields.end_time)
        .bind(fields.price)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| write_error(e, fields.movie_id))?;

        Ok(id)
    }

    async fn update(&mut self, id: ShowtimeId, fields: &ShowtimeFields) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE showtimes
            SET movie_id = $2, theater = $3, start_time = $4, end_time = $5, price = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(fields.movie_id)
        .bind(&fields.theater)
        .bind(fields.start_time)
        .bind(fields.end_time)
        .bind(fields.price)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| write_error(e, fields.movie_id))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await.map_err(store_error)
    }
}

#[async_trait]
impl IntervalStore for PostgresShowtimeRepository {
    async fn begin_theater(&self, theater: &str) -> StoreResult<Box<dyn TheaterUnit>> {
        let scope = format!("theater:{}", theater);
        let tx = begin_scoped(&self.pool, &scope, self.lock_wait).await?;
        Ok(Box::new(PgTheaterUnit { tx }))
    }

    async fn get(&self, id: ShowtimeId) -> StoreResult<Option<Showtime>> {
        let row = sqlx::query_as::<_, ShowtimeRow>(
            "SELECT id, movie_id, theater, start_time, end_time, price \
             FROM showtimes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Showtime::from))
    }

    async fn delete(&self, id: ShowtimeId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM showtimes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

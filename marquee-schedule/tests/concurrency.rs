mod common;

use common::{at, booking, showtime, Harness};
use futures_util::future::join_all;
use marquee_core::{CoreError, IntervalStore};
use std::sync::Arc;
use std::time::Duration;

const WORKERS: usize = 32;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_bookings_of_one_seat() {
    let h = Arc::new(Harness::new());
    let movie = h.movie("Stalker").await;
    let showtime_id = h
        .scheduling
        .create_showtime(showtime(movie.id, "Hall 1", at(19, 0), at(21, 0)))
        .await
        .unwrap();

    let tasks = (0..WORKERS).map(|_| {
        let h = h.clone();
        tokio::spawn(async move { h.bookings.book_seat(booking(showtime_id, 7)).await })
    });
    let results: Vec<_> = join_all(tasks).await.into_iter().map(|r| r.unwrap()).collect();

    let won = results.iter().filter(|r| r.is_ok()).count();
    let taken = results
        .iter()
        .filter(|r| matches!(r, Err(CoreError::SeatTaken { .. })))
        .count();
    assert_eq!(won, 1);
    assert_eq!(taken, WORKERS - 1);
    assert_eq!(h.bookings.list_bookings().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_distinct_seats_all_succeed() {
    let h = Arc::new(Harness::new());
    let movie = h.movie("Stalker").await;
    let showtime_id = h
        .scheduling
        .create_showtime(showtime(movie.id, "Hall 1", at(19, 0), at(21, 0)))
        .await
        .unwrap();

    let tasks = (1..=WORKERS as i64).map(|seat| {
        let h = h.clone();
        tokio::spawn(async move { h.bookings.book_seat(booking(showtime_id, seat)).await })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }
    assert_eq!(h.bookings.list_bookings().await.unwrap().len(), WORKERS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_overlapping_creates() {
    let h = Arc::new(Harness::new());
    let movie = h.movie("Stalker").await;

    // Every request overlaps every other one.
    let tasks = (0..WORKERS as u32).map(|i| {
        let h = h.clone();
        let movie_id = movie.id;
        tokio::spawn(async move {
            let start = at(10, i % 60);
            h.scheduling
                .create_showtime(showtime(movie_id, "Hall 1", start, at(12, 0)))
                .await
        })
    });
    let results: Vec<_> = join_all(tasks).await.into_iter().map(|r| r.unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, CoreError::Overlap { .. })));
    assert_eq!(h.showtimes.find_all().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_updates_cannot_collide() {
    let h = Arc::new(Harness::new());
    let movie = h.movie("Stalker").await;

    // Separate slots; then everyone tries to move into 20:00-22:00.
    let mut ids = Vec::new();
    for i in 0..8 {
        let id = h
            .scheduling
            .create_showtime(showtime(movie.id, "Hall 1", at(i, 0), at(i, 30)))
            .await
            .unwrap();
        ids.push(id);
    }

    let tasks = ids.into_iter().map(|id| {
        let h = h.clone();
        let movie_id = movie.id;
        tokio::spawn(async move {
            h.scheduling
                .update_showtime(id, showtime(movie_id, "Hall 1", at(20, 0), at(22, 0)))
                .await
        })
    });
    let moved = join_all(tasks)
        .await
        .into_iter()
        .filter(|r| matches!(r, Ok(Ok(_))))
        .count();
    assert_eq!(moved, 1);

    let all = h.showtimes.find_all();
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            assert!(!a.overlaps(b.start_time, b.end_time), "{a:?} overlaps {b:?}");
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_movie_delete_racing_a_create_leaves_no_orphan() {
    let h = Arc::new(Harness::new());
    let movie = h.movie("Solaris").await;

    // Park the create behind the theater lock, past its movie check.
    let held = h.showtimes.begin_theater("Hall 1").await.unwrap();
    let create = {
        let h = h.clone();
        tokio::spawn(async move {
            h.scheduling
                .create_showtime(showtime(movie.id, "Hall 1", at(19, 0), at(21, 0)))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    h.movies.delete_movie("Solaris").await.unwrap();
    drop(held);

    let err = create.await.unwrap().unwrap_err();
    assert!(matches!(err, CoreError::UnknownMovie(id) if id == movie.id));
    assert!(h.showtimes.find_all().is_empty());
    assert!(h.movies.list_movies().await.unwrap().is_empty());
}

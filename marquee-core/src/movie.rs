use crate::error::{CoreError, CoreResult};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

pub type MovieId = i64;

pub const MIN_RELEASE_YEAR: i32 = 1800;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub genre: String,
    pub duration: i32,
    pub rating: f64,
    pub release_year: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRequest {
    pub title: String,
    pub genre: String,
    pub duration: i32,
    pub rating: f64,
    pub release_year: i32,
}

/// Validated movie attributes, without identity.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieFields {
    pub title: String,
    pub genre: String,
    pub duration: i32,
    pub rating: f64,
    pub release_year: i32,
}

impl MovieFields {
    pub fn into_movie(self, id: MovieId) -> Movie {
        Movie {
            id,
            title: self.title,
            genre: self.genre,
            duration: self.duration,
            rating: self.rating,
            release_year: self.release_year,
        }
    }
}

impl MovieRequest {
    pub fn validate(self) -> CoreResult<MovieFields> {
        self.validate_for_year(chrono::Utc::now().year())
    }

    pub fn validate_for_year(self, current_year: i32) -> CoreResult<MovieFields> {
        let mut problems = Vec::new();

        if self.title.trim().is_empty() {
            problems.push("title must not be empty".to_string());
        }
        let letters_only = self.genre.chars().all(|c| c.is_ascii_alphabetic() || c == ' ');
        if self.genre.is_empty() || !letters_only {
            problems.push("genre must contain only English letters and spaces".to_string());
        }
        if self.duration < 1 {
            problems.push("duration must be greater than 0".to_string());
        }
        if !(0.0..=10.0).contains(&self.rating) {
            problems.push("rating must be between 0.0 and 10.0".to_string());
        }
        if self.release_year < MIN_RELEASE_YEAR || self.release_year > current_year {
            problems.push(format!(
                "releaseYear must be between {} and {}",
                MIN_RELEASE_YEAR, current_year
            ));
        }

        if !problems.is_empty() {
            return Err(CoreError::ValidationError(problems.join(", ")));
        }

        Ok(MovieFields {
            title: self.title,
            genre: self.genre,
            duration: self.duration,
            rating: self.rating,
            release_year: self.release_year,
        })
    }
}

//! Persistence boundary for course records.
//!
//! The service only talks to [`CourseStore`]. Two backends implement it:
//! - [`crate::db::repository::SqliteCourseStore`]: production, on `sqlx`.
//! - [`memory::InMemoryCourseStore`]: process-local, used by tests.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Course, Sort};
use crate::query::CourseQuery;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<Course>, StoreError>;

    /// Insert when `course.id` is absent (assigning a new id), otherwise
    /// replace the record with that id. Returns the stored record.
    async fn save(&self, course: Course) -> Result<Course, StoreError>;

    /// Removing an unknown id is not an error.
    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError>;

    async fn find(
        &self,
        query: &CourseQuery,
        sort: &Sort,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Course>, StoreError>;

    async fn count(&self, query: &CourseQuery) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

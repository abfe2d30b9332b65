use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CourseStore, StoreError};
use crate::models::{Course, Sort};
use crate::query::CourseQuery;

#[derive(Default)]
pub struct InMemoryCourseStore {
    courses: RwLock<HashMap<String, Course>>,
}

impl InMemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.courses.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.courses.read().await.is_empty()
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn get_by_id(&self, id: &str) -> Result<Option<Course>, StoreError> {
        Ok(self.courses.read().await.get(id).cloned())
    }

    async fn save(&self, mut course: Course) -> Result<Course, StoreError> {
        let id = course
            .id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();
        self.courses.write().await.insert(id, course.clone());
        Ok(course)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        self.courses.write().await.remove(id);
        Ok(())
    }

    async fn find(
        &self,
        query: &CourseQuery,
        sort: &Sort,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Course>, StoreError> {
        let courses = self.courses.read().await;
        let mut matched: Vec<&Course> = courses.values().filter(|c| query.matches(c)).collect();
        matched.sort_by(|a, b| sort.compare(a, b));

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, query: &CourseQuery) -> Result<u64, StoreError> {
        let courses = self.courses.read().await;
        Ok(courses.values().filter(|c| query.matches(c)).count() as u64)
    }
}

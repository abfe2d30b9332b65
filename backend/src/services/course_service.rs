use std::sync::Arc;

use chrono::{Datelike, Duration, Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::{Course, CourseFields, CoursePage, PageRequest, WeeklyCompletion};
use crate::query::{self, CourseFilter};
use crate::store::CourseStore;

/// Source of "today" for completion stamps and the weekly summary.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub fn local_clock() -> Clock {
    Arc::new(|| Local::now().date_naive())
}

/// Course use cases on top of a [`CourseStore`].
///
/// Every mutating operation reads one record, changes it and saves it back.
/// There is no version check, so two concurrent writers on the same id are
/// last-write-wins.
#[derive(Clone)]
pub struct CourseService {
    store: Arc<dyn CourseStore>,
    clock: Clock,
}

impl CourseService {
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self::with_clock(store, local_clock())
    }

    pub fn with_clock(store: Arc<dyn CourseStore>, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub async fn list(&self, filter: &CourseFilter, page: &PageRequest) -> Result<CoursePage, AppError> {
        let query = query::build_query(filter);
        debug!(
            "listing courses: {:?} page={} size={} sort={:?}",
            query.clauses(),
            page.page,
            page.size,
            page.sort
        );

        let content = self
            .store
            .find(&query, &page.sort, page.offset(), page.size)
            .await?;
        let total = self.store.count(&query).await?;

        Ok(CoursePage::new(content, total, page))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Course, AppError> {
        self.find_existing(id).await
    }

    pub async fn create(&self, mut course: Course) -> Result<Course, AppError> {
        // ids are always assigned by the store
        course.id = None;
        let created = self.store.save(course).await?;
        info!("Created course {:?}: {}", created.id, created.title);
        Ok(created)
    }

    pub async fn update(&self, id: &str, fields: CourseFields) -> Result<Course, AppError> {
        let mut course = self.find_existing(id).await?;
        fields.apply_to(&mut course);
        let updated = self.store.save(course).await?;
        info!("Updated course {}", id);
        Ok(updated)
    }

    /// Hard delete. Unknown ids are ignored.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.delete_by_id(id).await?;
        info!("Deleted course {}", id);
        Ok(())
    }

    pub async fn archive(&self, id: &str) -> Result<Course, AppError> {
        let mut course = self.find_existing(id).await?;
        course.archived = true;
        let archived = self.store.save(course).await?;
        info!("Archived course {}", id);
        Ok(archived)
    }

    /// Overwrites the completion flag. Marking complete always re-stamps
    /// `completed_date` with today.
    pub async fn set_completed(&self, id: &str, completed: bool) -> Result<Course, AppError> {
        let mut course = self.find_existing(id).await?;
        course.completed = completed;
        course.completed_date = completed.then(|| (self.clock)());
        let saved = self.store.save(course).await?;
        info!("Marked course {} completed={}", id, completed);
        Ok(saved)
    }

    /// Completions per Monday-start week for the last `weeks` weeks, oldest
    /// first. The newest bucket runs through today.
    pub async fn weekly_completions(
        &self,
        weeks: u32,
        include_archived: bool,
    ) -> Result<Vec<WeeklyCompletion>, AppError> {
        let today = (self.clock)();
        let this_week = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));

        let mut summary = Vec::with_capacity(weeks as usize);
        for weeks_back in (0..weeks).rev() {
            let week_start = this_week - Duration::weeks(i64::from(weeks_back));
            let until = if weeks_back == 0 {
                today + Duration::days(1)
            } else {
                week_start + Duration::weeks(1)
            };

            let query = query::completed_between(week_start, until, include_archived);
            let count = self.store.count(&query).await?;
            summary.push(WeeklyCompletion { week_start, count });
        }

        Ok(summary)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await?;
        Ok(())
    }

    async fn find_existing(&self, id: &str) -> Result<Course, AppError> {
        match self.store.get_by_id(id).await? {
            Some(course) => Ok(course),
            None => {
                warn!("Course not found: {}", id);
                Err(AppError::NotFound)
            }
        }
    }
}

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{Course, Sort};
use crate::query::{Clause, CourseQuery, fold_title};
use crate::store::{CourseStore, StoreError};

const SELECT_COURSES: &str = "SELECT id, title, summary, category, level, duration, content, subject, target_date, priority_level, materials, completed, completed_date, archived FROM courses";

#[derive(Debug, FromRow)]
struct CourseRow {
    id: String,
    title: String,
    summary: String,
    category: String,
    level: String,
    duration: String,
    content: Json<Vec<String>>,
    subject: String,
    target_date: Option<NaiveDate>,
    priority_level: String,
    materials: Json<Vec<String>>,
    completed: bool,
    completed_date: Option<NaiveDate>,
    archived: bool,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            id: Some(row.id),
            title: row.title,
            summary: row.summary,
            category: row.category,
            level: row.level,
            duration: row.duration,
            content: row.content.0,
            subject: row.subject,
            target_date: row.target_date,
            priority_level: row.priority_level,
            materials: row.materials.0,
            completed: row.completed,
            completed_date: row.completed_date,
            archived: row.archived,
        }
    }
}

/// Appends the `WHERE` clause for `query`, binding every value.
fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, query: &CourseQuery) {
    builder.push(" WHERE 1 = 1");

    for clause in query.clauses() {
        builder.push(" AND ");
        match clause {
            Clause::ArchivedIs(archived) => {
                builder.push("archived = ").push_bind(*archived);
            }
            Clause::CompletedIs(completed) => {
                builder.push("completed = ").push_bind(*completed);
            }
            Clause::TitleContains(needle) => {
                // needle is already folded the same way as title_folded
                builder
                    .push("instr(title_folded, ")
                    .push_bind(needle.clone())
                    .push(") > 0");
            }
            Clause::PriorityLevelIs(level) => {
                builder.push("priority_level = ").push_bind(level.clone());
            }
            Clause::TargetDateIs(date) => {
                builder.push("target_date = ").push_bind(*date);
            }
            Clause::CompletedDateBetween { from, until } => {
                builder
                    .push("completed_date >= ")
                    .push_bind(*from)
                    .push(" AND completed_date < ")
                    .push_bind(*until);
            }
        }
    }
}

#[derive(Clone)]
pub struct SqliteCourseStore {
    db: SqlitePool,
}

impl SqliteCourseStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseStore for SqliteCourseStore {
    async fn get_by_id(&self, id: &str) -> Result<Option<Course>, StoreError> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_COURSES);
        builder.push(" WHERE id = ").push_bind(id.to_string());

        let row = builder
            .build_query_as::<CourseRow>()
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Course::from))
    }

    async fn save(&self, mut course: Course) -> Result<Course, StoreError> {
        let id = course
            .id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        sqlx::query(
            r#"
            INSERT INTO courses
                (id, title, title_folded, summary, category, level, duration, content, subject,
                target_date, priority_level, materials, completed, completed_date, archived)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                title_folded = excluded.title_folded,
                summary = excluded.summary,
                category = excluded.category,
                level = excluded.level,
                duration = excluded.duration,
                content = excluded.content,
                subject = excluded.subject,
                target_date = excluded.target_date,
                priority_level = excluded.priority_level,
                materials = excluded.materials,
                completed = excluded.completed,
                completed_date = excluded.completed_date,
                archived = excluded.archived
            "#,
        )
        .bind(&id)
        .bind(&course.title)
        .bind(fold_title(&course.title))
        .bind(&course.summary)
        .bind(&course.category)
        .bind(&course.level)
        .bind(&course.duration)
        .bind(Json(course.content.clone()))
        .bind(&course.subject)
        .bind(course.target_date)
        .bind(&course.priority_level)
        .bind(Json(course.materials.clone()))
        .bind(course.completed)
        .bind(course.completed_date)
        .bind(course.archived)
        .execute(&self.db)
        .await?;

        Ok(course)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM courses WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn find(
        &self,
        query: &CourseQuery,
        sort: &Sort,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Course>, StoreError> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_COURSES);
        push_filter(&mut builder, query);

        // column and keyword come from closed enums, never from request input
        builder
            .push(" ORDER BY ")
            .push(sort.field.column())
            .push(" ")
            .push(sort.direction.keyword())
            .push(", id ASC LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(offset).unwrap_or(i64::MAX));

        let rows = builder
            .build_query_as::<CourseRow>()
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn count(&self, query: &CourseQuery) -> Result<u64, StoreError> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM courses");
        push_filter(&mut builder, query);

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.db)
            .await?;

        Ok(total.max(0) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }
}

//! Filter construction for course listings.
//!
//! A [`CourseFilter`] holds the optional criteria a caller passes in. The
//! builder turns it into a [`CourseQuery`]: an immutable list of clauses that
//! are all ANDed together. Stores translate the clause list into their own
//! query form (SQL for the SQLite store, [`Clause::matches`] for the
//! in-memory one).

use chrono::NaiveDate;

use crate::models::Course;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub title: Option<String>,
    pub priority_level: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub include_archived: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    ArchivedIs(bool),
    CompletedIs(bool),
    /// Case-insensitive literal substring. The needle is stored folded with [`fold_title`].
    TitleContains(String),
    PriorityLevelIs(String),
    TargetDateIs(NaiveDate),
    /// Half-open range `[from, until)`. Records without a date never match.
    CompletedDateBetween { from: NaiveDate, until: NaiveDate },
}

impl Clause {
    pub fn matches(&self, course: &Course) -> bool {
        match self {
            Clause::ArchivedIs(archived) => course.archived == *archived,
            Clause::CompletedIs(completed) => course.completed == *completed,
            Clause::TitleContains(needle) => fold_title(&course.title).contains(needle.as_str()),
            Clause::PriorityLevelIs(level) => course.priority_level == *level,
            Clause::TargetDateIs(date) => course.target_date == Some(*date),
            Clause::CompletedDateBetween { from, until } => course
                .completed_date
                .is_some_and(|date| date >= *from && date < *until),
        }
    }
}

/// Conjunction of clauses. An empty query matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseQuery {
    clauses: Vec<Clause>,
}

impl CourseQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn matches(&self, course: &Course) -> bool {
        self.clauses.iter().all(|clause| clause.matches(course))
    }
}

/// The single case-folding rule for title matching. Every store compares
/// folded titles against folded needles.
pub fn fold_title(title: &str) -> String {
    title.to_lowercase()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

pub fn build_query(filter: &CourseFilter) -> CourseQuery {
    let mut query = CourseQuery::all();

    if !filter.include_archived {
        query = query.and(Clause::ArchivedIs(false));
    }
    if let Some(title) = non_blank(&filter.title) {
        query = query.and(Clause::TitleContains(fold_title(title)));
    }
    if let Some(level) = non_blank(&filter.priority_level) {
        query = query.and(Clause::PriorityLevelIs(level.to_string()));
    }
    if let Some(date) = filter.target_date {
        query = query.and(Clause::TargetDateIs(date));
    }

    query
}

/// Completed courses whose completion date falls in `[from, until)`.
pub fn completed_between(from: NaiveDate, until: NaiveDate, include_archived: bool) -> CourseQuery {
    let mut query = CourseQuery::all();
    if !include_archived {
        query = query.and(Clause::ArchivedIs(false));
    }
    query
        .and(Clause::CompletedIs(true))
        .and(Clause::CompletedDateBetween { from, until })
}

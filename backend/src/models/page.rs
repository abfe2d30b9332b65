use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AppError;
use crate::models::Course;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Summary,
    Category,
    Level,
    Duration,
    Subject,
    TargetDate,
    PriorityLevel,
    Completed,
    CompletedDate,
    Archived,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Summary => "summary",
            SortField::Category => "category",
            SortField::Level => "level",
            SortField::Duration => "duration",
            SortField::Subject => "subject",
            SortField::TargetDate => "target_date",
            SortField::PriorityLevel => "priority_level",
            SortField::Completed => "completed",
            SortField::CompletedDate => "completed_date",
            SortField::Archived => "archived",
        }
    }

    /// Ordering used by stores that sort in process. Absent dates sort first,
    /// like NULLs in SQLite.
    pub fn compare(self, a: &Course, b: &Course) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Summary => a.summary.cmp(&b.summary),
            SortField::Category => a.category.cmp(&b.category),
            SortField::Level => a.level.cmp(&b.level),
            SortField::Duration => a.duration.cmp(&b.duration),
            SortField::Subject => a.subject.cmp(&b.subject),
            SortField::TargetDate => a.target_date.cmp(&b.target_date),
            SortField::PriorityLevel => a.priority_level.cmp(&b.priority_level),
            SortField::Completed => a.completed.cmp(&b.completed),
            SortField::CompletedDate => a.completed_date.cmp(&b.completed_date),
            SortField::Archived => a.archived.cmp(&b.archived),
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim() {
            "id" => SortField::Id,
            "title" => SortField::Title,
            "summary" => SortField::Summary,
            "category" => SortField::Category,
            "level" => SortField::Level,
            "duration" => SortField::Duration,
            "subject" => SortField::Subject,
            "targetDate" | "target_date" => SortField::TargetDate,
            "priorityLevel" | "priority_level" => SortField::PriorityLevel,
            "completed" => SortField::Completed,
            "completedDate" | "completed_date" => SortField::CompletedDate,
            "archived" => SortField::Archived,
            other => {
                return Err(AppError::InvalidArgument(format!(
                    "unknown sort field: {}",
                    other
                )));
            }
        };
        Ok(field)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(AppError::InvalidArgument(format!(
                "invalid sort direction: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::Title,
            direction: SortDirection::Asc,
        }
    }
}

impl Sort {
    /// Parses `field` or `field,direction`.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let mut parts = raw.splitn(2, ',');
        let field = parts.next().unwrap_or_default().parse()?;
        let direction = match parts.next() {
            Some(dir) => dir.parse()?,
            None => SortDirection::default(),
        };
        Ok(Self { field, direction })
    }

    /// Compares by the sort field, then by id so that paging is stable.
    pub fn compare(&self, a: &Course, b: &Course) -> Ordering {
        let primary = self.field.compare(a, b);
        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// A 0-based page of `size` records under a sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl PageRequest {
    pub fn new(page: u32, size: u32, sort: Sort) -> Result<Self, AppError> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(AppError::InvalidArgument(format!(
                "page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(Self { page, size, sort })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Sort::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePage {
    pub content: Vec<Course>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
    pub size: u32,
}

impl CoursePage {
    pub fn new(content: Vec<Course>, total_elements: u64, request: &PageRequest) -> Self {
        let size = u64::from(request.size.max(1));
        Self {
            content,
            total_elements,
            total_pages: total_elements.div_ceil(size),
            number: request.page,
            size: request.size,
        }
    }
}

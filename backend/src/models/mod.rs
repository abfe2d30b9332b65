pub mod course;
pub mod page;

pub use course::{Course, CourseFields, WeeklyCompletion};
pub use page::{
    CoursePage, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest, Sort, SortDirection, SortField,
};

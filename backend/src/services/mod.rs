pub mod course_service;

pub use course_service::{Clock, CourseService, local_clock};

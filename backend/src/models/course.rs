use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Course {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub level: String,
    pub duration: String,
    /// Instructional steps or resource references, in order.
    pub content: Vec<String>,
    pub subject: String,
    pub target_date: Option<NaiveDate>,
    pub priority_level: String,
    /// URLs or file identifiers.
    pub materials: Vec<String>,
    pub completed: bool,
    pub completed_date: Option<NaiveDate>,
    pub archived: bool,
}

/// Body of an update request.
///
/// Only the content fields are replaced. `archived`, `completed` and
/// `completedDate` are not part of this type, so they are dropped if a client
/// sends them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseFields {
    pub title: String,
    pub summary: String,
    pub category: String,
    pub level: String,
    pub duration: String,
    pub content: Vec<String>,
    pub subject: String,
    pub target_date: Option<NaiveDate>,
    pub priority_level: String,
    pub materials: Vec<String>,
}

impl CourseFields {
    /// Full replace: omitted fields overwrite with their empty value.
    pub fn apply_to(self, course: &mut Course) {
        course.title = self.title;
        course.summary = self.summary;
        course.category = self.category;
        course.level = self.level;
        course.duration = self.duration;
        course.content = self.content;
        course.subject = self.subject;
        course.target_date = self.target_date;
        course.priority_level = self.priority_level;
        course.materials = self.materials;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyCompletion {
    pub week_start: NaiveDate,
    pub count: u64,
}

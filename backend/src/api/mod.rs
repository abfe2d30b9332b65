use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, Request};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::patch;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;

use crate::error::AppError;
use crate::models::*;
use crate::query::CourseFilter;
use crate::state::AppState;

pub const DEFAULT_SUMMARY_WEEKS: u32 = 6;
pub const MAX_SUMMARY_WEEKS: u32 = 52;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    title: Option<String>,
    priority_level: Option<String>,
    target_date: Option<String>,
    #[serde(default)]
    include_archived: bool,
    page: Option<i64>,
    size: Option<i64>,
    sort: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompleteParams {
    #[serde(default = "default_completed")]
    completed: bool,
}

fn default_completed() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryParams {
    weeks: Option<i64>,
    #[serde(default)]
    include_archived: bool,
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/courses", get(list_courses).post(create_course))
        .route(
            "/api/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/api/courses/{id}/archive", patch(archive_course))
        .route("/api/courses/{id}/complete", patch(complete_course))
        .route("/api/stats/weekly-completions", get(weekly_completions))
        .layer(ServiceBuilder::new().layer(middleware::from_fn(cors)))
        .with_state(state)
}

/// Allows any origin; the web client is served separately.
async fn cors(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        allow_any_origin(response.headers_mut());
        return response;
    }

    let mut response = next.run(req).await;
    allow_any_origin(response.headers_mut());
    response
}

fn allow_any_origin(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, PATCH, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
}

/// Malformed query strings become `InvalidArgument` so they get the JSON error body.
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(params)| params)
        .map_err(|err| AppError::InvalidArgument(err.body_text()))
}

fn parse_date(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::InvalidArgument(format!("{} must be YYYY-MM-DD: {}", name, s))),
        None => Ok(None),
    }
}

fn parse_u32(name: &str, raw: Option<i64>, default: u32) -> Result<u32, AppError> {
    match raw {
        Some(n) => u32::try_from(n)
            .map_err(|_| AppError::InvalidArgument(format!("{} out of range: {}", name, n))),
        None => Ok(default),
    }
}

impl ListParams {
    fn into_request(self) -> Result<(CourseFilter, PageRequest), AppError> {
        let filter = CourseFilter {
            target_date: parse_date("targetDate", self.target_date.as_deref())?,
            title: self.title,
            priority_level: self.priority_level,
            include_archived: self.include_archived,
        };

        let sort = match self.sort.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Sort::parse(raw)?,
            _ => Sort::default(),
        };
        let page = PageRequest::new(
            parse_u32("page", self.page, 0)?,
            parse_u32("size", self.size, DEFAULT_PAGE_SIZE)?,
            sort,
        )?;

        Ok((filter, page))
    }
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.courses().ping().await?;
    Ok(StatusCode::OK)
}

async fn list_courses(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<CoursePage>, AppError> {
    let (filter, page) = query_params(params)?.into_request()?;
    let courses = state.courses().list(&filter, &page).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<Course>,
) -> Result<Json<Course>, AppError> {
    let course = state.courses().create(req).await?;
    Ok(Json(course))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = state.courses().get_by_id(&id).await?;
    Ok(Json(course))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CourseFields>,
) -> Result<Json<Course>, AppError> {
    let course = state.courses().update(&id, req).await?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.courses().delete(&id).await?;
    Ok(Json(DeleteResponse {
        message: "Course deleted permanently".to_string(),
    }))
}

async fn archive_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = state.courses().archive(&id).await?;
    Ok(Json(course))
}

async fn complete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<CompleteParams>, QueryRejection>,
) -> Result<Json<Course>, AppError> {
    let params = query_params(params)?;
    let course = state.courses().set_completed(&id, params.completed).await?;
    Ok(Json(course))
}

async fn weekly_completions(
    State(state): State<AppState>,
    params: Result<Query<SummaryParams>, QueryRejection>,
) -> Result<Json<Vec<WeeklyCompletion>>, AppError> {
    let params = query_params(params)?;
    let weeks = parse_u32("weeks", params.weeks, DEFAULT_SUMMARY_WEEKS)?;
    if weeks == 0 || weeks > MAX_SUMMARY_WEEKS {
        return Err(AppError::InvalidArgument(format!(
            "weeks must be between 1 and {}",
            MAX_SUMMARY_WEEKS
        )));
    }

    let summary = state
        .courses()
        .weekly_completions(weeks, params.include_archived)
        .await?;
    Ok(Json(summary))
}

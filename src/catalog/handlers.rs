use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::repo::{Assessment, Course};
use crate::{error::ApiError, state::AppState};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/courses", get(list_courses))
        .route("/api/assessments", get(list_assessments))
}

#[instrument(skip(state))]
pub async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = state
        .catalog
        .list_courses()
        .await
        .map_err(|e| ApiError::dependency("Failed to fetch courses", e))?;
    Ok(Json(courses))
}

#[instrument(skip(state))]
pub async fn list_assessments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Assessment>>, ApiError> {
    let assessments = state
        .catalog
        .list_assessments()
        .await
        .map_err(|e| ApiError::dependency("Failed to fetch assessments", e))?;
    Ok(Json(assessments))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, http::StatusCode};
    use time::macros::datetime;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{
        app::build_app,
        catalog::memory::{BrokenCatalogStore, MemoryCatalogStore},
        users::repo::memory::MemoryUserStore,
    };

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
        let res = build_app(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn seeded() -> AppState {
        let catalog = MemoryCatalogStore {
            courses: vec![Course {
                id: Uuid::new_v4(),
                name: "Rust 101".into(),
                description: Some("Ownership and borrowing".into()),
                difficulty: None,
            }],
            assessments: vec![Assessment {
                id: Uuid::new_v4(),
                title: "Midterm".into(),
                description: None,
                date: datetime!(2025-03-01 09:00 UTC),
            }],
        };
        AppState::fake_with(Arc::new(MemoryUserStore::default()), Arc::new(catalog))
    }

    #[tokio::test]
    async fn lists_courses() {
        let (status, json) = get_json(seeded(), "/api/courses").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["name"], "Rust 101");
        assert!(json[0]["difficulty"].is_null());
    }

    #[tokio::test]
    async fn lists_assessments_with_rfc3339_dates() {
        let (status, json) = get_json(seeded(), "/api/assessments").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["title"], "Midterm");
        assert_eq!(json[0]["date"], "2025-03-01T09:00:00Z");
    }

    #[tokio::test]
    async fn empty_catalog_is_an_empty_array() {
        let (status, json) = get_json(AppState::fake(), "/api/courses").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
    }

    #[tokio::test]
    async fn store_failures_are_500_with_details() {
        let state = AppState::fake_with(
            Arc::new(MemoryUserStore::default()),
            Arc::new(BrokenCatalogStore),
        );
        let (status, json) = get_json(state.clone(), "/api/courses").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to fetch courses");
        assert_eq!(json["details"], "connection refused");

        let (status, json) = get_json(state, "/api/assessments").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to fetch assessments");
    }
}

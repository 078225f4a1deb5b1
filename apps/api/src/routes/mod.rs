pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::ranking::handlers as ranking;
use crate::state::AppState;
use crate::validation::handlers as validation;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Extraction validation
        .route("/api/v1/validate", post(validation::handle_validate))
        // Candidate scoring
        .route("/api/v1/candidates/analyze", post(analysis::handle_analyze))
        .route("/api/v1/candidates/rank", post(ranking::handle_rank))
        .route("/api/v1/candidates/compare", post(ranking::handle_compare))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(AppState::new(Config::default(), CancellationToken::new()))
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn jd() -> Value {
        json!({"job_title": "Backend Engineer", "required_skills": ["Rust"], "experience_years_min": 2})
    }

    fn resume(name: &str) -> Value {
        json!({
            "candidate_name": name,
            "skills": ["Rust"],
            "total_experience_years": 4,
            "experience": [{"company": "Acme", "title": "Engineer", "start_date": "2020-01", "is_current": true}]
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["service"], "screening-api");
    }

    #[tokio::test]
    async fn test_validate_uses_detected_preset() {
        let (status, body) = post_json(
            "/api/v1/validate",
            json!({
                "extraction": {
                    "detected_type": "invoice",
                    "fields": {"invoice_number": "INV-9", "vendor_name": "Acme"}
                }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_valid"], false);
        assert_eq!(body["fields_expected"], 8);
    }

    #[tokio::test]
    async fn test_validate_rejects_unknown_type() {
        let (status, body) = post_json(
            "/api/v1/validate",
            json!({"document_type": "receipt", "extraction": {"fields": {}}}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "SCHEMA_ERROR");
    }

    #[tokio::test]
    async fn test_analyze_returns_failure_as_data() {
        let (status, body) = post_json(
            "/api/v1/candidates/analyze",
            json!({"job_description": jd(), "file_name": "x.pdf", "resume": null}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "resume data is missing");
    }

    #[tokio::test]
    async fn test_rank_and_empty_batch() {
        let (status, body) = post_json(
            "/api/v1/candidates/rank",
            json!({
                "job_description": jd(),
                "resumes": [
                    {"file_name": "a.pdf", "resume": resume("Ana")},
                    {"file_name": "b.pdf", "resume": "garbled"}
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["rankings"].as_array().unwrap().len(), 1);
        assert_eq!(body["all_analyses"].as_object().unwrap().len(), 2);

        let (status, body) = post_json(
            "/api/v1/candidates/rank",
            json!({"job_description": jd(), "resumes": []}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BATCH_ERROR");
    }

    #[tokio::test]
    async fn test_compare_on_demand_and_incomparable() {
        let (status, body) = post_json(
            "/api/v1/candidates/compare",
            json!({"job_description": jd(), "resume_1": resume("Ana"), "resume_2": resume("Bo")}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["winner"], 1);

        let (status, body) = post_json(
            "/api/v1/candidates/compare",
            json!({
                "analysis_1": {"success": true, "file_name": "a.pdf", "overall_score": 70},
                "analysis_2": {"success": false, "file_name": "b.pdf", "error": "timeout"}
            }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INCOMPARABLE");
    }
}

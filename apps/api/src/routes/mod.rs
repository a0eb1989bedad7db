pub mod health;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/analyze-text", post(handlers::handle_analyze_text))
        .route("/analyze-pdf", post(handlers::handle_analyze_pdf))
        .layer(body_limit)
        .with_state(state)
}

/// CORS for the allowlisted front-end origins. Credentials are allowed, so
/// methods and headers mirror the preflight request instead of using `*`.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::analysis::analyzer::MISSING_TEXT_SUMMARY;
    use crate::analysis::tfidf::TfIdfScorer;
    use crate::config::Config;
    use crate::pdf::fixtures::pdf_with_pages;
    use crate::pdf::EXCERPT_CHARS;

    const BOUNDARY: &str = "X-RESUME-ANALYZER-BOUNDARY";

    fn test_config() -> Config {
        Config::from_lookup(|key| match key {
            "SCORER" => Some("tfidf".to_string()),
            "MAX_UPLOAD_BYTES" => Some("65536".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn app() -> Router {
        let config = test_config();
        let cors = cors_layer(&config.cors_allowed_origins).unwrap();
        let state = AppState {
            config,
            scorer: Arc::new(TfIdfScorer::new().unwrap()),
        };
        build_router(state).layer(cors)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn text_part(name: &str, value: &str) -> Vec<u8> {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .into_bytes()
    }

    fn file_part(name: &str, filename: &str, data: &[u8]) -> Vec<u8> {
        let mut part = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/pdf\r\n\r\n"
        )
        .into_bytes();
        part.extend_from_slice(data);
        part.extend_from_slice(b"\r\n");
        part
    }

    fn multipart_body(parts: Vec<Vec<u8>>) -> Vec<u8> {
        let mut body = parts.concat();
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/analyze-pdf")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_liveness_message() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Resume Analyzer API is running" })
        );
    }

    #[tokio::test]
    async fn test_health_reports_scorer() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["scorer"], "tfidf-cosine");
    }

    #[tokio::test]
    async fn test_analyze_text_returns_report() {
        let payload = json!({
            "resume_text": "Experienced Python developer with REST API design",
            "job_description": "Looking for a Python developer skilled in REST APIs and databases"
        });
        let response = app()
            .oneshot(
                Request::post("/analyze-text")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["match_score"].as_f64().unwrap() > 0.0);
        assert!(body["skills_present"]
            .as_array()
            .unwrap()
            .contains(&json!("python")));
        assert_eq!(body["model_name"], "tfidf-cosine");
        for key in ["summary", "skills_missing", "jd_keywords"] {
            assert!(body.get(key).is_some(), "missing {key}");
        }
    }

    #[tokio::test]
    async fn test_analyze_text_empty_resume_gives_missing_text_report() {
        let payload = json!({ "resume_text": "", "job_description": "Need a data scientist" });
        let response = app()
            .oneshot(
                Request::post("/analyze-text")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["match_score"], 0.0);
        assert_eq!(body["summary"], MISSING_TEXT_SUMMARY);
        assert_eq!(body["jd_keywords"], json!([]));
    }

    #[tokio::test]
    async fn test_analyze_text_rejects_missing_field() {
        let response = app()
            .oneshot(
                Request::post("/analyze-text")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "resume_text": "x" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_analyze_pdf_requires_file() {
        let body = multipart_body(vec![text_part("job_description", "Rust engineer")]);
        let response = app().oneshot(multipart_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_analyze_pdf_requires_job_description() {
        let body = multipart_body(vec![file_part("file", "resume.pdf", b"%PDF-1.4")]);
        let response = app().oneshot(multipart_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("job_description"));
    }

    #[tokio::test]
    async fn test_analyze_pdf_rejects_non_pdf_upload() {
        let body = multipart_body(vec![
            file_part("file", "resume.pdf", b"plain text, not a pdf"),
            text_part("job_description", "Rust engineer"),
        ]);
        let response = app().oneshot(multipart_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_analyze_pdf_returns_excerpt_and_flat_report() {
        let long_page = "Rust services backed by Postgres on Kubernetes. ".repeat(15);
        let pdf = pdf_with_pages(&["Kafka platform engineer", long_page.as_str()]);
        let body = multipart_body(vec![
            file_part("file", "resume.pdf", &pdf),
            text_part(
                "job_description",
                "Kafka engineer to build Rust services on Postgres",
            ),
        ]);
        let response = app().oneshot(multipart_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;

        let excerpt = body["resume_text_excerpt"].as_str().unwrap();
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS);
        assert!(excerpt.contains("Kafka"));

        assert!(body.get("report").is_none());
        assert!(body["match_score"].as_f64().unwrap() > 0.0);
        assert_eq!(body["model_name"], "tfidf-cosine");
        let present = body["skills_present"].as_array().unwrap();
        assert!(present.contains(&json!("kafka")));
        assert!(present.contains(&json!("postgres")));
        for key in ["summary", "skills_missing", "jd_keywords"] {
            assert!(body.get(key).is_some(), "missing {key}");
        }
    }

    #[tokio::test]
    async fn test_analyze_pdf_enforces_upload_limit() {
        let oversized = vec![b'x'; 128 * 1024];
        let body = multipart_body(vec![
            file_part("file", "resume.pdf", &oversized),
            text_part("job_description", "Rust engineer"),
        ]);
        let response = app().oneshot(multipart_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_listed_origin() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/analyze-text")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_cors_ignores_unlisted_origin() {
        let response = app()
            .oneshot(
                Request::get("/")
                    .header(header::ORIGIN, "https://evil.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }
}

mod forecast;
mod news;
mod posts;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use trendvision_core::PostRecord;
use trendvision_ingest::NewsClient;
use trendvision_store::{ForecastFile, PostStore};

use crate::middleware::{request_id, RequestId};

/// Read-only handles on the data directory plus the news client.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostStore>,
    pub forecast: Arc<ForecastFile>,
    pub news: Arc<NewsClient>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    posts_file: bool,
    forecast_file: bool,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(50).clamp(1, 500)
}

/// Load every post record; an absent store yields no records.
///
/// File reads run on the blocking pool.
pub(super) async fn load_records(
    state: &AppState,
    request_id: &str,
) -> Result<Vec<PostRecord>, ApiError> {
    let store = Arc::clone(&state.posts);
    tokio::task::spawn_blocking(move || store.load_or_empty())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "store read task failed");
            ApiError::new(request_id, "internal_error", "store read failed")
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "store read failed");
            ApiError::new(request_id, "internal_error", "store read failed")
        })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/overview", get(posts::get_overview))
        .route("/api/v1/keywords", get(posts::list_keywords))
        .route("/api/v1/keywords/compare", get(posts::compare_keywords))
        .route("/api/v1/posts", get(posts::list_posts))
        .route(
            "/api/v1/sentiment/histogram",
            get(posts::sentiment_histogram),
        )
        .route("/api/v1/groups", get(posts::list_groups))
        .route("/api/v1/forecast", get(forecast::list_forecast))
        .route("/api/v1/news", get(news::list_news))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse::new(
        HealthData {
            status: "ok",
            posts_file: state.posts.exists(),
            forecast_file: state.forecast.path().is_file(),
        },
        req_id.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn state_in(dir: &std::path::Path) -> AppState {
        state_with_news(dir, "http://127.0.0.1:9")
    }

    fn state_with_news(dir: &std::path::Path, news_base: &str) -> AppState {
        AppState {
            posts: Arc::new(PostStore::new(dir.join("reddit_posts.csv"))),
            forecast: Arc::new(ForecastFile::new(dir.join("forecast.csv"))),
            news: Arc::new(NewsClient::with_base_url(5, news_base).expect("client")),
        }
    }

    fn enriched(id: &str, created_at: i64, group: &str, keyword: &str, sentiment: f64) -> PostRecord {
        PostRecord {
            id: id.to_string(),
            title: format!("post {id}"),
            selftext: String::new(),
            author: format!("author_{id}"),
            url: format!("https://example.com/{id}"),
            source_group: group.to_string(),
            score: 10,
            num_comments: 2,
            created_at,
            keyword: Some(keyword.to_string()),
            sentiment: Some(sentiment),
        }
    }

    fn seed_store(dir: &std::path::Path) {
        PostStore::new(dir.join("reddit_posts.csv"))
            .save(&[
                enriched("a", 1_704_067_200, "rust", "rust", 0.5),
                enriched("b", 1_704_157_200, "programming", "rust", -0.5),
                enriched("c", 1_704_153_600, "hardware", "gpu", 1.0),
            ])
            .expect("seed store");
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&body).expect("json parse"))
    }

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(10_000)), 500);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_codes_map_to_statuses() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = ApiError::new("req-1", "upstream_error", "feed down").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let response = ApiError::new("req-1", "internal_error", "boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_reports_missing_files_and_echoes_request_id() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_app(state_in(dir.path()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-request-id").unwrap(),
            "req-42"
        );
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["posts_file"], false);
        assert_eq!(json["data"]["forecast_file"], false);
        assert_eq!(json["meta"]["request_id"], "req-42");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let response = build_app(state_in(dir.path()))
            .oneshot(
                Request::builder()
                    .uri("/api/v1/nope")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_data_dir_serves_empty_views() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_app(state_in(dir.path()));

        let (status, json) = get_json(app.clone(), "/api/v1/overview").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["total_posts"], 0);
        assert_eq!(json["data"]["top_keyword"], "N/A");

        let (_, json) = get_json(app.clone(), "/api/v1/keywords").await;
        assert_eq!(json["data"], serde_json::json!([]));

        let (_, json) = get_json(app.clone(), "/api/v1/forecast").await;
        assert_eq!(json["data"], serde_json::json!([]));

        let (status, json) = get_json(app, "/api/v1/news").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["data"]["keyword"].is_null());
        assert_eq!(json["data"]["items"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn seeded_store_drives_keyword_and_post_views() {
        let dir = tempfile::tempdir().unwrap();
        seed_store(dir.path());
        let app = build_app(state_in(dir.path()));

        let (_, json) = get_json(app.clone(), "/api/v1/keywords?limit=1").await;
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"][0]["keyword"], "rust");
        assert_eq!(json["data"][0]["count"], 2);

        let (_, json) = get_json(app.clone(), "/api/v1/posts?keyword=RUST&limit=1").await;
        let posts = json["data"].as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["id"], "b");
        assert_eq!(posts[0]["date"], "2024-01-02");

        let (_, json) = get_json(app.clone(), "/api/v1/sentiment/histogram?bins=4").await;
        let counts: Vec<u64> = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|bin| bin["count"].as_u64().unwrap())
            .collect();
        assert_eq!(counts, vec![0, 1, 0, 2]);

        let (_, json) = get_json(app.clone(), "/api/v1/groups?by=keyword").await;
        let groups: Vec<&str> = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["group"].as_str().unwrap())
            .collect();
        assert_eq!(groups, vec!["gpu", "rust"]);

        let (status, json) = get_json(app, "/api/v1/keywords/compare?a=rust&b=gpu").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
        assert_eq!(json["data"][0]["keyword"], "rust");
    }

    #[tokio::test]
    async fn invalid_query_parameters_are_validation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_app(state_in(dir.path()));

        let (status, json) = get_json(app.clone(), "/api/v1/groups?by=colour").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");

        let (status, json) = get_json(app, "/api/v1/keywords/compare?a=rust").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn forecast_endpoint_reads_written_rows() {
        let dir = tempfile::tempdir().unwrap();
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        ForecastFile::new(dir.path().join("forecast.csv"))
            .write(&[trendvision_core::ForecastPoint {
                date,
                predicted_count: 4.5,
            }])
            .unwrap();

        let (status, json) = get_json(build_app(state_in(dir.path())), "/api/v1/forecast").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"][0]["date"], "2024-01-03");
        assert_eq!(json["data"][0]["predicted_count"], 4.5);
    }

    #[tokio::test]
    async fn news_defaults_to_top_keyword_and_maps_feed_failure() {
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let rss = r#"<?xml version="1.0"?><rss><channel>
            <item><title>Rust 2.0 announced</title><link>https://news.example/rust</link>
            <source url="https://news.example">Example News</source></item>
            </channel></rss>"#;
        Mock::given(method("GET"))
            .and(path("/rss/search"))
            .and(query_param("q", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_string(rss))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rss/search"))
            .and(query_param("q", "gpu"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        seed_store(dir.path());
        let app = build_app(state_with_news(dir.path(), &server.uri()));

        let (status, json) = get_json(app.clone(), "/api/v1/news").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["keyword"], "rust");
        assert_eq!(json["data"]["items"][0]["title"], "Rust 2.0 announced");

        let (status, json) = get_json(app, "/api/v1/news?keyword=gpu").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "upstream_error");
    }
}

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trendvision_analytics::{
    GroupKey, GroupStats, KeywordCount, KeywordDailyCount, Overview, SentimentBin,
};
use trendvision_core::PostRecord;

use crate::middleware::RequestId;

use super::{load_records, normalize_limit, ApiError, ApiResponse, AppState};

const DEFAULT_HISTOGRAM_BINS: usize = 30;
const MAX_HISTOGRAM_BINS: usize = 200;

#[derive(Debug, Serialize)]
pub(super) struct PostItem {
    pub id: String,
    pub date: NaiveDate,
    pub title: String,
    pub url: String,
    pub author: String,
    pub source_group: String,
    pub keyword: Option<String>,
    pub score: i64,
    pub num_comments: u64,
    pub sentiment: Option<f64>,
}

impl From<&PostRecord> for PostItem {
    fn from(record: &PostRecord) -> Self {
        Self {
            id: record.id.clone(),
            date: record.date(),
            title: record.title.clone(),
            url: record.url.clone(),
            author: record.author.clone(),
            source_group: record.source_group.clone(),
            keyword: record.keyword.clone(),
            score: record.score,
            num_comments: record.num_comments,
            sentiment: record.sentiment,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PostsQuery {
    pub keyword: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompareQuery {
    pub a: Option<String>,
    pub b: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct HistogramQuery {
    pub bins: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GroupsQuery {
    pub by: Option<String>,
}

pub(super) async fn get_overview(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Overview>>, ApiError> {
    let records = load_records(&state, &req_id.0).await?;
    Ok(Json(ApiResponse::new(
        trendvision_analytics::overview(&records),
        req_id.0,
    )))
}

pub(super) async fn list_keywords(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<KeywordCount>>>, ApiError> {
    let records = load_records(&state, &req_id.0).await?;
    let data = trendvision_analytics::top_keywords(&records, normalize_limit(query.limit));
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn compare_keywords(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ApiResponse<Vec<KeywordDailyCount>>>, ApiError> {
    let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let (Some(a), Some(b)) = (non_blank(query.a), non_blank(query.b)) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "query parameters 'a' and 'b' are required",
        ));
    };

    let records = load_records(&state, &req_id.0).await?;
    let data = trendvision_analytics::compare_keywords(&records, &a, &b);
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn list_posts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PostsQuery>,
) -> Result<Json<ApiResponse<Vec<PostItem>>>, ApiError> {
    let records = load_records(&state, &req_id.0).await?;
    let keyword = query.keyword.as_deref().filter(|k| !k.trim().is_empty());
    let data = trendvision_analytics::posts_with_keyword(
        &records,
        keyword,
        normalize_limit(query.limit),
    )
    .into_iter()
    .map(PostItem::from)
    .collect();
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn sentiment_histogram(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<HistogramQuery>,
) -> Result<Json<ApiResponse<Vec<SentimentBin>>>, ApiError> {
    let bins = query
        .bins
        .unwrap_or(DEFAULT_HISTOGRAM_BINS)
        .clamp(1, MAX_HISTOGRAM_BINS);
    let records = load_records(&state, &req_id.0).await?;
    let data = trendvision_analytics::sentiment_histogram(&records, bins);
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn list_groups(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GroupsQuery>,
) -> Result<Json<ApiResponse<Vec<GroupStats>>>, ApiError> {
    let key = match query.by.as_deref() {
        None => GroupKey::default(),
        Some(raw) => raw
            .parse::<GroupKey>()
            .map_err(|reason| ApiError::new(req_id.0.clone(), "validation_error", reason))?,
    };
    let records = load_records(&state, &req_id.0).await?;
    let data = trendvision_analytics::group_stats(&records, key);
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use trendvision_ingest::NewsItem;

use crate::middleware::RequestId;

use super::{load_records, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct NewsQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct NewsData {
    /// Keyword searched, or `None` when no keyword was given and the store
    /// has none.
    pub keyword: Option<String>,
    pub items: Vec<NewsItem>,
}

pub(super) async fn list_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<ApiResponse<NewsData>>, ApiError> {
    let keyword = match query
        .keyword
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
    {
        Some(k) => Some(k),
        None => {
            let records = load_records(&state, &req_id.0).await?;
            trendvision_analytics::top_keyword(&records)
        }
    };

    let Some(keyword) = keyword else {
        return Ok(Json(ApiResponse::new(
            NewsData {
                keyword: None,
                items: Vec::new(),
            },
            req_id.0,
        )));
    };

    let items = state.news.headlines(&keyword).await.map_err(|e| {
        tracing::warn!(error = %e, keyword, "news fetch failed");
        ApiError::new(req_id.0.clone(), "upstream_error", "news feed unavailable")
    })?;

    Ok(Json(ApiResponse::new(
        NewsData {
            keyword: Some(keyword),
            items,
        },
        req_id.0,
    )))
}

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::scraping::similar::{search_query, similar_offer_links, OfferLink};
use crate::scraping::{scrape_job_posting, ScrapeResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: String,
}

/// POST /api/v1/jobs/scrape
///
/// Always answers 200: failures come back as `{"error": message}`.
pub async fn handle_scrape(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Json<ScrapeResponse> {
    match scrape_job_posting(&request.url, state.fetcher.as_ref()).await {
        Ok(posting) => Json(ScrapeResponse::Posting(posting)),
        Err(e) => {
            warn!("Scrape of '{}' failed: {e}", request.url);
            Json(ScrapeResponse::Failed {
                error: e.to_string(),
            })
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SimilarOffersQuery {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct SimilarOffersResponse {
    pub query: String,
    pub links: Vec<OfferLink>,
}

/// GET /api/v1/jobs/similar?title=...
pub async fn handle_similar_offers(
    Query(params): Query<SimilarOffersQuery>,
) -> Json<SimilarOffersResponse> {
    Json(SimilarOffersResponse {
        query: search_query(&params.title),
        links: similar_offer_links(&params.title),
    })
}

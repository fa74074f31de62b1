//! Paged relevance search.

use tracing::instrument;

use crate::errors::ApiError;
use user_search_repository::SearchEngineClient;
use user_search_shared::{SearchPage, SearchQuery};

/// Run one page of a search.
///
/// An empty or absent `query` matches every record; other text is sent
/// to the engine untrimmed. `page` is 1-based; a page past the
/// end yields no results with the total unchanged. The total is whatever the
/// engine reports and may be a lower bound for large result sets.
#[instrument(skip(client))]
pub async fn search_users(
    client: &dyn SearchEngineClient,
    index: &str,
    query: Option<&str>,
    page: i64,
) -> Result<SearchPage, ApiError> {
    if page < 1 {
        return Err(ApiError::invalid_request(format!(
            "page must be at least 1, got {}",
            page
        )));
    }
    let page = u32::try_from(page)
        .map_err(|_| ApiError::invalid_request(format!("page {} is out of range", page)))?;

    let query = SearchQuery::new(query, page);
    Ok(client.search(index, &query).await?)
}

//! # User Search Shared
//!
//! Types shared by the ingestion pipeline, the engine clients and the HTTP
//! service: the stored [`UserRecord`] and the paginated search contract.

mod query;
mod record;

pub use query::{RecordFilter, SearchPage, SearchQuery, SEARCH_PAGE_SIZE};
pub use record::UserRecord;

//! Document search and indexing.

use super::AzureSearchClient;
use crate::error::AzureResult;
use crate::http::HttpBackend;
use crate::models::{IndexBatchBody, IndexBatchResponseBody, SearchBody, SearchResponseBody};
use crate::url::{build_batch_url, build_search_url};

impl<B: HttpBackend> AzureSearchClient<B> {
    /// Run a search against the index.
    pub(crate) async fn search_documents(
        &self,
        query: &SearchBody,
    ) -> AzureResult<SearchResponseBody> {
        let url = build_search_url(&self.endpoint)?;
        let body = serde_json::to_value(query)?;
        self.backend.post_json(&url, &body).await
    }

    /// Submit an index batch.
    ///
    /// The service answers 207 when some actions failed; those come back as
    /// per-document results rather than an error.
    pub(crate) async fn index_documents(
        &self,
        batch: &IndexBatchBody<'_>,
    ) -> AzureResult<IndexBatchResponseBody> {
        let url = build_batch_url(&self.endpoint)?;
        let body = serde_json::to_value(batch)?;
        self.backend.post_json(&url, &body).await
    }
}

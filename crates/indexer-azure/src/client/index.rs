//! Index definition management.

use super::AzureSearchClient;
use crate::error::AzureResult;
use crate::http::HttpBackend;
use crate::models::IndexBody;
use crate::url::build_index_url;

impl<B: HttpBackend> AzureSearchClient<B> {
    /// Create the index, or update its definition if it exists.
    pub(crate) async fn put_index(&self, index: &IndexBody) -> AzureResult<()> {
        let url = build_index_url(&self.endpoint, &index.name)?;
        let body = serde_json::to_value(index)?;
        self.backend.put_json(&url, &body).await
    }
}

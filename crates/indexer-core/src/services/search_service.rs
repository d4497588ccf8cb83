//! Search service - maps document DTOs onto search index operations.

use std::sync::Arc;
use std::time::Instant;

use crate::domain::{
    DocumentIndexDto, DocumentModel, DocumentSearchResultDto, FilterDto, MATCH_ALL_QUERY,
    SearchResultDto, file_uri_for,
};
use crate::ports::{
    CoreError, CoreResult, IndexBatch, IndexDefinition, QueryType, SearchIndexPort, SearchMode,
    SearchRequest, SearchResponse,
};
use crate::settings::IndexerSettings;

use super::index_schema::{CONTENT_FIELD, KEY_FIELD, document_index_definition};

/// Maximum number of actions the search service accepts in one batch.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Page size used when collecting keys of a branch before deleting it.
const KEY_SCAN_PAGE_SIZE: u64 = 1000;

/// Largest `skip` the search service accepts.
const MAX_SKIP: u64 = 100_000;

/// Service for document indexing and search.
///
/// Thin orchestration over the injected `SearchIndexPort`: it builds the
/// index schema, scopes operations to a project branch and converts
/// results into client DTOs.
pub struct SearchService {
    index: Arc<dyn SearchIndexPort>,
    settings: IndexerSettings,
}

impl SearchService {
    /// Create a new search service.
    pub fn new(index: Arc<dyn SearchIndexPort>, settings: IndexerSettings) -> Self {
        Self { index, settings }
    }

    /// Settings this service was built with.
    pub const fn settings(&self) -> &IndexerSettings {
        &self.settings
    }

    /// Whether uploads and deletes reach the search service.
    pub fn is_search_index_enabled(&self) -> bool {
        self.settings.is_search_index_enabled()
    }

    /// The index schema for the configured index name.
    pub fn index_definition(&self) -> CoreResult<IndexDefinition> {
        let name = self
            .settings
            .index_name()
            .ok_or_else(|| CoreError::Configuration("AzureSearchIndexName is not set".to_string()))?;
        Ok(document_index_definition(name))
    }

    /// Create the document index, or update its schema.
    pub async fn create_or_update_index(&self) -> CoreResult<()> {
        let definition = self.index_definition()?;
        tracing::info!(
            target: "indexer.search",
            index = %definition.name,
            fields = definition.fields.len(),
            "Creating or updating search index"
        );
        self.index.create_or_update_index(&definition).await?;
        Ok(())
    }

    /// Upload (merge or insert) documents of a project branch.
    ///
    /// Does nothing when the search index is not configured. Documents
    /// without a project id or branch name inherit the ones from the route.
    /// Per-document failures reported by the search service are logged and
    /// otherwise ignored.
    pub async fn upload_documents(
        &self,
        project_id: &str,
        branch_name: &str,
        documents: Vec<DocumentIndexDto>,
    ) -> CoreResult<()> {
        if !self.is_search_index_enabled() {
            tracing::debug!(target: "indexer.search", "Search index disabled, skipping upload");
            return Ok(());
        }

        if let Some(position) = documents.iter().position(|d| d.id.trim().is_empty()) {
            return Err(CoreError::Validation(format!(
                "Document at position {position} has no id"
            )));
        }

        let models: Vec<DocumentModel> = documents
            .into_iter()
            .map(|mut dto| {
                if dto.project_id.trim().is_empty() {
                    dto.project_id = project_id.to_string();
                }
                if dto.branch_name.trim().is_empty() {
                    dto.branch_name = branch_name.to_string();
                }
                DocumentModel::from(dto)
            })
            .collect();

        tracing::info!(
            target: "indexer.search",
            project_id,
            branch_name,
            documents = models.len(),
            "Uploading documents"
        );

        for chunk in models.chunks(MAX_BATCH_SIZE) {
            self.submit(IndexBatch::merge_or_upload(chunk.iter().cloned()))
                .await?;
        }
        Ok(())
    }

    /// Delete every document of a project branch.
    ///
    /// Does nothing when the search index is not configured.
    pub async fn delete_documents(&self, project_id: &str, branch_name: &str) -> CoreResult<()> {
        if !self.is_search_index_enabled() {
            tracing::debug!(target: "indexer.search", "Search index disabled, skipping delete");
            return Ok(());
        }

        let keys = self
            .collect_keys(&branch_filter(project_id, branch_name))
            .await?;

        tracing::info!(
            target: "indexer.search",
            project_id,
            branch_name,
            documents = keys.len(),
            "Deleting documents"
        );

        for chunk in keys.chunks(MAX_BATCH_SIZE) {
            self.submit(IndexBatch::delete(chunk.iter().cloned())).await?;
        }
        Ok(())
    }

    /// Search across the whole index.
    pub async fn search(&self, filter: &FilterDto) -> CoreResult<DocumentSearchResultDto> {
        self.search_in_branch(filter, None, None).await
    }

    /// Search, restricted to a project branch when both ids are given.
    pub async fn search_in_branch(
        &self,
        filter: &FilterDto,
        project_id: Option<&str>,
        branch_name: Option<&str>,
    ) -> CoreResult<DocumentSearchResultDto> {
        if !self.is_search_index_enabled() {
            return Err(CoreError::Configuration(
                "Search index is not configured".to_string(),
            ));
        }

        let scope = match (non_blank(project_id), non_blank(branch_name)) {
            (Some(project), Some(branch)) => Some(branch_filter(project, branch)),
            _ => None,
        };

        let (skip, top) = filter.paging().unzip();
        let request = SearchRequest {
            search_text: filter.effective_query().to_string(),
            filter: scope,
            skip,
            top,
            highlight_fields: vec![CONTENT_FIELD.to_string()],
            select: Vec::new(),
            order_by: Vec::new(),
            query_type: QueryType::Full,
            search_mode: SearchMode::All,
            include_total_count: true,
        };

        let started = Instant::now();
        let response = self.index.search(&request).await?;
        let elapsed = started.elapsed();

        let mut result = to_result_dto(response);
        result.elapsed_milliseconds = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        tracing::debug!(
            target: "indexer.search",
            query = %request.search_text,
            results = result.results.len(),
            total = result.number_of_results,
            elapsed_ms = result.elapsed_milliseconds,
            "Search completed"
        );
        Ok(result)
    }

    /// Collect the keys of every document matching `filter`.
    ///
    /// Pages are ordered by key so that `skip` walks a stable sequence.
    async fn collect_keys(&self, filter: &str) -> CoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut skip = 0;

        loop {
            let request = SearchRequest {
                search_text: MATCH_ALL_QUERY.to_string(),
                filter: Some(filter.to_string()),
                skip: Some(skip),
                top: Some(KEY_SCAN_PAGE_SIZE),
                select: vec![KEY_FIELD.to_string()],
                order_by: vec![format!("{KEY_FIELD} asc")],
                ..SearchRequest::default()
            };

            let page = self.index.search(&request).await?;
            let fetched = page.results.len() as u64;
            keys.extend(page.results.into_iter().map(|hit| hit.document.id));

            if fetched < KEY_SCAN_PAGE_SIZE {
                break;
            }

            skip += KEY_SCAN_PAGE_SIZE;
            if skip > MAX_SKIP {
                tracing::warn!(
                    target: "indexer.search",
                    collected = keys.len(),
                    "Too many documents to collect in one pass, deleting the first {}",
                    keys.len()
                );
                break;
            }
        }

        Ok(keys)
    }

    /// Submit a batch and log any documents the service rejected.
    async fn submit(&self, batch: IndexBatch) -> CoreResult<()> {
        let results = self.index.index_batch(&batch).await?;

        let failed: Vec<&str> = results
            .iter()
            .filter(|r| !r.succeeded)
            .map(|r| r.key.as_str())
            .collect();

        if !failed.is_empty() {
            tracing::warn!(
                target: "indexer.search",
                failed = failed.len(),
                submitted = batch.len(),
                "Failed to index some of the documents: {}",
                failed.join(", ")
            );
        }
        Ok(())
    }
}

/// OData filter restricting results to one project branch.
pub fn branch_filter(project_id: &str, branch_name: &str) -> String {
    format!(
        "projectId eq '{}' and branchName eq '{}'",
        odata_literal(project_id),
        odata_literal(branch_name)
    )
}

/// Escape a value for use inside a single-quoted OData string literal.
fn odata_literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn to_result_dto(response: SearchResponse) -> DocumentSearchResultDto {
    let results = response
        .results
        .into_iter()
        .map(|hit| {
            let mut document = hit.document;
            document.file_uri = file_uri_for(&document.branch_name, &document.url);
            SearchResultDto {
                score: hit.score,
                highlights: hit.highlights,
                document,
            }
        })
        .collect();

    DocumentSearchResultDto {
        results,
        number_of_results: response.count.unwrap_or(0),
        elapsed_milliseconds: 0,
    }
}

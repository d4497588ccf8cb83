//! In-memory search index for tests.
//!
//! Implements [`SearchIndexPort`] over a `BTreeMap`, understands the
//! `field eq 'value' and ...` filters the service produces, and records
//! every call so tests can assert on the requests that were made.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{DocumentIndexDto, DocumentModel};
use crate::ports::{
    IndexAction, IndexBatch, IndexDefinition, IndexingResult, SearchHit, SearchIndexPort,
    SearchPortError, SearchPortResult, SearchRequest, SearchResponse,
};

/// Page size applied when a request has no `top`, like the hosted service.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

#[derive(Default)]
struct State {
    documents: BTreeMap<String, DocumentModel>,
    definitions: Vec<IndexDefinition>,
    searches: Vec<SearchRequest>,
    batches: Vec<IndexBatch>,
    failing_keys: HashSet<String>,
    next_error: Option<SearchPortError>,
}

/// A fake search index backed by memory.
#[derive(Default)]
pub struct InMemorySearchIndex {
    state: Mutex<State>,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the index with documents.
    #[must_use]
    pub fn with_documents(self, documents: impl IntoIterator<Item = DocumentModel>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for doc in documents {
                state.documents.insert(doc.id.clone(), doc);
            }
        }
        self
    }

    /// Report these keys as failed in every batch result.
    #[must_use]
    pub fn with_failing_keys(self, keys: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_keys
            .extend(keys.iter().map(|k| (*k).to_string()));
        self
    }

    /// Fail the next port call with `error`.
    pub fn fail_next(&self, error: SearchPortError) {
        self.state.lock().unwrap().next_error = Some(error);
    }

    pub fn document(&self, key: &str) -> Option<DocumentModel> {
        self.state.lock().unwrap().documents.get(key).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.state.lock().unwrap().documents.len()
    }

    pub fn definitions(&self) -> Vec<IndexDefinition> {
        self.state.lock().unwrap().definitions.clone()
    }

    pub fn searches(&self) -> Vec<SearchRequest> {
        self.state.lock().unwrap().searches.clone()
    }

    pub fn batches(&self) -> Vec<IndexBatch> {
        self.state.lock().unwrap().batches.clone()
    }

    fn take_error(state: &mut State) -> SearchPortResult<()> {
        state.next_error.take().map_or(Ok(()), Err)
    }
}

#[async_trait]
impl SearchIndexPort for InMemorySearchIndex {
    async fn create_or_update_index(&self, definition: &IndexDefinition) -> SearchPortResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::take_error(&mut state)?;
        state.definitions.push(definition.clone());
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> SearchPortResult<SearchResponse> {
        let mut state = self.state.lock().unwrap();
        Self::take_error(&mut state)?;
        state.searches.push(request.clone());

        let conditions = match request.filter.as_deref() {
            Some(filter) => parse_filter(filter)?,
            None => Vec::new(),
        };

        let text = request.search_text.trim().to_lowercase();
        let matches: Vec<&DocumentModel> = state
            .documents
            .values()
            .filter(|doc| conditions.iter().all(|(f, v)| field_value(doc, f) == Some(v)))
            .filter(|doc| {
                text == "*"
                    || text.is_empty()
                    || doc.content.to_lowercase().contains(&text)
                    || doc.title.to_lowercase().contains(&text)
            })
            .collect();

        let count = matches.len() as u64;
        let skip = usize::try_from(request.skip.unwrap_or(0)).unwrap_or(usize::MAX);
        let top = usize::try_from(request.top.unwrap_or(DEFAULT_PAGE_SIZE)).unwrap_or(usize::MAX);

        let results = matches
            .into_iter()
            .skip(skip)
            .take(top)
            .map(|doc| SearchHit {
                score: 1.0,
                highlights: highlight(doc, &text, &request.highlight_fields),
                document: DocumentIndexDto {
                    id: doc.id.clone(),
                    url: doc.url.clone(),
                    title: doc.title.clone(),
                    project_id: doc.project_id.clone(),
                    project_name: doc.project_name.clone(),
                    branch_name: doc.branch_name.clone(),
                    tags: doc.tags.clone(),
                    ..Default::default()
                },
            })
            .collect();

        Ok(SearchResponse {
            count: request.include_total_count.then_some(count),
            results,
        })
    }

    async fn index_batch(&self, batch: &IndexBatch) -> SearchPortResult<Vec<IndexingResult>> {
        let mut state = self.state.lock().unwrap();
        Self::take_error(&mut state)?;
        state.batches.push(batch.clone());

        let mut results = Vec::with_capacity(batch.len());
        for action in &batch.actions {
            let key = action.key().to_string();
            if state.failing_keys.contains(&key) {
                results.push(IndexingResult {
                    key,
                    succeeded: false,
                    status_code: 400,
                    error_message: Some("Document rejected".to_string()),
                });
                continue;
            }

            match action {
                IndexAction::MergeOrUpload(doc) => {
                    state.documents.insert(key.clone(), doc.clone());
                }
                IndexAction::Delete { .. } => {
                    state.documents.remove(&key);
                }
            }
            results.push(IndexingResult {
                key,
                succeeded: true,
                status_code: 200,
                error_message: None,
            });
        }
        Ok(results)
    }
}

fn field_value<'a>(doc: &'a DocumentModel, field: &str) -> Option<&'a String> {
    match field {
        "id" => Some(&doc.id),
        "url" => Some(&doc.url),
        "title" => Some(&doc.title),
        "projectId" => Some(&doc.project_id),
        "projectName" => Some(&doc.project_name),
        "branchName" => Some(&doc.branch_name),
        _ => None,
    }
}

/// Parse `field eq 'value' and field eq 'value'` into pairs.
fn parse_filter(filter: &str) -> SearchPortResult<Vec<(String, String)>> {
    let mut conditions = Vec::new();
    let mut rest = filter.trim();

    while !rest.is_empty() {
        let invalid = || SearchPortError::InvalidRequest {
            message: format!("Unsupported filter: {filter}"),
        };

        let (field, after_field) = rest.split_once(" eq '").ok_or_else(invalid)?;

        // Find the closing quote, skipping escaped ('') quotes.
        let bytes = after_field.as_bytes();
        let mut value = String::new();
        let mut i = 0;
        let end = loop {
            match bytes.get(i) {
                None => return Err(invalid()),
                Some(b'\'') if bytes.get(i + 1) == Some(&b'\'') => {
                    value.push('\'');
                    i += 2;
                }
                Some(b'\'') => break i,
                Some(_) => {
                    let ch = after_field[i..].chars().next().ok_or_else(invalid)?;
                    value.push(ch);
                    i += ch.len_utf8();
                }
            }
        };

        conditions.push((field.trim().to_string(), value));
        rest = after_field[end + 1..].trim_start();
        if let Some(next) = rest.strip_prefix("and ") {
            rest = next.trim_start();
        } else if !rest.is_empty() {
            return Err(invalid());
        }
    }

    Ok(conditions)
}

fn highlight(doc: &DocumentModel, text: &str, fields: &[String]) -> HashMap<String, Vec<String>> {
    let mut highlights = HashMap::new();
    if text == "*" || text.is_empty() {
        return highlights;
    }
    if fields.iter().any(|f| f == "content") && doc.content.to_lowercase().contains(text) {
        highlights.insert("content".to_string(), vec![format!("<em>{text}</em>")]);
    }
    highlights
}

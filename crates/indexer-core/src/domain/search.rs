//! Search request and result DTOs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::document::DocumentIndexDto;

/// Search text used when the client supplies none: match every document.
pub const MATCH_ALL_QUERY: &str = "*";

/// Query-string filter for search endpoints.
///
/// `limit == 0` disables paging and lets the search service apply its own
/// default page size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterDto {
    #[serde(alias = "Query")]
    pub query: Option<String>,
    #[serde(alias = "Page")]
    pub page: u32,
    #[serde(alias = "Limit")]
    pub limit: u32,
}

impl FilterDto {
    /// Create a filter for the given search text.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Set the page index and page size.
    #[must_use]
    pub const fn with_paging(mut self, page: u32, limit: u32) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    /// The search text to send, falling back to [`MATCH_ALL_QUERY`].
    pub fn effective_query(&self) -> &str {
        match self.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q,
            _ => MATCH_ALL_QUERY,
        }
    }

    /// `(skip, top)` for the request, or `None` when paging is disabled.
    pub fn paging(&self) -> Option<(u64, u64)> {
        if self.limit == 0 {
            return None;
        }
        let limit = u64::from(self.limit);
        Some((u64::from(self.page) * limit, limit))
    }
}

/// A single scored hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultDto<T> {
    pub score: f64,
    pub highlights: HashMap<String, Vec<String>>,
    pub document: T,
}

/// A page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSearchResultDto<T = DocumentIndexDto> {
    pub results: Vec<SearchResultDto<T>>,
    pub number_of_results: u64,
    pub elapsed_milliseconds: u64,
}

impl<T> Default for DocumentSearchResultDto<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            number_of_results: 0,
            elapsed_milliseconds: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_query_defaults_to_match_all() {
        assert_eq!(FilterDto::default().effective_query(), "*");
        assert_eq!(FilterDto::new("   ").effective_query(), "*");
        assert_eq!(FilterDto::new(" rust ").effective_query(), "rust");
    }

    #[test]
    fn test_paging_disabled_without_limit() {
        assert_eq!(FilterDto::new("x").with_paging(3, 0).paging(), None);
    }

    #[test]
    fn test_paging_computes_skip_and_top() {
        assert_eq!(FilterDto::new("x").with_paging(0, 10).paging(), Some((0, 10)));
        assert_eq!(FilterDto::new("x").with_paging(2, 25).paging(), Some((50, 25)));
        assert_eq!(
            FilterDto::new("x").with_paging(u32::MAX, u32::MAX).paging(),
            Some((u64::from(u32::MAX) * u64::from(u32::MAX), u64::from(u32::MAX)))
        );
    }

    #[test]
    fn test_filter_accepts_pascal_case_keys() {
        let filter: FilterDto =
            serde_json::from_str(r#"{"Query": "docs", "Page": 1, "Limit": 5}"#).unwrap();
        assert_eq!(filter, FilterDto::new("docs").with_paging(1, 5));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result: DocumentSearchResultDto = DocumentSearchResultDto {
            results: vec![SearchResultDto {
                score: 1.5,
                highlights: HashMap::from([("content".to_string(), vec!["<em>x</em>".to_string()])]),
                document: DocumentIndexDto::default(),
            }],
            number_of_results: 1,
            elapsed_milliseconds: 12,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["numberOfResults"], 1);
        assert_eq!(json["elapsedMilliseconds"], 12);
        assert_eq!(json["results"][0]["score"], 1.5);
        assert_eq!(json["results"][0]["highlights"]["content"][0], "<em>x</em>");
    }
}

//! Document types exchanged with clients and stored in the index.

use serde::{Deserialize, Serialize};

/// A document as submitted by clients and returned from searches.
///
/// Missing string fields deserialize as empty strings so that partially
/// populated hits (e.g. non-retrievable `content`) still map cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentIndexDto {
    pub id: String,
    pub url: String,
    pub title: String,
    pub project_id: String,
    pub project_name: String,
    pub branch_name: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Path of the document inside its branch. Only populated on search results.
    pub file_uri: String,
}

/// The exact shape of a document stored in the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentModel {
    pub id: String,
    pub url: String,
    pub title: String,
    pub project_id: String,
    pub project_name: String,
    pub branch_name: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl From<DocumentIndexDto> for DocumentModel {
    fn from(dto: DocumentIndexDto) -> Self {
        Self {
            id: dto.id,
            url: dto.url,
            title: dto.title,
            project_id: dto.project_id,
            project_name: dto.project_name,
            branch_name: dto.branch_name,
            content: dto.content,
            tags: dto.tags,
        }
    }
}

/// Strip the leading `"{branch}/"` segment from a document URL.
///
/// Document URLs are stored as `<branch>/<path>`. When the URL is not longer
/// than the prefix (or the cut would split a UTF-8 sequence) the URL is
/// returned as-is.
pub fn file_uri_for(branch_name: &str, url: &str) -> String {
    let prefix_len = branch_name.len() + 1;
    if url.len() <= prefix_len {
        return url.to_string();
    }
    url.get(prefix_len..).unwrap_or(url).to_string()
}

//! Search handlers - query, upload and delete documents of a project branch.
//!
//! Extractor rejections are turned into [`HttpError`] so that malformed
//! requests get the same JSON error body as every other failure.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use indexer_core::{DocumentIndexDto, DocumentSearchResultDto, FilterDto};
use serde::Deserialize;

use crate::error::HttpError;
use crate::state::AppState;

/// Path parameters naming a project branch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchPath {
    pub project_id: String,
    pub branch_name: String,
}

/// Search across every indexed document.
pub async fn search(
    State(state): State<AppState>,
    filter: Result<Query<FilterDto>, QueryRejection>,
) -> Result<Json<DocumentSearchResultDto>, HttpError> {
    let Query(filter) = filter?;
    Ok(Json(state.search.search(&filter).await?))
}

/// Search within one project branch.
pub async fn search_in_branch(
    State(state): State<AppState>,
    branch: Result<Path<BranchPath>, PathRejection>,
    filter: Result<Query<FilterDto>, QueryRejection>,
) -> Result<Json<DocumentSearchResultDto>, HttpError> {
    let Path(branch) = branch?;
    let Query(filter) = filter?;
    let result = state
        .search
        .search_in_branch(
            &filter,
            Some(&branch.project_id),
            Some(&branch.branch_name),
        )
        .await?;
    Ok(Json(result))
}

/// Upload documents of a project branch.
pub async fn upload(
    State(state): State<AppState>,
    branch: Result<Path<BranchPath>, PathRejection>,
    documents: Result<Json<Vec<DocumentIndexDto>>, JsonRejection>,
) -> Result<(), HttpError> {
    let Path(branch) = branch?;
    let Json(documents) = documents?;
    state
        .search
        .upload_documents(&branch.project_id, &branch.branch_name, documents)
        .await?;
    Ok(())
}

/// Delete every document of a project branch.
pub async fn delete(
    State(state): State<AppState>,
    branch: Result<Path<BranchPath>, PathRejection>,
) -> Result<(), HttpError> {
    let Path(branch) = branch?;
    state
        .search
        .delete_documents(&branch.project_id, &branch.branch_name)
        .await?;
    Ok(())
}

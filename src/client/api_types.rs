//! Request and response payloads for the backend's REST interface.

use serde::{Deserialize, Serialize};

use crate::models::{DocumentDetail, DocumentSummary, OcrResults};

/// Response from `POST /process_image`.
///
/// `json_data` is included by newer backend builds; older ones only return
/// the image paths and the result JSON has to be fetched separately.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessImageResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub original_path: Option<String>,
    #[serde(default)]
    pub output_image: Option<String>,
    #[serde(default)]
    pub json_data: Option<OcrResults>,
}

/// Response from `GET /find_json/{base_prefix}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FindJsonResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Backend's preferred candidate, when it could rank one.
    #[serde(default)]
    pub best_match: Option<String>,
    /// All filenames matching the prefix.
    #[serde(default)]
    pub matching_files: Vec<String>,
    /// Every known result file; diagnostic only.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Body for `POST /save_edits/{filename}`.
///
/// Both arrays are always present; a single-item save leaves the other
/// array empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveEditsRequest {
    pub cells_with_text: Vec<CellEdit>,
    pub unassigned_text: Vec<TextEdit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellEdit {
    pub cell_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub text_id: i64,
    pub text: String,
}

/// Body for `POST /save_results`.
#[derive(Debug, Clone, Serialize)]
pub struct SaveResultsRequest {
    pub document_name: String,
    pub original_image_path: String,
    pub output_image_path: String,
    pub json_data: OcrResults,
    /// Keys of the items edited during the session (`cell_3`, `text_5`).
    pub edited_items: Vec<String>,
}

/// Plain `{success, error?}` acknowledgment used by the save endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `GET /get_documents`.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentSummary>,
}

/// Response from `GET /get_document/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub document: Option<DocumentDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cell_edit_serializes_with_both_arrays() {
        let body = SaveEditsRequest {
            cells_with_text: vec![CellEdit {
                cell_id: 7,
                text: "Hello".to_string(),
            }],
            unassigned_text: vec![],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cells_with_text": [{"cell_id": 7, "text": "Hello"}],
                "unassigned_text": []
            })
        );
    }

    #[test]
    fn find_json_response_tolerates_missing_best_match() {
        let raw = r#"{"success": true, "matching_files": [], "files": ["a.json"]}"#;
        let parsed: FindJsonResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.success);
        assert!(parsed.best_match.is_none());
        assert!(parsed.matching_files.is_empty());
        assert_eq!(parsed.files, vec!["a.json".to_string()]);
    }
}

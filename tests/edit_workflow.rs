//! End-to-end edit workflow against an in-memory backend.
//!
//! Drives the resolver and session state together the way the review
//! commands do: resolve the result file from the displayed image name,
//! persist the edit, reconcile the session only after the acknowledgment.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use tabledit::client::{ApiError, EditStore, FindJsonResponse, SaveEditsRequest};
use tabledit::models::{ArtifactRef, CellText, ItemKind, OcrResults, PendingChange, SessionState};
use tabledit::resolver::{EditResolver, SaveError, SilentProgress};

/// In-memory stand-in for the backend's output directory.
struct MemoryBackend {
    files: Mutex<HashMap<String, OcrResults>>,
}

impl MemoryBackend {
    fn new(files: impl IntoIterator<Item = (&'static str, OcrResults)>) -> Self {
        Self {
            files: Mutex::new(
                files
                    .into_iter()
                    .map(|(name, results)| (name.to_string(), results))
                    .collect(),
            ),
        }
    }

    fn cell_text(&self, filename: &str, cell_id: i64) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(filename)?
            .cells_with_text
            .iter()
            .find(|c| c.cell_id == cell_id)
            .map(|c| c.text.clone())
    }
}

#[async_trait]
impl EditStore for MemoryBackend {
    async fn find_json(&self, base_prefix: &str) -> Result<FindJsonResponse, ApiError> {
        let files = self.files.lock().unwrap();
        let matching: Vec<String> = files
            .keys()
            .filter(|name| name.starts_with(base_prefix))
            .cloned()
            .collect();
        let best_match = matching
            .iter()
            .find(|name| name.ends_with("_combined_with_spanning.json"))
            .cloned();
        Ok(FindJsonResponse {
            success: true,
            error: None,
            best_match,
            matching_files: matching,
            files: files.keys().cloned().collect(),
        })
    }

    async fn save_edits(
        &self,
        filename: &str,
        changes: &SaveEditsRequest,
    ) -> Result<(), ApiError> {
        let mut files = self.files.lock().unwrap();
        let Some(results) = files.get_mut(filename) else {
            return Err(ApiError::NotFound(format!("{} not found", filename)));
        };
        for edit in &changes.cells_with_text {
            if let Some(cell) = results
                .cells_with_text
                .iter_mut()
                .find(|c| c.cell_id == edit.cell_id)
            {
                cell.text = edit.text.clone();
            }
        }
        for edit in &changes.unassigned_text {
            if let Some(text) = results
                .unassigned_text
                .iter_mut()
                .find(|t| t.text_id == edit.text_id)
            {
                text.text = edit.text.clone();
            }
        }
        Ok(())
    }
}

fn sample_results() -> OcrResults {
    OcrResults {
        metadata: Default::default(),
        cells_with_text: vec![CellText {
            cell_id: 7,
            text: "Helo".to_string(),
            confidence: 0.55,
            component_texts: None,
        }],
        unassigned_text: vec![],
    }
}

#[tokio::test]
async fn edit_then_revert_round_trips_through_the_resolved_file() {
    let backend = MemoryBackend::new([(
        "report1_res_ocr_combined_with_spanning.json",
        sample_results(),
    )]);
    let resolver = EditResolver::new(&backend);
    let artifact = ArtifactRef::new("/output/visualization_report1_res_ocr.png");
    let mut session = SessionState::new(artifact.clone(), sample_results());

    // Edit.
    let change = PendingChange {
        kind: ItemKind::Cell,
        id: 7,
        text: "Hello".to_string(),
    };
    let outcome = resolver
        .resolve_and_save(&change, &artifact, &SilentProgress)
        .await
        .unwrap();
    assert_eq!(outcome.filename, "report1_res_ocr_combined_with_spanning.json");
    session.apply_saved(&change);

    assert_eq!(
        backend.cell_text("report1_res_ocr_combined_with_spanning.json", 7),
        Some("Hello".to_string())
    );
    let item = session.item(ItemKind::Cell, 7).unwrap().clone();
    assert!(item.edited);
    assert_eq!(item.original_text, "Helo");

    // Revert resubmits the original text through the same path.
    resolver
        .revert(&item, &artifact, &SilentProgress)
        .await
        .unwrap();
    session.apply_reverted(ItemKind::Cell, 7);

    assert_eq!(
        backend.cell_text("report1_res_ocr_combined_with_spanning.json", 7),
        Some("Helo".to_string())
    );
    let item = session.item(ItemKind::Cell, 7).unwrap();
    assert!(!item.edited);
    assert!(session.edited_keys().is_empty());
}

#[tokio::test]
async fn fallback_lands_in_default_file_when_prefix_matches_nothing() {
    let backend = MemoryBackend::new([("results.json", sample_results())]);
    let resolver = EditResolver::new(&backend);
    let artifact = ArtifactRef::new("visualization_unrelated_res_ocr.png");

    let outcome = resolver
        .resolve_and_save(
            &PendingChange {
                kind: ItemKind::Cell,
                id: 7,
                text: "Hello".to_string(),
            },
            &artifact,
            &SilentProgress,
        )
        .await
        .unwrap();

    assert!(outcome.via_fallback);
    assert_eq!(outcome.filename, "results.json");
    assert_eq!(
        backend.cell_text("results.json", 7),
        Some("Hello".to_string())
    );
}

#[tokio::test]
async fn failed_save_leaves_session_state_untouched() {
    // Backend holds no files at all: resolution and every fallback fail.
    let backend = MemoryBackend::new([]);
    let resolver = EditResolver::new(&backend);
    let artifact = ArtifactRef::new("visualization_report1_res_ocr.png");
    let mut session = SessionState::new(artifact.clone(), sample_results());

    let change = PendingChange {
        kind: ItemKind::Cell,
        id: 7,
        text: "Hello".to_string(),
    };
    let err = resolver
        .resolve_and_save(&change, &artifact, &SilentProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, SaveError::PersistenceFailed(_)));

    // The caller never applied the change, so the session is pristine.
    let item = session.item(ItemKind::Cell, 7).unwrap();
    assert!(!item.edited);
    assert_eq!(item.current_text, "Helo");
    assert!(session.edited_keys().is_empty());

    // A later successful flow still works on the same session.
    session.apply_saved(&change);
    assert!(session.item(ItemKind::Cell, 7).unwrap().edited);
}

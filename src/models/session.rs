//! In-memory state for one review session.
//!
//! A session covers a single processed image: the parsed OCR results, one
//! editable item per detected cell or unassigned text, and the set of items
//! the user has corrected. Nothing here is persisted client-side; a session
//! lives exactly as long as the process reviewing it.

use std::collections::BTreeSet;
use std::fmt;

use super::results::OcrResults;

/// Which kind of detected item an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ItemKind {
    Cell,
    UnassignedText,
}

impl ItemKind {
    /// Key prefix used in the backend's `edited_items` list.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::UnassignedText => "text",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell => write!(f, "cell"),
            Self::UnassignedText => write!(f, "text"),
        }
    }
}

/// Reference to the processed image currently under review.
///
/// This is the only handle the client holds; the matching JSON resource name
/// is derived from it at save time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Final path segment of the artifact (the displayed image filename).
    pub fn filename(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One text region eligible for correction.
#[derive(Debug, Clone)]
pub struct EditableItem {
    pub kind: ItemKind,
    pub id: i64,
    pub current_text: String,
    /// Text as originally produced by OCR. Never mutated after creation;
    /// revert restores it.
    pub original_text: String,
    pub confidence: f64,
    pub edited: bool,
}

impl EditableItem {
    /// Key used in the backend's `edited_items` list (`cell_3`, `text_5`).
    pub fn key(&self) -> String {
        format!("{}_{}", self.kind.key_prefix(), self.id)
    }
}

/// An edit about to be submitted. Built per save action and discarded once
/// the request resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub kind: ItemKind,
    pub id: i64,
    pub text: String,
}

/// State for one upload/review session.
///
/// Handlers receive this by reference; there is no global session state.
#[derive(Debug)]
pub struct SessionState {
    pub artifact: ArtifactRef,
    pub results: OcrResults,
    items: Vec<EditableItem>,
    edited_keys: BTreeSet<String>,
}

impl SessionState {
    /// Build a session from parsed OCR results.
    pub fn new(artifact: ArtifactRef, results: OcrResults) -> Self {
        let mut items = Vec::with_capacity(results.item_count());
        for cell in &results.cells_with_text {
            items.push(EditableItem {
                kind: ItemKind::Cell,
                id: cell.cell_id,
                current_text: cell.text.clone(),
                original_text: cell.text.clone(),
                confidence: cell.confidence,
                edited: false,
            });
        }
        for text in &results.unassigned_text {
            items.push(EditableItem {
                kind: ItemKind::UnassignedText,
                id: text.text_id,
                current_text: text.text.clone(),
                original_text: text.text.clone(),
                confidence: text.confidence,
                edited: false,
            });
        }
        Self {
            artifact,
            results,
            items,
            edited_keys: BTreeSet::new(),
        }
    }

    pub fn items(&self) -> &[EditableItem] {
        &self.items
    }

    pub fn item(&self, kind: ItemKind, id: i64) -> Option<&EditableItem> {
        self.items.iter().find(|i| i.kind == kind && i.id == id)
    }

    /// Keys of items edited during this session, in stable order.
    pub fn edited_keys(&self) -> Vec<String> {
        self.edited_keys.iter().cloned().collect()
    }

    /// Reconcile session state after a confirmed save acknowledgment.
    ///
    /// Called only once the backend has accepted the edit; a failed save
    /// must leave the session exactly as it was. `original_text` is never
    /// touched so revert stays possible.
    pub fn apply_saved(&mut self, change: &PendingChange) {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| i.kind == change.kind && i.id == change.id)
        {
            item.current_text = change.text.clone();
            item.edited = true;
            self.edited_keys.insert(item.key());
        }
        match change.kind {
            ItemKind::Cell => {
                if let Some(cell) = self
                    .results
                    .cells_with_text
                    .iter_mut()
                    .find(|c| c.cell_id == change.id)
                {
                    cell.text = change.text.clone();
                }
            }
            ItemKind::UnassignedText => {
                if let Some(text) = self
                    .results
                    .unassigned_text
                    .iter_mut()
                    .find(|t| t.text_id == change.id)
                {
                    text.text = change.text.clone();
                }
            }
        }
    }

    /// Reconcile session state after a confirmed revert acknowledgment.
    ///
    /// Restores the original text and clears the edited flag. A no-op on
    /// items that were never edited.
    pub fn apply_reverted(&mut self, kind: ItemKind, id: i64) {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|i| i.kind == kind && i.id == id)
        else {
            return;
        };
        let original = item.original_text.clone();
        item.current_text = original.clone();
        item.edited = false;
        let key = item.key();
        self.edited_keys.remove(&key);
        match kind {
            ItemKind::Cell => {
                if let Some(cell) = self
                    .results
                    .cells_with_text
                    .iter_mut()
                    .find(|c| c.cell_id == id)
                {
                    cell.text = original;
                }
            }
            ItemKind::UnassignedText => {
                if let Some(text) = self
                    .results
                    .unassigned_text
                    .iter_mut()
                    .find(|t| t.text_id == id)
                {
                    text.text = original;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::results::{CellText, UnassignedText};

    fn sample_session() -> SessionState {
        let results = OcrResults {
            metadata: Default::default(),
            cells_with_text: vec![CellText {
                cell_id: 7,
                text: "Totl".to_string(),
                confidence: 0.62,
                component_texts: None,
            }],
            unassigned_text: vec![UnassignedText {
                text_id: 2,
                text: "Appendix".to_string(),
                confidence: 0.9,
            }],
        };
        SessionState::new(ArtifactRef::new("/output/visualization_r1_res_ocr.png"), results)
    }

    #[test]
    fn artifact_filename_strips_directories() {
        let artifact = ArtifactRef::new("/output/merge and split/visualization_r1.png");
        assert_eq!(artifact.filename(), "visualization_r1.png");
    }

    #[test]
    fn first_save_sets_edited_and_keeps_original() {
        let mut session = sample_session();
        session.apply_saved(&PendingChange {
            kind: ItemKind::Cell,
            id: 7,
            text: "Total".to_string(),
        });

        let item = session.item(ItemKind::Cell, 7).unwrap();
        assert!(item.edited);
        assert_eq!(item.current_text, "Total");
        assert_eq!(item.original_text, "Totl");
        assert_eq!(session.edited_keys(), vec!["cell_7".to_string()]);
        // The result document follows the accepted edit.
        assert_eq!(session.results.cells_with_text[0].text, "Total");
    }

    #[test]
    fn revert_restores_original_and_clears_edited() {
        let mut session = sample_session();
        session.apply_saved(&PendingChange {
            kind: ItemKind::Cell,
            id: 7,
            text: "Total".to_string(),
        });
        session.apply_reverted(ItemKind::Cell, 7);

        let item = session.item(ItemKind::Cell, 7).unwrap();
        assert!(!item.edited);
        assert_eq!(item.current_text, "Totl");
        assert!(session.edited_keys().is_empty());
    }

    #[test]
    fn revert_of_unedited_item_is_a_noop() {
        let mut session = sample_session();
        session.apply_reverted(ItemKind::UnassignedText, 2);

        let item = session.item(ItemKind::UnassignedText, 2).unwrap();
        assert!(!item.edited);
        assert_eq!(item.current_text, "Appendix");
    }
}

//! Data models for tabledit.

mod document;
mod results;
mod session;

pub use document::{DocumentDetail, DocumentSummary, StoredTextItem, TextRegion};
pub use results::{
    confidence_tier, CellText, ComponentText, ConfidenceTier, OcrResults, UnassignedText,
};
pub use session::{ArtifactRef, EditableItem, ItemKind, PendingChange, SessionState};

//! OCR result payloads produced by the backend's processing pipeline.
//!
//! The backend merges cell detection with OCR output into a single JSON
//! document: cells that received text, text that could not be assigned to
//! any cell, and a metadata block with document-level statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Confidence at or above this level is rendered as good.
pub const CONFIDENCE_GOOD: f64 = 0.8;
/// Confidence at or above this level (but below good) is rendered as a warning.
pub const CONFIDENCE_WARN: f64 = 0.5;

/// A table cell the backend assigned OCR text to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellText {
    pub cell_id: i64,
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
    /// Present when the cell text was stitched together from multiple
    /// detected fragments (spanning text).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_texts: Option<Vec<ComponentText>>,
}

/// One fragment of a multi-part (spanning) cell text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentText {
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Detected text the backend could not assign to any cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnassignedText {
    pub text_id: i64,
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Full result document for one processed image.
///
/// `cells_with_text` and `unassigned_text` are required; a payload missing
/// either array is malformed and rejected at parse time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResults {
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub cells_with_text: Vec<CellText>,
    pub unassigned_text: Vec<UnassignedText>,
}

impl OcrResults {
    /// Total number of editable items (cells plus unassigned text).
    pub fn item_count(&self) -> usize {
        self.cells_with_text.len() + self.unassigned_text.len()
    }
}

/// Map a confidence score to a coarse review tier.
///
/// Thresholds match the backend's visualization legend: >= 80% is trusted,
/// >= 50% is questionable, anything lower needs review.
pub fn confidence_tier(confidence: f64) -> ConfidenceTier {
    if confidence >= CONFIDENCE_GOOD {
        ConfidenceTier::Good
    } else if confidence >= CONFIDENCE_WARN {
        ConfidenceTier::Warn
    } else {
        ConfidenceTier::Bad
    }
}

/// Coarse confidence classification used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    Good,
    Warn,
    Bad,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_result_document() {
        let raw = r#"{
            "metadata": {"total_cells": 12, "source": "report1.png"},
            "cells_with_text": [
                {"cell_id": 3, "text": "Total", "confidence": 0.92,
                 "component_texts": [{"text": "To", "confidence": 0.9},
                                     {"text": "tal", "confidence": 0.94}]}
            ],
            "unassigned_text": [
                {"text_id": 1, "text": "Appendix", "confidence": 0.41}
            ]
        }"#;
        let results: OcrResults = serde_json::from_str(raw).unwrap();
        assert_eq!(results.item_count(), 2);
        assert_eq!(results.cells_with_text[0].cell_id, 3);
        assert_eq!(
            results.cells_with_text[0]
                .component_texts
                .as_ref()
                .unwrap()
                .len(),
            2
        );
        assert_eq!(results.unassigned_text[0].text, "Appendix");
    }

    #[test]
    fn missing_ocr_array_is_rejected() {
        let raw = r#"{"metadata": {}, "cells_with_text": []}"#;
        assert!(serde_json::from_str::<OcrResults>(raw).is_err());
    }

    #[test]
    fn confidence_tiers_match_legend_thresholds() {
        assert_eq!(confidence_tier(0.8), ConfidenceTier::Good);
        assert_eq!(confidence_tier(0.79), ConfidenceTier::Warn);
        assert_eq!(confidence_tier(0.5), ConfidenceTier::Warn);
        assert_eq!(confidence_tier(0.49), ConfidenceTier::Bad);
    }
}

//! Edit persistence resolution.
//!
//! The client only ever holds the processed *image* filename, while edits
//! have to land in the matching result *JSON* file, and the two naming
//! conventions have drifted over backend versions. This module derives a
//! base prefix from the image name, asks the backend which result files
//! match it, submits the edit there, and falls back to a fixed sequence of
//! well-known filenames when resolution comes up empty. Fallback candidates
//! are tried strictly one at a time so an ambiguous target can never be
//! written twice concurrently.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::{ApiError, CellEdit, EditStore, SaveEditsRequest, TextEdit};
use crate::models::{ArtifactRef, EditableItem, ItemKind, PendingChange};

/// Marker prefix on visualization images.
const VISUALIZATION_PREFIX: &str = "visualization_";
/// Marker separating the upload stem from the pipeline stage suffix.
const RESULT_MARKER: &str = "_res_";
/// Suffix the merge stage appends to combined result files.
const COMBINED_SUFFIX: &str = "_res_combined_with_spanning.json";

/// First and last resort of the fallback cascade.
const FALLBACK_COMBINED: &str = "combined_with_spanning.json";
const FALLBACK_DEFAULT: &str = "results.json";

/// Errors from resolving and saving an edit.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The lookup returned no best match and no matching files.
    #[error("No matching JSON file found")]
    NoMatch,

    /// Every fallback candidate was rejected; terminal and user-visible.
    #[error("Could not save changes: {0}")]
    PersistenceFailed(String),

    #[error(transparent)]
    Backend(#[from] ApiError),
}

impl SaveError {
    /// Whether the fallback cascade should be entered for this error.
    fn is_recoverable(&self) -> bool {
        match self {
            Self::NoMatch => true,
            Self::Backend(e) => e.is_not_found(),
            Self::PersistenceFailed(_) => false,
        }
    }
}

/// Result of a successful save, primary or fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// The result file the edit was persisted to.
    pub filename: String,
    /// True when the primary resolution failed and a fallback candidate
    /// accepted the edit.
    pub via_fallback: bool,
}

/// Observer for in-flight save progress, surfaced to the user as
/// informational notices.
pub trait SaveProgress {
    /// The primary save attempt is starting.
    fn saving(&self) {}
    /// A fallback candidate is about to be tried.
    fn retrying(&self, _candidate: &str) {}
}

/// Progress observer that reports nothing.
pub struct SilentProgress;

impl SaveProgress for SilentProgress {}

/// Derive the base prefix used to locate the result JSON for an artifact.
///
/// Priority order matters: visualization-prefixed names are a superset of
/// the `_res_` pattern and must be handled first.
pub fn base_prefix(artifact: &ArtifactRef) -> String {
    let filename = artifact.filename();

    if let Some(rest) = filename.strip_prefix(VISUALIZATION_PREFIX) {
        let stem = rest.split('.').next().unwrap_or(rest);
        let stem = stem.split(RESULT_MARKER).next().unwrap_or(stem);
        return stem.to_string();
    }

    if let Some((prefix, _)) = filename.split_once(RESULT_MARKER) {
        return prefix.to_string();
    }

    match filename.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => filename.to_string(),
    }
}

/// Ordered fallback candidates for a base prefix.
///
/// Tried in exactly this order; the middle entry collapses the combined
/// suffix back to a plain `.json` name when present.
pub fn fallback_candidates(base_prefix: &str) -> [String; 3] {
    let derived =
        format!("{}.json", base_prefix).replace(COMBINED_SUFFIX, ".json");
    [
        FALLBACK_COMBINED.to_string(),
        derived,
        FALLBACK_DEFAULT.to_string(),
    ]
}

/// Build the save payload for a single pending change.
fn request_for(change: &PendingChange) -> SaveEditsRequest {
    let mut request = SaveEditsRequest::default();
    match change.kind {
        ItemKind::Cell => request.cells_with_text.push(CellEdit {
            cell_id: change.id,
            text: change.text.clone(),
        }),
        ItemKind::UnassignedText => request.unassigned_text.push(TextEdit {
            text_id: change.id,
            text: change.text.clone(),
        }),
    }
    request
}

/// Resolves which backend result file an edit belongs to and persists it.
pub struct EditResolver<'a> {
    store: &'a dyn EditStore,
}

impl<'a> EditResolver<'a> {
    pub fn new(store: &'a dyn EditStore) -> Self {
        Self { store }
    }

    /// Resolve the result filename for an artifact without saving anything.
    pub async fn resolve_filename(&self, artifact: &ArtifactRef) -> Result<String, SaveError> {
        let prefix = base_prefix(artifact);
        let lookup = self.store.find_json(&prefix).await?;
        debug!(
            "Lookup for '{}': best_match={:?}, {} matching, {} known",
            prefix,
            lookup.best_match,
            lookup.matching_files.len(),
            lookup.files.len()
        );
        lookup
            .best_match
            .or_else(|| lookup.matching_files.first().cloned())
            .ok_or(SaveError::NoMatch)
    }

    /// Resolve the target result file for `artifact` and persist `change`.
    ///
    /// On "not found"-class failures the fallback cascade runs; any other
    /// failure surfaces immediately. The caller mutates session state only
    /// after this returns `Ok`.
    pub async fn resolve_and_save(
        &self,
        change: &PendingChange,
        artifact: &ArtifactRef,
        progress: &dyn SaveProgress,
    ) -> Result<SaveOutcome, SaveError> {
        let prefix = base_prefix(artifact);
        debug!(
            "Saving {} #{} via base prefix '{}'",
            change.kind, change.id, prefix
        );
        progress.saving();

        match self.try_primary(artifact, change).await {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.is_recoverable() => {
                warn!(
                    "Primary resolution failed ({}), entering fallback cascade",
                    err
                );
                self.run_cascade(&prefix, change, progress).await
            }
            Err(err) => Err(err),
        }
    }

    /// Resubmit an item's original text through the same resolution path.
    ///
    /// The caller is responsible for the confirmation gate and for clearing
    /// the item's edited flag once this returns `Ok`.
    pub async fn revert(
        &self,
        item: &EditableItem,
        artifact: &ArtifactRef,
        progress: &dyn SaveProgress,
    ) -> Result<SaveOutcome, SaveError> {
        let change = PendingChange {
            kind: item.kind,
            id: item.id,
            text: item.original_text.clone(),
        };
        self.resolve_and_save(&change, artifact, progress).await
    }

    async fn try_primary(
        &self,
        artifact: &ArtifactRef,
        change: &PendingChange,
    ) -> Result<SaveOutcome, SaveError> {
        let target = self.resolve_filename(artifact).await?;
        info!("Saving edits to {}", target);
        self.store.save_edits(&target, &request_for(change)).await?;
        Ok(SaveOutcome {
            filename: target,
            via_fallback: false,
        })
    }

    /// Try the fixed fallback filenames in order, strictly sequentially.
    async fn run_cascade(
        &self,
        prefix: &str,
        change: &PendingChange,
        progress: &dyn SaveProgress,
    ) -> Result<SaveOutcome, SaveError> {
        let request = request_for(change);
        let mut last_error: Option<ApiError> = None;

        for candidate in fallback_candidates(prefix) {
            progress.retrying(&candidate);
            info!("Trying fallback result file {}", candidate);
            match self.store.save_edits(&candidate, &request).await {
                Ok(()) => {
                    return Ok(SaveOutcome {
                        filename: candidate,
                        via_fallback: true,
                    });
                }
                Err(e) => {
                    warn!("Fallback {} rejected: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }

        Err(SaveError::PersistenceFailed(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "File not found".to_string()),
        ))
    }
}

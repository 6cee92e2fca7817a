//! Detached draft holder for entity forms.
//!
//! A [`FormBinder`] owns its own copy of an entity's editable fields. Edits
//! go to that copy only; nothing reaches a collection snapshot until the
//! draft is committed through the backend and the collection is refreshed.

use crate::error::CoreError;

/// Whether a bound draft accepts edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    ReadOnly,
    Mutable,
}

/// An owned draft plus its edit mode.
#[derive(Debug, Clone, PartialEq)]
pub struct FormBinder<D> {
    draft: D,
    mode: DraftMode,
}

impl<D> FormBinder<D> {
    /// Bind a draft that rejects edits (viewing mode).
    pub fn read_only(draft: D) -> Self {
        Self {
            draft,
            mode: DraftMode::ReadOnly,
        }
    }

    /// Bind a draft that accepts edits.
    pub fn mutable(draft: D) -> Self {
        Self {
            draft,
            mode: DraftMode::Mutable,
        }
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn mode(&self) -> DraftMode {
        self.mode
    }

    pub fn is_read_only(&self) -> bool {
        self.mode == DraftMode::ReadOnly
    }

    /// Apply an edit to the draft.
    ///
    /// Fails with [`CoreError::ReadOnlyDraft`] without touching the draft
    /// when the binder is read-only.
    pub fn update(&mut self, edit: impl FnOnce(&mut D)) -> Result<(), CoreError> {
        if self.is_read_only() {
            return Err(CoreError::ReadOnlyDraft);
        }
        edit(&mut self.draft);
        Ok(())
    }

    pub fn into_draft(self) -> D {
        self.draft
    }
}

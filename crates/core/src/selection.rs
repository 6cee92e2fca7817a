//! Idle / Viewing / Editing state machine for an editable entity.
//!
//! One tagged state replaces separate "selected entity" and "is editing"
//! flags, so combinations such as "editing with nothing to edit" cannot be
//! represented. Transitions here are pure; the client layer drives the
//! network round-trips around them.

use crate::error::CoreError;
use crate::form::FormBinder;

/// An entity that can be selected and edited through a draft.
pub trait Editable: Clone {
    type Draft: Clone;

    fn id(&self) -> &str;

    /// Detached copy of the editable fields.
    fn to_draft(&self) -> Self::Draft;

    /// Draft for a brand-new entity.
    fn template() -> Self::Draft;
}

/// Selection state for one editable resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<E: Editable> {
    /// Nothing selected.
    Idle,
    /// An entity is selected; its draft mirrors it read-only.
    Viewing {
        entity: E,
        form: FormBinder<E::Draft>,
    },
    /// A mutable draft, backed by an existing entity or by nothing (new).
    Editing {
        source: Option<E>,
        form: FormBinder<E::Draft>,
    },
}

impl<E: Editable> Default for Selection<E> {
    fn default() -> Self {
        Selection::Idle
    }
}

impl<E: Editable> Selection<E> {
    pub fn label(&self) -> &'static str {
        match self {
            Selection::Idle => "idle",
            Selection::Viewing { .. } => "viewing",
            Selection::Editing { .. } => "editing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Selection::Idle)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Selection::Editing { .. })
    }

    /// Any state -> Viewing(entity).
    pub fn select(&mut self, entity: E) {
        let form = FormBinder::read_only(entity.to_draft());
        *self = Selection::Viewing { entity, form };
    }

    /// Viewing -> Editing with a fresh mutable copy of the viewed entity.
    pub fn edit(&mut self) -> Result<(), CoreError> {
        let entity = match self {
            Selection::Viewing { entity, .. } => entity.clone(),
            other => {
                return Err(CoreError::InvalidTransition {
                    state: other.label(),
                    action: "edit",
                })
            }
        };
        let form = FormBinder::mutable(entity.to_draft());
        *self = Selection::Editing {
            source: Some(entity),
            form,
        };
        Ok(())
    }

    /// Any state -> Editing(template) with no backing entity.
    pub fn create_new(&mut self) {
        *self = Selection::Editing {
            source: None,
            form: FormBinder::mutable(E::template()),
        };
    }

    /// Any state -> Idle, discarding the draft.
    pub fn close(&mut self) {
        *self = Selection::Idle;
    }

    /// Id of the entity currently selected or being edited, if any.
    pub fn selected_id(&self) -> Option<&str> {
        match self {
            Selection::Idle => None,
            Selection::Viewing { entity, .. } => Some(entity.id()),
            Selection::Editing { source, .. } => source.as_ref().map(|e| e.id()),
        }
    }

    pub fn selected(&self) -> Option<&E> {
        match self {
            Selection::Idle => None,
            Selection::Viewing { entity, .. } => Some(entity),
            Selection::Editing { source, .. } => source.as_ref(),
        }
    }

    pub fn form(&self) -> Option<&FormBinder<E::Draft>> {
        match self {
            Selection::Idle => None,
            Selection::Viewing { form, .. } | Selection::Editing { form, .. } => Some(form),
        }
    }

    pub fn draft(&self) -> Option<&E::Draft> {
        self.form().map(FormBinder::draft)
    }

    /// Edit the draft. Only possible while Editing.
    pub fn update_draft(&mut self, edit: impl FnOnce(&mut E::Draft)) -> Result<(), CoreError> {
        match self {
            Selection::Editing { form, .. } | Selection::Viewing { form, .. } => form.update(edit),
            Selection::Idle => Err(CoreError::InvalidTransition {
                state: "idle",
                action: "edit the draft",
            }),
        }
    }
}

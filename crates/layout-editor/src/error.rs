//! Errors surfaced by the edit session

use layout_core::LayoutError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    /// The id is not part of the component catalog; nothing was changed
    #[error("Unknown component: {id}")]
    UnknownComponent { id: String },

    /// A committed transform contained NaN or infinity; nothing was changed
    #[error("Non-finite value in {field}")]
    NonFinite { field: String },

    /// Transform mode name not recognised
    #[error("Unknown transform mode: {name}")]
    UnknownTransformMode { name: String },

    /// Serializing the layout failed
    #[error("Failed to export layout: {0}")]
    Export(#[from] serde_json::Error),

    #[error(transparent)]
    Layout(LayoutError),
}

impl From<LayoutError> for EditError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::UnknownComponent { id } => EditError::UnknownComponent { id },
            LayoutError::NonFinite { field } => EditError::NonFinite { field },
            other => EditError::Layout(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EditError>;

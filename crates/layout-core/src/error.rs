//! Error types for layout configuration and the scene graph
//!
//! Missing assets are not errors: composition waits on the asset cache instead.

use thiserror::Error;

use crate::scene::NodeId;

#[derive(Error, Debug)]
pub enum LayoutError {
    /// Layout JSON could not be parsed
    #[error("Failed to parse layout config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configured number is NaN or infinite
    #[error("Non-finite value in {field}")]
    NonFinite {
        /// Dotted path of the offending field, e.g. `components.fan1.rotation`
        field: String,
    },

    /// A component entry has an empty id
    #[error("Component id must not be empty")]
    EmptyComponentId,

    /// Two component entries share an id
    #[error("Duplicate component id: {id}")]
    DuplicateComponent { id: String },

    /// The id is not part of the component catalog
    #[error("Unknown component: {id}")]
    UnknownComponent { id: String },

    /// The node was despawned or never existed
    #[error("Scene node {node} is not alive")]
    DeadNode { node: NodeId },

    /// Reparenting would make a node its own ancestor
    #[error("Cannot attach {child} under {parent}: would create a cycle")]
    HierarchyCycle { child: NodeId, parent: NodeId },
}

pub type Result<T> = std::result::Result<T, LayoutError>;

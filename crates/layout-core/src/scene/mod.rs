pub mod node_id;
pub mod graph;

pub use node_id::NodeId;
pub use graph::{Node, RenderItem, SceneGraph};
